/*
[INPUT]:  Task snapshots, ProgressView
[OUTPUT]: Display-ready lines with sanitized text
[POS]:    Presentation - pure formatting shared by the CLI and the TUI
[UPDATE]: When task list columns or status labels change
*/

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use pkgbundle_adapter::{Task, TaskStatus};

use crate::catalog::AUTO_ARCH;
use crate::machine::ProgressView;

pub const EMPTY_STATE_TEXT: &str = "no tasks yet";
const NO_PACKAGES: &str = "N/A";
const NO_MESSAGE: &str = "no message";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskLine {
    pub task_id: String,
    pub status: TaskStatus,
    pub status_label: &'static str,
    pub packages: String,
    pub target: String,
    pub message: String,
    pub created_at: Option<String>,
    /// Only completed tasks offer an archive
    pub downloadable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedList {
    Empty(&'static str),
    Items(Vec<TaskLine>),
}

impl RenderedList {
    pub fn is_empty(&self) -> bool {
        matches!(self, RenderedList::Empty(_))
    }

    pub fn lines(&self) -> &[TaskLine] {
        match self {
            RenderedList::Empty(_) => &[],
            RenderedList::Items(lines) => lines,
        }
    }
}

pub fn status_label(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Pending => "waiting",
        TaskStatus::Processing => "running",
        TaskStatus::Completed => "done",
        TaskStatus::Failed => "failed",
        TaskStatus::Unknown => "unknown",
    }
}

/// Task list in service order, or the empty state
pub fn render_task_list(tasks: &[Task]) -> RenderedList {
    if tasks.is_empty() {
        return RenderedList::Empty(EMPTY_STATE_TEXT);
    }
    RenderedList::Items(tasks.iter().map(render_task).collect())
}

pub fn render_task(task: &Task) -> TaskLine {
    let packages = match task.packages() {
        [] => NO_PACKAGES.to_string(),
        names => sanitize_display(&names.join(", ")),
    };
    let target = format!(
        "{} | {} | {}",
        sanitize_display(task.system_type().unwrap_or("-")),
        sanitize_display(task.distribution().unwrap_or("-")),
        sanitize_display(task.arch().filter(|arch| !arch.is_empty()).unwrap_or(AUTO_ARCH)),
    );
    let message = task
        .error
        .as_deref()
        .filter(|_| task.status == TaskStatus::Failed)
        .or(task.message.as_deref())
        .map(sanitize_display)
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| NO_MESSAGE.to_string());

    TaskLine {
        task_id: sanitize_display(&task.task_id),
        status: task.status,
        status_label: status_label(task.status),
        packages,
        target,
        message,
        created_at: task
            .created_at_naive()
            .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string()),
        downloadable: task.status == TaskStatus::Completed,
    }
}

/// Percentage text for a progress bar
pub fn render_progress(progress: &ProgressView) -> String {
    format!("{}%", progress.percent.min(100))
}

/// Fixed-width text bar, e.g. `[#####-----] 50%`
pub fn render_progress_bar(progress: &ProgressView, width: usize) -> String {
    let percent = usize::from(progress.percent.min(100));
    let filled = width * percent / 100;
    format!(
        "[{}{}] {}",
        "#".repeat(filled),
        "-".repeat(width - filled),
        render_progress(progress)
    )
}

/// Strip control characters and bidi overrides so echoed text cannot drive the terminal.
///
/// Line breaks and tabs become spaces.
pub fn sanitize_display(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '\n' | '\r' | '\t' => Some(' '),
            c if c.is_control() => None,
            '\u{202A}'..='\u{202E}' | '\u{2066}'..='\u{2069}' => None,
            c => Some(c),
        })
        .collect()
}

/// Cut `text` to at most `max_width` columns, ending with `…` when shortened
pub fn truncate_display(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max_width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

/// Plain text lines for non-interactive output
pub fn format_task_list(list: &RenderedList) -> Vec<String> {
    match list {
        RenderedList::Empty(text) => vec![(*text).to_string()],
        RenderedList::Items(lines) => lines
            .iter()
            .map(|line| {
                let mut text = format!(
                    "{:<8} {}  {}  [{}]  {}",
                    line.status_label, line.task_id, line.packages, line.target, line.message
                );
                if let Some(created) = &line.created_at {
                    text.push_str(&format!("  ({created})"));
                }
                if line.downloadable {
                    text.push_str("  [archive]");
                }
                text
            })
            .collect(),
    }
}
