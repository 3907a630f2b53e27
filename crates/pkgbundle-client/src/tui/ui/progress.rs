/*
[INPUT]:  TrackerView from AppState
[OUTPUT]: Progress gauge for the tracked task
[POS]:    TUI UI progress panel
[UPDATE]: When tracker phases or progress texts change
*/

use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph};

use pkgbundle_client::TrackerPhase;
use pkgbundle_client::render::{render_progress, sanitize_display};

use super::border_style;
use crate::tui::app::AppState;

pub(in crate::tui) fn draw_progress(
    frame: &mut ratatui::Frame,
    area: ratatui::layout::Rect,
    app: &AppState,
) {
    let view = &app.tracker_view;
    let title = match &view.task_id {
        Some(task_id) => format!("Progress [{}] {}", view.phase.as_str(), sanitize_display(task_id)),
        None => format!("Progress [{}]", view.phase.as_str()),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style())
        .title(title);

    if !view.progress.visible {
        let hint = if view.phase == TrackerPhase::Submitting {
            "submitting..."
        } else {
            "add packages and press F5 to submit"
        };
        frame.render_widget(Paragraph::new(hint).block(block), area);
        return;
    }

    let color = match view.phase {
        TrackerPhase::Completed => Color::Green,
        TrackerPhase::Failed => Color::Red,
        _ => Color::Cyan,
    };
    let label = format!(
        "{}  {}",
        render_progress(&view.progress),
        sanitize_display(&view.progress.message)
    );
    let gauge = Gauge::default()
        .block(block)
        .gauge_style(Style::default().fg(color))
        .percent(u16::from(view.progress.percent.min(100)))
        .label(label);
    frame.render_widget(gauge, area);
}
