/*
[INPUT]:  RegistrySnapshot and history selection from AppState
[OUTPUT]: Task history list rendered into Ratatui frame
[POS]:    TUI UI task history panel
[UPDATE]: When history columns or status colors change
*/

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};

use pkgbundle_adapter::TaskStatus;
use pkgbundle_client::render::{RenderedList, TaskLine, render_task_list, sanitize_display};

use super::{border_style, focused_border_style, highlight_style};
use crate::tui::app::{AppState, Focus};

fn status_color(status: TaskStatus) -> Color {
    match status {
        TaskStatus::Pending => Color::Yellow,
        TaskStatus::Processing => Color::Cyan,
        TaskStatus::Completed => Color::Green,
        TaskStatus::Failed => Color::Red,
        TaskStatus::Unknown => Color::DarkGray,
    }
}

fn task_item(line: &TaskLine) -> ListItem<'static> {
    let mut header = vec![
        Span::styled(
            format!("{:<8}", line.status_label),
            Style::default()
                .fg(status_color(line.status))
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" {}  ", line.packages)),
        Span::styled(line.target.clone(), Style::default().fg(Color::DarkGray)),
    ];
    if line.downloadable {
        header.push(Span::styled("  [d] archive", Style::default().fg(Color::Green)));
    }
    let mut detail = format!("         {}", line.message);
    if let Some(created) = &line.created_at {
        detail.push_str(&format!("  ({created})"));
    }
    ListItem::new(vec![
        Line::from(header),
        Line::from(Span::styled(detail, Style::default().add_modifier(Modifier::DIM))),
    ])
}

pub(in crate::tui) fn draw_task_list(
    frame: &mut ratatui::Frame,
    area: ratatui::layout::Rect,
    app: &mut AppState,
) {
    let snapshot = &app.registry;
    let mut title = match snapshot.refreshed_at {
        Some(at) => format!("Tasks (updated {})", at.format("%H:%M:%S")),
        None => "Tasks".to_string(),
    };
    if let Some(err) = &snapshot.last_error {
        title.push_str(&format!(" [stale: {}]", sanitize_display(err)));
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(if app.focus == Focus::History {
            focused_border_style()
        } else {
            border_style()
        })
        .title(title);

    let rendered = render_task_list(&snapshot.tasks);
    let items: Vec<ListItem> = match &rendered {
        RenderedList::Empty(text) => {
            let text = if snapshot.loaded { *text } else { "loading..." };
            frame.render_widget(
                Paragraph::new(text)
                    .style(Style::default().fg(Color::DarkGray))
                    .block(block),
                area,
            );
            return;
        }
        RenderedList::Items(lines) => lines.iter().map(task_item).collect(),
    };

    let list = List::new(items)
        .block(block)
        .highlight_style(highlight_style())
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, area, &mut app.history_state);
}
