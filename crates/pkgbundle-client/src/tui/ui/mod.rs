/*
[INPUT]:  AppState
[OUTPUT]: Full-frame layout and shared styles
[POS]:    TUI UI module root
[UPDATE]: When panels are added or the layout changes
*/

mod form;
mod logs;
mod progress;
mod task_list;

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use pkgbundle_client::NoticeLevel;
use pkgbundle_client::render::sanitize_display;

use super::app::AppState;

pub(super) fn draw(frame: &mut ratatui::Frame, app: &mut AppState) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8),
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(3),
        ])
        .split(frame.area());

    form::draw_form(frame, layout[0], app);
    progress::draw_progress(frame, layout[1], app);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(layout[2]);
    task_list::draw_task_list(frame, middle[0], app);
    logs::draw_logs(frame, middle[1], &app.log_buffer);

    draw_footer(frame, layout[3], app);

    // Drawn last so the popup overlays the panels below the input.
    form::draw_suggestions(frame, layout[0], app);
}

fn draw_footer(frame: &mut ratatui::Frame, area: ratatui::layout::Rect, app: &AppState) {
    let line = Line::from(vec![
        Span::styled(
            "[Tab] Field  [Enter] Add  [F5] Submit  [Esc] Stop  [F2] Refresh  [F10] Quit  ",
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            sanitize_display(&app.status.text),
            notice_style(app.status.level),
        ),
    ]);
    let footer = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style())
            .title("Status"),
    );
    frame.render_widget(footer, area);
}

pub(super) fn border_style() -> Style {
    Style::default().fg(Color::Magenta)
}

pub(super) fn focused_border_style() -> Style {
    Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

pub(super) fn highlight_style() -> Style {
    Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD)
}

pub(super) fn notice_style(level: NoticeLevel) -> Style {
    match level {
        NoticeLevel::Info => Style::default().fg(Color::White),
        NoticeLevel::Success => Style::default().fg(Color::Green),
        NoticeLevel::Warning => Style::default().fg(Color::Yellow),
        NoticeLevel::Error => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    }
}
