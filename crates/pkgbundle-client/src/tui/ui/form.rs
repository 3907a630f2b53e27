/*
[INPUT]:  AppState form fields, PackageInput, catalog suggestions
[OUTPUT]: Package entry, package tags, target selectors and the suggestion popup
[POS]:    TUI UI submission form
[UPDATE]: When form fields change
*/

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap};

use pkgbundle_client::render::{sanitize_display, truncate_display};

use super::{border_style, focused_border_style, highlight_style};
use crate::tui::app::{AppState, Focus};

const INPUT_HEIGHT: u16 = 3;
const MAX_SUGGESTION_ROWS: u16 = 6;
const TAG_MAX_WIDTH: usize = 32;

fn split_form(area: Rect) -> (Rect, Rect, Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(INPUT_HEIGHT), Constraint::Min(2)])
        .split(columns[0]);
    (left[0], left[1], columns[1])
}

fn block_for(title: &str, focused: bool) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(if focused {
            focused_border_style()
        } else {
            border_style()
        })
        .title(title)
}

pub(in crate::tui) fn draw_form(frame: &mut ratatui::Frame, area: Rect, app: &AppState) {
    let (input_area, tags_area, target_area) = split_form(area);
    draw_input(frame, input_area, app);
    draw_tags(frame, tags_area, app);
    draw_target(frame, target_area, app);
}

fn draw_input(frame: &mut ratatui::Frame, area: Rect, app: &AppState) {
    let focused = app.focus == Focus::Packages;
    let width = area.width.saturating_sub(2) as usize;
    let scroll = app.input.visual_scroll(width);
    let input = Paragraph::new(app.input.value())
        .scroll((0, scroll as u16))
        .block(block_for("Package (Enter to add)", focused));
    frame.render_widget(input, area);

    if focused {
        let offset = app.input.visual_cursor().saturating_sub(scroll) as u16;
        frame.set_cursor_position((area.x + 1 + offset, area.y + 1));
    }
}

fn draw_tags(frame: &mut ratatui::Frame, area: Rect, app: &AppState) {
    let packages = app.packages.packages();
    let line = if packages.is_empty() {
        Line::from(Span::styled(
            "no packages yet",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let tag_style = Style::default().fg(Color::Black).bg(Color::Cyan);
        let mut spans = Vec::with_capacity(packages.len() * 2);
        for name in packages.iter() {
            let label = truncate_display(&sanitize_display(name), TAG_MAX_WIDTH);
            spans.push(Span::styled(format!(" {label} "), tag_style));
            spans.push(Span::raw(" "));
        }
        Line::from(spans)
    };
    let title = format!("Packages ({}) [Backspace on empty input removes last]", packages.len());
    let tags = Paragraph::new(line)
        .wrap(Wrap { trim: true })
        .block(block_for(&title, false));
    frame.render_widget(tags, area);
}

fn selector_line(label: &str, value: String, focused: bool) -> Line<'static> {
    let value_style = if focused {
        highlight_style()
    } else {
        Style::default()
    };
    let marker = if focused { "> " } else { "  " };
    Line::from(vec![
        Span::raw(marker),
        Span::styled(format!("{label:<13}"), Style::default().add_modifier(Modifier::DIM)),
        Span::styled(format!("< {value} >"), value_style),
    ])
}

fn draw_target(frame: &mut ratatui::Frame, area: Rect, app: &AppState) {
    let distribution = app
        .distribution()
        .map(|option| format!("{} ({})", option.name, option.id))
        .unwrap_or_else(|| "-".to_string());
    let submit_state = if app.tracker_view.submit_enabled {
        Span::styled("ready to submit", Style::default().fg(Color::Green))
    } else {
        Span::styled("submit disabled", Style::default().fg(Color::DarkGray))
    };

    let lines = vec![
        selector_line(
            "System type",
            app.system_type.to_string(),
            app.focus == Focus::SystemType,
        ),
        selector_line(
            "Distribution",
            distribution,
            app.focus == Focus::Distribution,
        ),
        selector_line(
            "Architecture",
            app.arch().unwrap_or_else(|| "-".to_string()),
            app.focus == Focus::Arch,
        ),
        selector_line(
            "Deep deps",
            if app.deep_download { "yes" } else { "no" }.to_string(),
            app.focus == Focus::Deep,
        ),
        Line::from(vec![Span::raw("  "), submit_state]),
    ];
    let focused = matches!(
        app.focus,
        Focus::SystemType | Focus::Distribution | Focus::Arch | Focus::Deep
    );
    frame.render_widget(Paragraph::new(lines).block(block_for("Target", focused)), area);
}

/// Popup under the package input while the query has matches
pub(in crate::tui) fn draw_suggestions(frame: &mut ratatui::Frame, form_area: Rect, app: &mut AppState) {
    if app.focus != Focus::Packages {
        return;
    }
    let suggestions = app.suggestions();
    if suggestions.is_empty() {
        return;
    }

    let (input_area, _, _) = split_form(form_area);
    let screen = frame.area();
    let top = input_area.y + INPUT_HEIGHT;
    let height = (suggestions.len() as u16 + 2)
        .min(MAX_SUGGESTION_ROWS + 2)
        .min(screen.height.saturating_sub(top));
    if height < 3 {
        return;
    }
    let popup = Rect {
        x: input_area.x + 1,
        y: top,
        width: input_area.width.saturating_sub(2).min(32),
        height,
    };

    let items: Vec<ListItem> = suggestions.into_iter().map(ListItem::new).collect();
    let list = List::new(items)
        .block(block_for("Suggestions [Up/Down]", true))
        .highlight_style(highlight_style())
        .highlight_symbol("> ");
    frame.render_widget(Clear, popup);
    frame.render_stateful_widget(list, popup, &mut app.suggestion_state);
}
