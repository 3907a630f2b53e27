/*
[INPUT]:  Crossterm key events
[OUTPUT]: AppState mutations and background actions
[POS]:    TUI key routing
[UPDATE]: When adding hotkeys or focusable fields
*/

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tui_input::InputRequest;

use super::app::{AppState, Focus};

/// Handles key events for the TUI.
///
/// Returns `true` if quit is requested, `false` otherwise.
pub(super) fn handle_key_event(app: &mut AppState, key: KeyEvent) -> bool {
    if key.kind == KeyEventKind::Release {
        return false;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('c') if ctrl => return true,
        KeyCode::F(10) => return true,
        KeyCode::Char('s') if ctrl => {
            app.submit();
            return false;
        }
        KeyCode::F(5) => {
            app.submit();
            return false;
        }
        KeyCode::F(2) => {
            app.refresh_history();
            return false;
        }
        KeyCode::Esc => {
            if app.suggestion_state.selected().is_some() {
                app.suggestion_state.select(None);
            } else {
                app.cancel_tracking();
            }
            return false;
        }
        KeyCode::Tab => {
            app.shift_focus(1);
            return false;
        }
        KeyCode::BackTab => {
            app.shift_focus(-1);
            return false;
        }
        _ => {}
    }

    match app.focus {
        Focus::Packages => handle_package_key(app, key, ctrl),
        Focus::SystemType => match key.code {
            KeyCode::Left => app.cycle_system_type(-1),
            KeyCode::Right | KeyCode::Char(' ') => app.cycle_system_type(1),
            KeyCode::Enter => app.submit(),
            _ => {}
        },
        Focus::Distribution => match key.code {
            KeyCode::Left | KeyCode::Up => app.cycle_distribution(-1),
            KeyCode::Right | KeyCode::Down => app.cycle_distribution(1),
            KeyCode::Enter => app.submit(),
            _ => {}
        },
        Focus::Arch => match key.code {
            KeyCode::Left | KeyCode::Up => app.cycle_arch(-1),
            KeyCode::Right | KeyCode::Down => app.cycle_arch(1),
            KeyCode::Enter => app.submit(),
            _ => {}
        },
        Focus::Deep => match key.code {
            KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right => app.toggle_deep(),
            KeyCode::Enter => app.submit(),
            _ => {}
        },
        Focus::History => match key.code {
            KeyCode::Up | KeyCode::Char('k') => app.move_history(-1),
            KeyCode::Down | KeyCode::Char('j') => app.move_history(1),
            KeyCode::Enter | KeyCode::Char('d') => app.download_selected(),
            KeyCode::Char('r') => app.refresh_history(),
            _ => {}
        },
    }
    false
}

fn handle_package_key(app: &mut AppState, key: KeyEvent, ctrl: bool) {
    let request = match key.code {
        KeyCode::Enter => {
            app.commit_input();
            return;
        }
        KeyCode::Up => {
            app.move_suggestion(-1);
            return;
        }
        KeyCode::Down => {
            app.move_suggestion(1);
            return;
        }
        KeyCode::Backspace if app.input.value().is_empty() => {
            app.remove_last_package();
            return;
        }
        KeyCode::Char('w') if ctrl => InputRequest::DeletePrevWord,
        KeyCode::Char('u') if ctrl => InputRequest::DeleteLine,
        KeyCode::Char(c) if !ctrl => InputRequest::InsertChar(c),
        KeyCode::Backspace => InputRequest::DeletePrevChar,
        KeyCode::Delete => InputRequest::DeleteNextChar,
        KeyCode::Left => InputRequest::GoToPrevChar,
        KeyCode::Right => InputRequest::GoToNextChar,
        KeyCode::Home => InputRequest::GoToStart,
        KeyCode::End => InputRequest::GoToEnd,
        _ => return,
    };
    app.edit_input(request);
}
