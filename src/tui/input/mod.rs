mod move_mode;
mod navigate;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::{App, Mode, Pending};

use move_mode::handle_move;
use navigate::handle_navigate;

/// Handle a key event in the current mode
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }

    // A pending confirmation only survives its own key
    let ctrl_c = key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c');
    let confirming = (ctrl_c && app.pending == Some(Pending::Quit))
        || matches!(
            (app.pending, key.code),
            (Some(Pending::Quit), KeyCode::Char('q')) | (Some(Pending::Reload), KeyCode::Char('r'))
        );
    if !confirming {
        app.pending = None;
    }

    if ctrl_c {
        app.request_quit();
        return;
    }

    // Help overlay intercepts everything
    if app.show_help {
        if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q')) {
            app.show_help = false;
        }
        return;
    }

    match app.mode {
        Mode::Navigate => handle_navigate(app, key),
        Mode::Move => handle_move(app, key),
    }
}

/// Cursor keys shared by both modes. Returns true if the key was handled.
fn handle_cursor_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.move_cursor(1),
        KeyCode::Char('k') | KeyCode::Up => app.move_cursor(-1),
        KeyCode::PageDown => app.move_cursor(10),
        KeyCode::PageUp => app.move_cursor(-10),
        KeyCode::Char('g') | KeyCode::Home => app.cursor_to(0),
        KeyCode::Char('G') | KeyCode::End => app.cursor_to(usize::MAX),
        _ => return false,
    }
    true
}
