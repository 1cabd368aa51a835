use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::app::App;

use super::handle_cursor_key;

/// Move mode: the cursor picks the drop target for the grabbed category.
pub(super) fn handle_move(app: &mut App, key: KeyEvent) {
    if handle_cursor_key(app, key) {
        return;
    }
    match key.code {
        KeyCode::Enter | KeyCode::Char('m') | KeyCode::Char(' ') => {
            app.drop_grabbed();
        }
        KeyCode::Esc => app.cancel_grab(),
        _ => {}
    }
}
