use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::app::App;

use super::handle_cursor_key;

pub(super) fn handle_navigate(app: &mut App, key: KeyEvent) {
    if handle_cursor_key(app, key) {
        return;
    }
    match key.code {
        KeyCode::Char('m') | KeyCode::Char(' ') => app.grab(),
        KeyCode::Char('f') => app.cycle_scope(),
        KeyCode::Char('s') => app.save(Instant::now()),
        KeyCode::Char('r') => app.reload(),
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Char('q') => app.request_quit(),
        KeyCode::Esc => app.banner = None,
        _ => {}
    }
}
