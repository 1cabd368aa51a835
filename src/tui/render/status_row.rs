use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, Banner, Mode};
use crate::util::unicode::{display_width, truncate_to_width};

const NAVIGATE_HINTS: &str = "m move  f scope  s save  r reload  ? help  q quit";
const MOVE_HINTS: &str = "\u{2191}\u{2193} target  Enter drop  Esc cancel";

/// Render the banner row (save results, errors)
pub fn render_banner(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let Some(banner) = &app.banner else {
        frame.render_widget(Paragraph::new("").style(Style::default().bg(bg)), area);
        return;
    };
    let (icon, color) = match banner {
        Banner::Success { .. } => ("\u{2713}", app.theme.green),
        Banner::Info(_) => ("\u{2022}", app.theme.text),
        Banner::Error(_) => ("\u{2717}", app.theme.red),
        Banner::Auth(_) => ("\u{26A0}", app.theme.yellow),
    };
    let text = truncate_to_width(
        &format!(" {} {}", icon, banner.text()),
        area.width as usize,
    );
    let line = Line::from(Span::styled(text, Style::default().fg(color).bg(bg)));
    frame.render_widget(Paragraph::new(line).style(Style::default().bg(bg)), area);
}

/// Render the status row (bottom of screen): mode, scope, count and key hints
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let mut spans = Vec::new();
    if app.mode == Mode::Move {
        spans.push(Span::styled(
            " MOVE ",
            Style::default()
                .fg(app.theme.background)
                .bg(app.theme.highlight)
                .add_modifier(Modifier::BOLD),
        ));
    }
    spans.push(Span::styled(
        format!(
            " {} \u{00B7} {} categories",
            app.session.filter(),
            app.view_len()
        ),
        Style::default().fg(app.theme.text).bg(bg),
    ));
    if app.session.is_dirty() {
        spans.push(Span::styled(
            " \u{25CF}",
            Style::default().fg(app.theme.yellow).bg(bg),
        ));
    }

    if app.show_key_hints {
        let hint = match app.mode {
            Mode::Navigate => NAVIGATE_HINTS,
            Mode::Move => MOVE_HINTS,
        };
        let content_width: usize = spans.iter().map(|s| display_width(&s.content)).sum();
        let hint_width = display_width(hint);
        if content_width + hint_width < width {
            let padding = width - content_width - hint_width;
            spans.push(Span::styled(" ".repeat(padding), Style::default().bg(bg)));
            spans.push(Span::styled(hint, Style::default().fg(app.theme.dim).bg(bg)));
        }
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}
