use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::ops::reorder::ScopeFilter;
use crate::tui::app::App;
use crate::util::unicode::{display_width, truncate_to_width};

/// Scope tabs (All, Top-level, one per parent) with a separator line below
pub fn render_scope_bar(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    render_tabs(frame, app, chunks[0]);

    let sep = Paragraph::new(Line::from(Span::styled(
        "\u{2500}".repeat(area.width as usize),
        Style::default().fg(app.theme.dim).bg(app.theme.background),
    )));
    frame.render_widget(sep, chunks[1]);
}

fn tab_style(app: &App, current: bool) -> Style {
    if current {
        Style::default()
            .fg(app.theme.text_bright)
            .bg(app.theme.selection_bg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(app.theme.dim).bg(app.theme.background)
    }
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let bg_style = Style::default().bg(app.theme.background);
    let sep = Span::styled(
        "\u{2502}",
        Style::default().fg(app.theme.dim).bg(app.theme.background),
    );
    let current = app.session.filter();

    let mut tabs: Vec<(String, bool)> = vec![
        ("All".to_string(), current == ScopeFilter::All),
        ("Top-level".to_string(), current == ScopeFilter::TopLevel),
    ];
    for parent in app.session.parents() {
        tabs.push((
            truncate_to_width(&parent.name, 16),
            current == ScopeFilter::Parent(parent.id),
        ));
    }

    let mut spans: Vec<Span> = vec![Span::styled(" ", bg_style)];
    for (label, is_current) in tabs {
        spans.push(Span::styled(format!(" {} ", label), tab_style(app, is_current)));
        spans.push(sep.clone());
    }

    // Dirty marker and backend on the right
    let mut right = String::new();
    if app.session.is_dirty() {
        right.push_str("\u{25CF} unsaved  ");
    }
    right.push_str(&app.source);
    let used: usize = spans.iter().map(|s| display_width(&s.content)).sum();
    let width = area.width as usize;
    let right_w = display_width(&right);
    if used + right_w + 1 < width {
        spans.push(Span::styled(" ".repeat(width - used - right_w - 1), bg_style));
        let style = if app.session.is_dirty() {
            Style::default().fg(app.theme.yellow).bg(app.theme.background)
        } else {
            Style::default().fg(app.theme.dim).bg(app.theme.background)
        };
        spans.push(Span::styled(right, style));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).style(bg_style), area);
}
