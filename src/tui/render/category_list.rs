use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::category::Category;
use crate::tui::app::{App, Mode};
use crate::util::unicode::{fit_to_width, pad_left};

// Fixed column widths; the name column takes the rest
const MARK_W: usize = 2;
const POS_W: usize = 4;
const ID_W: usize = 6;
const SORT_W: usize = 7;
const STATUS_W: usize = 9;
const PARENT_W: usize = 7;

fn name_width(total: usize) -> usize {
    total
        .saturating_sub(MARK_W + POS_W + ID_W + SORT_W + STATUS_W + PARENT_W + 6)
        .max(8)
}

/// Render the ordered categories of the active scope
pub fn render_category_list(frame: &mut Frame, app: &mut App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;
    let name_w = name_width(width);
    let visible_height = (area.height as usize).saturating_sub(1).max(1);

    // Keep the cursor on screen
    if app.cursor < app.scroll_offset {
        app.scroll_offset = app.cursor;
    } else if app.cursor >= app.scroll_offset + visible_height {
        app.scroll_offset = app.cursor.saturating_sub(visible_height - 1);
    }

    let header_style = Style::default()
        .fg(app.theme.dim)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let header = format!(
        "{}{} {} {} {} {} {}",
        " ".repeat(MARK_W),
        pad_left("#", POS_W),
        pad_left("id", ID_W),
        fit_to_width("name", name_w),
        pad_left("sort", SORT_W),
        fit_to_width(" status", STATUS_W),
        pad_left("parent", PARENT_W),
    );
    let mut lines: Vec<Line> = vec![Line::from(Span::styled(header, header_style))];

    let view = app.session.view();
    if view.is_empty() {
        lines.push(Line::from(Span::styled(
            "  (no categories)",
            Style::default().fg(app.theme.dim).bg(bg),
        )));
    }

    for (i, category) in view
        .iter()
        .enumerate()
        .skip(app.scroll_offset)
        .take(visible_height)
    {
        lines.push(render_row(app, i, category, name_w, width));
    }

    frame.render_widget(Paragraph::new(lines).style(Style::default().bg(bg)), area);
}

fn render_row<'a>(app: &App, index: usize, c: &Category, name_w: usize, width: usize) -> Line<'a> {
    let is_cursor = index == app.cursor;
    let is_grabbed = app.grabbed == Some(c.id);

    let row_bg = if is_grabbed {
        app.theme.grabbed_bg
    } else if is_cursor {
        app.theme.selection_bg
    } else {
        app.theme.background
    };
    let mark = match (is_grabbed, is_cursor, app.mode) {
        (true, _, _) => "\u{2261} ",
        (false, true, Mode::Move) => "\u{25B8} ",
        (false, true, Mode::Navigate) => "\u{258E} ",
        _ => "  ",
    };

    let base = Style::default().fg(app.theme.text).bg(row_bg);
    let name_style = if is_cursor || is_grabbed {
        base.fg(app.theme.text_bright).add_modifier(Modifier::BOLD)
    } else {
        base
    };
    let sort_style = if c.sort.is_set() {
        base
    } else {
        base.fg(app.theme.dim)
    };

    let parent = c.parent_id.map(|p| p.to_string()).unwrap_or_default();
    let mut spans = vec![
        Span::styled(mark, base.fg(app.theme.highlight)),
        Span::styled(pad_left(&(index + 1).to_string(), POS_W), base.fg(app.theme.dim)),
        Span::styled(" ", base),
        Span::styled(pad_left(&c.id.to_string(), ID_W), base.fg(app.theme.cyan)),
        Span::styled(" ", base),
        Span::styled(fit_to_width(&c.name, name_w), name_style),
        Span::styled(" ", base),
        Span::styled(pad_left(&c.sort.to_string(), SORT_W), sort_style),
        Span::styled(" ", base),
        Span::styled(
            fit_to_width(&format!(" {}", c.status), STATUS_W),
            base.fg(app.theme.status_color(&c.status)),
        ),
        Span::styled(" ", base),
        Span::styled(pad_left(&parent, PARENT_W), base.fg(app.theme.dim)),
    ];

    // Fill the rest of the row so the highlight spans the full width
    let used: usize = MARK_W + POS_W + ID_W + name_w + SORT_W + STATUS_W + PARENT_W + 5;
    if used < width {
        spans.push(Span::styled(" ".repeat(width - used), base));
    }
    Line::from(spans)
}
