use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::model::category::{Category, SortEntry};
use crate::ops::listing::{Page, lookup};
use crate::ops::reorder::{MoveOutcome, ScopeFilter};
use crate::util::unicode::{display_width, fit_to_width, pad_left};

/// Widest a table column may grow before values are truncated
const MAX_COLUMN_WIDTH: usize = 36;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct CategoryRowJson {
    pub position: usize,
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
    pub sort: Option<i64>,
    pub status: String,
}

#[derive(Serialize)]
pub struct CategoryViewJson {
    pub scope: String,
    pub categories: Vec<CategoryRowJson>,
}

#[derive(Serialize)]
pub struct MoveJson {
    pub id: i64,
    pub over: i64,
    /// unchanged, assigned or renumbered
    pub outcome: &'static str,
    pub saved: bool,
    pub changes: Vec<SortEntry>,
    pub order: Vec<CategoryRowJson>,
}

#[derive(Serialize)]
pub struct ExportJson {
    pub rows: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn category_rows(view: &[&Category]) -> Vec<CategoryRowJson> {
    view.iter()
        .enumerate()
        .map(|(i, c)| CategoryRowJson {
            position: i + 1,
            id: c.id,
            name: c.name.clone(),
            parent_id: c.parent_id,
            sort: c.sort.value(),
            status: c.status.clone(),
        })
        .collect()
}

pub fn outcome_name(outcome: MoveOutcome) -> &'static str {
    match outcome {
        MoveOutcome::Unchanged => "unchanged",
        MoveOutcome::Assigned { .. } => "assigned",
        MoveOutcome::Renumbered { .. } => "renumbered",
    }
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// `  3. [12] 吐司  sort 30` with an inactive marker
pub fn format_category_line(position: usize, category: &Category, indent: usize) -> String {
    let inactive = if category.is_active() {
        String::new()
    } else {
        format!(" ({})", category.status)
    };
    format!(
        "{}{:>3}. [{}] {}  sort {}{}",
        "  ".repeat(indent),
        position,
        category.id,
        category.name,
        category.sort,
        inactive
    )
}

/// Flat listing of a scoped view
pub fn format_category_view(view: &[&Category], scope: ScopeFilter) -> Vec<String> {
    let mut lines = vec![format!("== categories ({}) ==", scope), String::new()];
    if view.is_empty() {
        lines.push("(none)".to_string());
    }
    for (i, c) in view.iter().enumerate() {
        lines.push(format_category_line(i + 1, c, 0));
    }
    lines
}

/// Unscoped listing: each top-level category followed by its children.
/// `ordered` must already be in display order.
pub fn format_category_tree(ordered: &[&Category]) -> Vec<String> {
    let mut groups: IndexMap<i64, Vec<&Category>> = IndexMap::new();
    let mut orphans: Vec<&Category> = Vec::new();

    for c in ordered.iter().filter(|c| c.is_top_level()) {
        groups.insert(c.id, Vec::new());
    }
    for c in ordered.iter().filter(|c| !c.is_top_level()) {
        match c.parent_id.and_then(|p| groups.get_mut(&p)) {
            Some(children) => children.push(c),
            None => orphans.push(c),
        }
    }

    let mut lines = vec!["== categories ==".to_string(), String::new()];
    let top: Vec<&&Category> = ordered.iter().filter(|c| c.is_top_level()).collect();
    for (i, parent) in top.iter().enumerate() {
        lines.push(format_category_line(i + 1, parent, 0));
        if let Some(children) = groups.get(&parent.id) {
            for (j, child) in children.iter().enumerate() {
                lines.push(format_category_line(j + 1, child, 2));
            }
        }
    }
    if !orphans.is_empty() {
        lines.push(String::new());
        lines.push("-- Missing parent --".to_string());
        for (i, c) in orphans.iter().enumerate() {
            lines.push(format_category_line(i + 1, c, 0));
        }
    }
    lines
}

pub fn format_move_summary(id: i64, over: i64, outcome: MoveOutcome) -> String {
    match outcome {
        MoveOutcome::Unchanged => format!("{} is already at {}'s position; nothing to do", id, over),
        MoveOutcome::Assigned { id, sort } => format!("moved {} (sort {})", id, sort),
        MoveOutcome::Renumbered { count } => {
            format!("moved {}; renumbered {} categories in scope", id, count)
        }
    }
}

// ---------------------------------------------------------------------------
// Generic records
// ---------------------------------------------------------------------------

/// Render a JSON value as a single table cell
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.replace(['\n', '\r'], " "),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => format!("[{} items]", items.len()),
        Value::Object(_) => "{…}".to_string(),
    }
}

/// Columns to show: the preferred ones present in the data, else the first
/// record's scalar keys
pub fn pick_columns(records: &[Value], preferred: &[&str]) -> Vec<String> {
    let present: Vec<String> = preferred
        .iter()
        .filter(|c| records.iter().any(|r| lookup(r, c).is_some()))
        .map(|c| c.to_string())
        .collect();
    if !present.is_empty() {
        return present;
    }
    match records.first() {
        Some(Value::Object(map)) => map
            .iter()
            .filter(|(_, v)| !v.is_object() && !v.is_array())
            .map(|(k, _)| k.clone())
            .take(6)
            .collect(),
        _ => Vec::new(),
    }
}

/// Aligned text table. Numeric cells are right-aligned.
pub fn format_table(records: &[Value], columns: &[String]) -> Vec<String> {
    let cells: Vec<Vec<(String, bool)>> = records
        .iter()
        .map(|r| {
            columns
                .iter()
                .map(|c| {
                    let v = lookup(r, c);
                    let numeric = matches!(v, Some(Value::Number(_)));
                    (v.map(format_value).unwrap_or_default(), numeric)
                })
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            cells
                .iter()
                .map(|row| display_width(&row[i].0))
                .chain(std::iter::once(display_width(c)))
                .max()
                .unwrap_or(0)
                .min(MAX_COLUMN_WIDTH)
        })
        .collect();

    let mut lines = Vec::with_capacity(records.len() + 2);
    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| fit_to_width(c, *w))
        .collect();
    lines.push(header.join("  ").trim_end().to_string());
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in cells {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|((text, numeric), w)| {
                if *numeric {
                    pad_left(text, *w)
                } else {
                    fit_to_width(text, *w)
                }
            })
            .collect();
        lines.push(line.join("  ").trim_end().to_string());
    }
    lines
}

pub fn format_page_footer<T>(page: &Page<T>) -> String {
    format!(
        "page {}/{} ({} matching)",
        page.page, page.total_pages, page.total
    )
}

/// `key: value` lines for a single record; nested values as compact JSON
pub fn format_record_detail(record: &Value) -> Vec<String> {
    match record {
        Value::Object(map) => {
            let key_width = map.keys().map(|k| display_width(k)).max().unwrap_or(0);
            map.iter()
                .map(|(k, v)| {
                    let text = match v {
                        Value::Object(_) | Value::Array(_) => v.to_string(),
                        other => format_value(other),
                    };
                    format!("{}  {}", fit_to_width(k, key_width), text)
                        .trim_end()
                        .to_string()
                })
                .collect()
        }
        other => vec![format_value(other)],
    }
}
