//! Client-side filtering, sorting and pagination over fetched records.

use std::cmp::Ordering;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::model::category::Category;

/// Error type for listing operations
#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error("page size must be at least 1")]
    InvalidPageSize,
    #[error("page numbers start at 1")]
    InvalidPage,
}

/// Records that can be matched against a search pattern
pub trait Searchable {
    fn matches_search(&self, re: &Regex) -> bool;

    /// The record's status, if it has one
    fn status(&self) -> Option<&str>;
}

/// A comparable field value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    fn cmp_value(&self, other: &FieldValue) -> Ordering {
        match (self, other) {
            (FieldValue::Number(a), FieldValue::Number(b)) => a.total_cmp(b),
            (FieldValue::Number(_), FieldValue::Text(_)) => Ordering::Less,
            (FieldValue::Text(_), FieldValue::Number(_)) => Ordering::Greater,
            (FieldValue::Text(a), FieldValue::Text(b)) => a.cmp(b),
        }
    }
}

/// Records that expose named fields for sorting
pub trait Sortable {
    fn field_value(&self, field: &str) -> Option<FieldValue>;
}

/// What to show from a fetched list
#[derive(Debug, Clone)]
pub struct ListQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub sort_by: Option<String>,
    pub descending: bool,
    /// 1-based
    pub page: usize,
    pub per_page: usize,
}

impl Default for ListQuery {
    fn default() -> Self {
        ListQuery {
            search: None,
            status: None,
            sort_by: None,
            descending: false,
            page: 1,
            per_page: 20,
        }
    }
}

/// One page of a filtered, sorted list
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
}

/// Compile a case-insensitive search pattern. Invalid regexes are matched literally.
pub fn compile_search(pattern: &str) -> Option<Regex> {
    let pattern = pattern.trim();
    if pattern.is_empty() {
        return None;
    }
    Regex::new(&format!("(?i){}", pattern))
        .or_else(|_| Regex::new(&format!("(?i){}", regex::escape(pattern))))
        .ok()
}

/// Sort by `field`; records missing the field go last in either direction.
pub fn sort_by_field<T: Sortable>(items: &mut [T], field: &str, descending: bool) {
    items.sort_by(|a, b| match (a.field_value(field), b.field_value(field)) {
        (Some(x), Some(y)) => {
            let ord = x.cmp_value(&y);
            if descending { ord.reverse() } else { ord }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Filter, sort and paginate `items` according to `query`.
pub fn apply<T>(items: &[T], query: &ListQuery) -> Result<Page<T>, ListError>
where
    T: Searchable + Sortable + Clone,
{
    if query.per_page == 0 {
        return Err(ListError::InvalidPageSize);
    }
    if query.page == 0 {
        return Err(ListError::InvalidPage);
    }

    let search_re = query.search.as_deref().and_then(compile_search);
    let status = query
        .status
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let mut matched: Vec<T> = items
        .iter()
        .filter(|item| search_re.as_ref().is_none_or(|re| item.matches_search(re)))
        .filter(|item| {
            status.is_none_or(|wanted| {
                item.status()
                    .is_some_and(|s| s.eq_ignore_ascii_case(wanted))
            })
        })
        .cloned()
        .collect();

    if let Some(field) = query.sort_by.as_deref() {
        sort_by_field(&mut matched, field, query.descending);
    } else if query.descending {
        matched.reverse();
    }

    let total = matched.len();
    let total_pages = total.div_ceil(query.per_page).max(1);
    let page = query.page.min(total_pages);
    let start = (page - 1) * query.per_page;
    let items = matched
        .into_iter()
        .skip(start)
        .take(query.per_page)
        .collect();

    Ok(Page {
        items,
        page,
        per_page: query.per_page,
        total,
        total_pages,
    })
}

// ---------------------------------------------------------------------------
// JSON records
// ---------------------------------------------------------------------------

/// Look up a dotted path like `customer.name` in a JSON object
pub fn lookup<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(record, |node, key| node.get(key))
        .filter(|v| !v.is_null())
}

fn scalar_matches(value: &Value, re: &Regex) -> bool {
    match value {
        Value::String(s) => re.is_match(s),
        Value::Number(n) => re.is_match(&n.to_string()),
        Value::Array(items) => items.iter().any(|v| scalar_matches(v, re)),
        Value::Object(map) => map.values().any(|v| scalar_matches(v, re)),
        Value::Bool(_) | Value::Null => false,
    }
}

impl Searchable for Value {
    fn matches_search(&self, re: &Regex) -> bool {
        scalar_matches(self, re)
    }

    fn status(&self) -> Option<&str> {
        self.get("status").and_then(Value::as_str)
    }
}

impl Sortable for Value {
    fn field_value(&self, field: &str) -> Option<FieldValue> {
        match lookup(self, field)? {
            Value::Number(n) => n.as_f64().map(FieldValue::Number),
            Value::String(s) => Some(
                s.trim()
                    .parse::<f64>()
                    .map(FieldValue::Number)
                    .unwrap_or_else(|_| FieldValue::Text(s.to_lowercase())),
            ),
            Value::Bool(b) => Some(FieldValue::Text(b.to_string())),
            Value::Array(_) | Value::Object(_) | Value::Null => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

impl Searchable for Category {
    fn matches_search(&self, re: &Regex) -> bool {
        re.is_match(&self.name)
            || re.is_match(&self.id.to_string())
            || self.description.as_deref().is_some_and(|d| re.is_match(d))
    }

    fn status(&self) -> Option<&str> {
        Some(&self.status)
    }
}

impl Sortable for Category {
    fn field_value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "id" => Some(FieldValue::Number(self.id as f64)),
            "name" => Some(FieldValue::Text(self.name.to_lowercase())),
            "parent_id" => self.parent_id.map(|p| FieldValue::Number(p as f64)),
            "level" => Some(FieldValue::Number(self.level() as f64)),
            "sort" => self.sort.value().map(|s| FieldValue::Number(s as f64)),
            "status" => Some(FieldValue::Text(self.status.to_lowercase())),
            _ => None,
        }
    }
}
