use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::{flexible_f64, null_to_default};

/// Relative display position of a category among its siblings.
///
/// The backend stores this as a nullable number, sometimes sent as a decimal
/// string. Floats are floored on the way in; every key this client computes
/// is an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(into = "Option<i64>")]
pub enum SortKey {
    #[default]
    Unset,
    Value(i64),
}

impl SortKey {
    pub fn value(self) -> Option<i64> {
        match self {
            SortKey::Unset => None,
            SortKey::Value(v) => Some(v),
        }
    }

    /// The key, or `fallback` when unset
    pub fn or(self, fallback: i64) -> i64 {
        self.value().unwrap_or(fallback)
    }

    pub fn is_set(self) -> bool {
        matches!(self, SortKey::Value(_))
    }
}

impl From<Option<f64>> for SortKey {
    fn from(raw: Option<f64>) -> Self {
        match raw {
            Some(v) if v.is_finite() => SortKey::Value(v.floor() as i64),
            _ => SortKey::Unset,
        }
    }
}

impl<'de> Deserialize<'de> for SortKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        flexible_f64(deserializer).map(SortKey::from)
    }
}

impl From<SortKey> for Option<i64> {
    fn from(key: SortKey) -> Self {
        key.value()
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::Unset => write!(f, "-"),
            SortKey::Value(v) => write!(f, "{}", v),
        }
    }
}

/// A product category as served by `/api/categories`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    #[serde(default, deserialize_with = "null_to_default")]
    pub name: String,
    /// Parent category, `None` for top-level categories
    #[serde(default, alias = "parentId")]
    pub parent_id: Option<i64>,
    /// 1 (top-level) or 2 (child). Informational only.
    #[serde(default)]
    pub level: Option<u8>,
    #[serde(default)]
    pub sort: SortKey,
    #[serde(default, deserialize_with = "null_to_default")]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, alias = "imageUrl", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Category {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Category {
            id,
            name: name.into(),
            parent_id: None,
            level: None,
            sort: SortKey::Unset,
            status: "active".to_string(),
            description: None,
            image_url: None,
        }
    }

    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Declared level, or inferred from the parent link when the backend omits it
    pub fn level(&self) -> u8 {
        self.level
            .unwrap_or(if self.parent_id.is_some() { 2 } else { 1 })
    }

    pub fn is_active(&self) -> bool {
        self.status.eq_ignore_ascii_case("active")
    }
}

/// One `{id, sort}` pair of the batch sort update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortEntry {
    pub id: i64,
    pub sort: i64,
}

/// Body of `PUT /api/categories/sort`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortUpdate {
    #[serde(rename = "sortData")]
    pub sort_data: Vec<SortEntry>,
}
