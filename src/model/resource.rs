use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The admin collections exposed by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Categories,
    Commissions,
    Coupons,
    Customers,
    Orders,
    Products,
    Owners,
}

impl Resource {
    pub const ALL: [Resource; 7] = [
        Resource::Categories,
        Resource::Commissions,
        Resource::Coupons,
        Resource::Customers,
        Resource::Orders,
        Resource::Products,
        Resource::Owners,
    ];

    /// Collection name as used in URLs
    pub fn name(self) -> &'static str {
        match self {
            Resource::Categories => "categories",
            Resource::Commissions => "commissions",
            Resource::Coupons => "coupons",
            Resource::Customers => "customers",
            Resource::Orders => "orders",
            Resource::Products => "products",
            Resource::Owners => "owners",
        }
    }

    /// Collection endpoint, e.g. `/api/orders`
    pub fn path(self) -> String {
        format!("/api/{}", self.name())
    }

    /// Single-record endpoint, e.g. `/api/orders/42`.
    /// The id must be one plain path segment.
    pub fn item_path(self, id: &str) -> Result<String, InvalidRecordId> {
        let valid = !id.is_empty()
            && !id.chars().all(|c| c == '.')
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(InvalidRecordId(id.to_string()));
        }
        Ok(format!("/api/{}/{}", self.name(), id))
    }

    /// Columns shown by `bka list` when printing a table
    pub fn list_columns(self) -> &'static [&'static str] {
        match self {
            Resource::Categories => &["id", "name", "parent_id", "sort", "status"],
            Resource::Commissions => &["id", "owner_id", "rate", "amount", "status"],
            Resource::Coupons => &["id", "code", "discount", "expires_at", "status"],
            Resource::Customers => &["id", "name", "phone", "email", "status"],
            Resource::Orders => &["id", "order_number", "customer_name", "total_amount", "status"],
            Resource::Products => &["id", "name", "category_id", "price", "status"],
            Resource::Owners => &["id", "name", "email", "phone", "status"],
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown resource '{0}' (expected one of: categories, commissions, coupons, customers, orders, products, owners)")]
pub struct UnknownResource(pub String);

#[derive(Debug, thiserror::Error)]
#[error("invalid record id '{0}' (letters, digits, '-', '_' and '.' only)")]
pub struct InvalidRecordId(pub String);

impl FromStr for Resource {
    type Err = UnknownResource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let resource = match lower.as_str() {
            "categories" | "category" => Resource::Categories,
            "commissions" | "commission" => Resource::Commissions,
            "coupons" | "coupon" => Resource::Coupons,
            "customers" | "customer" => Resource::Customers,
            "orders" | "order" => Resource::Orders,
            "products" | "product" => Resource::Products,
            "owners" | "owner" | "salespeople" | "salesperson" => Resource::Owners,
            _ => return Err(UnknownResource(s.to_string())),
        };
        Ok(resource)
    }
}
