use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use super::{flexible_f64, null_to_default};

/// A storefront order with its line items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    #[serde(default, alias = "orderNumber", deserialize_with = "null_to_default")]
    pub order_number: String,
    /// Raw timestamp as sent by the backend
    #[serde(default, alias = "createdAt", deserialize_with = "null_to_default")]
    pub created_at: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub status: String,
    #[serde(default, alias = "paymentStatus", deserialize_with = "null_to_default")]
    pub payment_status: String,
    #[serde(default, alias = "paymentMethod", deserialize_with = "null_to_default")]
    pub payment_method: String,
    #[serde(default, alias = "shippingMethod", deserialize_with = "null_to_default")]
    pub shipping_method: String,
    #[serde(default, alias = "customerName", deserialize_with = "null_to_default")]
    pub customer_name: String,
    #[serde(default, alias = "customerPhone", deserialize_with = "null_to_default")]
    pub customer_phone: String,
    #[serde(default, alias = "customerEmail", deserialize_with = "null_to_default")]
    pub customer_email: String,
    #[serde(default, alias = "shippingAddress", deserialize_with = "null_to_default")]
    pub shipping_address: String,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub subtotal: Option<f64>,
    #[serde(default, alias = "shippingFee", deserialize_with = "flexible_f64")]
    pub shipping_fee: Option<f64>,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub discount: Option<f64>,
    #[serde(default, alias = "totalAmount", deserialize_with = "flexible_f64")]
    pub total_amount: Option<f64>,
    #[serde(default, alias = "couponCode")]
    pub coupon_code: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default, alias = "orderItems", deserialize_with = "null_to_default")]
    pub items: Vec<OrderItem>,
}

/// A single product line of an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(default, alias = "productId")]
    pub product_id: Option<i64>,
    #[serde(default, alias = "productName", deserialize_with = "null_to_default")]
    pub product_name: String,
    /// Spec or flavour chosen by the customer
    #[serde(default, alias = "spec")]
    pub variant: Option<String>,
    #[serde(default, deserialize_with = "flexible_u32")]
    pub quantity: u32,
    #[serde(default, alias = "unitPrice", alias = "price", deserialize_with = "flexible_f64")]
    pub unit_price: Option<f64>,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub subtotal: Option<f64>,
}

impl OrderItem {
    /// Line subtotal, computed from quantity and unit price when not supplied
    pub fn line_total(&self) -> f64 {
        self.subtotal
            .unwrap_or_else(|| self.quantity as f64 * self.unit_price.unwrap_or(0.0))
    }
}

impl Order {
    /// Calendar date of `created_at`, if it parses in one of the formats the
    /// backend is known to emit.
    pub fn created_date(&self) -> Option<NaiveDate> {
        parse_backend_date(&self.created_at)
    }

    /// Order total, falling back to items + shipping - discount
    pub fn total(&self) -> f64 {
        self.total_amount.unwrap_or_else(|| {
            let items: f64 = self.items.iter().map(OrderItem::line_total).sum();
            items + self.shipping_fee.unwrap_or(0.0) - self.discount.unwrap_or(0.0)
        })
    }
}

/// Parse an RFC 3339, `YYYY-MM-DD HH:MM:SS` or bare `YYYY-MM-DD` timestamp
pub fn parse_backend_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y/%m/%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y/%m/%d"))
        .ok()
}

fn flexible_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let n = flexible_f64(deserializer)?.unwrap_or(0.0);
    if n < 0.0 {
        return Err(serde::de::Error::custom(format!("negative quantity: {}", n)));
    }
    Ok(n as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_decimal_strings_and_camel_case() {
        let order: Order = serde_json::from_str(
            r#"{
                "id": 42,
                "orderNumber": "B20240501001",
                "createdAt": "2024-05-01T09:30:00+08:00",
                "status": "pending",
                "totalAmount": "480.00",
                "shippingFee": 80,
                "items": [
                    {"productName": "紅豆麵包", "quantity": "2", "price": "45.5"},
                    {"productName": "蜂蜜蛋糕", "quantity": 1, "unitPrice": 300, "spec": "6吋"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(order.order_number, "B20240501001");
        assert_eq!(order.total_amount, Some(480.0));
        assert_eq!(order.shipping_fee, Some(80.0));
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].quantity, 2);
        assert_eq!(order.items[0].line_total(), 91.0);
        assert_eq!(order.items[1].variant.as_deref(), Some("6吋"));
        assert_eq!(
            order.created_date(),
            NaiveDate::from_ymd_opt(2024, 5, 1)
        );
    }

    #[test]
    fn null_items_and_missing_money_default() {
        let order: Order =
            serde_json::from_str(r#"{"id": 1, "items": null, "discount": null}"#).unwrap();
        assert!(order.items.is_empty());
        assert_eq!(order.discount, None);
        assert_eq!(order.total(), 0.0);
    }

    #[test]
    fn total_falls_back_to_line_items() {
        let order: Order = serde_json::from_str(
            r#"{"id": 1, "shipping_fee": 60, "discount": 10,
                "items": [{"product_name": "司康", "quantity": 3, "unit_price": 40}]}"#,
        )
        .unwrap();
        assert_eq!(order.total(), 170.0);
    }

    #[test]
    fn parses_backend_date_formats() {
        let may_first = NaiveDate::from_ymd_opt(2024, 5, 1);
        assert_eq!(parse_backend_date("2024-05-01 18:00:00"), may_first);
        assert_eq!(parse_backend_date("2024-05-01T18:00:00.000Z"), may_first);
        assert_eq!(parse_backend_date("2024-05-01"), may_first);
        assert_eq!(parse_backend_date("2024/05/01"), may_first);
        assert_eq!(parse_backend_date(""), None);
        assert_eq!(parse_backend_date("yesterday"), None);
    }
}
