//! Spreadsheet export of orders.
//!
//! The `items` layout is the one the ERP import expects: one row per order
//! item, with the order columns repeated on every row. Order-level money
//! (shipping, discount, total) is written on the first row of each order only,
//! so summing a column in the spreadsheet does not double count.

use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::model::order::{Order, OrderItem};

/// Error type for export operations
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("delimiter must be a single ASCII character, got {0:?}")]
    InvalidDelimiter(char),
    #[error("invalid date range: {from} is after {to}")]
    InvalidDateRange { from: NaiveDate, to: NaiveDate },
    #[error("unknown export layout '{0}' (expected items or summary)")]
    UnknownLayout(String),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Row layout of an order export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportLayout {
    /// One row per order item
    #[default]
    Items,
    /// One row per order
    Summary,
}

impl FromStr for ExportLayout {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "items" | "item" | "erp" => Ok(ExportLayout::Items),
            "summary" | "orders" => Ok(ExportLayout::Summary),
            _ => Err(ExportError::UnknownLayout(s.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub layout: ExportLayout,
    /// Keep only orders with this status (case-insensitive)
    pub status: Option<String>,
    /// Inclusive range on the order's calendar date
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub delimiter: char,
    pub bom: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            layout: ExportLayout::Items,
            status: None,
            from: None,
            to: None,
            delimiter: ',',
            bom: true,
        }
    }
}

const ITEM_HEADERS: [&str; 17] = [
    "訂單編號",
    "訂單日期",
    "訂單狀態",
    "付款方式",
    "配送方式",
    "收件人",
    "電話",
    "Email",
    "地址",
    "商品名稱",
    "規格",
    "數量",
    "單價",
    "小計",
    "運費",
    "折扣",
    "訂單總額",
];

const SUMMARY_HEADERS: [&str; 12] = [
    "訂單編號",
    "訂單日期",
    "訂單狀態",
    "付款狀態",
    "付款方式",
    "收件人",
    "電話",
    "品項數",
    "商品明細",
    "運費",
    "折扣",
    "訂單總額",
];

/// Orders matching the status and date filters, oldest first
pub fn select_orders<'a>(
    orders: &'a [Order],
    opts: &ExportOptions,
) -> Result<Vec<&'a Order>, ExportError> {
    if let (Some(from), Some(to)) = (opts.from, opts.to)
        && from > to
    {
        return Err(ExportError::InvalidDateRange { from, to });
    }

    let ranged = opts.from.is_some() || opts.to.is_some();
    let status = opts.status.as_deref().map(str::trim).filter(|s| !s.is_empty());

    let mut selected: Vec<&Order> = orders
        .iter()
        .filter(|o| status.is_none_or(|s| o.status.eq_ignore_ascii_case(s)))
        .filter(|o| {
            if !ranged {
                return true;
            }
            match o.created_date() {
                Some(d) => opts.from.is_none_or(|f| d >= f) && opts.to.is_none_or(|t| d <= t),
                None => false,
            }
        })
        .collect();

    selected.sort_by(|a, b| {
        let (da, db) = (a.created_date(), b.created_date());
        match (da, db) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        }
        .then_with(|| a.order_number.cmp(&b.order_number))
    });
    Ok(selected)
}

/// Write the export as CSV to `out`. Returns the number of data rows written.
pub fn write_orders<W: Write>(
    orders: &[Order],
    opts: &ExportOptions,
    mut out: W,
) -> Result<usize, ExportError> {
    if !opts.delimiter.is_ascii() {
        return Err(ExportError::InvalidDelimiter(opts.delimiter));
    }
    let selected = select_orders(orders, opts)?;

    if opts.bom {
        out.write_all("\u{FEFF}".as_bytes())?;
    }
    let mut writer = csv::WriterBuilder::new()
        .delimiter(opts.delimiter as u8)
        .from_writer(out);

    let mut rows = 0;
    match opts.layout {
        ExportLayout::Items => {
            writer.write_record(ITEM_HEADERS)?;
            for order in selected {
                for record in item_rows(order) {
                    writer.write_record(&record)?;
                    rows += 1;
                }
            }
        }
        ExportLayout::Summary => {
            writer.write_record(SUMMARY_HEADERS)?;
            for order in selected {
                writer.write_record(summary_row(order))?;
                rows += 1;
            }
        }
    }
    writer.flush()?;
    Ok(rows)
}

/// Write the export to `path` through a temp file in the same directory.
pub fn export_to_path(
    orders: &[Order],
    opts: &ExportOptions,
    path: &Path,
) -> Result<usize, ExportError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    let rows = write_orders(orders, opts, tmp.as_file_mut())?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(rows)
}

fn order_date(order: &Order) -> String {
    order
        .created_date()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| order.created_at.clone())
}

fn item_rows(order: &Order) -> Vec<Vec<String>> {
    let head = [
        order.order_number.clone(),
        order_date(order),
        order.status.clone(),
        order.payment_method.clone(),
        order.shipping_method.clone(),
        order.customer_name.clone(),
        order.customer_phone.clone(),
        order.customer_email.clone(),
        order.shipping_address.clone(),
    ];
    let money = [
        format_money(order.shipping_fee.unwrap_or(0.0)),
        format_money(order.discount.unwrap_or(0.0)),
        format_money(order.total()),
    ];

    if order.items.is_empty() {
        let mut row: Vec<String> = head.to_vec();
        row.extend(std::iter::repeat_n(String::new(), 5));
        row.extend(money);
        return vec![row];
    }

    order
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let mut row: Vec<String> = head.to_vec();
            row.push(item.product_name.clone());
            row.push(item.variant.clone().unwrap_or_default());
            row.push(item.quantity.to_string());
            row.push(item.unit_price.map(format_money).unwrap_or_default());
            row.push(format_money(item.line_total()));
            if i == 0 {
                row.extend(money.iter().cloned());
            } else {
                row.extend(std::iter::repeat_n(String::new(), 3));
            }
            row
        })
        .collect()
}

fn summary_row(order: &Order) -> Vec<String> {
    vec![
        order.order_number.clone(),
        order_date(order),
        order.status.clone(),
        order.payment_status.clone(),
        order.payment_method.clone(),
        order.customer_name.clone(),
        order.customer_phone.clone(),
        order.items.len().to_string(),
        order
            .items
            .iter()
            .map(describe_item)
            .collect::<Vec<_>>()
            .join("; "),
        format_money(order.shipping_fee.unwrap_or(0.0)),
        format_money(order.discount.unwrap_or(0.0)),
        format_money(order.total()),
    ]
}

fn describe_item(item: &OrderItem) -> String {
    match item.variant.as_deref().filter(|v| !v.is_empty()) {
        Some(v) => format!("{}({}) ×{}", item.product_name, v, item.quantity),
        None => format!("{} ×{}", item.product_name, item.quantity),
    }
}

/// Whole amounts without decimals, everything else with two
pub fn format_money(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{:.2}", v)
    }
}
