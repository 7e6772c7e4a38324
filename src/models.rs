use std::collections::BTreeMap;

use crate::record::{Record, Value};

/// Order lifecycle states as they appear on the wire. Orders keep the raw
/// string (external sources are stringly typed); the status *filter* parses
/// into this enum so unknown strings are rejected at the edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: &'static [OrderStatus] = &[
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<OrderStatus> {
        let s = s.trim().to_lowercase();
        Self::ALL.iter().copied().find(|st| st.as_str() == s)
    }

    /// True when `raw` names this status, ignoring case and padding.
    pub fn matches(&self, raw: &str) -> bool {
        raw.trim().eq_ignore_ascii_case(self.as_str())
    }
}

/// One transactional order row. Fixed typed fields cover everything the
/// filter/aggregate pipeline reads; `extra` is the open extension map for
/// report-specific columns so projections are not limited to this shape.
/// Immutable once fetched — the engine only derives views.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: i64,
    pub order_number: String,
    pub dealer_id: i64,
    pub dealer_name: String,
    /// ISO calendar date, `YYYY-MM-DD`.
    pub order_date: String,
    pub status: String,
    pub net_amount: f64,
    pub quantity: i64,
    pub region: String,
    pub description: String,
    pub extra: BTreeMap<String, Value>,
}

impl Record for Order {
    fn key(&self) -> String {
        self.order_number.clone()
    }

    fn field(&self, name: &str) -> Value {
        match name {
            "id" => Value::Number(self.id as f64),
            "order_number" => Value::text(&self.order_number),
            "dealer_id" => Value::Number(self.dealer_id as f64),
            "dealer_name" => Value::text(&self.dealer_name),
            "order_date" => Value::text(&self.order_date),
            "status" => Value::text(&self.status),
            "net_amount" => Value::Number(self.net_amount),
            "quantity" => Value::Number(self.quantity as f64),
            "region" => Value::text(&self.region),
            "description" => Value::text(&self.description),
            other => self.extra.get(other).cloned().unwrap_or(Value::Empty),
        }
    }

    fn field_names(&self) -> &'static [&'static str] {
        &[
            "order_number",
            "dealer_name",
            "order_date",
            "status",
            "net_amount",
            "quantity",
            "region",
            "description",
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dealer {
    pub id: i64,
    pub name: String,
    pub business_name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

/// One line item within an order — drill-down detail, fetched separately
/// from the main pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub total_price: f64,
}

impl Record for OrderItem {
    fn key(&self) -> String {
        self.id.to_string()
    }

    fn field(&self, name: &str) -> Value {
        match name {
            "product" => Value::text(&self.product),
            "quantity" => Value::Number(self.quantity as f64),
            "unit_price" => Value::Number(self.unit_price),
            "total_price" => Value::Number(self.total_price),
            _ => Value::Empty,
        }
    }

    fn field_names(&self) -> &'static [&'static str] {
        &["product", "quantity", "unit_price", "total_price"]
    }
}

/// Per-dealer rollup over the filtered order collection, the row type of
/// the top-dealers view.
#[derive(Debug, Clone, PartialEq)]
pub struct DealerSales {
    pub dealer_id: i64,
    pub name: String,
    pub business_name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub order_count: usize,
    pub total_sales: f64,
}

impl Record for DealerSales {
    fn key(&self) -> String {
        self.dealer_id.to_string()
    }

    fn field(&self, name: &str) -> Value {
        match name {
            "name" => Value::text(&self.name),
            "business_name" => match &self.business_name {
                Some(b) => Value::text(b),
                None => Value::Empty,
            },
            "city" => match &self.city {
                Some(c) => Value::text(c),
                None => Value::Empty,
            },
            "state" => match &self.state {
                Some(s) => Value::text(s),
                None => Value::Empty,
            },
            "order_count" => Value::Number(self.order_count as f64),
            "total_sales" => Value::Number(self.total_sales),
            _ => Value::Empty,
        }
    }

    fn field_names(&self) -> &'static [&'static str] {
        &["name", "business_name", "city", "state", "order_count", "total_sales"]
    }
}
