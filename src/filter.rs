use crate::dates::{parse_iso, DateRange};
use crate::models::{Order, OrderStatus};
use crate::record::Record;

/// The user-selected filter controls for the report pipeline. Predicates
/// are orthogonal: a record passes iff every active predicate passes.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    pub range: DateRange,
    pub search: String,
    pub status: Option<OrderStatus>,
    pub min_amount: Option<f64>,
}

impl FilterState {
    pub fn new(range: DateRange) -> Self {
        Self {
            range,
            search: String::new(),
            status: None,
            min_amount: None,
        }
    }

    /// Materialize the active predicates, in evaluation order. Adding a
    /// predicate to this list can only narrow the result set further.
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut preds = vec![Predicate::InRange(self.range)];
        if !self.search.is_empty() {
            preds.push(Predicate::Search(self.search.clone()));
        }
        if let Some(status) = self.status {
            preds.push(Predicate::Status(status));
        }
        if let Some(min) = self.min_amount {
            preds.push(Predicate::MinAmount(min));
        }
        preds
    }
}

/// One filter predicate over an order.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Order date falls inside the inclusive range. Unparseable dates fail.
    InRange(DateRange),
    /// Case-insensitive substring over every searchable field.
    Search(String),
    Status(OrderStatus),
    /// `net_amount >= threshold`.
    MinAmount(f64),
}

impl Predicate {
    pub fn matches(&self, order: &Order) -> bool {
        match self {
            Predicate::InRange(range) => match parse_iso(&order.order_date) {
                Some(d) => range.contains(d),
                None => false,
            },
            Predicate::Search(query) => order.matches_search(query),
            Predicate::Status(status) => status.matches(&order.status),
            Predicate::MinAmount(min) => order.net_amount >= *min,
        }
    }
}

/// Apply the filter state to a collection. Pure: keeps input order, never
/// fabricates or mutates records.
pub fn filter(records: &[Order], state: &FilterState) -> Vec<Order> {
    let preds = state.predicates();
    records
        .iter()
        .filter(|o| preds.iter().all(|p| p.matches(o)))
        .cloned()
        .collect()
}

/// The date-only slice used for aggregation over arbitrary sub-ranges
/// (current vs prior period).
pub fn date_slice(records: &[Order], range: DateRange) -> Vec<Order> {
    let pred = Predicate::InRange(range);
    records.iter().filter(|o| pred.matches(o)).cloned().collect()
}
