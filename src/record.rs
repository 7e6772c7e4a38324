use std::cmp::Ordering;
use std::fmt;

/// A single scalar cell value. Dates travel as ISO `YYYY-MM-DD` text,
/// which compares and exports correctly without a dedicated variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Number(f64),
    Empty,
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Ordering used by the table engine: empty cells sort first, numbers
    /// numerically, text case-insensitively. Mixed number/text falls back
    /// to the stringified form so a sort never panics on heterogeneous rows.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Empty, Value::Empty) => Ordering::Equal,
            (Value::Empty, _) => Ordering::Less,
            (_, Value::Empty) => Ordering::Greater,
            (Value::Number(a), Value::Number(b)) => a.total_cmp(b),
            (Value::Text(a), Value::Text(b)) => {
                a.to_lowercase().cmp(&b.to_lowercase())
            }
            (a, b) => a.to_string().to_lowercase().cmp(&b.to_string().to_lowercase()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{n}")
                }
            }
            Value::Empty => Ok(()),
        }
    }
}

/// A flat row the engine can filter, sort, search, and project without
/// knowing its concrete type. Missing fields yield `Value::Empty` so a
/// projection over heterogeneous records degrades to blank cells.
pub trait Record {
    /// Stable row identity, used for expansion tracking.
    fn key(&self) -> String;

    /// Look up one field by name.
    fn field(&self, name: &str) -> Value;

    /// Names of the fields that participate in search-all-fields.
    fn field_names(&self) -> &'static [&'static str];

    /// Case-insensitive substring match across every named field.
    fn matches_search(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        let q = query.to_lowercase();
        self.field_names()
            .iter()
            .any(|name| self.field(name).to_string().to_lowercase().contains(&q))
    }
}
