use std::collections::{HashMap, HashSet};

use chrono::{Datelike, Duration, NaiveDate};

use crate::dates::{end_of_month, parse_iso, start_of_month, DateRange};
use crate::error::{Result, ScopeError};
use crate::models::{Order, OrderStatus};

/// KPI scalars over one record collection. Recomputed from scratch on
/// every filter change — collections are bounded to a few thousand rows,
/// so there is no incremental caching.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub total_revenue: f64,
    pub order_count: usize,
    pub distinct_dealers: usize,
    /// Share of delivered orders, in percent. 0 for an empty collection.
    pub delivery_rate: f64,
}

pub fn aggregate(records: &[Order]) -> Aggregate {
    let total_revenue: f64 = records.iter().map(|o| o.net_amount).sum();
    let distinct_dealers = records
        .iter()
        .map(|o| o.dealer_id)
        .collect::<HashSet<_>>()
        .len();
    let delivered = records
        .iter()
        .filter(|o| OrderStatus::Delivered.matches(&o.status))
        .count();
    let delivery_rate = if records.is_empty() {
        0.0
    } else {
        delivered as f64 / records.len() as f64 * 100.0
    };
    Aggregate {
        total_revenue,
        order_count: records.len(),
        distinct_dealers,
        delivery_rate,
    }
}

/// Percent change of `current` against `previous`. `None` when there is no
/// base to compare against, so callers render "no prior data" instead of a
/// division artifact.
pub fn percent_change(current: f64, previous: f64) -> Option<f64> {
    if previous == 0.0 {
        None
    } else {
        Some((current - previous) / previous * 100.0)
    }
}

/// Calendar grouping unit for the chart series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Day,
    Week,
    Month,
}

impl GroupBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupBy::Day => "day",
            GroupBy::Week => "week",
            GroupBy::Month => "month",
        }
    }

    /// Accepts both the unit name and its adverb form (`daily`, `weekly`…).
    pub fn parse(s: &str) -> Result<GroupBy> {
        match s.trim().to_lowercase().as_str() {
            "day" | "daily" => Ok(GroupBy::Day),
            "week" | "weekly" => Ok(GroupBy::Week),
            "month" | "monthly" => Ok(GroupBy::Month),
            other => Err(ScopeError::Other(format!("unknown grouping: {other}"))),
        }
    }

    /// First day of the unit containing `d` (ISO weeks start on Monday).
    fn unit_start(&self, d: NaiveDate) -> NaiveDate {
        match self {
            GroupBy::Day => d,
            GroupBy::Week => d - Duration::days(d.weekday().num_days_from_monday() as i64),
            GroupBy::Month => start_of_month(d),
        }
    }

    fn next_start(&self, start: NaiveDate) -> NaiveDate {
        match self {
            GroupBy::Day => start + Duration::days(1),
            GroupBy::Week => start + Duration::days(7),
            GroupBy::Month => end_of_month(start) + Duration::days(1),
        }
    }

    fn label(&self, start: NaiveDate) -> String {
        match self {
            GroupBy::Day => start.format("%Y-%m-%d").to_string(),
            GroupBy::Week => {
                let iso = start.iso_week();
                format!("{}-W{:02}", iso.year(), iso.week())
            }
            GroupBy::Month => start.format("%Y-%m").to_string(),
        }
    }
}

/// One point of the grouped time series.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeBucket {
    pub label: String,
    pub start: NaiveDate,
    pub revenue: f64,
    pub orders: u64,
    pub dealers: usize,
}

/// Group records into calendar buckets spanning the *requested* range, not
/// just the observed data: units with no matching records still appear with
/// zero sums, in ascending chronological order regardless of input order.
pub fn bucketize(records: &[Order], range: DateRange, unit: GroupBy) -> Vec<TimeBucket> {
    if range.is_empty() {
        return Vec::new();
    }

    let mut buckets = Vec::new();
    let mut index = HashMap::new();
    let mut dealer_sets: Vec<HashSet<i64>> = Vec::new();
    let mut start = unit.unit_start(range.from);
    while start <= range.to {
        index.insert(start, buckets.len());
        buckets.push(TimeBucket {
            label: unit.label(start),
            start,
            revenue: 0.0,
            orders: 0,
            dealers: 0,
        });
        dealer_sets.push(HashSet::new());
        start = unit.next_start(start);
    }

    for order in records {
        let Some(date) = parse_iso(&order.order_date) else {
            continue;
        };
        if !range.contains(date) {
            continue;
        }
        if let Some(&i) = index.get(&unit.unit_start(date)) {
            buckets[i].revenue += order.net_amount;
            buckets[i].orders += 1;
            dealer_sets[i].insert(order.dealer_id);
        }
    }
    for (bucket, dealers) in buckets.iter_mut().zip(dealer_sets) {
        bucket.dealers = dealers.len();
    }
    buckets
}
