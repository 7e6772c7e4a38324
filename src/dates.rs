use chrono::{Datelike, Duration, NaiveDate};

use crate::error::{Result, ScopeError};

/// Parse an ISO `YYYY-MM-DD` date. All dates crossing the engine boundary
/// use this format.
pub fn parse_iso(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// Like `parse_iso`, but for user-supplied CLI input where a bad date is
/// an error, not a silently excluded record.
pub fn parse_iso_arg(s: &str) -> Result<NaiveDate> {
    parse_iso(s).ok_or_else(|| ScopeError::InvalidDate(s.to_string()))
}

pub fn start_of_month(d: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(d.year(), d.month(), 1).unwrap_or(d)
}

pub fn end_of_month(d: NaiveDate) -> NaiveDate {
    let (y, m) = if d.month() == 12 {
        (d.year() + 1, 1)
    } else {
        (d.year(), d.month() + 1)
    };
    NaiveDate::from_ymd_opt(y, m, 1)
        .and_then(|first| first.pred_opt())
        .unwrap_or(d)
}

/// Step back `n` calendar months, clamping the day to the target month's
/// length (Mar 31 - 1 month = Feb 28/29).
pub fn sub_months(d: NaiveDate, n: u32) -> NaiveDate {
    let total = d.year() * 12 + d.month() as i32 - 1 - n as i32;
    let year = total.div_euclid(12);
    let month = (total.rem_euclid(12) + 1) as u32;
    let last = end_of_month(NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(d)).day();
    NaiveDate::from_ymd_opt(year, month, d.day().min(last)).unwrap_or(d)
}

/// An inclusive calendar date range. An inverted range (`from > to`) is
/// legal and simply matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    pub fn is_empty(&self) -> bool {
        self.from > self.to
    }

    pub fn contains(&self, d: NaiveDate) -> bool {
        d >= self.from && d <= self.to
    }

    /// Inclusive length in days; 0 for an inverted range.
    pub fn len_days(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            (self.to - self.from).num_days() + 1
        }
    }

    /// The adjacent range of equal length ending the day before `from`.
    /// This is the comparison window for "vs last period" deltas.
    pub fn previous_period(&self) -> DateRange {
        let len = self.len_days().max(1);
        let to = self.from - Duration::days(1);
        let from = self.from - Duration::days(len);
        DateRange { from, to }
    }

    pub fn label(&self) -> String {
        format!("{} to {}", self.from.format("%Y-%m-%d"), self.to.format("%Y-%m-%d"))
    }
}

/// Named date range presets offered by the report filters. All of them are
/// pure functions of the supplied "today", so tests pin the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePreset {
    ThisMonth,
    LastMonth,
    Last3Months,
    Last6Months,
    ThisYear,
}

impl DatePreset {
    pub const ALL: &'static [DatePreset] = &[
        DatePreset::ThisMonth,
        DatePreset::LastMonth,
        DatePreset::Last3Months,
        DatePreset::Last6Months,
        DatePreset::ThisYear,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DatePreset::ThisMonth => "this_month",
            DatePreset::LastMonth => "last_month",
            DatePreset::Last3Months => "last_3_months",
            DatePreset::Last6Months => "last_6_months",
            DatePreset::ThisYear => "this_year",
        }
    }

    pub fn parse(s: &str) -> Result<DatePreset> {
        let s = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or(ScopeError::UnknownPreset(s))
    }

    pub fn range(&self, today: NaiveDate) -> DateRange {
        match self {
            DatePreset::ThisMonth => {
                DateRange::new(start_of_month(today), end_of_month(today))
            }
            DatePreset::LastMonth => {
                let prev = sub_months(today, 1);
                DateRange::new(start_of_month(prev), end_of_month(prev))
            }
            DatePreset::Last3Months => DateRange::new(
                start_of_month(sub_months(today, 2)),
                end_of_month(today),
            ),
            DatePreset::Last6Months => DateRange::new(
                start_of_month(sub_months(today, 5)),
                end_of_month(today),
            ),
            DatePreset::ThisYear => DateRange::new(
                NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today),
                NaiveDate::from_ymd_opt(today.year(), 12, 31).unwrap_or(today),
            ),
        }
    }
}
