pub mod demo;
pub mod export;
pub mod init;
pub mod report;
pub mod status;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::dates::{parse_iso_arg, DatePreset, DateRange};
use crate::error::{Result, ScopeError};

/// Shared date-window arguments. A named preset and an explicit from/to
/// pair are alternatives; explicit bounds must come as a pair.
#[derive(Args, Debug, Clone, Default)]
pub struct RangeArgs {
    /// Named range: this_month, last_month, last_3_months, last_6_months, this_year
    #[arg(long)]
    pub range: Option<String>,
    /// Start date: YYYY-MM-DD
    #[arg(long = "from")]
    pub from_date: Option<String>,
    /// End date: YYYY-MM-DD
    #[arg(long = "to")]
    pub to_date: Option<String>,
}

impl RangeArgs {
    /// Resolve to a concrete range, defaulting to the current month.
    pub fn resolve(&self, today: NaiveDate) -> Result<DateRange> {
        match (&self.from_date, &self.to_date) {
            (Some(from), Some(to)) => {
                return Ok(DateRange::new(parse_iso_arg(from)?, parse_iso_arg(to)?));
            }
            (Some(_), None) => {
                return Err(ScopeError::Other(
                    "--from requires --to (both date boundaries must be specified)".to_string(),
                ));
            }
            (None, Some(_)) => {
                return Err(ScopeError::Other(
                    "--to requires --from (both date boundaries must be specified)".to_string(),
                ));
            }
            (None, None) => {}
        }
        match &self.range {
            Some(name) => Ok(DatePreset::parse(name)?.range(today)),
            None => Ok(DatePreset::ThisMonth.range(today)),
        }
    }
}

#[derive(Parser)]
#[command(name = "salescope", about = "Sales reporting and export CLI for dealer order books.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up salescope: choose a data directory and initialize the database.
    Init {
        /// Path for salescope data (default: ~/Documents/salescope)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Company name printed on report headers
        #[arg(long)]
        company: Option<String>,
    },
    /// Load deterministic sample dealers, orders, and line items.
    Demo,
    /// Generate reports.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Export the current view to CSV, spreadsheet, or PDF.
    Export {
        /// Which view to export: orders or dealers
        #[arg(long, default_value = "orders")]
        view: String,
        /// Output format: csv, excel, pdf
        #[arg(long, default_value = "csv")]
        format: String,
        #[command(flatten)]
        range: RangeArgs,
        /// Search text applied before exporting (orders view)
        #[arg(long)]
        search: Option<String>,
        /// Status filter: pending, processing, shipped, delivered, cancelled
        #[arg(long)]
        status: Option<String>,
        /// Filename base
        #[arg(long, default_value = "sales_report")]
        name: String,
        /// Output file path (default: <data_dir>/exports/<name>-<date>.<ext>)
        #[arg(long)]
        output: Option<String>,
    },
    /// Show the active data directory and row counts.
    Status,
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// KPI summary with a grouped revenue/orders series.
    Summary {
        #[command(flatten)]
        range: RangeArgs,
        /// Chart grouping: day, week, month
        #[arg(long = "group-by", default_value = "month")]
        group_by: String,
    },
    /// Top dealers by sales in the selected window.
    Dealers {
        #[command(flatten)]
        range: RangeArgs,
        /// Case-insensitive dealer name search
        #[arg(long)]
        search: Option<String>,
        /// Minimum total sales threshold
        #[arg(long = "min-sales")]
        min_sales: Option<f64>,
        /// How many dealers to show
        #[arg(long, default_value = "10")]
        limit: usize,
    },
    /// Order register, paginated, most recent first.
    Orders {
        #[command(flatten)]
        range: RangeArgs,
        /// Case-insensitive search over all order fields
        #[arg(long)]
        search: Option<String>,
        /// Status filter: pending, processing, shipped, delivered, cancelled
        #[arg(long)]
        status: Option<String>,
        /// Only orders of this dealer (drill-down)
        #[arg(long)]
        dealer: Option<String>,
        /// Page number, 1-based
        #[arg(long, default_value = "1")]
        page: usize,
        /// Rows per page
        #[arg(long = "page-size", default_value = "10")]
        page_size: usize,
        /// Sort column (order_date, net_amount, dealer_name, status, ...)
        #[arg(long)]
        sort: Option<String>,
        /// Sort descending instead of ascending
        #[arg(long)]
        desc: bool,
        /// Expand these orders inline with their line items (repeatable)
        #[arg(long)]
        expand: Vec<String>,
    },
    /// Line items of one order (drill-down).
    Items {
        /// Order number, e.g. ORD-00012
        order: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        parse_iso_arg(s).unwrap()
    }

    #[test]
    fn test_resolve_defaults_to_this_month() {
        let args = RangeArgs::default();
        let r = args.resolve(d("2025-06-15")).unwrap();
        assert_eq!(r.from, d("2025-06-01"));
        assert_eq!(r.to, d("2025-06-30"));
    }

    #[test]
    fn test_resolve_explicit_pair_wins_over_preset() {
        let args = RangeArgs {
            range: Some("last_month".into()),
            from_date: Some("2025-01-01".into()),
            to_date: Some("2025-01-31".into()),
        };
        let r = args.resolve(d("2025-06-15")).unwrap();
        assert_eq!(r.from, d("2025-01-01"));
        assert_eq!(r.to, d("2025-01-31"));
    }

    #[test]
    fn test_resolve_rejects_half_open_bounds() {
        let args = RangeArgs {
            range: None,
            from_date: Some("2025-01-01".into()),
            to_date: None,
        };
        let err = args.resolve(d("2025-06-15")).unwrap_err().to_string();
        assert!(err.contains("--from requires --to"), "got: {err}");

        let args = RangeArgs {
            range: None,
            from_date: None,
            to_date: Some("2025-12-31".into()),
        };
        let err = args.resolve(d("2025-06-15")).unwrap_err().to_string();
        assert!(err.contains("--to requires --from"), "got: {err}");
    }

    #[test]
    fn test_resolve_rejects_bad_dates_and_presets() {
        let args = RangeArgs {
            range: Some("fortnight".into()),
            ..Default::default()
        };
        assert!(args.resolve(d("2025-06-15")).is_err());

        let args = RangeArgs {
            range: None,
            from_date: Some("01/02/2025".into()),
            to_date: Some("2025-02-28".into()),
        };
        assert!(args.resolve(d("2025-06-15")).is_err());
    }
}
