use std::path::PathBuf;

use crate::cli::RangeArgs;
use crate::db;
use crate::error::{Result, ScopeError};
use crate::export::{run_export, Column, ExportFormat, ExportNotify, ReportMeta};
use crate::report::ReportEngine;
use crate::settings::{db_path, get_data_dir, load_settings};

/// Console notifier wired into the export hooks: one line when the export
/// starts, one when it finishes (success or not).
struct PrintNotify {
    what: String,
}

impl ExportNotify for PrintNotify {
    fn export_started(&mut self) {
        println!("Exporting {}...", self.what);
    }
    fn export_completed(&mut self) {
        println!("Export finished.");
    }
}

fn default_path(name: &str, extension: &str) -> PathBuf {
    let date = chrono::Local::now().format("%Y-%m-%d").to_string();
    get_data_dir()
        .join("exports")
        .join(format!("{name}-{date}.{extension}"))
}

fn order_columns() -> Vec<Column> {
    vec![
        Column::new("order_number", "Order #"),
        Column::new("dealer_name", "Dealer"),
        Column::new("order_date", "Date"),
        Column::new("status", "Status"),
        Column::new("net_amount", "Amount"),
        Column::new("quantity", "Quantity"),
    ]
}

fn dealer_columns() -> Vec<Column> {
    vec![
        Column::new("name", "Dealer"),
        Column::new("business_name", "Business"),
        Column::new("city", "City"),
        Column::new("order_count", "Orders"),
        Column::new("total_sales", "Total Sales"),
    ]
}

/// Resolve the view, serialize it, and write the output file. Returns the
/// written path.
#[allow(clippy::too_many_arguments)]
pub fn dispatch(
    view: String,
    format: String,
    range: RangeArgs,
    search: Option<String>,
    status: Option<String>,
    name: String,
    output: Option<String>,
) -> Result<String> {
    let format = ExportFormat::parse(&format)?;
    let conn = db::get_connection(&db_path())?;
    let company = load_settings().company_name;
    let today = chrono::Local::now().date_naive();

    let mut engine = ReportEngine::new(today);
    engine.set_range(range.resolve(today)?);
    if let Some(text) = &search {
        engine.set_search(text);
    }
    if let Some(s) = &status {
        engine.set_status(Some(crate::cli::report::parse_status_arg(s)?));
    }

    let meta = ReportMeta {
        title: name.replace('_', " ").to_uppercase(),
        company,
        date_range: engine.filters().range.label(),
    };
    let path = output
        .map(PathBuf::from)
        .unwrap_or_else(|| default_path(&name, format.extension()));
    let mut notify = PrintNotify {
        what: format!("{view} as {}", format.extension()),
    };

    let orders = db::fetch_orders(&conn)?;
    let written = match view.as_str() {
        "orders" => {
            let rows = crate::filter::filter(&orders, engine.filters());
            run_export(&rows, &order_columns(), format, &meta, &path, &mut notify)?
        }
        "dealers" => {
            let dealers = db::fetch_dealers(&conn)?;
            let rows = engine.dealer_sales(&orders, &dealers);
            run_export(&rows, &dealer_columns(), format, &meta, &path, &mut notify)?
        }
        other => return Err(ScopeError::Other(format!("unknown export view: {other}"))),
    };

    Ok(format!("Wrote {}", written.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projections_are_stable() {
        let cols = order_columns();
        let keys: Vec<_> = cols.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(
            keys,
            ["order_number", "dealer_name", "order_date", "status", "net_amount", "quantity"]
        );
        let labels: Vec<_> = dealer_columns().iter().map(|c| c.label.clone()).collect();
        assert_eq!(labels, ["Dealer", "Business", "City", "Orders", "Total Sales"]);
    }

    #[test]
    fn test_default_path_shape() {
        let p = default_path("sales_report", "csv");
        let s = p.to_string_lossy();
        assert!(s.contains("exports"));
        assert!(s.ends_with(".csv"));
        assert!(s.contains("sales_report-"));
    }
}
