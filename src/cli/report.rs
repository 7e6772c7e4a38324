use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::aggregate::{GroupBy, TimeBucket};
use crate::cli::RangeArgs;
use crate::db;
use crate::error::{Result, ScopeError};
use crate::fmt::{change, lakhs, money, percent};
use crate::models::{DealerSales, Order, OrderItem, OrderStatus};
use crate::record::Record;
use crate::report::{KpiMetrics, ReportEngine};
use crate::settings::{db_path, load_settings};
use crate::table::{PageView, TableView};

/// Prepend company name as a header line if non-empty.
fn with_header(company_name: &str, body: String) -> String {
    if company_name.is_empty() {
        body
    } else {
        format!("{company_name}\n{body}")
    }
}

pub(crate) fn parse_status_arg(s: &str) -> Result<OrderStatus> {
    OrderStatus::parse(s).ok_or_else(|| ScopeError::Other(format!("unknown status: {s}")))
}

fn status_badge(status: &str) -> String {
    match OrderStatus::parse(status) {
        Some(OrderStatus::Delivered) => status.green().to_string(),
        Some(OrderStatus::Pending) => status.yellow().to_string(),
        Some(OrderStatus::Processing) => status.blue().to_string(),
        Some(OrderStatus::Shipped) => status.cyan().to_string(),
        Some(OrderStatus::Cancelled) => status.red().to_string(),
        None => status.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Data-fetching wrappers (used by dispatch)
// ---------------------------------------------------------------------------

pub fn summary(range: RangeArgs, group_by: String) -> Result<String> {
    let conn = db::get_connection(&db_path())?;
    let company = load_settings().company_name;
    let today = chrono::Local::now().date_naive();

    let mut engine = ReportEngine::new(today);
    engine.set_range(range.resolve(today)?);
    let orders = db::fetch_orders(&conn)?;
    let view = engine.snapshot(&orders, GroupBy::parse(&group_by)?);

    let label = engine.filters().range.label();
    Ok(with_header(&company, format_summary(&view.kpis, &view.chart, &label)))
}

pub fn dealers(
    range: RangeArgs,
    search: Option<String>,
    min_sales: Option<f64>,
    limit: usize,
) -> Result<String> {
    let conn = db::get_connection(&db_path())?;
    let company = load_settings().company_name;
    let today = chrono::Local::now().date_naive();

    let mut engine = ReportEngine::new(today);
    engine.set_range(range.resolve(today)?);
    let orders = db::fetch_orders(&conn)?;
    let all_dealers = db::fetch_dealers(&conn)?;

    let query = search.unwrap_or_default().to_lowercase();
    let rows: Vec<DealerSales> = engine
        .dealer_sales(&orders, &all_dealers)
        .into_iter()
        .filter(|d| min_sales.map(|m| d.total_sales >= m).unwrap_or(true))
        .filter(|d| query.is_empty() || d.name.to_lowercase().contains(&query))
        .take(limit)
        .collect();

    let label = engine.filters().range.label();
    Ok(with_header(&company, format_dealers(&rows, &label)))
}

#[allow(clippy::too_many_arguments)]
pub fn orders(
    range: RangeArgs,
    search: Option<String>,
    status: Option<String>,
    dealer: Option<String>,
    page: usize,
    page_size: usize,
    sort: Option<String>,
    desc: bool,
    expand: Vec<String>,
) -> Result<String> {
    let conn = db::get_connection(&db_path())?;
    let company = load_settings().company_name;
    let today = chrono::Local::now().date_naive();

    let mut engine = ReportEngine::new(today);
    engine.set_range(range.resolve(today)?);
    if let Some(s) = &status {
        engine.set_status(Some(parse_status_arg(s)?));
    }

    let all_orders = db::fetch_orders(&conn)?;
    let mut rows = match &dealer {
        Some(name) => {
            let d = db::dealer_by_name(&conn, name)?
                .ok_or_else(|| ScopeError::UnknownDealer(name.clone()))?;
            engine.orders_for_dealer(&all_orders, d.id)
        }
        None => crate::filter::filter(&all_orders, engine.filters()),
    };
    if sort.is_none() {
        // Register default: most recent first, fetch order breaks ties.
        rows.sort_by(|a, b| b.order_date.cmp(&a.order_date));
    }

    let mut view = TableView::new(page_size);
    if let Some(text) = &search {
        view.set_search(text);
    }
    if let Some(field) = &sort {
        view.cycle_sort(field);
        if desc {
            view.cycle_sort(field);
        }
    }
    view.set_page(page.saturating_sub(1));
    for key in &expand {
        view.toggle_expand(key);
    }

    let mut page_view = view.visible_page(&rows);
    if page_view.rows.is_empty() && page_view.total_filtered > 0 {
        // Requested page is past the end; show the last populated page.
        view.clamp_page(page_view.total_pages);
        page_view = view.visible_page(&rows);
    }

    let total: f64 = rows
        .iter()
        .filter(|o| o.matches_search(view.search()))
        .map(|o| o.net_amount)
        .sum();
    let label = engine.filters().range.label();
    let mut out = with_header(
        &company,
        format_orders(&page_view, view.page_index() + 1, total, &label),
    );

    // Expanded rows on the visible page get their line items inline.
    let store = db::Store { conn: &conn };
    for order in &page_view.rows {
        if view.is_expanded(&order.key()) {
            let items = engine.items_for_order(&store, order.id)?;
            out.push_str(&format!("\n\n{}", format_items(&order.order_number, &items)));
        }
    }
    Ok(out)
}

pub fn items(order: String) -> Result<String> {
    let conn = db::get_connection(&db_path())?;
    let order_id = db::order_id_by_number(&conn, &order)?
        .ok_or_else(|| ScopeError::UnknownOrder(order.clone()))?;
    let store = db::Store { conn: &conn };
    let today = chrono::Local::now().date_naive();
    let engine = ReportEngine::new(today);
    let items = engine.items_for_order(&store, order_id)?;
    Ok(format_items(&order, &items))
}

// ---------------------------------------------------------------------------
// Pure formatting functions (report data -> String)
// ---------------------------------------------------------------------------

pub fn format_summary(kpis: &KpiMetrics, chart: &[TimeBucket], range_label: &str) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value", "vs last period"]);
    table.add_row(vec![
        Cell::new("Total Revenue"),
        Cell::new(lakhs(kpis.total_revenue)),
        Cell::new(change(kpis.revenue_change)),
    ]);
    table.add_row(vec![
        Cell::new("Total Orders"),
        Cell::new(kpis.total_orders),
        Cell::new(change(kpis.orders_change)),
    ]);
    table.add_row(vec![
        Cell::new("New Customers"),
        Cell::new(kpis.new_customers),
        Cell::new(change(kpis.customers_change)),
    ]);
    table.add_row(vec![
        Cell::new("Conversion Rate"),
        Cell::new(percent(kpis.conversion_rate)),
        Cell::new(change(kpis.conversion_change)),
    ]);
    table.add_row(vec![
        Cell::new("Avg Order Value"),
        Cell::new(money(kpis.avg_order_value)),
        Cell::new(""),
    ]);

    let mut trend = Table::new();
    trend.set_header(vec!["Period", "Revenue", "Orders", "Dealers"]);
    for bucket in chart {
        trend.add_row(vec![
            Cell::new(&bucket.label),
            Cell::new(money(bucket.revenue)),
            Cell::new(bucket.orders),
            Cell::new(bucket.dealers),
        ]);
    }

    format!("Sales Summary ({range_label})\n{table}\n\nRevenue Trend\n{trend}")
}

pub fn format_dealers(rows: &[DealerSales], range_label: &str) -> String {
    if rows.is_empty() {
        return "No dealers match the current filters.".to_string();
    }
    let mut table = Table::new();
    table.set_header(vec!["Dealer", "Business", "City", "Orders", "Total Sales"]);
    for d in rows {
        table.add_row(vec![
            Cell::new(&d.name),
            Cell::new(d.business_name.as_deref().unwrap_or("\u{2014}")),
            Cell::new(d.city.as_deref().unwrap_or("")),
            Cell::new(d.order_count),
            Cell::new(money(d.total_sales)),
        ]);
    }
    format!("Top Dealers by Sales ({range_label})\n{table}")
}

pub fn format_orders(
    page: &PageView<Order>,
    page_number: usize,
    total: f64,
    range_label: &str,
) -> String {
    if page.total_filtered == 0 {
        return "No orders found.".to_string();
    }
    let mut table = Table::new();
    table.set_header(vec!["Order #", "Dealer", "Date", "Status", "Amount", "Qty"]);
    for o in &page.rows {
        table.add_row(vec![
            Cell::new(&o.order_number),
            Cell::new(&o.dealer_name),
            Cell::new(&o.order_date),
            Cell::new(status_badge(&o.status)),
            Cell::new(money(o.net_amount)),
            Cell::new(o.quantity),
        ]);
    }
    format!(
        "Orders ({range_label})\n{table}\nPage {page_number} of {} \u{2014} {} orders, total {}",
        page.total_pages.max(1),
        page.total_filtered,
        money(total),
    )
}

pub fn format_items(order_number: &str, items: &[OrderItem]) -> String {
    if items.is_empty() {
        return format!("No items found for order {order_number}.");
    }
    let mut table = Table::new();
    table.set_header(vec!["Product", "Qty", "Unit Price", "Total"]);
    for item in items {
        table.add_row(vec![
            Cell::new(&item.product),
            Cell::new(item.quantity),
            Cell::new(money(item.unit_price)),
            Cell::new(money(item.total_price)),
        ]);
    }
    let total: f64 = items.iter().map(|i| i.total_price).sum();
    format!("Items for {order_number}\n{table}\nOrder total: {}", money(total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn kpis() -> KpiMetrics {
        KpiMetrics {
            total_revenue: 1250000.0,
            total_orders: 12,
            new_customers: 4,
            conversion_rate: 41.67,
            avg_order_value: 104166.67,
            revenue_change: Some(12.5),
            orders_change: Some(-8.0),
            customers_change: None,
            conversion_change: Some(3.2),
        }
    }

    fn bucket(label: &str, revenue: f64) -> TimeBucket {
        TimeBucket {
            label: label.into(),
            start: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            revenue,
            orders: 3,
            dealers: 2,
        }
    }

    #[test]
    fn test_format_summary_contains_kpis_and_trend() {
        let out = format_summary(&kpis(), &[bucket("2025-03", 1250000.0)], "2025-03-01 to 2025-03-31");
        assert!(out.contains("Total Revenue"));
        assert!(out.contains("\u{20b9}12.50L"));
        assert!(out.contains("+12.5%"));
        assert!(out.contains("-8.0%"));
        assert!(out.contains("\u{2014}")); // customers_change has no prior data
        assert!(out.contains("Revenue Trend"));
        assert!(out.contains("2025-03"));
    }

    #[test]
    fn test_format_dealers_empty() {
        assert!(format_dealers(&[], "x").contains("No dealers"));
    }

    #[test]
    fn test_format_orders_footer() {
        let page = PageView {
            rows: vec![Order {
                id: 1,
                order_number: "ORD-00001".into(),
                dealer_id: 1,
                dealer_name: "Green Farms".into(),
                order_date: "2025-03-15".into(),
                status: "delivered".into(),
                net_amount: 125000.0,
                quantity: 40,
                region: "South".into(),
                description: "Bio-Fertilizer".into(),
                extra: Default::default(),
            }],
            total_filtered: 25,
            total_pages: 3,
        };
        let out = format_orders(&page, 1, 3000000.0, "2025-03-01 to 2025-03-31");
        assert!(out.contains("Page 1 of 3"));
        assert!(out.contains("25 orders"));
        assert!(out.contains("ORD-00001"));
    }

    #[test]
    fn test_format_orders_empty() {
        let page: PageView<Order> = PageView {
            rows: vec![],
            total_filtered: 0,
            total_pages: 0,
        };
        assert_eq!(format_orders(&page, 1, 0.0, "x"), "No orders found.");
    }

    #[test]
    fn test_format_items() {
        let items = vec![OrderItem {
            id: 1,
            order_id: 1,
            product: "Micro Nutrients".into(),
            quantity: 4,
            unit_price: 2500.0,
            total_price: 10000.0,
        }];
        let out = format_items("ORD-00001", &items);
        assert!(out.contains("Micro Nutrients"));
        assert!(out.contains("Order total: \u{20b9}10,000.00"));
        assert!(format_items("ORD-00002", &[]).contains("No items found"));
    }
}
