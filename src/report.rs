use chrono::NaiveDate;

use crate::aggregate::{aggregate, bucketize, percent_change, GroupBy, TimeBucket};
use crate::dates::{DatePreset, DateRange};
use crate::error::Result;
use crate::filter::{filter, FilterState};
use crate::models::{Dealer, DealerSales, Order, OrderItem, OrderStatus};
use crate::table::{PageView, TableView};

/// Default rows per table page, matching the dashboard views.
pub const PAGE_SIZE: usize = 10;

/// KPI panel values. `*_change` fields compare against the adjacent
/// equal-length prior period; `None` means the prior window had no base
/// value to compare against.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiMetrics {
    pub total_revenue: f64,
    pub total_orders: usize,
    pub new_customers: usize,
    pub conversion_rate: f64,
    pub avg_order_value: f64,
    pub revenue_change: Option<f64>,
    pub orders_change: Option<f64>,
    pub customers_change: Option<f64>,
    pub conversion_change: Option<f64>,
}

/// One derived render pass: KPIs, chart series, and the visible table page,
/// all computed from the same filtered collection.
#[derive(Debug, Clone)]
pub struct ReportView {
    pub kpis: KpiMetrics,
    pub chart: Vec<TimeBucket>,
    pub page: PageView<Order>,
}

/// Line-item drill-down collaborator. Lives behind a trait so the engine
/// never learns where items come from; a fetch failure is an `Err`,
/// distinct from the valid empty result.
pub trait ItemSource {
    fn items_for_order(&self, order_id: i64) -> Result<Vec<OrderItem>>;
}

/// Owns the user-facing report state (filters + table controls) and derives
/// every view from an externally supplied record collection. All methods
/// taking `orders` are pure in those records: re-rendering with a stale or
/// empty collection while a fetch is outstanding is safe.
#[derive(Debug, Clone)]
pub struct ReportEngine {
    filters: FilterState,
    table: TableView,
}

impl ReportEngine {
    /// Starts on the current calendar month with no search or status filter.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            filters: FilterState::new(DatePreset::ThisMonth.range(today)),
            table: TableView::new(PAGE_SIZE),
        }
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn table(&self) -> &TableView {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut TableView {
        &mut self.table
    }

    pub fn apply_preset(&mut self, preset: DatePreset, today: NaiveDate) {
        self.set_range(preset.range(today));
    }

    pub fn set_range(&mut self, range: DateRange) {
        self.filters.range = range;
        self.table.set_page(0);
    }

    pub fn set_search(&mut self, text: &str) {
        self.filters.search = text.to_string();
        self.table.set_page(0);
    }

    pub fn set_status(&mut self, status: Option<OrderStatus>) {
        self.filters.status = status;
        self.table.set_page(0);
    }

    pub fn set_min_amount(&mut self, min: Option<f64>) {
        self.filters.min_amount = min;
        self.table.set_page(0);
    }

    /// Back to defaults: current calendar month, no search, no status or
    /// amount filter, first page, nothing expanded.
    pub fn reset(&mut self, today: NaiveDate) {
        self.filters = FilterState::new(DatePreset::ThisMonth.range(today));
        self.table.reset();
    }

    /// One full derivation pass over the supplied records.
    pub fn snapshot(&self, orders: &[Order], group_by: GroupBy) -> ReportView {
        let filtered = filter(orders, &self.filters);
        let current = aggregate(&filtered);

        // Same predicates over the adjacent prior window, so the deltas
        // compare like with like.
        let prior_state = FilterState {
            range: self.filters.range.previous_period(),
            ..self.filters.clone()
        };
        let prior = aggregate(&filter(orders, &prior_state));

        let avg_order_value = if current.order_count > 0 {
            current.total_revenue / current.order_count as f64
        } else {
            0.0
        };

        let kpis = KpiMetrics {
            total_revenue: current.total_revenue,
            total_orders: current.order_count,
            new_customers: current.distinct_dealers,
            conversion_rate: current.delivery_rate,
            avg_order_value,
            revenue_change: percent_change(current.total_revenue, prior.total_revenue),
            orders_change: percent_change(current.order_count as f64, prior.order_count as f64),
            customers_change: percent_change(
                current.distinct_dealers as f64,
                prior.distinct_dealers as f64,
            ),
            conversion_change: percent_change(current.delivery_rate, prior.delivery_rate),
        };

        ReportView {
            kpis,
            chart: bucketize(&filtered, self.filters.range, group_by),
            page: self.table.visible_page(&filtered),
        }
    }

    /// Per-dealer rollup over the filtered collection, best sellers first.
    /// Dealers with no orders in range still appear with zero totals.
    pub fn dealer_sales(&self, orders: &[Order], dealers: &[Dealer]) -> Vec<DealerSales> {
        let filtered = filter(orders, &self.filters);
        let mut rows: Vec<DealerSales> = dealers
            .iter()
            .map(|d| {
                let dealer_orders: Vec<&Order> =
                    filtered.iter().filter(|o| o.dealer_id == d.id).collect();
                DealerSales {
                    dealer_id: d.id,
                    name: d.name.clone(),
                    business_name: d.business_name.clone(),
                    city: d.city.clone(),
                    state: d.state.clone(),
                    order_count: dealer_orders.len(),
                    total_sales: dealer_orders.iter().map(|o| o.net_amount).sum(),
                }
            })
            .collect();
        rows.sort_by(|a, b| b.total_sales.total_cmp(&a.total_sales));
        rows
    }

    /// Drill-down: the date-ranged orders of one dealer, most recent first.
    pub fn orders_for_dealer(&self, orders: &[Order], dealer_id: i64) -> Vec<Order> {
        let mut out: Vec<Order> = crate::filter::date_slice(orders, self.filters.range)
            .into_iter()
            .filter(|o| o.dealer_id == dealer_id)
            .collect();
        // Stable sort: same-day orders keep their fetch order.
        out.sort_by(|a, b| b.order_date.cmp(&a.order_date));
        out
    }

    /// Drill-down: line items of one order, via the external collaborator.
    pub fn items_for_order(
        &self,
        source: &dyn ItemSource,
        order_id: i64,
    ) -> Result<Vec<OrderItem>> {
        source.items_for_order(order_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::parse_iso_arg;
    use crate::error::ScopeError;

    fn d(s: &str) -> NaiveDate {
        parse_iso_arg(s).unwrap()
    }

    fn order(id: i64, dealer_id: i64, date: &str, status: &str, amount: f64) -> Order {
        Order {
            id,
            order_number: format!("ORD-{id:05}"),
            dealer_id,
            dealer_name: format!("Dealer {dealer_id}"),
            order_date: date.into(),
            status: status.into(),
            net_amount: amount,
            quantity: 10,
            region: "North".into(),
            description: "Growth Enhancer".into(),
            extra: Default::default(),
        }
    }

    fn dealer(id: i64, name: &str) -> Dealer {
        Dealer {
            id,
            name: name.into(),
            business_name: None,
            city: Some("Pune".into()),
            state: Some("Maharashtra".into()),
        }
    }

    /// Two March orders, one February order, one April order.
    fn fixture() -> Vec<Order> {
        vec![
            order(1, 1, "2025-03-05", "delivered", 100000.0),
            order(2, 2, "2025-03-20", "pending", 50000.0),
            order(3, 1, "2025-02-10", "delivered", 75000.0),
            order(4, 3, "2025-04-02", "delivered", 20000.0),
        ]
    }

    fn march_engine() -> ReportEngine {
        let mut engine = ReportEngine::new(d("2025-03-15"));
        engine.set_range(DateRange::new(d("2025-03-01"), d("2025-03-31")));
        engine
    }

    #[test]
    fn test_new_defaults_to_current_month() {
        let engine = ReportEngine::new(d("2025-06-15"));
        assert_eq!(engine.filters().range.from, d("2025-06-01"));
        assert_eq!(engine.filters().range.to, d("2025-06-30"));
        assert!(engine.filters().search.is_empty());
        assert!(engine.filters().status.is_none());
    }

    #[test]
    fn test_snapshot_kpis() {
        let view = march_engine().snapshot(&fixture(), GroupBy::Month);
        assert_eq!(view.kpis.total_revenue, 150000.0);
        assert_eq!(view.kpis.total_orders, 2);
        assert_eq!(view.kpis.new_customers, 2);
        assert_eq!(view.kpis.conversion_rate, 50.0);
        assert_eq!(view.kpis.avg_order_value, 75000.0);
    }

    #[test]
    fn test_snapshot_changes_use_real_prior_period() {
        // Prior window for March 2025 covers the Feb 10 order (75k).
        let view = march_engine().snapshot(&fixture(), GroupBy::Month);
        assert_eq!(view.kpis.revenue_change, Some(100.0)); // 150k vs 75k
        assert_eq!(view.kpis.orders_change, Some(100.0)); // 2 vs 1
        assert_eq!(view.kpis.customers_change, Some(100.0)); // 2 vs 1
        // Prior conversion was 100%, current is 50%.
        assert_eq!(view.kpis.conversion_change, Some(-50.0));
    }

    #[test]
    fn test_snapshot_changes_none_without_prior_data() {
        let mut engine = ReportEngine::new(d("2025-03-15"));
        engine.set_range(DateRange::new(d("2025-04-01"), d("2025-04-30")));
        let view = engine.snapshot(&fixture(), GroupBy::Month);
        // March data exists but the April prior period is March — 150k base.
        assert!(view.kpis.revenue_change.is_some());

        engine.set_range(DateRange::new(d("2024-01-01"), d("2024-01-31")));
        let view = engine.snapshot(&fixture(), GroupBy::Month);
        assert_eq!(view.kpis.revenue_change, None);
        assert_eq!(view.kpis.orders_change, None);
    }

    #[test]
    fn test_snapshot_chart_spans_requested_range() {
        let mut engine = ReportEngine::new(d("2025-03-15"));
        engine.set_range(DateRange::new(d("2025-02-01"), d("2025-04-30")));
        let view = engine.snapshot(&fixture(), GroupBy::Month);
        assert_eq!(view.chart.len(), 3);
        assert_eq!(view.chart[0].label, "2025-02");
        assert_eq!(view.chart[0].revenue, 75000.0);
        assert_eq!(view.chart[1].revenue, 150000.0);
        assert_eq!(view.chart[2].revenue, 20000.0);
    }

    #[test]
    fn test_snapshot_tolerates_empty_collection() {
        // A pending fetch renders with no records; nothing divides by zero.
        let view = march_engine().snapshot(&[], GroupBy::Month);
        assert_eq!(view.kpis.total_revenue, 0.0);
        assert_eq!(view.kpis.conversion_rate, 0.0);
        assert_eq!(view.kpis.avg_order_value, 0.0);
        assert_eq!(view.kpis.revenue_change, None);
        assert_eq!(view.chart.len(), 1); // March bucket, zero-filled
        assert_eq!(view.chart[0].orders, 0);
        assert!(view.page.rows.is_empty());
    }

    #[test]
    fn test_filter_mutations_reset_page() {
        let mut engine = march_engine();
        engine.table_mut().set_page(3);
        engine.set_search("green");
        assert_eq!(engine.table().page_index(), 0);

        engine.table_mut().set_page(2);
        engine.set_status(Some(OrderStatus::Delivered));
        assert_eq!(engine.table().page_index(), 0);

        engine.table_mut().set_page(2);
        engine.set_min_amount(Some(1000.0));
        assert_eq!(engine.table().page_index(), 0);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut engine = march_engine();
        engine.set_search("dealer");
        engine.set_status(Some(OrderStatus::Pending));
        engine.table_mut().toggle_expand("ORD-00001");
        engine.table_mut().set_page(2);

        engine.reset(d("2025-06-15"));
        assert_eq!(engine.filters().range.from, d("2025-06-01"));
        assert!(engine.filters().search.is_empty());
        assert!(engine.filters().status.is_none());
        assert!(engine.filters().min_amount.is_none());
        assert_eq!(engine.table().page_index(), 0);
        assert!(!engine.table().is_expanded("ORD-00001"));
    }

    #[test]
    fn test_dealer_sales_rollup_sorted_desc() {
        let engine = march_engine();
        let dealers = vec![dealer(1, "Green Farms"), dealer(2, "Agri Supplies"), dealer(3, "Kisan Depot")];
        let rows = engine.dealer_sales(&fixture(), &dealers);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].name, "Green Farms");
        assert_eq!(rows[0].total_sales, 100000.0);
        assert_eq!(rows[0].order_count, 1);
        assert_eq!(rows[1].name, "Agri Supplies");
        // Dealer 3's only order is in April — zero in the March window.
        assert_eq!(rows[2].total_sales, 0.0);
        assert_eq!(rows[2].order_count, 0);
    }

    #[test]
    fn test_orders_for_dealer_most_recent_first() {
        let mut engine = ReportEngine::new(d("2025-03-15"));
        engine.set_range(DateRange::new(d("2025-02-01"), d("2025-03-31")));
        let out = engine.orders_for_dealer(&fixture(), 1);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].order_date, "2025-03-05");
        assert_eq!(out[1].order_date, "2025-02-10");
    }

    #[test]
    fn test_orders_for_dealer_ignores_non_date_filters() {
        let mut engine = march_engine();
        engine.set_search("no-such-text");
        let out = engine.orders_for_dealer(&fixture(), 1);
        assert_eq!(out.len(), 1);
    }

    struct FixedItems(Vec<OrderItem>);

    impl ItemSource for FixedItems {
        fn items_for_order(&self, order_id: i64) -> Result<Vec<OrderItem>> {
            Ok(self.0.iter().filter(|i| i.order_id == order_id).cloned().collect())
        }
    }

    struct FailingItems;

    impl ItemSource for FailingItems {
        fn items_for_order(&self, _order_id: i64) -> Result<Vec<OrderItem>> {
            Err(ScopeError::Other("connection lost".into()))
        }
    }

    #[test]
    fn test_items_for_order_empty_is_ok_failure_is_err() {
        let engine = march_engine();
        let source = FixedItems(vec![OrderItem {
            id: 1,
            order_id: 1,
            product: "Bio-Fertilizer".into(),
            quantity: 4,
            unit_price: 2500.0,
            total_price: 10000.0,
        }]);
        assert_eq!(engine.items_for_order(&source, 1).unwrap().len(), 1);
        // Zero items is a valid terminal state, not an error.
        assert!(engine.items_for_order(&source, 99).unwrap().is_empty());
        // A failed fetch is an explicit error state.
        assert!(engine.items_for_order(&FailingItems, 1).is_err());
    }
}
