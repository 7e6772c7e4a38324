use std::collections::BTreeSet;

use crate::record::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

/// The derived page handed to a renderer.
#[derive(Debug, Clone)]
pub struct PageView<R> {
    pub rows: Vec<R>,
    pub total_filtered: usize,
    pub total_pages: usize,
}

/// UI-local table state: search text, sort order, page position, and row
/// expansion. The record collection itself is external and may change
/// between calls; for a fixed `(records, search, sort, page)` tuple,
/// `visible_page` is a pure function.
#[derive(Debug, Clone)]
pub struct TableView {
    search: String,
    sort: Option<SortSpec>,
    page_index: usize,
    page_size: usize,
    expanded: BTreeSet<String>,
    single_expand: bool,
}

impl TableView {
    pub fn new(page_size: usize) -> Self {
        Self {
            search: String::new(),
            sort: None,
            page_index: 0,
            page_size: page_size.max(1),
            expanded: BTreeSet::new(),
            single_expand: false,
        }
    }

    /// Only one row may be open at a time; expanding a row collapses the rest.
    pub fn single_expand(mut self) -> Self {
        self.single_expand = true;
        self
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn sort(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Update the search text. Any text change moves back to the first
    /// page so the view never silently shows an empty page while earlier
    /// pages have data.
    pub fn set_search(&mut self, text: &str) {
        if self.search != text {
            self.search = text.to_string();
            self.page_index = 0;
        }
    }

    /// Clicking a column cycles ascending -> descending -> unsorted; a
    /// different column starts ascending. The page position is kept.
    pub fn cycle_sort(&mut self, field: &str) {
        self.sort = match self.sort.take() {
            Some(spec) if spec.field == field => match spec.direction {
                SortDirection::Asc => Some(SortSpec {
                    field: field.to_string(),
                    direction: SortDirection::Desc,
                }),
                SortDirection::Desc => None,
            },
            _ => Some(SortSpec {
                field: field.to_string(),
                direction: SortDirection::Asc,
            }),
        };
    }

    pub fn set_page(&mut self, index: usize) {
        self.page_index = index;
    }

    pub fn next_page(&mut self) {
        self.page_index += 1;
    }

    pub fn prev_page(&mut self) {
        self.page_index = self.page_index.saturating_sub(1);
    }

    /// Pull an out-of-range page index back to the last populated page.
    /// Callers invoke this after the collection shrinks under them.
    pub fn clamp_page(&mut self, total_pages: usize) {
        if total_pages == 0 {
            self.page_index = 0;
        } else if self.page_index >= total_pages {
            self.page_index = total_pages - 1;
        }
    }

    pub fn toggle_expand(&mut self, row_key: &str) {
        if self.expanded.contains(row_key) {
            self.expanded.remove(row_key);
        } else {
            if self.single_expand {
                self.expanded.clear();
            }
            self.expanded.insert(row_key.to_string());
        }
    }

    pub fn is_expanded(&self, row_key: &str) -> bool {
        self.expanded.contains(row_key)
    }

    /// Reset search, page, and expansion; sort is a presentation choice
    /// and survives a filter reset.
    pub fn reset(&mut self) {
        self.search.clear();
        self.page_index = 0;
        self.expanded.clear();
    }

    /// Derive the visible page: search filter, stable sort, then slice.
    /// An index past the end yields an empty `rows` with `total_pages`
    /// still populated, so the caller can `clamp_page` and re-render.
    pub fn visible_page<R: Record + Clone>(&self, records: &[R]) -> PageView<R> {
        let mut rows: Vec<R> = records
            .iter()
            .filter(|r| r.matches_search(&self.search))
            .cloned()
            .collect();

        if let Some(spec) = &self.sort {
            // sort_by is stable: ties keep their prior relative order.
            rows.sort_by(|a, b| {
                let ord = a.field(&spec.field).compare(&b.field(&spec.field));
                match spec.direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            });
        }

        let total_filtered = rows.len();
        let total_pages = total_filtered.div_ceil(self.page_size);
        let start = self.page_index * self.page_size;
        let rows = if start >= rows.len() {
            Vec::new()
        } else {
            let end = (start + self.page_size).min(rows.len());
            rows[start..end].to_vec()
        };

        PageView {
            rows,
            total_filtered,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Value;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        key: String,
        group: String,
        amount: f64,
    }

    impl Record for Row {
        fn key(&self) -> String {
            self.key.clone()
        }
        fn field(&self, name: &str) -> Value {
            match name {
                "key" => Value::text(&self.key),
                "group" => Value::text(&self.group),
                "amount" => Value::Number(self.amount),
                _ => Value::Empty,
            }
        }
        fn field_names(&self) -> &'static [&'static str] {
            &["key", "group", "amount"]
        }
    }

    fn make_rows(n: usize) -> Vec<Row> {
        (0..n)
            .map(|i| Row {
                key: format!("row-{:02}", i + 1),
                group: if i % 2 == 0 { "even".into() } else { "odd".into() },
                amount: (i as f64) * 10.0,
            })
            .collect()
    }

    #[test]
    fn test_pagination_25_rows_page_size_10() {
        let rows = make_rows(25);
        let mut view = TableView::new(10);

        let page = view.visible_page(&rows);
        assert_eq!(page.rows.len(), 10);
        assert_eq!(page.total_filtered, 25);
        assert_eq!(page.total_pages, 3);

        view.set_page(2);
        let page = view.visible_page(&rows);
        assert_eq!(page.rows.len(), 5);
        assert_eq!(page.rows[0].key, "row-21");
    }

    #[test]
    fn test_out_of_range_page_exposes_total_pages_for_clamping() {
        let rows = make_rows(25);
        let mut view = TableView::new(10);
        view.set_page(7);
        let page = view.visible_page(&rows);
        assert!(page.rows.is_empty());
        assert_eq!(page.total_filtered, 25);

        view.clamp_page(page.total_pages);
        assert_eq!(view.page_index(), 2);
        assert_eq!(view.visible_page(&rows).rows.len(), 5);
    }

    #[test]
    fn test_clamp_page_on_empty_collection() {
        let mut view = TableView::new(10);
        view.set_page(4);
        view.clamp_page(0);
        assert_eq!(view.page_index(), 0);
    }

    #[test]
    fn test_set_search_resets_page() {
        let mut view = TableView::new(10);
        view.set_page(2);
        view.set_search("even");
        assert_eq!(view.page_index(), 0);

        // Setting identical text is a no-op and keeps the page.
        view.set_page(1);
        view.set_search("even");
        assert_eq!(view.page_index(), 1);
    }

    #[test]
    fn test_search_filters_before_pagination() {
        let rows = make_rows(25);
        let mut view = TableView::new(10);
        view.set_search("even"); // 13 of 25
        let page = view.visible_page(&rows);
        assert_eq!(page.total_filtered, 13);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.rows.len(), 10);
    }

    #[test]
    fn test_cycle_sort_asc_desc_none() {
        let mut view = TableView::new(10);
        view.cycle_sort("amount");
        assert_eq!(view.sort().unwrap().direction, SortDirection::Asc);
        view.cycle_sort("amount");
        assert_eq!(view.sort().unwrap().direction, SortDirection::Desc);
        view.cycle_sort("amount");
        assert!(view.sort().is_none());
        // A different column starts ascending again.
        view.cycle_sort("amount");
        view.cycle_sort("group");
        let spec = view.sort().unwrap();
        assert_eq!(spec.field, "group");
        assert_eq!(spec.direction, SortDirection::Asc);
    }

    #[test]
    fn test_cycle_sort_keeps_page() {
        let mut view = TableView::new(10);
        view.set_page(2);
        view.cycle_sort("amount");
        assert_eq!(view.page_index(), 2);
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        let rows = make_rows(6);
        let mut view = TableView::new(10);
        // "group" has two values with three ties each; within a tie the
        // original relative order must survive.
        view.cycle_sort("group");
        let page = view.visible_page(&rows);
        let keys: Vec<_> = page.rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, ["row-01", "row-03", "row-05", "row-02", "row-04", "row-06"]);

        // Dropping the sort restores insertion order.
        view.cycle_sort("group");
        view.cycle_sort("group");
        assert!(view.sort().is_none());
        let page = view.visible_page(&rows);
        let keys: Vec<_> = page.rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, ["row-01", "row-02", "row-03", "row-04", "row-05", "row-06"]);
    }

    #[test]
    fn test_sort_numeric_descending() {
        let rows = make_rows(5);
        let mut view = TableView::new(10);
        view.cycle_sort("amount");
        view.cycle_sort("amount");
        let page = view.visible_page(&rows);
        assert_eq!(page.rows[0].amount, 40.0);
        assert_eq!(page.rows[4].amount, 0.0);
    }

    #[test]
    fn test_visible_page_is_deterministic() {
        let rows = make_rows(25);
        let mut view = TableView::new(10);
        view.set_search("odd");
        view.cycle_sort("amount");
        view.set_page(1);
        let a = view.visible_page(&rows);
        let b = view.visible_page(&rows);
        assert_eq!(a.rows, b.rows);
        assert_eq!(a.total_filtered, b.total_filtered);
        assert_eq!(a.total_pages, b.total_pages);
    }

    #[test]
    fn test_toggle_expand_independent_rows() {
        let mut view = TableView::new(10);
        view.toggle_expand("row-01");
        view.toggle_expand("row-02");
        assert!(view.is_expanded("row-01"));
        assert!(view.is_expanded("row-02"));
        view.toggle_expand("row-01");
        assert!(!view.is_expanded("row-01"));
        assert!(view.is_expanded("row-02"));
    }

    #[test]
    fn test_single_expand_mode_evicts_previous() {
        let mut view = TableView::new(10).single_expand();
        view.toggle_expand("row-01");
        view.toggle_expand("row-02");
        assert!(!view.is_expanded("row-01"));
        assert!(view.is_expanded("row-02"));
    }

    #[test]
    fn test_reset_clears_search_page_expansion_keeps_sort() {
        let mut view = TableView::new(10);
        view.set_search("x");
        view.set_page(3);
        view.toggle_expand("row-01");
        view.cycle_sort("amount");
        view.reset();
        assert_eq!(view.search(), "");
        assert_eq!(view.page_index(), 0);
        assert!(!view.is_expanded("row-01"));
        assert!(view.sort().is_some());
    }
}
