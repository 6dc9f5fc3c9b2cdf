//! Presentation-side state for the order table.
//!
//! `OrderPanel` owns the last successfully loaded record set together with
//! the user's search and sort state, and derives the displayed rows and
//! their total on demand.

use crate::domain::{OrderField, OrderRecord};
use crate::error::Result;
use crate::pipeline::OrdersResponse;
use crate::query::{self, QueryState, SortState};

/// Text shown when there is nothing to display.
pub const EMPTY_PLACEHOLDER: &str = "No orders loaded yet.";

/// Rows currently on screen and the sum of their `total` column.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderView {
    pub records: Vec<OrderRecord>,
    pub total: f64,
}

impl OrderView {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Message to show instead of the table, if any.
    pub fn placeholder(&self) -> Option<&'static str> {
        self.is_empty().then_some(EMPTY_PLACEHOLDER)
    }
}

/// A column header as rendered by the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnHeader {
    pub field: OrderField,
    pub label: &'static str,
    pub sort: SortState,
}

#[derive(Debug, Clone, Default)]
pub struct OrderPanel {
    records: Vec<OrderRecord>,
    query: QueryState,
}

impl OrderPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the record set with the contents of a pipeline response.
    ///
    /// On failure the previous records stay in place and the error is
    /// returned for the caller to surface.
    pub fn load(&mut self, response: OrdersResponse) -> Result<usize> {
        let records = response.into_records().map_err(|e| {
            tracing::warn!(error = %e, "Keeping previous orders after failed load");
            e
        })?;
        self.records = records;
        Ok(self.records.len())
    }

    pub fn records(&self) -> &[OrderRecord] {
        &self.records
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.query.set_search(search);
    }

    pub fn toggle_sort(&mut self, field: OrderField) {
        self.query.toggle_sort(field);
    }

    pub fn view(&self) -> OrderView {
        let records = self.query.apply(&self.records);
        let total = query::total(&records);
        OrderView { records, total }
    }

    pub fn headers(&self) -> Vec<ColumnHeader> {
        OrderField::DISPLAY_COLUMNS
            .iter()
            .map(|field| ColumnHeader {
                field: *field,
                label: field.label(),
                sort: self.query.sort_state(*field),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OrderHistoryError;

    fn record(order_num: &str, channel: &str, total: &str) -> OrderRecord {
        OrderRecord {
            order_num: order_num.to_string(),
            channel: channel.to_string(),
            total: total.to_string(),
            ..Default::default()
        }
    }

    fn loaded_panel() -> OrderPanel {
        let mut panel = OrderPanel::new();
        let response = OrdersResponse::success(&[
            record("SO-1", "Web", "100"),
            record("SO-2", "Retail", "50"),
            record("SO-3", "Web", "n/a"),
        ]);
        assert_eq!(panel.load(response).unwrap(), 3);
        panel
    }

    #[test]
    fn test_new_panel_is_empty() {
        let panel = OrderPanel::new();
        assert!(panel.view().is_empty());
        assert_eq!(panel.view().total, 0.0);
        assert_eq!(panel.view().placeholder(), Some(EMPTY_PLACEHOLDER));
        assert_eq!(loaded_panel().view().placeholder(), None);
    }

    #[test]
    fn test_view_filters_sorts_and_totals() {
        let mut panel = loaded_panel();
        assert_eq!(panel.view().total, 150.0);

        panel.set_search("web");
        let view = panel.view();
        assert_eq!(view.records.len(), 2);
        assert_eq!(view.total, 100.0);

        panel.set_search("");
        panel.toggle_sort(OrderField::Total);
        let order: Vec<String> = panel
            .view()
            .records
            .into_iter()
            .map(|r| r.order_num)
            .collect();
        // "n/a" is compared as text against the numbers and sorts after them
        assert_eq!(order, vec!["SO-2", "SO-1", "SO-3"]);

        // Underlying records never reordered
        assert_eq!(panel.records()[0].order_num, "SO-1");
    }

    #[test]
    fn test_failed_load_keeps_previous_records() {
        let mut panel = loaded_panel();
        let err = panel
            .load(OrdersResponse::failure(&OrderHistoryError::Other(
                anyhow::anyhow!("timeout"),
            )))
            .unwrap_err();
        assert!(err.to_string().starts_with("Error fetching orders:"));
        assert_eq!(panel.records().len(), 3);
    }

    #[test]
    fn test_reload_replaces_records_wholesale() {
        let mut panel = loaded_panel();
        panel
            .load(OrdersResponse::success(&[record("SO-9", "Phone", "1")]))
            .unwrap();
        assert_eq!(panel.records().len(), 1);
        assert_eq!(panel.records()[0].order_num, "SO-9");
    }

    #[test]
    fn test_headers_follow_display_columns_and_sort_state() {
        let mut panel = loaded_panel();
        panel.toggle_sort(OrderField::SalesPrice);

        let headers = panel.headers();
        let labels: Vec<&str> = headers.iter().map(|h| h.label).collect();
        assert_eq!(
            labels,
            vec![
                "Date",
                "SKU",
                "Product Name",
                "Qty",
                "Sales",
                "Total",
                "Fulfillment",
                "Channel",
                "Order No"
            ]
        );
        let sales = headers
            .iter()
            .find(|h| h.field == OrderField::SalesPrice)
            .unwrap();
        assert_eq!(sales.sort, SortState::Ascending);
        assert!(
            headers
                .iter()
                .filter(|h| h.field != OrderField::SalesPrice)
                .all(|h| h.sort == SortState::None)
        );
    }
}
