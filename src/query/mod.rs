//! Search, sort and totals over normalized order records.
//!
//! Every function here is pure: inputs are borrowed, results are freshly
//! allocated, and nothing suspends. Callers can recompute on every
//! keystroke.

use serde::{Deserialize, Serialize};

use crate::domain::{OrderField, OrderRecord};

pub mod compare;

pub use compare::{compare_values, locale_compare, parse_number};
use compare::merge_sort_by;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Column and direction to sort by. A `None` key keeps input order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortConfig {
    pub key: Option<OrderField>,
    pub direction: SortDirection,
}

impl SortConfig {
    pub fn by(key: OrderField, direction: SortDirection) -> Self {
        Self {
            key: Some(key),
            direction,
        }
    }
}

/// How a column header presents its sort state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortState {
    Ascending,
    Descending,
    None,
}

impl SortState {
    /// ARIA `aria-sort` value.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortState::Ascending => "ascending",
            SortState::Descending => "descending",
            SortState::None => "none",
        }
    }

    pub fn indicator(&self) -> &'static str {
        match self {
            SortState::Ascending => "▲",
            SortState::Descending => "▼",
            SortState::None => "⇅",
        }
    }
}

/// Transient search and sort state owned by the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryState {
    pub search: String,
    pub sort_config: SortConfig,
}

impl QueryState {
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    /// Header click: the active ascending column flips to descending,
    /// anything else becomes the active column, ascending.
    pub fn toggle_sort(&mut self, key: OrderField) {
        let direction = if self.sort_config.key == Some(key)
            && self.sort_config.direction == SortDirection::Asc
        {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        self.sort_config = SortConfig::by(key, direction);
    }

    pub fn sort_state(&self, key: OrderField) -> SortState {
        match self.sort_config {
            SortConfig {
                key: Some(active),
                direction: SortDirection::Asc,
            } if active == key => SortState::Ascending,
            SortConfig {
                key: Some(active),
                direction: SortDirection::Desc,
            } if active == key => SortState::Descending,
            _ => SortState::None,
        }
    }

    pub fn apply(&self, records: &[OrderRecord]) -> Vec<OrderRecord> {
        apply(records, &self.search, &self.sort_config)
    }
}

/// True when any of the record's twelve values contains `needle`
/// (already lowercased).
fn matches_search(record: &OrderRecord, needle: &str) -> bool {
    record
        .values()
        .any(|value| value.to_lowercase().contains(needle))
}

/// Filter by `search`, then stably sort by `sort`.
///
/// The input slice is left untouched. An empty search matches every record
/// and a `None` sort key preserves the filtered order.
pub fn apply(records: &[OrderRecord], search: &str, sort: &SortConfig) -> Vec<OrderRecord> {
    let result: Vec<OrderRecord> = if search.is_empty() {
        records.to_vec()
    } else {
        let needle = search.to_lowercase();
        records
            .iter()
            .filter(|record| matches_search(record, &needle))
            .cloned()
            .collect()
    };

    match sort.key {
        Some(key) => merge_sort_by(result, &mut |a: &OrderRecord, b: &OrderRecord| {
            let ordering = compare_values(a.get(key), b.get(key));
            match sort.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        }),
        None => result,
    }
}

/// Sum of the `total` column; values that do not parse count as zero.
pub fn total(records: &[OrderRecord]) -> f64 {
    records
        .iter()
        .map(|record| parse_number(&record.total).unwrap_or(0.0))
        .sum()
}
