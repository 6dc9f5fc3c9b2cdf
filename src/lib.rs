//! Order history aggregation for CRM contacts.
//!
//! Given a contact id, the pipeline looks up the contact's associated order
//! records (a CRM custom object), batch-reads their properties in chunks of
//! at most 100, and flattens each one into an [`OrderRecord`]. The query
//! engine then searches, sorts and totals those records for display.
//!
//! ```ignore
//! let pipeline = OrderPipeline::new(Arc::new(ReqwestHttpClient::new()), CrmConfig::default());
//! let response = pipeline.get_orders(Some("12345")).await;
//!
//! let mut panel = OrderPanel::new();
//! panel.load(response)?;
//! panel.set_search("widget");
//! panel.toggle_sort(OrderField::Total);
//! let view = panel.view();
//! println!("{} rows, total {}", view.records.len(), view.total);
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod http;
pub mod metrics;
pub mod normalize;
pub mod panel;
pub mod pipeline;
pub mod query;
pub mod upstream;

// Re-export commonly used types
pub use config::{CrmConfig, Credential};
pub use domain::{OrderField, OrderRecord, RawRecord};
pub use error::{OrderHistoryError, Result, UpstreamOperation};
pub use http::{HttpClient, HttpRequest, HttpResponse, MockHttpClient, ReqwestHttpClient};
#[cfg(feature = "metrics")]
pub use metrics::OrderHistoryMetrics;
pub use normalize::normalize;
pub use panel::{OrderPanel, OrderView};
pub use pipeline::{FunctionContext, OrderPipeline, OrdersResponse};
pub use query::{QueryState, SortConfig, SortDirection, apply, total};
pub use upstream::CrmClient;
