//! The order aggregation pipeline: associations → batch reads → normalized records.
//!
//! Each call to [`OrderPipeline::fetch_orders`] is one independent, linear run.
//! Nothing is cached between runs and nothing is retried: the first failure
//! ends the run and no partial record list is returned.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::Instrument;

use crate::config::{CrmConfig, Credential};
use crate::domain::OrderRecord;
use crate::error::{OrderHistoryError, Result};
use crate::http::HttpClient;
#[cfg(feature = "metrics")]
use crate::metrics::OrderHistoryMetrics;
use crate::normalize::normalize_all;
use crate::upstream::CrmClient;

pub mod stage;

pub use stage::Stage;
use stage::StageTracker;

/// Orchestrates one aggregation run per call.
#[derive(Clone)]
pub struct OrderPipeline<H: HttpClient> {
    client: CrmClient<H>,
    #[cfg(feature = "metrics")]
    metrics: Option<OrderHistoryMetrics>,
}

impl<H: HttpClient> OrderPipeline<H> {
    pub fn new(http_client: Arc<H>, config: CrmConfig) -> Self {
        Self {
            client: CrmClient::new(http_client, config),
            #[cfg(feature = "metrics")]
            metrics: None,
        }
    }

    /// Record upstream and run metrics into `metrics`.
    #[cfg(feature = "metrics")]
    pub fn with_metrics(mut self, metrics: OrderHistoryMetrics) -> Self {
        self.client = self.client.with_metrics(metrics.clone());
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> &CrmConfig {
        self.client.config()
    }

    /// Run the pipeline for a contact with an explicit credential.
    pub async fn fetch_orders(
        &self,
        contact_id: Option<&str>,
        credential: &Credential,
    ) -> Result<Vec<OrderRecord>> {
        let run_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!(
            "order_pipeline",
            run_id = %run_id,
            contact_id = contact_id.unwrap_or_default()
        );
        self.run(contact_id, credential).instrument(span).await
    }

    async fn run(
        &self,
        contact_id: Option<&str>,
        credential: &Credential,
    ) -> Result<Vec<OrderRecord>> {
        let mut tracker = StageTracker::new();

        let contact_id = match contact_id.filter(|id| !id.trim().is_empty()) {
            Some(id) => id,
            None => {
                tracker.advance(Stage::Failed);
                tracing::warn!("Rejected run without a contact id");
                return Err(OrderHistoryError::MissingParameter("contactId"));
            }
        };

        tracker.advance(Stage::Resolving);
        let ids = match self.client.resolve_associations(contact_id, credential).await {
            Ok(ids) => ids,
            Err(e) => return Err(fail(&mut tracker, e)),
        };

        if ids.is_empty() {
            tracker.advance(Stage::Done);
            tracing::info!(records = 0, "Contact has no associated orders");
            return Ok(Vec::new());
        }

        tracker.advance(Stage::Fetching);
        let raw = match self.client.fetch_batches(&ids, credential).await {
            Ok(raw) => raw,
            Err(e) => return Err(fail(&mut tracker, e)),
        };

        tracker.advance(Stage::Normalizing);
        let records = normalize_all(&raw);

        tracker.advance(Stage::Done);
        tracing::info!(
            associated = ids.len(),
            records = records.len(),
            "Order history aggregated"
        );
        Ok(records)
    }

    /// Run the pipeline with the bearer token read from the environment and
    /// render the outcome as a status code plus body.
    pub async fn get_orders(&self, contact_id: Option<&str>) -> OrdersResponse {
        let credential = self.config().load_credential();
        let response = match self.fetch_orders(contact_id, &credential).await {
            Ok(records) => {
                self.record_records(records.len());
                OrdersResponse::success(&records)
            }
            Err(e) => OrdersResponse::failure(&e),
        };
        self.record_run(&response);
        response
    }

    /// Entry point for the host's serverless invocation context.
    pub async fn handle(&self, context: &FunctionContext) -> OrdersResponse {
        let contact_id = context.parameters.contact_id();
        self.get_orders(contact_id.as_deref()).await
    }

    #[cfg(feature = "metrics")]
    fn record_run(&self, response: &OrdersResponse) {
        if let Some(metrics) = &self.metrics {
            metrics.record_pipeline_run(response.status_code);
        }
    }

    #[cfg(feature = "metrics")]
    fn record_records(&self, count: usize) {
        if let Some(metrics) = &self.metrics {
            metrics.record_records_returned(count);
        }
    }

    #[cfg(not(feature = "metrics"))]
    fn record_run(&self, _response: &OrdersResponse) {}

    #[cfg(not(feature = "metrics"))]
    fn record_records(&self, _count: usize) {}
}

fn fail(tracker: &mut StageTracker, error: OrderHistoryError) -> OrderHistoryError {
    tracing::error!(stage = %tracker.current(), error = %error, "Order pipeline failed");
    tracker.advance(Stage::Failed);
    error
}

/// Status code and body handed back to the host.
///
/// A 200 body is a JSON array of [`OrderRecord`]; any other status carries a
/// plain-text diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdersResponse {
    pub status_code: u16,
    pub body: String,
}

impl OrdersResponse {
    pub fn success(records: &[OrderRecord]) -> Self {
        match serde_json::to_string(records) {
            Ok(body) => Self {
                status_code: 200,
                body,
            },
            Err(e) => Self::failure(&OrderHistoryError::from(e)),
        }
    }

    pub fn failure(error: &OrderHistoryError) -> Self {
        let body = match error {
            OrderHistoryError::MissingParameter(_) => error.to_string(),
            _ => format!("Failed to fetch order history: {}", error),
        };
        Self {
            status_code: error.status_code(),
            body,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }

    /// Decode the record list on the consuming side.
    ///
    /// Non-200 responses become an error carrying the diagnostic body.
    pub fn into_records(self) -> Result<Vec<OrderRecord>> {
        if !self.is_success() {
            return Err(anyhow::anyhow!("Error fetching orders: {}", self.body).into());
        }
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Invocation context supplied by the host.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FunctionContext {
    #[serde(default)]
    pub parameters: FunctionParameters,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FunctionParameters {
    /// Hosts send the CRM object id either as a string or a number.
    #[serde(rename = "contactId", default)]
    pub contact_id: Option<serde_json::Value>,
}

impl FunctionParameters {
    pub fn contact_id(&self) -> Option<String> {
        match self.contact_id.as_ref()? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UpstreamOperation;

    fn record(sku: &str, total: &str) -> OrderRecord {
        OrderRecord {
            sku: sku.to_string(),
            total: total.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_success_response_round_trips_records() {
        let records = vec![record("A", "100"), record("B", "50")];
        let response = OrdersResponse::success(&records);
        assert_eq!(response.status_code, 200);
        assert!(response.body.starts_with('['));
        assert_eq!(response.into_records().unwrap(), records);
    }

    #[test]
    fn test_empty_success_body_is_empty_array() {
        let response = OrdersResponse::success(&[]);
        assert_eq!(response.body, "[]");
    }

    #[test]
    fn test_failure_bodies() {
        let missing = OrdersResponse::failure(&OrderHistoryError::MissingParameter("contactId"));
        assert_eq!(missing.status_code, 400);
        assert_eq!(missing.body, "Missing contactId parameter.");

        let upstream = OrdersResponse::failure(&OrderHistoryError::Upstream {
            operation: UpstreamOperation::Associations,
            status: 401,
            body: "unauthorized".to_string(),
        });
        assert_eq!(upstream.status_code, 500);
        assert_eq!(
            upstream.body,
            "Failed to fetch order history: associations returned status 401: unauthorized"
        );
    }

    #[test]
    fn test_into_records_reports_failure_body() {
        let response = OrdersResponse {
            status_code: 500,
            body: "Failed to fetch order history: boom".to_string(),
        };
        let err = response.into_records().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error fetching orders: Failed to fetch order history: boom"
        );
    }

    #[test]
    fn test_response_serializes_status_code_camel_case() {
        let json = serde_json::to_value(OrdersResponse::success(&[])).unwrap();
        assert_eq!(json, serde_json::json!({"statusCode": 200, "body": "[]"}));
    }

    #[test]
    fn test_context_contact_id_accepts_string_or_number() {
        let ctx: FunctionContext =
            serde_json::from_str(r#"{"parameters": {"contactId": "123"}}"#).unwrap();
        assert_eq!(ctx.parameters.contact_id().as_deref(), Some("123"));

        let ctx: FunctionContext =
            serde_json::from_str(r#"{"parameters": {"contactId": 456}}"#).unwrap();
        assert_eq!(ctx.parameters.contact_id().as_deref(), Some("456"));

        let ctx: FunctionContext = serde_json::from_str(r#"{"parameters": {}}"#).unwrap();
        assert_eq!(ctx.parameters.contact_id(), None);

        let ctx: FunctionContext = serde_json::from_str("{}").unwrap();
        assert_eq!(ctx.parameters.contact_id(), None);

        let ctx: FunctionContext =
            serde_json::from_str(r#"{"parameters": {"contactId": null}}"#).unwrap();
        assert_eq!(ctx.parameters.contact_id(), None);
    }
}
