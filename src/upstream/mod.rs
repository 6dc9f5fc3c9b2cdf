//! Client for the CRM endpoints the pipeline depends on.
//!
//! `CrmClient` wraps an [`HttpClient`] with the URL layout, status handling
//! and timing shared by the association lookup and the batch reader.

use std::sync::Arc;
use std::time::Instant;

use reqwest::Url;

use crate::config::{CrmConfig, Credential};
use crate::error::{OrderHistoryError, Result, UpstreamOperation};
use crate::http::{HttpClient, HttpRequest};
#[cfg(feature = "metrics")]
use crate::metrics::OrderHistoryMetrics;

mod associations;
mod batch_read;

/// Typed access to the associations and batch-read endpoints.
#[derive(Clone)]
pub struct CrmClient<H: HttpClient> {
    http_client: Arc<H>,
    config: CrmConfig,
    #[cfg(feature = "metrics")]
    metrics: Option<OrderHistoryMetrics>,
}

impl<H: HttpClient> CrmClient<H> {
    pub fn new(http_client: Arc<H>, config: CrmConfig) -> Self {
        Self {
            http_client,
            config,
            #[cfg(feature = "metrics")]
            metrics: None,
        }
    }

    #[cfg(feature = "metrics")]
    pub fn with_metrics(mut self, metrics: OrderHistoryMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> &CrmConfig {
        &self.config
    }

    /// Build `{base_url}/{segments...}`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.config.base_url()?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("CRM base URL cannot be a base: {}", self.config.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Execute a request and return the body of a 2xx response.
    ///
    /// Non-2xx responses become [`OrderHistoryError::Upstream`] with the raw
    /// body attached. Nothing is retried.
    async fn send(
        &self,
        operation: UpstreamOperation,
        request: HttpRequest,
        credential: &Credential,
    ) -> Result<String> {
        let started = Instant::now();
        let result = self
            .http_client
            .execute(&request, credential, self.config.timeout_ms)
            .await;
        let elapsed = started.elapsed();

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(
                    operation = %operation,
                    path = %request.url.path(),
                    error = %e,
                    "Upstream request failed before a response was received"
                );
                self.record_upstream(operation, "transport_error", elapsed);
                return Err(e);
            }
        };

        if !response.is_success() {
            tracing::error!(
                operation = %operation,
                path = %request.url.path(),
                status = response.status,
                body = %response.body,
                "Upstream returned an error status"
            );
            self.record_upstream(operation, "http_error", elapsed);
            return Err(OrderHistoryError::Upstream {
                operation,
                status: response.status,
                body: response.body,
            });
        }

        tracing::debug!(
            operation = %operation,
            status = response.status,
            elapsed_ms = elapsed.as_millis() as u64,
            "Upstream request succeeded"
        );
        self.record_upstream(operation, "success", elapsed);
        Ok(response.body)
    }

    #[cfg(feature = "metrics")]
    fn record_upstream(
        &self,
        operation: UpstreamOperation,
        outcome: &str,
        elapsed: std::time::Duration,
    ) {
        if let Some(metrics) = &self.metrics {
            metrics.record_upstream_request(operation.as_str(), outcome, elapsed);
        }
    }

    #[cfg(not(feature = "metrics"))]
    fn record_upstream(
        &self,
        _operation: UpstreamOperation,
        _outcome: &str,
        _elapsed: std::time::Duration,
    ) {
    }
}
