//! Prometheus metrics for the order-history pipeline.
//!
//! - **Counters**: upstream requests by operation and outcome, pipeline runs by status
//! - **Histograms**: upstream request latency, records returned per successful run

#[cfg(feature = "metrics")]
use prometheus::{CounterVec, Histogram, HistogramOpts, HistogramVec, Opts, Registry};
#[cfg(feature = "metrics")]
use std::time::Duration;

#[cfg(feature = "metrics")]
use crate::error::Result;

/// Prometheus metrics registry wrapper for the pipeline.
#[cfg(feature = "metrics")]
#[derive(Clone)]
pub struct OrderHistoryMetrics {
    registry: Registry,

    upstream_requests_total: CounterVec,
    pipeline_runs_total: CounterVec,

    upstream_request_duration_seconds: HistogramVec,
    records_returned: Histogram,
}

#[cfg(feature = "metrics")]
impl OrderHistoryMetrics {
    /// Register all metrics with `registry`.
    ///
    /// # Errors
    ///
    /// Returns an error if metrics fail to register (e.g., duplicate registration).
    pub fn new(registry: Registry) -> Result<Self> {
        let upstream_requests_total = CounterVec::new(
            Opts::new(
                "order_history_upstream_requests_total",
                "Total number of upstream CRM requests by operation and outcome",
            ),
            &["operation", "outcome"],
        )
        .map_err(|e| anyhow::anyhow!("Failed to create upstream_requests_total counter: {}", e))?;

        let pipeline_runs_total = CounterVec::new(
            Opts::new(
                "order_history_pipeline_runs_total",
                "Total number of pipeline runs by response status",
            ),
            &["status"],
        )
        .map_err(|e| anyhow::anyhow!("Failed to create pipeline_runs_total counter: {}", e))?;

        let upstream_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "order_history_upstream_request_duration_seconds",
                "Upstream CRM request duration in seconds",
            )
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
            &["operation"],
        )
        .map_err(|e| {
            anyhow::anyhow!("Failed to create upstream_request_duration_seconds histogram: {}", e)
        })?;

        let records_returned = Histogram::with_opts(
            HistogramOpts::new(
                "order_history_records_returned",
                "Number of order records returned per successful run",
            )
            .buckets(vec![0.0, 1.0, 5.0, 10.0, 50.0, 100.0, 500.0, 1000.0]),
        )
        .map_err(|e| anyhow::anyhow!("Failed to create records_returned histogram: {}", e))?;

        registry
            .register(Box::new(upstream_requests_total.clone()))
            .map_err(|e| anyhow::anyhow!("Failed to register upstream_requests_total: {}", e))?;
        registry
            .register(Box::new(pipeline_runs_total.clone()))
            .map_err(|e| anyhow::anyhow!("Failed to register pipeline_runs_total: {}", e))?;
        registry
            .register(Box::new(upstream_request_duration_seconds.clone()))
            .map_err(|e| {
                anyhow::anyhow!("Failed to register upstream_request_duration_seconds: {}", e)
            })?;
        registry
            .register(Box::new(records_returned.clone()))
            .map_err(|e| anyhow::anyhow!("Failed to register records_returned: {}", e))?;

        Ok(Self {
            registry,
            upstream_requests_total,
            pipeline_runs_total,
            upstream_request_duration_seconds,
            records_returned,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Record one upstream request.
    ///
    /// `outcome` is one of "success", "http_error" or "transport_error".
    pub fn record_upstream_request(&self, operation: &str, outcome: &str, duration: Duration) {
        self.upstream_requests_total
            .with_label_values(&[operation, outcome])
            .inc();
        self.upstream_request_duration_seconds
            .with_label_values(&[operation])
            .observe(duration.as_secs_f64());
    }

    pub fn record_pipeline_run(&self, status_code: u16) {
        let status = status_code.to_string();
        self.pipeline_runs_total
            .with_label_values(&[status.as_str()])
            .inc();
    }

    pub fn record_records_returned(&self, count: usize) {
        self.records_returned.observe(count as f64);
    }
}
