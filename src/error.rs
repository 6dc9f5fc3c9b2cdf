//! Error types for the order aggregation pipeline.

use thiserror::Error;

/// Result type alias using the order-history error type.
pub type Result<T> = std::result::Result<T, OrderHistoryError>;

/// Which upstream call produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamOperation {
    /// Contact → custom object association lookup
    Associations,
    /// Custom object batch read
    BatchRead,
}

impl UpstreamOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpstreamOperation::Associations => "associations",
            UpstreamOperation::BatchRead => "batch_read",
        }
    }
}

impl std::fmt::Display for UpstreamOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main error type for the pipeline.
#[derive(Error, Debug)]
pub enum OrderHistoryError {
    /// A required caller-supplied parameter was absent or empty
    #[error("Missing {0} parameter.")]
    MissingParameter(&'static str),

    /// The upstream API answered with a non-2xx status
    #[error("{operation} returned status {status}: {body}")]
    Upstream {
        operation: UpstreamOperation,
        status: u16,
        /// Raw diagnostic body returned by the upstream
        body: String,
    },

    /// HTTP client error (transport, timeout, invalid URL)
    #[error("HTTP request failed: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// General error from anyhow
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OrderHistoryError {
    /// HTTP-equivalent status code reported to the caller.
    ///
    /// Only a missing parameter is the caller's fault; everything else happened
    /// while talking to (or decoding) the upstream and maps to 500.
    pub fn status_code(&self) -> u16 {
        match self {
            OrderHistoryError::MissingParameter(_) => 400,
            _ => 500,
        }
    }

    /// True for failures that originate upstream of the pipeline.
    pub fn is_upstream(&self) -> bool {
        !matches!(self, OrderHistoryError::MissingParameter(_))
    }
}
