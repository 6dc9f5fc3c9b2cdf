//! Configuration for the CRM client and pipeline.

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::{OrderHistoryError, Result};

/// Largest number of inputs the upstream batch-read endpoint accepts.
pub const MAX_BATCH_READ_INPUTS: usize = 100;

/// Custom object type holding one order line per record.
pub const DEFAULT_OBJECT_TYPE_ID: &str = "2-46785961";

/// Environment variable the bearer token is read from.
pub const DEFAULT_TOKEN_ENV_VAR: &str = "HUBSPOT_PRIVATE_TOKEN";

/// Connection and batching settings for the CRM API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrmConfig {
    /// Base URL of the CRM API (e.g., <https://api.hubapi.com>)
    pub base_url: String,

    /// Custom object type id associated with contacts
    pub object_type_id: String,

    /// Maximum ids per batch-read request; clamped to `1..=100`
    pub batch_read_limit: usize,

    /// Timeout for each individual upstream request in milliseconds
    pub timeout_ms: u64,

    /// Name of the environment variable holding the bearer token
    pub token_env_var: String,
}

impl Default for CrmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.hubapi.com".to_string(),
            object_type_id: DEFAULT_OBJECT_TYPE_ID.to_string(),
            batch_read_limit: MAX_BATCH_READ_INPUTS,
            timeout_ms: 30_000,
            token_env_var: DEFAULT_TOKEN_ENV_VAR.to_string(),
        }
    }
}

impl CrmConfig {
    /// Chunk size actually used for batch reads.
    pub fn effective_batch_limit(&self) -> usize {
        self.batch_read_limit.clamp(1, MAX_BATCH_READ_INPUTS)
    }

    /// Parsed base URL.
    pub fn base_url(&self) -> Result<Url> {
        Url::parse(&self.base_url).map_err(|e| {
            OrderHistoryError::Other(anyhow::anyhow!(
                "Invalid CRM base URL '{}': {}",
                self.base_url,
                e
            ))
        })
    }

    /// Read the bearer token from the configured environment variable.
    ///
    /// A missing variable yields an empty credential; the upstream then
    /// rejects the request with 401 which surfaces as an upstream failure.
    pub fn load_credential(&self) -> Credential {
        match std::env::var(&self.token_env_var) {
            Ok(token) => Credential::new(token),
            Err(_) => {
                tracing::warn!(
                    env_var = %self.token_env_var,
                    "Bearer token not set, sending unauthenticated requests"
                );
                Credential::default()
            }
        }
    }
}

/// Bearer token sent in the `Authorization` header.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Credential(token.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            f.write_str("Credential(<empty>)")
        } else {
            f.write_str("Credential(<redacted>)")
        }
    }
}
