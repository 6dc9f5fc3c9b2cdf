//! HTTP client abstraction for talking to the CRM API.
//!
//! This module defines the `HttpClient` trait to abstract HTTP request execution,
//! enabling testability with mock implementations.

use crate::config::Credential;
use crate::error::Result;
use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;

/// A single outbound request to the CRM API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// HTTP method (e.g., "POST", "GET")
    pub method: String,
    /// Fully resolved URL, path segments already percent-encoded
    pub url: Url,
    /// JSON body, for methods that carry one
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn get(url: Url) -> Self {
        Self {
            method: "GET".to_string(),
            url,
            body: None,
        }
    }

    pub fn post_json(url: Url, body: String) -> Self {
        Self {
            method: "POST".to_string(),
            url,
            body: Some(body),
        }
    }
}

/// Response from an HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as a string
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for executing HTTP requests.
///
/// This abstraction allows for different implementations (production vs. testing)
/// and makes the pipeline testable without making real HTTP calls.
///
/// # Example
/// ```ignore
/// let client = ReqwestHttpClient::new();
/// let response = client.execute(&request, &credential, 5000).await?;
/// println!("Status: {}, Body: {}", response.status, response.body);
/// ```
#[async_trait]
pub trait HttpClient: Send + Sync + Clone {
    /// Execute an HTTP request.
    ///
    /// # Arguments
    /// * `request` - Method, URL and optional JSON body
    /// * `credential` - Bearer token; an empty credential sends no Authorization header
    /// * `timeout_ms` - Request timeout in milliseconds
    ///
    /// # Errors
    /// Returns an error if the request fails due to network issues or times out.
    /// Non-2xx statuses are *not* errors at this layer.
    async fn execute(
        &self,
        request: &HttpRequest,
        credential: &Credential,
        timeout_ms: u64,
    ) -> Result<HttpResponse>;
}

// ============================================================================
// Production Implementation using reqwest
// ============================================================================

/// Production HTTP client using reqwest.
#[derive(Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    #[tracing::instrument(skip(self, request, credential), fields(method = %request.method, path = %request.url.path()))]
    async fn execute(
        &self,
        request: &HttpRequest,
        credential: &Credential,
        timeout_ms: u64,
    ) -> Result<HttpResponse> {
        tracing::debug!(timeout_ms = timeout_ms, "Executing HTTP request");

        let method = request.method.parse::<reqwest::Method>().map_err(|e| {
            tracing::error!(method = %request.method, error = %e, "Invalid HTTP method");
            anyhow::anyhow!("Invalid HTTP method '{}': {}", request.method, e)
        })?;

        let mut req = self
            .client
            .request(method, request.url.clone())
            .timeout(Duration::from_millis(timeout_ms));

        // Only add Authorization header if a token is configured
        if !credential.is_empty() {
            req = req.bearer_auth(credential.expose());
        }

        if let Some(body) = &request.body {
            req = req
                .header("Content-Type", "application/json")
                .body(body.clone());
            tracing::trace!(body_len = body.len(), "Added request body");
        }

        let response = req.send().await.map_err(|e| {
            tracing::error!(url = %request.url, error = %e, "HTTP request failed");
            e
        })?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        tracing::debug!(
            status = status,
            response_len = body.len(),
            "HTTP request completed"
        );

        Ok(HttpResponse { status, body })
    }
}

// ----------------------------------------------------------------------------
// Scripted client for tests
// ----------------------------------------------------------------------------

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::oneshot;

/// Scripted [`HttpClient`] that never touches the network.
///
/// Each `"{METHOD} {path}"` key owns a queue of canned responses, consumed
/// front first. Calls with an empty queue fail. Every call is captured along
/// with the token and timeout it was made with.
///
/// # Example
/// ```ignore
/// let mock = MockHttpClient::new();
/// mock.add_response(
///     "POST /crm/v3/objects/2-46785961/batch/read",
///     Ok(HttpResponse {
///         status: 200,
///         body: r#"{"results": []}"#.to_string(),
///     }),
/// );
/// ```
#[derive(Clone)]
pub struct MockHttpClient {
    responses: Arc<Mutex<HashMap<String, Vec<MockResponse>>>>,
    calls: Arc<Mutex<Vec<MockCall>>>,
    in_flight: Arc<AtomicUsize>,
}

enum MockResponse {
    Ready(Result<HttpResponse>),
    /// Held back until the paired sender fires or is dropped.
    Gated {
        response: Result<HttpResponse>,
        gate: Arc<Mutex<Option<oneshot::Receiver<()>>>>,
    },
}

/// One captured call.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub method: String,
    pub path: String,
    pub body: Option<String>,
    pub token: String,
    pub timeout_ms: u64,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Queue `response` for the next call matching `key` (`"GET /crm/..."`).
    pub fn add_response(&self, key: &str, response: Result<HttpResponse>) {
        self.responses
            .lock()
            .entry(key.to_string())
            .or_default()
            .push(MockResponse::Ready(response));
    }

    /// Queue a JSON body with the given status.
    pub fn add_json_response(&self, key: &str, status: u16, body: serde_json::Value) {
        self.add_response(
            key,
            Ok(HttpResponse {
                status,
                body: body.to_string(),
            }),
        );
    }

    /// Queue a response that stalls its call until the returned sender
    /// fires or is dropped.
    pub fn add_response_with_trigger(
        &self,
        key: &str,
        response: Result<HttpResponse>,
    ) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.responses
            .lock()
            .entry(key.to_string())
            .or_default()
            .push(MockResponse::Gated {
                response,
                gate: Arc::new(Mutex::new(Some(rx))),
            });
        tx
    }

    /// Snapshot of the captured calls, oldest first.
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Number of calls whose method is `method`.
    pub fn call_count_for(&self, method: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.method == method)
            .count()
    }

    /// Calls that have started but not yet returned.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}

impl Default for MockHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn execute(
        &self,
        request: &HttpRequest,
        credential: &Credential,
        timeout_ms: u64,
    ) -> Result<HttpResponse> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);

        let _pending = PendingCall(self.in_flight.clone());

        let path = request.url.path().to_string();
        self.calls.lock().push(MockCall {
            method: request.method.clone(),
            path: path.clone(),
            body: request.body.clone(),
            token: credential.expose().to_string(),
            timeout_ms,
        });

        let key = format!("{} {}", request.method, path);
        let mock_response = {
            let mut responses = self.responses.lock();
            match responses.get_mut(&key) {
                Some(queue) if !queue.is_empty() => Some(queue.remove(0)),
                _ => None,
            }
        };

        match mock_response {
            Some(MockResponse::Ready(response)) => response,
            Some(MockResponse::Gated { response, gate }) => {
                let rx = gate.lock().take();
                if let Some(rx) = rx {
                    // fired or dropped, either releases the call
                    let _ = rx.await;
                }
                response
            }
            None => Err(crate::error::OrderHistoryError::Other(anyhow::anyhow!(
                "No mock response configured for {} {}",
                request.method,
                path
            ))),
        }
    }
}

/// Decrements the in-flight count however `execute` exits.
struct PendingCall(Arc<AtomicUsize>);

impl Drop for PendingCall {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
