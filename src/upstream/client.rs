//! Upstream HTTP client with timeout and failure classification.
//!
//! # Responsibilities
//! - Issue one outbound GET per fetch, bounded by a hard timeout
//! - Classify every failure mode into an [`ApiError`]
//! - Decode successful bodies as JSON
//!
//! # Classification
//! ```text
//! transport error (refused, timeout, DNS, TLS, body read) → UpstreamConnection
//! status 404                                            → NotFound (caller code/message)
//! any other non-2xx status                              → UpstreamStatus
//! body is not JSON                                      → InvalidPayload
//! ```
//!
//! # Design Decisions
//! - No retries; callers decide whether a failure is fatal
//! - One log line per call with method, URL and query; header values are never logged

use std::time::{Duration, Instant};

use reqwest::StatusCode;
use serde_json::json;

use crate::config::UpstreamConfig;
use crate::http::error::{clip_chars, error_chain, ApiError, DETAIL_MAX_CHARS};
use crate::observability::metrics;
use crate::upstream::types::{FetchOutcome, FetchRequest};

/// Shared client for every government data API.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    default_timeout: Duration,
}

impl UpstreamClient {
    /// Build a client from configuration.
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            default_timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    /// Timeout applied when a request does not set its own.
    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Perform the call described by `request`.
    pub async fn fetch(&self, request: FetchRequest) -> FetchOutcome {
        let start = Instant::now();
        let upstream = request.url.host_str().unwrap_or("unknown").to_string();

        let outcome = self.execute(request).await;

        let label = match &outcome {
            Ok(_) => "ok",
            Err(e) => e.kind().as_str(),
        };
        metrics::record_upstream_call(&upstream, label, start);
        outcome
    }

    async fn execute(&self, request: FetchRequest) -> FetchOutcome {
        let timeout = request.timeout.unwrap_or(self.default_timeout);

        tracing::info!(
            method = "GET",
            url = %request.url,
            params = ?request.query,
            headers = ?request.header_names(),
            timeout_ms = timeout.as_millis() as u64,
            "Upstream request"
        );

        let mut builder = self.http.get(request.url.clone()).timeout(timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => return Err(transport_failure(&request, &e)),
        };

        let status = response.status();
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => return Err(transport_failure(&request, &e)),
        };

        if status == StatusCode::NOT_FOUND {
            tracing::info!(url = %request.url, code = %request.not_found.code, "Upstream resource not found");
            return Err(ApiError::not_found(request.not_found.message)
                .with_code(request.not_found.code)
                .with_detail_text(String::from_utf8_lossy(&body)));
        }

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body);
            tracing::warn!(url = %request.url, status = status.as_u16(), "Upstream returned an error status");
            return Err(ApiError::upstream_status("Upstream service returned an error.")
                .with_detail(json!({
                    "upstream_status": status.as_u16(),
                    "body": clip_chars(&text, DETAIL_MAX_CHARS),
                })));
        }

        serde_json::from_slice(&body).map_err(|e| {
            tracing::warn!(url = %request.url, error = %e, "Upstream returned invalid JSON");
            ApiError::invalid_payload("Invalid JSON response from upstream service.")
                .with_detail_text(e.to_string())
        })
    }
}

impl std::fmt::Debug for UpstreamClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamClient")
            .field("default_timeout", &self.default_timeout)
            .finish()
    }
}

fn transport_failure(request: &FetchRequest, error: &reqwest::Error) -> ApiError {
    // A request we could not even build is our bug, not the upstream's.
    if error.is_builder() {
        return ApiError::unclassified(error);
    }

    let chain = error_chain(error);
    tracing::warn!(
        url = %request.url,
        timeout = error.is_timeout(),
        connect = error.is_connect(),
        error = %chain,
        "Upstream unreachable"
    );

    let message = if error.is_timeout() {
        "Upstream service timed out."
    } else {
        "Could not connect to upstream service."
    };
    ApiError::upstream_connection(message).with_detail_text(chain)
}
