//! Typed error model.
//!
//! Every failure a route can surface is an [`ApiError`]: a closed
//! [`ErrorKind`] fixing the HTTP status, a stable machine `code` chosen at the
//! failure site, a human `message` and an optional `detail`.
//!
//! # Status mapping
//! - `BadRequest` → 400
//! - `NotFound` → 404
//! - `UpstreamConnection`, `UpstreamStatus`, `InvalidPayload` → 502
//! - `Internal` → 500

use std::borrow::Cow;
use std::error::Error as StdError;

use axum::http::StatusCode;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Longest textual detail carried by an error, in characters.
pub const DETAIL_MAX_CHARS: usize = 500;

/// Category of a failure. Decides the HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Caller input is invalid.
    BadRequest,
    /// The resource does not exist upstream, or a business filter matched nothing.
    NotFound,
    /// The upstream could not be reached (refused, timeout, DNS, TLS).
    UpstreamConnection,
    /// The upstream answered with a non-success status other than 404.
    UpstreamStatus,
    /// The upstream answered with a body that is not valid JSON.
    InvalidPayload,
    /// Anything unclassified.
    Internal,
}

impl ErrorKind {
    /// HTTP status every error of this kind is rendered with.
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::UpstreamConnection
            | ErrorKind::UpstreamStatus
            | ErrorKind::InvalidPayload => StatusCode::BAD_GATEWAY,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Code used when the failure site does not pick a more specific one.
    pub fn default_code(self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "BAD_REQUEST",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::UpstreamConnection => "UPSTREAM_CONNECTION_ERROR",
            ErrorKind::UpstreamStatus => "UPSTREAM_ERROR",
            ErrorKind::InvalidPayload => "INVALID_JSON",
            ErrorKind::Internal => "INTERNAL_ERROR",
        }
    }

    /// Short label for logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "bad_request",
            ErrorKind::NotFound => "not_found",
            ErrorKind::UpstreamConnection => "upstream_connection",
            ErrorKind::UpstreamStatus => "upstream_status",
            ErrorKind::InvalidPayload => "invalid_payload",
            ErrorKind::Internal => "internal",
        }
    }
}

/// A classified failure, rendered as the error envelope.
#[derive(Debug, Clone, Error)]
#[error("{code}: {message}")]
pub struct ApiError {
    kind: ErrorKind,
    code: Cow<'static, str>,
    message: Cow<'static, str>,
    detail: Option<Value>,
}

impl ApiError {
    /// Create an error of `kind` with its default code.
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            code: Cow::Borrowed(kind.default_code()),
            message: message.into(),
            detail: None,
        }
    }

    pub fn bad_request(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn upstream_connection(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::UpstreamConnection, message)
    }

    pub fn upstream_status(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::UpstreamStatus, message)
    }

    pub fn invalid_payload(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::InvalidPayload, message)
    }

    /// The generic internal error. Its message never reveals the cause.
    pub fn internal() -> Self {
        Self::new(ErrorKind::Internal, "Internal server error.")
    }

    /// Classify a failure that was not built through this model.
    ///
    /// The full cause chain goes to the log; the returned error only carries
    /// the generic internal message.
    pub fn unclassified(error: &(dyn StdError + 'static)) -> Self {
        tracing::error!(error = %error_chain(error), "Unclassified failure");
        Self::internal()
    }

    /// Override the machine code.
    pub fn with_code(mut self, code: impl Into<Cow<'static, str>>) -> Self {
        self.code = code.into();
        self
    }

    /// Attach structured detail, e.g. `{"page": "0"}`.
    pub fn with_detail(mut self, detail: impl Into<Value>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Attach textual detail, clipped to [`DETAIL_MAX_CHARS`].
    pub fn with_detail_text(self, detail: impl AsRef<str>) -> Self {
        let clipped = clip_chars(detail.as_ref(), DETAIL_MAX_CHARS).to_string();
        self.with_detail(Value::String(clipped))
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn status(&self) -> StatusCode {
        self.kind.status()
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn detail(&self) -> Option<&Value> {
        self.detail.as_ref()
    }
}

/// Result alias for handlers and the upstream client.
pub type ApiResult<T> = Result<T, ApiError>;

/// Longest prefix of `s` holding at most `max_chars` characters.
pub fn clip_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Render an error with all of its sources, outermost first.
pub fn error_chain(error: &(dyn StdError + 'static)) -> String {
    let mut out = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !out.ends_with(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        source = cause.source();
    }
    out
}
