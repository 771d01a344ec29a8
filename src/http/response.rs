//! Response envelopes and error translation.
//!
//! # Responsibilities
//! - Wrap successful payloads as `{"ok": true, "data": ...}`
//! - Render every [`ApiError`] as `{"ok": false, "error": {code, message, detail}}`
//! - Collapse unclassified failures (foreign errors, panics) into a generic
//!   internal error without leaking their cause
//!
//! # Design Decisions
//! - Status code and envelope shape depend only on the error kind, never on the route
//! - The cause of an unclassified failure is logged, not returned

use std::any::Any;
use std::error::Error as StdError;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http::error::{ApiError, ErrorKind};

/// Successful response: `{"ok": true, "data": <T>}`.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self { ok: true, data }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Wire form of an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub ok: bool,
    pub error: ErrorBody,
}

/// The `error` member of [`ErrorEnvelope`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    /// Always present on the wire; `null` when there is nothing to add.
    pub detail: Option<Value>,
}

impl From<&ApiError> for ErrorEnvelope {
    fn from(err: &ApiError) -> Self {
        Self {
            ok: false,
            error: ErrorBody {
                code: err.code().to_string(),
                message: err.message().to_string(),
                detail: err.detail().cloned(),
            },
        }
    }
}

/// Render any failure as an envelope and the status to send it with.
///
/// An [`ApiError`] keeps its own code, message, detail and status. Anything
/// else becomes the generic internal error; its cause is logged.
pub fn translate(error: &(dyn StdError + 'static)) -> (ErrorEnvelope, StatusCode) {
    match error.downcast_ref::<ApiError>() {
        Some(api) => (ErrorEnvelope::from(api), api.status()),
        None => {
            let internal = ApiError::unclassified(error);
            (ErrorEnvelope::from(&internal), internal.status())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (envelope, status) = translate(&self);
        if self.kind() == ErrorKind::Internal || status.is_server_error() {
            tracing::warn!(
                status = status.as_u16(),
                code = %envelope.error.code,
                kind = self.kind().as_str(),
                message = %envelope.error.message,
                "Returning error response"
            );
        } else {
            tracing::debug!(
                status = status.as_u16(),
                code = %envelope.error.code,
                "Returning error response"
            );
        }
        (status, Json(envelope)).into_response()
    }
}

/// Fallback for paths no route matches.
pub async fn route_not_found() -> ApiError {
    ApiError::not_found("Route not found.").with_code("ROUTE_NOT_FOUND")
}

/// Turn a handler panic into the generic internal envelope.
///
/// Used with `tower_http::catch_panic::CatchPanicLayer::custom`.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let reason = if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else {
        "non-string panic payload"
    };
    tracing::error!(panic = %reason, "Handler panicked");
    ApiError::internal().into_response()
}
