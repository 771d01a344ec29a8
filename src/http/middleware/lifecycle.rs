//! Request lifecycle hook.
//! Times every request, updates counters and hands an audit summary to the recorder.

use std::net::{IpAddr, SocketAddr};
use std::time::Instant;

use axum::{
    body::{Body, Bytes, HttpBody},
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use futures_util::stream;
use serde_json::{Map, Value};

use crate::audit::RequestSummary;
use crate::http::request::request_id_of;
use crate::http::server::AppState;
use crate::observability::metrics;

pub async fn request_lifecycle(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();

    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let audit = &state.config.audit;
    let audited = audit.enabled && !is_excluded(&path, &audit.excluded_paths);

    if !audited {
        let response = next.run(request).await;
        finish(&state, &method, response.status().as_u16(), start);
        return response;
    }

    let query = query_map(request.uri().query());
    let client_ip = client_ip(&request);
    let request_id = request_id_of(&request).map(str::to_owned);
    let (request, body) = capture_json_body(request, state.config.listener.max_body_bytes).await;

    let response = next.run(request).await;
    let status = response.status().as_u16();
    finish(&state, &method, status, start);

    let (response, response_length, response_snippet) =
        summarize_response(response, state.recorder.limits().max_string_len).await;

    let summary = RequestSummary {
        method,
        path: path.clone(),
        query,
        body,
        status_code: status,
        response_length,
        response_snippet,
        duration_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        request_id,
    };

    match serde_json::to_value(&summary) {
        Ok(parameters) => state.recorder.record(&path, &parameters, client_ip),
        Err(e) => tracing::warn!(path = %path, error = %e, "Could not encode audit summary"),
    }

    response
}

fn finish(state: &AppState, method: &str, status: u16, start: Instant) {
    state.counters.observe(status, start.elapsed());
    metrics::record_request(method, status, start);
}

/// True when `path` starts with any excluded prefix.
pub fn is_excluded(path: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
}

/// Decode a query string; the first occurrence of a repeated key wins.
pub fn query_map(query: Option<&str>) -> Map<String, Value> {
    let mut params = Map::new();
    for (key, value) in url::form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
        params
            .entry(key.into_owned())
            .or_insert_with(|| Value::String(value.into_owned()));
    }
    params
}

fn client_ip(request: &Request<Body>) -> Option<IpAddr> {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.to_ascii_lowercase().contains("application/json"))
}

fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

/// Read a JSON request body of known, bounded size and put it back.
async fn capture_json_body(request: Request<Body>, limit: usize) -> (Request<Body>, Option<Value>) {
    let fits = declared_length(request.headers()).is_some_and(|len| len > 0 && len <= limit as u64);
    if !is_json(request.headers()) || !fits {
        return (request, None);
    }

    let (parts, body) = request.into_parts();
    match axum::body::to_bytes(body, limit).await {
        Ok(bytes) => {
            let parsed = serde_json::from_slice(&bytes).ok();
            (Request::from_parts(parts, Body::from(bytes)), parsed)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read request body for audit");
            (Request::from_parts(parts, failed_body(e)), None)
        }
    }
}

/// Length and, for small bodies, the text of a response.
///
/// Only bodies with an exact size hint are read; streaming bodies pass
/// through untouched with neither value recorded.
async fn summarize_response(
    response: Response,
    max_snippet: usize,
) -> (Response, Option<u64>, Option<String>) {
    let length = declared_length(response.headers()).or_else(|| response.body().size_hint().exact());
    let Some(length) = length else {
        return (response, None, None);
    };
    if length > max_snippet as u64 {
        return (response, Some(length), None);
    }

    let (parts, body) = response.into_parts();
    match axum::body::to_bytes(body, max_snippet).await {
        Ok(bytes) => {
            let snippet = String::from_utf8_lossy(&bytes).into_owned();
            (Response::from_parts(parts, Body::from(bytes)), Some(length), Some(snippet))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read response body for audit");
            (Response::from_parts(parts, failed_body(e)), Some(length), None)
        }
    }
}

/// A body that fails with `error` when read, so a read failure seen while
/// summarizing still reaches the handler or client.
fn failed_body(error: axum::Error) -> Body {
    Body::from_stream(stream::once(async move { Err::<Bytes, _>(error) }))
}
