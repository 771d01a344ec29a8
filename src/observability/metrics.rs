//! Metrics collection and exposition.
//!
//! # Metrics
//! - `faif_requests_total` (counter): inbound requests by method, status
//! - `faif_request_duration_seconds` (histogram): inbound latency
//! - `faif_upstream_requests_total` (counter): upstream calls by host, outcome
//! - `faif_upstream_duration_seconds` (histogram): upstream latency by host
//! - `faif_audit_records_total` (counter): audit writes by result
//!
//! # Design Decisions
//! - Recording helpers are free functions so call sites stay one line
//! - The Prometheus exporter is only installed when enabled in config

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// One completed inbound request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    counter!(
        "faif_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("faif_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// One upstream call; `outcome` is `ok` or the error kind.
pub fn record_upstream_call(upstream: &str, outcome: &'static str, start: Instant) {
    counter!(
        "faif_upstream_requests_total",
        "upstream" => upstream.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    histogram!("faif_upstream_duration_seconds", "upstream" => upstream.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// One audit record outcome: `stored`, `failed`, `dropped` or `closed`.
pub fn record_audit_record(result: &'static str) {
    counter!("faif_audit_records_total", "result" => result).increment(1);
}
