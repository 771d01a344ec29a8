//! Health payload assembly.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::audit::AuditStore;
use crate::health::counters::{RequestCounters, RequestMetrics};

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    /// `ok`, or `degraded` when the audit store cannot be read.
    pub status: &'static str,
    pub uptime_seconds: u64,
    pub started_at: DateTime<Utc>,
    pub pid: u32,
    pub platform: String,
    pub app_version: String,
    pub request_metrics: RequestMetrics,
    pub audit: AuditStatus,
    pub env: EnvStatus,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditStatus {
    pub store: &'static str,
    pub records: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct EnvStatus {
    pub portal_api_key_present: bool,
}

/// Process facts fixed at startup.
#[derive(Debug, Clone)]
pub struct ProcessInfo {
    pub started_at: DateTime<Utc>,
    pub started: Instant,
    pub app_version: String,
    pub portal_api_key_present: bool,
}

impl ProcessInfo {
    pub fn capture(app_version: impl Into<String>, portal_api_key_present: bool) -> Self {
        Self {
            started_at: Utc::now(),
            started: Instant::now(),
            app_version: app_version.into(),
            portal_api_key_present,
        }
    }
}

impl HealthReport {
    /// Read counters and probe the audit store. Never fails: a store error
    /// is reported inside the payload.
    pub async fn collect(
        process: &ProcessInfo,
        counters: &RequestCounters,
        store: &dyn AuditStore,
    ) -> Self {
        let audit = match store.count().await {
            Ok(records) => AuditStatus {
                store: store.kind(),
                records: Some(records),
                error: None,
            },
            Err(e) => {
                tracing::warn!(store = store.kind(), error = %e, "Audit store unavailable for health report");
                AuditStatus {
                    store: store.kind(),
                    records: None,
                    error: Some(e.to_string()),
                }
            }
        };

        Self {
            status: if audit.error.is_none() { "ok" } else { "degraded" },
            uptime_seconds: process.started.elapsed().as_secs(),
            started_at: process.started_at,
            pid: std::process::id(),
            platform: format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH),
            app_version: process.app_version.clone(),
            request_metrics: counters.snapshot(),
            audit,
            env: EnvStatus {
                portal_api_key_present: process.portal_api_key_present,
            },
            timestamp: Utc::now(),
        }
    }
}
