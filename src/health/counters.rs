//! Process-wide request counters.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;

/// Request totals shared by the lifecycle hook and the health route.
///
/// Each counter is updated independently with relaxed ordering; a snapshot
/// may mix values from requests finishing concurrently.
#[derive(Debug, Default)]
pub struct RequestCounters {
    total: AtomicU64,
    failed: AtomicU64,
    total_duration_ms: AtomicU64,
}

/// Point-in-time view of [`RequestCounters`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RequestMetrics {
    pub total_requests: u64,
    pub failed_requests: u64,
    /// `None` until the first request completes.
    pub avg_duration_ms: Option<u64>,
}

impl RequestCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one completed request.
    pub fn observe(&self, status: u16, duration: Duration) {
        self.total.fetch_add(1, Ordering::Relaxed);
        if status >= 500 {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self.total_duration_ms.fetch_add(millis, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> RequestMetrics {
        let total = self.total.load(Ordering::Relaxed);
        let failed = self.failed.load(Ordering::Relaxed);
        let duration = self.total_duration_ms.load(Ordering::Relaxed);

        RequestMetrics {
            total_requests: total,
            failed_requests: failed,
            avg_duration_ms: (total > 0).then(|| duration / total),
        }
    }
}
