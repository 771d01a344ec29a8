//! Process health reporting.
//!
//! # Data Flow
//! ```text
//! Request lifecycle hook
//!     → counters.rs (total, failed, cumulative duration)
//!
//! GET /health
//!     → report.rs (uptime, counters snapshot, audit store status)
//! ```
//!
//! # Design Decisions
//! - Counters are injected through application state, never global
//! - A request counts as failed when its status is 5xx

pub mod counters;
pub mod report;

pub use counters::{RequestCounters, RequestMetrics};
pub use report::{AuditStatus, EnvStatus, HealthReport, ProcessInfo};
