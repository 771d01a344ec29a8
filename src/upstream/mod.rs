//! Upstream fetch subsystem.
//!
//! # Data Flow
//! ```text
//! Route handler
//!     → types.rs (FetchRequest: URL, headers, query, timeout, not-found code)
//!     → client.rs (GET with hard timeout, failure classification)
//!     → FetchOutcome (decoded JSON or ApiError)
//!     → payload.rs (safe accessors used by reshaping code)
//! ```
//!
//! # Design Decisions
//! - All transport handling lives here; routes only describe what to fetch
//! - Fallback policy (e.g. empty list on failure) belongs to the route

pub mod client;
pub mod payload;
pub mod types;

pub use client::UpstreamClient;
pub use payload::PayloadExt;
pub use types::{FetchOutcome, FetchRequest, NotFoundSpec};
