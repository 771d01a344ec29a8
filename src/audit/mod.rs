//! Audit subsystem.
//!
//! # Data Flow
//! ```text
//! Request lifecycle hook
//!     → recorder.rs (bound with truncate.rs, enqueue without waiting)
//!     → single writer task
//!     → store.rs (memory ring or JSON lines file)
//!
//! History route
//!     → store.rs list (newest first)
//! ```
//!
//! # Design Decisions
//! - Recording is best-effort: a full queue or failing store drops the record
//! - Every stored payload is bounded in size and depth before it is queued

pub mod record;
pub mod recorder;
pub mod store;
pub mod truncate;

pub use record::{AuditRecord, NewAuditRecord, RequestSummary};
pub use recorder::AuditRecorder;
pub use store::{AuditStore, AuditStoreError, JsonlAuditStore, MemoryAuditStore};
pub use truncate::{AuditLimits, TRUNCATION_MARKER};
