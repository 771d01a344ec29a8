//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID assigned or kept)
//!     → middleware/lifecycle.rs (timing, counters, audit summary)
//!     → routes (handler returns ApiResponse or ApiError)
//!     → response.rs (envelope rendering, error translation)
//!     → Send to client
//! ```

pub mod error;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use error::{ApiError, ApiResult, ErrorKind};
pub use request::X_REQUEST_ID;
pub use response::{translate, ApiResponse, ErrorEnvelope};
pub use server::{AppState, HttpServer};
