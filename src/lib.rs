//! FAIF gateway library.
//!
//! Aggregates Brazilian government data APIs behind one JSON surface with a
//! uniform error envelope, request auditing and health reporting.

pub mod audit;
pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routes;
pub mod upstream;

pub use config::schema::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
