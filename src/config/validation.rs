//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, limits > 0)
//! - Check that base URLs parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    /// What is wrong with it.
    pub reason: String,
}

impl ValidationError {
    fn new(field: &str, reason: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Check a parsed configuration for values serde cannot reject on its own.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    let upstream = &config.upstream;
    if upstream.timeout_secs == 0 {
        errors.push(ValidationError::new("upstream.timeout_secs", "must be greater than zero"));
    }
    if upstream.connect_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "upstream.connect_timeout_secs",
            "must be greater than zero",
        ));
    }
    if config.timeouts.request_secs <= upstream.timeout_secs {
        errors.push(ValidationError::new(
            "timeouts.request_secs",
            format!(
                "must exceed upstream.timeout_secs ({}s) so upstream failures are classified before the request is cut",
                upstream.timeout_secs
            ),
        ));
    }

    for (field, value) in [
        ("upstream.brasilapi_url", &upstream.brasilapi_url),
        ("upstream.camara_url", &upstream.camara_url),
        ("upstream.ibge_url", &upstream.ibge_url),
        ("upstream.servicos_url", &upstream.servicos_url),
        ("upstream.transparencia_url", &upstream.transparencia_url),
    ] {
        match Url::parse(value) {
            Ok(url) if url.cannot_be_a_base() => {
                errors.push(ValidationError::new(field, "cannot be used as a base URL"));
            }
            Ok(_) => {}
            Err(e) => errors.push(ValidationError::new(field, e.to_string())),
        }
    }

    let audit = &config.audit;
    for (field, value) in [
        ("audit.queue_capacity", audit.queue_capacity),
        ("audit.max_string_len", audit.max_string_len),
        ("audit.max_list_items", audit.max_list_items),
        ("audit.max_map_entries", audit.max_map_entries),
        ("audit.max_depth", audit.max_depth),
        ("audit.memory_retention", audit.memory_retention),
        ("audit.default_list_limit", audit.default_list_limit),
        ("audit.max_list_limit", audit.max_list_limit),
    ] {
        if value == 0 {
            errors.push(ValidationError::new(field, "must be greater than zero"));
        }
    }
    if audit.default_list_limit > audit.max_list_limit {
        errors.push(ValidationError::new(
            "audit.default_list_limit",
            "must not exceed audit.max_list_limit",
        ));
    }
    if audit.path.trim().is_empty() {
        errors.push(ValidationError::new("audit.path", "must not be empty"));
    }

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
