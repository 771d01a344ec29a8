//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Version string reported by the health endpoint.
    pub app_version: String,

    /// Listener configuration (bind address, body limits).
    pub listener: ListenerConfig,

    /// Inbound request timeouts.
    pub timeouts: TimeoutConfig,

    /// Outbound calls to the government data APIs.
    pub upstream: UpstreamConfig,

    /// Request audit trail.
    pub audit: AuditConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            app_version: "dev".to_string(),
            listener: ListenerConfig::default(),
            timeouts: TimeoutConfig::default(),
            upstream: UpstreamConfig::default(),
            audit: AuditConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:5000").
    pub bind_address: String,

    /// Maximum inbound request body in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total time a handler may spend on one inbound request, in seconds.
    /// Must leave room for at least one full upstream call.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Upstream API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Hard timeout for one outbound call, in seconds.
    pub timeout_secs: u64,

    /// TCP connect timeout, in seconds.
    pub connect_timeout_secs: u64,

    /// User-Agent sent on every outbound call.
    pub user_agent: String,

    /// API key for Portal da Transparência (`chave-api-dados` header).
    pub portal_api_key: Option<String>,

    /// Base URL for BrasilAPI (CEP and CNPJ lookups).
    pub brasilapi_url: String,

    /// Base URL for the Câmara dos Deputados open data API.
    pub camara_url: String,

    /// Base URL for the IBGE metadata API.
    pub ibge_url: String,

    /// Base URL for the servicos.gov.br API.
    pub servicos_url: String,

    /// Base URL for the Portal da Transparência API.
    pub transparencia_url: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            connect_timeout_secs: 5,
            user_agent: concat!("faif-gateway/", env!("CARGO_PKG_VERSION")).to_string(),
            portal_api_key: None,
            brasilapi_url: "https://brasilapi.com.br/api".to_string(),
            camara_url: "https://dadosabertos.camara.leg.br/api/v2".to_string(),
            ibge_url: "https://servicodados.ibge.gov.br/api/v2".to_string(),
            servicos_url: "https://www.servicos.gov.br/api/v1".to_string(),
            transparencia_url: "https://api.portaldatransparencia.gov.br/api-de-dados".to_string(),
        }
    }
}

/// Where audit records are kept.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuditStoreKind {
    /// Bounded in-process ring; lost on restart.
    Memory,
    /// Append-only JSON lines file.
    Jsonl,
}

/// Audit trail configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Record inbound requests at all.
    pub enabled: bool,

    /// Backing store.
    pub store: AuditStoreKind,

    /// File used by the `jsonl` store.
    pub path: String,

    /// Records kept by the `memory` store before the oldest are evicted.
    pub memory_retention: usize,

    /// Pending records buffered between request handlers and the writer.
    pub queue_capacity: usize,

    /// Longest string stored verbatim, in characters.
    pub max_string_len: usize,

    /// Most list items stored per list.
    pub max_list_items: usize,

    /// Most entries stored per map.
    pub max_map_entries: usize,

    /// Nesting depth past which values collapse to placeholders.
    pub max_depth: usize,

    /// Request path prefixes that are never recorded.
    pub excluded_paths: Vec<String>,

    /// Records returned by the listing endpoint when no limit is given.
    pub default_list_limit: usize,

    /// Upper bound applied to the listing limit.
    pub max_list_limit: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            store: AuditStoreKind::Memory,
            path: "historico.jsonl".to_string(),
            memory_retention: 10_000,
            queue_capacity: 1024,
            max_string_len: 1000,
            max_list_items: 30,
            max_map_entries: 50,
            max_depth: 3,
            excluded_paths: vec![
                "/faif/historico".to_string(),
                "/favicon.ico".to_string(),
                "/health".to_string(),
            ],
            default_list_limit: 50,
            max_list_limit: 500,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Compact,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error) when RUST_LOG is unset.
    pub log_level: String,

    /// Log line format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Compact,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
