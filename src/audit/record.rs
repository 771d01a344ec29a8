//! Audit record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A persisted summary of one inbound request/response cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Store-assigned, increasing with insertion order.
    pub id: u64,
    /// Request path.
    pub endpoint: String,
    /// Bounded request/response summary (see [`RequestSummary`]).
    pub parameters: Value,
    /// Peer address, when known.
    pub client_addr: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// A record that has been bounded but not yet stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditRecord {
    pub endpoint: String,
    pub parameters: Value,
    pub client_addr: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl NewAuditRecord {
    pub fn with_id(self, id: u64) -> AuditRecord {
        AuditRecord {
            id,
            endpoint: self.endpoint,
            parameters: self.parameters,
            client_addr: self.client_addr,
            recorded_at: self.recorded_at,
        }
    }
}

/// What the request lifecycle hook captures about one request.
#[derive(Debug, Clone, Serialize)]
pub struct RequestSummary {
    pub method: String,
    pub path: String,
    pub query: Map<String, Value>,
    pub body: Option<Value>,
    pub status_code: u16,
    pub response_length: Option<u64>,
    pub response_snippet: Option<String>,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}
