//! Startup orchestration.
//!
//! # Responsibilities
//! - Open the configured audit store
//! - Bind the public listener
//! - Report what failed when a subsystem cannot start
//!
//! # Design Decisions
//! - Fail fast: a store that cannot be opened aborts startup

use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::audit::{AuditStore, AuditStoreError, JsonlAuditStore, MemoryAuditStore};
use crate::config::{AuditConfig, AuditStoreKind};

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to build upstream HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("failed to open audit store: {0}")]
    Store(#[from] AuditStoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Open the store selected by `config.store`.
pub async fn open_audit_store(config: &AuditConfig) -> Result<Arc<dyn AuditStore>, StartupError> {
    let store: Arc<dyn AuditStore> = match config.store {
        AuditStoreKind::Memory => Arc::new(MemoryAuditStore::new(config.memory_retention)),
        AuditStoreKind::Jsonl => Arc::new(JsonlAuditStore::open(&config.path).await?),
    };

    tracing::info!(
        store = store.kind(),
        enabled = config.enabled,
        "Audit store ready"
    );
    Ok(store)
}

/// Bind the public listener on `address`.
pub async fn bind_listener(address: &str) -> Result<TcpListener, StartupError> {
    let listener = TcpListener::bind(address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");
    Ok(listener)
}
