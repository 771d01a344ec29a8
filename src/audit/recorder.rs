//! Fire-and-forget audit recording.
//!
//! A bounded channel feeds a single writer task, so records never interleave
//! and the request path never waits on storage.

use std::net::IpAddr;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::audit::record::NewAuditRecord;
use crate::audit::store::AuditStore;
use crate::audit::truncate::AuditLimits;
use crate::observability::metrics;

enum AuditCommand {
    Append(NewAuditRecord),
    Flush(oneshot::Sender<()>),
}

/// Handle used by the request path to submit records.
#[derive(Clone)]
pub struct AuditRecorder {
    tx: mpsc::Sender<AuditCommand>,
    limits: AuditLimits,
}

impl std::fmt::Debug for AuditRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditRecorder")
            .field("limits", &self.limits)
            .field("queue_capacity", &self.tx.max_capacity())
            .finish()
    }
}

impl AuditRecorder {
    /// Start the writer task. It runs until every recorder clone is dropped,
    /// then drains whatever is still queued.
    pub fn spawn(
        store: Arc<dyn AuditStore>,
        limits: AuditLimits,
        capacity: usize,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let handle = tokio::spawn(run_writer(store, rx));
        (Self { tx, limits }, handle)
    }

    pub fn limits(&self) -> &AuditLimits {
        &self.limits
    }

    /// Bound and enqueue one record. Never blocks and never fails the caller:
    /// when the queue is full or the writer is gone the record is dropped.
    pub fn record(&self, endpoint: &str, parameters: &Value, client_addr: Option<IpAddr>) {
        let record = NewAuditRecord {
            endpoint: self.limits.bound_str(endpoint).into_owned(),
            parameters: self.limits.bound_fields(parameters),
            client_addr: client_addr.map(|ip| ip.to_string()),
            recorded_at: Utc::now(),
        };

        match self.tx.try_send(AuditCommand::Append(record)) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(endpoint = %endpoint, "Audit queue full, record dropped");
                metrics::record_audit_record("dropped");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::warn!(endpoint = %endpoint, "Audit writer stopped, record dropped");
                metrics::record_audit_record("closed");
            }
        }
    }

    /// Wait until every record queued before this call has been written.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(AuditCommand::Flush(done_tx)).await.is_ok() {
            let _ = done_rx.await;
        }
    }
}

async fn run_writer(store: Arc<dyn AuditStore>, mut rx: mpsc::Receiver<AuditCommand>) {
    tracing::debug!(store = store.kind(), "Audit writer started");

    while let Some(command) = rx.recv().await {
        match command {
            AuditCommand::Append(record) => {
                let endpoint = record.endpoint.clone();
                match store.append(record).await {
                    Ok(stored) => {
                        tracing::debug!(id = stored.id, endpoint = %stored.endpoint, "Audit record stored");
                        metrics::record_audit_record("stored");
                    }
                    Err(e) => {
                        tracing::error!(endpoint = %endpoint, error = %e, "Failed to store audit record");
                        metrics::record_audit_record("failed");
                    }
                }
            }
            AuditCommand::Flush(done) => {
                let _ = done.send(());
            }
        }
    }

    tracing::debug!("Audit writer stopped");
}
