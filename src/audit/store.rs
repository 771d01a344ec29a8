//! Audit persistence.
//!
//! # Responsibilities
//! - Append complete records, one at a time
//! - List the most recent records, newest first
//!
//! # Design Decisions
//! - Stores are append-only; records are never updated
//! - Ids come from the store so ordering never depends on clock resolution
//! - The store behind the trait is a deployment choice (memory or JSON lines)

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::audit::record::{AuditRecord, NewAuditRecord};

/// Errors raised by an audit store.
#[derive(Debug, Error)]
pub enum AuditStoreError {
    #[error("audit store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("audit record encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Append-only storage for audit records.
#[async_trait]
pub trait AuditStore: Send + Sync + 'static {
    /// Short name reported by the health endpoint.
    fn kind(&self) -> &'static str;

    /// Persist one record and return it with its id.
    async fn append(&self, record: NewAuditRecord) -> Result<AuditRecord, AuditStoreError>;

    /// Up to `limit` records, newest first.
    async fn list(&self, limit: usize) -> Result<Vec<AuditRecord>, AuditStoreError>;

    /// Number of records currently held.
    async fn count(&self) -> Result<u64, AuditStoreError>;
}

/// In-process store keeping the most recent `retention` records.
#[derive(Debug)]
pub struct MemoryAuditStore {
    inner: Mutex<MemoryInner>,
    retention: usize,
}

#[derive(Debug, Default)]
struct MemoryInner {
    records: VecDeque<AuditRecord>,
    next_id: u64,
}

impl MemoryAuditStore {
    pub fn new(retention: usize) -> Self {
        Self {
            inner: Mutex::new(MemoryInner {
                records: VecDeque::new(),
                next_id: 1,
            }),
            retention: retention.max(1),
        }
    }
}

#[async_trait]
impl AuditStore for MemoryAuditStore {
    fn kind(&self) -> &'static str {
        "memory"
    }

    async fn append(&self, record: NewAuditRecord) -> Result<AuditRecord, AuditStoreError> {
        let mut inner = self.inner.lock().expect("audit store mutex poisoned");
        let stored = record.with_id(inner.next_id);
        inner.next_id += 1;
        if inner.records.len() == self.retention {
            inner.records.pop_front();
        }
        inner.records.push_back(stored.clone());
        Ok(stored)
    }

    async fn list(&self, limit: usize) -> Result<Vec<AuditRecord>, AuditStoreError> {
        let inner = self.inner.lock().expect("audit store mutex poisoned");
        Ok(inner.records.iter().rev().take(limit).cloned().collect())
    }

    async fn count(&self) -> Result<u64, AuditStoreError> {
        let inner = self.inner.lock().expect("audit store mutex poisoned");
        Ok(inner.records.len() as u64)
    }
}

/// Store appending one JSON document per line to a file.
#[derive(Debug)]
pub struct JsonlAuditStore {
    path: PathBuf,
    state: tokio::sync::Mutex<JsonlState>,
}

#[derive(Debug)]
struct JsonlState {
    file: File,
    next_id: u64,
    count: u64,
}

impl JsonlAuditStore {
    /// Open (or create) the file at `path`, resuming ids after the last
    /// stored record.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, AuditStoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let existing = match fs::read_to_string(&path).await {
            Ok(content) => parse_lines(&path, &content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        let next_id = existing.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        let count = existing.len() as u64;

        let file = OpenOptions::new().create(true).append(true).open(&path).await?;

        tracing::info!(path = %path.display(), records = count, "Audit log opened");

        Ok(Self {
            path,
            state: tokio::sync::Mutex::new(JsonlState {
                file,
                next_id,
                count,
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl AuditStore for JsonlAuditStore {
    fn kind(&self) -> &'static str {
        "jsonl"
    }

    async fn append(&self, record: NewAuditRecord) -> Result<AuditRecord, AuditStoreError> {
        let mut state = self.state.lock().await;
        let stored = record.with_id(state.next_id);

        let mut line = serde_json::to_vec(&stored)?;
        line.push(b'\n');
        state.file.write_all(&line).await?;
        state.file.flush().await?;

        state.next_id += 1;
        state.count += 1;
        Ok(stored)
    }

    async fn list(&self, limit: usize) -> Result<Vec<AuditRecord>, AuditStoreError> {
        // TODO: seek from the end of the file instead of reading it whole once
        // audit logs grow past a few megabytes.
        let content = {
            // Held only while reading so an append cannot leave a half-written last line.
            let _state = self.state.lock().await;
            fs::read_to_string(&self.path).await?
        };
        let mut records = parse_lines(&self.path, &content);
        records.sort_by(|a, b| b.id.cmp(&a.id));
        records.truncate(limit);
        Ok(records)
    }

    async fn count(&self) -> Result<u64, AuditStoreError> {
        Ok(self.state.lock().await.count)
    }
}

fn parse_lines(path: &Path, content: &str) -> Vec<AuditRecord> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(number, line)| match serde_json::from_str(line) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(path = %path.display(), line = number + 1, error = %e, "Skipping unreadable audit line");
                None
            }
        })
        .collect()
}
