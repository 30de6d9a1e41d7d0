//! The shared sample log: append-only persistence of raw frame bytes.
//!
//! Every successful encode produces one byte batch, and all batches from all
//! sessions land in a single process-wide file with no framing — read-back
//! relies on frame boundaries being known externally, so the one guarantee
//! that matters is that **batches are never interleaved or torn**.
//!
//! That guarantee comes from a single `tokio::sync::Mutex` constructed once
//! for the process and held across the whole open → write → flush sequence.
//! A lock created per call would serialize nothing; the sink therefore owns
//! its mutex and is shared between sessions via `Arc`.
//!
//! Appends are issued as detached tasks after the client response has been
//! sent.  A failed append is logged and counted, never reported to any
//! session — the response already on the wire stays valid.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error};
use uuid::Uuid;

/// Error type for sample log operations.
#[derive(Debug, Error)]
pub enum SinkError {
    /// A file system I/O error occurred while appending.
    #[error("failed to append samples to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Append-only, mutually exclusive persistence of raw frame bytes.
pub struct SampleSink {
    path: PathBuf,
    /// The single process-lifetime lock serializing all appends.
    lock: tokio::sync::Mutex<()>,
    /// Number of appends that failed since startup; failures are otherwise
    /// only visible in the logs.
    failed_appends: AtomicU64,
}

impl SampleSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: tokio::sync::Mutex::new(()),
            failed_appends: AtomicU64::new(0),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one batch to the log and flushes it to disk.
    ///
    /// The internal mutex is held from open to flush, so concurrent appends
    /// from different sessions are serialized at the byte level: each batch
    /// lands as one contiguous unit.  Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Io`] when the destination cannot be opened,
    /// written, or flushed.  The failure counter is incremented; callers on
    /// the detached path log and move on.
    pub async fn append(&self, bytes: &[u8]) -> Result<usize, SinkError> {
        if bytes.is_empty() {
            return Ok(0);
        }

        let _guard = self.lock.lock().await;
        let result = self.write_locked(bytes).await;
        if result.is_err() {
            self.failed_appends.fetch_add(1, Ordering::Relaxed);
        }
        result
    }

    async fn write_locked(&self, bytes: &[u8]) -> Result<usize, SinkError> {
        let io_err = |source| SinkError::Io {
            path: self.path.clone(),
            source,
        };

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(io_err)?;
        file.write_all(bytes).await.map_err(io_err)?;
        // An append only counts once it is durable.
        file.sync_data().await.map_err(io_err)?;
        Ok(bytes.len())
    }

    /// Number of appends that have failed since startup.
    pub fn failed_appends(&self) -> u64 {
        self.failed_appends.load(Ordering::Relaxed)
    }

    /// Fires an append as a detached task.  The caller has already responded
    /// to its client; persistence success or failure stays on this side of
    /// the boundary.
    pub fn append_detached(self: &Arc<Self>, batch: Vec<u8>, session_id: Uuid) {
        let sink = Arc::clone(self);
        tokio::spawn(async move {
            match sink.append(&batch).await {
                Ok(written) => {
                    debug!("session {session_id}: appended {written} sample bytes");
                }
                Err(e) => {
                    error!("session {session_id}: sample append failed: {e}");
                }
            }
        });
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
