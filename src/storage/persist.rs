//! Write-through worker for fire-and-forget persistence.
//!
//! Caller mutations are queued on an unbounded channel and applied to the
//! backend by a single task, in the order they were issued. Failures are
//! logged and dropped; nothing is retried.

use super::backend::StorageBackend;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

/// A queued backend call. Keys are already prefixed.
#[derive(Debug)]
pub(crate) enum PersistOp {
    Set { key: String, value: String },
    Remove { key: String },
    /// Signals once every op queued before it has been attempted.
    Flush(oneshot::Sender<()>),
}

/// Sending half of the write-through queue.
#[derive(Debug, Clone)]
pub(crate) struct Persister {
    tx: mpsc::UnboundedSender<PersistOp>,
}

impl Persister {
    /// Spawns the worker on `handle`.
    ///
    /// The worker exits after the last `Persister` is dropped and the queue
    /// has drained.
    pub fn spawn(handle: &Handle, backend: Arc<dyn StorageBackend>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        handle.spawn(run_worker(backend, rx));
        Self { tx }
    }

    pub fn set(&self, key: String, value: String) {
        self.send(PersistOp::Set { key, value });
    }

    pub fn remove(&self, key: String) {
        self.send(PersistOp::Remove { key });
    }

    /// Waits until everything queued so far has been attempted.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        self.send(PersistOp::Flush(done_tx));
        // A closed worker has nothing left to flush
        let _ = done_rx.await;
    }

    fn send(&self, op: PersistOp) {
        if self.tx.send(op).is_err() {
            debug!("Write-through worker has stopped, dropping backend call");
        }
    }
}

async fn run_worker(backend: Arc<dyn StorageBackend>, mut rx: mpsc::UnboundedReceiver<PersistOp>) {
    while let Some(op) = rx.recv().await {
        match op {
            PersistOp::Set { key, value } => {
                if let Err(e) = backend.set(&key, &value).await {
                    warn!(key = %key, error = %e, "Failed to persist storage entry");
                }
            },
            PersistOp::Remove { key } => {
                if let Err(e) = backend.remove(&key).await {
                    warn!(key = %key, error = %e, "Failed to remove storage entry from backend");
                }
            },
            PersistOp::Flush(done) => {
                let _ = done.send(());
            },
        }
    }
    debug!("Write-through worker stopped");
}
