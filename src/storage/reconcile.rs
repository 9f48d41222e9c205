//! One-shot reconciliation of backend data into the in-memory mapping.
//!
//! Runs once per [`SyncStorage`](super::SyncStorage) with a key prefix:
//! enumerate backend keys, keep the ones under the prefix, bulk-load them,
//! and merge with insert-if-absent semantics. Backend failures end the task
//! early with nothing merged; they never reach the caller.

use super::backend::StorageBackend;
use super::items::Items;
use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Progress of the reconciliation task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcilePhase {
    /// Task spawned but not yet polled.
    NotStarted,
    /// Listing backend keys.
    Enumerating,
    /// Fetching values for the keys under the prefix.
    Loading,
    /// Folding loaded entries into the mapping.
    Merging,
    /// Nothing further will be merged.
    Done,
}

impl fmt::Display for ReconcilePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotStarted => "not-started",
            Self::Enumerating => "enumerating",
            Self::Loading => "loading",
            Self::Merging => "merging",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Everything the reconciliation task needs, moved into the spawned future.
pub(crate) struct Reconciler {
    pub backend: Arc<dyn StorageBackend>,
    pub prefix: String,
    pub items: Weak<Mutex<Items>>,
    pub phase: watch::Sender<ReconcilePhase>,
}

impl Reconciler {
    pub async fn run(self) {
        if let Some(loaded) = self.load().await {
            self.merge(loaded);
        } else if let Some(items) = self.items.upgrade() {
            items.lock().finish_load();
        }
        self.enter(ReconcilePhase::Done);
    }

    /// Returns `None` when the backend could not provide any data.
    async fn load(&self) -> Option<Vec<(String, String)>> {
        self.enter(ReconcilePhase::Enumerating);
        let keys: Vec<String> = match self.backend.all_keys().await {
            Ok(keys) => keys
                .into_iter()
                .filter(|key| key.starts_with(&self.prefix))
                .collect(),
            Err(e) => {
                warn!(prefix = %self.prefix, error = %e, "Failed to enumerate backend keys");
                return None;
            },
        };

        if keys.is_empty() {
            return Some(Vec::new());
        }

        self.enter(ReconcilePhase::Loading);
        match self.backend.multi_get(&keys).await {
            Ok(pairs) => Some(pairs),
            Err(e) => {
                warn!(
                    prefix = %self.prefix,
                    keys = keys.len(),
                    error = %e,
                    "Failed to load backend values"
                );
                None
            },
        }
    }

    fn merge(&self, loaded: Vec<(String, String)>) {
        self.enter(ReconcilePhase::Merging);

        let total = loaded.len();
        let candidates: Vec<(String, String)> = loaded
            .into_iter()
            .filter_map(|(key, value)| match key.strip_prefix(self.prefix.as_str()) {
                Some(logical) => Some((logical.to_string(), value)),
                None => {
                    debug!(key = %key, prefix = %self.prefix, "Skipping backend entry outside prefix");
                    None
                },
            })
            .collect();
        let skipped = total - candidates.len();

        let Some(items) = self.items.upgrade() else {
            debug!(prefix = %self.prefix, "Storage dropped before reconciliation finished");
            return;
        };
        let stats = items.lock().merge_loaded(candidates);

        info!(
            prefix = %self.prefix,
            merged = stats.merged,
            shadowed = stats.shadowed,
            skipped,
            "Reconciled storage with backend"
        );
    }

    fn enter(&self, phase: ReconcilePhase) {
        debug!(prefix = %self.prefix, %phase, "Reconciliation phase");
        self.phase.send_replace(phase);
    }
}
