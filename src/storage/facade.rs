//! Synchronous storage facade.
//!
//! Reads and writes hit an in-memory mapping immediately. When a key prefix
//! is configured, writes are also forwarded to the backend in the
//! background, and a one-shot reconciliation task folds previously persisted
//! entries into the mapping without overriding anything the caller wrote.

use super::backend::StorageBackend;
use super::items::Items;
use super::persist::Persister;
use super::reconcile::{ReconcilePhase, Reconciler};
use crate::config::StorageConfig;
use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;

/// Synchronous key-value storage over an asynchronous backend.
///
/// Every operation returns without waiting on the backend and never fails.
/// Backend errors only mean that a value may not be there on the next
/// start-up.
///
/// # Thread Safety
///
/// All methods take `&self`. The mapping is guarded by a single lock, so each
/// operation (and the reconciliation merge) is atomic with respect to the
/// others. Wrap in an `Arc` to share across threads.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use synckv::{MemoryBackend, SyncStorage};
///
/// let storage = SyncStorage::new(Arc::new(MemoryBackend::new()), Some("app:".into()))?;
/// storage.set_item("theme", "dark");
/// assert_eq!(storage.get_item("theme").as_deref(), Some("dark"));
/// ```
#[derive(Debug)]
pub struct SyncStorage {
    items: Arc<Mutex<Items>>,
    key_prefix: Option<String>,
    persister: Option<Persister>,
    phase: watch::Receiver<ReconcilePhase>,
}

impl SyncStorage {
    /// Creates a purely in-memory storage. No backend is ever contacted.
    pub fn in_memory() -> Self {
        let (_, phase) = watch::channel(ReconcilePhase::Done);
        Self {
            items: Arc::new(Mutex::new(Items::new(false))),
            key_prefix: None,
            persister: None,
            phase,
        }
    }

    /// Creates a storage over `backend`, namespaced by `key_prefix`.
    ///
    /// Without a prefix the backend is ignored entirely and the storage is
    /// purely in-memory. With a prefix, reconciliation and write-through
    /// tasks are spawned on the current Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoRuntime`] if a prefix is given outside a Tokio
    /// runtime.
    pub fn new(backend: Arc<dyn StorageBackend>, key_prefix: Option<String>) -> Result<Self> {
        match key_prefix {
            None => Ok(Self::in_memory()),
            Some(prefix) => {
                let handle = Handle::try_current().map_err(|_| Error::NoRuntime)?;
                Ok(Self::with_handle(&handle, backend, prefix))
            },
        }
    }

    /// Creates a persisted storage whose background work runs on `handle`.
    ///
    /// Usable from threads that are not inside the runtime.
    pub fn with_handle(
        handle: &Handle,
        backend: Arc<dyn StorageBackend>,
        key_prefix: impl Into<String>,
    ) -> Self {
        let key_prefix = key_prefix.into();
        let items = Arc::new(Mutex::new(Items::new(true)));
        let (phase_tx, phase) = watch::channel(ReconcilePhase::NotStarted);

        let reconciler = Reconciler {
            backend: Arc::clone(&backend),
            prefix: key_prefix.clone(),
            items: Arc::downgrade(&items),
            phase: phase_tx,
        };
        handle.spawn(reconciler.run());

        Self {
            items,
            key_prefix: Some(key_prefix),
            persister: Some(Persister::spawn(handle, backend)),
            phase,
        }
    }

    /// Opens the configured backend and creates a storage over it.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the backend cannot
    /// be opened, or a prefix is configured outside a Tokio runtime.
    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        let backend = config.open_backend()?;
        Self::new(backend, config.key_prefix.clone())
    }

    /// Returns the value stored under `key`, if any.
    pub fn get_item(&self, key: &str) -> Option<String> {
        self.items.lock().get(key).map(str::to_string)
    }

    /// Stores the string form of `value` under `key`.
    pub fn set_item(&self, key: &str, value: impl ToString) {
        let value = value.to_string();
        let mut items = self.items.lock();
        // Queue while holding the lock so backend order matches mapping order
        if let Some(persister) = &self.persister {
            persister.set(self.backend_key(key), value.clone());
        }
        items.set(key, value);
    }

    /// Removes `key`. Removing a missing key is a no-op locally.
    pub fn remove_item(&self, key: &str) {
        let mut items = self.items.lock();
        self.remove_locked(&mut items, key);
    }

    /// Removes every key currently present.
    ///
    /// Entries the reconciliation task has not merged yet are unaffected.
    pub fn clear(&self) {
        let mut items = self.items.lock();
        for key in items.keys() {
            self.remove_locked(&mut items, &key);
        }
    }

    /// Returns the key at position `index` in insertion order.
    pub fn key(&self, index: usize) -> Option<String> {
        self.items.lock().key_at(index).map(str::to_string)
    }

    /// Returns all keys in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.items.lock().keys()
    }

    /// Returns the number of stored keys.
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// Returns true if no keys are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the backend namespace prefix, if persistence is enabled.
    pub fn key_prefix(&self) -> Option<&str> {
        self.key_prefix.as_deref()
    }

    /// Returns the current reconciliation phase.
    pub fn phase(&self) -> ReconcilePhase {
        *self.phase.borrow()
    }

    /// Waits until the reconciliation task has finished merging.
    ///
    /// Resolves immediately for in-memory storage.
    pub async fn wait_loaded(&self) {
        if self.key_prefix.is_none() {
            return;
        }
        let mut phase = self.phase.clone();
        // A dropped sender means the task is gone and nothing more will merge
        let _ = phase.wait_for(|p| *p == ReconcilePhase::Done).await;
    }

    /// Waits until every backend write issued so far has been attempted.
    ///
    /// Failed writes are still only logged. Resolves immediately for
    /// in-memory storage.
    pub async fn flush(&self) {
        if let Some(persister) = &self.persister {
            persister.flush().await;
        }
    }

    fn remove_locked(&self, items: &mut Items, key: &str) {
        if let Some(persister) = &self.persister {
            persister.remove(self.backend_key(key));
        }
        items.remove(key);
    }

    fn backend_key(&self, key: &str) -> String {
        match &self.key_prefix {
            Some(prefix) => format!("{prefix}{key}"),
            None => key.to_string(),
        }
    }
}

impl Default for SyncStorage {
    fn default() -> Self {
        Self::in_memory()
    }
}
