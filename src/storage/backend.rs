//! Backend trait for the synchronous storage facade.
//!
//! Defines the four asynchronous primitives the facade consumes, enabling
//! pluggable persistence (redb, memory, a remote store, etc.).

use anyhow::Result;
use async_trait::async_trait;

/// Asynchronous key-value backend behind a [`SyncStorage`](super::SyncStorage).
///
/// All backends must be thread-safe (`Send + Sync`) for use with tokio.
/// Keys seen here are full backend names: the facade has already prepended
/// its namespace prefix.
///
/// # Example
///
/// ```ignore
/// use synckv::storage::{MemoryBackend, StorageBackend};
///
/// let backend = MemoryBackend::new();
/// backend.set("app:theme", "dark").await?;
/// let pairs = backend.multi_get(&["app:theme".to_string()]).await?;
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync + 'static {
    /// Lists every key in the backend, across all namespaces.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    async fn all_keys(&self) -> Result<Vec<String>>;

    /// Fetches the values for `keys`.
    ///
    /// Returns `(key, value)` pairs for the keys that exist. Missing keys
    /// are omitted rather than reported as errors.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    async fn multi_get(&self, keys: &[String]) -> Result<Vec<(String, String)>>;

    /// Stores `value` under `key`, overwriting any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Idempotent - removing a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    async fn remove(&self, key: &str) -> Result<()>;
}
