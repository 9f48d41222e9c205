//! In-memory storage backend.
//!
//! Provides a fast, non-persistent backend using DashMap for concurrent
//! access. Ideal for testing, development, and embedded use cases.

use super::backend::StorageBackend;
use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

/// In-memory storage backend using DashMap.
///
/// Clones share the same underlying map, so a test can keep one handle to
/// inspect what a [`SyncStorage`](super::SyncStorage) persisted through
/// another. All data is lost when the last handle is dropped.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    data: Arc<DashMap<String, String>>,
}

impl MemoryBackend {
    /// Creates a new empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend pre-populated with `entries`.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let backend = Self::new();
        for (key, value) in entries {
            backend.data.insert(key.into(), value.into());
        }
        backend
    }

    /// Returns the stored value for `key` without going through the trait.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.data.get(key).map(|entry| entry.value().clone())
    }

    /// Returns the number of entries in the store.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Clears all entries from the store.
    pub fn clear(&self) {
        self.data.clear();
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn all_keys(&self) -> Result<Vec<String>> {
        Ok(self.data.iter().map(|entry| entry.key().clone()).collect())
    }

    async fn multi_get(&self, keys: &[String]) -> Result<Vec<(String, String)>> {
        Ok(keys
            .iter()
            .filter_map(|key| {
                self.data
                    .get(key)
                    .map(|entry| (key.clone(), entry.value().clone()))
            })
            .collect())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.data.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.data.remove(key);
        Ok(())
    }
}
