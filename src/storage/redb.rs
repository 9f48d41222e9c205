//! Redb-backed storage backend.
//!
//! Provides persistent key-value storage using redb with ACID guarantees.

use super::backend::StorageBackend;
use anyhow::{Context, Result};
use async_trait::async_trait;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::Arc;

/// Table holding every namespaced key and its string value.
pub(crate) const STORAGE_TABLE: TableDefinition<'static, &'static str, &'static str> =
    TableDefinition::new("storage");

/// Redb-backed storage backend.
///
/// Suitable for production use where values must survive a restart.
/// Every operation runs on the blocking pool so it never stalls the async
/// runtime.
///
/// # Thread Safety
///
/// `RedbBackend` is `Clone` and can be shared across threads. The underlying
/// database handles concurrent access safely.
#[derive(Clone)]
pub struct RedbBackend {
    db: Arc<Database>,
}

impl RedbBackend {
    /// Opens or creates a redb database at the given path.
    ///
    /// Creates parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Parent directory cannot be created
    /// - Database file cannot be opened or created (permissions, disk full, etc.)
    /// - Initialization transaction fails to begin or commit
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create storage directory: {}", parent.display())
            })?;
        }

        let db = Database::create(path)
            .with_context(|| format!("Failed to open storage database: {}", path.display()))?;

        // Create the table up front so reads never hit a missing table
        let write_txn = db
            .begin_write()
            .context("Failed to begin initialization transaction")?;
        {
            let _table = write_txn
                .open_table(STORAGE_TABLE)
                .context("Failed to initialize storage table")?;
        }
        write_txn
            .commit()
            .context("Failed to commit initialization transaction")?;

        Ok(Self { db: Arc::new(db) })
    }

    fn all_keys_sync(&self) -> Result<Vec<String>> {
        let read_txn = self
            .db
            .begin_read()
            .context("Failed to begin read transaction")?;
        let table = read_txn
            .open_table(STORAGE_TABLE)
            .context("Failed to open storage table")?;

        let mut keys = Vec::new();
        for item in table.iter().context("Failed to iterate storage table")? {
            let (key, _) = item.context("Failed to read storage entry")?;
            keys.push(key.value().to_string());
        }
        Ok(keys)
    }

    fn multi_get_sync(&self, keys: &[String]) -> Result<Vec<(String, String)>> {
        let read_txn = self
            .db
            .begin_read()
            .context("Failed to begin read transaction")?;
        let table = read_txn
            .open_table(STORAGE_TABLE)
            .context("Failed to open storage table")?;

        let mut pairs = Vec::with_capacity(keys.len());
        for key in keys {
            let found = table
                .get(key.as_str())
                .with_context(|| format!("Failed to read key '{key}'"))?;
            if let Some(guard) = found {
                pairs.push((key.clone(), guard.value().to_string()));
            }
        }
        Ok(pairs)
    }

    fn set_sync(&self, key: &str, value: &str) -> Result<()> {
        let write_txn = self
            .db
            .begin_write()
            .context("Failed to begin write transaction")?;
        {
            let mut table = write_txn
                .open_table(STORAGE_TABLE)
                .context("Failed to open storage table")?;
            table
                .insert(key, value)
                .with_context(|| format!("Failed to insert key '{key}'"))?;
        }
        write_txn
            .commit()
            .context("Failed to commit set transaction")?;
        Ok(())
    }

    fn remove_sync(&self, key: &str) -> Result<()> {
        let write_txn = self
            .db
            .begin_write()
            .context("Failed to begin write transaction")?;
        {
            let mut table = write_txn
                .open_table(STORAGE_TABLE)
                .context("Failed to open storage table")?;
            table
                .remove(key)
                .with_context(|| format!("Failed to remove key '{key}'"))?;
        }
        write_txn
            .commit()
            .context("Failed to commit remove transaction")?;
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for RedbBackend {
    async fn all_keys(&self) -> Result<Vec<String>> {
        let backend = self.clone();
        tokio::task::spawn_blocking(move || backend.all_keys_sync())
            .await
            .context("Task join error")?
    }

    async fn multi_get(&self, keys: &[String]) -> Result<Vec<(String, String)>> {
        let backend = self.clone();
        let keys = keys.to_vec();
        tokio::task::spawn_blocking(move || backend.multi_get_sync(&keys))
            .await
            .context("Task join error")?
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let backend = self.clone();
        let key = key.to_string();
        let value = value.to_string();
        tokio::task::spawn_blocking(move || backend.set_sync(&key, &value))
            .await
            .context("Task join error")?
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let backend = self.clone();
        let key = key.to_string();
        tokio::task::spawn_blocking(move || backend.remove_sync(&key))
            .await
            .context("Task join error")?
    }
}
