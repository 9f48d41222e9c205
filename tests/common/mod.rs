//! Fake backends shared by the integration tests.

#![allow(dead_code)]

use anyhow::{Result, bail};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use synckv::{MemoryBackend, StorageBackend};
use tokio::sync::Semaphore;

/// A backend call as observed by [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    AllKeys,
    MultiGet(Vec<String>),
    Set(String, String),
    Remove(String),
}

/// Memory backend that records every call it receives.
#[derive(Clone, Default)]
pub struct RecordingBackend {
    pub inner: MemoryBackend,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl RecordingBackend {
    pub fn with_entries(entries: &[(&str, &str)]) -> Self {
        Self {
            inner: MemoryBackend::with_entries(entries.iter().copied()),
            calls: Arc::default(),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl StorageBackend for RecordingBackend {
    async fn all_keys(&self) -> Result<Vec<String>> {
        self.record(Call::AllKeys);
        self.inner.all_keys().await
    }

    async fn multi_get(&self, keys: &[String]) -> Result<Vec<(String, String)>> {
        self.record(Call::MultiGet(keys.to_vec()));
        self.inner.multi_get(keys).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.record(Call::Set(key.to_string(), value.to_string()));
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.record(Call::Remove(key.to_string()));
        self.inner.remove(key).await
    }
}

/// Memory backend whose `multi_get` blocks until [`GatedBackend::open`].
#[derive(Clone)]
pub struct GatedBackend {
    pub inner: MemoryBackend,
    gate: Arc<Semaphore>,
}

impl GatedBackend {
    pub fn with_entries(entries: &[(&str, &str)]) -> Self {
        Self {
            inner: MemoryBackend::with_entries(entries.iter().copied()),
            gate: Arc::new(Semaphore::new(0)),
        }
    }

    /// Lets a pending or future `multi_get` proceed.
    pub fn open(&self) {
        self.gate.add_permits(1);
    }
}

#[async_trait]
impl StorageBackend for GatedBackend {
    async fn all_keys(&self) -> Result<Vec<String>> {
        self.inner.all_keys().await
    }

    async fn multi_get(&self, keys: &[String]) -> Result<Vec<(String, String)>> {
        let _permit = self.gate.acquire().await?;
        self.inner.multi_get(keys).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.inner.remove(key).await
    }
}

/// Backend where every call fails.
pub struct FailingBackend;

#[async_trait]
impl StorageBackend for FailingBackend {
    async fn all_keys(&self) -> Result<Vec<String>> {
        bail!("backend unavailable")
    }

    async fn multi_get(&self, _keys: &[String]) -> Result<Vec<(String, String)>> {
        bail!("backend unavailable")
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<()> {
        bail!("backend unavailable")
    }

    async fn remove(&self, _key: &str) -> Result<()> {
        bail!("backend unavailable")
    }
}

/// Backend whose `multi_get` returns keys it was never asked for.
pub struct MalformedBackend;

#[async_trait]
impl StorageBackend for MalformedBackend {
    async fn all_keys(&self) -> Result<Vec<String>> {
        Ok(vec!["p:good".to_string()])
    }

    async fn multi_get(&self, _keys: &[String]) -> Result<Vec<(String, String)>> {
        Ok(vec![
            ("p:good".to_string(), "1".to_string()),
            ("p".to_string(), "short".to_string()),
            ("elsewhere".to_string(), "2".to_string()),
        ])
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Ok(())
    }

    async fn remove(&self, _key: &str) -> Result<()> {
        Ok(())
    }
}

/// Installs a test subscriber so `RUST_LOG=synckv=debug` shows task logs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
