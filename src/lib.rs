//! Synchronous key-value storage over an asynchronous, eventually-persistent
//! backend.
//!
//! - [`SyncStorage`] - the synchronous facade
//! - [`StorageBackend`] - the asynchronous backend contract
//! - [`StorageConfig`] - TOML configuration for building a storage

pub mod config;
pub mod error;
pub mod storage;

pub use config::{BackendConfig, StorageConfig, ValidationResult};
pub use error::{Error, Result};
pub use storage::{MemoryBackend, ReconcilePhase, RedbBackend, StorageBackend, SyncStorage};
