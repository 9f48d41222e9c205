//! Synchronous key-value storage with pluggable asynchronous backends.
//!
//! [`SyncStorage`] keeps every entry in memory and answers reads and writes
//! synchronously. Given a key prefix, it persists writes to a backend in the
//! background and, once at start-up, merges whatever the backend already
//! holds under that prefix. Supported backends:
//!
//! - **RedbBackend**: Persistent storage with ACID guarantees
//! - **MemoryBackend**: Fast, non-persistent storage (ideal for testing/embedding)
//!
//! # Example
//!
//! ```ignore
//! use synckv::storage::{RedbBackend, SyncStorage};
//! use std::sync::Arc;
//!
//! let backend = Arc::new(RedbBackend::open("/var/lib/app/storage.redb")?);
//! let storage = SyncStorage::new(backend, Some("settings:".into()))?;
//!
//! storage.set_item("volume", 11);
//! assert_eq!(storage.get_item("volume").as_deref(), Some("11"));
//!
//! // Values persisted by earlier runs show up once loading finishes
//! storage.wait_loaded().await;
//! ```
//!
//! # Custom Backends
//!
//! Implement the `StorageBackend` trait to persist elsewhere:
//!
//! ```ignore
//! use synckv::storage::{StorageBackend, SyncStorage};
//!
//! struct RemoteBackend { /* ... */ }
//! impl StorageBackend for RemoteBackend { /* ... */ }
//!
//! let storage = SyncStorage::new(Arc::new(RemoteBackend::new()), Some("p:".into()))?;
//! ```

mod backend;
mod facade;
mod items;
mod memory;
mod persist;
mod reconcile;
mod redb;


// Re-export the public API
pub use backend::StorageBackend;
pub use facade::SyncStorage;
pub use memory::MemoryBackend;
pub use reconcile::ReconcilePhase;
pub use self::redb::RedbBackend;
