//! Configuration types for building a storage.
//!
//! - [`StorageConfig`] - Root configuration struct
//! - [`BackendConfig`] - Which backend persists the entries
//!
//! A typical `storage.toml`:
//!
//! ```toml
//! key_prefix = "app:"
//!
//! [backend]
//! kind = "redb"
//! path = "/var/lib/app/storage.redb"
//! ```
//!
//! Leaving out `key_prefix` yields a purely in-memory storage.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::storage::{MemoryBackend, RedbBackend, StorageBackend};

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Non-fatal warnings that should be logged but don't prevent operation.
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Returns true if there are any warnings.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Root storage configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    /// Namespace prepended to every backend key. Absent means no persistence.
    #[serde(default)]
    pub key_prefix: Option<String>,
    #[serde(default)]
    pub backend: BackendConfig,
}

/// Backend selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackendConfig {
    /// Non-persistent backend, lost on exit.
    #[default]
    Memory,
    /// redb database file.
    Redb { path: PathBuf },
}

impl StorageConfig {
    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or fields have invalid types.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::config(format!("Failed to parse storage config: {e}")))
    }

    /// Loads configuration from the specified path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read (IO error)
    /// - The file contains invalid TOML syntax
    /// - Required fields are missing or have invalid types
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| Error::io(format!("reading {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| {
            Error::config(format!(
                "Failed to parse config file {}: {e}",
                path.display()
            ))
        })
    }

    /// Validates the configuration.
    ///
    /// Returns a `ValidationResult` containing any non-fatal warnings.
    ///
    /// # Errors
    ///
    /// Returns an error if a redb backend has an empty path.
    pub fn validate(&self) -> Result<ValidationResult> {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if let BackendConfig::Redb { path } = &self.backend
            && path.as_os_str().is_empty()
        {
            errors.push("backend.path cannot be empty for the redb backend".to_string());
        }

        match (&self.key_prefix, &self.backend) {
            (Some(prefix), _) if prefix.is_empty() => {
                warnings.push(
                    "key_prefix is empty\n  \
                     Every key in the backend will be loaded into this storage"
                        .to_string(),
                );
            },
            (None, BackendConfig::Redb { .. }) => {
                warnings.push(
                    "A redb backend is configured without key_prefix\n  \
                     Nothing will be persisted; set key_prefix to enable persistence"
                        .to_string(),
                );
            },
            _ => {},
        }

        if !errors.is_empty() {
            return Err(Error::config(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )));
        }

        Ok(ValidationResult { warnings })
    }

    /// Validates the configuration and opens the selected backend.
    ///
    /// Warnings are logged rather than returned.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or the backend cannot be opened.
    pub fn open_backend(&self) -> Result<Arc<dyn StorageBackend>> {
        let validation = self.validate()?;
        for warning in &validation.warnings {
            tracing::warn!("{warning}");
        }

        let backend: Arc<dyn StorageBackend> = match &self.backend {
            BackendConfig::Memory => Arc::new(MemoryBackend::new()),
            BackendConfig::Redb { path } => Arc::new(RedbBackend::open(path)?),
        };
        Ok(backend)
    }
}
