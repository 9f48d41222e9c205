//! Error types for storage construction and configuration.
//!
//! Storage operations themselves never fail: backend errors are logged and
//! discarded. These errors only surface while opening a backend or building
//! a [`SyncStorage`](crate::SyncStorage).

/// Result type for storage setup operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Storage setup errors with structured context.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A key prefix was configured but no Tokio runtime is available to
    /// drive reconciliation and write-through calls.
    #[error("no Tokio runtime available to drive the storage backend")]
    NoRuntime,

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error with context.
    #[error("IO error in {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Backend failed to open.
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl Error {
    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a configuration error.
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config(reason.into())
    }
}
