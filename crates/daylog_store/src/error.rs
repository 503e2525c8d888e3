//! Error types for store operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A collection file exists but cannot be parsed.
    ///
    /// This is fatal: the store never discards existing data to recover.
    #[error("collection corrupted at {path}: {message}")]
    Corrupted {
        /// Path of the unparseable collection file.
        path: PathBuf,
        /// Description of the parse failure.
        message: String,
    },

    /// A value could not be serialized for persistence.
    #[error("serialization failed: {message}")]
    Serialize {
        /// Description of the failure.
        message: String,
    },
}

impl StoreError {
    /// Creates a corruption error for a collection file.
    pub fn corrupted(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Corrupted {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a serialization error.
    pub fn serialize(message: impl Into<String>) -> Self {
        Self::Serialize {
            message: message.into(),
        }
    }
}
