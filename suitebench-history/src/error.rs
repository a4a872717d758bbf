//! History errors.

use std::path::PathBuf;
use thiserror::Error;

/// Persistence and tag resolution failures
#[derive(Debug, Error)]
pub enum HistoryError {
    /// The history file exists but could not be read
    #[error("failed to read history from {path}: {source}")]
    Read {
        /// History file
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The history file could not be written
    #[error("failed to write history to {path}: {source}")]
    Write {
        /// History file
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The history could not be serialized
    #[error("failed to serialize history: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The run tag could not be resolved
    #[error("failed to resolve {source_name} tag: {reason}")]
    Tag {
        /// Tag source that failed ("git", "version", "date")
        source_name: &'static str,
        /// What went wrong
        reason: String,
    },
}

/// Result type for history operations
pub type Result<T> = std::result::Result<T, HistoryError>;
