//! Error types for stepquest-store.

use std::path::PathBuf;

/// Result type for stepquest-store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in stepquest-store.
///
/// Every variant is fatal to the operation that raised it. Per-row import
/// problems are not errors at this level; see [`crate::RejectedRow`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Database error from SQLite.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Failed to create database directory.
    #[error("Failed to create database directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A stored date key could not be parsed back into a date.
    #[error("Invalid stored date: {0}")]
    InvalidDate(String),

    /// A stored step count or goal is out of range.
    #[error("Invalid stored value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    /// CSV reader or writer error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
