//! Error types for durable storage operations

use thiserror::Error;

/// Errors from the per-origin key/value store
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage is unavailable")]
    Unavailable,

    #[error("failed to read '{key}': {reason}")]
    Read { key: String, reason: String },

    #[error("failed to write '{key}': {reason}")]
    Write { key: String, reason: String },
}
