//! Error types for style variable writes

use thiserror::Error;

/// Errors from the style variable host
#[derive(Debug, Error)]
pub enum StyleError {
    #[error("document root style is unavailable")]
    NoRoot,

    #[error("failed to set {name}: {reason}")]
    SetProperty { name: String, reason: String },
}
