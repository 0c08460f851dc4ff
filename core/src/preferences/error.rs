//! Error types for preference edits

use gallery_wall_types::Preference;
use thiserror::Error;

/// Reasons a settings-panel edit is not applied
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditRejected {
    #[error("'{value}' is not a valid hex color")]
    InvalidColor { value: String },

    #[error("{preference} cannot move to {value}")]
    OutOfRange { preference: Preference, value: i32 },

    #[error("{preference} is not a numeric preference")]
    NotNumeric { preference: Preference },
}
