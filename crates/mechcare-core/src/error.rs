//! Error types for `MechCare` core library.

use thiserror::Error;

/// Result type alias using `MechCare` Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for `MechCare` operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Unknown id on a lookup, update or delete
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Input rejected before touching the dataset
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn machine_not_found(id: &str) -> Self {
        Self::NotFound {
            entity: "Machine",
            id: id.to_string(),
        }
    }

    /// True for errors caused by the caller rather than by storage.
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Validation(_))
    }
}
