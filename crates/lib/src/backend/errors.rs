//! Error types for the host persistence layer.
//!
//! Storage failures are surfaced unchanged to callers of list operations;
//! the engine defines no finer taxonomy of its own.

use thiserror::Error;

/// Errors that can occur inside a backend.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Existing variants will not be removed in minor versions
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BackendError {
    /// A row with the same identity already exists.
    #[error("Duplicate key in table '{table}': {id}")]
    DuplicateKey { table: String, id: String },

    /// The host cannot evaluate this predicate (e.g. raw SQL in memory).
    #[error("Unsupported predicate: {reason}")]
    UnsupportedPredicate { reason: String },

    /// A row passed to insert/update cannot be stored as given.
    #[error("Invalid row for table '{table}': {reason}")]
    InvalidRow { table: String, reason: String },

    /// A stored value could not be decoded into a row attribute.
    #[error("Cannot decode column '{column}': {reason}")]
    Decode { column: String, reason: String },

    /// Serialization failed.
    #[error("Serialization failed")]
    SerializationFailed {
        #[source]
        source: serde_json::Error,
    },

    /// Deserialization failed.
    #[error("Deserialization failed")]
    DeserializationFailed {
        #[source]
        source: serde_json::Error,
    },

    /// File I/O error.
    #[error("File I/O error")]
    FileIo {
        #[source]
        source: std::io::Error,
    },

    /// SQL database error from sqlx.
    #[cfg(any(feature = "sqlite", feature = "postgres"))]
    #[error("SQL error: {reason}")]
    SqlxError {
        reason: String,
        #[source]
        source: Option<sqlx::Error>,
    },
}

impl BackendError {
    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            #[cfg(any(feature = "sqlite", feature = "postgres"))]
            BackendError::SqlxError {
                source: Some(sqlx::Error::RowNotFound),
                ..
            } => true,
            _ => false,
        }
    }

    /// Check if this error indicates a key conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, BackendError::DuplicateKey { .. })
    }

    /// Check if the host rejected the request shape rather than failing to run it.
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            BackendError::UnsupportedPredicate { .. } | BackendError::InvalidRow { .. }
        )
    }

    /// Check if this error is related to I/O operations.
    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            BackendError::FileIo { .. }
                | BackendError::SerializationFailed { .. }
                | BackendError::DeserializationFailed { .. }
        )
    }
}

impl From<BackendError> for crate::Error {
    fn from(err: BackendError) -> Self {
        crate::Error::Backend(err)
    }
}
