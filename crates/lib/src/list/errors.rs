//! Error types for list operations.
//!
//! The reordering engine defines only the failures it detects itself; storage
//! failures pass through as [`BackendError`](crate::backend::BackendError).

use thiserror::Error;

/// Errors raised by the reordering engine.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Existing variants will not be removed in minor versions
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ListError {
    /// The row has no identity, so it cannot be told apart from its peers.
    #[error("Row in table '{table}' has no value for identity column '{column}'")]
    MissingIdentity { table: String, column: String },

    /// The row's identity matched nothing in the store.
    #[error("No row with identity {id} in table '{table}'")]
    RowNotFound { table: String, id: String },

    /// The position column holds something other than an integer.
    #[error("Position column '{column}' holds a non-integer value: {value}")]
    PositionNotInteger { column: String, value: String },
}

impl ListError {
    /// Check if this error indicates the row was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ListError::RowNotFound { .. })
    }

    /// Check if this error is caused by the row itself rather than the store.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            ListError::MissingIdentity { .. } | ListError::PositionNotInteger { .. }
        )
    }
}

impl From<ListError> for crate::Error {
    fn from(err: ListError) -> Self {
        crate::Error::List(err)
    }
}
