//! Error types for list configuration.

use thiserror::Error;

/// Errors raised while building or loading a [`ListConfig`](super::ListConfig).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A table or column name is not a plain SQL identifier.
    #[error("Invalid {kind} name '{name}': expected [A-Za-z_][A-Za-z0-9_]*")]
    InvalidIdentifier {
        /// What the name was for ("table", "column", ...)
        kind: &'static str,
        /// The rejected name
        name: String,
    },

    /// A composite scope was configured with no columns.
    #[error("Composite scope for table '{table}' lists no columns")]
    EmptyScope { table: String },

    /// The position column doubles as the identity or a scope key.
    #[error("Position column '{column}' is also used as {role}")]
    ColumnConflict {
        column: String,
        role: &'static str,
    },

    /// The configuration file could not be parsed.
    #[error("Failed to parse list configuration")]
    Parse {
        #[source]
        source: serde_json::Error,
    },
}

impl ConfigError {
    /// Check if this error came from an identifier check.
    pub fn is_identifier_error(&self) -> bool {
        matches!(self, ConfigError::InvalidIdentifier { .. })
    }

    /// Check if this error came from parsing a file.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, ConfigError::Parse { .. })
    }
}

impl From<ConfigError> for crate::Error {
    fn from(err: ConfigError) -> Self {
        crate::Error::Config(err)
    }
}
