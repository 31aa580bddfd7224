//!
//! slotlist: dense integer ordering of relational rows.
//! This library keeps rows of a table in a total order per "scope" using a single position column.
//!
//! ## Core Concepts
//!
//! * **Rows (`row::Row`)**: Attribute maps read from and written to the host's table. A row's identity,
//!   scope keys and position are all plain attributes.
//! * **Scopes (`scope::ScopeSpec`)**: Which rows are peers of each other: the whole table, rows sharing one or
//!   several key columns, or a custom predicate.
//! * **Predicates (`predicate::Predicate`)**: Typed, parameterized conditions. Hosts either evaluate them in
//!   memory or render them to SQL with bound parameters.
//! * **Backends (`backend::BackendImpl`)**: The host persistence layer. It opens transactions that support
//!   bulk conditional position shifts and ordered single-row lookups.
//! * **Ordered lists (`list::OrderedList`)**: The public handle. Every reordering operation runs the peer
//!   shifts and the row's own update inside one transaction, so the list stays contiguous
//!   (`top, top+1, …, top+n-1`) after every completed call.

pub mod backend;
pub mod config;
pub mod list;
pub mod position;
pub mod predicate;
pub mod row;
pub mod scope;

pub use config::{AddNewAt, ListConfig};
pub use list::OrderedList;
pub use predicate::Predicate;
pub use row::{Row, Value};
pub use scope::ScopeSpec;

/// Result type used throughout the slotlist library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the slotlist library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured storage errors from the backend module
    #[error(transparent)]
    Backend(backend::BackendError),

    /// Structured configuration errors from the config module
    #[error(transparent)]
    Config(config::ConfigError),

    /// Structured list errors from the reordering engine
    #[error(transparent)]
    List(list::ListError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Backend(_) => "backend",
            Error::Config(_) => "config",
            Error::List(_) => "list",
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Backend(backend_err) => backend_err.is_not_found(),
            Error::List(list_err) => list_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error is database/backend-related.
    pub fn is_database_error(&self) -> bool {
        matches!(self, Error::Backend(_))
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Io(_) => true,
            Error::Backend(backend_err) => backend_err.is_io_error(),
            _ => false,
        }
    }

    /// Check if this error is validation-related.
    pub fn is_validation_error(&self) -> bool {
        match self {
            Error::Config(_) => true,
            Error::List(list_err) => list_err.is_validation_error(),
            Error::Backend(backend_err) => backend_err.is_unsupported(),
            _ => false,
        }
    }
}
