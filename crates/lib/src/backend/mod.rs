//! Host persistence layer.
//!
//! This module defines the collaborator contract the reordering engine needs
//! from whatever stores the rows, plus the reference implementations:
//!
//! - [`database::InMemory`]: tables held in memory, optionally persisted to JSON
//! - [`database::SqlxBackend`]: SQLite or PostgreSQL through sqlx (features `sqlite`/`postgres`)
//!
//! The engine never issues per-row loops. Every renumbering is one
//! [`Transaction::shift`] over a predicate, and every neighbour or bottom lookup
//! is one [`Transaction::select_one`], so the number of round-trips of an
//! operation does not depend on the size of the list.

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use handle_trait::Handle;

use crate::Result;
use crate::predicate::Predicate;
use crate::row::{Row, Value};

pub mod database;
mod errors;

pub use errors::BackendError;

/// Direction of an ordered lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Ordering of a lookup by one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub order: SortOrder,
}

impl OrderBy {
    pub fn ascending(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            order: SortOrder::Ascending,
        }
    }

    pub fn descending(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            order: SortOrder::Descending,
        }
    }
}

/// A storage backend able to open transactions.
///
/// All implementations must be `Send` and `Sync` so a backend can be shared
/// across tasks, and implement `Any` so callers can downcast to the concrete
/// type (e.g. to save an [`database::InMemory`] to disk).
#[async_trait]
pub trait BackendImpl: Send + Sync + Any {
    /// Open a new transaction.
    ///
    /// Nothing done through the transaction is visible to others until
    /// [`Transaction::commit`]; dropping it without committing discards it.
    async fn begin(&self) -> Result<Box<dyn Transaction>>;

    /// Downcast support.
    fn as_any(&self) -> &dyn Any;
}

/// One unit of atomic work against the host store.
///
/// Column and table names passed here come from a validated
/// [`ListConfig`](crate::ListConfig). Row attribute names given to
/// [`insert`](Transaction::insert) and [`update`](Transaction::update) are
/// checked by the implementation.
#[async_trait]
pub trait Transaction: Send {
    /// `UPDATE table SET column = column + delta WHERE filter`.
    ///
    /// Returns the number of rows changed.
    async fn shift(
        &mut self,
        table: &str,
        column: &str,
        delta: i64,
        filter: &Predicate,
    ) -> Result<u64>;

    /// `UPDATE table SET column = value WHERE filter`.
    ///
    /// Returns the number of rows matched.
    async fn assign(
        &mut self,
        table: &str,
        column: &str,
        value: Value,
        filter: &Predicate,
    ) -> Result<u64>;

    /// Rows matching `filter`, optionally ordered and limited.
    async fn select(
        &mut self,
        table: &str,
        filter: &Predicate,
        order: Option<OrderBy>,
        limit: Option<u64>,
    ) -> Result<Vec<Row>>;

    /// Number of rows matching `filter`.
    async fn count(&mut self, table: &str, filter: &Predicate) -> Result<u64>;

    /// Insert a row and return it as stored.
    ///
    /// When the row has no value for `primary_key` the host assigns one.
    async fn insert(&mut self, table: &str, primary_key: &str, row: &Row) -> Result<Row>;

    /// Overwrite every attribute of `row` except `primary_key` on the rows matching `filter`.
    async fn update(
        &mut self,
        table: &str,
        primary_key: &str,
        row: &Row,
        filter: &Predicate,
    ) -> Result<u64>;

    /// Delete the rows matching `filter`.
    async fn delete(&mut self, table: &str, filter: &Predicate) -> Result<u64>;

    async fn commit(self: Box<Self>) -> Result<()>;

    async fn rollback(self: Box<Self>) -> Result<()>;

    /// The first row matching `filter` under `order`.
    async fn select_one(
        &mut self,
        table: &str,
        filter: &Predicate,
        order: Option<OrderBy>,
    ) -> Result<Option<Row>> {
        let mut rows = self.select(table, filter, order, Some(1)).await?;
        Ok(rows.pop())
    }
}

/// Commit on success, roll back on failure.
///
/// A failed rollback is logged; the original error is what the caller sees.
pub async fn commit_or_rollback<T>(tx: Box<dyn Transaction>, outcome: Result<T>) -> Result<T> {
    match outcome {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!("Rollback failed after error '{err}': {rollback_err}");
            }
            Err(err)
        }
    }
}

/// Cheaply clonable handle to a shared [`BackendImpl`].
#[derive(Clone, Handle)]
pub struct Backend {
    backend_impl: Arc<dyn BackendImpl>,
}

impl Backend {
    /// Wrap a backend implementation.
    pub fn new(backend_impl: impl BackendImpl) -> Self {
        Self {
            backend_impl: Arc::new(backend_impl),
        }
    }

    /// Wrap an already shared backend implementation.
    pub fn from_arc(backend_impl: Arc<dyn BackendImpl>) -> Self {
        Self { backend_impl }
    }

    /// Open a transaction on the underlying backend.
    pub async fn begin(&self) -> Result<Box<dyn Transaction>> {
        self.backend_impl.begin().await
    }

    /// Get access to the underlying `BackendImpl`.
    pub fn as_backend_impl(&self) -> &dyn BackendImpl {
        &*self.backend_impl
    }

    /// Downcast to Any for concrete backend type access
    ///
    /// Primarily used to reach `InMemory::save_to_file` or test inspection helpers.
    pub fn as_any(&self) -> &dyn Any {
        self.backend_impl.as_any()
    }
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend").finish_non_exhaustive()
    }
}
