//! In-memory database backend implementation
//!
//! This module provides an in-memory implementation of the `BackendImpl` trait,
//! suitable for testing, development, or scenarios where data persistence
//! is not strictly required or is handled externally.

mod persistence;
mod transaction;

use std::any::Any;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::Result;
use crate::backend::{BackendImpl, Transaction};
use crate::row::Row;

use transaction::InMemoryTransaction;

/// Table name -> rows in insertion order.
pub(crate) type TableMap = BTreeMap<String, Vec<Row>>;

/// A simple in-memory table store.
///
/// Transactions are serialized: [`begin`](BackendImpl::begin) waits for the
/// previous transaction to finish, then works on a private copy of every table.
/// Committing swaps the copy in; rolling back or dropping the transaction
/// discards it, so a failed operation never leaves partial changes behind.
///
/// Raw predicate fragments cannot be evaluated here and are rejected with
/// `BackendError::UnsupportedPredicate`.
///
/// It provides basic persistence capabilities via `save_to_file` and
/// `load_from_file`, serializing the tables to JSON.
#[derive(Debug, Default)]
pub struct InMemory {
    pub(crate) tables: Arc<Mutex<TableMap>>,
}

impl InMemory {
    /// Creates a new, empty `InMemory` database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed rows of `table` in insertion order.
    pub async fn rows(&self, table: &str) -> Vec<Row> {
        let tables = self.tables.lock().await;
        tables.get(table).cloned().unwrap_or_default()
    }

    /// Names of every table holding at least one row.
    pub async fn table_names(&self) -> Vec<String> {
        let tables = self.tables.lock().await;
        tables
            .iter()
            .filter(|(_, rows)| !rows.is_empty())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Saves every table to a specified file as JSON.
    ///
    /// Waits for any in-flight transaction to finish first.
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        persistence::save_to_file(self, path).await
    }

    /// Loads tables from a specified JSON file.
    ///
    /// If the file does not exist, a new, empty `InMemory` database is returned.
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        persistence::load_from_file(path).await
    }
}

#[async_trait]
impl BackendImpl for InMemory {
    async fn begin(&self) -> Result<Box<dyn Transaction>> {
        let guard = Arc::clone(&self.tables).lock_owned().await;
        Ok(Box::new(InMemoryTransaction::new(guard)))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
