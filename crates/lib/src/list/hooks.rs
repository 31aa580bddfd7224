//! Lifecycle hooks for a host's mutation pipeline.
//!
//! A host that inserts, updates and deletes rows through its own code calls
//! these at the matching points, inside the same transaction as the mutation.
//! [`OrderedList::create`](super::OrderedList::create) and its siblings show
//! the expected call order.

use async_trait::async_trait;

use super::engine::Reorderer;
use crate::Result;
use crate::backend::Transaction;
use crate::row::Row;

/// Points in a row's lifecycle at which ordering must be maintained.
#[async_trait]
pub trait LifecycleHooks: Send + Sync {
    /// Called before a new row is first persisted.
    ///
    /// Sets the row's position according to the creation policy and makes
    /// room for it among its peers.
    async fn on_before_create(&self, tx: &mut dyn Transaction, row: &mut Row) -> Result<()>;

    /// Called after a new row has been persisted.
    async fn on_after_create(&self, _tx: &mut dyn Transaction, _row: &Row) -> Result<()> {
        Ok(())
    }

    /// Called after an update has been persisted, with the position the row
    /// held before it.
    async fn on_after_update(
        &self,
        tx: &mut dyn Transaction,
        row: &Row,
        old_position: Option<i64>,
    ) -> Result<()>;

    /// Called before a row is deleted.
    ///
    /// Refreshes `row` from the store and returns the position to close.
    async fn on_before_destroy(
        &self,
        tx: &mut dyn Transaction,
        row: &mut Row,
    ) -> Result<Option<i64>>;

    /// Called after a row has been deleted.
    async fn on_after_destroy(
        &self,
        tx: &mut dyn Transaction,
        row: &Row,
        captured: Option<i64>,
    ) -> Result<()>;
}

#[async_trait]
impl LifecycleHooks for Reorderer {
    async fn on_before_create(&self, tx: &mut dyn Transaction, row: &mut Row) -> Result<()> {
        self.place_new(tx, row).await
    }

    async fn on_after_update(
        &self,
        tx: &mut dyn Transaction,
        row: &Row,
        old_position: Option<i64>,
    ) -> Result<()> {
        self.reconcile_update(tx, row, old_position).await
    }

    async fn on_before_destroy(
        &self,
        tx: &mut dyn Transaction,
        row: &mut Row,
    ) -> Result<Option<i64>> {
        self.capture_for_destroy(tx, row).await
    }

    async fn on_after_destroy(
        &self,
        tx: &mut dyn Transaction,
        row: &Row,
        captured: Option<i64>,
    ) -> Result<()> {
        self.reconcile_destroy(tx, row, captured).await
    }
}
