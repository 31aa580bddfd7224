//! Ordered lists over a host table.
//!
//! [`OrderedList`] is the public handle: it binds one [`ListConfig`] to a
//! [`Backend`] and runs every operation in its own transaction. The row
//! passed in is only updated once that transaction has committed, so a failed
//! call leaves both the store and the caller's copy untouched.
//!
//! ```
//! use slotlist::backend::Backend;
//! use slotlist::backend::database::InMemory;
//! use slotlist::{ListConfig, OrderedList, Row};
//!
//! # #[tokio::main]
//! # async fn main() -> slotlist::Result<()> {
//! let config = ListConfig::builder("items").scope_column("list_id").build()?;
//! let list = OrderedList::new(config, Backend::new(InMemory::new()));
//!
//! let a = list.create(Row::new().with("list_id", 1)).await?;
//! let mut b = list.create(Row::new().with("list_id", 1)).await?;
//! list.move_higher(&mut b).await?;
//!
//! assert!(list.is_first(&b)?);
//! assert_eq!(list.reload(&a).await?.get("slot").as_integer(), Some(2));
//! # Ok(())
//! # }
//! ```

mod engine;
mod errors;
mod hooks;


use std::sync::Arc;

pub use engine::{Contiguity, Reorderer};
pub use errors::ListError;
pub use hooks::LifecycleHooks;

use crate::Result;
use crate::backend::{Backend, Transaction, commit_or_rollback};
use crate::config::ListConfig;
use crate::row::Row;

/// A configured list bound to a backend.
///
/// Reordering operations start from the position the caller's row carries;
/// only [`destroy`](Self::destroy) re-reads it from the store. An operation
/// that shifts peers leaves other copies of those peers stale, so
/// [`reload`](Self::reload) a row before reordering it if an earlier call may
/// have moved it.
#[derive(Debug, Clone)]
pub struct OrderedList {
    backend: Backend,
    engine: Reorderer,
}

impl OrderedList {
    pub fn new(config: ListConfig, backend: Backend) -> Self {
        Self {
            backend,
            engine: Reorderer::new(Arc::new(config)),
        }
    }

    pub fn config(&self) -> &ListConfig {
        self.engine.config()
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// The renumbering engine, for hosts driving [`LifecycleHooks`] themselves.
    pub fn engine(&self) -> &Reorderer {
        &self.engine
    }

    /// Commit, then adopt the staged row. The position it carries is now
    /// the stored one.
    async fn settle<T>(
        &self,
        tx: Box<dyn Transaction>,
        outcome: Result<T>,
        row: &mut Row,
        mut staged: Row,
    ) -> Result<T> {
        let value = commit_or_rollback(tx, outcome).await?;
        staged.clear_change(self.config().column());
        *row = staged;
        Ok(value)
    }

    /// Put `row` at `position`, shifting the rows in between.
    ///
    /// Inserting at the current position changes nothing.
    pub async fn insert_at(&self, row: &mut Row, position: i64) -> Result<()> {
        let mut staged = row.clone();
        let mut tx = self.backend.begin().await?;
        let outcome = self
            .engine
            .insert_at(tx.as_mut(), &mut staged, position)
            .await;
        self.settle(tx, outcome, row, staged).await
    }

    /// Put `row` at the top of its list.
    pub async fn insert_at_top(&self, row: &mut Row) -> Result<()> {
        let top = self.config().top_of_list();
        self.insert_at(row, top).await
    }

    /// Swap `row` with the row below it. No-op on the last row.
    pub async fn move_lower(&self, row: &mut Row) -> Result<()> {
        let mut staged = row.clone();
        let mut tx = self.backend.begin().await?;
        let outcome = self.engine.move_lower(tx.as_mut(), &mut staged).await;
        self.settle(tx, outcome, row, staged).await
    }

    /// Swap `row` with the row above it. No-op on the first row.
    pub async fn move_higher(&self, row: &mut Row) -> Result<()> {
        let mut staged = row.clone();
        let mut tx = self.backend.begin().await?;
        let outcome = self.engine.move_higher(tx.as_mut(), &mut staged).await;
        self.settle(tx, outcome, row, staged).await
    }

    pub async fn move_to_top(&self, row: &mut Row) -> Result<()> {
        let mut staged = row.clone();
        let mut tx = self.backend.begin().await?;
        let outcome = self.engine.move_to_top(tx.as_mut(), &mut staged).await;
        self.settle(tx, outcome, row, staged).await
    }

    pub async fn move_to_bottom(&self, row: &mut Row) -> Result<()> {
        let mut staged = row.clone();
        let mut tx = self.backend.begin().await?;
        let outcome = self.engine.move_to_bottom(tx.as_mut(), &mut staged).await;
        self.settle(tx, outcome, row, staged).await
    }

    /// Take `row` out of its list, closing the gap it leaves.
    pub async fn remove_from_list(&self, row: &mut Row) -> Result<()> {
        let mut staged = row.clone();
        let mut tx = self.backend.begin().await?;
        let outcome = self.engine.remove_from_list(tx.as_mut(), &mut staged).await;
        self.settle(tx, outcome, row, staged).await
    }

    /// Add one to `row`'s position without touching its peers.
    ///
    /// This can leave the list with a gap or a duplicate; restoring order is
    /// up to the caller.
    pub async fn increment_position(&self, row: &mut Row) -> Result<()> {
        let mut staged = row.clone();
        let mut tx = self.backend.begin().await?;
        let outcome = self
            .engine
            .increment_position(tx.as_mut(), &mut staged)
            .await;
        self.settle(tx, outcome, row, staged).await
    }

    /// Subtract one from `row`'s position without touching its peers.
    pub async fn decrement_position(&self, row: &mut Row) -> Result<()> {
        let mut staged = row.clone();
        let mut tx = self.backend.begin().await?;
        let outcome = self
            .engine
            .decrement_position(tx.as_mut(), &mut staged)
            .await;
        self.settle(tx, outcome, row, staged).await
    }

    /// True when `row` holds the top position. Reads only the row itself.
    pub fn is_first(&self, row: &Row) -> Result<bool> {
        self.engine.is_first(row)
    }

    /// True when no peer holds a higher position than `row`.
    pub async fn is_last(&self, row: &Row) -> Result<bool> {
        let mut tx = self.backend.begin().await?;
        let outcome = self.engine.is_last(tx.as_mut(), row).await;
        commit_or_rollback(tx, outcome).await
    }

    pub fn is_listed(&self, row: &Row) -> bool {
        self.engine.positions().is_listed(row)
    }

    pub fn is_unlisted(&self, row: &Row) -> bool {
        !self.is_listed(row)
    }

    /// The row directly above `row`, if any.
    pub async fn higher_peer(&self, row: &Row) -> Result<Option<Row>> {
        let mut tx = self.backend.begin().await?;
        let outcome = self.engine.higher_peer(tx.as_mut(), row).await;
        commit_or_rollback(tx, outcome).await
    }

    /// The row directly below `row`, if any.
    pub async fn lower_peer(&self, row: &Row) -> Result<Option<Row>> {
        let mut tx = self.backend.begin().await?;
        let outcome = self.engine.lower_peer(tx.as_mut(), row).await;
        commit_or_rollback(tx, outcome).await
    }

    /// Up to `limit` rows above `row`, nearest first.
    pub async fn higher_peers(&self, row: &Row, limit: Option<u64>) -> Result<Vec<Row>> {
        let mut tx = self.backend.begin().await?;
        let outcome = self.engine.higher_peers(tx.as_mut(), row, limit).await;
        commit_or_rollback(tx, outcome).await
    }

    /// Up to `limit` rows below `row`, nearest first.
    pub async fn lower_peers(&self, row: &Row, limit: Option<u64>) -> Result<Vec<Row>> {
        let mut tx = self.backend.begin().await?;
        let outcome = self.engine.lower_peers(tx.as_mut(), row, limit).await;
        commit_or_rollback(tx, outcome).await
    }

    /// Every listed row in `row`'s scope, in order.
    pub async fn peers(&self, row: &Row) -> Result<Vec<Row>> {
        let mut tx = self.backend.begin().await?;
        let outcome = self.engine.scope_rows(tx.as_mut(), row).await;
        commit_or_rollback(tx, outcome).await
    }

    /// The stored state of `row`.
    pub async fn reload(&self, row: &Row) -> Result<Row> {
        let mut tx = self.backend.begin().await?;
        let outcome = self.engine.reload(tx.as_mut(), row).await;
        commit_or_rollback(tx, outcome).await
    }

    /// Report gaps and duplicates in `row`'s scope.
    pub async fn check_contiguity(&self, row: &Row) -> Result<Contiguity> {
        let mut tx = self.backend.begin().await?;
        let outcome = self.engine.check_contiguity(tx.as_mut(), row).await;
        commit_or_rollback(tx, outcome).await
    }

    /// Insert a new row, placing it according to the creation policy.
    ///
    /// Returns the row as stored, including any identity the host assigned.
    pub async fn create(&self, row: Row) -> Result<Row> {
        let mut staged = row;
        let mut tx = self.backend.begin().await?;
        let outcome = async {
            self.engine.on_before_create(tx.as_mut(), &mut staged).await?;
            let stored = tx
                .insert(self.config().table(), self.config().primary_key(), &staged)
                .await?;
            self.engine.on_after_create(tx.as_mut(), &stored).await?;
            Ok::<_, crate::Error>(stored)
        }
        .await;
        commit_or_rollback(tx, outcome).await
    }

    /// Persist the attributes changed on `row`, then repair the list if its
    /// position was among them.
    ///
    /// Attributes the caller did not set are left alone, so a stale position
    /// on the copy is not written back. On success the copy carries the
    /// stored position and no change marks.
    pub async fn update(&self, row: &mut Row) -> Result<()> {
        let primary_key = self.config().primary_key();
        let mut changes = row.changes();
        changes.remove(primary_key);
        if changes.is_empty() {
            return Ok(());
        }

        let column = self.config().column();
        let mut staged = row.clone();
        let mut tx = self.backend.begin().await?;
        let outcome = async {
            let stored = self.engine.reload(tx.as_mut(), &staged).await?;
            let old_position = self.engine.positions().get(&stored)?;
            tx.update(
                self.config().table(),
                primary_key,
                &changes,
                &self.config().identity_of(&staged),
            )
            .await?;
            if changes.attribute(column).is_some() {
                self.engine
                    .on_after_update(tx.as_mut(), &staged, old_position)
                    .await
            } else {
                self.engine.positions().set(&mut staged, old_position);
                Ok(())
            }
        }
        .await;
        staged.clear_changes();
        self.settle(tx, outcome, row, staged).await
    }

    /// Delete `row` and close the gap it leaves.
    ///
    /// On success the caller's copy is left unlisted.
    pub async fn destroy(&self, row: &mut Row) -> Result<()> {
        let mut staged = row.clone();
        let mut tx = self.backend.begin().await?;
        let outcome = async {
            let captured = self
                .engine
                .on_before_destroy(tx.as_mut(), &mut staged)
                .await?;
            tx.delete(
                self.config().table(),
                &self.config().identity_of(&staged),
            )
            .await?;
            self.engine
                .on_after_destroy(tx.as_mut(), &staged, captured)
                .await
        }
        .await;
        self.engine.positions().set(&mut staged, None);
        self.settle(tx, outcome, row, staged).await
    }
}
