//! Position renumbering.
//!
//! Every mutation is expressed as at most two set-based shifts over peers plus
//! one write of the row's own position. The caller supplies the transaction;
//! nothing here commits. Rows passed in are updated in memory to match what
//! was written, so callers that stage a copy can adopt it after commit.

use std::sync::Arc;

use crate::Result;
use crate::backend::{OrderBy, Transaction};
use crate::config::{AddNewAt, ListConfig};
use crate::list::ListError;
use crate::position::PositionAccessor;
use crate::predicate::Predicate;
use crate::row::{Row, Value};
use crate::scope::ScopeResolver;

/// Positions of one scope checked against the dense-numbering invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contiguity {
    /// Listed positions in ascending order.
    pub positions: Vec<i64>,
    /// Positions in `top..top+n` held by no row.
    pub missing: Vec<i64>,
    /// Positions held by more than one row, or outside `top..top+n`.
    pub duplicates: Vec<i64>,
}

impl Contiguity {
    pub fn is_contiguous(&self) -> bool {
        self.missing.is_empty() && self.duplicates.is_empty()
    }

    fn check(positions: Vec<i64>, top: i64) -> Self {
        let expected = top..top + positions.len() as i64;
        let missing = expected
            .clone()
            .filter(|p| positions.binary_search(p).is_err())
            .collect();
        let mut duplicates: Vec<i64> = positions
            .windows(2)
            .filter(|w| w[0] == w[1])
            .map(|w| w[0])
            .chain(positions.iter().copied().filter(|p| !expected.contains(p)))
            .collect();
        duplicates.sort_unstable();
        duplicates.dedup();
        Self {
            positions,
            missing,
            duplicates,
        }
    }
}

/// The renumbering algorithms for one configured list.
#[derive(Debug, Clone)]
pub struct Reorderer {
    config: Arc<ListConfig>,
    scope: ScopeResolver,
    positions: PositionAccessor,
}

impl Reorderer {
    pub fn new(config: Arc<ListConfig>) -> Self {
        let scope = ScopeResolver::new(config.scope().clone());
        let positions = PositionAccessor::new(config.column(), config.top_of_list());
        Self {
            config,
            scope,
            positions,
        }
    }

    pub fn config(&self) -> &ListConfig {
        &self.config
    }

    pub fn positions(&self) -> &PositionAccessor {
        &self.positions
    }

    fn table(&self) -> &str {
        self.config.table()
    }

    fn column(&self) -> &str {
        self.config.column()
    }

    /// Rows in `row`'s scope matching `range`, never `row` itself.
    ///
    /// A row without identity is not persisted yet, so nothing needs excluding.
    fn peers(&self, row: &Row, range: Predicate) -> Result<Predicate> {
        let scope = self.scope.peers_of(row)?;
        let id = row.get(self.config.primary_key());
        let not_self = if id.is_null() {
            Predicate::True
        } else {
            Predicate::not_eq(self.config.primary_key(), id.clone())
        };
        Ok(Predicate::all([scope, range, not_self]))
    }

    fn identity(&self, row: &Row) -> Result<Predicate> {
        if row.get(self.config.primary_key()).is_null() {
            return Err(ListError::MissingIdentity {
                table: self.table().to_string(),
                column: self.config.primary_key().to_string(),
            }
            .into());
        }
        Ok(self.config.identity_of(row))
    }

    async fn shift_peers(
        &self,
        tx: &mut dyn Transaction,
        row: &Row,
        range: Predicate,
        delta: i64,
    ) -> Result<u64> {
        let filter = self.peers(row, range)?;
        let shifted = tx.shift(self.table(), self.column(), delta, &filter).await?;
        tracing::debug!(table = self.table(), delta, shifted, "Shifted peers");
        Ok(shifted)
    }

    /// Write the row's own position and mirror it in memory.
    async fn store_position(
        &self,
        tx: &mut dyn Transaction,
        row: &mut Row,
        position: Option<i64>,
    ) -> Result<()> {
        let identity = self.identity(row)?;
        let matched = tx
            .assign(self.table(), self.column(), Value::from(position), &identity)
            .await?;
        if matched == 0 {
            return Err(ListError::RowNotFound {
                table: self.table().to_string(),
                id: row.get(self.config.primary_key()).to_string(),
            }
            .into());
        }
        self.positions.set(row, position);
        Ok(())
    }

    /// Close the gap at `old` and open one at `target`.
    async fn shuffle(
        &self,
        tx: &mut dyn Transaction,
        row: &Row,
        old: i64,
        target: i64,
    ) -> Result<()> {
        let column = self.column();
        if target > old {
            let range = Predicate::gt(column, old).and(Predicate::le(column, target));
            self.shift_peers(tx, row, range, -1).await?;
        } else if target < old {
            let range = Predicate::ge(column, target).and(Predicate::lt(column, old));
            self.shift_peers(tx, row, range, 1).await?;
        }
        Ok(())
    }

    /// The peer holding exactly `position`.
    async fn peer_at(
        &self,
        tx: &mut dyn Transaction,
        row: &Row,
        position: i64,
    ) -> Result<Option<Row>> {
        let filter = self.peers(row, Predicate::eq(self.column(), position))?;
        tx.select_one(self.table(), &filter, None).await
    }

    async fn bottom_of(
        &self,
        tx: &mut dyn Transaction,
        row: &Row,
        exclude_self: bool,
    ) -> Result<i64> {
        let scope = self.scope.peers_of(row)?;
        let id = row.get(self.config.primary_key());
        let excluding = (exclude_self && !id.is_null())
            .then(|| Predicate::not_eq(self.config.primary_key(), id.clone()));
        self.positions
            .bottom_position(tx, self.table(), &scope, excluding)
            .await
    }

    /// Move `row` to `target`, shifting the peers in between.
    pub async fn insert_at(
        &self,
        tx: &mut dyn Transaction,
        row: &mut Row,
        target: i64,
    ) -> Result<()> {
        let current = self.positions.get(row)?;
        if current == Some(target) {
            return Ok(());
        }
        tracing::debug!(table = self.table(), ?current, target, "insert_at");
        match current {
            Some(old) => self.shuffle(tx, row, old, target).await?,
            None => {
                self.shift_peers(tx, row, Predicate::ge(self.column(), target), 1)
                    .await?;
            }
        }
        self.store_position(tx, row, Some(target)).await
    }

    pub async fn move_to_top(&self, tx: &mut dyn Transaction, row: &mut Row) -> Result<()> {
        let Some(current) = self.positions.get(row)? else {
            return Ok(());
        };
        tracing::debug!(table = self.table(), current, "move_to_top");
        self.shift_peers(tx, row, Predicate::lt(self.column(), current), 1)
            .await?;
        self.store_position(tx, row, Some(self.positions.top()))
            .await
    }

    pub async fn move_to_bottom(&self, tx: &mut dyn Transaction, row: &mut Row) -> Result<()> {
        let Some(current) = self.positions.get(row)? else {
            return Ok(());
        };
        tracing::debug!(table = self.table(), current, "move_to_bottom");
        self.shift_peers(tx, row, Predicate::gt(self.column(), current), -1)
            .await?;
        let bottom = self.bottom_of(tx, row, true).await?;
        self.store_position(tx, row, Some(bottom + 1)).await
    }

    /// Swap with the peer directly above. Uses the in-memory position as is.
    pub async fn move_higher(&self, tx: &mut dyn Transaction, row: &mut Row) -> Result<()> {
        self.swap(tx, row, -1).await
    }

    /// Swap with the peer directly below.
    pub async fn move_lower(&self, tx: &mut dyn Transaction, row: &mut Row) -> Result<()> {
        self.swap(tx, row, 1).await
    }

    async fn swap(&self, tx: &mut dyn Transaction, row: &mut Row, step: i64) -> Result<()> {
        let Some(current) = self.positions.get(row)? else {
            return Ok(());
        };
        let Some(neighbour) = self.peer_at(tx, row, current + step).await? else {
            return Ok(());
        };
        tracing::debug!(table = self.table(), current, step, "swap");
        tx.shift(
            self.table(),
            self.column(),
            -step,
            &self.config.identity_of(&neighbour),
        )
        .await?;
        self.store_position(tx, row, Some(current + step)).await
    }

    pub async fn remove_from_list(&self, tx: &mut dyn Transaction, row: &mut Row) -> Result<()> {
        let Some(current) = self.positions.get(row)? else {
            return Ok(());
        };
        tracing::debug!(table = self.table(), current, "remove_from_list");
        self.shift_peers(tx, row, Predicate::gt(self.column(), current), -1)
            .await?;
        self.store_position(tx, row, None).await
    }

    /// Add one to the row's own position without touching peers.
    pub async fn increment_position(
        &self,
        tx: &mut dyn Transaction,
        row: &mut Row,
    ) -> Result<()> {
        self.nudge(tx, row, 1).await
    }

    /// Subtract one from the row's own position without touching peers.
    pub async fn decrement_position(
        &self,
        tx: &mut dyn Transaction,
        row: &mut Row,
    ) -> Result<()> {
        self.nudge(tx, row, -1).await
    }

    async fn nudge(&self, tx: &mut dyn Transaction, row: &mut Row, delta: i64) -> Result<()> {
        let Some(current) = self.positions.get(row)? else {
            return Ok(());
        };
        self.store_position(tx, row, Some(current + delta)).await
    }

    /// Choose the position of a row about to be inserted and make room for it.
    pub async fn place_new(&self, tx: &mut dyn Transaction, row: &mut Row) -> Result<()> {
        let top = self.positions.top();
        let position = match self.config.add_new_at() {
            AddNewAt::Top => {
                self.shift_peers(tx, row, Predicate::is_not_null(self.column()), 1)
                    .await?;
                top
            }
            AddNewAt::Bottom => {
                let bottom = self.bottom_of(tx, row, false).await?;
                match self.positions.get(row)? {
                    Some(preset) if bottom >= top => {
                        // a preset past the end would leave a gap
                        let preset = preset.clamp(top, bottom + 1);
                        self.shift_peers(tx, row, Predicate::ge(self.column(), preset), 1)
                            .await?;
                        preset
                    }
                    _ => bottom + 1,
                }
            }
        };
        tracing::debug!(table = self.table(), position, "Placed new row");
        self.positions.set(row, Some(position));
        Ok(())
    }

    /// Repair the scope after the row's position was written directly.
    pub async fn reconcile_update(
        &self,
        tx: &mut dyn Transaction,
        row: &Row,
        old: Option<i64>,
    ) -> Result<()> {
        let new = self.positions.get(row)?;
        match (old, new) {
            (Some(old), Some(new)) if old != new => {
                let clash = self.peers(row, Predicate::eq(self.column(), new))?;
                if tx.count(self.table(), &clash).await? > 0 {
                    tracing::debug!(table = self.table(), old, new, "Reconciling direct move");
                    self.shuffle(tx, row, old, new).await?;
                }
            }
            (None, Some(new)) => {
                tracing::debug!(table = self.table(), new, "Reconciling direct listing");
                self.shift_peers(tx, row, Predicate::ge(self.column(), new), 1)
                    .await?;
            }
            (Some(old), None) => {
                tracing::debug!(table = self.table(), old, "Reconciling direct unlisting");
                self.shift_peers(tx, row, Predicate::gt(self.column(), old), -1)
                    .await?;
            }
            _ => {}
        }
        Ok(())
    }

    /// Replace `row` with its stored state and return the stored position.
    pub async fn capture_for_destroy(
        &self,
        tx: &mut dyn Transaction,
        row: &mut Row,
    ) -> Result<Option<i64>> {
        *row = self.reload(tx, row).await?;
        self.positions.get(row)
    }

    /// Close the gap left by a deleted row.
    pub async fn reconcile_destroy(
        &self,
        tx: &mut dyn Transaction,
        row: &Row,
        captured: Option<i64>,
    ) -> Result<()> {
        if let Some(captured) = captured {
            self.shift_peers(tx, row, Predicate::gt(self.column(), captured), -1)
                .await?;
        }
        Ok(())
    }

    /// Fresh copy of `row` from the store.
    pub async fn reload(&self, tx: &mut dyn Transaction, row: &Row) -> Result<Row> {
        let identity = self.identity(row)?;
        tx.select_one(self.table(), &identity, None)
            .await?
            .ok_or_else(|| {
                ListError::RowNotFound {
                    table: self.table().to_string(),
                    id: row.get(self.config.primary_key()).to_string(),
                }
                .into()
            })
    }

    pub fn is_first(&self, row: &Row) -> Result<bool> {
        Ok(self.positions.get(row)? == Some(self.positions.top()))
    }

    pub async fn is_last(&self, tx: &mut dyn Transaction, row: &Row) -> Result<bool> {
        let Some(current) = self.positions.get(row)? else {
            return Ok(false);
        };
        Ok(self.bottom_of(tx, row, false).await? == current)
    }

    pub async fn higher_peer(&self, tx: &mut dyn Transaction, row: &Row) -> Result<Option<Row>> {
        match self.positions.get(row)? {
            Some(current) => self.peer_at(tx, row, current - 1).await,
            None => Ok(None),
        }
    }

    pub async fn lower_peer(&self, tx: &mut dyn Transaction, row: &Row) -> Result<Option<Row>> {
        match self.positions.get(row)? {
            Some(current) => self.peer_at(tx, row, current + 1).await,
            None => Ok(None),
        }
    }

    /// Peers above `row`, nearest first.
    pub async fn higher_peers(
        &self,
        tx: &mut dyn Transaction,
        row: &Row,
        limit: Option<u64>,
    ) -> Result<Vec<Row>> {
        let Some(current) = self.positions.get(row)? else {
            return Ok(Vec::new());
        };
        let filter = self.peers(row, Predicate::lt(self.column(), current))?;
        tx.select(
            self.table(),
            &filter,
            Some(OrderBy::descending(self.column())),
            limit,
        )
        .await
    }

    /// Peers below `row`, nearest first.
    pub async fn lower_peers(
        &self,
        tx: &mut dyn Transaction,
        row: &Row,
        limit: Option<u64>,
    ) -> Result<Vec<Row>> {
        let Some(current) = self.positions.get(row)? else {
            return Ok(Vec::new());
        };
        let filter = self.peers(row, Predicate::gt(self.column(), current))?;
        tx.select(
            self.table(),
            &filter,
            Some(OrderBy::ascending(self.column())),
            limit,
        )
        .await
    }

    /// Every listed row of `row`'s scope, `row` included, in order.
    pub async fn scope_rows(&self, tx: &mut dyn Transaction, row: &Row) -> Result<Vec<Row>> {
        let filter = self
            .scope
            .peers_of(row)?
            .and(Predicate::is_not_null(self.column()));
        tx.select(
            self.table(),
            &filter,
            Some(OrderBy::ascending(self.column())),
            None,
        )
        .await
    }

    pub async fn check_contiguity(
        &self,
        tx: &mut dyn Transaction,
        row: &Row,
    ) -> Result<Contiguity> {
        let rows = self.scope_rows(tx, row).await?;
        let mut positions = Vec::with_capacity(rows.len());
        for scoped in &rows {
            if let Some(position) = self.positions.get(scoped)? {
                positions.push(position);
            }
        }
        positions.sort_unstable();
        Ok(Contiguity::check(positions, self.positions.top()))
    }
}
