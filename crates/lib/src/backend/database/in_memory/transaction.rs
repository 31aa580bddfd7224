//! Transactions over the in-memory table store.

use async_trait::async_trait;
use tokio::sync::OwnedMutexGuard;

use super::TableMap;
use crate::Result;
use crate::backend::errors::BackendError;
use crate::backend::{OrderBy, SortOrder, Transaction};
use crate::predicate::Predicate;
use crate::row::{Row, Value};

/// Holds the store lock for its whole lifetime and edits a working copy.
pub(crate) struct InMemoryTransaction {
    guard: OwnedMutexGuard<TableMap>,
    working: TableMap,
}

impl InMemoryTransaction {
    pub(crate) fn new(guard: OwnedMutexGuard<TableMap>) -> Self {
        let working = guard.clone();
        Self { guard, working }
    }

    fn rows(&self, table: &str) -> &[Row] {
        self.working.get(table).map(Vec::as_slice).unwrap_or(&[])
    }

    fn rows_mut(&mut self, table: &str) -> &mut Vec<Row> {
        self.working.entry(table.to_string()).or_default()
    }
}

/// Fail early on predicates the in-memory evaluator cannot handle.
fn ensure_evaluable(filter: &Predicate) -> Result<()> {
    if filter.has_raw() {
        return Err(BackendError::UnsupportedPredicate {
            reason: "raw SQL fragments require a SQL backend".to_string(),
        }
        .into());
    }
    Ok(())
}

fn matches(filter: &Predicate, row: &Row) -> bool {
    filter.evaluate(row).unwrap_or(false)
}

#[async_trait]
impl Transaction for InMemoryTransaction {
    async fn shift(
        &mut self,
        table: &str,
        column: &str,
        delta: i64,
        filter: &Predicate,
    ) -> Result<u64> {
        ensure_evaluable(filter)?;
        let mut changed = 0;
        for row in self.rows_mut(table).iter_mut() {
            if !matches(filter, row) {
                continue;
            }
            // NULL + delta stays NULL, as in SQL
            if let Some(position) = row.get(column).as_integer() {
                row.set(column, position + delta);
            }
            changed += 1;
        }
        Ok(changed)
    }

    async fn assign(
        &mut self,
        table: &str,
        column: &str,
        value: Value,
        filter: &Predicate,
    ) -> Result<u64> {
        ensure_evaluable(filter)?;
        let mut matched = 0;
        for row in self.rows_mut(table).iter_mut() {
            if matches(filter, row) {
                row.set(column, value.clone());
                matched += 1;
            }
        }
        Ok(matched)
    }

    async fn select(
        &mut self,
        table: &str,
        filter: &Predicate,
        order: Option<OrderBy>,
        limit: Option<u64>,
    ) -> Result<Vec<Row>> {
        ensure_evaluable(filter)?;
        let mut selected: Vec<Row> = self
            .rows(table)
            .iter()
            .filter(|row| matches(filter, row))
            .map(|row| row.clone().saved())
            .collect();
        if let Some(order) = order {
            selected.sort_by(|a, b| {
                let ordering = a.get(&order.column).cmp(b.get(&order.column));
                match order.order {
                    SortOrder::Ascending => ordering,
                    SortOrder::Descending => ordering.reverse(),
                }
            });
        }
        if let Some(limit) = limit {
            selected.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }
        Ok(selected)
    }

    async fn count(&mut self, table: &str, filter: &Predicate) -> Result<u64> {
        ensure_evaluable(filter)?;
        Ok(self
            .rows(table)
            .iter()
            .filter(|row| matches(filter, row))
            .count() as u64)
    }

    async fn insert(&mut self, table: &str, primary_key: &str, row: &Row) -> Result<Row> {
        let rows = self.rows_mut(table);
        let mut stored = row.clone().saved();
        match row.get(primary_key) {
            Value::Null => {
                // mimic an auto-increment key
                let next = rows
                    .iter()
                    .filter_map(|r| r.get(primary_key).as_integer())
                    .max()
                    .unwrap_or(0)
                    + 1;
                stored.set(primary_key, next);
                stored.clear_changes();
            }
            id => {
                if rows.iter().any(|r| r.get(primary_key) == id) {
                    return Err(BackendError::DuplicateKey {
                        table: table.to_string(),
                        id: id.to_string(),
                    }
                    .into());
                }
            }
        }
        rows.push(stored.clone());
        Ok(stored)
    }

    async fn update(
        &mut self,
        table: &str,
        primary_key: &str,
        row: &Row,
        filter: &Predicate,
    ) -> Result<u64> {
        ensure_evaluable(filter)?;
        let mut matched = 0;
        for stored in self.rows_mut(table).iter_mut() {
            if !matches(filter, stored) {
                continue;
            }
            for (column, value) in row.iter() {
                if column != primary_key {
                    stored.set(column.clone(), value.clone());
                }
            }
            matched += 1;
        }
        Ok(matched)
    }

    async fn delete(&mut self, table: &str, filter: &Predicate) -> Result<u64> {
        ensure_evaluable(filter)?;
        let rows = self.rows_mut(table);
        let before = rows.len();
        rows.retain(|row| !matches(filter, row));
        Ok((before - rows.len()) as u64)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let InMemoryTransaction { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        // dropping the guard discards the working copy
        Ok(())
    }
}
