//! Transactions over a typed sqlx pool.
//!
//! Rows are decoded through the database's own driver, so columns of types
//! slotlist does not model (dates, blobs, JSON) are skipped instead of failing
//! the whole fetch.

use async_trait::async_trait;
use sqlx::{Column as _, Decode, Type, ValueRef as _};

use super::SqlxResultExt;
use super::render::{self, Statement};
use crate::Result;
use crate::backend::errors::BackendError;
use crate::backend::{OrderBy, Transaction};
use crate::predicate::Predicate;
use crate::row::{Row, Value};

pub(crate) enum SqlxTransaction {
    #[cfg(feature = "sqlite")]
    Sqlite(sqlx::Transaction<'static, sqlx::Sqlite>),
    #[cfg(feature = "postgres")]
    Postgres(sqlx::Transaction<'static, sqlx::Postgres>),
}

/// Bind statement parameters in placeholder order.
macro_rules! bind_params {
    ($db:ty, $statement:expr) => {{
        let mut query = sqlx::query::<$db>(&$statement.sql);
        for value in $statement.params.iter().cloned() {
            query = match value {
                Value::Null => query.bind(None::<i64>),
                Value::Bool(b) => query.bind(b),
                Value::Integer(i) => query.bind(i),
                Value::Text(s) => query.bind(s),
            };
        }
        query
    }};
}

impl SqlxTransaction {
    async fn execute(&mut self, statement: Statement, context: &str) -> Result<u64> {
        tracing::trace!(sql = %statement.sql, "execute");
        let affected = match self {
            #[cfg(feature = "sqlite")]
            SqlxTransaction::Sqlite(tx) => bind_params!(sqlx::Sqlite, statement)
                .execute(&mut **tx)
                .await
                .map(|done| done.rows_affected()),
            #[cfg(feature = "postgres")]
            SqlxTransaction::Postgres(tx) => bind_params!(sqlx::Postgres, statement)
                .execute(&mut **tx)
                .await
                .map(|done| done.rows_affected()),
        };
        affected.sql_context(context)
    }

    async fn fetch(&mut self, statement: Statement, context: &str) -> Result<Vec<Row>> {
        tracing::trace!(sql = %statement.sql, "fetch");
        match self {
            #[cfg(feature = "sqlite")]
            SqlxTransaction::Sqlite(tx) => bind_params!(sqlx::Sqlite, statement)
                .fetch_all(&mut **tx)
                .await
                .sql_context(context)?
                .iter()
                .map(decode_row)
                .collect(),
            #[cfg(feature = "postgres")]
            SqlxTransaction::Postgres(tx) => bind_params!(sqlx::Postgres, statement)
                .fetch_all(&mut **tx)
                .await
                .sql_context(context)?
                .iter()
                .map(decode_row)
                .collect(),
        }
    }
}

fn try_decode<'r, R, T>(row: &'r R, index: usize) -> Option<T>
where
    R: sqlx::Row,
    usize: sqlx::ColumnIndex<R>,
    T: Decode<'r, R::Database> + Type<R::Database>,
{
    row.try_get::<T, usize>(index).ok()
}

/// Convert a result row into attribute values.
///
/// Integer, boolean, text and floating point columns are understood. A
/// column of any other type is skipped. SQLite stores booleans as integers,
/// so they come back as `Integer`.
fn decode_row<R>(row: &R) -> Result<Row>
where
    R: sqlx::Row,
    usize: sqlx::ColumnIndex<R>,
    for<'r> i64: Decode<'r, R::Database> + Type<R::Database>,
    for<'r> i32: Decode<'r, R::Database> + Type<R::Database>,
    for<'r> bool: Decode<'r, R::Database> + Type<R::Database>,
    for<'r> String: Decode<'r, R::Database> + Type<R::Database>,
    for<'r> f64: Decode<'r, R::Database> + Type<R::Database>,
{
    let mut decoded = Row::new();
    for (index, column) in row.columns().iter().enumerate() {
        let name = column.name();
        let raw = row.try_get_raw(index).map_err(|e| BackendError::Decode {
            column: name.to_string(),
            reason: e.to_string(),
        })?;
        if raw.is_null() {
            decoded.set(name, Value::Null);
            continue;
        }
        let value = if let Some(i) = try_decode::<R, i64>(row, index) {
            Value::Integer(i)
        } else if let Some(i) = try_decode::<R, i32>(row, index) {
            Value::Integer(i64::from(i))
        } else if let Some(b) = try_decode::<R, bool>(row, index) {
            Value::Bool(b)
        } else if let Some(s) = try_decode::<R, String>(row, index) {
            Value::Text(s)
        } else if let Some(f) = try_decode::<R, f64>(row, index) {
            Value::Text(f.to_string())
        } else {
            tracing::debug!(column = name, "Skipping column of unsupported type");
            continue;
        };
        decoded.set(name, value);
    }
    Ok(decoded.saved())
}

#[async_trait]
impl Transaction for SqlxTransaction {
    async fn shift(
        &mut self,
        table: &str,
        column: &str,
        delta: i64,
        filter: &Predicate,
    ) -> Result<u64> {
        let statement = render::shift(table, column, delta, filter)?;
        self.execute(statement, &format!("Failed to shift {table}.{column}"))
            .await
    }

    async fn assign(
        &mut self,
        table: &str,
        column: &str,
        value: Value,
        filter: &Predicate,
    ) -> Result<u64> {
        let statement = render::assign(table, column, value, filter)?;
        self.execute(statement, &format!("Failed to assign {table}.{column}"))
            .await
    }

    async fn select(
        &mut self,
        table: &str,
        filter: &Predicate,
        order: Option<OrderBy>,
        limit: Option<u64>,
    ) -> Result<Vec<Row>> {
        let statement = render::select(table, filter, order.as_ref(), limit)?;
        self.fetch(statement, &format!("Failed to select from {table}"))
            .await
    }

    async fn count(&mut self, table: &str, filter: &Predicate) -> Result<u64> {
        let statement = render::count(table, filter)?;
        let rows = self
            .fetch(statement, &format!("Failed to count {table}"))
            .await?;
        let count = rows
            .first()
            .and_then(|row| row.get(render::COUNT_COLUMN).as_integer())
            .unwrap_or(0);
        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn insert(&mut self, table: &str, primary_key: &str, row: &Row) -> Result<Row> {
        let statement = render::insert(table, primary_key, row)?;
        let mut rows = self
            .fetch(statement, &format!("Failed to insert into {table}"))
            .await?;
        if rows.is_empty() {
            return Err(BackendError::InvalidRow {
                table: table.to_string(),
                reason: "insert returned no row".to_string(),
            }
            .into());
        }
        Ok(rows.swap_remove(0))
    }

    async fn update(
        &mut self,
        table: &str,
        primary_key: &str,
        row: &Row,
        filter: &Predicate,
    ) -> Result<u64> {
        let statement = render::update(table, primary_key, row, filter)?;
        self.execute(statement, &format!("Failed to update {table}"))
            .await
    }

    async fn delete(&mut self, table: &str, filter: &Predicate) -> Result<u64> {
        let statement = render::delete(table, filter)?;
        self.execute(statement, &format!("Failed to delete from {table}"))
            .await
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let finished = match *self {
            #[cfg(feature = "sqlite")]
            SqlxTransaction::Sqlite(tx) => tx.commit().await,
            #[cfg(feature = "postgres")]
            SqlxTransaction::Postgres(tx) => tx.commit().await,
        };
        finished.sql_context("Failed to commit transaction")
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        let finished = match *self {
            #[cfg(feature = "sqlite")]
            SqlxTransaction::Sqlite(tx) => tx.rollback().await,
            #[cfg(feature = "postgres")]
            SqlxTransaction::Postgres(tx) => tx.rollback().await,
        };
        finished.sql_context("Failed to roll back transaction")
    }
}
