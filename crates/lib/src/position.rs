//! Reading and writing a row's position.

use crate::Result;
use crate::backend::{OrderBy, Transaction};
use crate::list::ListError;
use crate::predicate::Predicate;
use crate::row::{Row, Value};

/// Accessor for the configured position column.
#[derive(Debug, Clone)]
pub struct PositionAccessor {
    column: String,
    top: i64,
}

impl PositionAccessor {
    pub fn new(column: impl Into<String>, top: i64) -> Self {
        Self {
            column: column.into(),
            top,
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    /// The position of the first row of every list.
    pub fn top(&self) -> i64 {
        self.top
    }

    /// The row's position, `None` when it is not in a list.
    pub fn get(&self, row: &Row) -> Result<Option<i64>> {
        match row.get(&self.column) {
            Value::Null => Ok(None),
            Value::Integer(position) => Ok(Some(*position)),
            other => Err(ListError::PositionNotInteger {
                column: self.column.clone(),
                value: other.to_string(),
            }
            .into()),
        }
    }

    /// Set the row's in-memory position.
    pub fn set(&self, row: &mut Row, position: Option<i64>) {
        row.set(self.column.clone(), position);
    }

    pub fn is_listed(&self, row: &Row) -> bool {
        !row.get(&self.column).is_null()
    }

    /// Highest position among listed rows matching `scope` but not `excluding`,
    /// or `top - 1` when there are none.
    pub async fn bottom_position(
        &self,
        tx: &mut dyn Transaction,
        table: &str,
        scope: &Predicate,
        excluding: Option<Predicate>,
    ) -> Result<i64> {
        let filter = Predicate::all(
            [scope.clone(), Predicate::is_not_null(&self.column)]
                .into_iter()
                .chain(excluding),
        );
        let bottom = tx
            .select_one(table, &filter, Some(OrderBy::descending(&self.column)))
            .await?;
        match bottom {
            Some(row) => Ok(self.get(&row)?.unwrap_or(self.top - 1)),
            None => Ok(self.top - 1),
        }
    }
}
