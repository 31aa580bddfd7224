//! SQL statement rendering.
//!
//! Predicates become `WHERE` clauses with numbered `$n` placeholders; every
//! non-null value travels as a bound parameter. Identifiers are double-quoted after
//! being checked against the identifier grammar, which works for both SQLite
//! and PostgreSQL.

use std::fmt::Write;

use crate::Result;
use crate::backend::errors::BackendError;
use crate::backend::{OrderBy, SortOrder};
use crate::config::is_identifier;
use crate::predicate::Predicate;
use crate::row::{Row, Value};

/// A rendered statement and its parameters in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Statement {
    pub(crate) sql: String,
    pub(crate) params: Vec<Value>,
}

#[derive(Default)]
struct SqlBuilder {
    sql: String,
    params: Vec<Value>,
}

impl SqlBuilder {
    fn push(&mut self, text: &str) -> &mut Self {
        self.sql.push_str(text);
        self
    }

    fn push_ident(&mut self, table: &str, ident: &str) -> Result<&mut Self> {
        for (i, part) in ident.split('.').enumerate() {
            if !is_identifier(part) {
                return Err(BackendError::InvalidRow {
                    table: table.to_string(),
                    reason: format!("'{ident}' is not a valid identifier"),
                }
                .into());
            }
            if i > 0 {
                self.sql.push('.');
            }
            let _ = write!(self.sql, "\"{part}\"");
        }
        Ok(self)
    }

    fn push_param(&mut self, value: Value) -> &mut Self {
        // an untyped literal lets PostgreSQL infer the column type
        if value.is_null() {
            self.sql.push_str("NULL");
            return self;
        }
        self.params.push(value);
        let _ = write!(self.sql, "${}", self.params.len());
        self
    }

    fn push_predicate(&mut self, table: &str, predicate: &Predicate) -> Result<()> {
        match predicate {
            Predicate::True => {
                self.push("1 = 1");
            }
            Predicate::Eq { column, value } if value.is_null() => {
                self.push_ident(table, column)?.push(" IS NULL");
            }
            Predicate::Eq { column, value } => {
                self.push_ident(table, column)?
                    .push(" = ")
                    .push_param(value.clone());
            }
            Predicate::NotEq { column, value } if value.is_null() => {
                self.push_ident(table, column)?.push(" IS NOT NULL");
            }
            Predicate::NotEq { column, value } => {
                self.push_ident(table, column)?
                    .push(" <> ")
                    .push_param(value.clone());
            }
            Predicate::Compare { column, op, value } => {
                self.push_ident(table, column)?
                    .push(" ")
                    .push(op.as_sql())
                    .push(" ")
                    .push_param(value.clone());
            }
            Predicate::IsNull(column) => {
                self.push_ident(table, column)?.push(" IS NULL");
            }
            Predicate::IsNotNull(column) => {
                self.push_ident(table, column)?.push(" IS NOT NULL");
            }
            Predicate::And(terms) if terms.is_empty() => {
                self.push("1 = 1");
            }
            Predicate::And(terms) => {
                self.push("(");
                for (i, term) in terms.iter().enumerate() {
                    if i > 0 {
                        self.push(" AND ");
                    }
                    self.push_predicate(table, term)?;
                }
                self.push(")");
            }
            Predicate::Raw { sql, params } => self.push_raw(sql, params)?,
        }
        Ok(())
    }

    /// Copy a raw fragment, renumbering its `?` placeholders.
    fn push_raw(&mut self, fragment: &str, params: &[Value]) -> Result<()> {
        let mut remaining = params.iter();
        let mut in_string = false;
        self.push("(");
        for c in fragment.chars() {
            match c {
                '\'' => {
                    in_string = !in_string;
                    self.sql.push(c);
                }
                '?' if !in_string => {
                    let value = remaining.next().ok_or_else(|| unbalanced(fragment, params))?;
                    self.push_param(value.clone());
                }
                _ => self.sql.push(c),
            }
        }
        if remaining.next().is_some() {
            return Err(unbalanced(fragment, params));
        }
        self.push(")");
        Ok(())
    }

    fn push_where(&mut self, table: &str, filter: &Predicate) -> Result<()> {
        self.push(" WHERE ");
        self.push_predicate(table, filter)
    }

    fn finish(self) -> Statement {
        Statement {
            sql: self.sql,
            params: self.params,
        }
    }
}

fn unbalanced(fragment: &str, params: &[Value]) -> crate::Error {
    BackendError::UnsupportedPredicate {
        reason: format!(
            "raw fragment '{fragment}' does not have exactly {} placeholders",
            params.len()
        ),
    }
    .into()
}

/// `UPDATE table SET column = column + $1 WHERE ...`
pub(crate) fn shift(
    table: &str,
    column: &str,
    delta: i64,
    filter: &Predicate,
) -> Result<Statement> {
    let mut b = SqlBuilder::default();
    b.push("UPDATE ").push_ident(table, table)?.push(" SET ");
    b.push_ident(table, column)?.push(" = ");
    b.push_ident(table, column)?.push(" + ").push_param(delta.into());
    b.push_where(table, filter)?;
    Ok(b.finish())
}

/// `UPDATE table SET column = $1 WHERE ...`
pub(crate) fn assign(
    table: &str,
    column: &str,
    value: Value,
    filter: &Predicate,
) -> Result<Statement> {
    let mut b = SqlBuilder::default();
    b.push("UPDATE ").push_ident(table, table)?.push(" SET ");
    b.push_ident(table, column)?.push(" = ").push_param(value);
    b.push_where(table, filter)?;
    Ok(b.finish())
}

pub(crate) fn select(
    table: &str,
    filter: &Predicate,
    order: Option<&OrderBy>,
    limit: Option<u64>,
) -> Result<Statement> {
    let mut b = SqlBuilder::default();
    b.push("SELECT * FROM ").push_ident(table, table)?;
    b.push_where(table, filter)?;
    if let Some(order) = order {
        b.push(" ORDER BY ").push_ident(table, &order.column)?;
        b.push(match order.order {
            SortOrder::Ascending => " ASC",
            SortOrder::Descending => " DESC",
        });
    }
    if let Some(limit) = limit {
        let _ = write!(b.sql, " LIMIT {limit}");
    }
    Ok(b.finish())
}

/// Name of the single column a [`count`] statement returns.
pub(crate) const COUNT_COLUMN: &str = "count";

pub(crate) fn count(table: &str, filter: &Predicate) -> Result<Statement> {
    let mut b = SqlBuilder::default();
    b.push("SELECT COUNT(*) AS ").push_ident(table, COUNT_COLUMN)?;
    b.push(" FROM ").push_ident(table, table)?;
    b.push_where(table, filter)?;
    Ok(b.finish())
}

/// `INSERT ... RETURNING *`; a null identity is left for the database to assign.
pub(crate) fn insert(table: &str, primary_key: &str, row: &Row) -> Result<Statement> {
    let columns: Vec<(&String, &Value)> = row
        .iter()
        .filter(|(column, value)| !(column.as_str() == primary_key && value.is_null()))
        .collect();

    let mut b = SqlBuilder::default();
    b.push("INSERT INTO ").push_ident(table, table)?;
    if columns.is_empty() {
        b.push(" DEFAULT VALUES");
    } else {
        b.push(" (");
        for (i, (column, _)) in columns.iter().enumerate() {
            if i > 0 {
                b.push(", ");
            }
            b.push_ident(table, column)?;
        }
        b.push(") VALUES (");
        for (i, (_, value)) in columns.iter().enumerate() {
            if i > 0 {
                b.push(", ");
            }
            b.push_param((*value).clone());
        }
        b.push(")");
    }
    b.push(" RETURNING *");
    Ok(b.finish())
}

/// `UPDATE table SET a = $1, b = $2 WHERE ...`, identity column excluded.
pub(crate) fn update(
    table: &str,
    primary_key: &str,
    row: &Row,
    filter: &Predicate,
) -> Result<Statement> {
    let mut b = SqlBuilder::default();
    b.push("UPDATE ").push_ident(table, table)?.push(" SET ");
    let mut first = true;
    for (column, value) in row.iter().filter(|(column, _)| *column != primary_key) {
        if !first {
            b.push(", ");
        }
        first = false;
        b.push_ident(table, column)?.push(" = ").push_param(value.clone());
    }
    if first {
        return Err(BackendError::InvalidRow {
            table: table.to_string(),
            reason: "nothing to update".to_string(),
        }
        .into());
    }
    b.push_where(table, filter)?;
    Ok(b.finish())
}

pub(crate) fn delete(table: &str, filter: &Predicate) -> Result<Statement> {
    let mut b = SqlBuilder::default();
    b.push("DELETE FROM ").push_ident(table, table)?;
    b.push_where(table, filter)?;
    Ok(b.finish())
}
