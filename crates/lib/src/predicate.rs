//! Typed row predicates.
//!
//! Every condition the reordering engine sends to a host is a [`Predicate`].
//! Column names are identifiers validated by [`ListConfig`](crate::ListConfig);
//! values are never spliced into query text, SQL hosts bind them as parameters.
//!
//! Comparison semantics follow SQL: any comparison involving `NULL` is false,
//! and equality against a null value means `IS NULL`.

use std::cmp::Ordering;

use crate::row::{Row, Value};

/// Ordered comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    /// The SQL operator text.
    pub fn as_sql(&self) -> &'static str {
        match self {
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }

    fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Le => ordering != Ordering::Greater,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Ge => ordering != Ordering::Less,
        }
    }
}

/// A condition over a single table's rows.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Matches every row.
    True,
    /// `column = value`, or `column IS NULL` when `value` is null.
    Eq { column: String, value: Value },
    /// `column <> value`, or `column IS NOT NULL` when `value` is null.
    NotEq { column: String, value: Value },
    /// `column <op> value`.
    Compare {
        column: String,
        op: CompareOp,
        value: Value,
    },
    IsNull(String),
    IsNotNull(String),
    /// Conjunction. An empty conjunction matches every row.
    And(Vec<Predicate>),
    /// A host-specific fragment with `?` placeholders bound to `params` in order.
    ///
    /// Only SQL hosts can evaluate raw fragments.
    Raw { sql: String, params: Vec<Value> },
}

impl Predicate {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::Eq {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn not_eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::NotEq {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn compare(column: impl Into<String>, op: CompareOp, value: impl Into<Value>) -> Self {
        Predicate::Compare {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    pub fn lt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(column, CompareOp::Lt, value)
    }

    pub fn le(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(column, CompareOp::Le, value)
    }

    pub fn gt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(column, CompareOp::Gt, value)
    }

    pub fn ge(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(column, CompareOp::Ge, value)
    }

    pub fn is_null(column: impl Into<String>) -> Self {
        Predicate::IsNull(column.into())
    }

    pub fn is_not_null(column: impl Into<String>) -> Self {
        Predicate::IsNotNull(column.into())
    }

    /// A raw fragment such as `"archived_at IS NULL AND owner = ?"`.
    pub fn raw(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Predicate::Raw {
            sql: sql.into(),
            params,
        }
    }

    /// Conjoin two predicates, flattening nested conjunctions and dropping `True`.
    pub fn and(self, other: Predicate) -> Self {
        Self::all([self, other])
    }

    /// Conjoin any number of predicates.
    pub fn all(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        let mut terms = Vec::new();
        for predicate in predicates {
            match predicate {
                Predicate::True => {}
                Predicate::And(inner) => terms.extend(inner),
                other => terms.push(other),
            }
        }
        match terms.len() {
            0 => Predicate::True,
            1 => terms.remove(0),
            _ => Predicate::And(terms),
        }
    }

    /// Check whether the predicate contains a raw fragment anywhere.
    pub fn has_raw(&self) -> bool {
        match self {
            Predicate::Raw { .. } => true,
            Predicate::And(terms) => terms.iter().any(Predicate::has_raw),
            _ => false,
        }
    }

    /// Evaluate against an in-memory row.
    ///
    /// Returns `None` when the predicate contains a raw fragment.
    pub fn evaluate(&self, row: &Row) -> Option<bool> {
        let matched = match self {
            Predicate::True => true,
            Predicate::Eq { column, value } => {
                let actual = row.get(column);
                if value.is_null() {
                    actual.is_null()
                } else {
                    compare_values(actual, value) == Some(Ordering::Equal)
                }
            }
            Predicate::NotEq { column, value } => {
                let actual = row.get(column);
                if value.is_null() {
                    !actual.is_null()
                } else {
                    matches!(
                        compare_values(actual, value),
                        Some(Ordering::Less | Ordering::Greater)
                    )
                }
            }
            Predicate::Compare { column, op, value } => {
                compare_values(row.get(column), value).is_some_and(|o| op.accepts(o))
            }
            Predicate::IsNull(column) => row.get(column).is_null(),
            Predicate::IsNotNull(column) => !row.get(column).is_null(),
            Predicate::And(terms) => {
                for term in terms {
                    if !term.evaluate(row)? {
                        return Some(false);
                    }
                }
                true
            }
            Predicate::Raw { .. } => return None,
        };
        Some(matched)
    }
}

/// SQL-style comparison: `None` when either side is null or the kinds differ.
fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
        (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}
