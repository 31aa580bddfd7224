//! Scope specifications and peer resolution.
//!
//! A scope decides which rows share an ordering with a given row. Scopes are
//! never stored; [`ScopeResolver::peers_of`] recomputes the peer predicate from
//! the row's current attribute values on every call, so a resolver always sees
//! the latest state even in the middle of an operation.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use crate::Result;
use crate::predicate::Predicate;
use crate::row::Row;

type ScopeFn = dyn Fn(&Row) -> Result<Predicate> + Send + Sync;

/// A custom scope: any function from a row to the predicate matching its peers.
#[derive(Clone)]
pub struct CustomScope(Arc<ScopeFn>);

impl CustomScope {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Row) -> Result<Predicate> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    fn resolve(&self, row: &Row) -> Result<Predicate> {
        (self.0)(row)
    }
}

impl fmt::Debug for CustomScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomScope(..)")
    }
}

/// How peers are selected.
///
/// Deserializes from `null` (global), a string (one key column) or an array
/// of strings (composite key). Custom scopes can only be built in code.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(untagged)]
pub enum ScopeSpec {
    /// The whole table is one list.
    #[default]
    Global,
    /// Rows sharing the value of one column, typically a parent foreign key.
    Column(String),
    /// Rows sharing the values of every listed column.
    Columns(Vec<String>),
    /// Rows matched by a caller-supplied predicate.
    #[serde(skip_deserializing)]
    Custom(CustomScope),
}

impl ScopeSpec {
    /// Build a custom scope from a closure.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&Row) -> Result<Predicate> + Send + Sync + 'static,
    {
        ScopeSpec::Custom(CustomScope::new(f))
    }

    /// The key columns this scope compares, empty for global and custom scopes.
    pub fn key_columns(&self) -> &[String] {
        match self {
            ScopeSpec::Column(column) => std::slice::from_ref(column),
            ScopeSpec::Columns(columns) => columns,
            ScopeSpec::Global | ScopeSpec::Custom(_) => &[],
        }
    }
}

/// Turns a [`ScopeSpec`] into peer predicates for concrete rows.
#[derive(Debug, Clone)]
pub struct ScopeResolver {
    spec: ScopeSpec,
}

impl ScopeResolver {
    pub fn new(spec: ScopeSpec) -> Self {
        Self { spec }
    }

    /// The predicate selecting every row in `row`'s scope, `row` included.
    ///
    /// A null key value matches peers whose key is also null.
    pub fn peers_of(&self, row: &Row) -> Result<Predicate> {
        let predicate = match &self.spec {
            ScopeSpec::Global => Predicate::True,
            ScopeSpec::Column(column) => Predicate::eq(column, row.get(column).clone()),
            ScopeSpec::Columns(columns) => Predicate::all(
                columns
                    .iter()
                    .map(|column| Predicate::eq(column, row.get(column).clone())),
            ),
            ScopeSpec::Custom(custom) => custom.resolve(row)?,
        };
        tracing::trace!(?predicate, "Resolved scope");
        Ok(predicate)
    }
}
