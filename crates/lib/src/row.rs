//! Rows and attribute values.
//!
//! A [`Row`] is the library's view of one entity instance: a map from column
//! name to [`Value`]. The identity, scope keys and position of a row are not
//! special fields, they are read through the column names configured in
//! [`ListConfig`](crate::ListConfig).
//!
//! A row also remembers which attributes were set since it was read from the
//! store, so an update writes only what the caller actually changed.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

static NULL: Value = Value::Null;

/// A single attribute value.
///
/// Only the kinds that make sense as identities, scope keys or positions are
/// modelled. Serialized untagged so JSON files read naturally.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Text(String),
}

impl Value {
    /// Check whether this is SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The integer payload, if this is an integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// The text payload, if this is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Parse a command-line style identity: integers become `Integer`,
    /// anything else is kept as `Text`.
    pub fn parse_identity(raw: &str) -> Self {
        match raw.parse::<i64>() {
            Ok(i) => Value::Integer(i),
            Err(_) => Value::Text(raw.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value.into())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// An entity instance as a map of column name to value.
///
/// Missing attributes read as [`Value::Null`]. Equality compares attributes
/// only, not which of them are marked changed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    attributes: BTreeMap<String, Value>,
    #[serde(skip)]
    changed: BTreeSet<String>,
}

impl Row {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(column, value);
        self
    }

    /// Read an attribute, `Null` when absent.
    pub fn get(&self, column: &str) -> &Value {
        self.attributes.get(column).unwrap_or(&NULL)
    }

    /// Read an attribute only if the row actually carries it.
    pub fn attribute(&self, column: &str) -> Option<&Value> {
        self.attributes.get(column)
    }

    /// Set an attribute, replacing any previous value, and mark it changed.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        self.changed.insert(column.clone());
        self.attributes.insert(column, value.into());
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove(&mut self, column: &str) -> Option<Value> {
        self.changed.remove(column);
        self.attributes.remove(column)
    }

    /// Iterate over `(column, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.attributes.iter()
    }

    /// Column names carried by this row.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Whether `column` was set since the row was read or last saved.
    pub fn is_changed(&self, column: &str) -> bool {
        self.changed.contains(column)
    }

    /// Columns set since the row was read or last saved.
    pub fn changed_columns(&self) -> impl Iterator<Item = &str> {
        self.changed.iter().map(String::as_str)
    }

    /// Only the changed attributes.
    pub fn changes(&self) -> Row {
        self.changed
            .iter()
            .filter_map(|column| Some((column.clone(), self.attributes.get(column)?.clone())))
            .collect()
    }

    /// Forget the change mark on one column.
    pub fn clear_change(&mut self, column: &str) {
        self.changed.remove(column);
    }

    /// Mark the row as matching the store.
    pub fn clear_changes(&mut self) {
        self.changed.clear();
    }

    /// The same attributes with no change marks, as a host returns them.
    pub fn saved(mut self) -> Self {
        self.clear_changes();
        self
    }
}

impl PartialEq for Row {
    fn eq(&self, other: &Self) -> bool {
        self.attributes == other.attributes
    }
}

impl Eq for Row {}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (column, value) in iter {
            row.set(column, value);
        }
        row
    }
}
