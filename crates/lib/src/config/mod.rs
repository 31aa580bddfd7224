//! List configuration.
//!
//! A [`ListConfig`] is supplied once per entity type and is immutable after it
//! has been built and validated. Table and column names are the only text the
//! SQL host ever interpolates into statements, so they are checked here
//! against a strict identifier grammar.

mod errors;

use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

pub use errors::ConfigError;

use crate::Result;
use crate::predicate::Predicate;
use crate::row::Row;
use crate::scope::ScopeSpec;

/// Default name of the position column.
pub const DEFAULT_COLUMN: &str = "slot";
/// Default name of the identity column.
pub const DEFAULT_PRIMARY_KEY: &str = "id";
/// Default top-of-list position.
pub const DEFAULT_TOP_OF_LIST: i64 = 1;

/// Where rows created without an explicit position are placed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddNewAt {
    Top,
    #[default]
    Bottom,
}

impl FromStr for AddNewAt {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "top" => Ok(AddNewAt::Top),
            "bottom" => Ok(AddNewAt::Bottom),
            other => Err(format!("expected 'top' or 'bottom', got '{other}'")),
        }
    }
}

fn default_primary_key() -> String {
    DEFAULT_PRIMARY_KEY.to_string()
}

fn default_column() -> String {
    DEFAULT_COLUMN.to_string()
}

fn default_top_of_list() -> i64 {
    DEFAULT_TOP_OF_LIST
}

/// Immutable configuration of one ordered entity type.
///
/// ```
/// use slotlist::{AddNewAt, ListConfig};
///
/// let config = ListConfig::builder("todo_items")
///     .scope_column("todo_list_id")
///     .add_new_at(AddNewAt::Top)
///     .build()
///     .unwrap();
/// assert_eq!(config.column(), "slot");
/// assert_eq!(config.top_of_list(), 1);
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListConfig {
    table: String,
    #[serde(default = "default_primary_key")]
    primary_key: String,
    #[serde(default = "default_column")]
    column: String,
    #[serde(default)]
    scope: ScopeSpec,
    #[serde(default = "default_top_of_list", alias = "top")]
    top_of_list: i64,
    #[serde(default)]
    add_new_at: AddNewAt,
}

impl ListConfig {
    /// Start building a configuration for `table`.
    pub fn builder(table: impl Into<String>) -> ListConfigBuilder {
        ListConfigBuilder {
            config: ListConfig {
                table: table.into(),
                primary_key: default_primary_key(),
                column: default_column(),
                scope: ScopeSpec::Global,
                top_of_list: DEFAULT_TOP_OF_LIST,
                add_new_at: AddNewAt::Bottom,
            },
        }
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ListConfig =
            serde_json::from_str(json).map_err(|source| ConfigError::Parse { source })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = tokio::fs::read_to_string(path).await?;
        Self::from_json(&json)
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    /// The position column.
    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn scope(&self) -> &ScopeSpec {
        &self.scope
    }

    pub fn top_of_list(&self) -> i64 {
        self.top_of_list
    }

    pub fn add_new_at(&self) -> AddNewAt {
        self.add_new_at
    }

    /// Predicate matching exactly the row with `row`'s identity.
    pub fn identity_of(&self, row: &Row) -> Predicate {
        Predicate::eq(&self.primary_key, row.get(&self.primary_key).clone())
    }

    fn validate(&self) -> Result<()> {
        validate_table(&self.table)?;
        validate_identifier("primary key", &self.primary_key)?;
        validate_identifier("column", &self.column)?;
        if self.column == self.primary_key {
            return Err(ConfigError::ColumnConflict {
                column: self.column.clone(),
                role: "the primary key",
            }
            .into());
        }
        if let ScopeSpec::Columns(columns) = &self.scope
            && columns.is_empty()
        {
            return Err(ConfigError::EmptyScope {
                table: self.table.clone(),
            }
            .into());
        }
        for key in self.scope.key_columns() {
            validate_identifier("scope column", key)?;
            if *key == self.column {
                return Err(ConfigError::ColumnConflict {
                    column: self.column.clone(),
                    role: "a scope key",
                }
                .into());
            }
        }
        Ok(())
    }
}

/// Builder for [`ListConfig`].
#[derive(Debug, Clone)]
pub struct ListConfigBuilder {
    config: ListConfig,
}

impl ListConfigBuilder {
    pub fn primary_key(mut self, primary_key: impl Into<String>) -> Self {
        self.config.primary_key = primary_key.into();
        self
    }

    /// Name of the position column.
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.config.column = column.into();
        self
    }

    pub fn scope(mut self, scope: ScopeSpec) -> Self {
        self.config.scope = scope;
        self
    }

    /// Scope by one key column.
    pub fn scope_column(self, column: impl Into<String>) -> Self {
        self.scope(ScopeSpec::Column(column.into()))
    }

    /// Scope by several key columns.
    pub fn scope_columns<I, S>(self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scope(ScopeSpec::Columns(
            columns.into_iter().map(Into::into).collect(),
        ))
    }

    /// Scope by a custom predicate.
    pub fn custom_scope<F>(self, f: F) -> Self
    where
        F: Fn(&Row) -> Result<Predicate> + Send + Sync + 'static,
    {
        self.scope(ScopeSpec::custom(f))
    }

    pub fn top_of_list(mut self, top: i64) -> Self {
        self.config.top_of_list = top;
        self
    }

    pub fn add_new_at(mut self, add_new_at: AddNewAt) -> Self {
        self.config.add_new_at = add_new_at;
        self
    }

    /// Validate and freeze the configuration.
    pub fn build(self) -> Result<ListConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

fn validate_table(name: &str) -> Result<()> {
    // schema-qualified names are allowed, each part must be an identifier
    if name.split('.').all(is_identifier) {
        Ok(())
    } else {
        Err(ConfigError::InvalidIdentifier {
            kind: "table",
            name: name.to_string(),
        }
        .into())
    }
}

fn validate_identifier(kind: &'static str, name: &str) -> Result<()> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(ConfigError::InvalidIdentifier {
            kind,
            name: name.to_string(),
        }
        .into())
    }
}

pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
