//! SQL hosts for ordered lists.
//!
//! The rows live in the caller's own tables; this backend only renders the
//! bulk shifts and lookups the engine asks for and runs them inside a
//! database transaction.
//!
//! ## Available Backends
//!
//! - **SQLite** (feature: `sqlite`): Embedded database
//! - **PostgreSQL** (feature: `postgres`): PostgreSQL database
//!
//! ## Architecture
//!
//! Statements are rendered once with `$n` placeholders, which both drivers
//! accept, and run on the database's own typed pool so every column is
//! decoded by its native driver. No schema is created: the list table and
//! its position column must already exist.

mod render;
mod transaction;

use std::any::Any;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::Executor;

use crate::Result;
use crate::backend::errors::BackendError;
use crate::backend::{BackendImpl, Transaction};
use transaction::SqlxTransaction;

/// Extension trait for sqlx Result types to simplify error handling.
///
/// Similar to `anyhow::Context`, this trait adds a method to convert
/// sqlx errors to `BackendError::SqlxError` with a context message.
pub(crate) trait SqlxResultExt<T> {
    /// Convert sqlx error to BackendError with context message.
    fn sql_context(self, context: &str) -> Result<T>;
}

impl<T> SqlxResultExt<T> for std::result::Result<T, sqlx::Error> {
    fn sql_context(self, context: &str) -> Result<T> {
        self.map_err(|e| {
            BackendError::SqlxError {
                reason: format!("{context}: {e}"),
                source: Some(e),
            }
            .into()
        })
    }
}

#[derive(Debug, Clone)]
enum SqlPool {
    #[cfg(feature = "sqlite")]
    Sqlite(sqlx::SqlitePool),
    #[cfg(feature = "postgres")]
    Postgres(sqlx::PgPool),
}

/// SQL-based backend implementing `BackendImpl` using sqlx.
///
/// # Test Isolation
///
/// For PostgreSQL, each backend instance can use its own schema for test isolation.
/// Use `connect_postgres_isolated()` to create an isolated backend for testing.
#[derive(Debug, Clone)]
pub struct SqlxBackend {
    pool: SqlPool,
}

impl SqlxBackend {
    /// Run a statement outside any list transaction, e.g. DDL.
    pub async fn execute_raw(&self, sql: &str) -> Result<u64> {
        let affected = match &self.pool {
            #[cfg(feature = "sqlite")]
            SqlPool::Sqlite(pool) => pool.execute(sql).await.map(|done| done.rows_affected()),
            #[cfg(feature = "postgres")]
            SqlPool::Postgres(pool) => pool.execute(sql).await.map(|done| done.rows_affected()),
        };
        affected.sql_context("Failed to execute statement")
    }

    /// Close every pooled connection, waiting for open transactions to finish.
    pub async fn close(&self) {
        match &self.pool {
            #[cfg(feature = "sqlite")]
            SqlPool::Sqlite(pool) => pool.close().await,
            #[cfg(feature = "postgres")]
            SqlPool::Postgres(pool) => pool.close().await,
        }
    }
}

#[cfg(feature = "sqlite")]
impl SqlxBackend {
    /// Open a SQLite database at the given path, creating the file if needed.
    ///
    /// ```ignore
    /// use slotlist::backend::database::SqlxBackend;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let backend = SqlxBackend::open_sqlite("lists.db").await.unwrap();
    /// }
    /// ```
    pub async fn open_sqlite<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        // mode=rwc: read-write-create
        let url = format!("sqlite:{}?mode=rwc", path.as_ref().display());
        Self::connect_sqlite(&url).await
    }

    /// Connect to a SQLite database using a connection URL.
    ///
    /// # Arguments
    ///
    /// * `url` - SQLite connection URL (e.g., "sqlite:./lists.db")
    pub async fn connect_sqlite(url: &str) -> Result<Self> {
        use std::str::FromStr;

        use sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };

        let is_in_memory = url.contains("mode=memory");
        let mut options = SqliteConnectOptions::from_str(url)
            .sql_context("Invalid SQLite URL")?
            .busy_timeout(Duration::from_secs(5));
        if !is_in_memory {
            options = options
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal);
        }

        // A shared-cache in-memory database vanishes with its last connection,
        // so keep one open for the life of the pool.
        let pool_options = if is_in_memory {
            SqlitePoolOptions::new()
                .max_connections(5)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = pool_options
            .connect_with(options)
            .await
            .sql_context("Failed to connect to SQLite")?;

        tracing::debug!(url, "Connected to SQLite");
        Ok(Self {
            pool: SqlPool::Sqlite(pool),
        })
    }

    /// Create a private in-memory SQLite database.
    ///
    /// Each call gets its own database, which lives as long as the backend.
    pub async fn sqlite_in_memory() -> Result<Self> {
        let unique_id = uuid::Uuid::new_v4();
        let url = format!("sqlite:file:mem_{unique_id}?mode=memory&cache=shared");
        Self::connect_sqlite(&url).await
    }
}

#[cfg(feature = "postgres")]
impl SqlxBackend {
    /// Connect to a PostgreSQL database using a connection URL.
    ///
    /// This connects to the default search path. For test isolation,
    /// use `connect_postgres_isolated()` instead.
    pub async fn connect_postgres(url: &str) -> Result<Self> {
        Self::connect_postgres_with_schema(url, None).await
    }

    async fn connect_postgres_with_schema(url: &str, schema_name: Option<String>) -> Result<Self> {
        use sqlx::postgres::PgPoolOptions;

        if let Some(ref schema) = schema_name {
            let temp_pool = PgPoolOptions::new()
                .max_connections(1)
                .connect(url)
                .await
                .sql_context("Failed to connect to PostgreSQL")?;

            let create_schema = format!("CREATE SCHEMA IF NOT EXISTS {schema}");
            sqlx::query(&create_schema)
                .execute(&temp_pool)
                .await
                .sql_context(&format!("Failed to create schema {schema}"))?;

            temp_pool.close().await;
        }

        // every pooled connection gets the isolated search_path
        let schema_for_hook = schema_name.clone();
        let pool_options = if schema_name.is_some() {
            PgPoolOptions::new()
                .max_connections(2)
                .acquire_timeout(Duration::from_secs(30))
        } else {
            PgPoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .after_connect(move |conn, _meta| {
                let schema = schema_for_hook.clone();
                Box::pin(async move {
                    if let Some(ref s) = schema {
                        let set_path = format!("SET search_path TO {s}");
                        conn.execute(set_path.as_str()).await?;
                    }
                    Ok(())
                })
            })
            .connect(url)
            .await
            .sql_context("Failed to connect to PostgreSQL")?;

        tracing::debug!(schema = ?schema_name, "Connected to PostgreSQL");
        Ok(Self {
            pool: SqlPool::Postgres(pool),
        })
    }

    /// Connect to PostgreSQL inside a fresh, uniquely named schema.
    pub async fn connect_postgres_isolated(url: &str) -> Result<Self> {
        // schema names must start with a letter
        let unique_id = uuid::Uuid::new_v4().simple().to_string();
        let schema_name = format!("test_{unique_id}");
        Self::connect_postgres_with_schema(url, Some(schema_name)).await
    }
}

#[async_trait]
impl BackendImpl for SqlxBackend {
    async fn begin(&self) -> Result<Box<dyn Transaction>> {
        let tx = match &self.pool {
            #[cfg(feature = "sqlite")]
            SqlPool::Sqlite(pool) => pool.begin().await.map(SqlxTransaction::Sqlite),
            #[cfg(feature = "postgres")]
            SqlPool::Postgres(pool) => pool.begin().await.map(SqlxTransaction::Postgres),
        };
        Ok(Box::new(tx.sql_context("Failed to begin transaction")?))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(feature = "sqlite")]
/// Convenience type alias for SQLite backend using sqlx.
pub type Sqlite = SqlxBackend;

#[cfg(feature = "postgres")]
/// Convenience type alias for PostgreSQL backend using sqlx.
pub type Postgres = SqlxBackend;
