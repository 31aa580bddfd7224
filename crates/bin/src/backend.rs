//! Backend and list construction from command-line arguments.

use std::path::PathBuf;

use slotlist::{
    ListConfig, OrderedList, Row, Value,
    backend::{
        Backend,
        database::{InMemory, Postgres, Sqlite},
    },
};

use crate::cli::{self, BackendArgs, ListArgs};

const SQLITE_FILE: &str = "slotlist.db";
const JSON_FILE: &str = "slotlist.json";

/// Redact credentials from a PostgreSQL connection URL for safe logging
pub fn redact_postgres_url(url: &str) -> String {
    if let Ok(parsed) = url::Url::parse(url) {
        let mut redacted = parsed.clone();
        if !parsed.username().is_empty() {
            let _ = redacted.set_username("***");
        }
        if parsed.password().is_some() {
            let _ = redacted.set_password(Some("***"));
        }
        redacted.to_string()
    } else {
        "postgres://***@<unparsable-url>".to_string()
    }
}

/// Short description of the configured backend for display
pub fn backend_label(args: &BackendArgs) -> String {
    match args.backend {
        cli::Backend::Sqlite => format!("sqlite ({})", sqlite_path(args).display()),
        cli::Backend::Postgres => match &args.postgres_url {
            Some(url) => format!("postgres ({})", redact_postgres_url(url)),
            None => "postgres".to_string(),
        },
        cli::Backend::Inmemory => format!("inmemory ({})", json_path(args).display()),
    }
}

fn sqlite_path(args: &BackendArgs) -> PathBuf {
    args.data.clone().unwrap_or_else(|| PathBuf::from(SQLITE_FILE))
}

fn json_path(args: &BackendArgs) -> PathBuf {
    args.data.clone().unwrap_or_else(|| PathBuf::from(JSON_FILE))
}

/// Create the appropriate backend based on configuration
pub async fn create_backend(args: &BackendArgs) -> Result<Backend, Box<dyn std::error::Error>> {
    match args.backend {
        cli::Backend::Sqlite => {
            let db_path = sqlite_path(args);
            tracing::info!("Using SQLite backend at {}", db_path.display());
            Ok(Backend::new(Sqlite::open_sqlite(&db_path).await?))
        }
        cli::Backend::Postgres => {
            let url = args
                .postgres_url
                .as_ref()
                .ok_or("PostgreSQL backend requires --postgres-url or SLOTLIST_POSTGRES_URL")?;

            let display_url = redact_postgres_url(url);
            tracing::info!("Connecting to PostgreSQL backend at {}", display_url);

            match Postgres::connect_postgres(url).await {
                Ok(backend) => {
                    tracing::info!("Connected to PostgreSQL successfully");
                    Ok(Backend::new(backend))
                }
                Err(e) => {
                    Err(format!("Failed to connect to PostgreSQL at {}: {}", display_url, e).into())
                }
            }
        }
        cli::Backend::Inmemory => {
            let json_path = json_path(args);
            tracing::info!(
                "Using in-memory backend with persistence at {}",
                json_path.display()
            );
            Ok(Backend::new(InMemory::load_from_file(&json_path).await?))
        }
    }
}

/// Write in-memory tables back to their JSON file. SQL backends commit as
/// they go, so this is a no-op for them.
pub async fn persist(
    args: &BackendArgs,
    backend: &Backend,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(in_memory) = backend.as_any().downcast_ref::<InMemory>() {
        let path = json_path(args);
        in_memory.save_to_file(&path).await?;
        tracing::info!("Saved in-memory tables to {}", path.display());
    }
    Ok(())
}

/// Build the list configuration from a JSON file or from individual flags
pub async fn list_config(args: &ListArgs) -> Result<ListConfig, Box<dyn std::error::Error>> {
    if let Some(path) = &args.config {
        return Ok(ListConfig::load(path).await?);
    }
    let table = args
        .table
        .as_ref()
        .ok_or("either --config or --table is required")?;
    let mut builder = ListConfig::builder(table)
        .primary_key(&args.primary_key)
        .column(&args.column)
        .top_of_list(args.top)
        .add_new_at(args.add_new_at);
    builder = match args.scope.as_slice() {
        [] => builder,
        [column] => builder.scope_column(column),
        columns => builder.scope_columns(columns),
    };
    Ok(builder.build()?)
}

/// Open the list and fetch the row with the given identity
pub async fn open_row(
    backend: &BackendArgs,
    list: &ListArgs,
    id: &str,
) -> Result<(OrderedList, Row), Box<dyn std::error::Error>> {
    let config = list_config(list).await?;
    let key = Row::new().with(config.primary_key(), Value::parse_identity(id));
    let list = OrderedList::new(config, create_backend(backend).await?);
    let row = list.reload(&key).await?;
    Ok((list, row))
}
