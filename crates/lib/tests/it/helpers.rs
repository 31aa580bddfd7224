use slotlist::{
    AddNewAt, ListConfig, OrderedList, Row, Value,
    backend::{Backend, database::InMemory},
    config::ListConfigBuilder,
};

// Re-export tokio test macro for convenience
pub use tokio;

/// Table every test list lives in.
pub const TABLE: &str = "items";

/// Schema of [`TABLE`] for the SQL hosts.
#[cfg(any(feature = "sqlite", feature = "postgres"))]
pub fn items_ddl(postgres: bool) -> String {
    let id = if postgres {
        "id BIGSERIAL PRIMARY KEY"
    } else {
        "id INTEGER PRIMARY KEY"
    };
    format!(
        "CREATE TABLE {TABLE} ({id}, list_id BIGINT, owner TEXT, label TEXT, archived BOOLEAN, slot BIGINT)"
    )
}

/// Creates a test backend based on TEST_BACKEND env var.
///
/// Supported values:
/// - "inmemory" or unset: InMemory backend (default)
/// - "sqlite": SQLite in-memory backend (requires `sqlite` feature)
/// - "postgres": PostgreSQL backend (requires `postgres` feature and TEST_POSTGRES_URL)
///
/// SQL backends get a fresh `items` table.
///
/// ```bash
/// TEST_BACKEND=sqlite cargo test --features sqlite
///
/// TEST_BACKEND=postgres TEST_POSTGRES_URL="postgres://localhost/slotlist_test" \
///   cargo test --features postgres
/// ```
pub async fn test_backend() -> Backend {
    match std::env::var("TEST_BACKEND").as_deref() {
        Ok("sqlite") => {
            #[cfg(feature = "sqlite")]
            {
                Backend::new(sqlite_backend().await)
            }
            #[cfg(not(feature = "sqlite"))]
            {
                panic!("TEST_BACKEND=sqlite requires the 'sqlite' feature to be enabled")
            }
        }
        Ok("postgres") => {
            #[cfg(feature = "postgres")]
            {
                use slotlist::backend::database::Postgres;
                let url = std::env::var("TEST_POSTGRES_URL")
                    .unwrap_or_else(|_| "postgres://localhost/slotlist_test".to_string());
                let backend = Postgres::connect_postgres_isolated(&url)
                    .await
                    .expect("Failed to connect to PostgreSQL");
                backend
                    .execute_raw(&items_ddl(true))
                    .await
                    .expect("Failed to create items table");
                Backend::new(backend)
            }
            #[cfg(not(feature = "postgres"))]
            {
                panic!("TEST_BACKEND=postgres requires the 'postgres' feature to be enabled")
            }
        }
        Ok("inmemory") | Ok("") | Err(_) => Backend::new(InMemory::new()),
        Ok(other) => {
            panic!("Unknown TEST_BACKEND value: {other}. Supported: inmemory, sqlite, postgres")
        }
    }
}

/// A private in-memory SQLite database holding an empty `items` table.
#[cfg(feature = "sqlite")]
pub async fn sqlite_backend() -> slotlist::backend::database::Sqlite {
    let backend = slotlist::backend::database::Sqlite::sqlite_in_memory()
        .await
        .expect("Failed to create SQLite backend");
    backend
        .execute_raw(&items_ddl(false))
        .await
        .expect("Failed to create items table");
    backend
}

/// Builder for a list over `items` scoped by `list_id`.
pub fn items_config() -> ListConfigBuilder {
    ListConfig::builder(TABLE).scope_column("list_id")
}

/// A bottom-appending list scoped by `list_id` on the TEST_BACKEND host.
pub async fn test_list() -> OrderedList {
    test_list_with(items_config()).await
}

pub async fn test_list_with(config: ListConfigBuilder) -> OrderedList {
    let config = config.build().expect("valid test config");
    OrderedList::new(config, test_backend().await)
}

pub async fn top_list() -> OrderedList {
    test_list_with(items_config().add_new_at(AddNewAt::Top)).await
}

/// Create `count` rows in list `list_id`, returned in creation order.
pub async fn seed(list: &OrderedList, list_id: i64, count: usize) -> Vec<Row> {
    let mut rows = Vec::with_capacity(count);
    for i in 0..count {
        let row = Row::new()
            .with("list_id", list_id)
            .with("label", format!("item-{i}"));
        rows.push(list.create(row).await.expect("create row"));
    }
    rows
}

/// Create one row per label in list `list_id`, returned in creation order.
pub async fn named(list: &OrderedList, list_id: i64, labels: &[&str]) -> Vec<Row> {
    let mut rows = Vec::with_capacity(labels.len());
    for label in labels {
        let row = Row::new().with("list_id", list_id).with("label", *label);
        rows.push(list.create(row).await.expect("create row"));
    }
    rows
}

/// Current stored position of `row`.
pub async fn slot_of(list: &OrderedList, row: &Row) -> Option<i64> {
    list.reload(row)
        .await
        .expect("reload row")
        .get(list.config().column())
        .as_integer()
}

/// Stored positions of `rows`, in the order given.
pub async fn slots(list: &OrderedList, rows: &[Row]) -> Vec<Option<i64>> {
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        out.push(slot_of(list, row).await);
    }
    out
}

/// Labels of the listed rows of `list_id`, top first.
pub async fn order(list: &OrderedList, list_id: i64) -> Vec<String> {
    let key = Row::new().with("list_id", list_id);
    list.peers(&key)
        .await
        .expect("list peers")
        .iter()
        .map(|row| match row.get("label") {
            Value::Text(label) => label.clone(),
            other => other.to_string(),
        })
        .collect()
}

pub async fn assert_contiguous(list: &OrderedList, list_id: i64) {
    let key = Row::new().with("list_id", list_id);
    let report = list.check_contiguity(&key).await.expect("check contiguity");
    assert!(
        report.is_contiguous(),
        "list {list_id} is not contiguous: {report:?}"
    );
}
