use tempfile::TempDir;

use slotlist::{
    ListConfig, OrderedList, Predicate, Row, Value,
    backend::{Backend, database::Sqlite},
};

use crate::helpers::{TABLE, items_config, items_ddl, named, order, slots, sqlite_backend};

async fn sqlite_list(backend: Sqlite) -> OrderedList {
    OrderedList::new(items_config().build().unwrap(), Backend::new(backend))
}

#[tokio::test]
async fn test_scenario_on_sqlite() {
    let list = sqlite_list(sqlite_backend().await).await;
    let mut rows = named(&list, 1, &["A", "B", "C"]).await;

    list.move_higher(&mut rows[2]).await.unwrap();
    rows[1] = list.reload(&rows[1]).await.unwrap();
    list.move_to_top(&mut rows[1]).await.unwrap();
    assert_eq!(order(&list, 1).await, ["B", "A", "C"]);

    rows[0] = list.reload(&rows[0]).await.unwrap();
    list.remove_from_list(&mut rows[0]).await.unwrap();
    assert_eq!(slots(&list, &rows).await, vec![None, Some(1), Some(2)]);
}

#[tokio::test]
async fn test_boolean_column_is_decoded() {
    let list = sqlite_list(sqlite_backend().await).await;
    let created = list
        .create(
            Row::new()
                .with("list_id", 1)
                .with("label", "A")
                .with("archived", false),
        )
        .await
        .unwrap();
    // SQLite has no boolean storage class
    assert!(matches!(
        created.get("archived"),
        Value::Integer(0) | Value::Bool(false)
    ));

    let mut rows = vec![created];
    rows.extend(named(&list, 1, &["B"]).await);
    list.move_to_bottom(&mut rows[0]).await.unwrap();
    assert_eq!(order(&list, 1).await, ["B", "A"]);
}

#[tokio::test]
async fn test_failed_own_update_rolls_back_peer_shift() {
    let backend = sqlite_backend().await;
    backend
        .execute_raw(&format!(
            "CREATE TRIGGER locked_c BEFORE UPDATE OF slot ON {TABLE}
             WHEN OLD.label = 'C'
             BEGIN SELECT RAISE(ABORT, 'C is locked'); END"
        ))
        .await
        .unwrap();
    let list = sqlite_list(backend).await;
    let mut rows = named(&list, 1, &["A", "B", "C"]).await;

    let err = list.move_to_top(&mut rows[2]).await.unwrap_err();
    assert!(err.is_database_error());

    // A and B were shifted before the failure; the rollback undid it
    assert_eq!(slots(&list, &rows).await, vec![Some(1), Some(2), Some(3)]);
    assert_eq!(rows[2].get("slot").as_integer(), Some(3));
}

#[tokio::test]
async fn test_raw_custom_scope() {
    let config = ListConfig::builder(TABLE)
        .custom_scope(|row: &Row| {
            Ok(Predicate::raw(
                "list_id = ? AND label <> '?'",
                vec![row.get("list_id").clone()],
            ))
        })
        .build()
        .unwrap();
    let list = OrderedList::new(config, Backend::new(sqlite_backend().await));
    let mut rows = named(&list, 1, &["A", "B", "C"]).await;
    let other = named(&list, 2, &["X"]).await;

    list.move_to_bottom(&mut rows[0]).await.unwrap();
    assert_eq!(slots(&list, &rows).await, vec![Some(3), Some(1), Some(2)]);
    assert_eq!(slots(&list, &other).await, vec![Some(1)]);
}

#[tokio::test]
async fn test_hostile_attribute_name_is_rejected() {
    let list = sqlite_list(sqlite_backend().await).await;
    let err = list
        .create(Row::new().with("list_id", 1).with("slot) VALUES (1); --", 1))
        .await
        .unwrap_err();
    assert!(err.is_validation_error());
}

#[tokio::test]
async fn test_file_database_survives_reconnect() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("lists.db");

    {
        let backend = Sqlite::open_sqlite(&path).await.unwrap();
        backend.execute_raw(&items_ddl(false)).await.unwrap();
        let list = sqlite_list(backend).await;
        let mut rows = named(&list, 1, &["A", "B"]).await;
        list.move_lower(&mut rows[0]).await.unwrap();
        list.backend()
            .as_any()
            .downcast_ref::<Sqlite>()
            .unwrap()
            .close()
            .await;
    }

    let list = sqlite_list(Sqlite::open_sqlite(&path).await.unwrap()).await;
    assert_eq!(order(&list, 1).await, ["B", "A"]);
}
