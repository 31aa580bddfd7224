use slotlist::{
    ListConfig, OrderedList, Predicate, Row,
    backend::{Backend, BackendImpl, database::InMemory},
};

#[tokio::test]
async fn test_uncommitted_transaction_is_discarded() {
    let backend = InMemory::new();
    {
        let mut tx = backend.begin().await.unwrap();
        tx.insert("items", "id", &Row::new().with("slot", 1))
            .await
            .unwrap();
        // dropped without commit
    }
    assert!(backend.rows("items").await.is_empty());

    let mut tx = backend.begin().await.unwrap();
    let stored = tx
        .insert("items", "id", &Row::new().with("slot", 1))
        .await
        .unwrap();
    tx.commit().await.unwrap();
    assert_eq!(stored.get("id").as_integer(), Some(1));
    assert_eq!(backend.rows("items").await.len(), 1);
}

#[tokio::test]
async fn test_duplicate_identity_is_a_conflict() {
    let backend = InMemory::new();
    let mut tx = backend.begin().await.unwrap();
    let row = Row::new().with("id", 5).with("slot", 1);
    tx.insert("items", "id", &row).await.unwrap();
    let err = tx.insert("items", "id", &row).await.unwrap_err();
    assert!(err.is_database_error());
    assert!(matches!(
        err,
        slotlist::Error::Backend(ref e) if e.is_conflict()
    ));
}

#[tokio::test]
async fn test_raw_scope_needs_a_sql_host() {
    let config = ListConfig::builder("items")
        .custom_scope(|row: &Row| {
            Ok(Predicate::raw(
                "list_id = ?",
                vec![row.get("list_id").clone()],
            ))
        })
        .build()
        .unwrap();
    let backend = InMemory::new();
    let list = OrderedList::new(config, Backend::new(backend));

    let err = list
        .create(Row::new().with("list_id", 1))
        .await
        .unwrap_err();
    assert!(err.is_validation_error());

    let backend = list.backend().as_any().downcast_ref::<InMemory>().unwrap();
    assert!(backend.table_names().await.is_empty());
}
