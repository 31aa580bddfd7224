use slotlist::{Predicate, Row, Value};

use crate::helpers::*;

#[tokio::test]
async fn test_operations_stay_inside_their_scope() {
    let list = test_list().await;
    let mut first = named(&list, 1, &["A", "B", "C"]).await;
    let second = named(&list, 2, &["X", "Y", "Z"]).await;

    list.move_to_top(&mut first[2]).await.unwrap();
    list.remove_from_list(&mut first[0]).await.unwrap();
    list.insert_at(&mut first[0], 2).await.unwrap();

    assert_eq!(order(&list, 1).await, ["C", "A", "B"]);
    assert_eq!(order(&list, 2).await, ["X", "Y", "Z"]);
    assert_eq!(
        slots(&list, &second).await,
        vec![Some(1), Some(2), Some(3)]
    );
}

#[tokio::test]
async fn test_unlisted_peers_are_never_renumbered() {
    let list = test_list().await;
    let mut rows = named(&list, 1, &["A", "B", "C"]).await;
    list.remove_from_list(&mut rows[0]).await.unwrap();

    list.move_to_top(&mut rows[2]).await.unwrap();
    list.move_to_bottom(&mut rows[2]).await.unwrap();
    assert_eq!(slot_of(&list, &rows[0]).await, None);
    assert_eq!(order(&list, 1).await, ["B", "C"]);
}

#[tokio::test]
async fn test_composite_scope() {
    let list =
        test_list_with(slotlist::ListConfig::builder(TABLE).scope_columns(["list_id", "owner"]))
            .await;
    let mut ann = Vec::new();
    let mut bob = Vec::new();
    for label in ["A", "B"] {
        ann.push(
            list.create(
                Row::new()
                    .with("list_id", 1)
                    .with("owner", "ann")
                    .with("label", label),
            )
            .await
            .unwrap(),
        );
        bob.push(
            list.create(
                Row::new()
                    .with("list_id", 1)
                    .with("owner", "bob")
                    .with("label", label),
            )
            .await
            .unwrap(),
        );
    }
    assert_eq!(slots(&list, &ann).await, vec![Some(1), Some(2)]);
    assert_eq!(slots(&list, &bob).await, vec![Some(1), Some(2)]);

    list.move_higher(&mut ann[1]).await.unwrap();
    assert_eq!(slots(&list, &ann).await, vec![Some(2), Some(1)]);
    assert_eq!(slots(&list, &bob).await, vec![Some(1), Some(2)]);
}

#[tokio::test]
async fn test_null_scope_key_forms_its_own_list() {
    let list = test_list().await;
    let keyed = named(&list, 1, &["A"]).await;
    let mut orphans = Vec::new();
    for label in ["P", "Q"] {
        orphans.push(
            list.create(
                Row::new()
                    .with("list_id", Value::Null)
                    .with("label", label),
            )
            .await
            .unwrap(),
        );
    }
    assert_eq!(slots(&list, &orphans).await, vec![Some(1), Some(2)]);

    list.move_to_top(&mut orphans[1]).await.unwrap();
    assert_eq!(slots(&list, &orphans).await, vec![Some(2), Some(1)]);
    assert_eq!(slot_of(&list, &keyed[0]).await, Some(1));
}

#[tokio::test]
async fn test_global_scope_spans_the_table() {
    let list = test_list_with(slotlist::ListConfig::builder(TABLE)).await;
    let mut rows = named(&list, 1, &["A"]).await;
    rows.extend(named(&list, 2, &["B"]).await);
    assert_eq!(slots(&list, &rows).await, vec![Some(1), Some(2)]);

    list.move_higher(&mut rows[1]).await.unwrap();
    assert_eq!(slots(&list, &rows).await, vec![Some(2), Some(1)]);
}

#[tokio::test]
async fn test_custom_scope() {
    let list = test_list_with(slotlist::ListConfig::builder(TABLE).custom_scope(|row: &Row| {
        Ok(Predicate::eq("owner", row.get("owner").clone()).and(Predicate::ge("list_id", 10)))
    }))
    .await;
    let mut rows = Vec::new();
    for (list_id, label) in [(10, "A"), (11, "B"), (12, "C")] {
        rows.push(
            list.create(
                Row::new()
                    .with("list_id", list_id)
                    .with("owner", "ann")
                    .with("label", label),
            )
            .await
            .unwrap(),
        );
    }
    assert_eq!(slots(&list, &rows).await, vec![Some(1), Some(2), Some(3)]);

    list.move_to_bottom(&mut rows[0]).await.unwrap();
    assert_eq!(slots(&list, &rows).await, vec![Some(3), Some(1), Some(2)]);
}
