use slotlist::Value;

use crate::helpers::*;

#[tokio::test]
async fn test_direct_position_change_is_reconciled() {
    let list = test_list().await;
    let mut rows = named(&list, 1, &["A", "B", "C", "D"]).await;

    rows[0].set("slot", 3);
    list.update(&mut rows[0]).await.unwrap();
    assert_eq!(order(&list, 1).await, ["B", "C", "A", "D"]);
    assert_contiguous(&list, 1).await;

    rows[3].set("slot", 1);
    list.update(&mut rows[3]).await.unwrap();
    assert_eq!(order(&list, 1).await, ["D", "B", "C", "A"]);
    assert_contiguous(&list, 1).await;
}

#[tokio::test]
async fn test_update_without_position_change_leaves_peers() {
    let list = test_list().await;
    let mut rows = named(&list, 1, &["A", "B"]).await;

    rows[1].set("label", "B2");
    list.update(&mut rows[1]).await.unwrap();
    assert_eq!(order(&list, 1).await, ["A", "B2"]);
}

#[tokio::test]
async fn test_clearing_position_closes_the_gap() {
    let list = test_list().await;
    let mut rows = named(&list, 1, &["A", "B", "C"]).await;

    rows[0].set("slot", Value::Null);
    list.update(&mut rows[0]).await.unwrap();
    assert_eq!(slots(&list, &rows).await, vec![None, Some(1), Some(2)]);
}

#[tokio::test]
async fn test_setting_position_on_unlisted_row_opens_a_slot() {
    let list = test_list().await;
    let mut rows = named(&list, 1, &["A", "B", "C"]).await;
    list.remove_from_list(&mut rows[2]).await.unwrap();

    rows[2].set("slot", 1);
    list.update(&mut rows[2]).await.unwrap();
    assert_eq!(order(&list, 1).await, ["C", "A", "B"]);
    assert_contiguous(&list, 1).await;
}

#[tokio::test]
async fn test_update_of_missing_row_fails() {
    let list = test_list().await;
    let mut rows = named(&list, 1, &["A"]).await;
    let mut ghost = rows[0].clone();
    list.destroy(&mut rows[0]).await.unwrap();

    ghost.set("slot", 4);
    let err = list.update(&mut ghost).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_attribute_edit_on_stale_copy_keeps_order() {
    let list = test_list().await;
    let mut rows = named(&list, 1, &["A", "B", "C"]).await;

    // C moves to the top through another copy; rows[0] still says 1
    let mut fresh_c = rows[2].clone();
    list.move_to_top(&mut fresh_c).await.unwrap();
    assert_eq!(rows[0].get("slot").as_integer(), Some(1));

    rows[0].set("label", "A2");
    list.update(&mut rows[0]).await.unwrap();
    assert_eq!(order(&list, 1).await, ["C", "A2", "B"]);
    assert_eq!(rows[0].get("slot").as_integer(), Some(2));
    assert!(!rows[0].is_changed("label"));
    assert_contiguous(&list, 1).await;
}

#[tokio::test]
async fn test_position_written_into_free_space_is_kept() {
    let list = test_list().await;
    let mut rows = named(&list, 1, &["A", "B", "C"]).await;

    // nobody holds 5, so there is no clash to resolve
    rows[2].set("slot", 5);
    list.update(&mut rows[2]).await.unwrap();
    assert_eq!(slots(&list, &rows).await, vec![Some(1), Some(2), Some(5)]);

    let report = list.check_contiguity(&rows[0]).await.unwrap();
    assert_eq!(report.missing, vec![3]);
    assert_eq!(report.duplicates, vec![5]);
}

#[tokio::test]
async fn test_update_without_changes_does_nothing() {
    let list = test_list().await;
    let rows = named(&list, 1, &["A", "B"]).await;

    let mut stale = rows[0].clone();
    stale.set("slot", 9);
    stale.clear_changes();
    list.update(&mut stale).await.unwrap();
    assert_eq!(slots(&list, &rows).await, vec![Some(1), Some(2)]);
}
