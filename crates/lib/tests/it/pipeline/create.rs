use slotlist::Row;

use crate::helpers::*;

#[tokio::test]
async fn test_preset_position_is_kept_under_bottom_policy() {
    let list = test_list().await;
    let rows = named(&list, 1, &["A", "B"]).await;

    let d = list
        .create(
            Row::new()
                .with("list_id", 1)
                .with("label", "D")
                .with("slot", 2),
        )
        .await
        .unwrap();
    assert_eq!(d.get("slot").as_integer(), Some(2));
    assert_eq!(slots(&list, &rows).await, vec![Some(1), Some(3)]);
    assert_eq!(order(&list, 1).await, ["A", "D", "B"]);
}

#[tokio::test]
async fn test_preset_past_the_end_is_clamped() {
    let list = test_list().await;
    named(&list, 1, &["A", "B"]).await;

    let far = list
        .create(
            Row::new()
                .with("list_id", 1)
                .with("label", "F")
                .with("slot", 40),
        )
        .await
        .unwrap();
    assert_eq!(far.get("slot").as_integer(), Some(3));

    let low = list
        .create(
            Row::new()
                .with("list_id", 1)
                .with("label", "L")
                .with("slot", -5),
        )
        .await
        .unwrap();
    assert_eq!(low.get("slot").as_integer(), Some(1));
    assert_eq!(order(&list, 1).await, ["L", "A", "B", "F"]);
    assert_contiguous(&list, 1).await;
}

#[tokio::test]
async fn test_preset_in_empty_scope_starts_at_top() {
    let list = test_list().await;
    let row = list
        .create(
            Row::new()
                .with("list_id", 7)
                .with("label", "A")
                .with("slot", 5),
        )
        .await
        .unwrap();
    assert_eq!(row.get("slot").as_integer(), Some(1));
}

#[tokio::test]
async fn test_top_policy_prepends() {
    let list = top_list().await;
    named(&list, 1, &["A", "B", "C"]).await;
    assert_eq!(order(&list, 1).await, ["C", "B", "A"]);
    assert_contiguous(&list, 1).await;
}

#[tokio::test]
async fn test_created_row_carries_assigned_identity() {
    let list = test_list().await;
    let rows = seed(&list, 1, 2).await;
    assert!(!rows[0].get("id").is_null());
    assert_ne!(rows[0].get("id"), rows[1].get("id"));
}
