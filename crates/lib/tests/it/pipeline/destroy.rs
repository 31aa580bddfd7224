use crate::helpers::*;

#[tokio::test]
async fn test_destroy_closes_the_gap() {
    let list = test_list().await;
    let mut rows = named(&list, 1, &["A", "B", "C", "D"]).await;

    list.destroy(&mut rows[1]).await.unwrap();
    assert!(list.is_unlisted(&rows[1]));
    assert_eq!(order(&list, 1).await, ["A", "C", "D"]);
    assert_contiguous(&list, 1).await;

    let err = list.reload(&rows[1]).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_destroy_uses_stored_position_not_stale_copy() {
    let list = test_list().await;
    let mut rows = named(&list, 1, &["A", "B", "C"]).await;

    // C moves to the top through another handle; rows[2] still says 3
    let mut fresh_c = rows[2].clone();
    list.move_to_top(&mut fresh_c).await.unwrap();
    assert_eq!(rows[2].get("slot").as_integer(), Some(3));

    list.destroy(&mut rows[2]).await.unwrap();
    assert_eq!(order(&list, 1).await, ["A", "B"]);
    assert_eq!(slots(&list, &rows[..2]).await, vec![Some(1), Some(2)]);
}

#[tokio::test]
async fn test_destroy_unlisted_row_leaves_peers() {
    let list = test_list().await;
    let mut rows = named(&list, 1, &["A", "B"]).await;
    list.remove_from_list(&mut rows[0]).await.unwrap();

    list.destroy(&mut rows[0]).await.unwrap();
    assert_eq!(slots(&list, &rows[1..]).await, vec![Some(1)]);
}
