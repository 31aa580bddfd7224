use slotlist::Row;

use crate::helpers::*;

fn label(row: &Row) -> &str {
    row.get("label").as_text().unwrap_or_default()
}

#[tokio::test]
async fn test_first_and_last() {
    let list = test_list().await;
    let rows = named(&list, 1, &["A", "B", "C"]).await;

    assert!(list.is_first(&rows[0]).unwrap());
    assert!(!list.is_first(&rows[1]).unwrap());
    assert!(list.is_last(&rows[2]).await.unwrap());
    assert!(!list.is_last(&rows[1]).await.unwrap());
    assert!(rows.iter().all(|row| list.is_listed(row)));
}

#[tokio::test]
async fn test_adjacent_peers() {
    let list = test_list().await;
    let rows = named(&list, 1, &["A", "B", "C"]).await;

    let higher = list.higher_peer(&rows[1]).await.unwrap().unwrap();
    assert_eq!(label(&higher), "A");
    let lower = list.lower_peer(&rows[1]).await.unwrap().unwrap();
    assert_eq!(label(&lower), "C");

    assert!(list.higher_peer(&rows[0]).await.unwrap().is_none());
    assert!(list.lower_peer(&rows[2]).await.unwrap().is_none());
}

#[tokio::test]
async fn test_peer_ranges_are_nearest_first() {
    let list = test_list().await;
    let rows = named(&list, 1, &["A", "B", "C", "D", "E"]).await;

    let above: Vec<_> = list
        .higher_peers(&rows[3], None)
        .await
        .unwrap()
        .iter()
        .map(|r| label(r).to_string())
        .collect();
    assert_eq!(above, ["C", "B", "A"]);

    let below: Vec<_> = list
        .lower_peers(&rows[0], Some(2))
        .await
        .unwrap()
        .iter()
        .map(|r| label(r).to_string())
        .collect();
    assert_eq!(below, ["B", "C"]);
}

#[tokio::test]
async fn test_reload_reflects_peer_shifts() {
    let list = test_list().await;
    let mut rows = named(&list, 1, &["A", "B"]).await;
    list.move_to_top(&mut rows[1]).await.unwrap();

    // rows[0] is stale in memory
    assert_eq!(rows[0].get("slot").as_integer(), Some(1));
    let fresh = list.reload(&rows[0]).await.unwrap();
    assert_eq!(fresh.get("slot").as_integer(), Some(2));
}

#[tokio::test]
async fn test_check_contiguity_reports_gaps() {
    let list = test_list().await;
    let mut rows = named(&list, 1, &["A", "B", "C"]).await;
    list.decrement_position(&mut rows[2]).await.unwrap();

    let report = list.check_contiguity(&rows[0]).await.unwrap();
    assert!(!report.is_contiguous());
    assert_eq!(report.positions, vec![1, 2, 2]);
    assert_eq!(report.duplicates, vec![2]);
    assert_eq!(report.missing, vec![3]);
}
