use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use slotlist::{OrderedList, Row};

use crate::helpers::*;

#[tokio::test]
async fn test_insert_at_current_position_changes_nothing() {
    let list = test_list().await;
    let mut rows = seed(&list, 1, 4).await;
    let before = slots(&list, &rows).await;

    list.insert_at(&mut rows[2], 3).await.unwrap();
    assert_eq!(slots(&list, &rows).await, before);
}

#[tokio::test]
async fn test_move_past_the_ends_changes_nothing() {
    let list = test_list().await;
    let mut rows = named(&list, 1, &["A", "B", "C"]).await;

    list.move_higher(&mut rows[0]).await.unwrap();
    list.move_lower(&mut rows[2]).await.unwrap();
    assert_eq!(order(&list, 1).await, ["A", "B", "C"]);
    assert_eq!(rows[0].get("slot").as_integer(), Some(1));
    assert_eq!(rows[2].get("slot").as_integer(), Some(3));
}

#[tokio::test]
async fn test_remove_then_insert_at_top_round_trip() {
    let list = test_list().await;
    let mut rows = named(&list, 1, &["A", "B", "C", "D"]).await;

    list.remove_from_list(&mut rows[2]).await.unwrap();
    assert_eq!(order(&list, 1).await, ["A", "B", "D"]);

    list.insert_at_top(&mut rows[2]).await.unwrap();
    assert_eq!(rows[2].get("slot").as_integer(), Some(1));
    assert_eq!(order(&list, 1).await, ["C", "A", "B", "D"]);
}

async fn apply(list: &OrderedList, row: &mut Row, op: usize, arg: i64) {
    match op {
        0 => list.move_higher(row).await,
        1 => list.move_lower(row).await,
        2 => list.move_to_top(row).await,
        3 => list.move_to_bottom(row).await,
        4 => list.remove_from_list(row).await,
        5 => list.insert_at_top(row).await,
        _ => {
            // only positions that exist keep the list dense
            let listed = list.peers(row).await.unwrap().len() as i64;
            let bottom = if list.is_listed(row) { listed } else { listed + 1 };
            list.insert_at(row, 1 + arg % bottom.max(1)).await
        }
    }
    .unwrap();
}

#[tokio::test]
async fn test_contiguity_after_random_operations() {
    let list = test_list().await;
    let mut first = seed(&list, 1, 6).await;
    let mut second = seed(&list, 2, 4).await;
    // seeded so failures reproduce
    let mut rng = StdRng::seed_from_u64(0x5107);

    for _ in 0..120 {
        let (rows, list_id) = if rng.gen_range(0..3) == 0 {
            (&mut second, 2)
        } else {
            (&mut first, 1)
        };
        let index = rng.gen_range(0..rows.len());
        let op = rng.gen_range(0..7);
        let arg: i64 = rng.gen_range(0..8);
        // operations act on the latest stored state of the row
        let mut row = list.reload(&rows[index]).await.unwrap();
        apply(&list, &mut row, op, arg).await;
        rows[index] = row;
        assert_contiguous(&list, list_id).await;
    }
    assert_contiguous(&list, 1).await;
    assert_contiguous(&list, 2).await;
}
