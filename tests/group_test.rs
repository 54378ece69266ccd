//! Grouping and batching operator tests.

use rillflow::{BufferPolicy, Channel, Item};

fn tup(values: Vec<Item>) -> Item {
    Item::tuple(values)
}

fn ints(values: &[i64]) -> Item {
    Item::list(values.iter().map(|v| Item::Int(*v)).collect())
}

#[tokio::test]
async fn buffer_by_size_emits_full_batches_and_a_partial_tail() {
    let items = Channel::of([1, 2, 3, 4, 5])
        .buffer(2usize)
        .gather()
        .await
        .expect("no faults");
    assert_eq!(items, vec![ints(&[1, 2]), ints(&[3, 4]), ints(&[5])]);
}

#[tokio::test]
async fn buffer_boundary_item_closes_and_joins_its_group() {
    let is_marker = |item: &Item| Ok(matches!(item, Item::Int(0)));
    let items = Channel::of([1, 2, 0, 3, 0, 4])
        .buffer(BufferPolicy::boundary(is_marker))
        .gather()
        .await
        .expect("no faults");
    assert_eq!(items, vec![ints(&[1, 2, 0]), ints(&[3, 0]), ints(&[4])]);
}

#[tokio::test]
async fn buffer_size_or_boundary_fires_on_either_trigger() {
    let is_marker = |item: &Item| Ok(matches!(item, Item::Int(0)));
    let items = Channel::of([1, 0, 2, 3, 4])
        .buffer(BufferPolicy::size_or_boundary(3, is_marker))
        .gather()
        .await
        .expect("no faults");
    assert_eq!(items, vec![ints(&[1, 0]), ints(&[2, 3, 4])]);
}

#[tokio::test]
async fn collate_with_step_one_slides_overlapping_windows() {
    let items = Channel::of([1, 2, 3, 4])
        .collate(3, 1, false)
        .gather()
        .await
        .expect("no faults");
    assert_eq!(items, vec![ints(&[1, 2, 3]), ints(&[2, 3, 4])]);
}

#[tokio::test]
async fn collate_keep_remainder_emits_short_trailing_windows() {
    let items = Channel::of([1, 2, 3, 4])
        .collate(3, 1, true)
        .gather()
        .await
        .expect("no faults");
    assert_eq!(
        items,
        vec![
            ints(&[1, 2, 3]),
            ints(&[2, 3, 4]),
            ints(&[3, 4]),
            ints(&[4])
        ]
    );
}

#[tokio::test]
async fn collate_with_step_above_size_skips_items_between_windows() {
    let items = Channel::of([1, 2, 3, 4, 5, 6])
        .collate(2, 3, false)
        .gather()
        .await
        .expect("no faults");
    assert_eq!(items, vec![ints(&[1, 2]), ints(&[4, 5])]);
}

#[tokio::test]
async fn collate_equal_size_and_step_behaves_like_plain_batching() {
    let items = Channel::of([1, 2, 3, 4, 5])
        .collate(2, 2, true)
        .gather()
        .await
        .expect("no faults");
    assert_eq!(items, vec![ints(&[1, 2]), ints(&[3, 4]), ints(&[5])]);
}

#[tokio::test]
async fn collate_rejects_zero_size_or_step() {
    let err = Channel::of([1, 2])
        .collate(0, 1, false)
        .gather()
        .await
        .expect_err("zero size is invalid");
    assert!(err.to_string().contains("collate"));
}

#[tokio::test]
async fn group_tuple_emits_each_key_exactly_once_in_first_seen_order() {
    let items = Channel::of([
        tup(vec![Item::Int(1), Item::from("A")]),
        tup(vec![Item::Int(1), Item::from("B")]),
        tup(vec![Item::Int(2), Item::from("C")]),
    ])
    .group_tuple(0)
    .gather()
    .await
    .expect("no faults");

    assert_eq!(
        items,
        vec![
            tup(vec![
                Item::Int(1),
                Item::list(vec![
                    tup(vec![Item::Int(1), Item::from("A")]),
                    tup(vec![Item::Int(1), Item::from("B")]),
                ]),
            ]),
            tup(vec![
                Item::Int(2),
                Item::list(vec![tup(vec![Item::Int(2), Item::from("C")])]),
            ]),
        ]
    );
}

#[tokio::test]
async fn group_tuple_waits_for_upstream_closure() {
    // Keys arrive interleaved; no group may be emitted before the upstream
    // closes, so late items for the first key still land in its group.
    let items = Channel::of([
        tup(vec![Item::Int(1), Item::from("a")]),
        tup(vec![Item::Int(2), Item::from("b")]),
        tup(vec![Item::Int(1), Item::from("c")]),
    ])
    .group_tuple(0)
    .gather()
    .await
    .expect("no faults");

    assert_eq!(items.len(), 2);
    assert_eq!(
        items[0],
        tup(vec![
            Item::Int(1),
            Item::list(vec![
                tup(vec![Item::Int(1), Item::from("a")]),
                tup(vec![Item::Int(1), Item::from("c")]),
            ]),
        ])
    );
}
