//! Filtering operator tests.

use rillflow::{Channel, FilterCondition, Item, ItemKind};

#[tokio::test]
async fn predicate_filter_keeps_matching_items_in_order() {
    let items = Channel::of([1, 8, 3, 9, 2])
        .filter(FilterCondition::predicate(|item| match item {
            Item::Int(v) => Ok(*v > 2),
            other => Err(format!("expected int, got {}", other.kind())),
        }))
        .gather()
        .await
        .expect("no faults");
    assert_eq!(items, vec![Item::Int(8), Item::Int(3), Item::Int(9)]);
}

#[tokio::test]
async fn pattern_filter_matches_display_rendering() {
    let items = Channel::of(["sample_a.fastq", "sample_b.bam", "sample_c.fastq"])
        .filter(".fastq")
        .gather()
        .await
        .expect("no faults");
    assert_eq!(
        items,
        vec![Item::from("sample_a.fastq"), Item::from("sample_c.fastq")]
    );
}

#[tokio::test]
async fn kind_filter_discriminates_item_types() {
    let items = Channel::of([Item::Int(1), Item::Str("x".into()), Item::Int(2)])
        .filter(ItemKind::Int)
        .gather()
        .await
        .expect("no faults");
    assert_eq!(items, vec![Item::Int(1), Item::Int(2)]);
}

#[tokio::test]
async fn take_skip_partition_reconstructs_the_input() {
    let input = [10, 20, 30, 40];
    for n in 0..=5 {
        let mut head = Channel::of(input).take(n).gather().await.expect("no faults");
        let tail = Channel::of(input).skip(n).gather().await.expect("no faults");
        head.extend(tail);
        let expected: Vec<Item> = input.iter().map(|v| Item::Int(*v as i64)).collect();
        assert_eq!(head, expected, "partition failed for n={n}");
    }
}

#[tokio::test]
async fn take_zero_closes_immediately() {
    let items = Channel::of([1, 2, 3]).take(0).gather().await.expect("no faults");
    assert!(items.is_empty());
}

#[tokio::test]
async fn take_detaches_from_a_never_closing_upstream() {
    // Capacity 1 so the producer suspends instead of spinning.
    let (tx, rx) = Channel::bounded(1);
    let producer = tokio::spawn(async move {
        let mut i = 0i64;
        // Open-ended stream: only the consumer dropping stops it.
        loop {
            if tx.emit(i).await.is_err() {
                break;
            }
            i += 1;
        }
    });

    let items = rx.take(3).gather().await.expect("no faults");
    assert_eq!(items, vec![Item::Int(0), Item::Int(1), Item::Int(2)]);
    producer.await.expect("producer stops after detach");
}

#[tokio::test]
async fn skip_past_the_end_yields_empty_output() {
    let items = Channel::of([1, 2]).skip(5).gather().await.expect("no faults");
    assert!(items.is_empty());
}

#[tokio::test]
async fn first_takes_a_single_item() {
    let items = Channel::of([7, 8, 9]).first().gather().await.expect("no faults");
    assert_eq!(items, vec![Item::Int(7)]);
}

#[tokio::test]
async fn distinct_drops_consecutive_duplicates_only() {
    let items = Channel::of([1, 1, 2, 2, 1])
        .distinct()
        .gather()
        .await
        .expect("no faults");
    assert_eq!(items, vec![Item::Int(1), Item::Int(2), Item::Int(1)]);
}

#[tokio::test]
async fn unique_drops_every_reoccurrence() {
    let items = Channel::of([1, 1, 2, 2, 1])
        .unique()
        .gather()
        .await
        .expect("no faults");
    assert_eq!(items, vec![Item::Int(1), Item::Int(2)]);
}
