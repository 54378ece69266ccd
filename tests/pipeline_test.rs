//! End-to-end pipeline tests chaining several operator classes.

use rillflow::{Channel, FilterCondition, Item, SplitCsvOptions, WriteMode};
use tokio::time::{timeout, Duration};

#[tokio::test]
async fn csv_records_group_by_field_and_aggregate() {
    // Samples per condition: split, re-key, group, then count group sizes.
    let csv = "sample,condition\ns1,treated\ns2,control\ns3,treated\ns4,treated";

    let groups = Channel::of([csv])
        .split_csv(SplitCsvOptions::default().with_header())
        .map(|record| {
            let condition = record
                .get_field("condition")
                .cloned()
                .ok_or("missing condition field")?;
            let sample = record.get_field("sample").cloned().ok_or("missing sample field")?;
            Ok(Item::tuple(vec![condition, sample]))
        })
        .group_tuple(0)
        .gather()
        .await
        .expect("no faults");

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].get(0), Some(&Item::Str("treated".into())));
    assert_eq!(
        groups[0].get(1).and_then(|members| members.elements()).map(|m| m.len()),
        Some(3)
    );
    assert_eq!(groups[1].get(0), Some(&Item::Str("control".into())));
}

#[tokio::test]
async fn mixed_channels_filter_batch_and_sum() {
    let a = Channel::of([1, 2, 3]);
    let b = Channel::of([4, 5, 6]);

    let total = timeout(
        Duration::from_secs(1),
        a.mix([b])
            .filter(FilterCondition::predicate(|item| match item {
                Item::Int(v) => Ok(v % 2 == 0),
                other => Err(format!("expected int, got {}", other.kind())),
            }))
            .sum(),
    )
    .await
    .expect("pipeline completes")
    .expect("no faults");

    assert_eq!(total, Item::Int(12));
}

#[tokio::test]
async fn batched_output_lands_in_a_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("batches.txt");

    Channel::of([1, 2, 3, 4, 5])
        .buffer(2usize)
        .collect_file(&path, WriteMode::Overwrite)
        .await
        .expect("writable");

    let content = std::fs::read_to_string(&path).expect("readable");
    assert_eq!(content, "[1, 2]\n[3, 4]\n[5]\n");
}

#[tokio::test]
async fn fault_in_the_middle_reaches_the_terminal_operator() {
    let err = Channel::of([1, 2, 3])
        .map(|item| match item {
            Item::Int(2) => Err("poison item".to_string()),
            other => Ok(other),
        })
        .buffer(10usize)
        .to_list()
        .gather()
        .await
        .expect_err("fault must cross buffer and to_list");
    assert!(err.to_string().contains("poison item"));
}
