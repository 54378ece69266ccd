//! Channel primitive tests: creation, closing, draining, fan-out, sources.

use rillflow::{Channel, FlowError, Item, LinesSource, StreamError};
use std::io::Write;
use tokio::time::{timeout, Duration};

#[tokio::test]
async fn value_channel_is_eagerly_closed_and_ordered() {
    let items = Channel::of([3, 1, 2]).gather().await.expect("finite channel drains");
    assert_eq!(items, vec![Item::Int(3), Item::Int(1), Item::Int(2)]);
}

#[tokio::test]
async fn empty_channel_yields_nothing() {
    let items = Channel::empty().gather().await.expect("empty channel drains");
    assert!(items.is_empty());
}

#[tokio::test]
async fn unbounded_channel_carries_concurrent_producer_output() {
    let (tx, rx) = Channel::unbounded();
    tokio::spawn(async move {
        for i in 0..100i64 {
            tx.emit(i).await.expect("consumer alive");
        }
    });

    let items = timeout(Duration::from_secs(1), rx.gather())
        .await
        .expect("producer closes the channel")
        .expect("no faults");
    assert_eq!(items.len(), 100);
    assert_eq!(items[99], Item::Int(99));
}

#[tokio::test]
async fn bounded_channel_suspends_producer_but_loses_nothing() {
    let (tx, rx) = Channel::bounded(2);
    let producer = tokio::spawn(async move {
        for i in 0..50i64 {
            tx.emit(i).await.expect("consumer alive");
        }
    });

    let items = rx.gather().await.expect("no faults");
    assert_eq!(items.len(), 50);
    producer.await.expect("producer completes");
}

#[tokio::test]
async fn fault_terminates_the_drain() {
    let (tx, rx) = Channel::unbounded();
    tokio::spawn(async move {
        tx.emit(1).await.expect("consumer alive");
        tx.fault(StreamError::new("test_source", "boom"))
            .await
            .expect("consumer alive");
    });

    let err = rx.gather().await.expect_err("fault must surface");
    match err {
        FlowError::Stream(stream) => {
            assert_eq!(stream.operator, "test_source");
            assert_eq!(stream.message, "boom");
        }
        other => panic!("expected stream fault, got {other}"),
    }
}

#[tokio::test]
async fn fork_delivers_every_item_to_every_branch() {
    let branches = Channel::of([1, 2, 3]).fork(3);
    assert_eq!(branches.len(), 3);
    for branch in branches {
        let items = branch.gather().await.expect("no faults");
        assert_eq!(items, vec![Item::Int(1), Item::Int(2), Item::Int(3)]);
    }
}

#[tokio::test]
async fn lines_source_emits_one_item_per_line() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "alpha").expect("write");
    writeln!(file, "beta").expect("write");

    let items = Channel::from_source(LinesSource::new(file.path()))
        .gather()
        .await
        .expect("readable file");
    assert_eq!(items, vec![Item::from("alpha"), Item::from("beta")]);
}

#[tokio::test]
async fn missing_lines_source_file_faults_the_channel() {
    let err = Channel::from_source(LinesSource::new("/nonexistent/rillflow.txt"))
        .gather()
        .await
        .expect_err("unreadable file must fault");
    match err {
        FlowError::Stream(stream) => assert_eq!(stream.operator, "lines_source"),
        other => panic!("expected stream fault, got {other}"),
    }
}
