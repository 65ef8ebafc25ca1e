//! Tests for the Aggregating Store facade and watch multiplex.

use super::*;
use crate::memstore::{MemoryPartitionStore, StaticPartitioner};
use crate::partition::Partition;
use crate::types::APIObject;
use std::time::Duration;

fn obj(id: &str, partition: &str) -> APIObject {
    APIObject::new(id, partition, serde_json::json!({}))
}

fn two_partition_store() -> AggregatingStore {
    let a: Arc<dyn crate::partition::PartitionStore> =
        Arc::new(MemoryPartitionStore::new("ns-a", "1", vec![obj("A1", "ns-a")]));
    let b: Arc<dyn crate::partition::PartitionStore> =
        Arc::new(MemoryPartitionStore::new("ns-b", "1", vec![obj("B1", "ns-b")]));
    let partitioner = StaticPartitioner::new(vec![(Partition::new("ns-a"), a), (Partition::new("ns-b"), b)]);
    AggregatingStore::new(Arc::new(partitioner), 3)
}

#[tokio::test]
async fn test_get_by_id_routes_through_lookup() {
    let store = two_partition_store();
    let found = store.get_by_id("A1").await.unwrap();
    assert_eq!(found.id, "A1");
}

#[tokio::test]
async fn test_create_routes_through_lookup() {
    let store = two_partition_store();
    let created = store.create(obj("A2", "ns-a")).await.unwrap();
    assert_eq!(created.id, "A2");
    assert_eq!(store.get_by_id("A2").await.unwrap().id, "A2");
}

#[tokio::test]
async fn test_get_by_id_propagates_backend_error() {
    let store = two_partition_store();
    let err = store.get_by_id("missing").await.unwrap_err();
    assert!(!err.is_cancelled());
}

#[tokio::test]
async fn test_list_aggregates_across_partitions() {
    let store = two_partition_store();
    let page = store
        .list("", 10, CancellationToken::new())
        .await
        .unwrap();
    let ids: Vec<_> = page.objects.iter().map(|o| o.id.clone()).collect();
    assert_eq!(ids, vec!["A1".to_string(), "B1".to_string()]);
    assert!(!page.has_more());
}

#[tokio::test]
async fn test_list_rejects_malformed_continue_token() {
    let store = two_partition_store();
    let err = store
        .list("not valid base64!!!", 10, CancellationToken::new())
        .await
        .unwrap_err();
    assert!(err.is_client_error());
}

#[tokio::test]
async fn test_watch_multiplexes_events_from_every_partition() {
    use crate::partition::WatchEvent;

    let a: Arc<dyn crate::partition::PartitionStore> = Arc::new(
        MemoryPartitionStore::new("ns-a", "1", vec![]).with_watch_events(vec![Ok(WatchEvent {
            partition: "ns-a".into(),
            object: obj("A1", "ns-a"),
        })]),
    );
    let b: Arc<dyn crate::partition::PartitionStore> = Arc::new(
        MemoryPartitionStore::new("ns-b", "1", vec![]).with_watch_events(vec![Ok(WatchEvent {
            partition: "ns-b".into(),
            object: obj("B1", "ns-b"),
        })]),
    );
    let partitioner =
        StaticPartitioner::new(vec![(Partition::new("ns-a"), a), (Partition::new("ns-b"), b)]);
    let store = AggregatingStore::new(Arc::new(partitioner), 3);

    let mut rx = store
        .watch(WatchRequest::default(), CancellationToken::new())
        .await
        .unwrap();

    let mut seen = Vec::new();
    while let Ok(Some(event)) = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await {
        seen.push(event.unwrap().object.id);
    }
    seen.sort();
    assert_eq!(seen, vec!["A1".to_string(), "B1".to_string()]);
}

#[tokio::test]
async fn test_watch_open_failure_aborts_whole_multiplex() {
    let a: Arc<dyn crate::partition::PartitionStore> =
        Arc::new(MemoryPartitionStore::new("ns-a", "1", vec![]));
    let b: Arc<dyn crate::partition::PartitionStore> =
        Arc::new(MemoryPartitionStore::new("ns-b", "1", vec![]).with_watch_open_error());
    let partitioner =
        StaticPartitioner::new(vec![(Partition::new("ns-a"), a), (Partition::new("ns-b"), b)]);
    let store = AggregatingStore::new(Arc::new(partitioner), 3);

    let err = store
        .watch(WatchRequest::default(), CancellationToken::new())
        .await
        .unwrap_err();
    assert!(!err.is_cancelled());
}

#[tokio::test]
async fn test_watch_mid_stream_error_cancels_siblings_and_closes_channel() {
    use crate::partition::WatchEvent;

    let a: Arc<dyn crate::partition::PartitionStore> = Arc::new(
        MemoryPartitionStore::new("ns-a", "1", vec![]).with_watch_events(vec![Err(
            crate::error::Error::backend("ns-a", "connection dropped"),
        )]),
    );
    let b: Arc<dyn crate::partition::PartitionStore> = Arc::new(
        MemoryPartitionStore::new("ns-b", "1", vec![]).with_watch_events(vec![Ok(WatchEvent {
            partition: "ns-b".into(),
            object: obj("B1", "ns-b"),
        })]),
    );
    let partitioner =
        StaticPartitioner::new(vec![(Partition::new("ns-a"), a), (Partition::new("ns-b"), b)]);
    let store = AggregatingStore::new(Arc::new(partitioner), 3);

    let cancel = CancellationToken::new();
    let mut rx = store
        .watch(WatchRequest::default(), cancel.clone())
        .await
        .unwrap();

    let mut saw_error = false;
    while let Ok(Some(event)) = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await {
        if event.is_err() {
            saw_error = true;
        }
    }

    assert!(saw_error, "the mid-stream error must be forwarded, not swallowed");
    assert!(
        cancel.is_cancelled(),
        "a mid-stream error must cancel every sibling watch"
    );
}
