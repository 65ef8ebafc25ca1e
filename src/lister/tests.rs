//! Scenario and invariant tests for the parallel partition lister.

use super::*;
use crate::memstore::MemoryPartitionStore;
use crate::partition::{Partition, PartitionStore};
use crate::token::{self, ListState};
use crate::types::APIObject;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn obj(id: &str, partition: &str) -> APIObject {
    APIObject::new(id, partition, serde_json::json!({}))
}

fn store(name: &str, revision: &str, ids: &[&str]) -> Arc<dyn PartitionStore> {
    let objects = ids.iter().map(|id| obj(id, name)).collect();
    Arc::new(MemoryPartitionStore::new(name, revision, objects))
}

async fn drain(
    mut rx: tokio::sync::mpsc::Receiver<ListBatch>,
) -> Vec<(String, Vec<String>)> {
    let mut batches = Vec::new();
    while let Some(batch) = rx.recv().await {
        let ids = batch.objects.iter().map(|o| o.id.clone()).collect();
        batches.push((batch.partition, ids));
    }
    batches
}

#[tokio::test]
async fn test_s1_two_partitions_fit_under_limit() {
    let partitions = vec![
        (Partition::new("ns-a"), store("ns-a", "100", &["A1", "A2"])),
        (Partition::new("ns-b"), store("ns-b", "100", &["B1"])),
    ];
    let lister = PartitionLister::new(3);
    let (rx, outcome_rx) =
        lister.list(partitions, ListState::default(), 10, CancellationToken::new());

    let batches = drain(rx).await;
    assert_eq!(
        batches,
        vec![
            ("ns-a".to_string(), vec!["A1".to_string(), "A2".to_string()]),
            ("ns-b".to_string(), vec!["B1".to_string()]),
        ]
    );

    let outcome = outcome_rx.await.unwrap();
    assert_eq!(outcome.revision, "100");
    assert_eq!(outcome.continue_token, "");
    assert!(outcome.error.is_none());
}

#[tokio::test]
async fn test_s2_truncation_mid_first_partition_then_resumes() {
    let partitions = || {
        vec![
            (
                Partition::new("ns-a"),
                store("ns-a", "200", &["A1", "A2", "A3", "A4", "A5"]),
            ),
            (
                Partition::new("ns-b"),
                store("ns-b", "200", &["B1", "B2", "B3", "B4", "B5"]),
            ),
        ]
    };
    let lister = PartitionLister::new(3);

    let (rx, outcome_rx) =
        lister.list(partitions(), ListState::default(), 3, CancellationToken::new());
    let batches = drain(rx).await;
    assert_eq!(
        batches,
        vec![("ns-a".to_string(), vec!["A1".into(), "A2".into(), "A3".into()])]
    );
    let outcome = outcome_rx.await.unwrap();
    assert_eq!(outcome.revision, "200");
    let state = token::decode(&outcome.continue_token).unwrap();
    assert_eq!(
        state,
        ListState {
            revision: "200".into(),
            partition_name: "ns-a".into(),
            offset: 3,
            continue_token: String::new(),
            limit: 3,
        }
    );

    let (rx, outcome_rx) = lister.list(partitions(), state, 3, CancellationToken::new());
    let batches = drain(rx).await;
    assert_eq!(
        batches,
        vec![
            ("ns-a".to_string(), vec!["A4".into(), "A5".into()]),
            ("ns-b".to_string(), vec!["B1".into()]),
        ]
    );
    let outcome = outcome_rx.await.unwrap();
    let state = token::decode(&outcome.continue_token).unwrap();
    assert_eq!(state.partition_name, "ns-b");
    assert_eq!(state.offset, 1);
}

#[tokio::test]
async fn test_s3_truncation_at_partition_boundary() {
    let partitions = vec![
        (Partition::new("ns-a"), store("ns-a", "300", &["A1", "A2", "A3"])),
        (
            Partition::new("ns-b"),
            store("ns-b", "300", &["B1", "B2", "B3", "B4", "B5", "B6", "B7", "B8", "B9", "B10"]),
        ),
    ];
    let lister = PartitionLister::new(3);
    let (rx, outcome_rx) =
        lister.list(partitions, ListState::default(), 5, CancellationToken::new());
    let batches = drain(rx).await;
    assert_eq!(
        batches,
        vec![
            ("ns-a".to_string(), vec!["A1".into(), "A2".into(), "A3".into()]),
            ("ns-b".to_string(), vec!["B1".into(), "B2".into()]),
        ]
    );
    let outcome = outcome_rx.await.unwrap();
    let state = token::decode(&outcome.continue_token).unwrap();
    assert_eq!(state.partition_name, "ns-b");
    assert_eq!(state.offset, 2);
}

#[tokio::test]
async fn test_s4_stale_resumption_anchor_restarts_at_index_zero() {
    let partitions = vec![
        (Partition::new("ns-a"), store("ns-a", "400", &["A1"])),
        (Partition::new("ns-b"), store("ns-b", "400", &["B1"])),
    ];
    let stale = ListState {
        revision: "400".into(),
        partition_name: "ns-x".into(),
        offset: 7,
        continue_token: "garbage".into(),
        limit: 10,
    };
    let lister = PartitionLister::new(3);
    let (rx, outcome_rx) = lister.list(partitions, stale, 10, CancellationToken::new());
    let batches = drain(rx).await;
    assert_eq!(
        batches,
        vec![
            ("ns-a".to_string(), vec!["A1".to_string()]),
            ("ns-b".to_string(), vec!["B1".to_string()]),
        ]
    );
    let outcome = outcome_rx.await.unwrap();
    assert!(outcome.error.is_none());
    assert_eq!(outcome.continue_token, "");
}

#[tokio::test]
async fn test_s5_partition_error_preserves_earlier_emission() {
    let failing: Arc<dyn PartitionStore> =
        Arc::new(MemoryPartitionStore::new("ns-b", "500", vec![obj("B1", "ns-b")]).with_fail_on_call(1));
    let partitions = vec![
        (Partition::new("ns-a"), store("ns-a", "500", &["A1"])),
        (Partition::new("ns-b"), failing),
    ];
    let lister = PartitionLister::new(3);
    let (rx, outcome_rx) =
        lister.list(partitions, ListState::default(), 10, CancellationToken::new());
    let batches = drain(rx).await;
    assert_eq!(batches, vec![("ns-a".to_string(), vec!["A1".to_string()])]);
    let outcome = outcome_rx.await.unwrap();
    assert!(outcome.error.is_some());
    assert!(!outcome.error.unwrap().is_cancelled());
}

#[tokio::test]
async fn test_s6_cancellation_before_any_partition_returns() {
    let partitions = vec![
        (Partition::new("ns-a"), store("ns-a", "600", &["A1"])),
        (Partition::new("ns-b"), store("ns-b", "600", &["B1"])),
    ];
    let cancel = CancellationToken::new();
    cancel.cancel();
    let lister = PartitionLister::new(3);
    let (rx, outcome_rx) = lister.list(partitions, ListState::default(), 10, cancel);
    let batches = drain(rx).await;
    assert!(batches.is_empty());
    let outcome = outcome_rx.await.unwrap();
    assert!(outcome.error.unwrap().is_cancelled());
    assert_eq!(outcome.revision, "");
    assert_eq!(outcome.continue_token, "");
}

#[tokio::test]
async fn test_invariant_empty_partition_list_yields_empty_result() {
    let lister = PartitionLister::new(3);
    let (rx, outcome_rx) = lister.list(vec![], ListState::default(), 10, CancellationToken::new());
    let batches = drain(rx).await;
    assert!(batches.is_empty());
    let outcome = outcome_rx.await.unwrap();
    assert_eq!(outcome.revision, "");
    assert_eq!(outcome.continue_token, "");
    assert!(outcome.error.is_none());
}

#[tokio::test]
async fn test_invariant_emission_order_follows_partition_index() {
    let partitions = vec![
        (Partition::new("ns-a"), store("ns-a", "1", &["A1"])),
        (Partition::new("ns-b"), store("ns-b", "1", &["B1"])),
        (Partition::new("ns-c"), store("ns-c", "1", &["C1"])),
    ];
    let lister = PartitionLister::new(3);
    let (rx, _outcome_rx) =
        lister.list(partitions, ListState::default(), 100, CancellationToken::new());
    let batches = drain(rx).await;
    let order: Vec<_> = batches.iter().map(|(p, _)| p.clone()).collect();
    assert_eq!(order, vec!["ns-a", "ns-b", "ns-c"]);
}

#[tokio::test]
async fn test_invariant_revision_constant_across_resumed_pages() {
    let partitions = || {
        vec![
            (Partition::new("ns-a"), store("ns-a", "900", &["A1", "A2"])),
            (Partition::new("ns-b"), store("ns-b", "900", &["B1", "B2"])),
        ]
    };
    let lister = PartitionLister::new(3);
    let (rx, outcome_rx) =
        lister.list(partitions(), ListState::default(), 1, CancellationToken::new());
    let _ = drain(rx).await;
    let first = outcome_rx.await.unwrap();
    assert_eq!(first.revision, "900");

    let state = token::decode(&first.continue_token).unwrap();
    let (rx, outcome_rx) = lister.list(partitions(), state, 1, CancellationToken::new());
    let _ = drain(rx).await;
    let second = outcome_rx.await.unwrap();
    assert_eq!(second.revision, "900");
}

#[tokio::test]
async fn test_concurrency_bound_limits_in_flight_calls_after_first() {
    // Five partitions, each with a store that only ever serves one object, so the
    // second+ calls race under the concurrency bound instead of serializing
    // naturally through pagination.
    let partitions: Vec<_> = ["ns-a", "ns-b", "ns-c", "ns-d", "ns-e"]
        .iter()
        .map(|name| (Partition::new(*name), store(name, "1", &["X"])))
        .collect();
    let lister = PartitionLister::new(2);
    let (rx, outcome_rx) =
        lister.list(partitions, ListState::default(), 100, CancellationToken::new());
    let batches = tokio::time::timeout(Duration::from_secs(5), drain(rx))
        .await
        .expect("lister should not deadlock under a concurrency bound of 2");
    assert_eq!(batches.len(), 5);
    let outcome = outcome_rx.await.unwrap();
    assert!(outcome.error.is_none());
}
