//! The parallel partition lister: a concurrent, order-preserving, resumable
//! aggregator over per-partition paginated list calls.

use super::shared::Shared;
use super::types::{ListBatch, ListOutcome, LocalState, CHANNEL_BUFFER, DEFAULT_LIMIT};
use crate::error::Error;
use crate::partition::{ListParams, Partition, PartitionStore};
use crate::token::{self, ListState};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

/// Fans out paginated `list` calls across partitions under a concurrency
/// bound, serializes emission in partition order, enforces a global
/// item-capacity limit, and records resumption state when truncating.
pub struct PartitionLister {
    concurrency: usize,
}

impl PartitionLister {
    /// Construct a lister with concurrency bound `c`.
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    /// Start one list session over `partitions`, resuming from `state`.
    ///
    /// Returns a receiver of batches in strict partition-index emission
    /// order, and a oneshot receiver of the terminal outcome (revision,
    /// encoded continue token, terminal error) that resolves once every
    /// scheduled partition task has returned.
    #[instrument(skip(self, partitions, cancel), fields(partitions = partitions.len(), limit = limit))]
    pub fn list(
        &self,
        partitions: Vec<(Partition, Arc<dyn PartitionStore>)>,
        state: ListState,
        limit: u64,
        cancel: CancellationToken,
    ) -> (mpsc::Receiver<ListBatch>, oneshot::Receiver<ListOutcome>) {
        let limit = if limit == 0 { DEFAULT_LIMIT } else { limit };
        let concurrency = self.concurrency;
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER);
        let (outcome_tx, outcome_rx) = oneshot::channel();

        tokio::spawn(async move {
            let outcome = run_session(partitions, state, limit, concurrency, tx, cancel).await;
            let _ = outcome_tx.send(outcome);
        });

        (rx, outcome_rx)
    }
}

async fn run_session(
    partitions: Vec<(Partition, Arc<dyn PartitionStore>)>,
    state: ListState,
    limit: u64,
    concurrency: usize,
    tx: mpsc::Sender<ListBatch>,
    cancel: CancellationToken,
) -> ListOutcome {
    if partitions.is_empty() {
        return ListOutcome {
            revision: String::new(),
            continue_token: String::new(),
            error: None,
        };
    }

    let anchor_valid = !state.partition_name.is_empty()
        && partitions.iter().any(|(p, _)| p.name == state.partition_name);
    let effective = if anchor_valid {
        state
    } else {
        if !state.partition_name.is_empty() {
            debug!(stale_partition = %state.partition_name, "resumption anchor not found, restarting from index 0");
        }
        ListState {
            revision: state.revision,
            partition_name: String::new(),
            offset: 0,
            continue_token: String::new(),
            limit: state.limit,
        }
    };
    let start_index = partitions
        .iter()
        .position(|(p, _)| p.name == effective.partition_name)
        .unwrap_or(0);

    let shared = Arc::new(Shared::new(limit as i64, cancel.clone()));
    let semaphore = Arc::new(Semaphore::new(concurrency));

    let mut prev_turn: Option<oneshot::Receiver<()>> = None;
    let mut handles = Vec::new();

    for i in start_index..partitions.len() {
        if cancel.is_cancelled() {
            shared.record_error(Error::Cancelled);
            break;
        }
        if shared.capacity() <= 0 || shared.has_error() {
            break;
        }

        let weight = if shared.revision_pinned() { 1 } else { concurrency as u32 };
        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                shared.record_error(Error::Cancelled);
                break;
            }
            permit = semaphore.clone().acquire_many_owned(weight) => {
                match permit {
                    Ok(p) => p,
                    Err(_) => {
                        shared.record_error(Error::Cancelled);
                        break;
                    }
                }
            }
        };

        let (turn_tx, turn_rx) = oneshot::channel();
        let my_turn = prev_turn.take();
        prev_turn = Some(turn_rx);

        let (partition, store) = partitions[i].clone();
        let local_state = LocalState {
            continue_token: if partition.name == effective.partition_name {
                effective.continue_token.clone()
            } else {
                String::new()
            },
            revision: effective.revision.clone(),
            is_anchor: partition.name == effective.partition_name && effective.offset > 0,
            anchor_offset: effective.offset,
        };

        let shared = shared.clone();
        let tx = tx.clone();
        let cancel = cancel.clone();

        handles.push(tokio::spawn(async move {
            let _permit = permit;
            run_partition_task(partition, store, local_state, limit, my_turn, turn_tx, shared, tx, cancel)
                .await;
        }));
    }

    drop(tx);

    for handle in handles {
        let _ = handle.await;
    }

    ListOutcome {
        revision: shared.revision(),
        continue_token: shared
            .terminal_state()
            .map(|s| token::encode(&s))
            .unwrap_or_default(),
        error: shared.final_error(),
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_partition_task(
    partition: Partition,
    store: Arc<dyn PartitionStore>,
    mut local: LocalState,
    limit: u64,
    mut my_turn: Option<oneshot::Receiver<()>>,
    _turn_tx: oneshot::Sender<()>,
    shared: Arc<Shared>,
    tx: mpsc::Sender<ListBatch>,
    cancel: CancellationToken,
) {
    loop {
        // Step 1: call the backend. Races against cancellation so a stuck
        // backend call doesn't block shutdown indefinitely. Once the session
        // revision is pinned (by this task or an earlier one), every
        // subsequent call -- including another partition's very first --
        // must use that pinned value rather than whatever revision this
        // session started with.
        let revision_for_call = if shared.revision_pinned() {
            shared.revision()
        } else {
            local.revision.clone()
        };
        let list = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                shared.record_error(Error::Cancelled);
                return;
            }
            result = store.list(ListParams {
                continue_token: local.continue_token.clone(),
                revision: revision_for_call,
                limit,
            }) => {
                match result {
                    Ok(list) => list,
                    Err(e) => {
                        warn!(partition = %partition.name, error = %e, "partition list failed");
                        shared.record_error(e);
                        return;
                    }
                }
            }
        };

        // Step 2: wait for this partition's turn.
        if let Some(turn) = my_turn.take() {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    shared.record_error(Error::Cancelled);
                    return;
                }
                _ = turn => {}
            }
        }

        // Step 3: an earlier partition may already have closed out the page.
        if shared.terminal_state_is_set() {
            return;
        }

        // Step 4: pin the session revision from the first successful list.
        let session_revision = shared.pin_revision_if_unset(&list.revision);

        // Step 5: drop already-delivered items if this is the resumption anchor.
        let mut objects = list.objects;
        if local.is_anchor && local.anchor_offset > 0 {
            let offset = local.anchor_offset as usize;
            if offset >= objects.len() {
                objects.clear();
            } else {
                objects.drain(0..offset);
            }
            local.is_anchor = false;
        }

        let capacity_before = shared.capacity();
        let batch_used_continue = local.continue_token.clone();

        if objects.len() as i64 > capacity_before {
            // Step 6: truncate to fit and record the resumption anchor.
            let take = capacity_before.max(0) as usize;
            let emitted: Vec<_> = objects.drain(0..take).collect();
            debug!(partition = %partition.name, take, "truncating partition batch to fit capacity");
            if !emitted.is_empty() && tx.send(ListBatch { partition: partition.name.clone(), objects: emitted }).await.is_err() {
                shared.record_error(Error::Cancelled);
                return;
            }
            shared.set_terminal_state(ListState {
                revision: session_revision,
                partition_name: partition.name.clone(),
                offset: take as u64,
                continue_token: batch_used_continue,
                limit,
            });
            shared.set_capacity(0);
            return;
        }

        // Step 7: emit everything this call returned.
        let emitted_count = objects.len();
        if !objects.is_empty() {
            if tx
                .send(ListBatch { partition: partition.name.clone(), objects })
                .await
                .is_err()
            {
                shared.record_error(Error::Cancelled);
                return;
            }
        }
        shared.decrement_capacity(emitted_count as i64);

        // Step 8: this partition is exhausted.
        if list.continue_token.is_empty() {
            return;
        }

        // Step 9: loop for the next backend page of this same partition.
        // `local.revision` is left as-is: once pinned, `revision_for_call`
        // reads the shared pinned value directly and ignores it.
        local.continue_token = list.continue_token;
    }
}
