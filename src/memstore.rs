//! An in-memory `PartitionStore` test double.
//!
//! Used by the unit/integration test suite and by the CLI demo to exercise
//! the aggregator without a real backend.

use crate::error::{Error, Result};
use crate::partition::{ListParams, Partition, PartitionStore, Partitioner, WatchEvent, WatchRequest};
use crate::types::{APIObject, APIObjectList};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

/// A scripted, in-memory partition backend.
///
/// `list` paginates over a fixed object set `page_size` items at a time,
/// using the backend-level `continue` token as a stringified offset. This is
/// enough to exercise both "backend returns everything in one call" and
/// "backend has its own internal pagination" scenarios.
pub struct MemoryPartitionStore {
    name: String,
    revision: String,
    objects: Mutex<Vec<APIObject>>,
    page_size: usize,
    fail_on_call: Option<usize>,
    calls: AtomicUsize,
    watch_events: Vec<Result<WatchEvent>>,
    watch_open_error: bool,
}

impl MemoryPartitionStore {
    /// Construct a store that returns every object in a single `list` call.
    pub fn new(name: impl Into<String>, revision: impl Into<String>, objects: Vec<APIObject>) -> Self {
        let page_size = objects.len().max(1);
        Self {
            name: name.into(),
            revision: revision.into(),
            objects: Mutex::new(objects),
            page_size,
            fail_on_call: None,
            calls: AtomicUsize::new(0),
            watch_events: Vec::new(),
            watch_open_error: false,
        }
    }

    /// Paginate the backing set `page_size` objects per call.
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Make the `n`th call to `list` (1-indexed) fail with a backend error.
    #[must_use]
    pub fn with_fail_on_call(mut self, n: usize) -> Self {
        self.fail_on_call = Some(n);
        self
    }

    /// Events this store's `watch` call replays, in order. An `Err` in the
    /// middle of the sequence is replayed as a mid-stream failure: the
    /// caller forwards it and the replay stops there, matching how a real
    /// backend's stream would end.
    #[must_use]
    pub fn with_watch_events(mut self, events: Vec<Result<WatchEvent>>) -> Self {
        self.watch_events = events;
        self
    }

    /// Make `watch` fail to open at all.
    #[must_use]
    pub fn with_watch_open_error(mut self) -> Self {
        self.watch_open_error = true;
        self
    }

    /// Number of `list` calls observed so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PartitionStore for MemoryPartitionStore {
    async fn get_by_id(&self, id: &str) -> Result<APIObject> {
        self.objects
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.id == id)
            .cloned()
            .ok_or_else(|| Error::backend(&self.name, format!("object '{id}' not found")))
    }

    async fn create(&self, object: APIObject) -> Result<APIObject> {
        self.objects.lock().unwrap().push(object.clone());
        Ok(object)
    }

    async fn update(&self, id: &str, object: APIObject) -> Result<APIObject> {
        let mut objects = self.objects.lock().unwrap();
        if let Some(slot) = objects.iter_mut().find(|o| o.id == id) {
            *slot = object.clone();
            Ok(object)
        } else {
            Err(Error::backend(&self.name, format!("object '{id}' not found")))
        }
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut objects = self.objects.lock().unwrap();
        let before = objects.len();
        objects.retain(|o| o.id != id);
        if objects.len() == before {
            return Err(Error::backend(&self.name, format!("object '{id}' not found")));
        }
        Ok(())
    }

    async fn list(&self, params: ListParams) -> Result<APIObjectList> {
        let call_number = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_call == Some(call_number) {
            return Err(Error::backend(&self.name, "simulated backend failure"));
        }

        let start: usize = if params.continue_token.is_empty() {
            0
        } else {
            params
                .continue_token
                .parse()
                .map_err(|_| Error::backend(&self.name, "invalid backend cursor"))?
        };

        let objects = self.objects.lock().unwrap();
        let end = (start + self.page_size).min(objects.len());
        let page: Vec<APIObject> = if start >= objects.len() {
            Vec::new()
        } else {
            objects[start..end].to_vec()
        };

        let continue_token = if end < objects.len() {
            end.to_string()
        } else {
            String::new()
        };

        Ok(APIObjectList {
            objects: page,
            revision: self.revision.clone(),
            continue_token,
        })
    }

    async fn watch(
        &self,
        _request: WatchRequest,
        cancel: CancellationToken,
    ) -> Result<BoxStream<'static, Result<WatchEvent>>> {
        if self.watch_open_error {
            return Err(Error::backend(&self.name, "failed to open watch"));
        }
        let events: VecDeque<Result<WatchEvent>> = self.watch_events.clone().into();
        let s = stream::unfold((events, cancel), |(mut events, cancel)| async move {
            if cancel.is_cancelled() {
                return None;
            }
            let event = events.pop_front()?;
            Some((event, (events, cancel)))
        });
        Ok(s.boxed())
    }
}

/// A `Partitioner` over a fixed, ordered set of in-memory partitions.
///
/// `lookup` always resolves to the first partition (point operations are not
/// this crate's focus); `all` returns every partition in construction order,
/// which is the order the lister anchors resumption on.
pub struct StaticPartitioner {
    partitions: Vec<Partition>,
    stores: Vec<Arc<dyn PartitionStore>>,
}

impl StaticPartitioner {
    /// Build a partitioner from `(partition, store)` pairs, in order.
    pub fn new(entries: Vec<(Partition, Arc<dyn PartitionStore>)>) -> Self {
        let (partitions, stores) = entries.into_iter().unzip();
        Self { partitions, stores }
    }
}

#[async_trait]
impl Partitioner for StaticPartitioner {
    async fn lookup(&self, _verb: &str, _id: &str) -> Result<Partition> {
        self.partitions
            .first()
            .cloned()
            .ok_or_else(|| Error::partitioner("no partitions configured"))
    }

    async fn all(&self, _verb: &str, _id: &str) -> Result<Vec<Partition>> {
        Ok(self.partitions.clone())
    }

    async fn store(&self, partition: &Partition) -> Result<Arc<dyn PartitionStore>> {
        self.partitions
            .iter()
            .position(|p| p == partition)
            .map(|i| self.stores[i].clone())
            .ok_or_else(|| Error::partitioner(format!("unknown partition '{}'", partition.name)))
    }
}
