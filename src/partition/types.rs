//! Partition types and the external store/partitioner contracts.
//!
//! `Partitioner` and `PartitionStore` are the embedder-supplied collaborators:
//! this crate only depends on the trait shape, never on a concrete backend.

use crate::error::Result;
use crate::types::{APIObject, APIObjectList};
use async_trait::async_trait;
use futures::stream::BoxStream;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// An opaque handle identifying one backing store.
///
/// Two partitions within the same `Partitioner::all` response must have
/// distinct names; order within that list is significant because it defines
/// emission order and resumption anchoring.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Partition {
    /// Stable name for this partition, e.g. a namespace or tenant id.
    pub name: String,
}

impl Partition {
    /// Construct a partition handle.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Parameters passed into a single per-partition `list` call.
///
/// Mirrors the three query parameters the aggregator sets on the cloned
/// request before delegating to a partition's store.
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    /// Backend cursor to resume within this partition's own pagination.
    pub continue_token: String,
    /// Snapshot revision to pin this call to; empty on the first call of a session.
    pub revision: String,
    /// Page size. The embedder treats `limit == 0` as "unbounded".
    pub limit: u64,
}

/// A single event observed on a partition's watch stream.
#[derive(Debug, Clone)]
pub struct WatchEvent {
    /// Partition the event originated from.
    pub partition: String,
    /// The affected object.
    pub object: APIObject,
}

/// A watch request, scoped optionally to a single object id.
#[derive(Debug, Clone, Default)]
pub struct WatchRequest {
    /// Object id to watch, or empty to watch the whole partition.
    pub id: String,
}

/// The per-partition backing store contract.
///
/// Not specified by this crate: supplied by the embedder for each partition a
/// `Partitioner` resolves a backend for.
#[async_trait]
pub trait PartitionStore: Send + Sync {
    /// Fetch a single object by id.
    async fn get_by_id(&self, id: &str) -> Result<APIObject>;

    /// Create a new object.
    async fn create(&self, object: APIObject) -> Result<APIObject>;

    /// Update an existing object.
    async fn update(&self, id: &str, object: APIObject) -> Result<APIObject>;

    /// Delete an object by id.
    async fn delete(&self, id: &str) -> Result<()>;

    /// List one page of this partition's objects, honoring `params`.
    async fn list(&self, params: ListParams) -> Result<APIObjectList>;

    /// Open a watch stream, honoring `cancel` for cooperative shutdown.
    async fn watch(
        &self,
        request: WatchRequest,
        cancel: CancellationToken,
    ) -> Result<BoxStream<'static, Result<WatchEvent>>>;
}

/// Resolves requests to partitions and materializes their backing stores.
#[async_trait]
pub trait Partitioner: Send + Sync {
    /// Resolve the single partition relevant to a point operation.
    /// Must be deterministic for a given `(verb, id)`.
    async fn lookup(&self, verb: &str, id: &str) -> Result<Partition>;

    /// Resolve the ordered list of all partitions the caller may see for a
    /// list/watch operation. Order is part of the external contract: continue
    /// tokens reference partitions by name and anchor on this order.
    async fn all(&self, verb: &str, id: &str) -> Result<Vec<Partition>>;

    /// Materialize the backing store client for one partition.
    async fn store(&self, partition: &Partition) -> Result<Arc<dyn PartitionStore>>;
}
