//! The Aggregating Store: a thin façade routing point operations to a single
//! resolved partition and delegating `list`/`watch` to the concurrent core.

mod watch;

pub use watch::multiplex;

use crate::error::Result;
use crate::lister::PartitionLister;
use crate::partition::{Partitioner, WatchEvent, WatchRequest};
use crate::token;
use crate::types::{APIObject, APIObjectList};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

/// Routes `get/create/update/delete` to a single partitioner-resolved
/// backend, and `list`/`watch` across every partition the caller may see.
pub struct AggregatingStore {
    partitioner: Arc<dyn Partitioner>,
    lister: PartitionLister,
}

impl AggregatingStore {
    /// Build a store over `partitioner`, bounding list concurrency at `concurrency`.
    pub fn new(partitioner: Arc<dyn Partitioner>, concurrency: usize) -> Self {
        Self {
            partitioner,
            lister: PartitionLister::new(concurrency),
        }
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: &str) -> Result<APIObject> {
        let partition = self.partitioner.lookup("get", id).await?;
        let store = self.partitioner.store(&partition).await?;
        store.get_by_id(id).await
    }

    #[instrument(skip(self, object))]
    pub async fn create(&self, object: APIObject) -> Result<APIObject> {
        let partition = self.partitioner.lookup("create", "").await?;
        let store = self.partitioner.store(&partition).await?;
        store.create(object).await
    }

    #[instrument(skip(self, object))]
    pub async fn update(&self, id: &str, object: APIObject) -> Result<APIObject> {
        let partition = self.partitioner.lookup("update", id).await?;
        let store = self.partitioner.store(&partition).await?;
        store.update(id, object).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<()> {
        let partition = self.partitioner.lookup("delete", id).await?;
        let store = self.partitioner.store(&partition).await?;
        store.delete(id).await
    }

    /// Resolve every partition the caller may see, run one parallel list
    /// session across them, and collect the result into a single wire page.
    ///
    /// Any terminal error from the lister is returned here and the batches
    /// already received in-process are discarded; an embedder that needs
    /// partial batches retained across a terminal error should drive
    /// `PartitionLister` directly instead of this façade.
    #[instrument(skip(self, cancel), fields(limit = limit))]
    pub async fn list(
        &self,
        continue_token: &str,
        limit: u64,
        cancel: CancellationToken,
    ) -> Result<APIObjectList> {
        let state = token::decode(continue_token)?;
        let resolved = self.resolve_all("list", "").await?;

        let (mut rx, outcome_rx) = self.lister.list(resolved, state, limit, cancel);
        let mut objects = Vec::new();
        while let Some(batch) = rx.recv().await {
            objects.extend(batch.objects);
        }

        let outcome = outcome_rx
            .await
            .map_err(|_| crate::error::Error::Cancelled)?;
        if let Some(error) = outcome.error {
            return Err(error);
        }
        Ok(APIObjectList {
            objects,
            revision: outcome.revision,
            continue_token: outcome.continue_token,
        })
    }

    /// Resolve every partition the caller may see and open a watch against
    /// each, multiplexed into one event stream.
    #[instrument(skip(self, cancel))]
    pub async fn watch(
        &self,
        request: WatchRequest,
        cancel: CancellationToken,
    ) -> Result<mpsc::Receiver<Result<WatchEvent>>> {
        let resolved = self.resolve_all("watch", &request.id).await?;
        watch::multiplex(resolved, request, cancel).await
    }

    async fn resolve_all(
        &self,
        verb: &str,
        id: &str,
    ) -> Result<Vec<(crate::partition::Partition, Arc<dyn crate::partition::PartitionStore>)>> {
        let partitions = self.partitioner.all(verb, id).await?;
        let mut resolved = Vec::with_capacity(partitions.len());
        for partition in partitions {
            let store = self.partitioner.store(&partition).await?;
            resolved.push((partition, store));
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests;
