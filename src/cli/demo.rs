//! A small in-memory partition set used by the CLI when no real backend is
//! wired in. Exercises the aggregator end-to-end without external services.

use crate::memstore::{MemoryPartitionStore, StaticPartitioner};
use crate::partition::{Partition, PartitionStore};
use crate::types::APIObject;
use std::sync::Arc;

/// Build a demo `Partitioner` over three namespaces with a handful of
/// objects each.
pub fn partitioner() -> StaticPartitioner {
    let namespaces = [("ns-a", 3), ("ns-b", 2), ("ns-c", 4)];
    let entries = namespaces
        .iter()
        .map(|(name, count)| {
            let objects: Vec<APIObject> = (1..=*count)
                .map(|i| APIObject::new(format!("{name}-obj-{i}"), *name, serde_json::json!({"n": i})))
                .collect();
            let store: Arc<dyn PartitionStore> = Arc::new(MemoryPartitionStore::new(*name, "1", objects));
            (Partition::new(*name), store)
        })
        .collect();
    StaticPartitioner::new(entries)
}
