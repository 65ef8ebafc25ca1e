//! Partition resolution module
//!
//! # Overview
//!
//! A resource type's instances are physically distributed across many
//! backing partitions (one per namespace, one per tenant, etc). This module
//! defines the `Partition` handle and the `Partitioner`/`PartitionStore`
//! contracts an embedder implements to tell the aggregator which partitions
//! exist and how to reach them.

mod types;

pub use types::{ListParams, Partition, PartitionStore, Partitioner, WatchEvent, WatchRequest};
