//! The parallel partition lister.

mod engine;
mod shared;
mod types;

pub use engine::PartitionLister;
pub use types::{ListBatch, ListOutcome, DEFAULT_LIMIT};

#[cfg(test)]
mod tests;
