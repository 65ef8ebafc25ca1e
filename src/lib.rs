#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Partition Lister
//!
//! A concurrent, order-preserving, resumable aggregator that combines
//! paginated per-partition list/watch streams from a partitioned
//! object-storage backend into a single paginated surface.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      AggregatingStore                           │
//! │   getByID/create/update/delete → Partitioner.Lookup + 1 store   │
//! │   list()  → Partitioner.All + PartitionLister                   │
//! │   watch() → Partitioner.All + watch multiplex                   │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────────┬───────────────┴───────────────┬──────────────────┐
//! │  Partitioner  │      PartitionLister          │   Continue-Token │
//! │  (embedder-   │  bounded concurrency, turn-   │   Codec          │
//! │   supplied)   │  chain emission order, global  │  (ListState <->  │
//! │               │  capacity, revision pinning    │   opaque string) │
//! └──────────────┴────────────────────────────────┴──────────────────┘
//! ```
//!
//! The per-partition backing store and the HTTP layer that drives this crate
//! are external collaborators; see [`partition::PartitionStore`] and
//! [`partition::Partitioner`] for the contracts this crate consumes.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the aggregator.
pub mod error;

/// Wire types shared across the aggregator (`APIObject`, `APIObjectList`).
pub mod types;

/// Partition, Partitioner, and PartitionStore: the embedder-supplied contracts.
pub mod partition;

/// The continue-token codec: `ListState` <-> opaque string.
pub mod token;

/// The parallel partition lister, the concurrent core.
pub mod lister;

/// The Aggregating Store façade and watch multiplex.
pub mod store;

/// Aggregator configuration.
pub mod config;

/// An in-memory `PartitionStore`/`Partitioner` test double, also used by the
/// CLI demo.
pub mod memstore;

/// Command-line interface.
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use lister::{ListBatch, ListOutcome, PartitionLister};
pub use store::AggregatingStore;
pub use token::ListState;
pub use types::{APIObject, APIObjectList};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
