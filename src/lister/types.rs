//! Types shared between the scheduler and the per-partition task.

use crate::error::Error;
use crate::types::APIObject;

/// Default page size when the caller supplies `limit <= 0`.
pub const DEFAULT_LIMIT: u64 = 100_000;

/// Bound on the number of in-flight batches buffered between the lister and
/// its consumer before `send` starts applying backpressure.
pub(crate) const CHANNEL_BUFFER: usize = 16;

/// One partition's contribution to a page, in emission order.
#[derive(Debug, Clone, PartialEq)]
pub struct ListBatch {
    /// Partition this batch was emitted from.
    pub partition: String,
    /// Objects in this batch.
    pub objects: Vec<APIObject>,
}

/// What the lister reports once every scheduled partition task has returned.
#[derive(Debug, Clone)]
pub struct ListOutcome {
    /// Pinned session revision; empty if no partition ever returned successfully.
    pub revision: String,
    /// Encoded terminal `ListState`, or the empty string if none was set.
    pub continue_token: String,
    /// First non-cancellation error observed, else the cancellation error, else `None`.
    pub error: Option<Error>,
}

/// Local, per-task view of where to resume within one partition.
#[derive(Debug, Clone)]
pub(crate) struct LocalState {
    pub continue_token: String,
    pub revision: String,
    /// True only for the one partition named by the caller's resumption
    /// anchor, and only until its first loop iteration consumes `anchor_offset`.
    pub is_anchor: bool,
    pub anchor_offset: u64,
}
