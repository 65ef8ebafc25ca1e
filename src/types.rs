//! Common wire types shared across the aggregator.

use serde::{Deserialize, Serialize};

/// A single object as it crosses the wire.
///
/// The resource schema itself is an external collaborator out of scope for
/// this crate, which only needs enough structure to preserve identity,
/// origin partition, and an opaque payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct APIObject {
    /// Object identifier, unique within its partition.
    pub id: String,
    /// Name of the partition this object was read from.
    pub partition: String,
    /// Opaque resource payload.
    pub data: serde_json::Value,
}

impl APIObject {
    /// Construct an object for a given partition.
    pub fn new(id: impl Into<String>, partition: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            partition: partition.into(),
            data,
        }
    }
}

/// The wire shape of a list response: `{objects, revision, continue}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct APIObjectList {
    /// Objects returned by this page, in emission order.
    pub objects: Vec<APIObject>,
    /// Backend revision pinned for this list session.
    pub revision: String,
    /// Opaque, encoded `ListState` continuation; empty string means no more pages.
    #[serde(rename = "continue")]
    pub continue_token: String,
}

impl APIObjectList {
    /// Construct a terminal (non-truncated) list result.
    pub fn new(objects: Vec<APIObject>, revision: impl Into<String>) -> Self {
        Self {
            objects,
            revision: revision.into(),
            continue_token: String::new(),
        }
    }

    /// True if the client must issue a follow-up request to see more data.
    pub fn has_more(&self) -> bool {
        !self.continue_token.is_empty()
    }
}
