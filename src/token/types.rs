//! The resumption record carried inside a continue token.

use serde::{Deserialize, Serialize};

fn is_zero(n: &u64) -> bool {
    *n == 0
}

/// Server-side resumption state, encoded opaquely into the continue token
/// exchanged with clients.
///
/// Field names are serialized under short keys (`r`, `p`, `o`, `c`, `l`) so
/// the wire encoding stays compact; this framing is stable across versions of
/// this crate and must not change without a migration plan, since clients
/// round-trip the token unmodified across requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListState {
    /// Backend revision pinning the rest of this session's partition lists.
    #[serde(rename = "r", default, skip_serializing_if = "String::is_empty")]
    pub revision: String,

    /// Partition emission was cut off in.
    #[serde(rename = "p", default, skip_serializing_if = "String::is_empty")]
    pub partition_name: String,

    /// Items already delivered from `partition_name` in prior pages.
    #[serde(rename = "o", default, skip_serializing_if = "is_zero")]
    pub offset: u64,

    /// Opaque backend-level cursor for resuming within `partition_name`.
    #[serde(rename = "c", default, skip_serializing_if = "String::is_empty")]
    pub continue_token: String,

    /// Caller-chosen page size, pinned for the lifetime of the session.
    #[serde(rename = "l", default, skip_serializing_if = "is_zero")]
    pub limit: u64,
}

impl ListState {
    /// True if this is the zero value (the initial, unresumed request).
    pub fn is_zero(&self) -> bool {
        *self == ListState::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_value_is_default() {
        assert!(ListState::default().is_zero());
        let mut s = ListState::default();
        s.offset = 1;
        assert!(!s.is_zero());
    }
}
