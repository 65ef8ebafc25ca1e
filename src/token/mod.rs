//! Continue-token codec
//!
//! Bidirectional mapping between `ListState` (the resumption record) and an
//! opaque string exchanged with clients as a list response's `continue`
//! field. The exact framing must stay stable: changing it breaks existing
//! clients mid-session.

mod codec;
mod types;

pub use codec::{decode, encode};
pub use types::ListState;
