//! Aggregator state shared across partition tasks.
//!
//! The only shared mutable state within the lister is the pinned revision,
//! the capacity counter, and the terminal `ListState`/error. All three are
//! read and written only while a task holds its emission turn, so a plain
//! mutex is the serialization device rather than relying on channel
//! happens-before alone.

use crate::error::Error;
use crate::token::ListState;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

pub(crate) struct Shared {
    capacity: Mutex<i64>,
    revision: Mutex<Option<String>>,
    terminal_state: Mutex<Option<ListState>>,
    first_error: Mutex<Option<Error>>,
    cancelled: AtomicBool,
    cancel: CancellationToken,
}

impl Shared {
    pub fn new(limit: i64, cancel: CancellationToken) -> Self {
        Self {
            capacity: Mutex::new(limit),
            revision: Mutex::new(None),
            terminal_state: Mutex::new(None),
            first_error: Mutex::new(None),
            cancelled: AtomicBool::new(false),
            cancel,
        }
    }

    pub fn capacity(&self) -> i64 {
        *self.capacity.lock().unwrap()
    }

    pub fn set_capacity(&self, value: i64) {
        *self.capacity.lock().unwrap() = value;
    }

    pub fn decrement_capacity(&self, by: i64) {
        let mut capacity = self.capacity.lock().unwrap();
        *capacity -= by;
    }

    pub fn revision_pinned(&self) -> bool {
        self.revision.lock().unwrap().is_some()
    }

    /// Pin the session revision if unset; returns the now-pinned value.
    pub fn pin_revision_if_unset(&self, revision: &str) -> String {
        let mut slot = self.revision.lock().unwrap();
        if slot.is_none() {
            *slot = Some(revision.to_string());
        }
        slot.clone().unwrap()
    }

    pub fn revision(&self) -> String {
        self.revision.lock().unwrap().clone().unwrap_or_default()
    }

    pub fn terminal_state_is_set(&self) -> bool {
        self.terminal_state.lock().unwrap().is_some()
    }

    /// First writer wins; later writers are no-ops (they should have already
    /// observed `terminal_state_is_set` at step 3 and stopped).
    pub fn set_terminal_state(&self, state: ListState) {
        let mut slot = self.terminal_state.lock().unwrap();
        if slot.is_none() {
            *slot = Some(state);
        }
    }

    pub fn terminal_state(&self) -> Option<ListState> {
        self.terminal_state.lock().unwrap().clone()
    }

    /// Record an error. Non-cancellation errors also trip the shared
    /// cancellation token so siblings stop promptly; the first such error
    /// wins for terminal reporting regardless of arrival order.
    pub fn record_error(&self, error: Error) {
        if error.is_cancelled() {
            self.cancelled.store(true, Ordering::SeqCst);
            return;
        }
        let mut slot = self.first_error.lock().unwrap();
        if slot.is_none() {
            *slot = Some(error);
        }
        drop(slot);
        self.cancel.cancel();
    }

    pub fn has_error(&self) -> bool {
        self.first_error.lock().unwrap().is_some() || self.cancelled.load(Ordering::SeqCst)
    }

    /// Terminal error: first non-cancellation error, else cancellation if
    /// observed, else none.
    pub fn final_error(&self) -> Option<Error> {
        if let Some(error) = self.first_error.lock().unwrap().clone() {
            return Some(error);
        }
        if self.cancelled.load(Ordering::SeqCst) {
            return Some(Error::Cancelled);
        }
        None
    }
}
