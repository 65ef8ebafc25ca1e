//! Error types for the partition aggregation layer
//!
//! This module defines the error hierarchy used across the crate.
//! All public APIs return `Result<T, Error>` where `Error` is defined here.

use thiserror::Error;

/// The main error type for the aggregator.
///
/// Variants map directly onto the error kinds a caller needs to distinguish:
/// a malformed continue token is a client error, a partitioner failure
/// propagates verbatim, a backend failure is the terminal error of a list
/// session, and cancellation is reported distinctly from both.
#[derive(Error, Debug, Clone)]
pub enum Error {
    // ========================================================================
    // Continue-token errors
    // ========================================================================
    #[error("malformed continue token: {message}")]
    MalformedToken { message: String },

    // ========================================================================
    // Partitioner errors
    // ========================================================================
    #[error("partitioner error: {message}")]
    Partitioner { message: String },

    // ========================================================================
    // Backend errors
    // ========================================================================
    #[error("backend error in partition '{partition}': {message}")]
    Backend { partition: String, message: String },

    // ========================================================================
    // Cancellation
    // ========================================================================
    #[error("operation cancelled")]
    Cancelled,

    // ========================================================================
    // Generic
    // ========================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a malformed-token error.
    pub fn malformed_token(message: impl Into<String>) -> Self {
        Self::MalformedToken {
            message: message.into(),
        }
    }

    /// Create a partitioner error.
    pub fn partitioner(message: impl Into<String>) -> Self {
        Self::Partitioner {
            message: message.into(),
        }
    }

    /// Create a backend error scoped to one partition.
    pub fn backend(partition: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            partition: partition.into(),
            message: message.into(),
        }
    }

    /// True if this error represents the caller's context being cancelled
    /// rather than a genuine backend or partitioner failure. A
    /// semaphore-acquire failure is only possible on cancellation, so it is
    /// folded into this same check.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// True if this is a client-class error (the caller should get a
    /// 400-class response), as opposed to a server-class backend failure.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::MalformedToken { .. })
    }
}

/// Result type alias for the aggregator.
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, message: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Other(format!("{}: {e}", message.into())))
    }
}
