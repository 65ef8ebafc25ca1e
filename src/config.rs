//! Aggregator configuration: the knobs the embedder sets once at startup.
//!
//! Everything here is deployment policy (concurrency bound, default page
//! size); the aggregator's behavior given a config is otherwise fully
//! determined by the continue-token protocol.

use serde::{Deserialize, Serialize};

/// Top-level configuration for an `AggregatingStore`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatorConfig {
    /// Concurrency bound `C`: at most this many partition `list`/`watch`
    /// calls run in flight at once within a single session.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Page size used when a caller's `limit` query parameter is missing,
    /// non-numeric, or `<= 0`.
    #[serde(default = "default_limit")]
    pub default_limit: u64,

    /// HTTP server bind address, for the `serve` CLI command.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            default_limit: default_limit(),
            listen_addr: default_listen_addr(),
        }
    }
}

fn default_concurrency() -> usize {
    3
}

fn default_limit() -> u64 {
    crate::lister::DEFAULT_LIMIT
}

fn default_listen_addr() -> String {
    "127.0.0.1:8080".to_string()
}

impl AggregatorConfig {
    /// Parse a config from a JSON string, falling back to defaults for any
    /// field that's absent.
    pub fn from_json(raw: &str) -> crate::error::Result<Self> {
        serde_json::from_str(raw)
            .map_err(|e| crate::error::Error::Other(format!("invalid config: {e}")))
    }

    /// Resolve an effective page limit from a caller-supplied value: missing
    /// or `<= 0` falls back to the configured default.
    pub fn effective_limit(&self, requested: Option<u64>) -> u64 {
        match requested {
            Some(limit) if limit > 0 => limit,
            _ => self.default_limit,
        }
    }
}
