//! Sync configuration types.
//!
//! One explicit configuration struct, resolved once at startup by the
//! infrastructure loader. Components receive it by reference at
//! construction time; nothing re-queries configuration ad hoc.

use serde::{Deserialize, Serialize};

/// Default remote backend base URL.
pub const DEFAULT_REMOTE_URL: &str = "https://api.lucid-app.dev";

/// Configuration for the reconciliation core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Base URL of the remote backend, without a trailing slash.
    #[serde(default = "default_remote_base_url")]
    pub remote_base_url: String,
    /// Bound applied to each remote request, so a hung connection cannot
    /// pin a background task indefinitely.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// How long a reachability answer may be served from cache.
    #[serde(default = "default_online_probe_ttl_secs")]
    pub online_probe_ttl_secs: u64,
}

fn default_remote_base_url() -> String {
    DEFAULT_REMOTE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_online_probe_ttl_secs() -> u64 {
    5
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            remote_base_url: default_remote_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            online_probe_ttl_secs: default_online_probe_ttl_secs(),
        }
    }
}
