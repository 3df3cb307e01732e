//! User settings singleton.

use serde::{Deserialize, Serialize};

/// Small per-user settings kept in the local store.
///
/// Local-only: settings are never mirrored to the remote backend and have
/// no outbox kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Whether derived-tag analysis is enabled for new entries.
    #[serde(default = "default_analysis_enabled")]
    pub analysis_enabled: bool,
    /// Local hour (0-23) of the journaling reminder, if any.
    #[serde(default)]
    pub reminder_hour: Option<u8>,
}

fn default_analysis_enabled() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            analysis_enabled: default_analysis_enabled(),
            reminder_hour: None,
        }
    }
}
