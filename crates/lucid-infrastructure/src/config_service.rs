//! Configuration loading.
//!
//! Resolves the [`SyncConfig`] once at startup. Precedence, highest first:
//!
//! 1. `LUCID_REMOTE_URL` / `LUCID_REQUEST_TIMEOUT_SECS` /
//!    `LUCID_ONLINE_PROBE_TTL_SECS` environment variables
//! 2. `~/.config/lucid/config.toml`
//! 3. Built-in defaults
//!
//! Components receive the resolved struct at construction time; nothing
//! re-queries configuration afterwards.

use crate::paths::LucidPaths;
use lucid_core::config::SyncConfig;
use std::env;
use std::fs;
use std::path::Path;

/// Loads and resolves the sync configuration.
pub struct ConfigService;

impl ConfigService {
    /// Resolves the configuration with the documented precedence.
    ///
    /// Never fails: an unreadable or unparsable file is logged and the
    /// remaining sources apply.
    pub fn load() -> SyncConfig {
        let config = match Self::load_from_default_file() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "config file unreadable, using defaults");
                SyncConfig::default()
            }
        };
        Self::apply_env(config)
    }

    fn load_from_default_file() -> Result<SyncConfig, String> {
        match LucidPaths::config_file() {
            Ok(path) => Self::load_from_file(&path),
            // No home directory means no file source; defaults apply.
            Err(_) => Ok(SyncConfig::default()),
        }
    }

    /// Loads configuration from a specific TOML file.
    ///
    /// A missing or empty file yields the defaults; a present but invalid
    /// file is an error.
    pub fn load_from_file(path: &Path) -> Result<SyncConfig, String> {
        if !path.exists() {
            return Ok(SyncConfig::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file at {:?}: {}", path, e))?;

        if content.trim().is_empty() {
            return Ok(SyncConfig::default());
        }

        toml::from_str(&content)
            .map_err(|e| format!("Failed to parse TOML from {:?}: {}", path, e))
    }

    fn apply_env(mut config: SyncConfig) -> SyncConfig {
        if let Ok(url) = env::var("LUCID_REMOTE_URL") {
            config.remote_base_url = url;
        }
        if let Some(secs) = Self::env_u64("LUCID_REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = secs;
        }
        if let Some(secs) = Self::env_u64("LUCID_ONLINE_PROBE_TTL_SECS") {
            config.online_probe_ttl_secs = secs;
        }
        config
    }

    fn env_u64(name: &str) -> Option<u64> {
        let raw = env::var(name).ok()?;
        match raw.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(name, "ignoring non-numeric environment override");
                None
            }
        }
    }
}
