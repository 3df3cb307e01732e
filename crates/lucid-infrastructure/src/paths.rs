//! Unified path management for Lucid on-device data.
//!
//! This ensures consistency across all platforms (Linux, macOS, Windows).

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Unified path management for Lucid.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/lucid/             # Config directory
/// └── config.toml              # Sync configuration
///
/// ~/.local/share/lucid/        # Data directory
/// └── store/                   # JSON key/value store (one file per key)
/// ```
pub struct LucidPaths;

impl LucidPaths {
    /// Returns the Lucid configuration directory.
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join("lucid"))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the Lucid data directory.
    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join("lucid"))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the directory backing the JSON key/value store.
    pub fn store_dir() -> Result<PathBuf, PathError> {
        Ok(Self::data_dir()?.join("store"))
    }
}
