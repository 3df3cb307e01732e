//! File-backed JSON key/value store.
//!
//! One file per key under a base directory (`<key>.json`). Writes go
//! through a temporary file followed by an atomic rename with an explicit
//! fsync, so a crash mid-write never leaves a torn value behind.

use crate::paths::LucidPaths;
use anyhow::{Context, Result as AnyResult};
use async_trait::async_trait;
use lucid_core::error::Result;
use lucid_core::storage::KeyValueStore;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// JSON file-per-key implementation of [`KeyValueStore`].
pub struct JsonFileStore {
    base_dir: PathBuf,
}

impl JsonFileStore {
    /// Creates a store rooted at `base_dir`, creating the directory if
    /// needed.
    pub async fn new(base_dir: impl AsRef<Path>) -> AnyResult<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)
            .await
            .context("Failed to create store directory")?;
        Ok(Self { base_dir })
    }

    /// Creates a store at the default on-device location
    /// (`~/.local/share/lucid/store`).
    pub async fn default_location() -> AnyResult<Self> {
        let base_dir = LucidPaths::store_dir()
            .map_err(|e| anyhow::anyhow!("Failed to resolve store directory: {}", e))?;
        Self::new(base_dir).await
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{key}.json"))
    }

    fn tmp_path_for(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{key}.json.tmp"))
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)).await {
            Ok(content) if content.trim().is_empty() => Ok(None),
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let tmp = self.tmp_path_for(key);
        let mut file = fs::File::create(&tmp).await?;
        file.write_all(value.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(&tmp, self.path_for(key)).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn remove_many(&self, keys: &[&str]) -> Result<()> {
        // Attempt every key even if one fails, then report the first error.
        let mut first_error = None;
        for key in keys {
            if let Err(e) = self.remove(key).await {
                tracing::warn!(key, error = %e, "failed to remove store key");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_set_then_get_returns_value() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path()).await.unwrap();

        store.set("journal_entries", r#"[{"id":"a"}]"#).await.unwrap();
        let loaded = store.get("journal_entries").await.unwrap();
        assert_eq!(loaded.as_deref(), Some(r#"[{"id":"a"}]"#));
    }

    #[tokio::test]
    async fn test_get_missing_key_is_none() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path()).await.unwrap();
        assert_eq!(store.get("draft").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_replaces_previous_value() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path()).await.unwrap();

        store.set("settings", "{\"a\":1}").await.unwrap();
        store.set("settings", "{\"a\":2}").await.unwrap();
        assert_eq!(store.get("settings").await.unwrap().as_deref(), Some("{\"a\":2}"));
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path()).await.unwrap();

        store.set("draft", "{}").await.unwrap();
        store.remove("draft").await.unwrap();
        store.remove("draft").await.unwrap();
        assert_eq!(store.get("draft").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_remove_many_clears_all_keys() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path()).await.unwrap();

        store.set("journal_entries", "[]").await.unwrap();
        store.set("draft", "{}").await.unwrap();
        store
            .remove_many(&["journal_entries", "draft", "never_written"])
            .await
            .unwrap();

        assert_eq!(store.get("journal_entries").await.unwrap(), None);
        assert_eq!(store.get("draft").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_no_tmp_file_left_behind_after_set() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path()).await.unwrap();

        store.set("journal_entries", "[]").await.unwrap();
        assert!(!dir.path().join("journal_entries.json.tmp").exists());
        assert!(dir.path().join("journal_entries.json").exists());
    }
}
