//! In-memory key/value store.
//!
//! Backs unit tests and in-memory embeddings of the reconciliation core.

use async_trait::async_trait;
use lucid_core::error::Result;
use lucid_core::storage::KeyValueStore;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// HashMap-backed implementation of [`KeyValueStore`].
#[derive(Default)]
pub struct MemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.remove(key);
        Ok(())
    }

    async fn remove_many(&self, keys: &[&str]) -> Result<()> {
        let mut entries = self.entries.write().await;
        for key in keys {
            entries.remove(*key);
        }
        Ok(())
    }
}
