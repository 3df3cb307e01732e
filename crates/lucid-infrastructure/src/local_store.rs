//! Durable local store over the key/value persistence primitive.
//!
//! Pure CRUD over the on-device copy of each record collection - no merge
//! logic lives here. Read paths degrade to an empty result when the backing
//! primitive fails (a temporarily unavailable store is a valid state, not a
//! fatal one); write paths surface errors to the caller.
//!
//! All read-modify-write cycles on a collection are serialized through that
//! store's write mutex. Two concurrent saves of different ids would
//! otherwise race on the shared list and silently drop one write.

use lucid_core::error::Result;
use lucid_core::record::{StoredRecord, keys};
use lucid_core::storage::KeyValueStore;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Local store for one record kind, persisted as a JSON list under the
/// kind's storage key.
pub struct RecordStore<R: StoredRecord> {
    kv: Arc<dyn KeyValueStore>,
    write_lock: Mutex<()>,
    _marker: PhantomData<fn() -> R>,
}

impl<R: StoredRecord> RecordStore<R> {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            write_lock: Mutex::new(()),
            _marker: PhantomData,
        }
    }

    /// Returns the full collection in its natural read order.
    ///
    /// Degrades to an empty list if the backing store fails.
    pub async fn get(&self) -> Vec<R> {
        self.load().await.unwrap_or_else(|e| {
            tracing::warn!(kind = R::KIND, error = %e, "local read failed, serving empty collection");
            Vec::new()
        })
    }

    /// Returns the record with the given id, if present locally.
    pub async fn get_by_id(&self, id: &str) -> Option<R> {
        self.get().await.into_iter().find(|r| r.id() == id)
    }

    /// Upserts one record by id: replaces the existing record or appends.
    ///
    /// The collection is re-sorted into its natural read order before
    /// persisting, so repeated reads return stably ordered data.
    pub async fn save(&self, record: &R) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load_or_empty().await;
        match records.iter_mut().find(|r| r.id() == record.id()) {
            Some(existing) => *existing = record.clone(),
            None => records.push(record.clone()),
        }
        R::sort_for_read(&mut records);
        self.persist(&records).await
    }

    /// Replaces the whole collection. Used after a merge pass.
    pub async fn save_all(&self, mut records: Vec<R>) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        R::sort_for_read(&mut records);
        self.persist(&records).await
    }

    /// Removes the record with the given id, if present.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load_or_empty().await;
        records.retain(|r| r.id() != id);
        self.persist(&records).await
    }

    async fn load(&self) -> Result<Vec<R>> {
        match self.kv.get(R::STORAGE_KEY).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    async fn load_or_empty(&self) -> Vec<R> {
        self.load().await.unwrap_or_else(|e| {
            tracing::warn!(kind = R::KIND, error = %e, "local read failed, treating store as empty");
            Vec::new()
        })
    }

    async fn persist(&self, records: &[R]) -> Result<()> {
        let raw = serde_json::to_string(records)?;
        self.kv.set(R::STORAGE_KEY, &raw).await
    }
}

/// Local store for a record that exists at most once (draft, settings).
///
/// Singleton by key, not by list.
pub struct SingletonStore<T> {
    kv: Arc<dyn KeyValueStore>,
    key: &'static str,
    write_lock: Mutex<()>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> SingletonStore<T>
where
    T: Clone + Send + Sync + Serialize + DeserializeOwned,
{
    pub fn new(kv: Arc<dyn KeyValueStore>, key: &'static str) -> Self {
        Self {
            kv,
            key,
            write_lock: Mutex::new(()),
            _marker: PhantomData,
        }
    }

    /// Returns the stored value, or `None` when absent or unreadable.
    pub async fn get(&self) -> Option<T> {
        let raw = match self.kv.get(self.key).await {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(key = self.key, error = %e, "local read failed, serving none");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key = self.key, error = %e, "stored value unreadable, serving none");
                None
            }
        }
    }

    /// Stores the value, replacing any previous one.
    pub async fn set(&self, value: &T) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let raw = serde_json::to_string(value)?;
        self.kv.set(self.key, &raw).await
    }

    /// Removes the value.
    pub async fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.kv.remove(self.key).await
    }
}

/// Wipes every key the core owns, as one batched removal.
///
/// Used at identity-change boundaries; the wipe covers record collections,
/// outboxes, the draft, settings, and the stored principal.
pub async fn clear_all(kv: &dyn KeyValueStore) -> Result<()> {
    kv.remove_many(&keys::ALL).await
}
