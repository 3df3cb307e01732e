//! Unsynced-write outbox.
//!
//! A record's membership here means "this id's locally-known state has not
//! been confirmed written remotely". The outbox holds full record payloads,
//! not just ids, so a later sync pass can replay the exact last-known-good
//! local value even after the object that triggered the save is gone.
//!
//! Membership is removed only on confirmed remote-write success - never on
//! failure - so pending writes naturally retry on the next pass.

use lucid_core::error::Result;
use lucid_core::record::StoredRecord;
use lucid_core::storage::KeyValueStore;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Pending-write set for one record kind, persisted under the kind's
/// outbox key.
pub struct Outbox<R: StoredRecord> {
    kv: Arc<dyn KeyValueStore>,
    write_lock: Mutex<()>,
    _marker: PhantomData<fn() -> R>,
}

impl<R: StoredRecord> Outbox<R> {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            write_lock: Mutex::new(()),
            _marker: PhantomData,
        }
    }

    /// Returns the pending records. Degrades to empty if the backing store
    /// fails.
    pub async fn list(&self) -> Vec<R> {
        self.load().await.unwrap_or_else(|e| {
            tracing::warn!(kind = R::KIND, error = %e, "outbox read failed, serving empty set");
            Vec::new()
        })
    }

    /// Enqueues a record, replacing any pending payload under the same id.
    ///
    /// At most one membership exists per id.
    pub async fn add(&self, record: &R) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut pending = self.load().await.unwrap_or_default();
        match pending.iter_mut().find(|r| r.id() == record.id()) {
            Some(existing) => *existing = record.clone(),
            None => pending.push(record.clone()),
        }
        self.persist(&pending).await
    }

    /// Removes the pending record with the given id, if present.
    pub async fn remove(&self, id: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut pending = self.load().await.unwrap_or_default();
        pending.retain(|r| r.id() != id);
        self.persist(&pending).await
    }

    /// Drops every pending record.
    pub async fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.kv.remove(R::OUTBOX_KEY).await
    }

    async fn load(&self) -> Result<Vec<R>> {
        match self.kv.get(R::OUTBOX_KEY).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    async fn persist(&self, pending: &[R]) -> Result<()> {
        let raw = serde_json::to_string(pending)?;
        self.kv.set(R::OUTBOX_KEY, &raw).await
    }
}
