//! Remote backend transport contract.
//!
//! The reconciliation core depends only on this four-verb, per-record-kind
//! contract, not on any particular transport. The production implementation
//! lives in the infrastructure crate.

use crate::error::Result;
use crate::identity::{AuthSession, Principal};
use crate::record::StoredRecord;
use async_trait::async_trait;

/// A remote record together with its owner, as reported by the backend.
///
/// The owner accompanies every fetched record so the gateway can verify
/// ownership before an update-by-id write.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteRecord<R> {
    pub owner: Principal,
    pub record: R,
}

/// Outcome of a best-effort remote write.
///
/// Gateway writes never raise; callers running in a background context
/// branch on this instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The backend confirmed the write.
    Persisted,
    /// No principal could be resolved; the write was skipped. Normal state,
    /// not a failure.
    Unavailable,
    /// The existing remote record belongs to a different principal; the
    /// write was dropped.
    Rejected,
    /// The call failed (network or server error); the write may be retried.
    Failed,
}

impl WriteOutcome {
    pub fn is_persisted(self) -> bool {
        matches!(self, Self::Persisted)
    }
}

/// Per-record-kind list/get/upsert/delete operations against the remote
/// backend, scoped to the authenticated principal.
#[async_trait]
pub trait RemoteApi<R: StoredRecord>: Send + Sync {
    /// Lists the principal's records.
    async fn list(&self, session: &AuthSession) -> Result<Vec<RemoteRecord<R>>>;

    /// Fetches a single record by id, with owner metadata. `Ok(None)` when
    /// the backend has no record under this id.
    async fn get(&self, session: &AuthSession, id: &str) -> Result<Option<RemoteRecord<R>>>;

    /// Creates or replaces the record under its id.
    async fn upsert(&self, session: &AuthSession, record: &R) -> Result<()>;

    /// Deletes the record under `id`. Deleting an absent id is not an
    /// error.
    async fn delete(&self, session: &AuthSession, id: &str) -> Result<()>;
}
