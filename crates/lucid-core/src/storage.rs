//! Key/value persistence collaborator trait.

use crate::error::Result;
use async_trait::async_trait;

/// An async string-keyed get/set/remove persistence primitive.
///
/// Stores JSON-serialized collections under fixed keys (see
/// [`crate::record::keys`]). The persisted JSON shape is whatever the
/// record types serialize to and is not a compatibility contract.
///
/// Each call is conceptually atomic - implementations must never expose a
/// partially written value to a subsequent `get`.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Removes every key in `keys` as one batched operation.
    ///
    /// Used at identity-change boundaries, where the wipe must cover the
    /// complete known-key set.
    async fn remove_many(&self, keys: &[&str]) -> Result<()>;
}
