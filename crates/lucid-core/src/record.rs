//! Storage binding for syncable record types.
//!
//! Every record kind that participates in local persistence and remote
//! reconciliation implements [`StoredRecord`], which ties the type to its
//! fixed storage keys, its remote collection path, and its identity and
//! freshness accessors.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Fixed keys used by the local key/value persistence primitive.
///
/// One key per record kind, one for the draft singleton, one for settings,
/// one per outbox kind, and one for the last-seen principal. `ALL` is the
/// complete set removed by an identity-change wipe.
pub mod keys {
    pub const JOURNAL_ENTRIES: &str = "journal_entries";
    pub const INTERPRETATIONS: &str = "interpretations";
    pub const DRAFT: &str = "draft";
    pub const SETTINGS: &str = "settings";
    pub const OUTBOX_JOURNAL_ENTRIES: &str = "outbox_journal_entries";
    pub const OUTBOX_INTERPRETATIONS: &str = "outbox_interpretations";
    pub const LAST_PRINCIPAL: &str = "last_principal";

    /// Every key the core owns in the backing store.
    pub const ALL: [&str; 7] = [
        JOURNAL_ENTRIES,
        INTERPRETATIONS,
        DRAFT,
        SETTINGS,
        OUTBOX_JOURNAL_ENTRIES,
        OUTBOX_INTERPRETATIONS,
        LAST_PRINCIPAL,
    ];
}

/// A record kind that is stored locally as a JSON collection and mirrored
/// to the remote backend.
///
/// Ids are caller-generated, opaque, and immutable once assigned.
pub trait StoredRecord:
    Clone + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// Short kind name used in log metadata.
    const KIND: &'static str;

    /// Key of the local collection in the key/value store.
    const STORAGE_KEY: &'static str;

    /// Key of this kind's outbox collection in the key/value store.
    const OUTBOX_KEY: &'static str;

    /// Remote collection path segment (e.g. `journal_entries` for
    /// `/v1/journal_entries`).
    const REMOTE_PATH: &'static str;

    /// The record's unique id.
    fn id(&self) -> &str;

    /// Last modification timestamp, used by the last-writer-wins merge.
    fn updated_at(&self) -> DateTime<Utc>;

    /// Re-orders a collection into its natural read order.
    ///
    /// The default keeps the stored order; kinds with a natural order
    /// (journal entries sort date-descending) override this.
    fn sort_for_read(_records: &mut [Self]) {}
}
