//! Journal entry domain model.
//!
//! This module contains the core journal entities that the reconciliation
//! layer persists locally and mirrors to the remote backend.

use crate::record::{StoredRecord, keys};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single dream journal entry.
///
/// The id is caller-generated and immutable once assigned. The date is a
/// calendar day in `YYYY-MM-DD` form and is not unique - multiple entries
/// per day are allowed. `updated_at` is monotonically non-decreasing across
/// saves of the same id (see [`JournalEntry::touch`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Unique entry identifier (UUID format)
    pub id: String,
    /// Calendar day the dream occurred (`YYYY-MM-DD`)
    pub date: String,
    /// Optional short title
    pub title: Option<String>,
    /// Free-text body of the dream
    pub body: String,
    /// Whether the entry has been archived by the user
    #[serde(default)]
    pub archived: bool,
    /// Timestamp when the entry was created
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last save of this entry
    pub updated_at: DateTime<Utc>,
    /// Derived symbol tags, attached after analysis
    #[serde(default)]
    pub symbols: Vec<String>,
    /// Derived archetype tags, attached after analysis
    #[serde(default)]
    pub archetypes: Vec<String>,
    /// Derived landscape tags, attached after analysis
    #[serde(default)]
    pub landscapes: Vec<String>,
}

impl JournalEntry {
    /// Creates a new entry for the given calendar day.
    pub fn new(date: impl Into<String>, body: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            date: date.into(),
            title: None,
            body: body.into(),
            archived: false,
            created_at: now,
            updated_at: now,
            symbols: Vec::new(),
            archetypes: Vec::new(),
            landscapes: Vec::new(),
        }
    }

    /// Advances `updated_at` to the current time.
    ///
    /// Clamped so the timestamp never moves backwards, even if the wall
    /// clock does.
    pub fn touch(&mut self) {
        self.updated_at = self.updated_at.max(Utc::now());
    }
}

impl StoredRecord for JournalEntry {
    const KIND: &'static str = "journal_entry";
    const STORAGE_KEY: &'static str = keys::JOURNAL_ENTRIES;
    const OUTBOX_KEY: &'static str = keys::OUTBOX_JOURNAL_ENTRIES;
    const REMOTE_PATH: &'static str = "journal_entries";

    fn id(&self) -> &str {
        &self.id
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Newest day first; within a day, newest entry first.
    fn sort_for_read(records: &mut [Self]) {
        records.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
    }
}

/// The single in-progress scratch record kept while composing.
///
/// At most one draft exists at a time - it is a singleton by storage key,
/// not a member of a list, and it carries no id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    /// Calendar day the draft is for (`YYYY-MM-DD`)
    pub date: String,
    /// Optional short title
    pub title: Option<String>,
    /// Body text as typed so far
    pub body: String,
    /// Timestamp of the last autosave
    pub saved_at: DateTime<Utc>,
}

impl Draft {
    /// Creates a draft stamped with the current time.
    pub fn new(date: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            title: None,
            body: body.into(),
            saved_at: Utc::now(),
        }
    }
}
