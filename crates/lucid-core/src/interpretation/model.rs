//! Interpretation domain model.
//!
//! An interpretation is the derived conversational analysis of exactly one
//! journal entry: an ordered message transcript, derived tag lists, and a
//! free-text summary. The convention of at most one "current" interpretation
//! per entry is a business rule above this layer - storage does not enforce
//! it.

use crate::journal::JournalEntry;
use crate::record::{StoredRecord, keys};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Conversational role of a single interpretation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    /// The journaling user
    Dreamer,
    /// The interpreting counterpart
    Guide,
}

/// One message in an interpretation transcript.
///
/// Immutable once created; ordering within the transcript is append-only
/// and significant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique message identifier (UUID format)
    pub id: String,
    /// Who authored the message
    pub role: ChatRole,
    /// Message text
    pub content: String,
    /// When the message was produced
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Creates a message stamped with the current time.
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// The derived interpretation of a single journal entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interpretation {
    /// Unique interpretation identifier (UUID format)
    pub id: String,
    /// Id of the journal entry this interpretation belongs to
    pub entry_id: String,
    /// Conversation transcript, in append order
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    /// Derived symbol tags
    #[serde(default)]
    pub symbols: Vec<String>,
    /// Derived archetype tags
    #[serde(default)]
    pub archetypes: Vec<String>,
    /// Derived landscape tags
    #[serde(default)]
    pub landscapes: Vec<String>,
    /// Free-text summary of the interpretation
    pub summary: String,
    /// Snapshot of the entry body at interpretation-creation time.
    /// Used to detect that the entry changed since it was interpreted.
    pub entry_body_snapshot: String,
    /// Timestamp when the interpretation was created
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last save of this interpretation
    pub updated_at: DateTime<Utc>,
}

impl Interpretation {
    /// Creates an empty interpretation for the given entry, snapshotting
    /// its current body.
    pub fn for_entry(entry: &JournalEntry) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            entry_id: entry.id.clone(),
            messages: Vec::new(),
            symbols: Vec::new(),
            archetypes: Vec::new(),
            landscapes: Vec::new(),
            summary: String::new(),
            entry_body_snapshot: entry.body.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Appends a message to the transcript.
    pub fn push_message(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// True when the entry body has changed since this interpretation was
    /// created.
    pub fn is_stale(&self, current_body: &str) -> bool {
        self.entry_body_snapshot != current_body
    }

    /// Advances `updated_at` to the current time, never backwards.
    pub fn touch(&mut self) {
        self.updated_at = self.updated_at.max(Utc::now());
    }
}

impl StoredRecord for Interpretation {
    const KIND: &'static str = "interpretation";
    const STORAGE_KEY: &'static str = keys::INTERPRETATIONS;
    const OUTBOX_KEY: &'static str = keys::OUTBOX_INTERPRETATIONS;
    const REMOTE_PATH: &'static str = "interpretations";

    fn id(&self) -> &str {
        &self.id
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_detects_changed_entry() {
        let mut entry = JournalEntry::new("2024-01-15", "woke up flying");
        let interpretation = Interpretation::for_entry(&entry);
        assert!(!interpretation.is_stale(&entry.body));

        entry.body.push_str(", then fell");
        assert!(interpretation.is_stale(&entry.body));
    }

    #[test]
    fn test_messages_keep_append_order() {
        let entry = JournalEntry::new("2024-01-15", "a long corridor");
        let mut interpretation = Interpretation::for_entry(&entry);

        interpretation.push_message(ChatMessage::new(ChatRole::Dreamer, "what does it mean?"));
        interpretation.push_message(ChatMessage::new(ChatRole::Guide, "corridors suggest transition"));
        interpretation.push_message(ChatMessage::new(ChatRole::Dreamer, "it felt endless"));

        let roles: Vec<ChatRole> = interpretation.messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![ChatRole::Dreamer, ChatRole::Guide, ChatRole::Dreamer]);
    }
}
