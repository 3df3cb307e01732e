//! Fail-closed remote gateway.
//!
//! Thin per-record-kind CRUD facade over the remote transport. Every
//! operation resolves the principal from the cached session first and
//! returns "not available" instead of raising when the principal cannot be
//! resolved or the call errors - callers run in best-effort background
//! contexts and must never see an exception from here.
//!
//! Before an update-by-id write the gateway verifies that the existing
//! remote record belongs to the resolving principal. A mismatch means an
//! identity-change wipe was missed somewhere; applying the write would leak
//! one account's data into another, so it is logged at error severity and
//! dropped.
//!
//! Logs carry ids and counts only, never record content.

use lucid_core::identity::SessionProvider;
use lucid_core::record::StoredRecord;
use lucid_core::remote::{RemoteApi, WriteOutcome};
use std::sync::Arc;

/// Principal-scoped remote CRUD for one record kind.
pub struct RemoteGateway<R: StoredRecord> {
    api: Arc<dyn RemoteApi<R>>,
    sessions: Arc<dyn SessionProvider>,
}

impl<R: StoredRecord> RemoteGateway<R> {
    pub fn new(api: Arc<dyn RemoteApi<R>>, sessions: Arc<dyn SessionProvider>) -> Self {
        Self { api, sessions }
    }

    /// Fetches the principal's full remote record set.
    ///
    /// Returns `None` when no principal is resolved ("not logged in" is a
    /// normal state, not a failure) or when the call errors.
    pub async fn fetch_all(&self) -> Option<Vec<R>> {
        let session = match self.sessions.current_session().await {
            Some(session) => session,
            None => {
                tracing::debug!(kind = R::KIND, "no active session, skipping remote fetch");
                return None;
            }
        };

        match self.api.list(&session).await {
            Ok(records) => {
                tracing::debug!(kind = R::KIND, count = records.len(), "fetched remote records");
                Some(records.into_iter().map(|r| r.record).collect())
            }
            Err(e) => {
                tracing::warn!(kind = R::KIND, error = %e, "remote fetch failed");
                None
            }
        }
    }

    /// Writes one record, verifying ownership of any existing remote copy
    /// first.
    pub async fn save(&self, record: &R) -> WriteOutcome {
        let session = match self.sessions.current_session().await {
            Some(session) => session,
            None => {
                tracing::debug!(kind = R::KIND, id = record.id(), "no active session, skipping remote save");
                return WriteOutcome::Unavailable;
            }
        };

        match self.api.get(&session, record.id()).await {
            Ok(Some(existing)) if existing.owner != session.principal => {
                tracing::error!(
                    kind = R::KIND,
                    id = record.id(),
                    "remote record belongs to a different principal, dropping write"
                );
                return WriteOutcome::Rejected;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(kind = R::KIND, id = record.id(), error = %e, "ownership lookup failed, leaving write pending");
                return WriteOutcome::Failed;
            }
        }

        match self.api.upsert(&session, record).await {
            Ok(()) => {
                tracing::debug!(kind = R::KIND, id = record.id(), "remote save confirmed");
                WriteOutcome::Persisted
            }
            Err(e) => {
                tracing::warn!(kind = R::KIND, id = record.id(), error = %e, "remote save failed");
                WriteOutcome::Failed
            }
        }
    }

    /// Deletes one record by id, best effort.
    pub async fn delete(&self, id: &str) -> WriteOutcome {
        let session = match self.sessions.current_session().await {
            Some(session) => session,
            None => {
                tracing::debug!(kind = R::KIND, id, "no active session, skipping remote delete");
                return WriteOutcome::Unavailable;
            }
        };

        match self.api.delete(&session, id).await {
            Ok(()) => WriteOutcome::Persisted,
            Err(e) => {
                tracing::warn!(kind = R::KIND, id, error = %e, "remote delete failed");
                WriteOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lucid_core::error::{LucidError, Result};
    use lucid_core::identity::{AuthSession, Principal};
    use lucid_core::journal::JournalEntry;
    use lucid_core::remote::RemoteRecord;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct StaticSessionProvider {
        session: Option<AuthSession>,
    }

    #[async_trait]
    impl SessionProvider for StaticSessionProvider {
        async fn current_session(&self) -> Option<AuthSession> {
            self.session.clone()
        }

        async fn current_user(&self) -> Result<Option<Principal>> {
            Ok(self.session.as_ref().map(|s| s.principal.clone()))
        }
    }

    #[derive(Default)]
    struct MemoryApi {
        records: Mutex<HashMap<String, RemoteRecord<JournalEntry>>>,
        fail_all: AtomicBool,
    }

    impl MemoryApi {
        fn seed(&self, owner: &str, record: JournalEntry) {
            self.records.lock().unwrap().insert(
                record.id.clone(),
                RemoteRecord {
                    owner: Principal::new(owner),
                    record,
                },
            );
        }

        fn check_failure(&self) -> Result<()> {
            if self.fail_all.load(Ordering::SeqCst) {
                Err(LucidError::remote(None, "injected failure"))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl RemoteApi<JournalEntry> for MemoryApi {
        async fn list(&self, session: &AuthSession) -> Result<Vec<RemoteRecord<JournalEntry>>> {
            self.check_failure()?;
            Ok(self
                .records
                .lock()
                .unwrap()
                .values()
                .filter(|r| r.owner == session.principal)
                .cloned()
                .collect())
        }

        async fn get(
            &self,
            _session: &AuthSession,
            id: &str,
        ) -> Result<Option<RemoteRecord<JournalEntry>>> {
            self.check_failure()?;
            Ok(self.records.lock().unwrap().get(id).cloned())
        }

        async fn upsert(&self, session: &AuthSession, record: &JournalEntry) -> Result<()> {
            self.check_failure()?;
            self.records.lock().unwrap().insert(
                record.id.clone(),
                RemoteRecord {
                    owner: session.principal.clone(),
                    record: record.clone(),
                },
            );
            Ok(())
        }

        async fn delete(&self, _session: &AuthSession, id: &str) -> Result<()> {
            self.check_failure()?;
            self.records.lock().unwrap().remove(id);
            Ok(())
        }
    }

    fn gateway(
        api: Arc<MemoryApi>,
        session: Option<AuthSession>,
    ) -> RemoteGateway<JournalEntry> {
        RemoteGateway::new(
            api as Arc<dyn RemoteApi<JournalEntry>>,
            Arc::new(StaticSessionProvider { session }),
        )
    }

    fn session_for(principal: &str) -> AuthSession {
        AuthSession::new(Principal::new(principal), "token")
    }

    #[tokio::test]
    async fn test_fetch_all_without_session_is_none_not_error() {
        let api = Arc::new(MemoryApi::default());
        let gateway = gateway(api, None);
        assert_eq!(gateway.fetch_all().await, None);
    }

    #[tokio::test]
    async fn test_save_without_session_is_a_no_op() {
        let api = Arc::new(MemoryApi::default());
        let gateway = gateway(api.clone(), None);
        let entry = JournalEntry::new("2024-01-15", "woke up flying");

        assert_eq!(gateway.save(&entry).await, WriteOutcome::Unavailable);
        assert!(api.records.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_for_foreign_record_is_dropped() {
        let api = Arc::new(MemoryApi::default());
        let original = JournalEntry::new("2024-01-15", "someone else's dream");
        api.seed("u1", original.clone());

        let gateway = gateway(api.clone(), Some(session_for("u2")));
        let mut stale = original.clone();
        stale.body = "overwritten by the wrong account".to_string();

        assert_eq!(gateway.save(&stale).await, WriteOutcome::Rejected);

        // The true owner still sees the original value.
        let u1_gateway = gateway_owned(api.clone(), "u1");
        let visible = u1_gateway.fetch_all().await.unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].body, "someone else's dream");
    }

    fn gateway_owned(api: Arc<MemoryApi>, principal: &str) -> RemoteGateway<JournalEntry> {
        gateway(api, Some(session_for(principal)))
    }

    #[tokio::test]
    async fn test_transport_failure_is_absorbed() {
        let api = Arc::new(MemoryApi::default());
        api.fail_all.store(true, Ordering::SeqCst);
        let gateway = gateway_owned(api, "u1");

        assert_eq!(gateway.fetch_all().await, None);
        let entry = JournalEntry::new("2024-01-15", "unsendable");
        assert_eq!(gateway.save(&entry).await, WriteOutcome::Failed);
        assert_eq!(gateway.delete(&entry.id).await, WriteOutcome::Failed);
    }

    #[tokio::test]
    async fn test_save_and_delete_round_trip() {
        let api = Arc::new(MemoryApi::default());
        let gateway = gateway_owned(api.clone(), "u1");
        let entry = JournalEntry::new("2024-01-15", "woke up flying");

        assert_eq!(gateway.save(&entry).await, WriteOutcome::Persisted);
        assert_eq!(gateway.fetch_all().await.unwrap().len(), 1);

        assert_eq!(gateway.delete(&entry.id).await, WriteOutcome::Persisted);
        assert!(gateway.fetch_all().await.unwrap().is_empty());
    }
}
