//! Shared test doubles for the collaborator traits.

use async_trait::async_trait;
use lucid_core::connectivity::NetworkProbe;
use lucid_core::error::{LucidError, Result};
use lucid_core::identity::{AuthSession, Principal, SessionProvider};
use lucid_core::record::StoredRecord;
use lucid_core::remote::{RemoteApi, RemoteRecord};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Session provider with a settable cached session.
pub struct StaticSessionProvider {
    session: Mutex<Option<AuthSession>>,
}

impl StaticSessionProvider {
    pub fn signed_in(principal: &str) -> Self {
        Self {
            session: Mutex::new(Some(AuthSession::new(Principal::new(principal), "token"))),
        }
    }

    pub fn signed_out() -> Self {
        Self {
            session: Mutex::new(None),
        }
    }
}

#[async_trait]
impl SessionProvider for StaticSessionProvider {
    async fn current_session(&self) -> Option<AuthSession> {
        self.session.lock().unwrap().clone()
    }

    async fn current_user(&self) -> Result<Option<Principal>> {
        Ok(self
            .session
            .lock()
            .unwrap()
            .as_ref()
            .map(|s| s.principal.clone()))
    }
}

/// Reachability probe with a settable answer.
pub struct StaticProbe {
    online: AtomicBool,
}

impl StaticProbe {
    pub fn online() -> Self {
        Self {
            online: AtomicBool::new(true),
        }
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }
}

#[async_trait]
impl NetworkProbe for StaticProbe {
    async fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}

/// In-memory remote backend with injectable failures.
pub struct MemoryRemoteApi<R: StoredRecord> {
    records: Mutex<HashMap<String, RemoteRecord<R>>>,
    fail_all: AtomicBool,
    failing_upserts: Mutex<HashSet<String>>,
    upsert_attempts: Mutex<Vec<String>>,
    list_calls: AtomicUsize,
}

impl<R: StoredRecord> Default for MemoryRemoteApi<R> {
    fn default() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            fail_all: AtomicBool::new(false),
            failing_upserts: Mutex::new(HashSet::new()),
            upsert_attempts: Mutex::new(Vec::new()),
            list_calls: AtomicUsize::new(0),
        }
    }
}

impl<R: StoredRecord> MemoryRemoteApi<R> {
    /// Installs a record owned by `owner`, bypassing any failure switches.
    pub fn seed(&self, owner: &str, record: R) {
        self.records.lock().unwrap().insert(
            record.id().to_string(),
            RemoteRecord {
                owner: Principal::new(owner),
                record,
            },
        );
    }

    /// Makes every call fail, as if the backend were unreachable.
    pub fn fail_everything(&self) {
        self.fail_all.store(true, Ordering::SeqCst);
    }

    /// Makes only upserts of the given id fail.
    pub fn fail_upsert_of(&self, id: &str) {
        self.failing_upserts.lock().unwrap().insert(id.to_string());
    }

    pub fn clear_failures(&self) {
        self.fail_all.store(false, Ordering::SeqCst);
        self.failing_upserts.lock().unwrap().clear();
    }

    /// Ids of every record the engine tried to upsert, in attempt order.
    pub fn upsert_attempts(&self) -> Vec<String> {
        self.upsert_attempts.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn stored_record(&self, id: &str) -> Option<R> {
        self.records.lock().unwrap().get(id).map(|r| r.record.clone())
    }

    fn check_reachable(&self) -> Result<()> {
        if self.fail_all.load(Ordering::SeqCst) {
            Err(LucidError::remote(None, "injected backend failure"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl<R: StoredRecord> RemoteApi<R> for MemoryRemoteApi<R> {
    async fn list(&self, session: &AuthSession) -> Result<Vec<RemoteRecord<R>>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check_reachable()?;
        Ok(self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.owner == session.principal)
            .cloned()
            .collect())
    }

    async fn get(&self, _session: &AuthSession, id: &str) -> Result<Option<RemoteRecord<R>>> {
        self.check_reachable()?;
        Ok(self.records.lock().unwrap().get(id).cloned())
    }

    async fn upsert(&self, session: &AuthSession, record: &R) -> Result<()> {
        self.upsert_attempts
            .lock()
            .unwrap()
            .push(record.id().to_string());
        self.check_reachable()?;
        if self.failing_upserts.lock().unwrap().contains(record.id()) {
            return Err(LucidError::remote(None, "injected upsert failure"));
        }
        self.records.lock().unwrap().insert(
            record.id().to_string(),
            RemoteRecord {
                owner: session.principal.clone(),
                record: record.clone(),
            },
        );
        Ok(())
    }

    async fn delete(&self, _session: &AuthSession, id: &str) -> Result<()> {
        self.check_reachable()?;
        self.records.lock().unwrap().remove(id);
        Ok(())
    }
}
