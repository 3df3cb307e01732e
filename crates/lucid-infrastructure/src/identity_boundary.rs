//! Principal-change boundary.
//!
//! Compares the currently authenticated principal against the last one this
//! device saw and decides whether local state must be wiped before use. The
//! comparison rule is deliberately asymmetric: logging out leaves local
//! data orphaned but harmless (the same user's next login should see their
//! own cache), while switching to a *different* principal risks cross-user
//! data leakage and must trigger a wipe.

use lucid_core::error::Result;
use lucid_core::identity::{Principal, SessionProvider};
use lucid_core::record::keys;
use lucid_core::storage::KeyValueStore;
use std::sync::Arc;

/// Detects account switches across process restarts.
pub struct IdentityBoundary {
    sessions: Arc<dyn SessionProvider>,
    kv: Arc<dyn KeyValueStore>,
}

impl IdentityBoundary {
    pub fn new(sessions: Arc<dyn SessionProvider>, kv: Arc<dyn KeyValueStore>) -> Self {
        Self { sessions, kv }
    }

    /// Resolves the current principal from the cached session.
    ///
    /// Never performs a network call, so this returns instantly even
    /// offline. Resolution failure means anonymous.
    pub async fn current_principal(&self) -> Option<Principal> {
        self.sessions
            .current_session()
            .await
            .map(|session| session.principal)
    }

    /// Returns the last principal persisted by this boundary.
    pub async fn stored_principal(&self) -> Option<Principal> {
        let raw = match self.kv.get(keys::LAST_PRINCIPAL).await {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(error = %e, "stored principal unreadable, treating as absent");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(principal) => Some(principal),
            Err(e) => {
                tracing::warn!(error = %e, "stored principal unreadable, treating as absent");
                None
            }
        }
    }

    /// Persists the principal as the last one seen.
    pub async fn store(&self, principal: &Principal) -> Result<()> {
        let raw = serde_json::to_string(principal)?;
        self.kv.set(keys::LAST_PRINCIPAL, &raw).await
    }

    /// Forgets the stored principal.
    pub async fn clear(&self) -> Result<()> {
        self.kv.remove(keys::LAST_PRINCIPAL).await
    }

    /// True when the active account differs from the one local state
    /// belongs to.
    ///
    /// - current `None`: clears the stored value and returns false - logout
    ///   is not a change requiring a wipe.
    /// - stored `None`, current `Some`: stores the current principal and
    ///   returns false - first login is not a change.
    /// - both present and different: returns true.
    pub async fn has_changed(&self) -> bool {
        let current = self.current_principal().await;
        let stored = self.stored_principal().await;

        match (stored, current) {
            (_, None) => {
                if let Err(e) = self.clear().await {
                    tracing::warn!(error = %e, "failed to clear stored principal on logout");
                }
                false
            }
            (None, Some(current)) => {
                if let Err(e) = self.store(&current).await {
                    tracing::warn!(error = %e, "failed to store principal on first login");
                }
                false
            }
            (Some(stored), Some(current)) => {
                if stored == current {
                    false
                } else {
                    tracing::warn!("active principal differs from stored principal, local state must be wiped");
                    true
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_store::MemoryKeyValueStore;
    use async_trait::async_trait;
    use lucid_core::identity::AuthSession;
    use std::sync::Mutex;

    struct StaticSessionProvider {
        session: Mutex<Option<AuthSession>>,
    }

    impl StaticSessionProvider {
        fn signed_in(principal: &str) -> Self {
            Self {
                session: Mutex::new(Some(AuthSession::new(Principal::new(principal), "token"))),
            }
        }

        fn signed_out() -> Self {
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

        async fn current_user(&self) -> lucid_core::Result<Option<Principal>> {
            Ok(self.session.lock().unwrap().as_ref().map(|s| s.principal.clone()))
        }
    }

    fn boundary(provider: StaticSessionProvider) -> (Arc<MemoryKeyValueStore>, IdentityBoundary) {
        let kv = Arc::new(MemoryKeyValueStore::new());
        let boundary = IdentityBoundary::new(Arc::new(provider), kv.clone() as Arc<dyn KeyValueStore>);
        (kv, boundary)
    }

    #[tokio::test]
    async fn test_first_login_is_not_a_change_and_stores_principal() {
        let (_kv, boundary) = boundary(StaticSessionProvider::signed_in("u1"));

        assert!(!boundary.has_changed().await);
        assert_eq!(boundary.stored_principal().await, Some(Principal::new("u1")));
    }

    #[tokio::test]
    async fn test_same_principal_is_not_a_change() {
        let (_kv, boundary) = boundary(StaticSessionProvider::signed_in("u1"));
        boundary.store(&Principal::new("u1")).await.unwrap();

        assert!(!boundary.has_changed().await);
    }

    #[tokio::test]
    async fn test_logout_is_not_a_change_and_clears_stored() {
        let (_kv, boundary) = boundary(StaticSessionProvider::signed_out());
        boundary.store(&Principal::new("u1")).await.unwrap();

        assert!(!boundary.has_changed().await);
        assert_eq!(boundary.stored_principal().await, None);
    }

    #[tokio::test]
    async fn test_switching_accounts_is_a_change() {
        let (_kv, boundary) = boundary(StaticSessionProvider::signed_in("u2"));
        boundary.store(&Principal::new("u1")).await.unwrap();

        assert!(boundary.has_changed().await);
        // Detection alone must not rewrite the stored principal - the wipe
        // happens first, then the caller stores the new one.
        assert_eq!(boundary.stored_principal().await, Some(Principal::new("u1")));
    }
}
