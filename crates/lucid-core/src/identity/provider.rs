//! Session provider collaborator trait.

use super::model::{AuthSession, Principal};
use crate::error::Result;
use async_trait::async_trait;

/// External collaborator exposing the authentication state.
///
/// The two capabilities have different freshness guarantees: the cached
/// session is offline-safe and returns instantly, while resolving the user
/// may require a network round trip. Identity checks inside the
/// reconciliation core only ever use the cached variant.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Returns the cached session, if a user is signed in.
    ///
    /// Must not perform a network call.
    async fn current_session(&self) -> Option<AuthSession>;

    /// Resolves the current user against the backend.
    ///
    /// May require network access; `Ok(None)` means anonymous.
    async fn current_user(&self) -> Result<Option<Principal>>;
}
