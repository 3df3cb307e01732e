//! Network reachability collaborator trait.

use async_trait::async_trait;

/// External collaborator answering "is the backend reachable right now".
///
/// Implementations are allowed to serve a short-lived cached answer (a few
/// seconds) rather than probing on every call.
#[async_trait]
pub trait NetworkProbe: Send + Sync {
    async fn is_online(&self) -> bool;
}
