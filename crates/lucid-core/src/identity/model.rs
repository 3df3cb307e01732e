//! Identity domain model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque identity token representing a signed-in user.
///
/// Anonymous is represented as the absence of a principal
/// (`Option<Principal>`), never as a sentinel value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Principal {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A cached, already-refreshed authentication session.
///
/// Resolvable without a network call, so it is safe to consult while
/// offline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    /// The signed-in principal
    pub principal: Principal,
    /// Bearer token presented to the remote backend
    pub access_token: String,
}

impl AuthSession {
    pub fn new(principal: Principal, access_token: impl Into<String>) -> Self {
        Self {
            principal,
            access_token: access_token.into(),
        }
    }
}
