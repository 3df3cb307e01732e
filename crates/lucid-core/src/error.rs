//! Error types for the Lucid reconciliation core.

use thiserror::Error;

/// A shared error type for the entire Lucid core.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
#[derive(Error, Debug, Clone)]
pub enum LucidError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Local storage error (key/value persistence layer)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Remote backend error, with the HTTP status when one was received
    #[error("Remote error{}: {message}", .status.map(|s| format!(" (status {s})")).unwrap_or_default())]
    Remote {
        status: Option<u16>,
        message: String,
    },

    /// Identity resolution error
    #[error("Identity error: {0}")]
    Identity(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LucidError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Creates a Remote error
    pub fn remote(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Remote {
            status,
            message: message.into(),
        }
    }

    /// Creates an Identity error
    pub fn identity(message: impl Into<String>) -> Self {
        Self::Identity(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a remote error
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }
}

impl From<std::io::Error> for LucidError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for LucidError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for LucidError {
    fn from(err: reqwest::Error) -> Self {
        Self::Remote {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, LucidError>`.
pub type Result<T> = std::result::Result<T, LucidError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_helper() {
        let err = LucidError::not_found("journal_entry", "abc");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Entity not found: journal_entry 'abc'");
    }

    #[test]
    fn test_remote_error_display_includes_status() {
        let err = LucidError::remote(Some(503), "list failed");
        assert_eq!(err.to_string(), "Remote error (status 503): list failed");

        let err = LucidError::remote(None, "connection refused");
        assert_eq!(err.to_string(), "Remote error: connection refused");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: LucidError = io.into();
        assert!(matches!(err, LucidError::Io { .. }));
    }
}
