//! Connector SDK error types
//!
//! Error definitions shared by every resource syncer, with transient/permanent
//! classification for callers that schedule retries.

use thiserror::Error;

/// Error that can occur while listing resources, entitlements or grants.
#[derive(Debug, Error)]
pub enum ConnectorError {
    // Pagination errors
    /// An externally supplied page token could not be decoded.
    #[error("malformed page cursor: {reason}")]
    MalformedCursor { reason: String },

    /// The sync walk exceeded its page budget for one listing.
    #[error("page limit of {limit} exceeded while listing {resource_type}")]
    PageLimitExceeded { resource_type: String, limit: usize },

    // Provider errors
    /// The provider answered with a non-success status.
    #[error("provider returned {status}: {body}")]
    Provider { status: u16, body: String },

    /// Network or protocol failure before a provider response was received.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Credentials were rejected or could not be obtained.
    #[error("authentication failed: {message}")]
    Authentication { message: String },

    // Data errors
    /// A single subject's settings payload could not be normalized.
    #[error("failed to decode settings for {subject_id}: {message}")]
    SettingsDecode { subject_id: String, message: String },

    /// Caller-supplied input failed validation.
    #[error("validation failed: {message}")]
    Validation { message: String },

    /// Provider payload did not have the expected shape.
    #[error("invalid data: {message}")]
    InvalidData { message: String },

    // Configuration errors
    /// Connector configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// No syncer is registered for the resource type.
    #[error("resource type not found: {resource_type}")]
    ResourceTypeNotFound { resource_type: String },

    /// The caller cancelled the operation.
    #[error("operation cancelled")]
    Cancelled,
}

impl ConnectorError {
    /// Check if this error is transient (may succeed on retry).
    pub fn is_transient(&self) -> bool {
        match self {
            ConnectorError::Transport { .. } => true,
            ConnectorError::Provider { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Create a malformed cursor error.
    pub fn malformed_cursor(reason: impl Into<String>) -> Self {
        ConnectorError::MalformedCursor {
            reason: reason.into(),
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ConnectorError::Validation {
            message: message.into(),
        }
    }

    /// Create an invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        ConnectorError::InvalidData {
            message: message.into(),
        }
    }

    /// Create a transport error with a source.
    pub fn transport_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ConnectorError::Transport {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Result type for connector operations.
pub type ConnectorResult<T> = Result<T, ConnectorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ConnectorError::Provider {
            status: 429,
            body: String::new()
        }
        .is_transient());
        assert!(ConnectorError::Provider {
            status: 503,
            body: String::new()
        }
        .is_transient());
        assert!(!ConnectorError::Provider {
            status: 404,
            body: String::new()
        }
        .is_transient());
        assert!(!ConnectorError::malformed_cursor("bad").is_transient());
        assert!(!ConnectorError::Cancelled.is_transient());
    }

    #[test]
    fn test_error_display() {
        let err = ConnectorError::Provider {
            status: 401,
            body: "unauthorized".to_string(),
        };
        assert_eq!(err.to_string(), "provider returned 401: unauthorized");

        let err = ConnectorError::validation("email is required");
        assert_eq!(err.to_string(), "validation failed: email is required");
    }
}
