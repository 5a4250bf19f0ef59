//! Error types for the DocuSign connector.

use thiserror::Error;
use xavyo_connector_sdk::ConnectorError;

/// Result type alias using `DocusignError`.
pub type DocusignResult<T> = Result<T, DocusignError>;

/// Errors that can occur when interacting with DocuSign.
#[derive(Debug, Error)]
pub enum DocusignError {
    /// Configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// `OAuth2` authentication error.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Token file could not be read or written.
    #[error("Token storage error: {0}")]
    TokenStorage(String),

    /// DocuSign answered with a non-success status.
    #[error("Provider error {status}: {body}")]
    Provider { status: u16, body: String },

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// A user's settings could not be normalized.
    #[error("Settings decode error: {0}")]
    SettingsDecode(String),

    /// Request input failed validation.
    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<DocusignError> for ConnectorError {
    fn from(err: DocusignError) -> Self {
        match err {
            DocusignError::Config(message) => ConnectorError::InvalidConfiguration { message },
            DocusignError::Auth(message) | DocusignError::TokenStorage(message) => {
                ConnectorError::Authentication { message }
            }
            DocusignError::Provider { status, body } => ConnectorError::Provider { status, body },
            DocusignError::Http(e) => {
                ConnectorError::transport_with_source("DocuSign request failed", e)
            }
            DocusignError::Url(e) => ConnectorError::InvalidConfiguration {
                message: format!("invalid DocuSign URL: {e}"),
            },
            DocusignError::Json(e) => ConnectorError::invalid_data(e.to_string()),
            DocusignError::SettingsDecode(message) => ConnectorError::SettingsDecode {
                subject_id: String::new(),
                message,
            },
            DocusignError::Validation(message) => ConnectorError::Validation { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_keeps_status_and_body() {
        let err: ConnectorError = DocusignError::Provider {
            status: 400,
            body: r#"{"errorCode":"INVALID_REQUEST_PARAMETER"}"#.to_string(),
        }
        .into();

        match err {
            ConnectorError::Provider { status, body } => {
                assert_eq!(status, 400);
                assert!(body.contains("INVALID_REQUEST_PARAMETER"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validation_maps_to_validation() {
        let err: ConnectorError = DocusignError::Validation("email is required".into()).into();
        assert!(matches!(err, ConnectorError::Validation { .. }));
    }
}
