//! DocuSign connector configuration.
//!
//! Configuration can be assembled with [`DocusignConfig::builder`] or loaded
//! from environment variables with [`DocusignConfig::from_env`].

use secrecy::SecretString;
use std::env::VarError;
use std::path::PathBuf;

use crate::{DocusignError, DocusignResult};

/// Default DocuSign eSignature API host (developer sandbox).
pub const DEFAULT_API_URL: &str = "https://demo.docusign.net";

/// Default DocuSign account server (developer sandbox).
pub const DEFAULT_OAUTH_URL: &str = "https://account-d.docusign.com";

/// Largest page the eSignature API accepts for list endpoints.
pub const MAX_PAGE_SIZE: u32 = 1000;

const DEFAULT_PAGE_SIZE: u32 = 100;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connector configuration.
#[derive(Debug, Clone)]
pub struct DocusignConfig {
    /// Base URL of the eSignature REST API.
    pub api_url: String,
    /// DocuSign account id (GUID) all requests are scoped to.
    pub account_id: String,
    /// Base URL of the OAuth account server.
    pub oauth_url: String,
    /// Items requested per page. Callers may ask for less.
    pub page_size: u32,
    /// HTTP request timeout.
    pub timeout_secs: u64,
    /// Where OAuth tokens are persisted between runs.
    pub token_file: Option<PathBuf>,
    /// Skip users whose settings cannot be normalized instead of failing the page.
    pub isolate_user_failures: bool,
}

impl DocusignConfig {
    /// Creates a builder.
    pub fn builder() -> DocusignConfigBuilder {
        DocusignConfigBuilder::default()
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> DocusignResult<Self> {
        Self::from_reader(|key| std::env::var(key))
    }

    /// Load configuration from a custom variable reader.
    pub fn from_reader<F>(reader: F) -> DocusignResult<Self>
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        let mut builder = Self::builder();

        if let Ok(url) = reader("DOCUSIGN_API_URL") {
            builder = builder.api_url(url);
        }
        if let Ok(account_id) = reader("DOCUSIGN_ACCOUNT_ID") {
            builder = builder.account_id(account_id);
        }
        if let Ok(url) = reader("DOCUSIGN_OAUTH_URL") {
            builder = builder.oauth_url(url);
        }
        if let Ok(raw) = reader("DOCUSIGN_PAGE_SIZE") {
            let size = raw.parse::<u32>().map_err(|e| {
                DocusignError::Config(format!("invalid DOCUSIGN_PAGE_SIZE: {e}"))
            })?;
            builder = builder.page_size(size);
        }
        if let Ok(raw) = reader("DOCUSIGN_TIMEOUT_SECS") {
            let secs = raw.parse::<u64>().map_err(|e| {
                DocusignError::Config(format!("invalid DOCUSIGN_TIMEOUT_SECS: {e}"))
            })?;
            builder = builder.timeout_secs(secs);
        }
        if let Ok(path) = reader("DOCUSIGN_TOKEN_FILE") {
            builder = builder.token_file(path);
        }
        if let Ok(raw) = reader("DOCUSIGN_ISOLATE_USER_FAILURES") {
            let isolate = raw.parse::<bool>().map_err(|e| {
                DocusignError::Config(format!("invalid DOCUSIGN_ISOLATE_USER_FAILURES: {e}"))
            })?;
            builder = builder.isolate_user_failures(isolate);
        }

        builder.build()
    }

    /// Validates the configuration.
    pub fn validate(&self) -> DocusignResult<()> {
        if self.account_id.trim().is_empty() {
            return Err(DocusignError::Config("account_id is required".into()));
        }
        for (name, value) in [("api_url", &self.api_url), ("oauth_url", &self.oauth_url)] {
            let url = url::Url::parse(value)
                .map_err(|e| DocusignError::Config(format!("invalid {name}: {e}")))?;
            if url.scheme() != "https" && url.scheme() != "http" {
                return Err(DocusignError::Config(format!(
                    "unsupported {name} scheme: {}",
                    url.scheme()
                )));
            }
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(DocusignError::Config(format!(
                "page_size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        if self.timeout_secs == 0 {
            return Err(DocusignError::Config("timeout_secs must be positive".into()));
        }
        Ok(())
    }

    /// Page size to request: the caller's size capped at [`MAX_PAGE_SIZE`], or
    /// the configured size when the caller sends 0.
    pub fn effective_page_size(&self, requested: u32) -> u32 {
        if requested == 0 {
            self.page_size
        } else {
            requested.min(MAX_PAGE_SIZE)
        }
    }
}

/// Builder for [`DocusignConfig`].
#[derive(Debug, Default)]
pub struct DocusignConfigBuilder {
    api_url: Option<String>,
    account_id: Option<String>,
    oauth_url: Option<String>,
    page_size: Option<u32>,
    timeout_secs: Option<u64>,
    token_file: Option<PathBuf>,
    isolate_user_failures: Option<bool>,
}

impl DocusignConfigBuilder {
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    pub fn account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    pub fn oauth_url(mut self, url: impl Into<String>) -> Self {
        self.oauth_url = Some(url.into());
        self
    }

    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn token_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_file = Some(path.into());
        self
    }

    pub fn isolate_user_failures(mut self, isolate: bool) -> Self {
        self.isolate_user_failures = Some(isolate);
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> DocusignResult<DocusignConfig> {
        let config = DocusignConfig {
            api_url: self
                .api_url
                .unwrap_or_else(|| DEFAULT_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            account_id: self.account_id.unwrap_or_default(),
            oauth_url: self
                .oauth_url
                .unwrap_or_else(|| DEFAULT_OAUTH_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            page_size: self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            timeout_secs: self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            token_file: self.token_file,
            isolate_user_failures: self.isolate_user_failures.unwrap_or(true),
        };
        config.validate()?;
        Ok(config)
    }
}

/// OAuth credentials.
///
/// Either a static `access_token`, or an integration key (`client_id` +
/// `client_secret`) together with a refresh token from the variables or the
/// token file.
#[derive(Debug, Default)]
pub struct DocusignCredentials {
    pub client_id: String,
    pub client_secret: Option<SecretString>,
    pub refresh_token: Option<SecretString>,
    pub access_token: Option<SecretString>,
}

impl DocusignCredentials {
    /// Credentials holding only a pre-issued access token.
    pub fn from_access_token(token: impl Into<String>) -> Self {
        Self {
            access_token: Some(SecretString::new(token.into())),
            ..Self::default()
        }
    }

    /// Credentials for the refresh-token grant.
    pub fn refreshable(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: Some(SecretString::new(client_secret.into())),
            refresh_token: Some(SecretString::new(refresh_token.into())),
            access_token: None,
        }
    }

    /// Load credentials from environment variables.
    pub fn from_env() -> Self {
        Self::from_reader(|key| std::env::var(key))
    }

    /// Load credentials from a custom variable reader.
    pub fn from_reader<F>(reader: F) -> Self
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        let secret = |key: &str| {
            reader(key)
                .ok()
                .filter(|v| !v.is_empty())
                .map(SecretString::new)
        };

        Self {
            client_id: reader("DOCUSIGN_CLIENT_ID").unwrap_or_default(),
            client_secret: secret("DOCUSIGN_CLIENT_SECRET"),
            refresh_token: secret("DOCUSIGN_REFRESH_TOKEN"),
            access_token: secret("DOCUSIGN_ACCESS_TOKEN"),
        }
    }

    /// Whether the refresh-token grant can be performed.
    pub fn can_refresh(&self) -> bool {
        !self.client_id.is_empty() && self.client_secret.is_some()
    }

    /// Validates that some way of obtaining an access token exists.
    pub fn validate(&self, has_token_file: bool) -> DocusignResult<()> {
        if self.access_token.is_some() {
            return Ok(());
        }
        if !self.can_refresh() {
            return Err(DocusignError::Config(
                "either an access token or client_id and client_secret are required".into(),
            ));
        }
        if self.refresh_token.is_none() && !has_token_file {
            return Err(DocusignError::Config(
                "a refresh token or a token file is required".into(),
            ));
        }
        Ok(())
    }
}
