//! Authenticated request execution.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;
use xavyo_connector_sdk::RateLimitDescription;

use crate::auth::TokenCache;
use crate::rate_limit;
use crate::token_store::TokenStore;
use crate::{DocusignConfig, DocusignCredentials, DocusignError, DocusignResult};

/// A decoded 2xx response.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub status: u16,
    pub headers: HeaderMap,
    /// JSON body, `Null` when the response had none.
    pub body: Value,
    pub rate_limit: Option<RateLimitDescription>,
}

/// Sends one request to the provider.
///
/// Non-2xx responses are returned as [`DocusignError::Provider`].
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    async fn execute(
        &self,
        method: Method,
        url: Url,
        body: Option<Value>,
    ) -> DocusignResult<ProviderResponse>;
}

/// `reqwest` executor with bearer tokens from a [`TokenCache`].
#[derive(Debug)]
pub struct HttpExecutor {
    http_client: reqwest::Client,
    token_cache: Arc<TokenCache>,
}

impl HttpExecutor {
    /// Creates an executor, wiring the token cache and token file from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &DocusignConfig, credentials: DocusignCredentials) -> DocusignResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DocusignError::Config(format!("Failed to create HTTP client: {e}")))?;

        let store = config.token_file.as_ref().map(TokenStore::new);
        let token_cache = TokenCache::new(
            credentials,
            &config.oauth_url,
            store,
            http_client.clone(),
        );

        Ok(Self::with_token_cache(http_client, Arc::new(token_cache)))
    }

    pub fn with_token_cache(http_client: reqwest::Client, token_cache: Arc<TokenCache>) -> Self {
        Self {
            http_client,
            token_cache,
        }
    }

    pub fn token_cache(&self) -> &Arc<TokenCache> {
        &self.token_cache
    }
}

#[async_trait]
impl RequestExecutor for HttpExecutor {
    #[instrument(skip(self, body), fields(url = %url))]
    async fn execute(
        &self,
        method: Method,
        url: Url,
        body: Option<Value>,
    ) -> DocusignResult<ProviderResponse> {
        let token = self.token_cache.get_token().await?;
        let token_type = self.token_cache.token_type().await;

        let mut request = self
            .http_client
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(
                reqwest::header::AUTHORIZATION,
                format!("{token_type} {token}"),
            );
        if let Some(b) = body.as_ref() {
            request = request.json(b);
        }

        let response = request.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let rate_limit = rate_limit::describe(status, &headers);

        if !status.is_success() {
            if status == reqwest::StatusCode::UNAUTHORIZED {
                // Force a refresh on the next request.
                self.token_cache.invalidate().await;
            }
            let error_body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "DocuSign request failed");
            return Err(DocusignError::Provider {
                status: status.as_u16(),
                body: error_body,
            });
        }

        let bytes = response.bytes().await?;
        let body = if bytes.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        debug!(status = status.as_u16(), "DocuSign request succeeded");

        Ok(ProviderResponse {
            status: status.as_u16(),
            headers,
            body,
            rate_limit,
        })
    }
}
