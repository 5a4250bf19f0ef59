//! OAuth2 token handling for the DocuSign account server.
//!
//! Only the refresh-token grant is implemented. The initial authorization code
//! exchange happens out of band; its tokens arrive through the environment or
//! the token file.

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use crate::token_store::{StoredToken, TokenStore};
use crate::{DocusignCredentials, DocusignError, DocusignResult};

/// OAuth2 token response from the account server.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: String,
    expires_in: i64,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Cached OAuth2 access token.
#[derive(Debug)]
struct CachedToken {
    access_token: SecretString,
    token_type: String,
    /// `None` for a static token that is used until invalidated.
    expires_at: Option<DateTime<Utc>>,
}

impl CachedToken {
    /// Returns true if the token is expired or will expire within the grace period.
    fn is_expired(&self, grace_period: Duration) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() + grace_period >= expires_at,
            None => false,
        }
    }
}

#[derive(Debug, Default)]
struct TokenState {
    cached: Option<CachedToken>,
    refresh_token: Option<SecretString>,
    store_checked: bool,
}

/// Token cache for DocuSign access tokens.
#[derive(Debug)]
pub struct TokenCache {
    client_id: String,
    client_secret: Option<SecretString>,
    token_url: String,
    store: Option<TokenStore>,
    http_client: reqwest::Client,
    state: RwLock<TokenState>,
    /// Grace period before expiry to trigger refresh (default: 5 minutes).
    grace_period: Duration,
}

impl TokenCache {
    /// Creates a new token cache against `{oauth_url}/oauth/token`.
    pub fn new(
        credentials: DocusignCredentials,
        oauth_url: &str,
        store: Option<TokenStore>,
        http_client: reqwest::Client,
    ) -> Self {
        let cached = credentials.access_token.map(|access_token| CachedToken {
            access_token,
            token_type: "Bearer".to_string(),
            expires_at: None,
        });

        Self {
            client_id: credentials.client_id,
            client_secret: credentials.client_secret,
            token_url: format!("{}/oauth/token", oauth_url.trim_end_matches('/')),
            store,
            http_client,
            state: RwLock::new(TokenState {
                cached,
                refresh_token: credentials.refresh_token,
                store_checked: false,
            }),
            grace_period: Duration::minutes(5),
        }
    }

    /// Gets a valid access token, refreshing if necessary.
    #[instrument(skip(self))]
    pub async fn get_token(&self) -> DocusignResult<String> {
        {
            let state = self.state.read().await;
            if let Some(token) = state.cached.as_ref() {
                if !token.is_expired(self.grace_period) {
                    return Ok(token.access_token.expose_secret().clone());
                }
            }
        }

        let mut state = self.state.write().await;

        // Another caller may have refreshed while we waited for the lock.
        if let Some(token) = state.cached.as_ref() {
            if !token.is_expired(self.grace_period) {
                return Ok(token.access_token.expose_secret().clone());
            }
        }

        if !state.store_checked {
            state.store_checked = true;
            if let Some(stored) = self.load_stored() {
                if !stored.refresh_token.is_empty() {
                    state.refresh_token = Some(SecretString::new(stored.refresh_token.clone()));
                }
                let token = CachedToken {
                    access_token: SecretString::new(stored.access_token),
                    token_type: stored.token_type,
                    expires_at: stored.expiry,
                };
                if !token.is_expired(self.grace_period) {
                    debug!("Using stored token");
                    let access_token = token.access_token.expose_secret().clone();
                    state.cached = Some(token);
                    return Ok(access_token);
                }
            }
        }

        let refresh_token = state
            .refresh_token
            .as_ref()
            .map(|t| t.expose_secret().clone())
            .ok_or_else(|| {
                DocusignError::Auth("access token expired and no refresh token available".into())
            })?;

        debug!("Refreshing access token");
        let response = self.refresh(&refresh_token).await?;
        let expires_at = Utc::now() + Duration::seconds(response.expires_in);
        let rotated = response
            .refresh_token
            .filter(|t| !t.is_empty())
            .unwrap_or(refresh_token);

        self.persist(&StoredToken {
            access_token: response.access_token.clone(),
            refresh_token: rotated.clone(),
            token_type: response.token_type.clone(),
            expiry: Some(expires_at),
        });

        debug!(
            "Acquired new token, expires at {}",
            expires_at.format("%Y-%m-%d %H:%M:%S UTC")
        );

        let access_token = response.access_token.clone();
        state.refresh_token = Some(SecretString::new(rotated));
        state.cached = Some(CachedToken {
            access_token: SecretString::new(response.access_token),
            token_type: response.token_type,
            expires_at: Some(expires_at),
        });

        Ok(access_token)
    }

    /// Performs the refresh-token grant with HTTP Basic client authentication.
    #[instrument(skip(self, refresh_token))]
    async fn refresh(&self, refresh_token: &str) -> DocusignResult<TokenResponse> {
        let client_secret = self.client_secret.as_ref().ok_or_else(|| {
            DocusignError::Auth("client_id and client_secret are required to refresh".into())
        })?;
        if self.client_id.is_empty() {
            return Err(DocusignError::Auth(
                "client_id and client_secret are required to refresh".into(),
            ));
        }

        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];

        let response = self
            .http_client
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(client_secret.expose_secret()))
            .form(&params)
            .send()
            .await
            .map_err(|e| DocusignError::Auth(format!("Token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DocusignError::Auth(format!(
                "Token request failed with status {}: {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| DocusignError::Auth(format!("Failed to parse token response: {}", e)))
    }

    fn load_stored(&self) -> Option<StoredToken> {
        let store = self.store.as_ref()?;
        if !store.exists() {
            return None;
        }
        match store.load() {
            Ok(token) => Some(token),
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable token file");
                None
            }
        }
    }

    fn persist(&self, token: &StoredToken) {
        if let Some(store) = self.store.as_ref() {
            if let Err(e) = store.save(token) {
                warn!(error = %e, "Failed to persist refreshed token");
            }
        }
    }

    /// Token type of the cached token, `Bearer` when none is cached.
    pub async fn token_type(&self) -> String {
        let state = self.state.read().await;
        state
            .cached
            .as_ref()
            .map(|t| t.token_type.clone())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "Bearer".to_string())
    }

    /// Invalidates the cached token, forcing a refresh on next use.
    pub async fn invalidate(&self) {
        let mut state = self.state.write().await;
        state.cached = None;
    }
}
