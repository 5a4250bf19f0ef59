//! DocuSign eSignature REST client.

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument};
use url::Url;
use xavyo_connector_sdk::{Annotations, OffsetCursor};

use crate::executor::{HttpExecutor, ProviderResponse, RequestExecutor};
use crate::models::{CreateUsersRequest, Group, Page, User, UserCreationResponse, UserDetail};
use crate::{DocusignConfig, DocusignCredentials, DocusignError, DocusignResult};

/// A paged listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageKind {
    /// `/users`
    Users,
    /// `/groups`
    Groups,
    /// `/groups/{groupId}/users`
    GroupUsers(String),
}

impl PageKind {
    fn path_segments(&self) -> Vec<&str> {
        match self {
            Self::Users => vec!["users"],
            Self::Groups => vec!["groups"],
            Self::GroupUsers(group_id) => vec!["groups", group_id.as_str(), "users"],
        }
    }

    /// Key of the item array in the response body.
    fn items_key(&self) -> &'static str {
        match self {
            Self::Users | Self::GroupUsers(_) => "users",
            Self::Groups => "groups",
        }
    }
}

/// Window requested from a listing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub start_position: u64,
    /// Items to request; `0` leaves the server default.
    pub count: u32,
}

impl PageRequest {
    pub fn new(start_position: u64, count: u32) -> Self {
        Self {
            start_position,
            count,
        }
    }
}

/// One page of a listing.
#[derive(Debug, Clone)]
pub struct FetchedPage<T> {
    pub items: Vec<T>,
    pub page: Page,
    /// Encoded [`OffsetCursor`] of the next page; empty when the listing is done.
    pub next_cursor: String,
    pub annotations: Annotations,
}

/// Client scoped to one DocuSign account.
#[derive(Clone)]
pub struct DocusignClient {
    executor: Arc<dyn RequestExecutor>,
    api_url: String,
    account_id: String,
}

impl std::fmt::Debug for DocusignClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocusignClient")
            .field("api_url", &self.api_url)
            .field("account_id", &self.account_id)
            .finish_non_exhaustive()
    }
}

impl DocusignClient {
    /// Creates a client with the HTTP executor.
    pub fn new(config: &DocusignConfig, credentials: DocusignCredentials) -> DocusignResult<Self> {
        let executor = HttpExecutor::new(config, credentials)?;
        Ok(Self::with_executor(
            Arc::new(executor),
            &config.api_url,
            &config.account_id,
        ))
    }

    /// Creates a client over any executor.
    pub fn with_executor(
        executor: Arc<dyn RequestExecutor>,
        api_url: &str,
        account_id: &str,
    ) -> Self {
        Self {
            executor,
            api_url: api_url.trim_end_matches('/').to_string(),
            account_id: account_id.to_string(),
        }
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// `{api_url}/restapi/v2.1/accounts/{account}/{segments...}`
    fn endpoint(&self, segments: &[&str]) -> DocusignResult<Url> {
        let mut path = format!(
            "{}/restapi/v2.1/accounts/{}",
            self.api_url,
            urlencoding::encode(&self.account_id)
        );
        for segment in segments {
            path.push('/');
            path.push_str(&urlencoding::encode(segment));
        }
        Ok(Url::parse(&path)?)
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<Value>,
    ) -> DocusignResult<(ProviderResponse, Annotations)> {
        let response = self.executor.execute(method, url, body).await?;
        let mut annotations = Annotations::new();
        if let Some(rate_limit) = response.rate_limit.clone() {
            annotations.with_rate_limit(rate_limit);
        }
        Ok((response, annotations))
    }

    /// Fetch one page of a listing.
    #[instrument(skip(self))]
    pub async fn fetch_page<T: DeserializeOwned>(
        &self,
        kind: &PageKind,
        request: &PageRequest,
    ) -> DocusignResult<FetchedPage<T>> {
        let mut url = self.endpoint(&kind.path_segments())?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("startPosition", &request.start_position.to_string());
            if request.count > 0 {
                query.append_pair("count", &request.count.to_string());
            }
        }

        let (response, annotations) = self.send(Method::GET, url, None).await?;
        let body = response.body;

        let page: Page = if body.is_null() {
            Page::default()
        } else {
            Page::deserialize(&body)?
        };
        let items: Vec<T> = match body.get(kind.items_key()) {
            Some(Value::Null) | None => Vec::new(),
            Some(items) => serde_json::from_value(items.clone())?,
        };

        let next_cursor = OffsetCursor::next_token(page.end_position, page.total_set_size);
        debug!(
            items = items.len(),
            start = page.start_position,
            end = page.end_position,
            total = page.total_set_size,
            "Fetched DocuSign page"
        );

        Ok(FetchedPage {
            items,
            page,
            next_cursor,
            annotations,
        })
    }

    pub async fn list_users(&self, request: &PageRequest) -> DocusignResult<FetchedPage<User>> {
        self.fetch_page(&PageKind::Users, request).await
    }

    pub async fn list_groups(&self, request: &PageRequest) -> DocusignResult<FetchedPage<Group>> {
        self.fetch_page(&PageKind::Groups, request).await
    }

    pub async fn list_group_users(
        &self,
        group_id: &str,
        request: &PageRequest,
    ) -> DocusignResult<FetchedPage<User>> {
        self.fetch_page(&PageKind::GroupUsers(group_id.to_string()), request)
            .await
    }

    /// `GET /users/{userId}`
    #[instrument(skip(self))]
    pub async fn get_user_detail(&self, user_id: &str) -> DocusignResult<(UserDetail, Annotations)> {
        let url = self.endpoint(&["users", user_id])?;
        let (response, annotations) = self.send(Method::GET, url, None).await?;
        let detail = serde_json::from_value(response.body)?;
        Ok((detail, annotations))
    }

    /// `POST /users`
    #[instrument(skip(self, request))]
    pub async fn create_users(
        &self,
        request: &CreateUsersRequest,
    ) -> DocusignResult<(UserCreationResponse, Annotations)> {
        if request.new_users.is_empty() {
            return Err(DocusignError::Validation(
                "at least one user must be provided".into(),
            ));
        }

        let url = self.endpoint(&["users"])?;
        let body = serde_json::to_value(request)?;
        let (response, annotations) = self.send(Method::POST, url, Some(body)).await?;
        let created = if response.body.is_null() {
            UserCreationResponse::default()
        } else {
            serde_json::from_value(response.body)?
        };
        Ok((created, annotations))
    }
}
