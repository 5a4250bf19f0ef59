//! Common test utilities for xavyo-connector-docusign integration tests.

#![allow(dead_code)]

use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use xavyo_connector_docusign::{
    DocusignClient, DocusignConfig, DocusignConnector, DocusignCredentials, HttpExecutor,
    PermissionCatalog,
};

pub const ACCOUNT_ID: &str = "acct-1";

/// Path of an account-scoped endpoint.
pub fn account_path(suffix: &str) -> String {
    format!("/restapi/v2.1/accounts/{ACCOUNT_ID}{suffix}")
}

/// Test data factory for DocuSign list users.
pub fn create_test_user(id: &str, name: &str) -> Value {
    json!({
        "userId": id,
        "userName": name,
        "email": format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        "userStatus": "Active",
        "isAdmin": "False",
        "permissionProfileName": "DocuSign Sender"
    })
}

/// Test data factory for DocuSign groups.
pub fn create_test_group(id: &str, name: &str) -> Value {
    json!({
        "groupId": id,
        "groupName": name,
        "groupType": "CustomGroup",
        "usersCount": "2"
    })
}

/// User detail with the given settings.
pub fn create_user_detail(id: &str, name: &str, settings: Value) -> Value {
    json!({
        "userId": id,
        "userName": name,
        "email": format!("{}@example.com", id),
        "isAdmin": "False",
        "userStatus": "Active",
        "permissionProfileName": "DocuSign Sender",
        "userSettings": settings,
        "groupList": [create_test_group("g-1", "Senders")]
    })
}

/// Wraps items in a DocuSign list response with string counters.
pub fn create_list_response(key: &str, items: Vec<Value>, start: usize, total: usize) -> Value {
    let count = items.len();
    let end = if count == 0 { start } else { start + count - 1 };
    let mut response = json!({
        "resultSetSize": count.to_string(),
        "totalSetSize": total.to_string(),
        "startPosition": start.to_string(),
        "endPosition": end.to_string(),
    });
    response[key] = Value::Array(items);
    response
}

/// Creates a mock OAuth token response.
pub fn create_token_response(access_token: &str, expires_in: u64, refresh: Option<&str>) -> Value {
    let mut response = json!({
        "access_token": access_token,
        "token_type": "Bearer",
        "expires_in": expires_in
    });
    if let Some(refresh) = refresh {
        response["refresh_token"] = json!(refresh);
    }
    response
}

/// Mock server wrapper with common setup helpers.
pub struct MockDocusignServer {
    pub server: MockServer,
}

impl MockDocusignServer {
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    pub fn url(&self) -> String {
        self.server.uri()
    }

    pub fn config(&self) -> DocusignConfig {
        DocusignConfig::builder()
            .api_url(self.url())
            .oauth_url(self.url())
            .account_id(ACCOUNT_ID)
            .page_size(2)
            .build()
            .unwrap()
    }

    /// Client authenticated with a static token.
    pub fn client(&self) -> DocusignClient {
        self.client_with(&self.config(), DocusignCredentials::from_access_token("test-token"))
    }

    pub fn client_with(
        &self,
        config: &DocusignConfig,
        credentials: DocusignCredentials,
    ) -> DocusignClient {
        let executor = HttpExecutor::new(config, credentials).unwrap();
        DocusignClient::with_executor(Arc::new(executor), &config.api_url, &config.account_id)
    }

    pub fn connector(&self) -> DocusignConnector {
        self.connector_with(self.config())
    }

    pub fn connector_with(&self, config: DocusignConfig) -> DocusignConnector {
        let client = self.client_with(&config, DocusignCredentials::from_access_token("test-token"));
        DocusignConnector::with_client(client, config, PermissionCatalog::docusign())
    }

    /// Serves one page of a listing at `suffix` for `startPosition = start`.
    pub async fn mock_list_page(&self, suffix: &str, start: usize, body: Value) {
        Mock::given(method("GET"))
            .and(path(account_path(suffix)))
            .and(query_param("startPosition", start.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Serves `items` under `key` at `suffix`, split into pages of `page_size`.
    pub async fn mock_paged_listing(
        &self,
        suffix: &str,
        key: &str,
        items: Vec<Value>,
        page_size: usize,
    ) {
        let total = items.len();
        if total == 0 {
            self.mock_list_page(suffix, 0, create_list_response(key, Vec::new(), 0, 0))
                .await;
            return;
        }
        for (i, chunk) in items.chunks(page_size).enumerate() {
            let start = i * page_size;
            self.mock_list_page(
                suffix,
                start,
                create_list_response(key, chunk.to_vec(), start, total),
            )
            .await;
        }
    }

    pub async fn mock_user_detail(&self, user_id: &str, detail: Value) {
        Mock::given(method("GET"))
            .and(path(account_path(&format!("/users/{user_id}"))))
            .respond_with(ResponseTemplate::new(200).set_body_json(detail))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_token_endpoint(&self, response: Value) {
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(response))
            .mount(&self.server)
            .await;
    }
}
