//! Account creation through `POST /users`.

mod common;

use common::*;
use serde_json::{json, Map};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};
use xavyo_connector_sdk::{AccountInfo, ConnectorError, SyncContext};

fn account(email: &str, username: &str) -> AccountInfo {
    let mut profile = Map::new();
    profile.insert("email".into(), json!(email));
    profile.insert("username".into(), json!(username));
    AccountInfo { profile }
}

#[tokio::test]
async fn test_create_account_returns_user_resource() {
    let mock = MockDocusignServer::new().await;
    Mock::given(method("POST"))
        .and(path(account_path("/users")))
        .and(body_json(json!({
            "newUsers": [{ "userName": "ada", "email": "ada@example.com" }]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "newUsers": [{
                "userId": "u-new",
                "userName": "ada",
                "email": "ada@example.com",
                "userStatus": "ActivationSent"
            }]
        })))
        .expect(1)
        .mount(&mock.server)
        .await;

    let connector = mock.connector();
    let resource = connector
        .account_manager()
        .create_account(&SyncContext::default(), &account("ada@example.com", "ada"))
        .await
        .unwrap();

    assert_eq!(resource.id.resource_type, "user");
    assert_eq!(resource.id.resource, "u-new");
    assert_eq!(resource.display_name, "ada");
    let user = resource.user_trait().unwrap();
    assert_eq!(user.emails, vec!["ada@example.com".to_string()]);
}

#[tokio::test]
async fn test_create_account_requires_email_and_username() {
    let mock = MockDocusignServer::new().await;
    let manager = mock.connector().account_manager();
    let ctx = SyncContext::default();

    let missing_email = manager.create_account(&ctx, &account("", "ada")).await;
    match missing_email {
        Err(ConnectorError::Validation { message }) => assert_eq!(message, "email is required"),
        other => panic!("unexpected result: {other:?}"),
    }

    let missing_username = manager
        .create_account(&ctx, &account("ada@example.com", ""))
        .await;
    match missing_username {
        Err(ConnectorError::Validation { message }) => assert_eq!(message, "username is required"),
        other => panic!("unexpected result: {other:?}"),
    }

    assert!(mock.server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_account_surfaces_error_details() {
    let mock = MockDocusignServer::new().await;
    Mock::given(method("POST"))
        .and(path(account_path("/users")))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "newUsers": [{
                "email": "ada@example.com",
                "errorDetails": {
                    "errorCode": "USER_ALREADY_EXISTS_IN_ACCOUNT",
                    "message": "Username and email combination already exists for this account."
                }
            }]
        })))
        .mount(&mock.server)
        .await;

    let result = mock
        .connector()
        .account_manager()
        .create_account(&SyncContext::default(), &account("ada@example.com", "ada"))
        .await;

    match result {
        Err(ConnectorError::InvalidData { message }) => {
            assert!(message.starts_with("failed to create user: USER_ALREADY_EXISTS_IN_ACCOUNT - "));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_create_account_empty_response() {
    let mock = MockDocusignServer::new().await;
    Mock::given(method("POST"))
        .and(path(account_path("/users")))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "newUsers": [] })))
        .mount(&mock.server)
        .await;

    let result = mock
        .connector()
        .account_manager()
        .create_account(&SyncContext::default(), &account("ada@example.com", "ada"))
        .await;

    match result {
        Err(ConnectorError::InvalidData { message }) => {
            assert_eq!(message, "no user returned from API");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_metadata_advertises_creation_fields() {
    let mock = MockDocusignServer::new().await;
    let metadata = mock.connector().metadata();

    assert_eq!(metadata.display_name, "DocuSign");
    let names: Vec<&str> = metadata
        .account_creation_fields
        .iter()
        .map(|f| f.name.as_str())
        .collect();
    assert_eq!(names, vec!["email", "username"]);
    assert!(metadata.account_creation_fields.iter().all(|f| f.required));
}
