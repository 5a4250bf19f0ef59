//! DocuSign eSignature Connector for xavyo
//!
//! Mirrors a DocuSign account's users, groups and per-user capability settings
//! into the resource graph defined by `xavyo-connector-sdk`.
//!
//! # Features
//!
//! - `OAuth2` refresh-token authentication with an optional token file
//! - Resumable paging of users, groups and group members
//! - Permission grants derived from each user's settings
//! - Account creation (`POST /users`)
//! - Rate-limit headers forwarded as page annotations
//!
//! # Example
//!
//! ```no_run
//! use xavyo_connector_docusign::{DocusignConfig, DocusignConnector, DocusignCredentials};
//! use xavyo_connector_sdk::{SyncContext, SyncRunner};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DocusignConfig::builder()
//!     .account_id("your-account-id")
//!     .build()?;
//!
//! let credentials =
//!     DocusignCredentials::refreshable("integration-key", "secret-key", "refresh-token");
//!
//! let connector = DocusignConnector::new(config, credentials)?;
//! let snapshot = SyncRunner::new(connector.resource_syncers())
//!     .run(&SyncContext::default())
//!     .await?;
//! println!("{} grants", snapshot.grants.len());
//! # Ok(())
//! # }
//! ```

mod auth;
pub mod client;
mod config;
mod connector;
mod error;
pub mod executor;
pub mod models;
pub mod permissions;
pub mod rate_limit;
pub mod resources;
pub mod settings;
mod syncers;
mod token_store;

// Re-exports
pub use auth::TokenCache;
pub use client::{DocusignClient, FetchedPage, PageKind, PageRequest};
pub use config::{
    DocusignConfig, DocusignConfigBuilder, DocusignCredentials, DEFAULT_API_URL,
    DEFAULT_OAUTH_URL, MAX_PAGE_SIZE,
};
pub use connector::DocusignConnector;
pub use error::{DocusignError, DocusignResult};
pub use executor::{HttpExecutor, ProviderResponse, RequestExecutor};
pub use permissions::{
    PermissionCatalog, PermissionDefinition, PermissionMapper, PermissionRule, PermissionValue,
};
pub use syncers::{GroupSyncer, PermissionSyncer, UserSyncer};
pub use token_store::{StoredToken, TokenStore};
