//! DocuSign connector entry point.

use std::sync::Arc;
use tracing::{info, instrument};
use xavyo_connector_sdk::{
    AccountCreationField, AccountManager, Annotations, ConnectorError, ConnectorMetadata,
    ConnectorResult, ResourceSyncer, SyncContext,
};

use crate::client::{DocusignClient, PageRequest};
use crate::permissions::{PermissionCatalog, PermissionMapper};
use crate::syncers::{GroupSyncer, PermissionSyncer, UserSyncer};
use crate::{DocusignConfig, DocusignCredentials, DocusignResult};

pub const DISPLAY_NAME: &str = "DocuSign";
pub const DESCRIPTION: &str =
    "Connector syncs data users, permissions, groups and create users of DocuSign";

/// DocuSign connector.
#[derive(Debug)]
pub struct DocusignConnector {
    client: DocusignClient,
    users: Arc<UserSyncer>,
    groups: Arc<GroupSyncer>,
    permissions: Arc<PermissionSyncer>,
}

impl DocusignConnector {
    /// Creates a connector talking to DocuSign over HTTP.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration or credentials are invalid.
    pub fn new(config: DocusignConfig, credentials: DocusignCredentials) -> DocusignResult<Self> {
        config.validate()?;
        credentials.validate(config.token_file.is_some())?;

        let client = DocusignClient::new(&config, credentials)?;
        Ok(Self::with_client(client, config, PermissionCatalog::docusign()))
    }

    /// Load configuration and credentials from the environment.
    pub fn from_env() -> DocusignResult<Self> {
        Self::new(DocusignConfig::from_env()?, DocusignCredentials::from_env())
    }

    /// Creates a connector over an existing client.
    pub fn with_client(
        client: DocusignClient,
        config: DocusignConfig,
        catalog: PermissionCatalog,
    ) -> Self {
        let config = Arc::new(config);
        Self {
            users: Arc::new(UserSyncer::new(client.clone(), Arc::clone(&config))),
            groups: Arc::new(GroupSyncer::new(client.clone(), Arc::clone(&config))),
            permissions: Arc::new(PermissionSyncer::new(
                client.clone(),
                config,
                PermissionMapper::new(catalog),
            )),
            client,
        }
    }

    /// Syncers in walk order: users, groups, permissions.
    pub fn resource_syncers(&self) -> Vec<Arc<dyn ResourceSyncer>> {
        let users: Arc<dyn ResourceSyncer> = self.users.clone();
        let groups: Arc<dyn ResourceSyncer> = self.groups.clone();
        let permissions: Arc<dyn ResourceSyncer> = self.permissions.clone();
        vec![users, groups, permissions]
    }

    pub fn account_manager(&self) -> Arc<dyn AccountManager> {
        self.users.clone()
    }

    pub fn metadata(&self) -> ConnectorMetadata {
        ConnectorMetadata {
            display_name: DISPLAY_NAME.to_string(),
            description: DESCRIPTION.to_string(),
            account_creation_fields: vec![
                AccountCreationField {
                    name: "email".to_string(),
                    display_name: "Email".to_string(),
                    description: "This email will be used as the login for the user.".to_string(),
                    placeholder: "Email".to_string(),
                    required: true,
                    order: 1,
                },
                AccountCreationField {
                    name: "username".to_string(),
                    display_name: "Username".to_string(),
                    description: "This username will be used for the user.".to_string(),
                    placeholder: "Username".to_string(),
                    required: true,
                    order: 2,
                },
            ],
        }
    }

    /// Proves the credentials work by reading a one-item users page.
    #[instrument(skip(self, ctx), fields(account_id = %self.client.account_id()))]
    pub async fn validate(&self, ctx: &SyncContext) -> ConnectorResult<Annotations> {
        let page = ctx
            .run(async {
                self.client
                    .list_users(&PageRequest::new(0, 1))
                    .await
                    .map_err(ConnectorError::from)
            })
            .await?;

        info!("DocuSign credentials validated");
        Ok(page.annotations)
    }
}
