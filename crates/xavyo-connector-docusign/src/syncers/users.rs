//! User listing, group memberships and account creation.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use xavyo_connector_sdk::{
    AccountInfo, AccountManager, ConnectorError, ConnectorResult, Entitlement, Grant,
    PageToken, Resource, ResourceId, ResourceSyncer, ResourceType, SyncContext, SyncPage,
};

use crate::client::DocusignClient;
use crate::models::{CreateUsersRequest, NewUser, User};
use crate::resources::{self, MEMBER_ENTITLEMENT, USER_RESOURCE_TYPE};
use crate::syncers::page_window;
use crate::DocusignConfig;

/// Syncs DocuSign users.
#[derive(Debug)]
pub struct UserSyncer {
    client: DocusignClient,
    config: Arc<DocusignConfig>,
    resource_type: ResourceType,
}

impl UserSyncer {
    pub fn new(client: DocusignClient, config: Arc<DocusignConfig>) -> Self {
        Self {
            client,
            config,
            resource_type: resources::user_resource_type(),
        }
    }
}

#[async_trait]
impl ResourceSyncer for UserSyncer {
    fn resource_type(&self) -> &ResourceType {
        &self.resource_type
    }

    #[instrument(skip(self, ctx, page))]
    async fn list(
        &self,
        ctx: &SyncContext,
        _parent: Option<&ResourceId>,
        page: &PageToken,
    ) -> ConnectorResult<SyncPage<Resource>> {
        let (mut stack, request) = page_window(page, USER_RESOURCE_TYPE, "", &self.config)?;

        let fetched = ctx
            .run(async {
                self.client
                    .list_users(&request)
                    .await
                    .map_err(ConnectorError::from)
            })
            .await?;

        let users: Vec<Resource> = fetched.items.iter().map(resources::user_resource).collect();
        debug!(count = users.len(), start = request.start_position, "Listed users");

        let next = stack.advance(&fetched.next_cursor)?;
        Ok(SyncPage::new(users, next, fetched.annotations))
    }

    async fn entitlements(
        &self,
        _ctx: &SyncContext,
        _resource: &Resource,
        _page: &PageToken,
    ) -> ConnectorResult<SyncPage<Entitlement>> {
        Ok(SyncPage::single(Vec::new()))
    }

    /// Group memberships of one user, read from the user detail.
    #[instrument(skip(self, ctx, resource, _page), fields(user_id = %resource.id.resource))]
    async fn grants(
        &self,
        ctx: &SyncContext,
        resource: &Resource,
        _page: &PageToken,
    ) -> ConnectorResult<SyncPage<Grant>> {
        let (detail, annotations) = ctx
            .run(async {
                self.client
                    .get_user_detail(&resource.id.resource)
                    .await
                    .map_err(ConnectorError::from)
            })
            .await?;

        let grants = detail
            .group_list
            .iter()
            .map(|group| {
                Grant::new(
                    &resources::group_resource(group),
                    MEMBER_ENTITLEMENT,
                    resource.id.clone(),
                )
            })
            .collect();

        Ok(SyncPage::new(grants, String::new(), annotations))
    }
}

#[async_trait]
impl AccountManager for UserSyncer {
    #[instrument(skip(self, ctx, account))]
    async fn create_account(
        &self,
        ctx: &SyncContext,
        account: &AccountInfo,
    ) -> ConnectorResult<Resource> {
        let email = account
            .profile_str("email")
            .ok_or_else(|| ConnectorError::validation("email is required"))?;
        let username = account
            .profile_str("username")
            .ok_or_else(|| ConnectorError::validation("username is required"))?;

        let request = CreateUsersRequest {
            new_users: vec![NewUser {
                user_name: username.to_string(),
                email: email.to_string(),
            }],
        };

        let (response, _) = ctx
            .run(async {
                self.client
                    .create_users(&request)
                    .await
                    .map_err(ConnectorError::from)
            })
            .await?;

        let created = response
            .new_users
            .first()
            .ok_or_else(|| ConnectorError::invalid_data("no user returned from API"))?;

        if let Some(details) = created.error_details.as_ref() {
            return Err(ConnectorError::invalid_data(format!(
                "failed to create user: {} - {}",
                details.error_code, details.message
            )));
        }

        info!(user_id = %created.user_id, "Created DocuSign user");
        Ok(resources::user_resource(&User::from(created)))
    }
}
