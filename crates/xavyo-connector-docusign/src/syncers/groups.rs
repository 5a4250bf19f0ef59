//! Group listing and membership grants.

use async_trait::async_trait;
use serde_json::{json, Map};
use std::sync::Arc;
use tracing::{debug, instrument};
use xavyo_connector_sdk::{
    ConnectorError, ConnectorResult, Entitlement, Grant, PageToken, Resource, ResourceId,
    ResourceSyncer, ResourceType, SyncContext, SyncPage,
};

use crate::client::DocusignClient;
use crate::resources::{self, GROUP_RESOURCE_TYPE, MEMBER_ENTITLEMENT, USER_RESOURCE_TYPE};
use crate::syncers::page_window;
use crate::DocusignConfig;

/// Syncs DocuSign groups and their members.
#[derive(Debug)]
pub struct GroupSyncer {
    client: DocusignClient,
    config: Arc<DocusignConfig>,
    resource_type: ResourceType,
}

impl GroupSyncer {
    pub fn new(client: DocusignClient, config: Arc<DocusignConfig>) -> Self {
        Self {
            client,
            config,
            resource_type: resources::group_resource_type(),
        }
    }
}

#[async_trait]
impl ResourceSyncer for GroupSyncer {
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
        let (mut stack, request) = page_window(page, GROUP_RESOURCE_TYPE, "", &self.config)?;

        let fetched = ctx
            .run(async {
                self.client
                    .list_groups(&request)
                    .await
                    .map_err(ConnectorError::from)
            })
            .await?;

        let groups: Vec<Resource> = fetched
            .items
            .iter()
            .map(resources::group_resource)
            .collect();
        debug!(count = groups.len(), start = request.start_position, "Listed groups");

        let next = stack.advance(&fetched.next_cursor)?;
        Ok(SyncPage::new(groups, next, fetched.annotations))
    }

    async fn entitlements(
        &self,
        _ctx: &SyncContext,
        resource: &Resource,
        _page: &PageToken,
    ) -> ConnectorResult<SyncPage<Entitlement>> {
        let member = Entitlement::assignment(resource, MEMBER_ENTITLEMENT)
            .with_display_name(format!("Member of {}", resource.display_name))
            .with_description(format!("Member of {} group", resource.display_name))
            .with_grantable_to(&resources::user_resource_type());

        Ok(SyncPage::single(vec![member]))
    }

    /// Members of one group, paged under the `(user, group_id)` scope.
    #[instrument(skip(self, ctx, resource, page), fields(group_id = %resource.id.resource))]
    async fn grants(
        &self,
        ctx: &SyncContext,
        resource: &Resource,
        page: &PageToken,
    ) -> ConnectorResult<SyncPage<Grant>> {
        let group_id = resource.id.resource.as_str();
        let (mut stack, request) = page_window(page, USER_RESOURCE_TYPE, group_id, &self.config)?;

        let fetched = ctx
            .run(async {
                self.client
                    .list_group_users(group_id, &request)
                    .await
                    .map_err(ConnectorError::from)
            })
            .await?;

        let grants: Vec<Grant> = fetched
            .items
            .iter()
            .map(|user| {
                let mut metadata = Map::new();
                metadata.insert("groupId".into(), json!(group_id));
                metadata.insert("groupName".into(), json!(resource.display_name));
                metadata.insert("userId".into(), json!(user.user_id));
                metadata.insert("username".into(), json!(user.user_name));

                Grant::new(
                    resource,
                    MEMBER_ENTITLEMENT,
                    ResourceId::new(USER_RESOURCE_TYPE, user.user_id.clone()),
                )
                .with_metadata(metadata)
            })
            .collect();
        debug!(count = grants.len(), "Listed group members");

        let next = stack.advance(&fetched.next_cursor)?;
        Ok(SyncPage::new(grants, next, fetched.annotations))
    }
}
