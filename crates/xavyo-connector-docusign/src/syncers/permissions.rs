//! Permission singleton and settings-derived grants.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use xavyo_connector_sdk::{
    Annotation, Annotations, ConnectorError, ConnectorResult, Entitlement, Grant, PageToken,
    Resource, ResourceId, ResourceSyncer, ResourceType, SyncContext, SyncPage,
};

use crate::client::DocusignClient;
use crate::permissions::PermissionMapper;
use crate::resources::{self, PERMISSION_RESOURCE_ID, USER_RESOURCE_TYPE};
use crate::syncers::page_window;
use crate::{DocusignConfig, DocusignError};

/// Exposes the permission catalog as entitlements of one role resource.
#[derive(Debug)]
pub struct PermissionSyncer {
    client: DocusignClient,
    config: Arc<DocusignConfig>,
    mapper: PermissionMapper,
    resource_type: ResourceType,
}

impl PermissionSyncer {
    pub fn new(client: DocusignClient, config: Arc<DocusignConfig>, mapper: PermissionMapper) -> Self {
        Self {
            client,
            config,
            mapper,
            resource_type: resources::permission_resource_type(),
        }
    }
}

#[async_trait]
impl ResourceSyncer for PermissionSyncer {
    fn resource_type(&self) -> &ResourceType {
        &self.resource_type
    }

    async fn list(
        &self,
        _ctx: &SyncContext,
        _parent: Option<&ResourceId>,
        _page: &PageToken,
    ) -> ConnectorResult<SyncPage<Resource>> {
        Ok(SyncPage::single(vec![resources::permission_resource()]))
    }

    async fn entitlements(
        &self,
        _ctx: &SyncContext,
        resource: &Resource,
        _page: &PageToken,
    ) -> ConnectorResult<SyncPage<Entitlement>> {
        let user_type = resources::user_resource_type();
        let entitlements = self
            .mapper
            .catalog()
            .definitions()
            .iter()
            .map(|definition| {
                Entitlement::permission(resource, definition.id.clone())
                    .with_display_name(definition.display_name.clone())
                    .with_description(definition.description.clone())
                    .with_grantable_to(&user_type)
            })
            .collect();

        Ok(SyncPage::single(entitlements))
    }

    /// One page of users, each resolved to its settings-derived grants.
    ///
    /// User details are fetched one at a time. A user whose settings cannot be
    /// normalized is skipped with a [`Annotation::SkippedSubject`] unless
    /// failure isolation is turned off.
    #[instrument(skip(self, ctx, resource, page))]
    async fn grants(
        &self,
        ctx: &SyncContext,
        resource: &Resource,
        page: &PageToken,
    ) -> ConnectorResult<SyncPage<Grant>> {
        if resource.id.resource != PERMISSION_RESOURCE_ID {
            return Ok(SyncPage::single(Vec::new()));
        }

        let (mut stack, request) =
            page_window(page, USER_RESOURCE_TYPE, PERMISSION_RESOURCE_ID, &self.config)?;

        let fetched = ctx
            .run(async {
                self.client
                    .list_users(&request)
                    .await
                    .map_err(ConnectorError::from)
            })
            .await?;

        let mut annotations = Annotations::new();
        annotations.extend(fetched.annotations);
        let mut grants = Vec::new();

        for user in &fetched.items {
            let (detail, detail_annotations) = ctx
                .run(async {
                    self.client
                        .get_user_detail(&user.user_id)
                        .await
                        .map_err(ConnectorError::from)
                })
                .await?;
            annotations.extend(detail_annotations);

            match self.mapper.derive_grants(resource, &detail) {
                Ok(user_grants) => grants.extend(user_grants),
                Err(DocusignError::SettingsDecode(message)) if self.config.isolate_user_failures => {
                    warn!(user_id = %user.user_id, error = %message, "Skipping user with undecodable settings");
                    annotations.push(Annotation::SkippedSubject {
                        subject_id: user.user_id.clone(),
                        reason: message,
                    });
                }
                Err(DocusignError::SettingsDecode(message)) => {
                    return Err(ConnectorError::SettingsDecode {
                        subject_id: user.user_id.clone(),
                        message,
                    });
                }
                Err(e) => return Err(e.into()),
            }
        }
        debug!(
            users = fetched.items.len(),
            grants = grants.len(),
            "Derived permission grants"
        );

        let next = stack.advance(&fetched.next_cursor)?;
        Ok(SyncPage::new(grants, next, annotations))
    }
}
