//! Full sync walk over a set of resource syncers.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::annotations::Annotations;
use crate::error::{ConnectorError, ConnectorResult};
use crate::pagination::{PageToken, SyncPage};
use crate::traits::{ResourceSyncer, SyncContext};
use crate::types::{Entitlement, Grant, Resource};

/// Default page budget per listing.
const DEFAULT_MAX_PAGES: usize = 10_000;

/// Everything observed during one sync walk.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncSnapshot {
    pub resources: Vec<Resource>,
    pub entitlements: Vec<Entitlement>,
    pub grants: Vec<Grant>,
    pub annotations: Annotations,
}

/// Drives every syncer to exhaustion, threading page tokens.
pub struct SyncRunner {
    syncers: Vec<Arc<dyn ResourceSyncer>>,
    page_size: u32,
    max_pages: usize,
}

impl SyncRunner {
    pub fn new(syncers: Vec<Arc<dyn ResourceSyncer>>) -> Self {
        Self {
            syncers,
            page_size: 0,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    /// Page size passed to every syncer call.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Maximum pages fetched for any single listing.
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Walk all syncers. Stops at the first error.
    #[instrument(skip(self, ctx))]
    pub async fn run(&self, ctx: &SyncContext) -> ConnectorResult<SyncSnapshot> {
        let mut snapshot = SyncSnapshot::default();

        for syncer in &self.syncers {
            let resource_type = syncer.resource_type().id.clone();
            info!(resource_type = %resource_type, "Syncing resource type");

            let resources = self
                .drain(ctx, &resource_type, &mut snapshot.annotations, |page| {
                    let syncer = Arc::clone(syncer);
                    async move { syncer.list(ctx, None, &page).await }
                })
                .await?;

            for resource in &resources {
                let entitlements = self
                    .drain(ctx, &resource_type, &mut snapshot.annotations, |page| {
                        let syncer = Arc::clone(syncer);
                        async move { syncer.entitlements(ctx, resource, &page).await }
                    })
                    .await?;
                snapshot.entitlements.extend(entitlements);

                let grants = self
                    .drain(ctx, &resource_type, &mut snapshot.annotations, |page| {
                        let syncer = Arc::clone(syncer);
                        async move { syncer.grants(ctx, resource, &page).await }
                    })
                    .await?;
                snapshot.grants.extend(grants);
            }

            snapshot.resources.extend(resources);
        }

        info!(
            resources = snapshot.resources.len(),
            entitlements = snapshot.entitlements.len(),
            grants = snapshot.grants.len(),
            "Sync walk completed"
        );

        Ok(snapshot)
    }

    /// Request pages until the token runs out.
    async fn drain<T, F, Fut>(
        &self,
        ctx: &SyncContext,
        resource_type: &str,
        annotations: &mut Annotations,
        mut fetch: F,
    ) -> ConnectorResult<Vec<T>>
    where
        F: FnMut(PageToken) -> Fut,
        Fut: std::future::Future<Output = ConnectorResult<SyncPage<T>>>,
    {
        let mut items = Vec::new();
        let mut token = String::new();

        for page_number in 0..self.max_pages {
            ctx.check_cancelled()?;

            let request = PageToken::new(token).with_size(self.page_size);
            let page = fetch(request).await?;
            debug!(
                resource_type = %resource_type,
                page = page_number,
                items = page.items.len(),
                "Fetched page"
            );

            items.extend(page.items);
            annotations.extend(page.annotations);

            if page.next_page_token.is_empty() {
                return Ok(items);
            }
            token = page.next_page_token;
        }

        Err(ConnectorError::PageLimitExceeded {
            resource_type: resource_type.to_string(),
            limit: self.max_pages,
        })
    }
}
