//! Resource syncer traits
//!
//! The capability contract a connector implements per resource type.

use async_trait::async_trait;
use std::future::Future;
use tokio_util::sync::CancellationToken;

use crate::error::{ConnectorError, ConnectorResult};
use crate::pagination::{PageToken, SyncPage};
use crate::types::{AccountInfo, Entitlement, Grant, Resource, ResourceId, ResourceType};

/// Per-call context threaded through every syncer operation.
#[derive(Debug, Clone, Default)]
pub struct SyncContext {
    cancel: CancellationToken,
}

impl SyncContext {
    pub fn new(cancel: CancellationToken) -> Self {
        Self { cancel }
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Fail with [`ConnectorError::Cancelled`] once cancellation was requested.
    pub fn check_cancelled(&self) -> ConnectorResult<()> {
        if self.cancel.is_cancelled() {
            return Err(ConnectorError::Cancelled);
        }
        Ok(())
    }

    /// Drive `fut` unless cancellation is requested first.
    pub async fn run<F, T>(&self, fut: F) -> ConnectorResult<T>
    where
        F: Future<Output = ConnectorResult<T>>,
    {
        self.check_cancelled()?;
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ConnectorError::Cancelled),
            result = fut => result,
        }
    }
}

/// Lists one resource type and its relationships.
///
/// Every method returns a [`SyncPage`]; a non-empty `next_page_token` means the
/// caller should call again with that token.
#[async_trait]
pub trait ResourceSyncer: Send + Sync {
    /// The resource type this syncer handles.
    fn resource_type(&self) -> &ResourceType;

    /// List resources, optionally under a parent.
    async fn list(
        &self,
        ctx: &SyncContext,
        parent: Option<&ResourceId>,
        page: &PageToken,
    ) -> ConnectorResult<SyncPage<Resource>>;

    /// List the entitlements a resource offers.
    async fn entitlements(
        &self,
        ctx: &SyncContext,
        resource: &Resource,
        page: &PageToken,
    ) -> ConnectorResult<SyncPage<Entitlement>>;

    /// List grants on (or of) a resource.
    async fn grants(
        &self,
        ctx: &SyncContext,
        resource: &Resource,
        page: &PageToken,
    ) -> ConnectorResult<SyncPage<Grant>>;
}

/// Capability for provisioning new accounts.
#[async_trait]
pub trait AccountManager: Send + Sync {
    /// Create an account and return its resource.
    async fn create_account(
        &self,
        ctx: &SyncContext,
        account: &AccountInfo,
    ) -> ConnectorResult<Resource>;
}
