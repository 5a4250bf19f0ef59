//! # Connector SDK
//!
//! Contract between xavyo governance sync and the connectors that mirror an
//! external system into a normalized resource graph.
//!
//! A connector exposes one [`ResourceSyncer`] per resource type. Each syncer
//! lists resources, the entitlements they offer, and the grants that bind
//! principals to those entitlements, one page at a time. Page tokens are opaque
//! to the caller; connectors build them with the codecs in [`pagination`].
//!
//! ## Crate Organization
//!
//! - [`types`] - Resources, entitlements, grants
//! - [`annotations`] - Rate-limit and skip annotations forwarded with each page
//! - [`pagination`] - Page tokens, [`CursorStack`], [`OffsetCursor`]
//! - [`traits`] - [`ResourceSyncer`], [`AccountManager`], [`SyncContext`]
//! - [`sync`] - [`SyncRunner`] for full walks
//! - [`error`] - [`ConnectorError`]

pub mod annotations;
pub mod error;
pub mod pagination;
pub mod sync;
pub mod traits;
pub mod types;

pub use annotations::{Annotation, Annotations, RateLimitDescription, RateLimitStatus};
pub use error::{ConnectorError, ConnectorResult};
pub use pagination::{CursorStack, OffsetCursor, PagePosition, PageToken, SyncPage};
pub use sync::{SyncRunner, SyncSnapshot};
pub use traits::{AccountManager, ResourceSyncer, SyncContext};
pub use types::{
    AccountCreationField, AccountInfo, ConnectorMetadata, Entitlement, EntitlementPurpose, Grant,
    Profile, Resource, ResourceId, ResourceTraits, ResourceType, ResourceTypeTrait, UserStatus,
    UserTrait,
};

// Re-export async_trait for syncer implementors
pub use async_trait::async_trait;
