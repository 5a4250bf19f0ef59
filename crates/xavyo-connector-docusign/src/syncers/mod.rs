//! Resource syncers for users, groups and permissions.
//!
//! Every paged call threads a [`CursorStack`] whose active position holds an
//! encoded [`OffsetCursor`] for the DocuSign listing in progress.

mod groups;
mod permissions;
mod users;

pub use groups::GroupSyncer;
pub use permissions::PermissionSyncer;
pub use users::UserSyncer;

use xavyo_connector_sdk::{ConnectorResult, CursorStack, OffsetCursor, PageToken};

use crate::client::PageRequest;
use crate::DocusignConfig;

/// Decode `token` for the listing scoped to `(resource_type_id, resource_id)`.
pub(crate) fn page_window(
    token: &PageToken,
    resource_type_id: &str,
    resource_id: &str,
    config: &DocusignConfig,
) -> ConnectorResult<(CursorStack, PageRequest)> {
    let (stack, provider_cursor) = CursorStack::decode(&token.token, resource_type_id, resource_id)?;
    let offset = OffsetCursor::decode(&provider_cursor)?;
    let request = PageRequest::new(offset.start_position, config.effective_page_size(token.size));
    Ok((stack, request))
}
