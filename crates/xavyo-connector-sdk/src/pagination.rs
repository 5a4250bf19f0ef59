//! Page tokens and cursor codecs.
//!
//! Two wire forms exist, both standard base64 over canonical JSON:
//!
//! - [`CursorStack`]: an ordered list of [`PagePosition`]s, innermost last.
//!   Nested listings (every group, then every member of one group) each keep
//!   their own provider cursor so the walk can resume at any level.
//! - [`OffsetCursor`]: a flat `{"startPosition": n}` record for endpoints that
//!   page by absolute offset.
//!
//! Both decode the empty string as "start from the beginning".

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::annotations::Annotations;
use crate::error::{ConnectorError, ConnectorResult};

/// Page request handed to a syncer by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageToken {
    /// Requested page size; 0 lets the connector choose.
    #[serde(default)]
    pub size: u32,
    /// Opaque continuation token from a previous page, or empty.
    #[serde(default)]
    pub token: String,
}

impl PageToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            size: 0,
            token: token.into(),
        }
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }
}

/// One page of syncer output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncPage<T> {
    pub items: Vec<T>,
    /// Token for the next page; empty when the listing is exhausted.
    pub next_page_token: String,
    pub annotations: Annotations,
}

impl<T> SyncPage<T> {
    pub fn new(items: Vec<T>, next_page_token: impl Into<String>, annotations: Annotations) -> Self {
        Self {
            items,
            next_page_token: next_page_token.into(),
            annotations,
        }
    }

    /// A complete single-page result.
    pub fn single(items: Vec<T>) -> Self {
        Self::new(items, String::new(), Annotations::new())
    }

    /// Whether the caller should request another page.
    pub fn has_more(&self) -> bool {
        !self.next_page_token.is_empty()
    }
}

/// Position of one resource-type scope within a nested walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagePosition {
    pub resource_type_id: String,
    pub resource_id: String,
    pub provider_cursor: String,
}

impl PagePosition {
    pub fn new(resource_type_id: impl Into<String>, resource_id: impl Into<String>) -> Self {
        Self {
            resource_type_id: resource_type_id.into(),
            resource_id: resource_id.into(),
            provider_cursor: String::new(),
        }
    }

    fn is_scope(&self, resource_type_id: &str, resource_id: &str) -> bool {
        self.resource_type_id == resource_type_id && self.resource_id == resource_id
    }
}

/// Stack of page positions, innermost (active) entry last.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CursorStack {
    positions: Vec<PagePosition>,
}

impl CursorStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a serialized stack. The empty string yields an empty stack.
    pub fn unmarshal(token: &str) -> ConnectorResult<Self> {
        if token.is_empty() {
            return Ok(Self::new());
        }

        let bytes = STANDARD
            .decode(token)
            .map_err(|e| ConnectorError::malformed_cursor(format!("invalid base64: {e}")))?;

        serde_json::from_slice(&bytes)
            .map_err(|e| ConnectorError::malformed_cursor(format!("invalid cursor payload: {e}")))
    }

    /// Serialize the whole stack to its opaque string form.
    pub fn marshal(&self) -> ConnectorResult<String> {
        let json = serde_json::to_vec(self).map_err(|e| {
            ConnectorError::malformed_cursor(format!("failed to encode cursor: {e}"))
        })?;
        Ok(STANDARD.encode(json))
    }

    /// Decode `token` for a call scoped to `(resource_type_id, resource_id)`.
    ///
    /// Returns the stack to thread through the call and the provider cursor to
    /// request. If the active entry belongs to another scope, a fresh entry for
    /// this scope is pushed and the provider cursor is empty.
    pub fn decode(
        token: &str,
        resource_type_id: &str,
        resource_id: &str,
    ) -> ConnectorResult<(Self, String)> {
        let mut stack = Self::unmarshal(token)?;

        let in_scope = stack
            .current()
            .is_some_and(|p| p.is_scope(resource_type_id, resource_id));
        if !in_scope {
            stack.push(PagePosition::new(resource_type_id, resource_id));
        }

        let cursor = stack.page_cursor().to_string();
        Ok((stack, cursor))
    }

    /// Record the provider cursor of the next page and return the token to
    /// hand back. An empty cursor means the listing is finished: the result is
    /// the empty string and the stack is left untouched.
    pub fn advance(&mut self, next_provider_cursor: &str) -> ConnectorResult<String> {
        if next_provider_cursor.is_empty() {
            return Ok(String::new());
        }

        match self.positions.last_mut() {
            Some(top) => top.provider_cursor = next_provider_cursor.to_string(),
            None => {
                return Err(ConnectorError::malformed_cursor(
                    "cannot advance an empty cursor stack",
                ))
            }
        }

        self.marshal()
    }

    pub fn push(&mut self, position: PagePosition) {
        self.positions.push(position);
    }

    /// The active (innermost) position.
    pub fn current(&self) -> Option<&PagePosition> {
        self.positions.last()
    }

    /// Provider cursor of the active position, or empty.
    pub fn page_cursor(&self) -> &str {
        self.current()
            .map(|p| p.provider_cursor.as_str())
            .unwrap_or_default()
    }

    pub fn positions(&self) -> &[PagePosition] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Flat offset cursor for endpoints that report `(start, end, total)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffsetCursor {
    pub start_position: u64,
}

impl OffsetCursor {
    pub fn new(start_position: u64) -> Self {
        Self { start_position }
    }

    /// Parse a token. The empty string yields `startPosition = 0`.
    pub fn decode(token: &str) -> ConnectorResult<Self> {
        if token.is_empty() {
            return Ok(Self::default());
        }

        let bytes = STANDARD
            .decode(token)
            .map_err(|e| ConnectorError::malformed_cursor(format!("invalid base64: {e}")))?;

        serde_json::from_slice(&bytes)
            .map_err(|e| ConnectorError::malformed_cursor(format!("invalid offset cursor: {e}")))
    }

    pub fn encode(&self) -> String {
        // A struct holding a single integer always serializes.
        let json = format!("{{\"startPosition\":{}}}", self.start_position);
        STANDARD.encode(json)
    }

    /// Whether the provider has rows past `end_position`.
    pub fn has_more(end_position: i64, total_set_size: i64) -> bool {
        end_position.saturating_add(1) < total_set_size
    }

    /// Cursor for the page after `end_position`, or `None` when exhausted.
    pub fn next(end_position: i64, total_set_size: i64) -> Option<Self> {
        if !Self::has_more(end_position, total_set_size) {
            return None;
        }
        let start = u64::try_from(end_position.saturating_add(1)).unwrap_or(0);
        Some(Self::new(start))
    }

    /// Encoded token for the page after `end_position`, or empty when exhausted.
    pub fn next_token(end_position: i64, total_set_size: i64) -> String {
        Self::next(end_position, total_set_size)
            .map(|c| c.encode())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_empty_token_starts_fresh() {
        for (rt, rid) in [("user", ""), ("group", "g1"), ("", "")] {
            let (stack, cursor) = CursorStack::decode("", rt, rid).unwrap();
            assert_eq!(cursor, "");
            assert_eq!(
                stack.positions(),
                &[PagePosition {
                    resource_type_id: rt.to_string(),
                    resource_id: rid.to_string(),
                    provider_cursor: String::new(),
                }]
            );
        }
    }

    #[test]
    fn test_advance_then_decode_round_trips() {
        let (mut stack, _) = CursorStack::decode("", "group", "").unwrap();

        for cursor in ["1", "50", "opaque-provider-token==", "é"] {
            let token = stack.advance(cursor).unwrap();
            assert!(!token.is_empty());

            let (decoded, page_cursor) = CursorStack::decode(&token, "group", "").unwrap();
            assert_eq!(page_cursor, cursor);
            assert_eq!(decoded.current().unwrap().provider_cursor, cursor);
            assert_eq!(decoded.len(), 1);
        }
    }

    #[test]
    fn test_advance_with_empty_cursor_finishes() {
        let (mut stack, _) = CursorStack::decode("", "user", "").unwrap();
        stack.advance("100").unwrap();

        let token = stack.advance("").unwrap();
        assert_eq!(token, "");
        assert_eq!(stack.page_cursor(), "100");
    }

    #[test]
    fn test_scope_mismatch_pushes_new_position() {
        let (mut outer, _) = CursorStack::decode("", "group", "").unwrap();
        let token = outer.advance("50").unwrap();

        let (inner, cursor) = CursorStack::decode(&token, "user", "g1").unwrap();
        assert_eq!(cursor, "");
        assert_eq!(inner.len(), 2);
        assert_eq!(inner.positions()[0].provider_cursor, "50");
        assert_eq!(inner.current().unwrap().resource_id, "g1");
    }

    #[test]
    fn test_nested_positions_resume_independently() {
        let (mut outer, _) = CursorStack::decode("", "group", "").unwrap();
        let outer_token = outer.advance("50").unwrap();

        let (mut inner, _) = CursorStack::decode(&outer_token, "user", "g1").unwrap();
        let inner_token = inner.advance("10").unwrap();

        let (resumed, cursor) = CursorStack::decode(&inner_token, "user", "g1").unwrap();
        assert_eq!(cursor, "10");
        assert_eq!(resumed.positions()[0].provider_cursor, "50");
    }

    #[test]
    fn test_malformed_tokens_are_rejected() {
        let not_base64 = CursorStack::decode("not base64 !!", "user", "");
        assert!(matches!(
            not_base64,
            Err(ConnectorError::MalformedCursor { .. })
        ));

        let not_a_stack = STANDARD.encode(r#"{"startPosition":3}"#);
        let result = CursorStack::decode(&not_a_stack, "user", "");
        assert!(matches!(result, Err(ConnectorError::MalformedCursor { .. })));
    }

    #[test]
    fn test_marshal_is_canonical() {
        let (mut a, _) = CursorStack::decode("", "group", "").unwrap();
        let (mut b, _) = CursorStack::decode("", "group", "").unwrap();
        assert_eq!(a.advance("7").unwrap(), b.advance("7").unwrap());

        let json = String::from_utf8(STANDARD.decode(a.marshal().unwrap()).unwrap()).unwrap();
        assert_eq!(
            json,
            r#"[{"resourceTypeId":"group","resourceId":"","providerCursor":"7"}]"#
        );
    }

    #[test]
    fn test_unmarshal_empty_is_empty_stack() {
        let stack = CursorStack::unmarshal("").unwrap();
        assert!(stack.is_empty());
        assert_eq!(stack.page_cursor(), "");
    }

    #[test]
    fn test_offset_cursor_termination_on_empty_set() {
        assert!(!OffsetCursor::has_more(0, 0));
        assert!(!OffsetCursor::has_more(-1, 0));
        assert_eq!(OffsetCursor::next_token(0, 0), "");
    }

    #[test]
    fn test_offset_cursor_progress() {
        assert_eq!(OffsetCursor::next(49, 120), Some(OffsetCursor::new(50)));
        assert_eq!(OffsetCursor::next(119, 120), None);
        assert_eq!(OffsetCursor::next_token(119, 120), "");

        let token = OffsetCursor::next_token(49, 120);
        assert_eq!(OffsetCursor::decode(&token).unwrap().start_position, 50);
    }

    #[test]
    fn test_offset_cursor_extreme_end_position() {
        assert!(!OffsetCursor::has_more(i64::MAX, i64::MAX));
        assert_eq!(OffsetCursor::next(i64::MAX, i64::MAX), None);
        assert_eq!(
            OffsetCursor::next(i64::MAX - 1, i64::MAX),
            Some(OffsetCursor::new(i64::MAX as u64))
        );
    }

    #[test]
    fn test_offset_cursor_encoding() {
        let cursor = OffsetCursor::new(50);
        let token = cursor.encode();
        assert_eq!(
            String::from_utf8(STANDARD.decode(&token).unwrap()).unwrap(),
            r#"{"startPosition":50}"#
        );
        assert_eq!(
            serde_json::to_string(&cursor).unwrap(),
            r#"{"startPosition":50}"#
        );
        assert_eq!(OffsetCursor::decode("").unwrap(), OffsetCursor::default());
        assert!(matches!(
            OffsetCursor::decode("%%%"),
            Err(ConnectorError::MalformedCursor { .. })
        ));
    }

    #[test]
    fn test_sync_page_has_more() {
        let page: SyncPage<u8> = SyncPage::single(vec![1, 2]);
        assert!(!page.has_more());
        let page: SyncPage<u8> = SyncPage::new(vec![], "abc", Annotations::new());
        assert!(page.has_more());
    }
}
