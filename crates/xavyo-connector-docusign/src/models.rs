//! DocuSign eSignature REST API payloads.
//!
//! DocuSign sends booleans and counters as strings. Fields are kept as the API
//! delivers them; interpretation happens in [`crate::resources`] and
//! [`crate::permissions`].

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::{DocusignError, DocusignResult};

/// Paging block shared by all list responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    #[serde(default, deserialize_with = "string_or_number")]
    pub result_set_size: i64,
    #[serde(default, deserialize_with = "string_or_number")]
    pub total_set_size: i64,
    #[serde(default, deserialize_with = "string_or_number")]
    pub start_position: i64,
    #[serde(default, deserialize_with = "string_or_number")]
    pub end_position: i64,
}

/// Accepts `"12"`, `12` or `null`.
fn string_or_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(0),
        Some(Raw::Number(n)) => Ok(n),
        Some(Raw::Text(s)) if s.trim().is_empty() => Ok(0),
        Some(Raw::Text(s)) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// User as returned by the users list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub user_id: String,
    pub user_name: String,
    pub email: String,
    pub user_status: String,
    pub is_admin: String,
    #[serde(rename = "permissionProfileName")]
    pub permission: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersResponse {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(flatten)]
    pub page: Page,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Group {
    pub group_id: String,
    pub group_name: String,
    pub group_type: String,
    pub users_count: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupsResponse {
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(flatten)]
    pub page: Page,
}

/// `GET /users/{userId}` with settings and group memberships.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetail {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub is_admin: String,
    #[serde(default)]
    pub user_status: String,
    #[serde(default)]
    pub permission_profile_name: String,
    /// Raw `userSettings`, decoded on demand by [`UserDetail::settings`].
    #[serde(default)]
    pub user_settings: Option<Value>,
    #[serde(default)]
    pub group_list: Vec<Group>,
}

impl UserDetail {
    /// Typed view of `userSettings`. Absent or `null` settings are empty.
    ///
    /// # Errors
    ///
    /// [`DocusignError::SettingsDecode`] if the settings have the wrong shape.
    pub fn settings(&self) -> DocusignResult<UserSettings> {
        match &self.user_settings {
            None | Some(Value::Null) => Ok(UserSettings::default()),
            Some(raw) => UserSettings::deserialize(raw)
                .map_err(|e| DocusignError::SettingsDecode(format!("invalid userSettings: {e}"))),
        }
    }
}

/// Account-level capability switches of a user.
///
/// Flags are usually the strings `"true"` / `"false"`, but some API versions
/// send JSON booleans, so each flag keeps the raw value. Settings this type does
/// not name are kept in `other`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_manage_account: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_management_granular: Option<AccountManagementGranular>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_send_envelope: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_sign_envelope: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_send_on_behalf_of: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bulk_send: Option<Value>,
    #[serde(
        default,
        rename = "canSendAPIRequests",
        skip_serializing_if = "Option::is_none"
    )]
    pub can_send_api_requests: Option<Value>,
    #[serde(
        default,
        rename = "enableSequentialSigningUI",
        skip_serializing_if = "Option::is_none"
    )]
    pub enable_sequential_signing_ui: Option<Value>,
    #[serde(default, rename = "enableDSPro", skip_serializing_if = "Option::is_none")]
    pub enable_ds_pro: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_use_scratchpad: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_create_workspaces: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_transaction_point: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_form_mode: Option<Value>,
    #[serde(
        default,
        rename = "apiCanExportAC",
        skip_serializing_if = "Option::is_none"
    )]
    pub api_can_export_ac: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_vaulting: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_manage_templates: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_edit_shared_addressbook: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_only: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_manage_distributor: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_manage_organization: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_use_smart_contracts: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signer_email_notifications: Option<EmailNotifications>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_email_notifications: Option<EmailNotifications>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccountManagementGranular {
    pub can_manage_users: String,
    pub can_manage_admins: String,
    pub can_manage_account_settings: String,
    pub can_manage_reporting: String,
    pub can_manage_account_security_settings: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmailNotifications {
    pub envelope_activation: String,
    pub envelope_complete: String,
    pub envelope_declined: String,
}

/// `POST /users` body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUsersRequest {
    pub new_users: Vec<NewUser>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub user_name: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCreationResponse {
    #[serde(default)]
    pub new_users: Vec<CreatedUser>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreatedUser {
    pub user_id: String,
    pub user_name: String,
    pub email: String,
    pub user_status: String,
    pub error_details: Option<ErrorDetails>,
}

impl From<&CreatedUser> for User {
    fn from(created: &CreatedUser) -> Self {
        Self {
            user_id: created.user_id.clone(),
            user_name: created.user_name.clone(),
            email: created.email.clone(),
            user_status: created.user_status.clone(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ErrorDetails {
    pub error_code: String,
    pub message: String,
}
