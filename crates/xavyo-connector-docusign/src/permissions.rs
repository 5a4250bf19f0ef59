//! Permission catalog and grant derivation.
//!
//! DocuSign has no permission objects of its own. Capabilities are switches in
//! each user's settings; a [`PermissionCatalog`] names the capabilities and says
//! which settings fields turn them on, and [`PermissionMapper`] turns one user's
//! settings into grants on the permission singleton.

use serde_json::{json, Map, Value};
use std::collections::HashSet;
use xavyo_connector_sdk::{Grant, Resource, ResourceId};

use crate::models::UserDetail;
use crate::resources::USER_RESOURCE_TYPE;
use crate::settings;
use crate::{DocusignError, DocusignResult};

/// `source` value stamped on every permission grant.
pub const GRANT_SOURCE: &str = "DocuSign";

/// Lower-cased string values that grant a permission.
const ACCEPTED_VALUES: [&str; 3] = ["true", "admin", "share"];

/// `(id, display name, description)`
const DOCUSIGN_DEFINITIONS: [(&str, &str, &str); 20] = [
    ("adminOnly", "Admin Only Actions", "Indicates some actions are exclusive for admins"),
    ("canManageAccount", "Manage Account", "Can manage account settings"),
    ("canManageTemplates", "Manage Templates", "Can manage shared templates"),
    ("canEditSharedAddressbook", "Edit Shared Addressbook", "Can edit shared address book"),
    ("canManageOrganization", "Manage Organization", "Can manage organization settings"),
    ("canManageDistributor", "Manage Distributor", "Can manage distributor settings"),
    ("canSendEnvelope", "Send Envelope", "Can send envelopes"),
    ("canSignEnvelope", "Sign Envelope", "Can sign envelopes"),
    ("allowSendOnBehalfOf", "Send On Behalf Of", "Can send envelopes on behalf of others"),
    ("bulkSend", "Bulk Send", "Can send envelopes in bulk"),
    ("canSendAPIRequests", "Send API Requests", "Can make API requests"),
    ("enableSequentialSigningUI", "Sequential Signing UI", "Can use sequential signing UI"),
    ("enableDSPro", "DS Pro Features", "Access to DocuSign Pro features"),
    ("canUseScratchpad", "Use Scratchpad", "Can use scratchpad feature"),
    ("canCreateWorkspaces", "Create Workspaces", "Can create collaborative workspaces"),
    ("enableTransactionPoint", "Transaction Point", "Can use transaction point feature"),
    ("powerFormMode", "PowerForm Admin", "Administrative control over PowerForms"),
    ("apiCanExportAC", "Export Audit Certificates", "Can export audit certificates via API"),
    ("enableVaulting", "Vaulting Access", "Can use long-term storage (Vaulting)"),
    ("canUseSmartContracts", "Smart Contracts", "Can use smart contracts"),
];

/// `(settings field, permission id)` in evaluation order.
const DOCUSIGN_RULES: [(&str, &str); 21] = [
    ("isAdmin", "adminOnly"),
    ("adminOnly", "adminOnly"),
    ("canManageAccount", "canManageAccount"),
    ("canManageTemplates", "canManageTemplates"),
    ("canEditSharedAddressbook", "canEditSharedAddressbook"),
    ("canManageOrganization", "canManageOrganization"),
    ("canManageDistributor", "canManageDistributor"),
    ("canSendEnvelope", "canSendEnvelope"),
    ("canSignEnvelope", "canSignEnvelope"),
    ("allowSendOnBehalfOf", "allowSendOnBehalfOf"),
    ("bulkSend", "bulkSend"),
    ("canSendAPIRequests", "canSendAPIRequests"),
    ("enableSequentialSigningUI", "enableSequentialSigningUI"),
    ("enableDSPro", "enableDSPro"),
    ("canUseScratchpad", "canUseScratchpad"),
    ("canCreateWorkspaces", "canCreateWorkspaces"),
    ("enableTransactionPoint", "enableTransactionPoint"),
    ("powerFormMode", "powerFormMode"),
    ("apiCanExportAC", "apiCanExportAC"),
    ("enableVaulting", "enableVaulting"),
    ("canUseSmartContracts", "canUseSmartContracts"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionDefinition {
    pub id: String,
    pub display_name: String,
    pub description: String,
}

impl PermissionDefinition {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            description: description.into(),
        }
    }
}

/// A settings field that turns on a permission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionRule {
    pub field_name: String,
    pub permission_id: String,
}

impl PermissionRule {
    pub fn new(field_name: impl Into<String>, permission_id: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            permission_id: permission_id.into(),
        }
    }
}

/// Closed set of permissions and the rules that grant them.
#[derive(Debug, Clone)]
pub struct PermissionCatalog {
    definitions: Vec<PermissionDefinition>,
    rules: Vec<PermissionRule>,
}

impl PermissionCatalog {
    /// Build a catalog.
    ///
    /// # Errors
    ///
    /// Fails if a definition id repeats, a rule targets an undefined permission,
    /// or a `(field, permission)` pair repeats.
    pub fn new(
        definitions: Vec<PermissionDefinition>,
        rules: Vec<PermissionRule>,
    ) -> DocusignResult<Self> {
        let mut ids = HashSet::new();
        for definition in &definitions {
            if !ids.insert(definition.id.as_str()) {
                return Err(DocusignError::Config(format!(
                    "duplicate permission definition: {}",
                    definition.id
                )));
            }
        }

        let mut pairs = HashSet::new();
        for rule in &rules {
            if !ids.contains(rule.permission_id.as_str()) {
                return Err(DocusignError::Config(format!(
                    "rule for field {} targets undefined permission {}",
                    rule.field_name, rule.permission_id
                )));
            }
            if !pairs.insert((rule.field_name.as_str(), rule.permission_id.as_str())) {
                return Err(DocusignError::Config(format!(
                    "duplicate rule {} -> {}",
                    rule.field_name, rule.permission_id
                )));
            }
        }

        Ok(Self { definitions, rules })
    }

    /// The DocuSign eSignature account permissions.
    pub fn docusign() -> Self {
        Self {
            definitions: DOCUSIGN_DEFINITIONS
                .iter()
                .map(|(id, name, description)| PermissionDefinition::new(*id, *name, *description))
                .collect(),
            rules: DOCUSIGN_RULES
                .iter()
                .map(|(field, permission)| PermissionRule::new(*field, *permission))
                .collect(),
        }
    }

    pub fn definitions(&self) -> &[PermissionDefinition] {
        &self.definitions
    }

    pub fn rules(&self) -> &[PermissionRule] {
        &self.rules
    }

    pub fn definition(&self, id: &str) -> Option<&PermissionDefinition> {
        self.definitions.iter().find(|d| d.id == id)
    }
}

impl Default for PermissionCatalog {
    fn default() -> Self {
        Self::docusign()
    }
}

/// Outcome of reading one settings value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionValue {
    /// The permission is held at this access level.
    Accepted(String),
    /// The permission is not held. Carries the normalized value, or empty for
    /// values that are neither strings nor booleans.
    Rejected(String),
}

impl PermissionValue {
    /// Classify a settings value.
    ///
    /// Strings are compared lower-cased against `true`, `admin` and `share`.
    /// Booleans grant only when `true`. Every other JSON type is rejected.
    pub fn classify(value: &Value) -> Self {
        match value {
            Value::String(s) => {
                let lowered = s.to_lowercase();
                if ACCEPTED_VALUES.contains(&lowered.as_str()) {
                    Self::Accepted(lowered)
                } else {
                    Self::Rejected(lowered)
                }
            }
            Value::Bool(true) => Self::Accepted("true".to_string()),
            Value::Bool(false) => Self::Rejected("false".to_string()),
            _ => Self::Rejected(String::new()),
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    pub fn access_level(&self) -> &str {
        match self {
            Self::Accepted(level) | Self::Rejected(level) => level,
        }
    }
}

/// Derives permission grants from user settings.
#[derive(Debug, Clone, Default)]
pub struct PermissionMapper {
    catalog: PermissionCatalog,
}

impl PermissionMapper {
    pub fn new(catalog: PermissionCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &PermissionCatalog {
        &self.catalog
    }

    /// Grants `user` holds on `permission_resource`.
    ///
    /// Rules run in table order and the first satisfied rule for a permission
    /// wins, so aliases never produce a second grant.
    ///
    /// # Errors
    ///
    /// [`DocusignError::SettingsDecode`] if the user's settings cannot be
    /// decoded or normalized. A user without settings holds no grants.
    pub fn derive_grants(
        &self,
        permission_resource: &Resource,
        user: &UserDetail,
    ) -> DocusignResult<Vec<Grant>> {
        let settings = user
            .settings()
            .and_then(|typed| settings::normalize(&typed))
            .map_err(|e| match e {
                DocusignError::SettingsDecode(message) => {
                    DocusignError::SettingsDecode(format!("user {}: {message}", user.user_id))
                }
                other => other,
            })?;

        let principal = ResourceId::new(USER_RESOURCE_TYPE, user.user_id.clone());
        let mut granted: HashSet<&str> = HashSet::new();
        let mut grants = Vec::new();

        for rule in &self.catalog.rules {
            if granted.contains(rule.permission_id.as_str()) {
                continue;
            }
            let Some(value) = settings.get(&rule.field_name) else {
                continue;
            };

            if let PermissionValue::Accepted(access_level) = PermissionValue::classify(value) {
                granted.insert(rule.permission_id.as_str());
                grants.push(
                    Grant::new(permission_resource, rule.permission_id.clone(), principal.clone())
                        .with_metadata(grant_metadata(user, &access_level)),
                );
            }
        }

        Ok(grants)
    }
}

fn grant_metadata(user: &UserDetail, access_level: &str) -> Map<String, Value> {
    let mut metadata = Map::new();
    metadata.insert("source".into(), json!(GRANT_SOURCE));
    metadata.insert("profileName".into(), json!(user.permission_profile_name));
    metadata.insert("userId".into(), json!(user.user_id));
    metadata.insert("username".into(), json!(user.user_name));
    metadata.insert("accessLevel".into(), json!(access_level));
    metadata
}
