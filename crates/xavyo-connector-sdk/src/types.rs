//! Resource graph types
//!
//! Normalized resources, entitlements and grants handed to the governance
//! platform. Connectors populate these; they never interpret them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Free-form profile or metadata bag attached to resources and grants.
pub type Profile = Map<String, Value>;

/// Trait a resource type advertises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceTypeTrait {
    User,
    Group,
    Role,
}

/// A kind of resource a connector can list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceType {
    pub id: String,
    pub display_name: String,
    pub traits: Vec<ResourceTypeTrait>,
}

impl ResourceType {
    /// Create a resource type with a single trait.
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        resource_trait: ResourceTypeTrait,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            traits: vec![resource_trait],
        }
    }
}

/// Identifies one resource: its type id plus the provider-native id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceId {
    pub resource_type: String,
    pub resource: String,
}

impl ResourceId {
    pub fn new(resource_type: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            resource: resource.into(),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource_type, self.resource)
    }
}

/// Account status of a user resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Enabled,
    Disabled,
    #[default]
    Unspecified,
}

/// User-specific resource data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserTrait {
    pub profile: Profile,
    pub status: UserStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub emails: Vec<String>,
}

/// Group-specific resource data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupTrait {
    pub profile: Profile,
}

/// Role-specific resource data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleTrait {
    pub profile: Profile,
}

/// Trait payload carried by a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResourceTraits {
    User(UserTrait),
    Group(GroupTrait),
    Role(RoleTrait),
}

/// A normalized resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ResourceId>,
    pub traits: ResourceTraits,
}

impl Resource {
    /// Build a user resource.
    pub fn user(
        resource_type: &ResourceType,
        id: impl Into<String>,
        display_name: impl Into<String>,
        user: UserTrait,
    ) -> Self {
        Self {
            id: ResourceId::new(resource_type.id.clone(), id),
            display_name: display_name.into(),
            parent: None,
            traits: ResourceTraits::User(user),
        }
    }

    /// Build a group resource.
    pub fn group(
        resource_type: &ResourceType,
        id: impl Into<String>,
        display_name: impl Into<String>,
        profile: Profile,
    ) -> Self {
        Self {
            id: ResourceId::new(resource_type.id.clone(), id),
            display_name: display_name.into(),
            parent: None,
            traits: ResourceTraits::Group(GroupTrait { profile }),
        }
    }

    /// Build a role resource.
    pub fn role(
        resource_type: &ResourceType,
        id: impl Into<String>,
        display_name: impl Into<String>,
        profile: Profile,
    ) -> Self {
        Self {
            id: ResourceId::new(resource_type.id.clone(), id),
            display_name: display_name.into(),
            parent: None,
            traits: ResourceTraits::Role(RoleTrait { profile }),
        }
    }

    /// Returns the user trait, if this is a user resource.
    pub fn user_trait(&self) -> Option<&UserTrait> {
        match &self.traits {
            ResourceTraits::User(u) => Some(u),
            _ => None,
        }
    }

    /// Returns the profile bag regardless of trait kind.
    pub fn profile(&self) -> &Profile {
        match &self.traits {
            ResourceTraits::User(u) => &u.profile,
            ResourceTraits::Group(g) => &g.profile,
            ResourceTraits::Role(r) => &r.profile,
        }
    }
}

/// Why an entitlement exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntitlementPurpose {
    /// Membership-style assignment (e.g. group member).
    Assignment,
    /// Capability flag (e.g. "can send envelopes").
    Permission,
}

/// A grantable capability on a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entitlement {
    /// Stable id: `{resource_type}:{resource}:{slug}`.
    pub id: String,
    pub resource: ResourceId,
    pub slug: String,
    pub display_name: String,
    pub description: String,
    pub purpose: EntitlementPurpose,
    /// Resource type ids this entitlement may be granted to.
    pub grantable_to: Vec<String>,
}

impl Entitlement {
    fn new(resource: &Resource, slug: impl Into<String>, purpose: EntitlementPurpose) -> Self {
        let slug = slug.into();
        Self {
            id: entitlement_id(&resource.id, &slug),
            resource: resource.id.clone(),
            display_name: slug.clone(),
            description: String::new(),
            slug,
            purpose,
            grantable_to: Vec::new(),
        }
    }

    /// Assignment entitlement (membership).
    pub fn assignment(resource: &Resource, slug: impl Into<String>) -> Self {
        Self::new(resource, slug, EntitlementPurpose::Assignment)
    }

    /// Permission entitlement (capability).
    pub fn permission(resource: &Resource, slug: impl Into<String>) -> Self {
        Self::new(resource, slug, EntitlementPurpose::Permission)
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_grantable_to(mut self, resource_type: &ResourceType) -> Self {
        self.grantable_to.push(resource_type.id.clone());
        self
    }
}

/// Reference to an entitlement from a grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitlementRef {
    pub id: String,
    pub resource: ResourceId,
    pub slug: String,
}

/// Assertion that a principal holds an entitlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grant {
    /// Stable id: `{entitlement_id}:{principal_type}:{principal}`.
    pub id: String,
    pub entitlement: EntitlementRef,
    pub principal: ResourceId,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Profile,
}

impl Grant {
    /// Create a grant of `slug` on `resource` to `principal`.
    pub fn new(resource: &Resource, slug: impl Into<String>, principal: ResourceId) -> Self {
        let slug = slug.into();
        let entitlement_id = entitlement_id(&resource.id, &slug);
        Self {
            id: format!(
                "{}:{}:{}",
                entitlement_id, principal.resource_type, principal.resource
            ),
            entitlement: EntitlementRef {
                id: entitlement_id,
                resource: resource.id.clone(),
                slug,
            },
            principal,
            metadata: Profile::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: Profile) -> Self {
        self.metadata = metadata;
        self
    }
}

fn entitlement_id(resource: &ResourceId, slug: &str) -> String {
    format!("{}:{}:{}", resource.resource_type, resource.resource, slug)
}

/// Profile submitted when provisioning a new account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub profile: Profile,
}

impl AccountInfo {
    /// Read a non-empty string field from the profile.
    pub fn profile_str(&self, key: &str) -> Option<&str> {
        self.profile
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// Field advertised in the account creation schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountCreationField {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub placeholder: String,
    pub required: bool,
    pub order: u32,
}

/// Connector self-description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorMetadata {
    pub display_name: String,
    pub description: String,
    pub account_creation_fields: Vec<AccountCreationField>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group_type() -> ResourceType {
        ResourceType::new("group", "Group", ResourceTypeTrait::Group)
    }

    #[test]
    fn test_entitlement_and_grant_ids() {
        let group = Resource::group(&group_type(), "g1", "Admins", Profile::new());
        let ent = Entitlement::assignment(&group, "member");
        assert_eq!(ent.id, "group:g1:member");

        let grant = Grant::new(&group, "member", ResourceId::new("user", "u1"));
        assert_eq!(grant.id, "group:g1:member:user:u1");
        assert_eq!(grant.entitlement.id, ent.id);
        assert_eq!(grant.principal.resource, "u1");
    }

    #[test]
    fn test_account_info_profile_str() {
        let mut profile = Profile::new();
        profile.insert("email".into(), Value::String("a@example.com".into()));
        profile.insert("username".into(), Value::String(String::new()));
        profile.insert("count".into(), Value::from(3));
        let info = AccountInfo { profile };

        assert_eq!(info.profile_str("email"), Some("a@example.com"));
        assert_eq!(info.profile_str("username"), None);
        assert_eq!(info.profile_str("count"), None);
        assert_eq!(info.profile_str("missing"), None);
    }

    #[test]
    fn test_resource_serialization_tags_traits() {
        let user_type = ResourceType::new("user", "User", ResourceTypeTrait::User);
        let user = Resource::user(&user_type, "u1", "alice", UserTrait::default());
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["traits"]["kind"], "user");
        assert_eq!(json["traits"]["status"], "unspecified");
    }
}
