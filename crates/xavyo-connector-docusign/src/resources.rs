//! Mapping of DocuSign records onto connector resources.

use serde_json::{json, Map};
use xavyo_connector_sdk::{Resource, ResourceType, ResourceTypeTrait, UserStatus, UserTrait};

use crate::models::{Group, User};

pub const USER_RESOURCE_TYPE: &str = "user";
pub const GROUP_RESOURCE_TYPE: &str = "group";
pub const PERMISSION_RESOURCE_TYPE: &str = "permission";

/// Id (and display name) of the resource that carries all permission entitlements.
pub const PERMISSION_RESOURCE_ID: &str = "docusign-permissions";

/// Assignment slug for group membership.
pub const MEMBER_ENTITLEMENT: &str = "member";

pub fn user_resource_type() -> ResourceType {
    ResourceType::new(USER_RESOURCE_TYPE, "User", ResourceTypeTrait::User)
}

pub fn group_resource_type() -> ResourceType {
    ResourceType::new(GROUP_RESOURCE_TYPE, "Group", ResourceTypeTrait::Group)
}

pub fn permission_resource_type() -> ResourceType {
    ResourceType::new(
        PERMISSION_RESOURCE_TYPE,
        "Permission",
        ResourceTypeTrait::Role,
    )
}

/// Map a DocuSign `userStatus` onto [`UserStatus`].
pub fn user_status(status: &str) -> UserStatus {
    match status {
        "Active" => UserStatus::Enabled,
        "Disabled" | "Closed" | "ActivationRequired" | "ActivationSent" => UserStatus::Disabled,
        _ => UserStatus::Unspecified,
    }
}

/// User resource, named and logged in by user name.
pub fn user_resource(user: &User) -> Resource {
    let mut profile = Map::new();
    profile.insert("userName".into(), json!(user.user_name));
    profile.insert("email".into(), json!(user.email));
    profile.insert("isAdmin".into(), json!(user.is_admin));
    profile.insert("permission".into(), json!(user.permission));
    profile.insert("status".into(), json!(user.user_status));

    let emails = if user.email.is_empty() {
        Vec::new()
    } else {
        vec![user.email.clone()]
    };

    Resource::user(
        &user_resource_type(),
        user.user_id.clone(),
        user.user_name.clone(),
        UserTrait {
            profile,
            status: user_status(&user.user_status),
            login: Some(user.user_name.clone()),
            emails,
        },
    )
}

pub fn group_resource(group: &Group) -> Resource {
    let mut profile = Map::new();
    profile.insert("groupName".into(), json!(group.group_name));
    profile.insert("groupType".into(), json!(group.group_type));
    profile.insert("usersCount".into(), json!(group.users_count));

    Resource::group(
        &group_resource_type(),
        group.group_id.clone(),
        group.group_name.clone(),
        profile,
    )
}

/// The permission singleton.
pub fn permission_resource() -> Resource {
    Resource::role(
        &permission_resource_type(),
        PERMISSION_RESOURCE_ID,
        PERMISSION_RESOURCE_ID,
        Map::new(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use xavyo_connector_sdk::ResourceId;

    #[test]
    fn test_user_status_mapping() {
        assert_eq!(user_status("Active"), UserStatus::Enabled);
        for status in ["Disabled", "Closed", "ActivationRequired", "ActivationSent"] {
            assert_eq!(user_status(status), UserStatus::Disabled, "{status}");
        }
        for status in ["", "active", "Pending", "ACTIVE"] {
            assert_eq!(user_status(status), UserStatus::Unspecified, "{status}");
        }
    }

    #[test]
    fn test_user_resource() {
        let user = User {
            user_id: "u-1".into(),
            user_name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            user_status: "ActivationSent".into(),
            is_admin: "False".into(),
            permission: "DocuSign Viewer".into(),
        };

        let resource = user_resource(&user);
        let trait_ = resource.user_trait().unwrap();

        assert_eq!(resource.id, ResourceId::new("user", "u-1"));
        assert_eq!(resource.display_name, "Ada Lovelace");
        assert_eq!(trait_.status, UserStatus::Disabled);
        assert_eq!(trait_.login.as_deref(), Some("Ada Lovelace"));
        assert_eq!(trait_.emails, vec!["ada@example.com".to_string()]);
        assert_eq!(trait_.profile["permission"], json!("DocuSign Viewer"));
        assert_eq!(trait_.profile["status"], json!("ActivationSent"));
        assert_eq!(trait_.profile["isAdmin"], json!("False"));
    }

    #[test]
    fn test_group_resource_profile_is_verbatim() {
        let group = Group {
            group_id: "g-1".into(),
            group_name: "Administrators".into(),
            group_type: "AdminGroup".into(),
            users_count: "7".into(),
        };

        let resource = group_resource(&group);

        assert_eq!(resource.id, ResourceId::new("group", "g-1"));
        assert_eq!(resource.profile()["usersCount"], json!("7"));
        assert_eq!(resource.profile()["groupType"], json!("AdminGroup"));
    }

    #[test]
    fn test_permission_singleton() {
        let resource = permission_resource();
        assert_eq!(resource.id.to_string(), "permission:docusign-permissions");
        assert_eq!(resource.display_name, PERMISSION_RESOURCE_ID);
    }
}
