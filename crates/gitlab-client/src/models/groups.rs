//! Group-scoped entities: groups, group members, sharing edges and
//! SAML/LDAP group links.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Group entity (`GET /groups/:id`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub visibility: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub full_path: String,
    #[serde(default)]
    pub web_url: String,
    pub avatar_url: Option<String>,
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub membership_lock: bool,
    #[serde(default)]
    pub share_with_group_lock: bool,
    #[serde(default)]
    pub require_two_factor_authentication: bool,
    #[serde(default)]
    pub two_factor_grace_period: i64,
    #[serde(default)]
    pub project_creation_level: String,
    #[serde(default)]
    pub subgroup_creation_level: String,
    pub auto_devops_enabled: Option<bool>,
    pub emails_disabled: Option<bool>,
    pub mentions_disabled: Option<bool>,
    #[serde(default)]
    pub lfs_enabled: bool,
    #[serde(default)]
    pub request_access_enabled: bool,
    pub shared_runners_minutes_limit: Option<i64>,
    pub extra_shared_runners_minutes_limit: Option<i64>,
    /// Only returned to administrators/owners
    pub runners_token: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    /// Set when the group is scheduled for delayed deletion
    pub marked_for_deletion_on: Option<NaiveDate>,
    #[serde(default)]
    pub shared_with_groups: Vec<SharedGroup>,
}

/// A group this group is shared with
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SharedGroup {
    pub group_id: i64,
    #[serde(default)]
    pub group_name: String,
    #[serde(default)]
    pub group_full_path: String,
    pub group_access_level: i64,
    pub expires_at: Option<NaiveDate>,
}

/// Request body for `POST /groups`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateGroupOptions {
    pub name: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub membership_lock: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_with_group_lock: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_two_factor_authentication: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub two_factor_grace_period: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_creation_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subgroup_creation_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_devops_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emails_disabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mentions_disabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lfs_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_access_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_runners_minutes_limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_shared_runners_minutes_limit: Option<i64>,
}

/// Request body for `PUT /groups/:id`
///
/// `parent_id` is absent on purpose: moving a group is a transfer, not an edit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateGroupOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub membership_lock: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_with_group_lock: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_two_factor_authentication: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub two_factor_grace_period: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_creation_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subgroup_creation_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_devops_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emails_disabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mentions_disabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lfs_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_access_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_runners_minutes_limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_shared_runners_minutes_limit: Option<i64>,
}

/// Query parameters for `DELETE /groups/:id`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteGroupOptions {
    /// Skip delayed deletion (only valid for a group already marked for deletion)
    pub permanently_remove: Option<bool>,
    /// Full path of the group, required together with `permanently_remove`
    pub full_path: Option<String>,
}

/// Request body for `POST /groups/:id/share`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShareGroupWithGroupOptions {
    pub group_id: i64,
    pub group_access: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<NaiveDate>,
}

/// Group member (`GET /groups/:id/members/:user_id`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupMember {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub state: String,
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub web_url: String,
    pub access_level: i64,
    pub expires_at: Option<NaiveDate>,
    pub created_at: Option<DateTime<Utc>>,
    pub member_role: Option<MemberRole>,
}

/// Custom member role attached to a membership (Ultimate)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberRole {
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

/// Request body for `POST /groups/:id/members`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddGroupMemberOptions {
    pub user_id: i64,
    pub access_level: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_role_id: Option<i64>,
}

/// Request body for `PUT /groups/:id/members/:user_id`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditGroupMemberOptions {
    pub access_level: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_role_id: Option<i64>,
}

/// SAML group link (`GET /groups/:id/saml_group_links/:name`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SamlGroupLink {
    pub name: String,
    pub access_level: i64,
    pub member_role_id: Option<i64>,
}

/// Request body for `POST /groups/:id/saml_group_links`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddSamlGroupLinkOptions {
    pub saml_group_name: String,
    pub access_level: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_role_id: Option<i64>,
}

/// LDAP group link (`GET /groups/:id/ldap_group_links`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LdapGroupLink {
    #[serde(default)]
    pub cn: String,
    pub group_access: i64,
    #[serde(default)]
    pub provider: String,
    pub filter: Option<String>,
}

/// Request body for `POST /groups/:id/ldap_group_links`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddLdapGroupLinkOptions {
    pub cn: String,
    pub group_access: i64,
    pub provider: String,
}
