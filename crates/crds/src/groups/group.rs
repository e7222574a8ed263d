//! Group Custom Resource Definition
//!
//! Defines a cluster-scoped CRD for managing GitLab groups, including the
//! groups they are shared with.

use crate::common::{impl_managed, AccessLevel, Condition, ResourceSpec, Visibility};
use chrono::{DateTime, NaiveDate, Utc};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// GroupSpec defines the desired state of a GitLab group
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "groups.gitlab.crossplane.io",
    version = "v1alpha1",
    kind = "Group",
    status = "GroupStatus",
    category = "gitlab",
    printcolumn = r#"{"name":"READY","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].status"}"#,
    printcolumn = r#"{"name":"SYNCED","type":"string","jsonPath":".status.conditions[?(@.type=='Synced')].status"}"#,
    printcolumn = r#"{"name":"EXTERNAL-NAME","type":"string","jsonPath":".metadata.annotations.crossplane\\.io/external-name"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct GroupSpec {
    #[serde(flatten)]
    pub resource: ResourceSpec,
    pub for_provider: GroupParameters,
}

/// Subgroup creation permission
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SubgroupCreationLevel {
    Owner,
    Maintainer,
}

impl SubgroupCreationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubgroupCreationLevel::Owner => "owner",
            SubgroupCreationLevel::Maintainer => "maintainer",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "owner" => Some(SubgroupCreationLevel::Owner),
            "maintainer" => Some(SubgroupCreationLevel::Maintainer),
            _ => None,
        }
    }
}

/// Project creation permission
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProjectCreationLevel {
    Noone,
    Maintainer,
    Developer,
}

impl ProjectCreationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectCreationLevel::Noone => "noone",
            ProjectCreationLevel::Maintainer => "maintainer",
            ProjectCreationLevel::Developer => "developer",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "noone" => Some(ProjectCreationLevel::Noone),
            "maintainer" => Some(ProjectCreationLevel::Maintainer),
            "developer" => Some(ProjectCreationLevel::Developer),
            _ => None,
        }
    }
}

/// A group this group should be shared with
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SharedWithGroup {
    pub group_id: i64,
    pub group_access: AccessLevel,
    /// Expiry of the share, `YYYY-MM-DD`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<NaiveDate>,
}

/// GroupParameters are the configurable fields of a group
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupParameters {
    pub name: String,
    pub path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,

    /// Parent group; immutable after creation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub membership_lock: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_with_group_lock: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_two_factor_authentication: Option<bool>,

    /// Hours before two-factor authentication is enforced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub two_factor_grace_period: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_creation_level: Option<ProjectCreationLevel>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subgroup_creation_level: Option<SubgroupCreationLevel>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_devops_enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emails_disabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mentions_disabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lfs_enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_access_enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_runners_minutes_limit: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_shared_runners_minutes_limit: Option<i64>,

    /// Groups to share this group with; omitted means sharing is not managed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_with_groups: Option<Vec<SharedWithGroup>>,

    /// Remove a subgroup immediately instead of marking it for deletion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permanently_remove: Option<bool>,

    /// Release the finalizer once the remote group is pending deletion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remove_finalizer_on_pending_deletion: Option<bool>,
}

/// A sharing edge as reported by GitLab
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SharedWithGroupObservation {
    pub group_id: i64,
    #[serde(default)]
    pub group_name: String,
    #[serde(default)]
    pub group_full_path: String,
    pub group_access_level: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<NaiveDate>,
}

/// GroupObservation mirrors the remote group
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupObservation {
    pub id: i64,
    pub name: String,
    pub path: String,
    pub full_name: String,
    pub full_path: String,
    pub web_url: String,
    pub description: String,
    pub visibility: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marked_for_deletion_on: Option<NaiveDate>,
    #[serde(default)]
    pub shared_with_groups: Vec<SharedWithGroupObservation>,
}

/// GroupStatus defines the observed state of a GitLab group
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at_provider: Option<GroupObservation>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl_managed!(Group, "Group");
