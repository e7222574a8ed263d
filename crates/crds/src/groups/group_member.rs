//! GroupMember Custom Resource Definition
//!
//! Defines a cluster-scoped CRD for a user's membership in a GitLab group.
//! The external name is the user ID.

use crate::common::{impl_managed, AccessLevel, Condition, ResourceSpec};
use chrono::{DateTime, NaiveDate, Utc};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// GroupMemberSpec defines the desired membership
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "groups.gitlab.crossplane.io",
    version = "v1alpha1",
    kind = "GroupMember",
    status = "GroupMemberStatus",
    category = "gitlab",
    printcolumn = r#"{"name":"READY","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].status"}"#,
    printcolumn = r#"{"name":"SYNCED","type":"string","jsonPath":".status.conditions[?(@.type=='Synced')].status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct GroupMemberSpec {
    #[serde(flatten)]
    pub resource: ResourceSpec,
    pub for_provider: GroupMemberParameters,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupMemberParameters {
    /// Group the user is a member of; must be resolved before reconciling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i64>,

    pub user_id: i64,

    pub access_level: AccessLevel,

    /// Membership expiry, `YYYY-MM-DD`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,

    /// Custom member role (Ultimate only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_role_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupMemberObservation {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub state: String,
    pub web_url: String,
    pub access_level: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_role_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupMemberStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at_provider: Option<GroupMemberObservation>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl_managed!(GroupMember, "GroupMember");
