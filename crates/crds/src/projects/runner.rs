//! Runner Custom Resource Definition
//!
//! A runner created through `POST /user/runners`. The runner authentication
//! token is only returned at creation, so a connection secret is mandatory.

use crate::common::{impl_managed, Condition, ResourceSpec};
use chrono::{DateTime, Utc};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "projects.gitlab.crossplane.io",
    version = "v1alpha1",
    kind = "Runner",
    status = "RunnerStatus",
    category = "gitlab",
    printcolumn = r#"{"name":"READY","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].status"}"#,
    printcolumn = r#"{"name":"SYNCED","type":"string","jsonPath":".status.conditions[?(@.type=='Synced')].status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct RunnerSpec {
    #[serde(flatten)]
    pub resource: ResourceSpec,
    pub for_provider: RunnerParameters,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunnerType {
    InstanceType,
    GroupType,
    ProjectType,
}

impl RunnerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunnerType::InstanceType => "instance_type",
            RunnerType::GroupType => "group_type",
            RunnerType::ProjectType => "project_type",
        }
    }
}

/// Which refs the runner picks jobs for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunnerAccessLevel {
    NotProtected,
    RefProtected,
}

impl RunnerAccessLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunnerAccessLevel::NotProtected => "not_protected",
            RunnerAccessLevel::RefProtected => "ref_protected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "not_protected" => Some(RunnerAccessLevel::NotProtected),
            "ref_protected" => Some(RunnerAccessLevel::RefProtected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RunnerParameters {
    /// Scope of the runner; immutable
    pub runner_type: RunnerType,

    /// Required for `group_type`; immutable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i64>,

    /// Required for `project_type`; immutable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paused: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_untagged: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_list: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_level: Option<RunnerAccessLevel>,

    /// Seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_timeout: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintenance_note: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RunnerObservation {
    pub id: i64,
    pub description: String,
    pub runner_type: String,
    pub paused: bool,
    pub is_shared: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub online: Option<bool>,
    pub status: String,
    #[serde(default)]
    pub tag_list: Vec<String>,
    pub run_untagged: bool,
    pub locked: bool,
    pub access_level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_timeout: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintenance_note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contacted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RunnerStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at_provider: Option<RunnerObservation>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl_managed!(Runner, "Runner");
