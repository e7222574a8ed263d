//! PipelineSchedule Custom Resource Definition
//!
//! A scheduled pipeline on a project, with its schedule variables managed as
//! a keyed collection.

use crate::common::{impl_managed, Condition, ResourceSpec};
use crate::projects::variable::VariableType;
use chrono::{DateTime, Utc};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "projects.gitlab.crossplane.io",
    version = "v1alpha1",
    kind = "PipelineSchedule",
    status = "PipelineScheduleStatus",
    category = "gitlab",
    printcolumn = r#"{"name":"READY","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].status"}"#,
    printcolumn = r#"{"name":"SYNCED","type":"string","jsonPath":".status.conditions[?(@.type=='Synced')].status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct PipelineScheduleSpec {
    #[serde(flatten)]
    pub resource: ResourceSpec,
    pub for_provider: PipelineScheduleParameters,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PipelineVariable {
    pub key: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_type: Option<VariableType>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PipelineScheduleParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,

    pub description: String,

    /// Branch or tag to run the pipeline on
    #[serde(rename = "ref")]
    pub git_ref: String,

    /// Cron expression, e.g. `0 1 * * *`
    pub cron: String,

    /// `UTC` when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cron_timezone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,

    /// Schedule variables; omitted means they are not managed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<Vec<PipelineVariable>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PipelineVariableObservation {
    pub key: String,
    pub variable_type: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PipelineScheduleObservation {
    pub id: i64,
    pub description: String,
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub cron: String,
    pub cron_timezone: String,
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_run_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<i64>,
    #[serde(default)]
    pub variables: Vec<PipelineVariableObservation>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PipelineScheduleStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at_provider: Option<PipelineScheduleObservation>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl_managed!(PipelineSchedule, "PipelineSchedule");
