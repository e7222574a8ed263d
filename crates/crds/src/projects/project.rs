//! Project Custom Resource Definition
//!
//! Defines a cluster-scoped CRD for managing GitLab projects and their push
//! rules.

use crate::common::{impl_managed, Condition, ResourceSpec, Visibility};
use chrono::{DateTime, NaiveDate, Utc};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// ProjectSpec defines the desired state of a GitLab project
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "projects.gitlab.crossplane.io",
    version = "v1alpha1",
    kind = "Project",
    status = "ProjectStatus",
    category = "gitlab",
    printcolumn = r#"{"name":"READY","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].status"}"#,
    printcolumn = r#"{"name":"SYNCED","type":"string","jsonPath":".status.conditions[?(@.type=='Synced')].status"}"#,
    printcolumn = r#"{"name":"EXTERNAL-NAME","type":"string","jsonPath":".metadata.annotations.crossplane\\.io/external-name"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSpec {
    #[serde(flatten)]
    pub resource: ResourceSpec,
    pub for_provider: ProjectParameters,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MergeMethod {
    Merge,
    RebaseMerge,
    Ff,
}

impl MergeMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeMethod::Merge => "merge",
            MergeMethod::RebaseMerge => "rebase_merge",
            MergeMethod::Ff => "ff",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "merge" => Some(MergeMethod::Merge),
            "rebase_merge" => Some(MergeMethod::RebaseMerge),
            "ff" => Some(MergeMethod::Ff),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SquashOption {
    Never,
    Always,
    DefaultOn,
    DefaultOff,
}

impl SquashOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            SquashOption::Never => "never",
            SquashOption::Always => "always",
            SquashOption::DefaultOn => "default_on",
            SquashOption::DefaultOff => "default_off",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "never" => Some(SquashOption::Never),
            "always" => Some(SquashOption::Always),
            "default_on" => Some(SquashOption::DefaultOn),
            "default_off" => Some(SquashOption::DefaultOff),
            _ => None,
        }
    }
}

/// Push rules (Premium); every unset field is left alone
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PushRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_message_regex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_message_negative_regex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_name_regex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deny_delete_tag: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_check: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prevent_secrets: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_email_regex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name_regex: Option<String>,
    /// Maximum file size in MB
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_file_size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_committer_check: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reject_unsigned_commits: Option<bool>,
}

/// ProjectParameters are the configurable fields of a project
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectParameters {
    pub name: String,

    /// Repository path; derived from the name by GitLab when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Namespace (group) to create the project in; immutable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace_id: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,

    /// Create an initial commit with a README; only used on creation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initialize_with_readme: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issues_enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_requests_enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wiki_enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jobs_enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippets_enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_registry_enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lfs_enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_access_enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_runners_enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub only_allow_merge_if_pipeline_succeeds: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub only_allow_merge_if_all_discussions_are_resolved: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_method: Option<MergeMethod>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub squash_option: Option<SquashOption>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remove_source_branch_after_merge: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub printing_merge_request_link_enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ci_config_path: Option<String>,

    /// Job timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_timeout: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_devops_enabled: Option<bool>,

    /// Push rules; omitted means push rules are removed if present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_rules: Option<PushRules>,

    /// Remove the project immediately after it was marked for deletion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permanently_remove: Option<bool>,

    /// Release the finalizer once the remote project is pending deletion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remove_finalizer_on_pending_deletion: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectNamespaceObservation {
    pub id: i64,
    pub name: String,
    pub path: String,
    pub kind: String,
    pub full_path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PushRulesObservation {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_message_regex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_message_negative_regex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_name_regex: Option<String>,
    pub deny_delete_tag: bool,
    pub member_check: bool,
    pub prevent_secrets: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_email_regex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name_regex: Option<String>,
    pub max_file_size: i64,
    pub commit_committer_check: bool,
    pub reject_unsigned_commits: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// ProjectObservation mirrors the remote project
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectObservation {
    pub id: i64,
    pub name: String,
    pub path: String,
    pub path_with_namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,
    pub visibility: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<ProjectNamespaceObservation>,
    pub web_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_url_to_repo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_url_to_repo: Option<String>,
    pub archived: bool,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_activity_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marked_for_deletion_at: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_rules: Option<PushRulesObservation>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at_provider: Option<ProjectObservation>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl_managed!(Project, "Project");
