//! Project-scoped entities: projects, push rules, deploy tokens, project
//! access tokens, CI/CD variables, pipeline schedules and runners.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Project entity (`GET /projects/:id`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub path_with_namespace: String,
    pub description: Option<String>,
    pub default_branch: Option<String>,
    #[serde(default)]
    pub visibility: String,
    pub namespace: Option<ProjectNamespace>,
    #[serde(default)]
    pub web_url: String,
    pub http_url_to_repo: Option<String>,
    pub ssh_url_to_repo: Option<String>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub issues_enabled: bool,
    #[serde(default)]
    pub merge_requests_enabled: bool,
    #[serde(default)]
    pub wiki_enabled: bool,
    #[serde(default)]
    pub jobs_enabled: bool,
    #[serde(default)]
    pub snippets_enabled: bool,
    #[serde(default)]
    pub container_registry_enabled: bool,
    #[serde(default)]
    pub lfs_enabled: bool,
    #[serde(default)]
    pub request_access_enabled: bool,
    #[serde(default)]
    pub shared_runners_enabled: bool,
    #[serde(default)]
    pub only_allow_merge_if_pipeline_succeeds: bool,
    #[serde(default)]
    pub only_allow_merge_if_all_discussions_are_resolved: bool,
    #[serde(default)]
    pub merge_method: String,
    #[serde(default)]
    pub squash_option: String,
    pub remove_source_branch_after_merge: Option<bool>,
    #[serde(default)]
    pub printing_merge_request_link_enabled: bool,
    pub ci_config_path: Option<String>,
    #[serde(default)]
    pub build_timeout: i64,
    pub auto_devops_enabled: Option<bool>,
    /// Only returned to maintainers and above
    pub runners_token: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub last_activity_at: Option<DateTime<Utc>>,
    /// Set when the project is scheduled for delayed deletion
    pub marked_for_deletion_at: Option<NaiveDate>,
}

/// Namespace a project lives in
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectNamespace {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub full_path: String,
}

/// Request body for `POST /projects`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateProjectOptions {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initialize_with_readme: Option<bool>,
    #[serde(flatten)]
    pub settings: ProjectSettings,
}

/// Request body for `PUT /projects/:id`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditProjectOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(flatten)]
    pub settings: ProjectSettings,
}

/// Mutable project settings shared by create and edit bodies
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_requests_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wiki_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobs_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippets_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_registry_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lfs_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_access_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_runners_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub only_allow_merge_if_pipeline_succeeds: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub only_allow_merge_if_all_discussions_are_resolved: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub squash_option: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_source_branch_after_merge: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub printing_merge_request_link_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ci_config_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_timeout: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_devops_enabled: Option<bool>,
}

/// Query parameters for `DELETE /projects/:id`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteProjectOptions {
    pub permanently_remove: Option<bool>,
    pub full_path: Option<String>,
}

/// Push rules of a project (`GET /projects/:id/push_rule`, Premium)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectPushRules {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub project_id: i64,
    pub commit_message_regex: Option<String>,
    pub commit_message_negative_regex: Option<String>,
    pub branch_name_regex: Option<String>,
    #[serde(default)]
    pub deny_delete_tag: bool,
    #[serde(default)]
    pub member_check: bool,
    #[serde(default)]
    pub prevent_secrets: bool,
    pub author_email_regex: Option<String>,
    pub file_name_regex: Option<String>,
    #[serde(default)]
    pub max_file_size: i64,
    #[serde(default)]
    pub commit_committer_check: bool,
    #[serde(default)]
    pub reject_unsigned_commits: bool,
    pub created_at: Option<DateTime<Utc>>,
}

/// Request body for `POST`/`PUT /projects/:id/push_rule`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PushRuleOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_message_regex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_message_negative_regex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_name_regex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deny_delete_tag: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_check: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prevent_secrets: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_email_regex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name_regex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_file_size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_committer_check: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reject_unsigned_commits: Option<bool>,
}

/// Deploy token (`GET /projects/:id/deploy_tokens/:token_id`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeployToken {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub username: String,
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub revoked: bool,
    #[serde(default)]
    pub expired: bool,
    /// Only present in the creation response
    pub token: Option<String>,
}

/// Request body for `POST /projects/:id/deploy_tokens`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateDeployTokenOptions {
    pub name: String,
    pub scopes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Project access token (`GET /projects/:id/access_tokens/:token_id`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectAccessToken {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub revoked: bool,
    #[serde(default)]
    pub active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub last_used_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub user_id: i64,
    pub expires_at: Option<NaiveDate>,
    #[serde(default)]
    pub access_level: i64,
    /// Only present in the creation response
    pub token: Option<String>,
}

/// Request body for `POST /projects/:id/access_tokens`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateProjectAccessTokenOptions {
    pub name: String,
    pub scopes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_level: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<NaiveDate>,
}

/// Project CI/CD variable (`GET /projects/:id/variables/:key`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectVariable {
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub variable_type: String,
    #[serde(default)]
    pub protected: bool,
    #[serde(default)]
    pub masked: bool,
    #[serde(default)]
    pub raw: bool,
    #[serde(default)]
    pub environment_scope: String,
    pub description: Option<String>,
}

/// Request body for `POST /projects/:id/variables`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateProjectVariableOptions {
    pub key: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protected: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub masked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment_scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Request body for `PUT /projects/:id/variables/:key`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateProjectVariableOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protected: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub masked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Pipeline schedule (`GET /projects/:id/pipeline_schedules/:schedule_id`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineSchedule {
    pub id: i64,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "ref", default)]
    pub git_ref: String,
    #[serde(default)]
    pub cron: String,
    #[serde(default)]
    pub cron_timezone: String,
    pub next_run_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub owner: Option<ScheduleOwner>,
    #[serde(default)]
    pub variables: Vec<PipelineVariable>,
}

/// User owning a pipeline schedule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleOwner {
    pub id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub name: String,
}

/// Variable attached to a pipeline schedule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineVariable {
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub variable_type: String,
}

/// Request body for `POST /projects/:id/pipeline_schedules`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreatePipelineScheduleOptions {
    pub description: String,
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub cron: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cron_timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// Request body for `PUT /projects/:id/pipeline_schedules/:schedule_id`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditPipelineScheduleOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub git_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cron: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cron_timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// Request body for pipeline schedule variable create/edit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineVariableOptions {
    pub key: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable_type: Option<String>,
}

/// Runner details (`GET /runners/:id`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Runner {
    pub id: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub paused: bool,
    #[serde(default)]
    pub is_shared: bool,
    #[serde(default)]
    pub runner_type: String,
    pub online: Option<bool>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub tag_list: Vec<String>,
    #[serde(default)]
    pub run_untagged: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub access_level: String,
    pub maximum_timeout: Option<i64>,
    pub maintenance_note: Option<String>,
    pub contacted_at: Option<DateTime<Utc>>,
}

/// Response of `POST /user/runners`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreatedRunner {
    pub id: i64,
    pub token: String,
    pub token_expires_at: Option<DateTime<Utc>>,
}

/// Request body for `POST /user/runners`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateUserRunnerOptions {
    pub runner_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
    #[serde(flatten)]
    pub settings: RunnerSettings,
}

/// Request body for `PUT /runners/:id`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateRunnerOptions {
    #[serde(flatten)]
    pub settings: RunnerSettings,
}

/// Mutable runner settings shared by create and update bodies
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunnerSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paused: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_untagged: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_list: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_timeout: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance_note: Option<String>,
}
