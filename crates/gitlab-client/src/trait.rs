//! Per-kind GitLab client traits for mocking
//!
//! Each managed kind talks to GitLab through the narrowest trait that covers
//! the verbs it uses. The concrete `GitLabClient` implements all of them, and
//! tests substitute `MockGitLabClient`.
//!
//! All async methods must be `Send` to work with Tokio's work-stealing runtime.

use crate::error::GitLabError;
use crate::models::*;

/// Group verbs, including sharing edges
#[async_trait::async_trait]
pub trait GroupClient: Send + Sync {
    async fn get_group(&self, id: i64) -> Result<Group, GitLabError>;
    async fn create_group(&self, opts: &CreateGroupOptions) -> Result<Group, GitLabError>;
    async fn update_group(&self, id: i64, opts: &UpdateGroupOptions) -> Result<Group, GitLabError>;
    async fn delete_group(&self, id: i64, opts: &DeleteGroupOptions) -> Result<(), GitLabError>;
    async fn share_group_with_group(&self, id: i64, opts: &ShareGroupWithGroupOptions) -> Result<Group, GitLabError>;
    async fn unshare_group_from_group(&self, id: i64, shared_group_id: i64) -> Result<(), GitLabError>;
}

/// Group membership verbs
#[async_trait::async_trait]
pub trait GroupMemberClient: Send + Sync {
    async fn get_group_member(&self, group_id: i64, user_id: i64) -> Result<GroupMember, GitLabError>;
    async fn add_group_member(&self, group_id: i64, opts: &AddGroupMemberOptions) -> Result<GroupMember, GitLabError>;
    async fn edit_group_member(&self, group_id: i64, user_id: i64, opts: &EditGroupMemberOptions) -> Result<GroupMember, GitLabError>;
    async fn remove_group_member(&self, group_id: i64, user_id: i64) -> Result<(), GitLabError>;
}

/// SAML group link verbs (no edit endpoint exists)
#[async_trait::async_trait]
pub trait SamlGroupLinkClient: Send + Sync {
    async fn get_saml_group_link(&self, group_id: i64, name: &str) -> Result<SamlGroupLink, GitLabError>;
    async fn add_saml_group_link(&self, group_id: i64, opts: &AddSamlGroupLinkOptions) -> Result<SamlGroupLink, GitLabError>;
    async fn delete_saml_group_link(&self, group_id: i64, name: &str) -> Result<(), GitLabError>;
}

/// LDAP group link verbs (no single-item GET or edit endpoint exists)
#[async_trait::async_trait]
pub trait LdapGroupLinkClient: Send + Sync {
    async fn list_ldap_group_links(&self, group_id: i64) -> Result<Vec<LdapGroupLink>, GitLabError>;
    async fn add_ldap_group_link(&self, group_id: i64, opts: &AddLdapGroupLinkOptions) -> Result<LdapGroupLink, GitLabError>;
    async fn delete_ldap_group_link(&self, group_id: i64, provider: &str, cn: &str) -> Result<(), GitLabError>;
}

/// Project verbs, including the push-rules sub-resource
#[async_trait::async_trait]
pub trait ProjectClient: Send + Sync {
    async fn get_project(&self, id: i64) -> Result<Project, GitLabError>;
    async fn create_project(&self, opts: &CreateProjectOptions) -> Result<Project, GitLabError>;
    async fn edit_project(&self, id: i64, opts: &EditProjectOptions) -> Result<Project, GitLabError>;
    async fn delete_project(&self, id: i64, opts: &DeleteProjectOptions) -> Result<(), GitLabError>;
    async fn get_project_push_rules(&self, id: i64) -> Result<ProjectPushRules, GitLabError>;
    async fn add_project_push_rule(&self, id: i64, opts: &PushRuleOptions) -> Result<ProjectPushRules, GitLabError>;
    async fn edit_project_push_rule(&self, id: i64, opts: &PushRuleOptions) -> Result<ProjectPushRules, GitLabError>;
    async fn delete_project_push_rule(&self, id: i64) -> Result<(), GitLabError>;
}

/// Project deploy token verbs (tokens are immutable)
#[async_trait::async_trait]
pub trait DeployTokenClient: Send + Sync {
    async fn get_project_deploy_token(&self, project_id: i64, id: i64) -> Result<DeployToken, GitLabError>;
    async fn create_project_deploy_token(&self, project_id: i64, opts: &CreateDeployTokenOptions) -> Result<DeployToken, GitLabError>;
    async fn delete_project_deploy_token(&self, project_id: i64, id: i64) -> Result<(), GitLabError>;
}

/// Project access token verbs (tokens are immutable)
#[async_trait::async_trait]
pub trait AccessTokenClient: Send + Sync {
    async fn get_project_access_token(&self, project_id: i64, id: i64) -> Result<ProjectAccessToken, GitLabError>;
    async fn create_project_access_token(&self, project_id: i64, opts: &CreateProjectAccessTokenOptions) -> Result<ProjectAccessToken, GitLabError>;
    async fn revoke_project_access_token(&self, project_id: i64, id: i64) -> Result<(), GitLabError>;
}

/// Project CI/CD variable verbs, addressed by key and environment scope
#[async_trait::async_trait]
pub trait VariableClient: Send + Sync {
    async fn get_variable(&self, project_id: i64, key: &str, environment_scope: Option<&str>) -> Result<ProjectVariable, GitLabError>;
    async fn create_variable(&self, project_id: i64, opts: &CreateProjectVariableOptions) -> Result<ProjectVariable, GitLabError>;
    async fn update_variable(&self, project_id: i64, key: &str, environment_scope: Option<&str>, opts: &UpdateProjectVariableOptions) -> Result<ProjectVariable, GitLabError>;
    async fn remove_variable(&self, project_id: i64, key: &str, environment_scope: Option<&str>) -> Result<(), GitLabError>;
}

/// Pipeline schedule verbs, including schedule variables
#[async_trait::async_trait]
pub trait PipelineScheduleClient: Send + Sync {
    async fn get_pipeline_schedule(&self, project_id: i64, id: i64) -> Result<PipelineSchedule, GitLabError>;
    async fn create_pipeline_schedule(&self, project_id: i64, opts: &CreatePipelineScheduleOptions) -> Result<PipelineSchedule, GitLabError>;
    async fn edit_pipeline_schedule(&self, project_id: i64, id: i64, opts: &EditPipelineScheduleOptions) -> Result<PipelineSchedule, GitLabError>;
    async fn delete_pipeline_schedule(&self, project_id: i64, id: i64) -> Result<(), GitLabError>;
    async fn create_pipeline_schedule_variable(&self, project_id: i64, id: i64, opts: &PipelineVariableOptions) -> Result<PipelineVariable, GitLabError>;
    async fn edit_pipeline_schedule_variable(&self, project_id: i64, id: i64, opts: &PipelineVariableOptions) -> Result<PipelineVariable, GitLabError>;
    async fn delete_pipeline_schedule_variable(&self, project_id: i64, id: i64, key: &str) -> Result<(), GitLabError>;
}

/// Runner verbs (creation goes through `POST /user/runners`)
#[async_trait::async_trait]
pub trait RunnerClient: Send + Sync {
    async fn get_runner(&self, id: i64) -> Result<Runner, GitLabError>;
    async fn create_user_runner(&self, opts: &CreateUserRunnerOptions) -> Result<CreatedRunner, GitLabError>;
    async fn update_runner(&self, id: i64, opts: &UpdateRunnerOptions) -> Result<Runner, GitLabError>;
    async fn delete_runner(&self, id: i64) -> Result<(), GitLabError>;
}
