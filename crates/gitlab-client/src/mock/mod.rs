//! Mock GitLabClient for unit testing
//!
//! This module provides an in-memory implementation of every per-kind client
//! trait so adapters can be exercised without a running GitLab instance.
//!
//! The mock is organized into domain-specific modules:
//! - `groups.rs` - groups, sharing, members, SAML and LDAP links
//! - `projects.rs` - projects, push rules, tokens, variables, schedules, runners
//!
//! Every call is appended to a log (`calls()`), and any verb can be forced to
//! fail with a given HTTP status via `fail_on()`.

mod groups;
mod projects;

use crate::error::GitLabError;
use crate::gitlab_trait::*;
use crate::models::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

type Store<K, V> = Arc<Mutex<HashMap<K, V>>>;

fn store<K, V>() -> Store<K, V> {
    Arc::new(Mutex::new(HashMap::new()))
}

/// Mock GitLabClient for testing
///
/// Clones share the same stores, so a test can keep one handle for
/// assertions while an adapter owns another.
#[derive(Clone)]
pub struct MockGitLabClient {
    pub(crate) groups: Store<i64, Group>,
    pub(crate) group_members: Store<(i64, i64), GroupMember>,
    pub(crate) saml_links: Store<(i64, String), SamlGroupLink>,
    pub(crate) ldap_links: Store<i64, Vec<LdapGroupLink>>,
    pub(crate) projects: Store<i64, Project>,
    pub(crate) push_rules: Store<i64, ProjectPushRules>,
    pub(crate) deploy_tokens: Store<(i64, i64), DeployToken>,
    pub(crate) access_tokens: Store<(i64, i64), ProjectAccessToken>,
    pub(crate) variables: Store<(i64, String, String), ProjectVariable>,
    pub(crate) schedules: Store<(i64, i64), PipelineSchedule>,
    pub(crate) runners: Store<i64, Runner>,
    // Counter for generating IDs
    pub(crate) next_id: Arc<Mutex<i64>>,
    // When set, the first DELETE of a group/project only marks it
    pub(crate) delayed_deletion: Arc<Mutex<bool>>,
    calls: Arc<Mutex<Vec<String>>>,
    failures: Store<String, (u16, String)>,
}

impl Default for MockGitLabClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGitLabClient {
    /// Create a new, empty mock client
    pub fn new() -> Self {
        Self {
            groups: store(),
            group_members: store(),
            saml_links: store(),
            ldap_links: store(),
            projects: store(),
            push_rules: store(),
            deploy_tokens: store(),
            access_tokens: store(),
            variables: store(),
            schedules: store(),
            runners: store(),
            next_id: Arc::new(Mutex::new(1000)),
            delayed_deletion: Arc::new(Mutex::new(false)),
            calls: Arc::new(Mutex::new(Vec::new())),
            failures: store(),
        }
    }

    /// Add a group to the mock store (for test setup)
    pub fn add_group(&self, group: Group) {
        self.groups.lock().unwrap().insert(group.id, group);
    }

    /// Add a group member to the mock store (for test setup)
    pub fn add_group_member(&self, group_id: i64, member: GroupMember) {
        self.group_members
            .lock()
            .unwrap()
            .insert((group_id, member.id), member);
    }

    /// Add a SAML group link to the mock store (for test setup)
    pub fn add_saml_group_link(&self, group_id: i64, link: SamlGroupLink) {
        self.saml_links
            .lock()
            .unwrap()
            .insert((group_id, link.name.clone()), link);
    }

    /// Add an LDAP group link to the mock store (for test setup)
    pub fn add_ldap_group_link(&self, group_id: i64, link: LdapGroupLink) {
        self.ldap_links
            .lock()
            .unwrap()
            .entry(group_id)
            .or_default()
            .push(link);
    }

    /// Add a project to the mock store (for test setup)
    pub fn add_project(&self, project: Project) {
        self.projects.lock().unwrap().insert(project.id, project);
    }

    /// Configure push rules for a project (for test setup)
    pub fn set_push_rules(&self, project_id: i64, rules: ProjectPushRules) {
        self.push_rules.lock().unwrap().insert(project_id, rules);
    }

    /// Add a deploy token to the mock store (for test setup)
    pub fn add_deploy_token(&self, project_id: i64, token: DeployToken) {
        self.deploy_tokens
            .lock()
            .unwrap()
            .insert((project_id, token.id), token);
    }

    /// Add a project access token to the mock store (for test setup)
    pub fn add_access_token(&self, project_id: i64, token: ProjectAccessToken) {
        self.access_tokens
            .lock()
            .unwrap()
            .insert((project_id, token.id), token);
    }

    /// Add a CI/CD variable to the mock store (for test setup)
    pub fn add_variable(&self, project_id: i64, variable: ProjectVariable) {
        let scope = scope_key(Some(&variable.environment_scope));
        self.variables
            .lock()
            .unwrap()
            .insert((project_id, variable.key.clone(), scope), variable);
    }

    /// Add a pipeline schedule to the mock store (for test setup)
    pub fn add_pipeline_schedule(&self, project_id: i64, schedule: PipelineSchedule) {
        self.schedules
            .lock()
            .unwrap()
            .insert((project_id, schedule.id), schedule);
    }

    /// Add a runner to the mock store (for test setup)
    pub fn add_runner(&self, runner: Runner) {
        self.runners.lock().unwrap().insert(runner.id, runner);
    }

    /// Make group/project DELETE mark for deletion instead of removing
    pub fn set_delayed_deletion(&self, enabled: bool) {
        *self.delayed_deletion.lock().unwrap() = enabled;
    }

    /// Force every subsequent call of `verb` (a trait method name) to fail
    ///
    /// A 404 status produces `GitLabError::NotFound`; anything else produces
    /// `GitLabError::Api`.
    pub fn fail_on(&self, verb: &str, status: u16, message: &str) {
        self.failures
            .lock()
            .unwrap()
            .insert(verb.to_string(), (status, message.to_string()));
    }

    /// Remove an injected failure
    pub fn clear_failure(&self, verb: &str) {
        self.failures.lock().unwrap().remove(verb);
    }

    /// All calls made so far, as `verb` or `verb:detail`
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls whose verb matches exactly
    pub fn call_count(&self, verb: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.split(':').next() == Some(verb))
            .count()
    }

    /// Forget recorded calls (stores are left untouched)
    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Record a call and return the injected failure, if any
    pub(crate) fn record(&self, verb: &str, detail: impl std::fmt::Display) -> Result<(), GitLabError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{}:{}", verb, detail));
        match self.failures.lock().unwrap().get(verb) {
            Some((404, message)) => Err(GitLabError::NotFound(message.clone())),
            Some((status, message)) => Err(GitLabError::Api {
                status: *status,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Generate next ID
    pub(crate) fn next_id(&self) -> i64 {
        let mut id = self.next_id.lock().unwrap();
        let current = *id;
        *id += 1;
        current
    }

    pub(crate) fn delayed(&self) -> bool {
        *self.delayed_deletion.lock().unwrap()
    }
}

/// GitLab treats an omitted environment scope as `*`
pub(crate) fn scope_key(scope: Option<&str>) -> String {
    match scope {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => "*".to_string(),
    }
}

pub(crate) fn not_found(what: impl std::fmt::Display) -> GitLabError {
    GitLabError::NotFound(format!("404 {} Not Found", what))
}

#[async_trait::async_trait]
impl GroupClient for MockGitLabClient {
    async fn get_group(&self, id: i64) -> Result<Group, GitLabError> {
        groups::get_group(self, id).await
    }

    async fn create_group(&self, opts: &CreateGroupOptions) -> Result<Group, GitLabError> {
        groups::create_group(self, opts).await
    }

    async fn update_group(&self, id: i64, opts: &UpdateGroupOptions) -> Result<Group, GitLabError> {
        groups::update_group(self, id, opts).await
    }

    async fn delete_group(&self, id: i64, opts: &DeleteGroupOptions) -> Result<(), GitLabError> {
        groups::delete_group(self, id, opts).await
    }

    async fn share_group_with_group(&self, id: i64, opts: &ShareGroupWithGroupOptions) -> Result<Group, GitLabError> {
        groups::share_group_with_group(self, id, opts).await
    }

    async fn unshare_group_from_group(&self, id: i64, shared_group_id: i64) -> Result<(), GitLabError> {
        groups::unshare_group_from_group(self, id, shared_group_id).await
    }
}

#[async_trait::async_trait]
impl GroupMemberClient for MockGitLabClient {
    async fn get_group_member(&self, group_id: i64, user_id: i64) -> Result<GroupMember, GitLabError> {
        groups::get_group_member(self, group_id, user_id).await
    }

    async fn add_group_member(&self, group_id: i64, opts: &AddGroupMemberOptions) -> Result<GroupMember, GitLabError> {
        groups::add_group_member(self, group_id, opts).await
    }

    async fn edit_group_member(&self, group_id: i64, user_id: i64, opts: &EditGroupMemberOptions) -> Result<GroupMember, GitLabError> {
        groups::edit_group_member(self, group_id, user_id, opts).await
    }

    async fn remove_group_member(&self, group_id: i64, user_id: i64) -> Result<(), GitLabError> {
        groups::remove_group_member(self, group_id, user_id).await
    }
}

#[async_trait::async_trait]
impl SamlGroupLinkClient for MockGitLabClient {
    async fn get_saml_group_link(&self, group_id: i64, name: &str) -> Result<SamlGroupLink, GitLabError> {
        groups::get_saml_group_link(self, group_id, name).await
    }

    async fn add_saml_group_link(&self, group_id: i64, opts: &AddSamlGroupLinkOptions) -> Result<SamlGroupLink, GitLabError> {
        groups::add_saml_group_link(self, group_id, opts).await
    }

    async fn delete_saml_group_link(&self, group_id: i64, name: &str) -> Result<(), GitLabError> {
        groups::delete_saml_group_link(self, group_id, name).await
    }
}

#[async_trait::async_trait]
impl LdapGroupLinkClient for MockGitLabClient {
    async fn list_ldap_group_links(&self, group_id: i64) -> Result<Vec<LdapGroupLink>, GitLabError> {
        groups::list_ldap_group_links(self, group_id).await
    }

    async fn add_ldap_group_link(&self, group_id: i64, opts: &AddLdapGroupLinkOptions) -> Result<LdapGroupLink, GitLabError> {
        groups::add_ldap_group_link(self, group_id, opts).await
    }

    async fn delete_ldap_group_link(&self, group_id: i64, provider: &str, cn: &str) -> Result<(), GitLabError> {
        groups::delete_ldap_group_link(self, group_id, provider, cn).await
    }
}

#[async_trait::async_trait]
impl ProjectClient for MockGitLabClient {
    async fn get_project(&self, id: i64) -> Result<Project, GitLabError> {
        projects::get_project(self, id).await
    }

    async fn create_project(&self, opts: &CreateProjectOptions) -> Result<Project, GitLabError> {
        projects::create_project(self, opts).await
    }

    async fn edit_project(&self, id: i64, opts: &EditProjectOptions) -> Result<Project, GitLabError> {
        projects::edit_project(self, id, opts).await
    }

    async fn delete_project(&self, id: i64, opts: &DeleteProjectOptions) -> Result<(), GitLabError> {
        projects::delete_project(self, id, opts).await
    }

    async fn get_project_push_rules(&self, id: i64) -> Result<ProjectPushRules, GitLabError> {
        projects::get_project_push_rules(self, id).await
    }

    async fn add_project_push_rule(&self, id: i64, opts: &PushRuleOptions) -> Result<ProjectPushRules, GitLabError> {
        projects::add_project_push_rule(self, id, opts).await
    }

    async fn edit_project_push_rule(&self, id: i64, opts: &PushRuleOptions) -> Result<ProjectPushRules, GitLabError> {
        projects::edit_project_push_rule(self, id, opts).await
    }

    async fn delete_project_push_rule(&self, id: i64) -> Result<(), GitLabError> {
        projects::delete_project_push_rule(self, id).await
    }
}

#[async_trait::async_trait]
impl DeployTokenClient for MockGitLabClient {
    async fn get_project_deploy_token(&self, project_id: i64, id: i64) -> Result<DeployToken, GitLabError> {
        projects::get_project_deploy_token(self, project_id, id).await
    }

    async fn create_project_deploy_token(&self, project_id: i64, opts: &CreateDeployTokenOptions) -> Result<DeployToken, GitLabError> {
        projects::create_project_deploy_token(self, project_id, opts).await
    }

    async fn delete_project_deploy_token(&self, project_id: i64, id: i64) -> Result<(), GitLabError> {
        projects::delete_project_deploy_token(self, project_id, id).await
    }
}

#[async_trait::async_trait]
impl AccessTokenClient for MockGitLabClient {
    async fn get_project_access_token(&self, project_id: i64, id: i64) -> Result<ProjectAccessToken, GitLabError> {
        projects::get_project_access_token(self, project_id, id).await
    }

    async fn create_project_access_token(&self, project_id: i64, opts: &CreateProjectAccessTokenOptions) -> Result<ProjectAccessToken, GitLabError> {
        projects::create_project_access_token(self, project_id, opts).await
    }

    async fn revoke_project_access_token(&self, project_id: i64, id: i64) -> Result<(), GitLabError> {
        projects::revoke_project_access_token(self, project_id, id).await
    }
}

#[async_trait::async_trait]
impl VariableClient for MockGitLabClient {
    async fn get_variable(&self, project_id: i64, key: &str, environment_scope: Option<&str>) -> Result<ProjectVariable, GitLabError> {
        projects::get_variable(self, project_id, key, environment_scope).await
    }

    async fn create_variable(&self, project_id: i64, opts: &CreateProjectVariableOptions) -> Result<ProjectVariable, GitLabError> {
        projects::create_variable(self, project_id, opts).await
    }

    async fn update_variable(&self, project_id: i64, key: &str, environment_scope: Option<&str>, opts: &UpdateProjectVariableOptions) -> Result<ProjectVariable, GitLabError> {
        projects::update_variable(self, project_id, key, environment_scope, opts).await
    }

    async fn remove_variable(&self, project_id: i64, key: &str, environment_scope: Option<&str>) -> Result<(), GitLabError> {
        projects::remove_variable(self, project_id, key, environment_scope).await
    }
}

#[async_trait::async_trait]
impl PipelineScheduleClient for MockGitLabClient {
    async fn get_pipeline_schedule(&self, project_id: i64, id: i64) -> Result<PipelineSchedule, GitLabError> {
        projects::get_pipeline_schedule(self, project_id, id).await
    }

    async fn create_pipeline_schedule(&self, project_id: i64, opts: &CreatePipelineScheduleOptions) -> Result<PipelineSchedule, GitLabError> {
        projects::create_pipeline_schedule(self, project_id, opts).await
    }

    async fn edit_pipeline_schedule(&self, project_id: i64, id: i64, opts: &EditPipelineScheduleOptions) -> Result<PipelineSchedule, GitLabError> {
        projects::edit_pipeline_schedule(self, project_id, id, opts).await
    }

    async fn delete_pipeline_schedule(&self, project_id: i64, id: i64) -> Result<(), GitLabError> {
        projects::delete_pipeline_schedule(self, project_id, id).await
    }

    async fn create_pipeline_schedule_variable(&self, project_id: i64, id: i64, opts: &PipelineVariableOptions) -> Result<PipelineVariable, GitLabError> {
        projects::create_pipeline_schedule_variable(self, project_id, id, opts).await
    }

    async fn edit_pipeline_schedule_variable(&self, project_id: i64, id: i64, opts: &PipelineVariableOptions) -> Result<PipelineVariable, GitLabError> {
        projects::edit_pipeline_schedule_variable(self, project_id, id, opts).await
    }

    async fn delete_pipeline_schedule_variable(&self, project_id: i64, id: i64, key: &str) -> Result<(), GitLabError> {
        projects::delete_pipeline_schedule_variable(self, project_id, id, key).await
    }
}

#[async_trait::async_trait]
impl RunnerClient for MockGitLabClient {
    async fn get_runner(&self, id: i64) -> Result<Runner, GitLabError> {
        projects::get_runner(self, id).await
    }

    async fn create_user_runner(&self, opts: &CreateUserRunnerOptions) -> Result<CreatedRunner, GitLabError> {
        projects::create_user_runner(self, opts).await
    }

    async fn update_runner(&self, id: i64, opts: &UpdateRunnerOptions) -> Result<Runner, GitLabError> {
        projects::update_runner(self, id, opts).await
    }

    async fn delete_runner(&self, id: i64) -> Result<(), GitLabError> {
        projects::delete_runner(self, id).await
    }
}
