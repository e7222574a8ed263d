//! Project operations for MockGitLabClient
//!
//! Handles projects, push rules, deploy/access tokens, CI/CD variables,
//! pipeline schedules and runners

use super::{not_found, scope_key, MockGitLabClient};
use crate::error::GitLabError;
use crate::models::*;

fn apply_settings(project: &mut Project, settings: &ProjectSettings) {
    if let Some(v) = &settings.topics {
        project.topics = v.clone();
    }
    if let Some(v) = settings.issues_enabled {
        project.issues_enabled = v;
    }
    if let Some(v) = settings.merge_requests_enabled {
        project.merge_requests_enabled = v;
    }
    if let Some(v) = settings.wiki_enabled {
        project.wiki_enabled = v;
    }
    if let Some(v) = settings.jobs_enabled {
        project.jobs_enabled = v;
    }
    if let Some(v) = settings.snippets_enabled {
        project.snippets_enabled = v;
    }
    if let Some(v) = settings.container_registry_enabled {
        project.container_registry_enabled = v;
    }
    if let Some(v) = settings.lfs_enabled {
        project.lfs_enabled = v;
    }
    if let Some(v) = settings.request_access_enabled {
        project.request_access_enabled = v;
    }
    if let Some(v) = settings.shared_runners_enabled {
        project.shared_runners_enabled = v;
    }
    if let Some(v) = settings.only_allow_merge_if_pipeline_succeeds {
        project.only_allow_merge_if_pipeline_succeeds = v;
    }
    if let Some(v) = settings.only_allow_merge_if_all_discussions_are_resolved {
        project.only_allow_merge_if_all_discussions_are_resolved = v;
    }
    if let Some(v) = &settings.merge_method {
        project.merge_method = v.clone();
    }
    if let Some(v) = &settings.squash_option {
        project.squash_option = v.clone();
    }
    if settings.remove_source_branch_after_merge.is_some() {
        project.remove_source_branch_after_merge = settings.remove_source_branch_after_merge;
    }
    if let Some(v) = settings.printing_merge_request_link_enabled {
        project.printing_merge_request_link_enabled = v;
    }
    if settings.ci_config_path.is_some() {
        project.ci_config_path = settings.ci_config_path.clone();
    }
    if let Some(v) = settings.build_timeout {
        project.build_timeout = v;
    }
    if settings.auto_devops_enabled.is_some() {
        project.auto_devops_enabled = settings.auto_devops_enabled;
    }
}

pub async fn get_project(client: &MockGitLabClient, id: i64) -> Result<Project, GitLabError> {
    client.record("get_project", id)?;
    client
        .projects
        .lock()
        .unwrap()
        .get(&id)
        .cloned()
        .ok_or_else(|| not_found("Project"))
}

pub async fn create_project(client: &MockGitLabClient, opts: &CreateProjectOptions) -> Result<Project, GitLabError> {
    client.record("create_project", &opts.name)?;

    let path = opts
        .path
        .clone()
        .unwrap_or_else(|| opts.name.to_lowercase().replace(' ', "-"));
    let namespace = match opts.namespace_id {
        Some(ns) => {
            let groups = client.groups.lock().unwrap();
            let group = groups.get(&ns).ok_or_else(|| not_found("Namespace"))?;
            ProjectNamespace {
                id: group.id,
                name: group.name.clone(),
                path: group.path.clone(),
                kind: "group".to_string(),
                full_path: group.full_path.clone(),
            }
        }
        None => ProjectNamespace {
            id: 1,
            name: "root".to_string(),
            path: "root".to_string(),
            kind: "user".to_string(),
            full_path: "root".to_string(),
        },
    };
    let path_with_namespace = format!("{}/{}", namespace.full_path, path);
    if client
        .projects
        .lock()
        .unwrap()
        .values()
        .any(|p| p.path_with_namespace == path_with_namespace)
    {
        return Err(GitLabError::Api {
            status: 400,
            message: r#"{"path":["has already been taken"]}"#.to_string(),
        });
    }

    let id = client.next_id();
    let mut project = Project {
        id,
        name: opts.name.clone(),
        path,
        path_with_namespace: path_with_namespace.clone(),
        description: opts.description.clone(),
        default_branch: Some(opts.default_branch.clone().unwrap_or_else(|| "main".to_string())),
        visibility: opts.visibility.clone().unwrap_or_else(|| "private".to_string()),
        namespace: Some(namespace),
        web_url: format!("https://gitlab.example.com/{}", path_with_namespace),
        issues_enabled: true,
        merge_requests_enabled: true,
        wiki_enabled: true,
        jobs_enabled: true,
        snippets_enabled: true,
        container_registry_enabled: true,
        lfs_enabled: true,
        request_access_enabled: true,
        shared_runners_enabled: true,
        merge_method: "merge".to_string(),
        squash_option: "default_off".to_string(),
        build_timeout: 3600,
        runners_token: Some(format!("GR1348941project{}", id)),
        created_at: Some(chrono::Utc::now()),
        ..Default::default()
    };
    apply_settings(&mut project, &opts.settings);
    client.projects.lock().unwrap().insert(id, project.clone());
    Ok(project)
}

pub async fn edit_project(client: &MockGitLabClient, id: i64, opts: &EditProjectOptions) -> Result<Project, GitLabError> {
    client.record("edit_project", id)?;
    let mut projects = client.projects.lock().unwrap();
    let project = projects.get_mut(&id).ok_or_else(|| not_found("Project"))?;

    if let Some(v) = &opts.name {
        project.name = v.clone();
    }
    if let Some(v) = &opts.path {
        project.path = v.clone();
    }
    if opts.description.is_some() {
        project.description = opts.description.clone();
    }
    if opts.default_branch.is_some() {
        project.default_branch = opts.default_branch.clone();
    }
    if let Some(v) = &opts.visibility {
        project.visibility = v.clone();
    }
    apply_settings(project, &opts.settings);
    Ok(project.clone())
}

pub async fn delete_project(client: &MockGitLabClient, id: i64, opts: &DeleteProjectOptions) -> Result<(), GitLabError> {
    client.record("delete_project", id)?;
    let delayed = client.delayed();
    let mut projects = client.projects.lock().unwrap();
    let project = projects.get_mut(&id).ok_or_else(|| not_found("Project"))?;

    if opts.permanently_remove == Some(true) {
        if project.marked_for_deletion_at.is_none() {
            return Err(GitLabError::Api {
                status: 400,
                message: "Project must be marked for deletion first.".to_string(),
            });
        }
        if opts.full_path.as_deref() != Some(project.path_with_namespace.as_str()) {
            return Err(GitLabError::Api {
                status: 400,
                message: "`full_path` is incorrect. You must enter the complete path for the project.".to_string(),
            });
        }
        projects.remove(&id);
        return Ok(());
    }

    if !delayed {
        projects.remove(&id);
        return Ok(());
    }
    if project.marked_for_deletion_at.is_some() {
        return Err(GitLabError::Api {
            status: 400,
            message: "Project has been already marked for deletion".to_string(),
        });
    }
    project.marked_for_deletion_at = Some(chrono::Utc::now().date_naive());
    Ok(())
}

fn apply_push_rules(rules: &mut ProjectPushRules, opts: &PushRuleOptions) {
    if opts.commit_message_regex.is_some() {
        rules.commit_message_regex = opts.commit_message_regex.clone();
    }
    if opts.commit_message_negative_regex.is_some() {
        rules.commit_message_negative_regex = opts.commit_message_negative_regex.clone();
    }
    if opts.branch_name_regex.is_some() {
        rules.branch_name_regex = opts.branch_name_regex.clone();
    }
    if let Some(v) = opts.deny_delete_tag {
        rules.deny_delete_tag = v;
    }
    if let Some(v) = opts.member_check {
        rules.member_check = v;
    }
    if let Some(v) = opts.prevent_secrets {
        rules.prevent_secrets = v;
    }
    if opts.author_email_regex.is_some() {
        rules.author_email_regex = opts.author_email_regex.clone();
    }
    if opts.file_name_regex.is_some() {
        rules.file_name_regex = opts.file_name_regex.clone();
    }
    if let Some(v) = opts.max_file_size {
        rules.max_file_size = v;
    }
    if let Some(v) = opts.commit_committer_check {
        rules.commit_committer_check = v;
    }
    if let Some(v) = opts.reject_unsigned_commits {
        rules.reject_unsigned_commits = v;
    }
}

pub async fn get_project_push_rules(client: &MockGitLabClient, id: i64) -> Result<ProjectPushRules, GitLabError> {
    client.record("get_project_push_rules", id)?;
    client
        .push_rules
        .lock()
        .unwrap()
        .get(&id)
        .cloned()
        .ok_or_else(|| not_found("Push Rule"))
}

pub async fn add_project_push_rule(client: &MockGitLabClient, id: i64, opts: &PushRuleOptions) -> Result<ProjectPushRules, GitLabError> {
    client.record("add_project_push_rule", id)?;
    let mut all = client.push_rules.lock().unwrap();
    if all.contains_key(&id) {
        return Err(GitLabError::Api {
            status: 422,
            message: "Project push rule exists".to_string(),
        });
    }
    let mut rules = ProjectPushRules {
        id: client.next_id(),
        project_id: id,
        created_at: Some(chrono::Utc::now()),
        ..Default::default()
    };
    apply_push_rules(&mut rules, opts);
    all.insert(id, rules.clone());
    Ok(rules)
}

pub async fn edit_project_push_rule(client: &MockGitLabClient, id: i64, opts: &PushRuleOptions) -> Result<ProjectPushRules, GitLabError> {
    client.record("edit_project_push_rule", id)?;
    let mut all = client.push_rules.lock().unwrap();
    let rules = all.get_mut(&id).ok_or_else(|| not_found("Push Rule"))?;
    apply_push_rules(rules, opts);
    Ok(rules.clone())
}

pub async fn delete_project_push_rule(client: &MockGitLabClient, id: i64) -> Result<(), GitLabError> {
    client.record("delete_project_push_rule", id)?;
    client
        .push_rules
        .lock()
        .unwrap()
        .remove(&id)
        .map(|_| ())
        .ok_or_else(|| not_found("Push Rule"))
}

pub async fn get_project_deploy_token(client: &MockGitLabClient, project_id: i64, id: i64) -> Result<DeployToken, GitLabError> {
    client.record("get_project_deploy_token", format!("{}:{}", project_id, id))?;
    client
        .deploy_tokens
        .lock()
        .unwrap()
        .get(&(project_id, id))
        .cloned()
        // the secret is never returned after creation
        .map(|t| DeployToken { token: None, ..t })
        .ok_or_else(|| not_found("Deploy Token"))
}

pub async fn create_project_deploy_token(client: &MockGitLabClient, project_id: i64, opts: &CreateDeployTokenOptions) -> Result<DeployToken, GitLabError> {
    client.record("create_project_deploy_token", format!("{}:{}", project_id, opts.name))?;
    let id = client.next_id();
    let token = DeployToken {
        id,
        name: opts.name.clone(),
        username: opts
            .username
            .clone()
            .unwrap_or_else(|| format!("gitlab+deploy-token-{}", id)),
        expires_at: opts.expires_at,
        scopes: opts.scopes.clone(),
        revoked: false,
        expired: false,
        token: Some(format!("gldt-{}", id)),
    };
    client
        .deploy_tokens
        .lock()
        .unwrap()
        .insert((project_id, id), token.clone());
    Ok(token)
}

pub async fn delete_project_deploy_token(client: &MockGitLabClient, project_id: i64, id: i64) -> Result<(), GitLabError> {
    client.record("delete_project_deploy_token", format!("{}:{}", project_id, id))?;
    client
        .deploy_tokens
        .lock()
        .unwrap()
        .remove(&(project_id, id))
        .map(|_| ())
        .ok_or_else(|| not_found("Deploy Token"))
}

pub async fn get_project_access_token(client: &MockGitLabClient, project_id: i64, id: i64) -> Result<ProjectAccessToken, GitLabError> {
    client.record("get_project_access_token", format!("{}:{}", project_id, id))?;
    client
        .access_tokens
        .lock()
        .unwrap()
        .get(&(project_id, id))
        .cloned()
        .map(|t| ProjectAccessToken { token: None, ..t })
        .ok_or_else(|| not_found("Access Token"))
}

pub async fn create_project_access_token(client: &MockGitLabClient, project_id: i64, opts: &CreateProjectAccessTokenOptions) -> Result<ProjectAccessToken, GitLabError> {
    client.record("create_project_access_token", format!("{}:{}", project_id, opts.name))?;
    let id = client.next_id();
    let token = ProjectAccessToken {
        id,
        name: opts.name.clone(),
        revoked: false,
        active: true,
        created_at: Some(chrono::Utc::now()),
        scopes: opts.scopes.clone(),
        user_id: id + 1_000_000,
        expires_at: opts.expires_at,
        access_level: opts.access_level.unwrap_or(40),
        token: Some(format!("glpat-{}", id)),
        ..Default::default()
    };
    client
        .access_tokens
        .lock()
        .unwrap()
        .insert((project_id, id), token.clone());
    Ok(token)
}

/// GitLab keeps revoked tokens visible with `revoked: true`
pub async fn revoke_project_access_token(client: &MockGitLabClient, project_id: i64, id: i64) -> Result<(), GitLabError> {
    client.record("revoke_project_access_token", format!("{}:{}", project_id, id))?;
    let mut tokens = client.access_tokens.lock().unwrap();
    let token = tokens
        .get_mut(&(project_id, id))
        .ok_or_else(|| not_found("Access Token"))?;
    token.revoked = true;
    token.active = false;
    Ok(())
}

pub async fn get_variable(client: &MockGitLabClient, project_id: i64, key: &str, environment_scope: Option<&str>) -> Result<ProjectVariable, GitLabError> {
    client.record("get_variable", format!("{}:{}", project_id, key))?;
    client
        .variables
        .lock()
        .unwrap()
        .get(&(project_id, key.to_string(), scope_key(environment_scope)))
        .cloned()
        .ok_or_else(|| not_found("Variable"))
}

pub async fn create_variable(client: &MockGitLabClient, project_id: i64, opts: &CreateProjectVariableOptions) -> Result<ProjectVariable, GitLabError> {
    client.record("create_variable", format!("{}:{}", project_id, opts.key))?;
    let scope = scope_key(opts.environment_scope.as_deref());
    let mut variables = client.variables.lock().unwrap();
    let id = (project_id, opts.key.clone(), scope.clone());
    if variables.contains_key(&id) {
        return Err(GitLabError::Api {
            status: 400,
            message: format!(r#"{{"key":["({}) has already been taken"]}}"#, opts.key),
        });
    }
    let variable = ProjectVariable {
        key: opts.key.clone(),
        value: opts.value.clone(),
        variable_type: opts.variable_type.clone().unwrap_or_else(|| "env_var".to_string()),
        protected: opts.protected.unwrap_or_default(),
        masked: opts.masked.unwrap_or_default(),
        raw: opts.raw.unwrap_or_default(),
        environment_scope: scope,
        description: opts.description.clone(),
    };
    variables.insert(id, variable.clone());
    Ok(variable)
}

pub async fn update_variable(client: &MockGitLabClient, project_id: i64, key: &str, environment_scope: Option<&str>, opts: &UpdateProjectVariableOptions) -> Result<ProjectVariable, GitLabError> {
    client.record("update_variable", format!("{}:{}", project_id, key))?;
    let mut variables = client.variables.lock().unwrap();
    let variable = variables
        .get_mut(&(project_id, key.to_string(), scope_key(environment_scope)))
        .ok_or_else(|| not_found("Variable"))?;
    if let Some(v) = &opts.value {
        variable.value = v.clone();
    }
    if let Some(v) = &opts.variable_type {
        variable.variable_type = v.clone();
    }
    if let Some(v) = opts.protected {
        variable.protected = v;
    }
    if let Some(v) = opts.masked {
        variable.masked = v;
    }
    if let Some(v) = opts.raw {
        variable.raw = v;
    }
    if opts.description.is_some() {
        variable.description = opts.description.clone();
    }
    Ok(variable.clone())
}

pub async fn remove_variable(client: &MockGitLabClient, project_id: i64, key: &str, environment_scope: Option<&str>) -> Result<(), GitLabError> {
    client.record("remove_variable", format!("{}:{}", project_id, key))?;
    client
        .variables
        .lock()
        .unwrap()
        .remove(&(project_id, key.to_string(), scope_key(environment_scope)))
        .map(|_| ())
        .ok_or_else(|| not_found("Variable"))
}

pub async fn get_pipeline_schedule(client: &MockGitLabClient, project_id: i64, id: i64) -> Result<PipelineSchedule, GitLabError> {
    client.record("get_pipeline_schedule", format!("{}:{}", project_id, id))?;
    client
        .schedules
        .lock()
        .unwrap()
        .get(&(project_id, id))
        .cloned()
        .ok_or_else(|| not_found("Pipeline Schedule"))
}

pub async fn create_pipeline_schedule(client: &MockGitLabClient, project_id: i64, opts: &CreatePipelineScheduleOptions) -> Result<PipelineSchedule, GitLabError> {
    client.record("create_pipeline_schedule", format!("{}:{}", project_id, opts.description))?;
    let id = client.next_id();
    let schedule = PipelineSchedule {
        id,
        description: opts.description.clone(),
        git_ref: opts.git_ref.clone(),
        cron: opts.cron.clone(),
        cron_timezone: opts.cron_timezone.clone().unwrap_or_else(|| "UTC".to_string()),
        active: opts.active.unwrap_or(true),
        created_at: Some(chrono::Utc::now()),
        updated_at: Some(chrono::Utc::now()),
        ..Default::default()
    };
    client
        .schedules
        .lock()
        .unwrap()
        .insert((project_id, id), schedule.clone());
    Ok(schedule)
}

pub async fn edit_pipeline_schedule(client: &MockGitLabClient, project_id: i64, id: i64, opts: &EditPipelineScheduleOptions) -> Result<PipelineSchedule, GitLabError> {
    client.record("edit_pipeline_schedule", format!("{}:{}", project_id, id))?;
    let mut schedules = client.schedules.lock().unwrap();
    let schedule = schedules
        .get_mut(&(project_id, id))
        .ok_or_else(|| not_found("Pipeline Schedule"))?;
    if let Some(v) = &opts.description {
        schedule.description = v.clone();
    }
    if let Some(v) = &opts.git_ref {
        schedule.git_ref = v.clone();
    }
    if let Some(v) = &opts.cron {
        schedule.cron = v.clone();
    }
    if let Some(v) = &opts.cron_timezone {
        schedule.cron_timezone = v.clone();
    }
    if let Some(v) = opts.active {
        schedule.active = v;
    }
    schedule.updated_at = Some(chrono::Utc::now());
    Ok(schedule.clone())
}

pub async fn delete_pipeline_schedule(client: &MockGitLabClient, project_id: i64, id: i64) -> Result<(), GitLabError> {
    client.record("delete_pipeline_schedule", format!("{}:{}", project_id, id))?;
    client
        .schedules
        .lock()
        .unwrap()
        .remove(&(project_id, id))
        .map(|_| ())
        .ok_or_else(|| not_found("Pipeline Schedule"))
}

pub async fn create_pipeline_schedule_variable(client: &MockGitLabClient, project_id: i64, id: i64, opts: &PipelineVariableOptions) -> Result<PipelineVariable, GitLabError> {
    client.record("create_pipeline_schedule_variable", format!("{}:{}:{}", project_id, id, opts.key))?;
    let mut schedules = client.schedules.lock().unwrap();
    let schedule = schedules
        .get_mut(&(project_id, id))
        .ok_or_else(|| not_found("Pipeline Schedule"))?;
    if schedule.variables.iter().any(|v| v.key == opts.key) {
        return Err(GitLabError::Api {
            status: 400,
            message: format!(r#"{{"key":["({}) has already been taken"]}}"#, opts.key),
        });
    }
    let variable = PipelineVariable {
        key: opts.key.clone(),
        value: opts.value.clone(),
        variable_type: opts.variable_type.clone().unwrap_or_else(|| "env_var".to_string()),
    };
    schedule.variables.push(variable.clone());
    Ok(variable)
}

pub async fn edit_pipeline_schedule_variable(client: &MockGitLabClient, project_id: i64, id: i64, opts: &PipelineVariableOptions) -> Result<PipelineVariable, GitLabError> {
    client.record("edit_pipeline_schedule_variable", format!("{}:{}:{}", project_id, id, opts.key))?;
    let mut schedules = client.schedules.lock().unwrap();
    let schedule = schedules
        .get_mut(&(project_id, id))
        .ok_or_else(|| not_found("Pipeline Schedule"))?;
    let variable = schedule
        .variables
        .iter_mut()
        .find(|v| v.key == opts.key)
        .ok_or_else(|| not_found("Variable"))?;
    variable.value = opts.value.clone();
    if let Some(t) = &opts.variable_type {
        variable.variable_type = t.clone();
    }
    Ok(variable.clone())
}

pub async fn delete_pipeline_schedule_variable(client: &MockGitLabClient, project_id: i64, id: i64, key: &str) -> Result<(), GitLabError> {
    client.record("delete_pipeline_schedule_variable", format!("{}:{}:{}", project_id, id, key))?;
    let mut schedules = client.schedules.lock().unwrap();
    let schedule = schedules
        .get_mut(&(project_id, id))
        .ok_or_else(|| not_found("Pipeline Schedule"))?;
    let before = schedule.variables.len();
    schedule.variables.retain(|v| v.key != key);
    if schedule.variables.len() == before {
        return Err(not_found("Variable"));
    }
    Ok(())
}

fn apply_runner_settings(runner: &mut Runner, settings: &RunnerSettings) {
    if let Some(v) = &settings.description {
        runner.description = v.clone();
    }
    if let Some(v) = settings.paused {
        runner.paused = v;
    }
    if let Some(v) = settings.locked {
        runner.locked = v;
    }
    if let Some(v) = settings.run_untagged {
        runner.run_untagged = v;
    }
    if let Some(v) = &settings.tag_list {
        runner.tag_list = v.clone();
    }
    if let Some(v) = &settings.access_level {
        runner.access_level = v.clone();
    }
    if settings.maximum_timeout.is_some() {
        runner.maximum_timeout = settings.maximum_timeout;
    }
    if settings.maintenance_note.is_some() {
        runner.maintenance_note = settings.maintenance_note.clone();
    }
}

pub async fn get_runner(client: &MockGitLabClient, id: i64) -> Result<Runner, GitLabError> {
    client.record("get_runner", id)?;
    client
        .runners
        .lock()
        .unwrap()
        .get(&id)
        .cloned()
        .ok_or_else(|| not_found("Runner"))
}

pub async fn create_user_runner(client: &MockGitLabClient, opts: &CreateUserRunnerOptions) -> Result<CreatedRunner, GitLabError> {
    client.record("create_user_runner", &opts.runner_type)?;
    let id = client.next_id();
    let mut runner = Runner {
        id,
        runner_type: opts.runner_type.clone(),
        is_shared: opts.runner_type == "instance_type",
        status: "never_contacted".to_string(),
        run_untagged: true,
        access_level: "not_protected".to_string(),
        ..Default::default()
    };
    apply_runner_settings(&mut runner, &opts.settings);
    client.runners.lock().unwrap().insert(id, runner);
    Ok(CreatedRunner {
        id,
        token: format!("glrt-{}", id),
        token_expires_at: None,
    })
}

pub async fn update_runner(client: &MockGitLabClient, id: i64, opts: &UpdateRunnerOptions) -> Result<Runner, GitLabError> {
    client.record("update_runner", id)?;
    let mut runners = client.runners.lock().unwrap();
    let runner = runners.get_mut(&id).ok_or_else(|| not_found("Runner"))?;
    apply_runner_settings(runner, &opts.settings);
    Ok(runner.clone())
}

pub async fn delete_runner(client: &MockGitLabClient, id: i64) -> Result<(), GitLabError> {
    client.record("delete_runner", id)?;
    client
        .runners
        .lock()
        .unwrap()
        .remove(&id)
        .map(|_| ())
        .ok_or_else(|| not_found("Runner"))
}
