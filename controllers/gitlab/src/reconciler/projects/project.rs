//! Project adapter
//!
//! External name is the numeric project id. Push rules are a Premium
//! sub-resource: GitLab answers 404 both when the feature is unavailable and
//! when nothing is configured, and an omitted `pushRules` means the project
//! should have none. Push rules are never late-initialized.

use crate::error::ControllerError;
use crate::managed::compare::*;
use crate::managed::{
    downcast_mut, is_already_marked_for_deletion, parse_id, require_id, ConnectionDetails, ExternalClient,
    ExternalCreation, ExternalObservation, ExternalUpdate, KindConnector,
};
use crate::provider_config::ProviderConfigResolver;
use async_trait::async_trait;
use crds::{
    Condition, Managed, Project, ProjectNamespaceObservation, ProjectObservation, ProjectParameters, PushRules,
    PushRulesObservation,
};
use gitlab_client::{self as gitlab, is_not_found, GitLabClient, ProjectClient};
use std::sync::Arc;
use tracing::{debug, info};

/// Connection detail key of the project runners registration token
pub const RUNNERS_TOKEN_KEY: &str = "runnersToken";

pub fn connector(resolver: Arc<ProviderConfigResolver>) -> KindConnector<Project> {
    KindConnector::new(resolver, external)
}

fn external(client: GitLabClient) -> Box<dyn ExternalClient> {
    Box::new(ProjectExternal::new(client))
}

pub struct ProjectExternal<C> {
    client: C,
    /// Project read by `observe` in this pass
    observed: Option<gitlab::Project>,
    /// Push rules read by `observe`; `Some(None)` when GitLab answered 404
    push_rules: Option<Option<gitlab::ProjectPushRules>>,
}

impl<C: ProjectClient> ProjectExternal<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            observed: None,
            push_rules: None,
        }
    }

    async fn fetch_push_rules(&self, id: i64) -> Result<Option<gitlab::ProjectPushRules>, ControllerError> {
        match self.client.get_project_push_rules(id).await {
            Ok(rules) => Ok(Some(rules)),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(ControllerError::GetFailed(e)),
        }
    }

    async fn reconcile_push_rules(&mut self, id: i64, desired: Option<&PushRules>) -> Result<(), ControllerError> {
        let remote = match self.push_rules.take() {
            Some(cached) => cached,
            None => self.fetch_push_rules(id).await?,
        };
        match (desired, remote) {
            (None, None) => {}
            (None, Some(_)) => {
                info!("Removing push rules of project {}", id);
                match self.client.delete_project_push_rule(id).await {
                    Ok(()) => {}
                    Err(e) if is_not_found(&e) => {}
                    Err(e) => return Err(ControllerError::UpdateFailed(e)),
                }
            }
            (Some(desired), None) => {
                info!("Adding push rules to project {}", id);
                self.client
                    .add_project_push_rule(id, &generate_push_rule_options(desired))
                    .await
                    .map_err(ControllerError::UpdateFailed)?;
            }
            (Some(desired), Some(remote)) => {
                if !push_rules_up_to_date(desired, &remote) {
                    debug!("Editing push rules of project {}", id);
                    self.client
                        .edit_project_push_rule(id, &generate_push_rule_options(desired))
                        .await
                        .map_err(ControllerError::UpdateFailed)?;
                }
            }
        }
        Ok(())
    }
}

pub fn generate_push_rules_observation(r: &gitlab::ProjectPushRules) -> PushRulesObservation {
    PushRulesObservation {
        id: r.id,
        commit_message_regex: r.commit_message_regex.clone(),
        commit_message_negative_regex: r.commit_message_negative_regex.clone(),
        branch_name_regex: r.branch_name_regex.clone(),
        deny_delete_tag: r.deny_delete_tag,
        member_check: r.member_check,
        prevent_secrets: r.prevent_secrets,
        author_email_regex: r.author_email_regex.clone(),
        file_name_regex: r.file_name_regex.clone(),
        max_file_size: r.max_file_size,
        commit_committer_check: r.commit_committer_check,
        reject_unsigned_commits: r.reject_unsigned_commits,
        created_at: r.created_at,
    }
}

pub fn generate_observation(p: &gitlab::Project, push_rules: Option<&gitlab::ProjectPushRules>) -> ProjectObservation {
    ProjectObservation {
        id: p.id,
        name: p.name.clone(),
        path: p.path.clone(),
        path_with_namespace: p.path_with_namespace.clone(),
        description: p.description.clone(),
        default_branch: p.default_branch.clone(),
        visibility: p.visibility.clone(),
        namespace: p.namespace.as_ref().map(|n| ProjectNamespaceObservation {
            id: n.id,
            name: n.name.clone(),
            path: n.path.clone(),
            kind: n.kind.clone(),
            full_path: n.full_path.clone(),
        }),
        web_url: p.web_url.clone(),
        http_url_to_repo: p.http_url_to_repo.clone(),
        ssh_url_to_repo: p.ssh_url_to_repo.clone(),
        archived: p.archived,
        topics: p.topics.clone(),
        created_at: p.created_at,
        last_activity_at: p.last_activity_at,
        marked_for_deletion_at: p.marked_for_deletion_at,
        push_rules: push_rules.map(generate_push_rules_observation),
    }
}

fn generate_settings(p: &ProjectParameters) -> gitlab::ProjectSettings {
    gitlab::ProjectSettings {
        topics: p.topics.clone(),
        issues_enabled: p.issues_enabled,
        merge_requests_enabled: p.merge_requests_enabled,
        wiki_enabled: p.wiki_enabled,
        jobs_enabled: p.jobs_enabled,
        snippets_enabled: p.snippets_enabled,
        container_registry_enabled: p.container_registry_enabled,
        lfs_enabled: p.lfs_enabled,
        request_access_enabled: p.request_access_enabled,
        shared_runners_enabled: p.shared_runners_enabled,
        only_allow_merge_if_pipeline_succeeds: p.only_allow_merge_if_pipeline_succeeds,
        only_allow_merge_if_all_discussions_are_resolved: p.only_allow_merge_if_all_discussions_are_resolved,
        merge_method: p.merge_method.map(|v| v.as_str().to_string()),
        squash_option: p.squash_option.map(|v| v.as_str().to_string()),
        remove_source_branch_after_merge: p.remove_source_branch_after_merge,
        printing_merge_request_link_enabled: p.printing_merge_request_link_enabled,
        ci_config_path: p.ci_config_path.clone(),
        build_timeout: p.build_timeout,
        auto_devops_enabled: p.auto_devops_enabled,
    }
}

pub fn generate_create_options(p: &ProjectParameters) -> gitlab::CreateProjectOptions {
    gitlab::CreateProjectOptions {
        name: p.name.clone(),
        path: p.path.clone(),
        namespace_id: p.namespace_id,
        description: p.description.clone(),
        default_branch: p.default_branch.clone(),
        visibility: p.visibility.map(|v| v.as_str().to_string()),
        initialize_with_readme: p.initialize_with_readme,
        settings: generate_settings(p),
    }
}

/// `namespaceId` and `initializeWithReadme` only apply on creation
pub fn generate_edit_options(p: &ProjectParameters) -> gitlab::EditProjectOptions {
    gitlab::EditProjectOptions {
        name: Some(p.name.clone()),
        path: p.path.clone(),
        description: p.description.clone(),
        default_branch: p.default_branch.clone(),
        visibility: p.visibility.map(|v| v.as_str().to_string()),
        settings: generate_settings(p),
    }
}

pub fn generate_push_rule_options(r: &PushRules) -> gitlab::PushRuleOptions {
    gitlab::PushRuleOptions {
        commit_message_regex: r.commit_message_regex.clone(),
        commit_message_negative_regex: r.commit_message_negative_regex.clone(),
        branch_name_regex: r.branch_name_regex.clone(),
        deny_delete_tag: r.deny_delete_tag,
        member_check: r.member_check,
        prevent_secrets: r.prevent_secrets,
        author_email_regex: r.author_email_regex.clone(),
        file_name_regex: r.file_name_regex.clone(),
        max_file_size: r.max_file_size,
        commit_committer_check: r.commit_committer_check,
        reject_unsigned_commits: r.reject_unsigned_commits,
    }
}

pub fn push_rules_up_to_date(d: &PushRules, r: &gitlab::ProjectPushRules) -> bool {
    equal_optional_str(&d.commit_message_regex, r.commit_message_regex.as_deref())
        && equal_optional_str(&d.commit_message_negative_regex, r.commit_message_negative_regex.as_deref())
        && equal_optional_str(&d.branch_name_regex, r.branch_name_regex.as_deref())
        && equal_optional(&d.deny_delete_tag, &r.deny_delete_tag)
        && equal_optional(&d.member_check, &r.member_check)
        && equal_optional(&d.prevent_secrets, &r.prevent_secrets)
        && equal_optional_str(&d.author_email_regex, r.author_email_regex.as_deref())
        && equal_optional_str(&d.file_name_regex, r.file_name_regex.as_deref())
        && equal_optional(&d.max_file_size, &r.max_file_size)
        && equal_optional(&d.commit_committer_check, &r.commit_committer_check)
        && equal_optional(&d.reject_unsigned_commits, &r.reject_unsigned_commits)
}

pub fn is_up_to_date(
    p: &ProjectParameters,
    g: &gitlab::Project,
    push_rules: Option<&gitlab::ProjectPushRules>,
) -> bool {
    if p.name != g.name {
        debug!("name changed: {} != {}", p.name, g.name);
        return false;
    }
    if !equal_optional(&p.path, &g.path) {
        debug!("path changed: {:?} != {}", p.path, g.path);
        return false;
    }
    if !equal_optional_str(&p.description, g.description.as_deref()) {
        debug!("description changed: {:?} != {:?}", p.description, g.description);
        return false;
    }
    if !equal_optional_str(&p.default_branch, g.default_branch.as_deref()) {
        debug!("defaultBranch changed");
        return false;
    }
    if !equal_optional_enum(&p.visibility, &g.visibility) {
        debug!("visibility changed: {:?} != {}", p.visibility, g.visibility);
        return false;
    }
    if !equal_set(&p.topics, &g.topics) {
        debug!("topics changed: {:?} != {:?}", p.topics, g.topics);
        return false;
    }
    let flags = [
        ("issuesEnabled", p.issues_enabled, g.issues_enabled),
        ("mergeRequestsEnabled", p.merge_requests_enabled, g.merge_requests_enabled),
        ("wikiEnabled", p.wiki_enabled, g.wiki_enabled),
        ("jobsEnabled", p.jobs_enabled, g.jobs_enabled),
        ("snippetsEnabled", p.snippets_enabled, g.snippets_enabled),
        ("containerRegistryEnabled", p.container_registry_enabled, g.container_registry_enabled),
        ("lfsEnabled", p.lfs_enabled, g.lfs_enabled),
        ("requestAccessEnabled", p.request_access_enabled, g.request_access_enabled),
        ("sharedRunnersEnabled", p.shared_runners_enabled, g.shared_runners_enabled),
        (
            "onlyAllowMergeIfPipelineSucceeds",
            p.only_allow_merge_if_pipeline_succeeds,
            g.only_allow_merge_if_pipeline_succeeds,
        ),
        (
            "onlyAllowMergeIfAllDiscussionsAreResolved",
            p.only_allow_merge_if_all_discussions_are_resolved,
            g.only_allow_merge_if_all_discussions_are_resolved,
        ),
        (
            "printingMergeRequestLinkEnabled",
            p.printing_merge_request_link_enabled,
            g.printing_merge_request_link_enabled,
        ),
    ];
    for (field, desired, remote) in flags {
        if !equal_optional(&desired, &remote) {
            debug!("{} changed", field);
            return false;
        }
    }
    if !equal_optional_enum(&p.merge_method, &g.merge_method) {
        debug!("mergeMethod changed: {:?} != {}", p.merge_method, g.merge_method);
        return false;
    }
    if !equal_optional_enum(&p.squash_option, &g.squash_option) {
        debug!("squashOption changed: {:?} != {}", p.squash_option, g.squash_option);
        return false;
    }
    if p.remove_source_branch_after_merge.is_some() && p.remove_source_branch_after_merge != g.remove_source_branch_after_merge
    {
        debug!("removeSourceBranchAfterMerge changed");
        return false;
    }
    if !equal_optional_str(&p.ci_config_path, g.ci_config_path.as_deref()) {
        debug!("ciConfigPath changed");
        return false;
    }
    if !equal_optional(&p.build_timeout, &g.build_timeout) {
        debug!("buildTimeout changed");
        return false;
    }
    if p.auto_devops_enabled.is_some() && p.auto_devops_enabled != g.auto_devops_enabled {
        debug!("autoDevopsEnabled changed");
        return false;
    }
    match (&p.push_rules, push_rules) {
        (None, None) => true,
        (None, Some(_)) => {
            debug!("pushRules present but not desired");
            false
        }
        (Some(_), None) => {
            debug!("pushRules desired but absent");
            false
        }
        (Some(desired), Some(remote)) => {
            let up_to_date = push_rules_up_to_date(desired, remote);
            if !up_to_date {
                debug!("pushRules changed");
            }
            up_to_date
        }
    }
}

/// Fill unset parameters from the remote project; push rules are left alone
pub fn late_initialize(p: &mut ProjectParameters, g: &gitlab::Project) -> bool {
    let mut changed = false;
    changed |= late_init_str(&mut p.path, &g.path);
    changed |= late_init(&mut p.namespace_id, g.namespace.as_ref().map(|n| n.id));
    changed |= late_init_str_opt(&mut p.description, g.description.as_deref());
    changed |= late_init_str_opt(&mut p.default_branch, g.default_branch.as_deref());
    changed |= late_init_enum(&mut p.visibility, &g.visibility);
    changed |= late_init_vec(&mut p.topics, &g.topics);
    changed |= late_init(&mut p.issues_enabled, Some(g.issues_enabled));
    changed |= late_init(&mut p.merge_requests_enabled, Some(g.merge_requests_enabled));
    changed |= late_init(&mut p.wiki_enabled, Some(g.wiki_enabled));
    changed |= late_init(&mut p.jobs_enabled, Some(g.jobs_enabled));
    changed |= late_init(&mut p.snippets_enabled, Some(g.snippets_enabled));
    changed |= late_init(&mut p.container_registry_enabled, Some(g.container_registry_enabled));
    changed |= late_init(&mut p.lfs_enabled, Some(g.lfs_enabled));
    changed |= late_init(&mut p.request_access_enabled, Some(g.request_access_enabled));
    changed |= late_init(&mut p.shared_runners_enabled, Some(g.shared_runners_enabled));
    changed |= late_init(
        &mut p.only_allow_merge_if_pipeline_succeeds,
        Some(g.only_allow_merge_if_pipeline_succeeds),
    );
    changed |= late_init(
        &mut p.only_allow_merge_if_all_discussions_are_resolved,
        Some(g.only_allow_merge_if_all_discussions_are_resolved),
    );
    changed |= late_init_enum(&mut p.merge_method, &g.merge_method);
    changed |= late_init_enum(&mut p.squash_option, &g.squash_option);
    changed |= late_init(&mut p.remove_source_branch_after_merge, g.remove_source_branch_after_merge);
    changed |= late_init(
        &mut p.printing_merge_request_link_enabled,
        Some(g.printing_merge_request_link_enabled),
    );
    changed |= late_init_str_opt(&mut p.ci_config_path, g.ci_config_path.as_deref());
    changed |= late_init_int(&mut p.build_timeout, g.build_timeout);
    changed |= late_init(&mut p.auto_devops_enabled, g.auto_devops_enabled);
    changed
}

fn connection_details(g: &gitlab::Project) -> ConnectionDetails {
    let mut details = ConnectionDetails::new();
    if let Some(token) = &g.runners_token {
        details.insert(RUNNERS_TOKEN_KEY.to_string(), token.clone());
    }
    details
}

#[async_trait]
impl<C: ProjectClient> ExternalClient for ProjectExternal<C> {
    async fn observe(&mut self, mg: &mut dyn Managed) -> Result<ExternalObservation, ControllerError> {
        let cr = downcast_mut::<Project>(mg)?;
        if cr.external_name().is_empty() {
            return Ok(ExternalObservation::absent());
        }
        let id = parse_id(cr.external_name())?;

        let project = match self.client.get_project(id).await {
            Ok(p) => p,
            Err(e) if is_not_found(&e) => return Ok(ExternalObservation::absent()),
            Err(e) => return Err(ControllerError::GetFailed(e)),
        };
        let details = connection_details(&project);

        if let Some(since) = project.marked_for_deletion_at {
            cr.status.get_or_insert_with(Default::default).at_provider = Some(generate_observation(&project, None));
            cr.set_condition(Condition::unavailable(format!("project is marked for deletion on {}", since)));
            let release = cr.spec.for_provider.remove_finalizer_on_pending_deletion == Some(true);
            self.observed = Some(project);
            if cr.is_being_deleted() && release {
                return Ok(ExternalObservation::absent());
            }
            return Ok(ExternalObservation {
                resource_exists: true,
                resource_up_to_date: true,
                resource_late_initialized: false,
                connection_details: details,
            });
        }

        let push_rules = self.fetch_push_rules(id).await?;
        let late_initialized = late_initialize(&mut cr.spec.for_provider, &project);
        let up_to_date = is_up_to_date(&cr.spec.for_provider, &project, push_rules.as_ref());
        cr.status.get_or_insert_with(Default::default).at_provider =
            Some(generate_observation(&project, push_rules.as_ref()));
        cr.set_condition(Condition::available());
        self.observed = Some(project);
        self.push_rules = Some(push_rules);

        Ok(ExternalObservation {
            resource_exists: true,
            resource_up_to_date: up_to_date,
            resource_late_initialized: late_initialized,
            connection_details: details,
        })
    }

    async fn create(&mut self, mg: &mut dyn Managed) -> Result<ExternalCreation, ControllerError> {
        let cr = downcast_mut::<Project>(mg)?;
        let project = self
            .client
            .create_project(&generate_create_options(&cr.spec.for_provider))
            .await
            .map_err(ControllerError::CreateFailed)?;
        info!("Created project {} ({})", project.path_with_namespace, project.id);
        cr.set_external_name(project.id.to_string());

        Ok(ExternalCreation {
            connection_details: connection_details(&project),
        })
    }

    async fn update(&mut self, mg: &mut dyn Managed) -> Result<ExternalUpdate, ControllerError> {
        let cr = downcast_mut::<Project>(mg)?;
        let id = require_id(&*cr)?;

        self.client
            .edit_project(id, &generate_edit_options(&cr.spec.for_provider))
            .await
            .map_err(ControllerError::UpdateFailed)?;
        self.reconcile_push_rules(id, cr.spec.for_provider.push_rules.as_ref())
            .await?;
        Ok(ExternalUpdate::default())
    }

    async fn delete(&mut self, mg: &mut dyn Managed) -> Result<(), ControllerError> {
        let cr = downcast_mut::<Project>(mg)?;
        let id = require_id(&*cr)?;

        match self.client.delete_project(id, &gitlab::DeleteProjectOptions::default()).await {
            Ok(()) => {}
            Err(e) if is_not_found(&e) => return Ok(()),
            Err(e) if is_already_marked_for_deletion(&e) => {}
            Err(e) => return Err(ControllerError::DeleteFailed(e)),
        }

        if cr.spec.for_provider.permanently_remove != Some(true) {
            return Ok(());
        }
        let full_path = self
            .observed
            .as_ref()
            .map(|p| p.path_with_namespace.clone())
            .or_else(|| {
                cr.status
                    .as_ref()?
                    .at_provider
                    .as_ref()
                    .map(|o| o.path_with_namespace.clone())
            })
            .filter(|path| !path.is_empty());
        let Some(full_path) = full_path else {
            return Ok(());
        };
        info!("Permanently removing project {} ({})", id, full_path);
        let opts = gitlab::DeleteProjectOptions {
            permanently_remove: Some(true),
            full_path: Some(full_path),
        };
        match self.client.delete_project(id, &opts).await {
            Ok(()) => Ok(()),
            Err(e) if is_not_found(&e) => Ok(()),
            Err(e) => Err(ControllerError::DeleteFailed(e)),
        }
    }
}
