//! Runner adapter
//!
//! External name is the numeric runner id. Runners are created through
//! `POST /user/runners`, which returns the authentication token once; that
//! is why Create refuses to run without a connection secret.

use crate::error::ControllerError;
use crate::managed::compare::{
    equal_optional, equal_optional_enum, equal_optional_str, equal_set, late_init, late_init_enum, late_init_str,
    late_init_str_opt, late_init_vec,
};
use crate::managed::{
    downcast_mut, parse_id, require_id, ConnectionDetails, ExternalClient, ExternalCreation, ExternalObservation,
    ExternalUpdate, KindConnector,
};
use crate::provider_config::ProviderConfigResolver;
use async_trait::async_trait;
use crds::{Condition, Managed, Runner, RunnerObservation, RunnerParameters, RunnerType};
use gitlab_client::{self as gitlab, is_not_found, GitLabClient, RunnerClient};
use std::sync::Arc;
use tracing::info;

/// Connection detail key of the runner authentication token
pub const TOKEN_KEY: &str = "token";

pub fn connector(resolver: Arc<ProviderConfigResolver>) -> KindConnector<Runner> {
    KindConnector::new(resolver, external)
}

fn external(client: GitLabClient) -> Box<dyn ExternalClient> {
    Box::new(RunnerExternal::new(client))
}

pub struct RunnerExternal<C> {
    client: C,
}

impl<C: RunnerClient> RunnerExternal<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

pub fn generate_observation(r: &gitlab::Runner) -> RunnerObservation {
    RunnerObservation {
        id: r.id,
        description: r.description.clone(),
        runner_type: r.runner_type.clone(),
        paused: r.paused,
        is_shared: r.is_shared,
        online: r.online,
        status: r.status.clone(),
        tag_list: r.tag_list.clone(),
        run_untagged: r.run_untagged,
        locked: r.locked,
        access_level: r.access_level.clone(),
        maximum_timeout: r.maximum_timeout,
        maintenance_note: r.maintenance_note.clone(),
        contacted_at: r.contacted_at,
    }
}

pub fn generate_settings(p: &RunnerParameters) -> gitlab::RunnerSettings {
    gitlab::RunnerSettings {
        description: p.description.clone(),
        paused: p.paused,
        locked: p.locked,
        run_untagged: p.run_untagged,
        tag_list: p.tag_list.clone(),
        access_level: p.access_level.map(|a| a.as_str().to_string()),
        maximum_timeout: p.maximum_timeout,
        maintenance_note: p.maintenance_note.clone(),
    }
}

/// Scope ids are checked against the runner type before anything is sent
pub fn generate_create_options(p: &RunnerParameters) -> Result<gitlab::CreateUserRunnerOptions, ControllerError> {
    let (group_id, project_id) = match p.runner_type {
        RunnerType::InstanceType => (None, None),
        RunnerType::GroupType => (Some(p.group_id.ok_or(ControllerError::MissingGroupId)?), None),
        RunnerType::ProjectType => (None, Some(p.project_id.ok_or(ControllerError::MissingProjectId)?)),
    };
    Ok(gitlab::CreateUserRunnerOptions {
        runner_type: p.runner_type.as_str().to_string(),
        group_id,
        project_id,
        settings: generate_settings(p),
    })
}

pub fn is_up_to_date(p: &RunnerParameters, r: &gitlab::Runner) -> bool {
    equal_optional_str(&p.description, Some(&r.description))
        && equal_optional(&p.paused, &r.paused)
        && equal_optional(&p.locked, &r.locked)
        && equal_optional(&p.run_untagged, &r.run_untagged)
        && equal_set(&p.tag_list, &r.tag_list)
        && equal_optional_enum(&p.access_level, &r.access_level)
        && p.maximum_timeout.is_none_or(|t| Some(t) == r.maximum_timeout)
        && equal_optional_str(&p.maintenance_note, r.maintenance_note.as_deref())
}

pub fn late_initialize(p: &mut RunnerParameters, r: &gitlab::Runner) -> bool {
    let mut changed = false;
    changed |= late_init_str(&mut p.description, &r.description);
    changed |= late_init(&mut p.paused, Some(r.paused));
    changed |= late_init(&mut p.locked, Some(r.locked));
    changed |= late_init(&mut p.run_untagged, Some(r.run_untagged));
    changed |= late_init_vec(&mut p.tag_list, &r.tag_list);
    changed |= late_init_enum(&mut p.access_level, &r.access_level);
    changed |= late_init(&mut p.maximum_timeout, r.maximum_timeout);
    changed |= late_init_str_opt(&mut p.maintenance_note, r.maintenance_note.as_deref());
    changed
}

#[async_trait]
impl<C: RunnerClient> ExternalClient for RunnerExternal<C> {
    async fn observe(&mut self, mg: &mut dyn Managed) -> Result<ExternalObservation, ControllerError> {
        let cr = downcast_mut::<Runner>(mg)?;
        if cr.external_name().is_empty() {
            return Ok(ExternalObservation::absent());
        }
        let id = parse_id(cr.external_name())?;

        let runner = match self.client.get_runner(id).await {
            Ok(r) => r,
            Err(e) if is_not_found(&e) => return Ok(ExternalObservation::absent()),
            Err(e) => return Err(ControllerError::GetFailed(e)),
        };

        let late_initialized = late_initialize(&mut cr.spec.for_provider, &runner);
        let up_to_date = is_up_to_date(&cr.spec.for_provider, &runner);
        cr.status.get_or_insert_with(Default::default).at_provider = Some(generate_observation(&runner));
        cr.set_condition(Condition::available());

        Ok(ExternalObservation {
            resource_exists: true,
            resource_up_to_date: up_to_date,
            resource_late_initialized: late_initialized,
            connection_details: ConnectionDetails::new(),
        })
    }

    async fn create(&mut self, mg: &mut dyn Managed) -> Result<ExternalCreation, ControllerError> {
        let cr = downcast_mut::<Runner>(mg)?;
        if cr.spec.resource.write_connection_secret_to_ref.is_none() {
            return Err(ControllerError::MissingConnectionSecret);
        }
        let opts = generate_create_options(&cr.spec.for_provider)?;

        let created = self
            .client
            .create_user_runner(&opts)
            .await
            .map_err(ControllerError::CreateFailed)?;
        info!("Created {} runner {}", opts.runner_type, created.id);
        cr.set_external_name(created.id.to_string());

        let mut connection_details = ConnectionDetails::new();
        connection_details.insert(TOKEN_KEY.to_string(), created.token);
        Ok(ExternalCreation { connection_details })
    }

    async fn update(&mut self, mg: &mut dyn Managed) -> Result<ExternalUpdate, ControllerError> {
        let cr = downcast_mut::<Runner>(mg)?;
        let id = require_id(&*cr)?;

        self.client
            .update_runner(
                id,
                &gitlab::UpdateRunnerOptions {
                    settings: generate_settings(&cr.spec.for_provider),
                },
            )
            .await
            .map_err(ControllerError::UpdateFailed)?;
        Ok(ExternalUpdate::default())
    }

    async fn delete(&mut self, mg: &mut dyn Managed) -> Result<(), ControllerError> {
        let cr = downcast_mut::<Runner>(mg)?;
        let id = require_id(&*cr)?;

        match self.client.delete_runner(id).await {
            Ok(()) => Ok(()),
            Err(e) if is_not_found(&e) => Ok(()),
            Err(e) => Err(ControllerError::DeleteFailed(e)),
        }
    }
}
