//! PipelineSchedule adapter
//!
//! External name is the numeric schedule id. Schedule variables are a keyed
//! sub-collection: when `variables` is set the remote set is made to match it
//! exactly, when unset the remote variables are left alone.

use crate::error::ControllerError;
use crate::managed::compare::{equal_optional, equal_optional_enum, late_init, late_init_str};
use crate::managed::{
    downcast_mut, parse_id, require_id, ConnectionDetails, ExternalClient, ExternalCreation, ExternalObservation,
    ExternalUpdate, KindConnector,
};
use crate::provider_config::ProviderConfigResolver;
use async_trait::async_trait;
use crds::{
    Condition, Managed, PipelineSchedule, PipelineScheduleObservation, PipelineScheduleParameters,
    PipelineVariable, PipelineVariableObservation, VariableType,
};
use gitlab_client::{self as gitlab, is_not_found, GitLabClient, PipelineScheduleClient};
use std::sync::Arc;
use tracing::{debug, info};

pub fn connector(resolver: Arc<ProviderConfigResolver>) -> KindConnector<PipelineSchedule> {
    KindConnector::new(resolver, external)
}

fn external(client: GitLabClient) -> Box<dyn ExternalClient> {
    Box::new(PipelineScheduleExternal::new(client))
}

pub struct PipelineScheduleExternal<C> {
    client: C,
}

impl<C: PipelineScheduleClient> PipelineScheduleExternal<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

fn project_id(p: &PipelineScheduleParameters) -> Result<i64, ControllerError> {
    p.project_id.ok_or(ControllerError::MissingProjectId)
}

pub fn generate_observation(s: &gitlab::PipelineSchedule) -> PipelineScheduleObservation {
    PipelineScheduleObservation {
        id: s.id,
        description: s.description.clone(),
        git_ref: s.git_ref.clone(),
        cron: s.cron.clone(),
        cron_timezone: s.cron_timezone.clone(),
        active: s.active,
        next_run_at: s.next_run_at,
        created_at: s.created_at,
        updated_at: s.updated_at,
        owner_id: s.owner.as_ref().map(|o| o.id),
        variables: s
            .variables
            .iter()
            .map(|v| PipelineVariableObservation {
                key: v.key.clone(),
                variable_type: v.variable_type.clone(),
            })
            .collect(),
    }
}

pub fn generate_create_options(p: &PipelineScheduleParameters) -> gitlab::CreatePipelineScheduleOptions {
    gitlab::CreatePipelineScheduleOptions {
        description: p.description.clone(),
        git_ref: p.git_ref.clone(),
        cron: p.cron.clone(),
        cron_timezone: p.cron_timezone.clone(),
        active: p.active,
    }
}

pub fn generate_edit_options(p: &PipelineScheduleParameters) -> gitlab::EditPipelineScheduleOptions {
    gitlab::EditPipelineScheduleOptions {
        description: Some(p.description.clone()),
        git_ref: Some(p.git_ref.clone()),
        cron: Some(p.cron.clone()),
        cron_timezone: p.cron_timezone.clone(),
        active: p.active,
    }
}

fn variable_options(v: &PipelineVariable) -> gitlab::PipelineVariableOptions {
    gitlab::PipelineVariableOptions {
        key: v.key.clone(),
        value: v.value.clone(),
        variable_type: v.variable_type.map(|t| t.as_str().to_string()),
    }
}

fn variable_matches(desired: &PipelineVariable, remote: &gitlab::PipelineVariable) -> bool {
    desired.value == remote.value && equal_optional_enum::<VariableType>(&desired.variable_type, &remote.variable_type)
}

/// Same keys on both sides and every desired variable matches its remote twin
pub fn variables_up_to_date(desired: &Option<Vec<PipelineVariable>>, remote: &[gitlab::PipelineVariable]) -> bool {
    let Some(desired) = desired else {
        return true;
    };
    desired.len() == remote.len()
        && desired.iter().all(|d| {
            remote
                .iter()
                .find(|r| r.key == d.key)
                .is_some_and(|r| variable_matches(d, r))
        })
}

pub fn is_up_to_date(p: &PipelineScheduleParameters, s: &gitlab::PipelineSchedule) -> bool {
    p.description == s.description
        && p.git_ref == s.git_ref
        && p.cron == s.cron
        && equal_optional(&p.cron_timezone, &s.cron_timezone)
        && equal_optional(&p.active, &s.active)
        && variables_up_to_date(&p.variables, &s.variables)
}

pub fn late_initialize(p: &mut PipelineScheduleParameters, s: &gitlab::PipelineSchedule) -> bool {
    let mut changed = false;
    changed |= late_init_str(&mut p.cron_timezone, &s.cron_timezone);
    changed |= late_init(&mut p.active, Some(s.active));
    if p.variables.is_none() && !s.variables.is_empty() {
        p.variables = Some(
            s.variables
                .iter()
                .map(|v| PipelineVariable {
                    key: v.key.clone(),
                    value: v.value.clone(),
                    variable_type: VariableType::parse(&v.variable_type),
                })
                .collect(),
        );
        changed = true;
    }
    changed
}

impl<C: PipelineScheduleClient> PipelineScheduleExternal<C> {
    /// Create, edit and delete schedule variables until the remote set matches
    async fn reconcile_variables(
        &self,
        project_id: i64,
        schedule_id: i64,
        desired: &[PipelineVariable],
        remote: &[gitlab::PipelineVariable],
    ) -> Result<(), gitlab::GitLabError> {
        for d in desired {
            match remote.iter().find(|r| r.key == d.key) {
                None => {
                    self.client
                        .create_pipeline_schedule_variable(project_id, schedule_id, &variable_options(d))
                        .await?;
                }
                Some(r) if !variable_matches(d, r) => {
                    self.client
                        .edit_pipeline_schedule_variable(project_id, schedule_id, &variable_options(d))
                        .await?;
                }
                Some(_) => {}
            }
        }
        for r in remote.iter().filter(|r| !desired.iter().any(|d| d.key == r.key)) {
            debug!("Removing variable {} from pipeline schedule {}", r.key, schedule_id);
            match self
                .client
                .delete_pipeline_schedule_variable(project_id, schedule_id, &r.key)
                .await
            {
                Ok(()) => {}
                Err(e) if is_not_found(&e) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

#[async_trait]
impl<C: PipelineScheduleClient> ExternalClient for PipelineScheduleExternal<C> {
    async fn observe(&mut self, mg: &mut dyn Managed) -> Result<ExternalObservation, ControllerError> {
        let cr = downcast_mut::<PipelineSchedule>(mg)?;
        if cr.external_name().is_empty() {
            return Ok(ExternalObservation::absent());
        }
        let id = parse_id(cr.external_name())?;
        let project_id = project_id(&cr.spec.for_provider)?;

        let schedule = match self.client.get_pipeline_schedule(project_id, id).await {
            Ok(s) => s,
            Err(e) if is_not_found(&e) => return Ok(ExternalObservation::absent()),
            Err(e) => return Err(ControllerError::GetFailed(e)),
        };

        let late_initialized = late_initialize(&mut cr.spec.for_provider, &schedule);
        let up_to_date = is_up_to_date(&cr.spec.for_provider, &schedule);
        cr.status.get_or_insert_with(Default::default).at_provider = Some(generate_observation(&schedule));
        cr.set_condition(Condition::available());

        Ok(ExternalObservation {
            resource_exists: true,
            resource_up_to_date: up_to_date,
            resource_late_initialized: late_initialized,
            connection_details: ConnectionDetails::new(),
        })
    }

    async fn create(&mut self, mg: &mut dyn Managed) -> Result<ExternalCreation, ControllerError> {
        let cr = downcast_mut::<PipelineSchedule>(mg)?;
        let project_id = project_id(&cr.spec.for_provider)?;

        let schedule = self
            .client
            .create_pipeline_schedule(project_id, &generate_create_options(&cr.spec.for_provider))
            .await
            .map_err(ControllerError::CreateFailed)?;
        info!("Created pipeline schedule {} in project {}", schedule.id, project_id);
        cr.set_external_name(schedule.id.to_string());

        for v in cr.spec.for_provider.variables.iter().flatten() {
            self.client
                .create_pipeline_schedule_variable(project_id, schedule.id, &variable_options(v))
                .await
                .map_err(ControllerError::CreateFailed)?;
        }
        Ok(ExternalCreation::default())
    }

    async fn update(&mut self, mg: &mut dyn Managed) -> Result<ExternalUpdate, ControllerError> {
        let cr = downcast_mut::<PipelineSchedule>(mg)?;
        let id = require_id(&*cr)?;
        let project_id = project_id(&cr.spec.for_provider)?;
        let p = &cr.spec.for_provider;

        self.client
            .edit_pipeline_schedule(project_id, id, &generate_edit_options(p))
            .await
            .map_err(ControllerError::UpdateFailed)?;

        if let Some(desired) = &p.variables {
            // the edit response does not list variables
            let remote = self
                .client
                .get_pipeline_schedule(project_id, id)
                .await
                .map_err(ControllerError::UpdateFailed)?
                .variables;
            self.reconcile_variables(project_id, id, desired, &remote)
                .await
                .map_err(ControllerError::UpdateFailed)?;
        }
        Ok(ExternalUpdate::default())
    }

    async fn delete(&mut self, mg: &mut dyn Managed) -> Result<(), ControllerError> {
        let cr = downcast_mut::<PipelineSchedule>(mg)?;
        let id = require_id(&*cr)?;
        let project_id = project_id(&cr.spec.for_provider)?;

        match self.client.delete_pipeline_schedule(project_id, id).await {
            Ok(()) => Ok(()),
            Err(e) if is_not_found(&e) => Ok(()),
            Err(e) => Err(ControllerError::DeleteFailed(e)),
        }
    }
}
