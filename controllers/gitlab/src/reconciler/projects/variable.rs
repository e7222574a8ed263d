//! Variable adapter
//!
//! External name is the variable key. The environment scope selects among
//! variables sharing a key and is passed on every call.

use crate::error::ControllerError;
use crate::managed::compare::{equal_optional, equal_optional_enum, equal_optional_str, late_init, late_init_enum, late_init_str, late_init_str_opt};
use crate::managed::{
    downcast_mut, require_name, ConnectionDetails, ExternalClient, ExternalCreation, ExternalObservation,
    ExternalUpdate, KindConnector,
};
use crate::provider_config::ProviderConfigResolver;
use async_trait::async_trait;
use crds::{Condition, Managed, Variable, VariableObservation, VariableParameters, VariableType};
use gitlab_client::{self as gitlab, is_not_found, GitLabClient, VariableClient};
use std::sync::Arc;
use tracing::info;

pub fn connector(resolver: Arc<ProviderConfigResolver>) -> KindConnector<Variable> {
    KindConnector::new(resolver, external)
}

fn external(client: GitLabClient) -> Box<dyn ExternalClient> {
    Box::new(VariableExternal::new(client))
}

pub struct VariableExternal<C> {
    client: C,
}

impl<C: VariableClient> VariableExternal<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

fn project_id(p: &VariableParameters) -> Result<i64, ControllerError> {
    p.project_id.ok_or(ControllerError::MissingProjectId)
}

/// The value is deliberately left out of the status
pub fn generate_observation(v: &gitlab::ProjectVariable) -> VariableObservation {
    VariableObservation {
        key: v.key.clone(),
        variable_type: v.variable_type.clone(),
        protected: v.protected,
        masked: v.masked,
        raw: v.raw,
        environment_scope: v.environment_scope.clone(),
        description: v.description.clone(),
    }
}

pub fn generate_create_options(p: &VariableParameters) -> gitlab::CreateProjectVariableOptions {
    gitlab::CreateProjectVariableOptions {
        key: p.key.clone(),
        value: p.value.clone(),
        variable_type: p.variable_type.map(|t| t.as_str().to_string()),
        protected: p.protected,
        masked: p.masked,
        raw: p.raw,
        environment_scope: p.environment_scope.clone(),
        description: p.description.clone(),
    }
}

pub fn generate_update_options(p: &VariableParameters) -> gitlab::UpdateProjectVariableOptions {
    gitlab::UpdateProjectVariableOptions {
        value: Some(p.value.clone()),
        variable_type: p.variable_type.map(|t| t.as_str().to_string()),
        protected: p.protected,
        masked: p.masked,
        raw: p.raw,
        description: p.description.clone(),
    }
}

pub fn is_up_to_date(p: &VariableParameters, v: &gitlab::ProjectVariable) -> bool {
    p.value == v.value
        && equal_optional_enum::<VariableType>(&p.variable_type, &v.variable_type)
        && equal_optional(&p.protected, &v.protected)
        && equal_optional(&p.masked, &v.masked)
        && equal_optional(&p.raw, &v.raw)
        && equal_optional_str(&p.description, v.description.as_deref())
}

pub fn late_initialize(p: &mut VariableParameters, v: &gitlab::ProjectVariable) -> bool {
    let mut changed = false;
    changed |= late_init_enum(&mut p.variable_type, &v.variable_type);
    changed |= late_init(&mut p.protected, Some(v.protected));
    changed |= late_init(&mut p.masked, Some(v.masked));
    changed |= late_init(&mut p.raw, Some(v.raw));
    changed |= late_init_str(&mut p.environment_scope, &v.environment_scope);
    changed |= late_init_str_opt(&mut p.description, v.description.as_deref());
    changed
}

#[async_trait]
impl<C: VariableClient> ExternalClient for VariableExternal<C> {
    async fn observe(&mut self, mg: &mut dyn Managed) -> Result<ExternalObservation, ControllerError> {
        let cr = downcast_mut::<Variable>(mg)?;
        if cr.external_name().is_empty() {
            return Ok(ExternalObservation::absent());
        }
        let project_id = project_id(&cr.spec.for_provider)?;
        let key = cr.external_name().to_string();

        let variable = match self
            .client
            .get_variable(project_id, &key, cr.spec.for_provider.environment_scope.as_deref())
            .await
        {
            Ok(v) => v,
            Err(e) if is_not_found(&e) => return Ok(ExternalObservation::absent()),
            Err(e) => return Err(ControllerError::GetFailed(e)),
        };

        let late_initialized = late_initialize(&mut cr.spec.for_provider, &variable);
        let up_to_date = is_up_to_date(&cr.spec.for_provider, &variable);
        cr.status.get_or_insert_with(Default::default).at_provider = Some(generate_observation(&variable));
        cr.set_condition(Condition::available());

        Ok(ExternalObservation {
            resource_exists: true,
            resource_up_to_date: up_to_date,
            resource_late_initialized: late_initialized,
            connection_details: ConnectionDetails::new(),
        })
    }

    async fn create(&mut self, mg: &mut dyn Managed) -> Result<ExternalCreation, ControllerError> {
        let cr = downcast_mut::<Variable>(mg)?;
        let project_id = project_id(&cr.spec.for_provider)?;

        let variable = self
            .client
            .create_variable(project_id, &generate_create_options(&cr.spec.for_provider))
            .await
            .map_err(ControllerError::CreateFailed)?;
        info!("Created variable {} in project {}", variable.key, project_id);
        cr.set_external_name(variable.key);
        Ok(ExternalCreation::default())
    }

    async fn update(&mut self, mg: &mut dyn Managed) -> Result<ExternalUpdate, ControllerError> {
        let cr = downcast_mut::<Variable>(mg)?;
        let key = require_name(&*cr)?;
        let project_id = project_id(&cr.spec.for_provider)?;
        let p = &cr.spec.for_provider;

        self.client
            .update_variable(project_id, &key, p.environment_scope.as_deref(), &generate_update_options(p))
            .await
            .map_err(ControllerError::UpdateFailed)?;
        Ok(ExternalUpdate::default())
    }

    async fn delete(&mut self, mg: &mut dyn Managed) -> Result<(), ControllerError> {
        let cr = downcast_mut::<Variable>(mg)?;
        let key = require_name(&*cr)?;
        let project_id = project_id(&cr.spec.for_provider)?;

        match self
            .client
            .remove_variable(project_id, &key, cr.spec.for_provider.environment_scope.as_deref())
            .await
        {
            Ok(()) => Ok(()),
            Err(e) if is_not_found(&e) => Ok(()),
            Err(e) => Err(ControllerError::DeleteFailed(e)),
        }
    }
}
