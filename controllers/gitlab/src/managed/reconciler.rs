//! Generic managed-resource reconcile loop.
//!
//! One pass: ensure the finalizer, connect, observe, then act on the single
//! [`Decision`] derived from the observation. Everything an adapter changed
//! on the object (external name, late-initialized parameters, status) is
//! written back before the pass ends.

use crate::backoff::BackoffRegistry;
use crate::config::ControllerConfig;
use crate::connection::publish_connection_details;
use crate::error::ControllerError;
use crate::managed::{Connector, ExternalObservation};
use crds::{
    Condition, DeletionPolicy, EXTERNAL_NAME_ANNOTATION, Managed, ManagementAction, ResourceSpec,
};
use kube::api::{Patch, PatchParams};
use kube::{Api, Client, Resource, ResourceExt};
use kube_runtime::controller::Action;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Requeue after create/delete so the next observe confirms the outcome
const SHORT_REQUEUE: Duration = Duration::from_secs(10);

const EXTERNAL_NAME_PATCH_ATTEMPTS: u32 = 3;

/// Bounds every managed CRD type satisfies
pub trait ManagedKind:
    Managed + Resource<DynamicType = ()> + Clone + Debug + Serialize + DeserializeOwned
{
}

impl<K> ManagedKind for K where
    K: Managed + Resource<DynamicType = ()> + Clone + Debug + Serialize + DeserializeOwned
{
}

/// Shared state of one kind's controller
pub struct Context {
    pub client: Client,
    pub config: Arc<ControllerConfig>,
    pub connector: Box<dyn Connector>,
    pub backoffs: BackoffRegistry,
}

impl Context {
    pub fn new(client: Client, config: Arc<ControllerConfig>, connector: Box<dyn Connector>) -> Self {
        let backoffs = BackoffRegistry::new(config.backoff_min_secs, config.backoff_max_secs);
        Self {
            client,
            config,
            connector,
            backoffs,
        }
    }
}

/// What a reconcile pass does after observing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Create,
    Update,
    Delete,
    /// Nothing left to clean up remotely; let the object go
    ReleaseFinalizer,
    /// Record the observation only
    Observe,
}

/// The remote object is left behind when the managed object is deleted
pub fn orphans(spec: &ResourceSpec) -> bool {
    spec.deletion_policy == DeletionPolicy::Orphan || !spec.allows(ManagementAction::Delete)
}

pub fn decide(observation: &ExternalObservation, spec: &ResourceSpec, deleting: bool) -> Decision {
    if deleting {
        if orphans(spec) || !observation.resource_exists {
            return Decision::ReleaseFinalizer;
        }
        return Decision::Delete;
    }
    if !observation.resource_exists {
        if spec.allows(ManagementAction::Create) {
            return Decision::Create;
        }
        return Decision::Observe;
    }
    if !observation.resource_up_to_date && spec.allows(ManagementAction::Update) {
        return Decision::Update;
    }
    Decision::Observe
}

/// Reconcile one managed object of kind `K`
pub async fn reconcile<K: ManagedKind>(obj: Arc<K>, ctx: Arc<Context>) -> Result<Action, ControllerError> {
    let api: Api<K> = Api::all(ctx.client.clone());
    let name = obj.name_any();
    let finalizer = ctx.config.finalizer();
    let mut mg = (*obj).clone();

    let deleting = mg.is_being_deleted();
    let has_finalizer = mg.finalizers().iter().any(|f| *f == finalizer);

    if deleting && !has_finalizer {
        ctx.backoffs.reset(&name);
        return Ok(Action::await_change());
    }
    if deleting && orphans(mg.resource_spec()) {
        info!("Orphaning GitLab object of {} {}", mg.kind_name(), name);
        remove_finalizer(&api, &mg, &finalizer).await?;
        ctx.backoffs.reset(&name);
        return Ok(Action::await_change());
    }
    if !has_finalizer {
        mg = add_finalizer(&api, &mg, &finalizer).await?;
    }

    let stored_status = obj.status_value()?;
    match run(&mut mg, &api, &ctx, &stored_status).await {
        Ok(action) => {
            ctx.backoffs.reset(&name);
            Ok(action)
        }
        Err(e) => {
            mg.set_condition(Condition::reconcile_error(e.reason(), e.to_string()));
            if let Err(patch_err) = patch_status(&api, &mg, &stored_status).await {
                warn!("Failed to record error on {} {}: {}", mg.kind_name(), name, patch_err);
            }
            Err(e)
        }
    }
}

async fn run<K: ManagedKind>(
    mg: &mut K,
    api: &Api<K>,
    ctx: &Context,
    stored_status: &Value,
) -> Result<Action, ControllerError> {
    let name = mg.name_any();
    let kind = mg.kind_name();

    let mut external = ctx.connector.connect(&*mg).await?;
    let observation = external.observe(mg).await?;
    let decision = decide(&observation, mg.resource_spec(), mg.is_being_deleted());
    debug!(
        "{} {}: exists={} up_to_date={} late_initialized={} -> {:?}",
        kind,
        name,
        observation.resource_exists,
        observation.resource_up_to_date,
        observation.resource_late_initialized,
        decision
    );

    match decision {
        Decision::ReleaseFinalizer => {
            info!("GitLab object of {} {} is gone, releasing finalizer", kind, name);
            remove_finalizer(api, mg, &ctx.config.finalizer()).await?;
            Ok(Action::await_change())
        }
        Decision::Delete => {
            mg.set_condition(Condition::deleting());
            external.delete(mg).await?;
            info!("Deleted GitLab object of {} {}", kind, name);
            mg.set_condition(Condition::reconcile_success());
            patch_status(api, mg, stored_status).await?;
            Ok(Action::requeue(SHORT_REQUEUE))
        }
        Decision::Create => {
            mg.set_condition(Condition::creating());
            let before = mg.external_name().to_string();
            let created = external.create(mg).await;
            // an identifier obtained before a later step failed must survive
            if mg.external_name() != before {
                persist_external_name(api, mg).await?;
            }
            let created = created?;
            info!("Created GitLab object of {} {} ({})", kind, name, mg.external_name());
            publish_connection_details(&ctx.client, mg, &created.connection_details, &ctx.config).await?;
            mg.set_condition(Condition::reconcile_success());
            patch_status(api, mg, stored_status).await?;
            Ok(Action::requeue(SHORT_REQUEUE))
        }
        Decision::Update | Decision::Observe => {
            if observation.resource_late_initialized && mg.resource_spec().allows(ManagementAction::LateInitialize) {
                debug!("Persisting late-initialized parameters of {} {}", kind, name);
                patch_for_provider(api, mg).await?;
            }
            publish_connection_details(&ctx.client, mg, &observation.connection_details, &ctx.config).await?;

            if decision == Decision::Update {
                let updated = external.update(mg).await?;
                info!("Updated GitLab object of {} {}", kind, name);
                publish_connection_details(&ctx.client, mg, &updated.connection_details, &ctx.config).await?;
            } else if !observation.resource_exists {
                mg.set_condition(Condition::unavailable(
                    "GitLab object does not exist and creation is not permitted",
                ));
            }

            mg.set_condition(Condition::reconcile_success());
            patch_status(api, mg, stored_status).await?;
            Ok(Action::requeue(ctx.config.poll_interval))
        }
    }
}

async fn add_finalizer<K: ManagedKind>(api: &Api<K>, mg: &K, finalizer: &str) -> Result<K, ControllerError> {
    let mut finalizers = mg.finalizers().to_vec();
    finalizers.push(finalizer.to_string());
    let patch = json!({
        "metadata": {
            "finalizers": finalizers,
            "resourceVersion": mg.resource_version(),
        }
    });
    api.patch(&mg.name_any(), &PatchParams::default(), &Patch::Merge(&patch))
        .await
        .map_err(ControllerError::Finalizer)
}

async fn remove_finalizer<K: ManagedKind>(api: &Api<K>, mg: &K, finalizer: &str) -> Result<(), ControllerError> {
    let finalizers: Vec<&String> = mg.finalizers().iter().filter(|f| *f != finalizer).collect();
    let patch = json!({
        "metadata": {
            "finalizers": finalizers,
            "resourceVersion": mg.resource_version(),
        }
    });
    api.patch(&mg.name_any(), &PatchParams::default(), &Patch::Merge(&patch))
        .await
        .map_err(ControllerError::Finalizer)?;
    Ok(())
}

async fn persist_external_name<K: ManagedKind>(api: &Api<K>, mg: &K) -> Result<(), ControllerError> {
    let patch = json!({
        "metadata": {
            "annotations": { EXTERNAL_NAME_ANNOTATION: mg.external_name() }
        }
    });
    let mut attempt = 1;
    loop {
        match api.patch(&mg.name_any(), &PatchParams::default(), &Patch::Merge(&patch)).await {
            Ok(_) => return Ok(()),
            Err(e) if attempt < EXTERNAL_NAME_PATCH_ATTEMPTS => {
                warn!(
                    "Failed to persist external name {} of {} {} (attempt {}): {}",
                    mg.external_name(),
                    mg.kind_name(),
                    mg.name_any(),
                    attempt,
                    e
                );
                attempt += 1;
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

async fn patch_for_provider<K: ManagedKind>(api: &Api<K>, mg: &K) -> Result<(), ControllerError> {
    let patch = json!({ "spec": { "forProvider": mg.for_provider_value()? } });
    api.patch(&mg.name_any(), &PatchParams::default(), &Patch::Merge(&patch))
        .await?;
    Ok(())
}

/// Merge patch turning `stored` into `desired`
///
/// Keys present in `stored` but absent from `desired` are sent as `null` so
/// the API server drops them; arrays and scalars are replaced wholesale.
pub fn status_merge_patch(stored: &Value, desired: &Value) -> Value {
    match (stored, desired) {
        (Value::Object(old), Value::Object(new)) => {
            let mut patch = Map::new();
            for (key, value) in new {
                let entry = match old.get(key) {
                    Some(previous) => status_merge_patch(previous, value),
                    None => value.clone(),
                };
                patch.insert(key.clone(), entry);
            }
            for key in old.keys().filter(|k| !new.contains_key(*k)) {
                patch.insert(key.clone(), Value::Null);
            }
            Value::Object(patch)
        }
        _ => desired.clone(),
    }
}

async fn patch_status<K: ManagedKind>(api: &Api<K>, mg: &K, stored: &Value) -> Result<(), ControllerError> {
    let patch = json!({ "status": status_merge_patch(stored, &mg.status_value()?) });
    api.patch_status(&mg.name_any(), &PatchParams::default(), &Patch::Merge(&patch))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crds::ManagementAction::*;

    fn spec(policies: Vec<ManagementAction>, deletion_policy: DeletionPolicy) -> ResourceSpec {
        ResourceSpec {
            management_policies: policies,
            deletion_policy,
            ..Default::default()
        }
    }

    fn observed(exists: bool, up_to_date: bool) -> ExternalObservation {
        ExternalObservation {
            resource_exists: exists,
            resource_up_to_date: up_to_date,
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_object_is_created() {
        let spec = ResourceSpec::default();
        assert_eq!(decide(&observed(false, false), &spec, false), Decision::Create);
    }

    #[test]
    fn test_drift_is_updated_and_match_is_observed() {
        let spec = ResourceSpec::default();
        assert_eq!(decide(&observed(true, false), &spec, false), Decision::Update);
        assert_eq!(decide(&observed(true, true), &spec, false), Decision::Observe);
    }

    #[test]
    fn test_observe_only_never_mutates() {
        let spec = spec(vec![Observe], DeletionPolicy::Delete);
        assert_eq!(decide(&observed(false, false), &spec, false), Decision::Observe);
        assert_eq!(decide(&observed(true, false), &spec, false), Decision::Observe);
        assert_eq!(decide(&observed(true, true), &spec, true), Decision::ReleaseFinalizer);
    }

    #[test]
    fn test_deletion() {
        let spec = ResourceSpec::default();
        assert_eq!(decide(&observed(true, true), &spec, true), Decision::Delete);
        assert_eq!(decide(&observed(false, false), &spec, true), Decision::ReleaseFinalizer);
    }

    #[test]
    fn test_orphan_policy_skips_remote_delete() {
        let orphan = spec(vec![All], DeletionPolicy::Orphan);
        assert!(orphans(&orphan));
        assert_eq!(decide(&observed(true, true), &orphan, true), Decision::ReleaseFinalizer);
        assert!(!orphans(&ResourceSpec::default()));
    }

    #[test]
    fn test_status_patch_clears_fields_that_went_away() {
        let stored = json!({
            "atProvider": { "id": 17, "pushRules": { "id": 1 }, "topics": ["a", "b"] },
            "conditions": [{ "type": "Ready" }],
        });
        let desired = json!({
            "atProvider": { "id": 17, "topics": ["a"] },
            "conditions": [{ "type": "Ready" }, { "type": "Synced" }],
        });

        let patch = status_merge_patch(&stored, &desired);

        assert_eq!(patch["atProvider"]["pushRules"], Value::Null);
        assert_eq!(patch["atProvider"]["topics"], json!(["a"]));
        assert_eq!(patch["conditions"], desired["conditions"]);
        assert_eq!(status_merge_patch(&Value::Null, &desired), desired);
    }

    #[test]
    fn test_create_without_update_policy() {
        let spec = spec(vec![Observe, Create, Delete], DeletionPolicy::Delete);
        assert_eq!(decide(&observed(false, false), &spec, false), Decision::Create);
        assert_eq!(decide(&observed(true, false), &spec, false), Decision::Observe);
    }
}
