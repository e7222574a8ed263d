//! Kubernetes resource watchers.
//!
//! Each managed kind gets its own `kube_runtime::Controller` driving the
//! generic reconcile pass. The controller handles reconnection and
//! requeueing; failed passes are retried with per-object Fibonacci backoff.

use crate::error::ControllerError;
use crate::managed::reconciler::{reconcile, Context, ManagedKind};
use futures::StreamExt;
use kube::{Api, ResourceExt};
use kube_runtime::controller::{Action, Config as RuntimeConfig};
use kube_runtime::{watcher, Controller};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Requeue delay for a failed reconcile of `obj`
fn error_policy<K: ManagedKind>(obj: Arc<K>, error: &ControllerError, ctx: Arc<Context>) -> Action {
    let delay = ctx.backoffs.next(&obj.name_any());
    error!(
        "Reconciliation error for {} {} ({}): {}; retrying in {:?}",
        obj.kind_name(),
        obj.name_any(),
        error.reason(),
        error,
        delay
    );
    Action::requeue(delay)
}

/// Watch every object of kind `K` and reconcile it until the stream ends
pub async fn watch_resource<K: ManagedKind>(ctx: Arc<Context>, kind: &'static str) -> Result<(), ControllerError> {
    info!("Starting {} watcher", kind);
    let api: Api<K> = Api::all(ctx.client.clone());

    let runtime_config = RuntimeConfig::default()
        .debounce(ctx.config.debounce)
        .concurrency(ctx.config.max_concurrent_reconciles);

    Controller::new(api, watcher::Config::default())
        .with_config(runtime_config)
        .shutdown_on_signal()
        .run(reconcile::<K>, error_policy::<K>, ctx)
        .for_each(|res| async move {
            match res {
                Ok((obj, _)) => debug!("Reconciled {} {}", kind, obj.name),
                Err(e) => debug!("Controller event for {}: {}", kind, e),
            }
        })
        .await;

    info!("{} watcher stopped", kind);
    Ok(())
}
