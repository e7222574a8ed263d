//! GitLab Controller
//!
//! Reconciles GitLab resources declared as cluster-scoped Kubernetes
//! managed resources:
//! - Group, GroupMember, SamlGroupLink, LdapGroupLink
//! - Project, DeployToken, AccessToken, Variable, PipelineSchedule, Runner
//!
//! Credentials come from the ProviderConfig each resource references.

mod backoff;
mod config;
mod connection;
mod controller;
mod error;
mod managed;
mod probes;
mod provider_config;
mod reconciler;
mod watcher;

#[cfg(test)]
mod test_utils;

use crate::config::ControllerConfig;
use crate::error::ControllerError;
use controller::Controller;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ControllerError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // kube and reqwest both link rustls; pin one process-wide provider
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| ControllerError::InvalidConfig("failed to install rustls crypto provider".to_string()))?;

    info!("Starting GitLab Controller");

    let config = ControllerConfig::from_env()?;

    info!("Configuration:");
    info!("  Secret namespace: {}", config.secret_namespace());
    info!("  Poll interval: {:?}", config.poll_interval);
    info!("  Max concurrent reconciles: {}", config.max_concurrent_reconciles);
    info!("  Debounce: {:?}", config.debounce);
    info!("  Probe address: {}", config.probe_addr);
    info!("  Controller name: {}", config.controller_name);

    let controller = Controller::new(config).await?;
    controller.run().await?;

    Ok(())
}
