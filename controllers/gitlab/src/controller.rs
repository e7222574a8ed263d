//! Main controller implementation.
//!
//! This module contains the `Controller` struct that starts one watcher per
//! managed kind plus the probe server, and fails as soon as any of them
//! stops.
//!
//! Managed kinds:
//! - groups: Group, GroupMember, SamlGroupLink, LdapGroupLink
//! - projects: Project, DeployToken, AccessToken, Variable, PipelineSchedule, Runner

use crate::config::ControllerConfig;
use crate::error::ControllerError;
use crate::managed::reconciler::{Context, ManagedKind};
use crate::managed::{Connector, KindConnector};
use crate::provider_config::ProviderConfigResolver;
use crate::reconciler::{groups, projects};
use crate::{probes, watcher};
use futures::future::select_all;
use kube::Client;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::task::JoinHandle;
use tracing::{error, info};

type WatcherHandle = (&'static str, JoinHandle<Result<(), ControllerError>>);

/// Main controller for GitLab managed resources.
pub struct Controller {
    config: Arc<ControllerConfig>,
    watchers: Vec<WatcherHandle>,
    ready: Arc<AtomicBool>,
}

impl Controller {
    /// Connects to Kubernetes and starts every kind's watcher.
    pub async fn new(config: ControllerConfig) -> Result<Self, ControllerError> {
        info!("Initializing GitLab Controller");

        let client = Client::try_default().await?;
        let config = Arc::new(config);
        let resolver = Arc::new(ProviderConfigResolver::new(client.clone()));

        let spawn = Spawner {
            client: &client,
            config: &config,
        };
        let watchers = vec![
            spawn.kind::<crds::Group>("Group", groups::group::connector(resolver.clone())),
            spawn.kind::<crds::GroupMember>("GroupMember", groups::group_member::connector(resolver.clone())),
            spawn.kind::<crds::SamlGroupLink>("SamlGroupLink", groups::saml_group_link::connector(resolver.clone())),
            spawn.kind::<crds::LdapGroupLink>("LdapGroupLink", groups::ldap_group_link::connector(resolver.clone())),
            spawn.kind::<crds::Project>("Project", projects::project::connector(resolver.clone())),
            spawn.kind::<crds::DeployToken>("DeployToken", projects::deploy_token::connector(resolver.clone())),
            spawn.kind::<crds::AccessToken>("AccessToken", projects::access_token::connector(resolver.clone())),
            spawn.kind::<crds::Variable>("Variable", projects::variable::connector(resolver.clone())),
            spawn.kind::<crds::PipelineSchedule>(
                "PipelineSchedule",
                projects::pipeline_schedule::connector(resolver.clone()),
            ),
            spawn.kind::<crds::Runner>("Runner", projects::runner::connector(resolver)),
        ];
        info!("Started {} watchers", watchers.len());

        Ok(Self {
            config,
            watchers,
            ready: Arc::new(AtomicBool::new(true)),
        })
    }

    /// Runs until a watcher or the probe server exits.
    pub async fn run(self) -> Result<(), ControllerError> {
        info!("GitLab Controller running");
        let (names, handles): (Vec<_>, Vec<_>) = self.watchers.into_iter().unzip();

        tokio::select! {
            (result, index, _) = select_all(handles) => {
                let kind = names[index];
                self.ready.store(false, Ordering::Relaxed);
                result
                    .map_err(|e| ControllerError::Watch(format!("{} watcher panicked: {}", kind, e)))?
                    .map_err(|e| ControllerError::Watch(format!("{} watcher error: {}", kind, e)))?;
                info!("{} watcher exited, shutting down", kind);
            }
            result = probes::serve(self.config.probe_addr, self.ready.clone()) => {
                error!("Probe server stopped");
                result?;
            }
        }
        Ok(())
    }
}

struct Spawner<'a> {
    client: &'a Client,
    config: &'a Arc<ControllerConfig>,
}

impl Spawner<'_> {
    fn kind<K: ManagedKind>(&self, name: &'static str, connector: KindConnector<K>) -> WatcherHandle {
        let connector: Box<dyn Connector> = Box::new(connector);
        let ctx = Arc::new(Context::new(self.client.clone(), self.config.clone(), connector));
        (name, tokio::spawn(watcher::watch_resource::<K>(ctx, name)))
    }
}
