//! Connection secret publication.
//!
//! Sensitive values GitLab hands out (deploy tokens, runner tokens, runners
//! registration tokens) are written to the Secret named by
//! `writeConnectionSecretToRef`, owned by the managed object so the Secret
//! is garbage collected with it.

use crate::config::ControllerConfig;
use crate::error::ControllerError;
use crate::managed::ConnectionDetails;
use crds::Managed;
use k8s_openapi::ByteString;
use k8s_openapi::api::core::v1::Secret;
use kube::api::{ObjectMeta, Patch, PatchParams};
use kube::{Api, Client, Resource, ResourceExt};
use std::collections::BTreeMap;
use tracing::{debug, info};

pub const CONNECTION_SECRET_TYPE: &str = "connection.crossplane.io/v1alpha1";

/// Merge `details` into the connection secret of `mg`
///
/// Keys already in the Secret are kept, so a token published once on
/// creation survives later publications of other keys.
pub async fn publish_connection_details<K>(
    client: &Client,
    mg: &K,
    details: &ConnectionDetails,
    config: &ControllerConfig,
) -> Result<(), ControllerError>
where
    K: Managed + Resource<DynamicType = ()>,
{
    if details.is_empty() {
        return Ok(());
    }
    let Some(target) = &mg.resource_spec().write_connection_secret_to_ref else {
        debug!(
            "{} {} has connection details but no writeConnectionSecretToRef",
            mg.kind_name(),
            mg.name_any()
        );
        return Ok(());
    };
    let namespace = target.namespace.as_deref().unwrap_or(config.secret_namespace());
    let api: Api<Secret> = Api::namespaced(client.clone(), namespace);

    let existing = api
        .get_opt(&target.name)
        .await?
        .and_then(|s| s.data)
        .unwrap_or_default();
    let secret = build_secret(mg, &target.name, namespace, existing, details);

    api.patch(
        &target.name,
        &PatchParams::apply(&config.controller_name).force(),
        &Patch::Apply(&secret),
    )
    .await?;
    info!(
        "Published {} connection detail(s) of {} {} to {}/{}",
        details.len(),
        mg.kind_name(),
        mg.name_any(),
        namespace,
        target.name
    );
    Ok(())
}

/// Desired connection secret: `existing` data overlaid with `details`
pub fn build_secret<K>(
    mg: &K,
    name: &str,
    namespace: &str,
    mut existing: BTreeMap<String, ByteString>,
    details: &ConnectionDetails,
) -> Secret
where
    K: Resource<DynamicType = ()>,
{
    for (key, value) in details {
        existing.insert(key.clone(), ByteString(value.as_bytes().to_vec()));
    }
    Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            owner_references: mg.controller_owner_ref(&()).map(|r| vec![r]),
            ..Default::default()
        },
        data: Some(existing),
        type_: Some(CONNECTION_SECRET_TYPE.to_string()),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_runner;

    #[test]
    fn test_build_secret_overlays_details_and_sets_owner() {
        let mut runner = create_test_runner("ci-runner");
        runner.metadata.uid = Some("7c1f".to_string());

        let mut existing = BTreeMap::new();
        existing.insert("token".to_string(), ByteString(b"old".to_vec()));
        existing.insert("other".to_string(), ByteString(b"kept".to_vec()));
        let mut details = ConnectionDetails::new();
        details.insert("token".to_string(), "glrt-1".to_string());

        let secret = build_secret(&runner, "runner-conn", "ci", existing, &details);

        let data = secret.data.unwrap();
        assert_eq!(data["token"].0, b"glrt-1".to_vec());
        assert_eq!(data["other"].0, b"kept".to_vec());
        assert_eq!(secret.metadata.namespace.as_deref(), Some("ci"));
        assert_eq!(secret.type_.as_deref(), Some(CONNECTION_SECRET_TYPE));

        let owners = secret.metadata.owner_references.unwrap();
        assert_eq!(owners[0].kind, "Runner");
        assert_eq!(owners[0].uid, "7c1f");
        assert_eq!(owners[0].controller, Some(true));
    }
}
