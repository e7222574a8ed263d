//! Prints every CRD of the provider as a multi-document YAML stream.
//!
//! ```sh
//! cargo run -p crds --bin crdgen > deploy/crds.yaml
//! ```

use crds::{
    AccessToken, DeployToken, Group, GroupMember, LdapGroupLink, PipelineSchedule, Project,
    ProviderConfig, Runner, SamlGroupLink, Variable,
};
use kube::CustomResourceExt;

fn main() -> anyhow::Result<()> {
    let crds = [
        ProviderConfig::crd(),
        Group::crd(),
        GroupMember::crd(),
        SamlGroupLink::crd(),
        LdapGroupLink::crd(),
        Project::crd(),
        DeployToken::crd(),
        AccessToken::crd(),
        Variable::crd(),
        PipelineSchedule::crd(),
        Runner::crd(),
    ];

    for crd in crds {
        print!("---\n{}", serde_yaml::to_string(&crd)?);
    }
    Ok(())
}
