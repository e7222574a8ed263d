//! GitLab provider CRD Definitions
//!
//! Kubernetes Custom Resource Definitions for the GitLab managed resources
//! and the ProviderConfig that holds their credentials.

pub mod common;
pub mod groups;
pub mod projects;
pub mod provider_config;

pub use common::*;
pub use groups::*;
pub use projects::*;
pub use provider_config::*;
