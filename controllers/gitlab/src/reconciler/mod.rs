//! Per-kind adapters between managed resources and the GitLab API

pub mod groups;
pub mod projects;
