//! Project-scoped adapters
//!
//! Handles: Project, DeployToken, AccessToken, Variable, PipelineSchedule, Runner

pub mod access_token;
#[cfg(test)]
mod access_token_test;
pub mod deploy_token;
#[cfg(test)]
mod deploy_token_test;
pub mod pipeline_schedule;
pub mod project;
#[cfg(test)]
mod project_test;
pub mod runner;
#[cfg(test)]
mod runner_test;
pub mod variable;
#[cfg(test)]
mod variable_test;
