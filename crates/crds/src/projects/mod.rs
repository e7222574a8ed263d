//! Project-scoped kinds (`projects.gitlab.crossplane.io`)

pub mod access_token;
pub mod deploy_token;
pub mod pipeline_schedule;
pub mod project;
pub mod runner;
pub mod variable;

pub use access_token::*;
pub use deploy_token::*;
pub use pipeline_schedule::*;
pub use project::*;
pub use runner::*;
pub use variable::*;
