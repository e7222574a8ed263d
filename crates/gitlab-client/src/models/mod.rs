//! GitLab API models
//!
//! These models match the GitLab REST v4 entities and request bodies.
//! Request option structs skip unset fields so that "not specified" never
//! reaches the server as `null`.

pub mod groups;
pub mod projects;

pub use groups::*;
pub use projects::*;
