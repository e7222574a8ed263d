//! GitLab REST API Client
//!
//! A Rust client library for the subset of the GitLab REST v4 API needed to
//! manage groups, projects and their satellites declaratively.
//!
//! # Example
//!
//! ```no_run
//! use gitlab_client::{Auth, GitLabClient, GroupClient, CreateGroupOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GitLabClient::new(
//!     "https://gitlab.example.com",
//!     Auth::PrivateToken("glpat-xxxxxxxx".to_string()),
//! )?;
//!
//! let group = client
//!     .create_group(&CreateGroupOptions {
//!         name: "platform".to_string(),
//!         path: "platform".to_string(),
//!         ..Default::default()
//!     })
//!     .await?;
//! println!("created group {}", group.id);
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Groups**: groups, members, sharing, SAML and LDAP links
//! - **Projects**: projects, push rules, deploy and access tokens, CI/CD variables,
//!   pipeline schedules, runners
//! - **Auth**: private tokens, OAuth bearer tokens, CI job tokens, password grant
//! - **Mocking**: `MockGitLabClient` behind the `test-util` feature

pub mod client;
pub mod common;
pub mod error;
pub mod models;
#[path = "trait.rs"]
pub mod gitlab_trait;
#[cfg(feature = "test-util")]
pub mod mock;

pub use client::GitLabClient;
pub use common::{Auth, HttpClient};
pub use error::{is_not_found, GitLabError};
pub use models::*;
pub use gitlab_trait::*;
#[cfg(feature = "test-util")]
pub use mock::MockGitLabClient;
