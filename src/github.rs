//! GitHub REST API access for pull request metadata.

pub mod client;
pub mod error;

pub use client::{GitHubClient, PullRequestFile};
pub use error::GitHubError;
