//! GitHub-specific error handling.

use thiserror::Error;

use crate::error::ErrorKind;

/// GitHub API specific errors.
#[derive(Error, Debug)]
pub enum GitHubError {
    /// The token was rejected.
    #[error("GitHub rejected the access token (HTTP {0}). Check GITHUB_TOKEN permissions")]
    Unauthorized(u16),

    /// Rate limit exceeded for the GitHub API.
    #[error("GitHub API rate limit exceeded. Please try again later")]
    RateLimited,

    /// GitHub API request failed with a non-success status.
    #[error("GitHub API request failed: HTTP {status}: {body}")]
    ApiRequestFailed {
        /// HTTP status code.
        status: u16,
        /// Response body, as returned.
        body: String,
    },

    /// Network connectivity error.
    #[error("Network error: {0}")]
    Network(String),

    /// The configured API root does not form a valid URL.
    #[error("Invalid GitHub API URL: {0}")]
    InvalidUrl(String),

    /// Invalid response format from the GitHub API.
    #[error("Invalid response format from GitHub API: {0}")]
    InvalidResponse(String),
}

impl GitHubError {
    /// Returns the error category.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Transport
    }
}
