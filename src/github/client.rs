//! GitHub API client for listing pull request files.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::github::error::GitHubError;

/// Public GitHub REST endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Records requested per page.
pub const PER_PAGE: usize = 100;

/// GitHub stops listing pull request files after 3000 entries.
pub const MAX_PAGES: usize = 30;

const API_VERSION: &str = "2022-11-28";

/// A file changed by a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestFile {
    /// Repository-relative path.
    pub filename: String,
    /// Change status (added, modified, removed, renamed, ...).
    #[serde(default)]
    pub status: Option<String>,
}

/// GitHub client for pull request file listings.
pub struct GitHubClient {
    client: Client,
    base_url: String,
    token: String,
}

impl GitHubClient {
    /// Creates a client for the public GitHub API.
    pub fn new(token: String) -> Result<Self, GitHubError> {
        Self::with_base_url(DEFAULT_API_URL, token)
    }

    /// Creates a client for a custom API root (GitHub Enterprise, tests).
    pub fn with_base_url(base_url: &str, token: String) -> Result<Self, GitHubError> {
        let client = Client::builder()
            .user_agent(concat!("ci-gate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GitHubError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Lists every file changed by pull request `number`, following pagination.
    pub async fn list_pull_request_files(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<PullRequestFile>, GitHubError> {
        let mut files = Vec::new();

        for page in 1..=MAX_PAGES {
            let batch = self.fetch_page(owner, repo, number, page).await?;
            let count = batch.len();
            tracing::debug!("Page {page} of PR #{number} returned {count} files");
            files.extend(batch);

            if count < PER_PAGE {
                break;
            }
            if page == MAX_PAGES {
                tracing::warn!(
                    "PR #{number} lists more than {} files; GitHub truncates the rest",
                    MAX_PAGES * PER_PAGE
                );
            }
        }

        tracing::info!("PR #{number} in {owner}/{repo} changes {} files", files.len());
        Ok(files)
    }

    async fn fetch_page(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        page: usize,
    ) -> Result<Vec<PullRequestFile>, GitHubError> {
        let url = self.files_url(owner, repo, number, page)?;

        let response = self
            .client
            .get(url)
            .header("authorization", self.authorization())
            .header("accept", "application/vnd.github+json")
            .header("x-github-api-version", API_VERSION)
            .send()
            .await
            .map_err(|e| GitHubError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let rate_limited = status == StatusCode::TOO_MANY_REQUESTS
                || (status == StatusCode::FORBIDDEN
                    && response
                        .headers()
                        .get("x-ratelimit-remaining")
                        .is_some_and(|v| v.as_bytes() == b"0"));
            if rate_limited {
                return Err(GitHubError::RateLimited);
            }
            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                return Err(GitHubError::Unauthorized(status.as_u16()));
            }

            let body = response.text().await.unwrap_or_default();
            return Err(GitHubError::ApiRequestFailed {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| GitHubError::InvalidResponse(e.to_string()))
    }

    fn files_url(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        page: usize,
    ) -> Result<Url, GitHubError> {
        let mut url = Url::parse(&format!(
            "{}/repos/{owner}/{repo}/pulls/{number}/files",
            self.base_url
        ))
        .map_err(|e| GitHubError::InvalidUrl(e.to_string()))?;

        url.query_pairs_mut()
            .append_pair("per_page", &PER_PAGE.to_string())
            .append_pair("page", &page.to_string());
        Ok(url)
    }

    /// Sends pre-formatted `token ...`/`Bearer ...` values verbatim.
    fn authorization(&self) -> String {
        if self.token.starts_with("token ") || self.token.starts_with("Bearer ") {
            self.token.clone()
        } else {
            format!("Bearer {}", self.token)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn authorization_header_forms() {
        let client = GitHubClient::new("abc".to_string()).unwrap();
        assert_eq!(client.authorization(), "Bearer abc");

        let client = GitHubClient::new("token abc".to_string()).unwrap();
        assert_eq!(client.authorization(), "token abc");
    }

    #[test]
    fn files_url_carries_pagination() {
        let client = GitHubClient::with_base_url("https://ghe.example.com/api/v3/", "t".into())
            .unwrap();
        let url = client.files_url("octo", "provider", 42, 3).unwrap();
        assert_eq!(
            url.as_str(),
            "https://ghe.example.com/api/v3/repos/octo/provider/pulls/42/files?per_page=100&page=3"
        );
    }

    #[test]
    fn file_record_ignores_extra_fields() {
        let json = r#"{"sha":"x","filename":"internal/resources/user/main.go","status":"modified","additions":3}"#;
        let file: PullRequestFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.filename, "internal/resources/user/main.go");
        assert_eq!(file.status.as_deref(), Some("modified"));
    }
}
