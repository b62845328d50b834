//! Octocrab client wrapper scoped to a specific repository.
//!
//! Requests go through octocrab's raw `_get` so the caller sees the status
//! code and the `retry-after` header before the body is decoded. The typed
//! octocrab helpers hide both.

use chrono::Utc;
use octocrab::Octocrab;
use octocrab::service::middleware::retry::RetryConfig as OctocrabRetry;
use serde::de::DeserializeOwned;

use crate::retry::parse_retry_after;
use crate::types::RepoId;

use super::error::GitHubApiError;

/// A GitHub API client scoped to a single repository.
#[derive(Clone)]
pub struct GitHubClient {
    client: Octocrab,
    repo: RepoId,
}

impl GitHubClient {
    /// Creates a new client scoped to the given repository.
    pub fn new(client: Octocrab, repo: RepoId) -> Self {
        Self { client, repo }
    }

    /// Creates a client authenticated with a personal or workflow token.
    ///
    /// `api_url` overrides the API root (GitHub Enterprise, test servers).
    /// Octocrab's own retry layer is disabled; every retry goes through
    /// [`crate::retry::retry_with_backoff`].
    pub fn from_token(
        token: impl Into<String>,
        repo: RepoId,
        api_url: Option<&str>,
    ) -> Result<Self, octocrab::Error> {
        let mut builder = Octocrab::builder()
            .personal_token(token.into())
            .add_retry_config(OctocrabRetry::None);
        if let Some(url) = api_url {
            builder = builder.base_uri(url)?;
        }
        Ok(Self::new(builder.build()?, repo))
    }

    /// Returns the repository owner.
    pub fn owner(&self) -> &str {
        &self.repo.owner
    }

    /// Returns the repository name.
    pub fn repo_name(&self) -> &str {
        &self.repo.repo
    }

    /// Issues a single GET against `/repos/{owner}/{repo}{path}` and decodes the JSON body.
    ///
    /// Non-2xx responses become categorized [`GitHubApiError`]s; no retry happens here.
    pub async fn get_repo_json<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, GitHubApiError> {
        let url = format!("/repos/{}/{}{}", self.owner(), self.repo_name(), path);

        let response = self
            .client
            ._get(url.as_str())
            .await
            .map_err(GitHubApiError::from_octocrab)?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| parse_retry_after(v, Utc::now()));

        let body = self
            .client
            .body_to_string(response)
            .await
            .map_err(GitHubApiError::from_octocrab)?;

        if !status.is_success() {
            return Err(GitHubApiError::from_response(
                status.as_u16(),
                retry_after,
                &body,
            ));
        }

        serde_json::from_str(&body).map_err(|e| {
            GitHubApiError::permanent_without_source(format!(
                "Unexpected response body from {}: {}",
                url, e
            ))
        })
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("repo", &self.repo)
            .finish_non_exhaustive()
    }
}
