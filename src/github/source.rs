//! Read access to branches and commits.
//!
//! [`BranchSource`] is the seam between the scanning pipeline and GitHub. The
//! pipeline only ever calls these two operations, each wrapped in the retry
//! layer by the caller, so tests substitute an in-memory source.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::types::{Author, Branch, CommitInfo, Sha};

use super::client::GitHubClient;
use super::error::GitHubApiError;

/// Lists branches and looks up commits in one repository.
pub trait BranchSource {
    /// Fetches one page (1-indexed) of non-protected branches.
    fn list_branches_page(
        &self,
        page: u32,
        per_page: u32,
    ) -> impl Future<Output = Result<Vec<Branch>, GitHubApiError>> + Send;

    /// Fetches the metadata of a single commit.
    fn get_commit(
        &self,
        sha: &Sha,
    ) -> impl Future<Output = Result<CommitInfo, GitHubApiError>> + Send;
}

// ─── REST Response Types ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct BranchResponse {
    name: String,
    commit: BranchCommitRef,
}

#[derive(Debug, Deserialize)]
struct BranchCommitRef {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
    sha: String,
    commit: GitCommit,
    /// The GitHub account linked to the commit author, if any.
    author: Option<AccountRef>,
}

#[derive(Debug, Deserialize)]
struct GitCommit {
    committer: Option<GitSignature>,
}

#[derive(Debug, Deserialize)]
struct GitSignature {
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AccountRef {
    login: Option<String>,
}

impl From<BranchResponse> for Branch {
    fn from(branch: BranchResponse) -> Self {
        Branch::new(branch.name, branch.commit.sha)
    }
}

impl From<CommitResponse> for CommitInfo {
    fn from(commit: CommitResponse) -> Self {
        let committed_at = commit
            .commit
            .committer
            .and_then(|c| c.date)
            .and_then(|date| parse_commit_date(&date));

        CommitInfo {
            sha: Sha::new(commit.sha),
            committed_at,
            author: Author::from_login(commit.author.and_then(|a| a.login)),
        }
    }
}

/// Parses an ISO-8601 committer date. Malformed dates are logged and dropped.
fn parse_commit_date(date: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(date) {
        Ok(parsed) => Some(parsed.with_timezone(&Utc)),
        Err(e) => {
            tracing::warn!(date, error = %e, "Ignoring malformed commit date");
            None
        }
    }
}

// ─── Octocrab Implementation ──────────────────────────────────────────────────

impl BranchSource for GitHubClient {
    async fn list_branches_page(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Branch>, GitHubApiError> {
        let path = format!(
            "/branches?protected=false&per_page={}&page={}",
            per_page, page
        );
        let branches: Vec<BranchResponse> = self.get_repo_json(&path).await?;
        Ok(branches.into_iter().map(Branch::from).collect())
    }

    async fn get_commit(&self, sha: &Sha) -> Result<CommitInfo, GitHubApiError> {
        let path = format!("/commits/{}", sha.as_str());
        let commit: CommitResponse = self.get_repo_json(&path).await?;
        Ok(commit.into())
    }
}
