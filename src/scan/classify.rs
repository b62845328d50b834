//! Staleness classification.
//!
//! Each branch's tip commit is fetched and aged against a fixed `now`. Branches
//! are processed in batches of [`CLASSIFY_BATCH_SIZE`]: the branches of a batch
//! are fetched concurrently on the current task, and batches run one after
//! another, which caps the number of in-flight requests.

use chrono::{DateTime, Utc};
use futures::future::join_all;

use crate::github::{BranchSource, GitHubApiError};
use crate::retry::{RetryConfig, retry_with_backoff};
use crate::types::{Branch, ClassifiedBranch, CommitAge};

/// Number of branches classified concurrently.
pub const CLASSIFY_BATCH_SIZE: usize = 10;

/// The outcome of classifying a set of branches.
#[derive(Debug, Clone, Default)]
pub struct Classification {
    /// Successfully classified branches, in input order.
    pub branches: Vec<ClassifiedBranch>,

    /// Names of branches whose commit lookup failed.
    pub failed: Vec<String>,
}

impl Classification {
    /// Number of classified branches whose commit date was unavailable.
    pub fn unknown_age_count(&self) -> usize {
        self.branches
            .iter()
            .filter(|b| b.age == CommitAge::Unknown)
            .count()
    }
}

/// Fetches and ages the tip commit of one branch.
pub async fn classify_branch<S: BranchSource>(
    source: &S,
    branch: &Branch,
    now: DateTime<Utc>,
    retry: RetryConfig,
) -> Result<ClassifiedBranch, GitHubApiError> {
    let commit = retry_with_backoff(retry, || source.get_commit(&branch.tip))
        .await
        .into_result()?;

    let age = CommitAge::between(commit.committed_at, now);
    if age == CommitAge::Unknown {
        tracing::debug!(
            branch = %branch.name,
            sha = %commit.sha.short(),
            "Commit date unavailable"
        );
    }

    Ok(ClassifiedBranch {
        name: branch.name.clone(),
        author: commit.author,
        age,
    })
}

/// Classifies every branch, skipping (and logging) those whose lookup fails.
pub async fn classify_branches<S: BranchSource>(
    source: &S,
    branches: &[Branch],
    now: DateTime<Utc>,
    retry: RetryConfig,
) -> Classification {
    let mut classification = Classification::default();

    for (batch_index, batch) in branches.chunks(CLASSIFY_BATCH_SIZE).enumerate() {
        tracing::debug!(batch = batch_index, size = batch.len(), "Classifying batch");

        let results = join_all(
            batch
                .iter()
                .map(|branch| classify_branch(source, branch, now, retry)),
        )
        .await;

        for (branch, result) in batch.iter().zip(results) {
            match result {
                Ok(classified) => classification.branches.push(classified),
                Err(e) => {
                    tracing::warn!(
                        branch = %branch.name,
                        error = %e,
                        "Could not classify branch; skipping"
                    );
                    classification.failed.push(branch.name.clone());
                }
            }
        }
    }

    classification
}
