//! Branch enumeration.
//!
//! Pages through every non-protected branch, 100 at a time, until a short page
//! comes back. Failure after retries is not fatal: whatever was collected so far
//! is returned and flagged as incomplete.

use std::collections::HashSet;

use crate::github::BranchSource;
use crate::retry::{RetryConfig, retry_with_backoff};
use crate::types::Branch;

/// Page size for the branch listing (GitHub's maximum).
pub const BRANCHES_PER_PAGE: u32 = 100;

/// The outcome of enumerating a repository's branches.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchListing {
    /// Branches in page order, unique by name.
    pub branches: Vec<Branch>,

    /// Number of pages fetched successfully.
    pub pages: u32,

    /// False when a page failed after all retries and the listing stopped early.
    pub complete: bool,
}

/// Lists every non-protected branch reachable through `source`.
pub async fn enumerate_branches<S: BranchSource>(
    source: &S,
    retry: RetryConfig,
) -> BranchListing {
    let mut branches = Vec::new();
    let mut seen = HashSet::new();
    let mut page = 1u32;

    loop {
        let result = retry_with_backoff(retry, || {
            source.list_branches_page(page, BRANCHES_PER_PAGE)
        })
        .await
        .into_result();

        let items = match result {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(
                    page,
                    branches_found = branches.len(),
                    error = %e,
                    "Branch listing failed; continuing with a partial list"
                );
                return BranchListing {
                    branches,
                    pages: page - 1,
                    complete: false,
                };
            }
        };

        let is_last_page = items.len() < BRANCHES_PER_PAGE as usize;
        tracing::debug!(page, count = items.len(), "Fetched branch page");

        for branch in items {
            // Pages can shift if branches are created mid-listing.
            if seen.insert(branch.name.clone()) {
                branches.push(branch);
            } else {
                tracing::debug!(branch = %branch.name, "Skipping duplicate branch");
            }
        }

        if is_last_page {
            return BranchListing {
                branches,
                pages: page,
                complete: true,
            };
        }
        page += 1;
    }
}
