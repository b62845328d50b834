//! GitHub REST access.
//!
//! This module wraps octocrab for the two read-only calls the notifier needs:
//! listing non-protected branches and fetching a commit. Errors are categorized
//! for the retry layer in [`crate::retry`].

mod client;
mod error;
mod source;


pub use client::GitHubClient;
pub use error::{GitHubApiError, GitHubErrorKind};
pub use source::BranchSource;
