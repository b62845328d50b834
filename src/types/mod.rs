//! Core domain types for the stale branch notifier.

pub mod branch;
pub mod ids;

pub use branch::{
    Author, Branch, ClassifiedBranch, CommitAge, CommitInfo, MILLIS_PER_DAY, StaleBranch,
};
pub use ids::{InvalidRepoId, RepoId, Sha};
