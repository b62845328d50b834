//! Finding stale branches: enumerate, classify, group by author.

pub mod aggregate;
pub mod classify;
pub mod enumerate;

pub use aggregate::AuthorDigest;
pub use classify::{CLASSIFY_BATCH_SIZE, Classification, classify_branch, classify_branches};
pub use enumerate::{BRANCHES_PER_PAGE, BranchListing, enumerate_branches};
