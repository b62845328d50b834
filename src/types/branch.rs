//! Branch, commit and staleness types.
//!
//! These are read-only snapshots of what GitHub reported during a single run.
//! Nothing here is persisted.

use chrono::{DateTime, Utc};
use std::fmt;

use super::ids::Sha;

/// Milliseconds in a day; ages are computed from millisecond deltas.
pub const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// A non-protected branch as listed by GitHub.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Branch {
    /// Branch name, unique within the repository.
    pub name: String,

    /// The branch's tip commit.
    pub tip: Sha,
}

impl Branch {
    pub fn new(name: impl Into<String>, tip: impl Into<Sha>) -> Self {
        Branch {
            name: name.into(),
            tip: tip.into(),
        }
    }
}

/// Who wrote a branch's latest commit.
///
/// The derived ordering puts every known login (alphabetically) before
/// `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Author {
    /// A GitHub account login.
    Login(String),

    /// The commit is not linked to a GitHub account.
    Unknown,
}

impl Author {
    /// Placeholder shown for commits without a GitHub account.
    pub const UNKNOWN_LABEL: &'static str = "UNKNOWN";

    /// Builds an author from an optional login, treating blank logins as unknown.
    pub fn from_login(login: Option<String>) -> Self {
        match login {
            Some(login) if !login.trim().is_empty() => Author::Login(login),
            _ => Author::Unknown,
        }
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Author::Login(login) => write!(f, "{}", login),
            Author::Unknown => write!(f, "{}", Self::UNKNOWN_LABEL),
        }
    }
}

/// Metadata of a branch's tip commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub sha: Sha,

    /// Committer timestamp. `None` when GitHub omitted it or it did not parse.
    pub committed_at: Option<DateTime<Utc>>,

    pub author: Author,
}

/// Time elapsed since a branch's last commit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CommitAge {
    /// Fractional days since the committer timestamp. Never negative.
    Days(f64),

    /// The commit date was missing or malformed; never considered stale.
    Unknown,
}

impl CommitAge {
    /// Computes the age of a commit relative to `now`.
    ///
    /// Timestamps in the future (clock skew) clamp to zero days.
    pub fn between(committed_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        match committed_at {
            Some(at) => {
                let elapsed_ms = (now - at).num_milliseconds() as f64;
                CommitAge::Days((elapsed_ms / MILLIS_PER_DAY).max(0.0))
            }
            None => CommitAge::Unknown,
        }
    }

    /// Returns the age in days, if known.
    pub fn days(&self) -> Option<f64> {
        match self {
            CommitAge::Days(days) => Some(*days),
            CommitAge::Unknown => None,
        }
    }

    /// True when the age is known and at least `threshold_days`.
    pub fn is_stale(&self, threshold_days: u32) -> bool {
        self.days()
            .is_some_and(|days| days >= f64::from(threshold_days))
    }
}

/// The outcome of classifying one branch.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedBranch {
    pub name: String,
    pub author: Author,
    pub age: CommitAge,
}

/// A branch that has gone stale, as listed in an author's digest.
#[derive(Debug, Clone, PartialEq)]
pub struct StaleBranch {
    pub name: String,

    /// Fractional days since the last commit; at least the configured threshold.
    pub days: f64,
}
