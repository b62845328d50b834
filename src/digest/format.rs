//! Rendering an author's stale branches as a chat message.

use crate::types::{Author, RepoId, StaleBranch};

use super::mention::MentionMap;

/// Days per year in durations. Calendar approximation, not leap-aware.
const DAYS_PER_YEAR: u64 = 365;

/// Days per month in durations.
const DAYS_PER_MONTH: u64 = 30;

/// Line closing every digest.
pub const DIGEST_SEPARATOR: &str = "--------------------";

/// Everything a digest needs beyond the author's own branches.
#[derive(Debug, Clone)]
pub struct DigestContext<'a> {
    pub repo: &'a RepoId,
    pub threshold_days: u32,
    pub mentions: &'a MentionMap,
}

/// Formats whole days as `N years N months N days`, omitting zero parts.
///
/// Fractional days are truncated. Years are 365 days and months 30 days.
pub fn format_duration(days: f64) -> String {
    let total = if days.is_finite() && days > 0.0 {
        days.floor() as u64
    } else {
        0
    };

    let years = total / DAYS_PER_YEAR;
    let months = (total % DAYS_PER_YEAR) / DAYS_PER_MONTH;
    let rest = total % DAYS_PER_YEAR % DAYS_PER_MONTH;

    let parts: Vec<String> = [(years, "year"), (months, "month"), (rest, "day")]
        .into_iter()
        .filter(|(n, _)| *n > 0)
        .map(|(n, unit)| pluralize(n, unit))
        .collect();

    if parts.is_empty() {
        "0 days".to_string()
    } else {
        parts.join(" ")
    }
}

fn pluralize(n: u64, unit: &str) -> String {
    if n == 1 {
        format!("{} {}", n, unit)
    } else {
        format!("{} {}s", n, unit)
    }
}

/// Formats the message sent to one author.
///
/// ```text
/// @carol, you have 2 stale branches in octocat/hello-world (no commits for 30+ days):
/// • `feature/old` - 1 year 1 month 5 days
/// • `fix/typo` - 1 month
/// --------------------
/// ```
pub fn format_digest(
    author: &Author,
    branches: &[StaleBranch],
    context: &DigestContext<'_>,
) -> String {
    let noun = if branches.len() == 1 { "branch" } else { "branches" };
    let mut text = format!(
        "{}, you have {} stale {} in {} (no commits for {}+ days):\n",
        context.mentions.mention(author),
        branches.len(),
        noun,
        context.repo,
        context.threshold_days
    );

    for branch in branches {
        text.push_str(&format!(
            "• `{}` - {}\n",
            branch.name,
            format_duration(branch.days)
        ));
    }

    text.push_str(DIGEST_SEPARATOR);
    text
}
