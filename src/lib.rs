//! Stale Branch Notifier - finds branches nobody has committed to in a while and
//! tells their authors on Slack.
//!
//! A run lists every non-protected branch, ages each branch's tip commit, groups
//! the stale ones by commit author and posts one digest per author to a webhook.

pub mod config;
pub mod digest;
pub mod github;
pub mod notify;
pub mod retry;
pub mod run;
pub mod scan;
pub mod types;

#[cfg(test)]
mod test_utils;

pub use config::{Args, Config, ConfigError};
pub use run::{RunError, RunSummary, run, scan_and_notify};
