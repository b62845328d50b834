//! Run configuration.
//!
//! Command-line flags and their environment fallbacks are parsed once by clap
//! into [`Args`], then validated into an immutable [`Config`] that is passed
//! by reference to the rest of the run. Nothing else reads the environment.

use std::fmt;

use clap::Parser;
use reqwest::Url;
use thiserror::Error;

use crate::digest::{MentionMap, MentionParseError};
use crate::retry::RetryConfig;
use crate::types::{InvalidRepoId, RepoId};

/// Raw command-line and environment inputs.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "stale-branch-notifier",
    version,
    about = "Finds stale branches in a GitHub repository and notifies their authors on Slack"
)]
pub struct Args {
    /// Branches whose last commit is at least this many days old are stale
    #[arg(long, env = "INPUT_DAYS_BEFORE_STALE")]
    pub days_before_stale: u32,

    /// Slack incoming-webhook URL (required unless --dry-run)
    #[arg(long, env = "INPUT_SLACK_WEBHOOK_URL", hide_env_values = true)]
    pub slack_webhook_url: Option<String>,

    /// Repository to scan, as owner/repo or a github.com URL
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repository: String,

    /// GitHub API root, for GitHub Enterprise
    #[arg(long, env = "GITHUB_API_URL")]
    pub github_api_url: Option<String>,

    /// GitHub token (read from the environment)
    #[arg(long, env = "GITHUB_TOKEN", hide = true, hide_env_values = true)]
    pub github_token: Option<String>,

    /// Comma- or newline-separated gitLogin:mentionHandle pairs
    #[arg(long, env = "SLACK_MENTIONS")]
    pub mentions: Option<String>,

    /// Log digests instead of posting them
    #[arg(long)]
    pub dry_run: bool,
}

/// Where digests go.
#[derive(Clone, PartialEq, Eq)]
pub enum Delivery {
    Slack { webhook_url: String },
    DryRun,
}

impl fmt::Debug for Delivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delivery::Slack { .. } => f.write_str("Slack"),
            Delivery::DryRun => f.write_str("DryRun"),
        }
    }
}

/// Fatal configuration problems, raised before any network call.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GITHUB_TOKEN is not set")]
    MissingToken,

    #[error("slack-webhook-url is required unless --dry-run is given")]
    MissingWebhookUrl,

    #[error("slack-webhook-url is not a valid http(s) URL")]
    InvalidWebhookUrl,

    #[error(transparent)]
    InvalidRepository(#[from] InvalidRepoId),

    #[error("invalid SLACK_MENTIONS: {0}")]
    InvalidMention(#[from] MentionParseError),
}

/// Validated configuration for one run.
#[derive(Clone)]
pub struct Config {
    pub repo: RepoId,
    pub days_before_stale: u32,
    pub delivery: Delivery,
    pub github_token: String,
    pub github_api_url: Option<String>,
    pub mentions: MentionMap,
    pub retry: RetryConfig,
}

impl Config {
    /// Validates raw inputs. The token is checked first so a misconfigured
    /// workflow fails with the most actionable message.
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        let github_token = args
            .github_token
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::MissingToken)?;

        let repo: RepoId = args.repository.parse()?;

        let delivery = if args.dry_run {
            Delivery::DryRun
        } else {
            let url = args
                .slack_webhook_url
                .filter(|u| !u.trim().is_empty())
                .ok_or(ConfigError::MissingWebhookUrl)?;
            validate_webhook_url(&url)?;
            Delivery::Slack { webhook_url: url }
        };

        let mentions = match args.mentions.as_deref() {
            Some(raw) => MentionMap::parse(raw)?,
            None => MentionMap::new(),
        };

        let github_api_url = args.github_api_url.filter(|u| !u.trim().is_empty());

        Ok(Config {
            repo,
            days_before_stale: args.days_before_stale,
            delivery,
            github_token,
            github_api_url,
            mentions,
            retry: RetryConfig::DEFAULT,
        })
    }
}

fn validate_webhook_url(url: &str) -> Result<(), ConfigError> {
    match Url::parse(url.trim()) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        _ => Err(ConfigError::InvalidWebhookUrl),
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("repo", &self.repo)
            .field("days_before_stale", &self.days_before_stale)
            .field("delivery", &self.delivery)
            .field("github_api_url", &self.github_api_url)
            .field("mentions", &self.mentions.len())
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}
