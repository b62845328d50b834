//! One end-to-end run: enumerate, classify, group, format, notify.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::config::{Config, Delivery};
use crate::digest::{DigestContext, format_digest};
use crate::github::{BranchSource, GitHubClient};
use crate::notify::{LogNotifier, Notifier, NotifyError, SlackWebhook};
use crate::scan::{AuthorDigest, classify_branches, enumerate_branches};
use crate::types::Author;

/// What a run saw and did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub branches_scanned: usize,
    /// False when branch listing stopped early after exhausting retries.
    pub listing_complete: bool,
    pub classification_failures: usize,
    pub unknown_age: usize,
    pub stale_branches: usize,
    pub authors_notified: usize,
    pub notification_failures: usize,
}

/// A digest that could not be delivered.
#[derive(Debug)]
pub struct DeliveryFailure {
    pub author: Author,
    pub error: NotifyError,
}

/// Reasons a run fails.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to create GitHub client: {0}")]
    GitHubClient(#[from] octocrab::Error),

    #[error("failed to create webhook client: {0}")]
    WebhookClient(#[source] NotifyError),

    #[error("{}", describe_failures(.attempted, .failures))]
    Notification {
        attempted: usize,
        failures: Vec<DeliveryFailure>,
        summary: RunSummary,
    },
}

fn describe_failures(attempted: &usize, failures: &[DeliveryFailure]) -> String {
    match failures.first() {
        Some(first) => format!(
            "{} of {} notifications failed (first: {}: {})",
            failures.len(),
            attempted,
            first.author,
            first.error
        ),
        None => format!("0 of {} notifications failed", attempted),
    }
}

/// Runs the notifier against GitHub using the clients described by `config`.
pub async fn run(config: &Config) -> Result<RunSummary, RunError> {
    let source = GitHubClient::from_token(
        config.github_token.clone(),
        config.repo.clone(),
        config.github_api_url.as_deref(),
    )?;

    match &config.delivery {
        Delivery::Slack { webhook_url } => {
            let notifier = SlackWebhook::new(webhook_url.clone(), config.retry)
                .map_err(RunError::WebhookClient)?;
            scan_and_notify(config, &source, &notifier, Utc::now()).await
        }
        Delivery::DryRun => scan_and_notify(config, &source, &LogNotifier, Utc::now()).await,
    }
}

/// The whole pipeline over injected collaborators, with ages measured at `now`.
///
/// Every author with stale branches gets one message, in author order. A
/// failed delivery does not stop the others; failures are reported together
/// once every author has been attempted.
pub async fn scan_and_notify<S, N>(
    config: &Config,
    source: &S,
    notifier: &N,
    now: DateTime<Utc>,
) -> Result<RunSummary, RunError>
where
    S: BranchSource,
    N: Notifier,
{
    tracing::info!(
        repo = %config.repo,
        days_before_stale = config.days_before_stale,
        "Scanning for stale branches"
    );

    let listing = enumerate_branches(source, config.retry).await;
    let classification = classify_branches(source, &listing.branches, now, config.retry).await;
    let digest = AuthorDigest::build(&classification.branches, config.days_before_stale);

    let mut summary = RunSummary {
        branches_scanned: listing.branches.len(),
        listing_complete: listing.complete,
        classification_failures: classification.failed.len(),
        unknown_age: classification.unknown_age_count(),
        stale_branches: digest.branch_count(),
        ..Default::default()
    };

    let context = DigestContext {
        repo: &config.repo,
        threshold_days: config.days_before_stale,
        mentions: &config.mentions,
    };

    let mut failures = Vec::new();
    for (author, branches) in digest.iter() {
        let text = format_digest(author, branches, &context);
        match notifier.send(&text).await {
            Ok(()) => {
                tracing::info!(author = %author, stale = branches.len(), "Notified author");
                summary.authors_notified += 1;
            }
            Err(error) => {
                tracing::error!(author = %author, error = %error, "Failed to notify author");
                failures.push(DeliveryFailure {
                    author: author.clone(),
                    error,
                });
            }
        }
    }
    summary.notification_failures = failures.len();

    tracing::info!(
        branches = summary.branches_scanned,
        listing_complete = summary.listing_complete,
        classification_failures = summary.classification_failures,
        unknown_age = summary.unknown_age,
        stale = summary.stale_branches,
        notified = summary.authors_notified,
        notification_failures = summary.notification_failures,
        "Run finished"
    );

    if failures.is_empty() {
        Ok(summary)
    } else {
        Err(RunError::Notification {
            attempted: digest.author_count(),
            failures,
            summary,
        })
    }
}
