//! Delivering digests.
//!
//! A [`Notifier`] sends one text message. The Slack implementation POSTs to
//! an incoming webhook; the dry-run implementation only logs.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

use crate::retry::{ClassifyFailure, FailureClass};

mod dry_run;
mod slack;

pub use dry_run::LogNotifier;
pub use slack::{SlackMessage, SlackWebhook};

/// Sends a formatted digest to its destination.
pub trait Notifier {
    fn send(&self, text: &str) -> impl Future<Output = Result<(), NotifyError>> + Send;
}

/// A failed delivery.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The request never produced a response (connect, timeout, TLS, ...).
    #[error("webhook request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The webhook answered with a non-success status.
    #[error("webhook rejected the message (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    /// The webhook asked us to slow down.
    #[error("webhook rate limited, retry after {}ms", .retry_after.as_millis())]
    RateLimited { retry_after: Duration },
}

impl ClassifyFailure for NotifyError {
    fn classify(&self) -> FailureClass {
        match self {
            NotifyError::Http(e) if e.is_timeout() || e.is_connect() => FailureClass::Retryable,
            NotifyError::Http(_) => FailureClass::Fatal,
            NotifyError::Rejected { status, .. } if *status == 429 || *status >= 500 => {
                FailureClass::Retryable
            }
            NotifyError::Rejected { .. } => FailureClass::Fatal,
            NotifyError::RateLimited { retry_after } => FailureClass::RateLimited(*retry_after),
        }
    }
}
