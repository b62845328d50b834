//! GitHub API error types.
//!
//! Errors are categorized for the retry layer:
//!
//! - **RateLimited**: HTTP 403/429 carrying a `retry-after` header. The retry
//!   layer waits exactly that long.
//! - **Transient**: 5xx, 429, 403 rate-limit messages without a hint, and
//!   network-level failures. Retried with exponential backoff.
//! - **Permanent**: everything else (401, 404, 422, unparseable responses).
//!   Returned immediately.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::retry::{ClassifyFailure, FailureClass};

/// The kind of GitHub API error, categorized for retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitHubErrorKind {
    /// GitHub asked us to back off for a specific duration.
    RateLimited { retry_after: Duration },

    /// Transient error - safe to retry with backoff.
    Transient,

    /// Permanent error - retrying will not help.
    Permanent,
}

/// A GitHub API error with categorization for retry decisions.
#[derive(Debug, Error)]
pub struct GitHubApiError {
    pub kind: GitHubErrorKind,

    /// The HTTP status code, if a response was received.
    pub status_code: Option<u16>,

    pub message: String,

    /// The underlying octocrab error, if available.
    #[source]
    pub source: Option<octocrab::Error>,
}

impl fmt::Display for GitHubApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "GitHub API error (HTTP {}): {}", code, self.message),
            None => write!(f, "GitHub API error: {}", self.message),
        }
    }
}

impl ClassifyFailure for GitHubApiError {
    fn classify(&self) -> FailureClass {
        match self.kind {
            GitHubErrorKind::RateLimited { retry_after } => FailureClass::RateLimited(retry_after),
            GitHubErrorKind::Transient => FailureClass::Retryable,
            GitHubErrorKind::Permanent => FailureClass::Fatal,
        }
    }
}

impl GitHubApiError {
    /// Creates a permanent error without an octocrab source.
    pub fn permanent_without_source(message: impl Into<String>) -> Self {
        Self {
            kind: GitHubErrorKind::Permanent,
            status_code: None,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a transient error without an octocrab source.
    pub fn transient_without_source(message: impl Into<String>) -> Self {
        Self {
            kind: GitHubErrorKind::Transient,
            status_code: None,
            message: message.into(),
            source: None,
        }
    }

    /// Categorizes a non-success HTTP response.
    ///
    /// `retry_after` is the parsed `retry-after` header, if any; `body` is used
    /// as the message and to spot rate-limit responses that carry no hint.
    pub fn from_response(status: u16, retry_after: Option<Duration>, body: &str) -> Self {
        let message = response_message(body);

        let kind = match (status, retry_after) {
            (403 | 429, Some(retry_after)) => GitHubErrorKind::RateLimited { retry_after },
            (429, None) => GitHubErrorKind::Transient,
            (403, None) if is_rate_limit_error(&message) => GitHubErrorKind::Transient,
            (code, _) if (500..600).contains(&code) => GitHubErrorKind::Transient,
            _ => GitHubErrorKind::Permanent,
        };

        Self {
            kind,
            status_code: Some(status),
            message,
            source: None,
        }
    }

    /// Categorizes an octocrab error raised before any response was read.
    ///
    /// These are mostly transport failures, so only network-looking messages are
    /// treated as transient.
    pub fn from_octocrab(err: octocrab::Error) -> Self {
        let message = err.to_string();
        let kind = if is_network_error(&message) || is_rate_limit_error(&message) {
            GitHubErrorKind::Transient
        } else {
            GitHubErrorKind::Permanent
        };

        Self {
            kind,
            status_code: None,
            message,
            source: Some(err),
        }
    }
}

/// Extracts GitHub's `message` field from an error body, falling back to the raw text.
fn response_message(body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        message: String,
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.message,
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

/// Checks if an error message indicates a rate limit.
fn is_rate_limit_error(message: &str) -> bool {
    let message_lower = message.to_lowercase();
    message_lower.contains("rate limit")
        || message_lower.contains("api rate")
        || message_lower.contains("secondary rate")
        || message_lower.contains("abuse detection")
}

/// Checks if an error message indicates a network-level error.
fn is_network_error(message: &str) -> bool {
    let message_lower = message.to_lowercase();
    message_lower.contains("timeout")
        || message_lower.contains("connection")
        || message_lower.contains("network")
        || message_lower.contains("dns")
        || message_lower.contains("timed out")
        || message_lower.contains("hyper")
}
