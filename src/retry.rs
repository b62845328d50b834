//! Exponential backoff retry for outbound HTTP calls.
//!
//! Every GitHub request and every webhook delivery goes through
//! [`retry_with_backoff`]. Failures are sorted by [`ClassifyFailure`]:
//!
//! - **Rate limited**: sleep for exactly the server's `retry-after` hint
//! - **Retryable**: sleep `initial_delay * multiplier^(n-1)` before the n-th retry
//!   (2s, 4s, 8s, 16s with the defaults)
//! - **Fatal**: return immediately
//!
//! Every attempt, including rate-limited ones, counts toward `max_attempts`.
//! No jitter is applied.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};

/// How a failed attempt should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// The server asked us to wait this long before trying again.
    RateLimited(Duration),

    /// Worth retrying after the normal backoff delay.
    Retryable,

    /// Retrying cannot help.
    Fatal,
}

/// Maps an error to its retry treatment.
pub trait ClassifyFailure {
    fn classify(&self) -> FailureClass;
}

/// Configuration for exponential backoff retry.
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one.
    pub max_attempts: u32,

    /// Delay before the first retry.
    pub initial_delay: Duration,

    /// Maximum delay between retries (cap for exponential growth).
    pub max_delay: Duration,

    /// Multiplier for exponential backoff.
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    /// Default policy for all outbound calls.
    ///
    /// - 5 attempts with 2s, 4s, 8s, 16s between them
    /// - Total max backoff: 30 seconds (rate-limit waits come on top)
    pub const DEFAULT: Self = Self {
        max_attempts: 5,
        initial_delay: Duration::from_secs(2),
        max_delay: Duration::from_secs(60),
        backoff_multiplier: 2.0,
    };

    /// Single attempt, never sleeps.
    pub const NO_RETRY: Self = Self {
        max_attempts: 1,
        initial_delay: Duration::ZERO,
        max_delay: Duration::ZERO,
        backoff_multiplier: 1.0,
    };

    pub fn new(
        max_attempts: u32,
        initial_delay: Duration,
        max_delay: Duration,
        backoff_multiplier: f64,
    ) -> Self {
        Self {
            max_attempts,
            initial_delay,
            max_delay,
            backoff_multiplier,
        }
    }

    /// Computes the delay after the given failed attempt (1-indexed).
    ///
    /// `initial_delay * backoff_multiplier^(attempt - 1)`, capped at `max_delay`.
    pub fn delay_after_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let multiplier = self.backoff_multiplier.powi(exponent);
        let delay_secs = self.initial_delay.as_secs_f64() * multiplier;
        let capped_secs = delay_secs.min(self.max_delay.as_secs_f64());
        Duration::from_secs_f64(capped_secs)
    }

    /// Returns an iterator over all backoff delays.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        (1..self.max_attempts).map(|attempt| self.delay_after_attempt(attempt))
    }

    /// Computes the total backoff time if every attempt fails with a retryable error.
    pub fn total_max_wait(&self) -> Duration {
        self.delays().sum()
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Parses a `retry-after` header value.
///
/// GitHub sends delay-seconds; the HTTP-date form is accepted too and measured
/// from `now`. Dates in the past yield a zero wait.
pub fn parse_retry_after(value: &str, now: DateTime<Utc>) -> Option<Duration> {
    let value = value.trim();
    if let Ok(secs) = value.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }

    let at = DateTime::parse_from_rfc2822(value).ok()?;
    let wait_ms = (at.with_timezone(&Utc) - now).num_milliseconds().max(0);
    Some(Duration::from_millis(wait_ms as u64))
}

/// Result of a retried operation.
#[derive(Debug)]
pub enum RetryResult<T, E> {
    /// The operation succeeded.
    Success(T),

    /// Every attempt failed with a retryable or rate-limit error.
    ExhaustedRetries {
        /// The last error encountered.
        last_error: E,
        /// Number of attempts made.
        attempts: u32,
    },

    /// A fatal error occurred (not retried).
    Fatal(E),
}

impl<T, E> RetryResult<T, E> {
    /// Converts to a Result, treating exhausted retries and fatal errors as Err.
    pub fn into_result(self) -> Result<T, E> {
        match self {
            RetryResult::Success(v) => Ok(v),
            RetryResult::ExhaustedRetries { last_error, .. } => Err(last_error),
            RetryResult::Fatal(e) => Err(e),
        }
    }

    /// Returns true if the result is a success.
    pub fn is_success(&self) -> bool {
        matches!(self, RetryResult::Success(_))
    }
}

/// Executes an async operation with retry logic.
///
/// `operation` is called until it succeeds, fails fatally, or `max_attempts`
/// is reached. Sleeps only suspend the calling task.
pub async fn retry_with_backoff<T, E, F, Fut>(
    config: RetryConfig,
    mut operation: F,
) -> RetryResult<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: ClassifyFailure + Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(value) => return RetryResult::Success(value),
            Err(e) => {
                attempt += 1;

                let delay = match e.classify() {
                    FailureClass::Fatal => return RetryResult::Fatal(e),
                    FailureClass::RateLimited(wait) => wait,
                    FailureClass::Retryable => config.delay_after_attempt(attempt),
                };

                if attempt >= max_attempts {
                    return RetryResult::ExhaustedRetries {
                        last_error: e,
                        attempts: attempt,
                    };
                }

                tracing::info!(
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Request failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
