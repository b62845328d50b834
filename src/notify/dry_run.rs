//! Dry-run delivery: digests are logged, never posted.

use super::{Notifier, NotifyError};

/// Logs digests instead of sending them (`--dry-run`).
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        tracing::info!(digest = %text, "Dry run: digest not sent");
        Ok(())
    }
}
