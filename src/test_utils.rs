//! Shared test doubles: an in-memory branch source and a recording notifier.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};

use crate::github::{BranchSource, GitHubApiError};
use crate::notify::{NotifyError, Notifier};
use crate::types::{Author, Branch, CommitInfo, Sha};

/// A fixed clock reading shared by tests.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

type ErrorFactory = Box<dyn Fn() -> GitHubApiError + Send>;

/// Injected failure: fail the next `remaining` calls with errors from `make`.
struct Failure {
    remaining: u32,
    make: ErrorFactory,
}

impl Failure {
    fn take(&mut self) -> Option<GitHubApiError> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some((self.make)())
    }
}

/// In-memory [`BranchSource`] with failure injection and request recording.
#[derive(Default)]
pub struct FakeSource {
    branches: Mutex<Vec<Branch>>,
    commits: Mutex<HashMap<Sha, CommitInfo>>,
    page_failures: Mutex<HashMap<u32, Failure>>,
    commit_failures: Mutex<HashMap<Sha, Failure>>,
    page_requests: Mutex<Vec<u32>>,
    commit_requests: Mutex<Vec<Sha>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeSource {
    /// A source with `n` branches named `branch-000`.. and no commit data.
    pub fn with_branch_count(n: usize) -> Self {
        let source = Self::default();
        {
            let mut branches = source.branches.lock().unwrap();
            for i in 0..n {
                branches.push(Branch::new(format!("branch-{:03}", i), format!("{:040x}", i)));
            }
        }
        source
    }

    /// Adds a branch whose tip commit has the given author and committer date.
    pub fn add_branch(
        &self,
        name: &str,
        author: Option<&str>,
        committed_at: Option<DateTime<Utc>>,
    ) {
        let sha = Sha::new(format!("sha-{}", name));
        self.branches
            .lock()
            .unwrap()
            .push(Branch::new(name, sha.clone()));
        self.commits.lock().unwrap().insert(
            sha.clone(),
            CommitInfo {
                sha,
                committed_at,
                author: Author::from_login(author.map(String::from)),
            },
        );
    }

    /// Appends a branch without commit data (e.g. to simulate a duplicate listing).
    pub fn push_extra_branch(&self, name: &str) {
        self.branches
            .lock()
            .unwrap()
            .push(Branch::new(name, format!("extra-{}", name)));
    }

    /// Fails the next `times` requests for `page`.
    pub fn fail_page(
        &self,
        page: u32,
        times: u32,
        make: impl Fn() -> GitHubApiError + Send + 'static,
    ) {
        self.page_failures.lock().unwrap().insert(
            page,
            Failure {
                remaining: times,
                make: Box::new(make),
            },
        );
    }

    /// Fails the next `times` commit lookups for the branch added as `name`.
    pub fn fail_commit(
        &self,
        name: &str,
        times: u32,
        make: impl Fn() -> GitHubApiError + Send + 'static,
    ) {
        self.commit_failures.lock().unwrap().insert(
            Sha::new(format!("sha-{}", name)),
            Failure {
                remaining: times,
                make: Box::new(make),
            },
        );
    }

    pub fn branches(&self) -> Vec<Branch> {
        self.branches.lock().unwrap().clone()
    }

    pub fn page_requests(&self) -> Vec<u32> {
        self.page_requests.lock().unwrap().clone()
    }

    pub fn commit_requests(&self) -> Vec<Sha> {
        self.commit_requests.lock().unwrap().clone()
    }

    /// Highest number of concurrent `get_commit` calls observed.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl BranchSource for FakeSource {
    async fn list_branches_page(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Branch>, GitHubApiError> {
        self.page_requests.lock().unwrap().push(page);

        let failure = self
            .page_failures
            .lock()
            .unwrap()
            .get_mut(&page)
            .and_then(Failure::take);
        if let Some(err) = failure {
            return Err(err);
        }

        let branches = self.branches.lock().unwrap();
        let start = ((page - 1) * per_page) as usize;
        let end = (start + per_page as usize).min(branches.len());
        Ok(branches.get(start..end).map(<[Branch]>::to_vec).unwrap_or_default())
    }

    async fn get_commit(&self, sha: &Sha) -> Result<CommitInfo, GitHubApiError> {
        self.commit_requests.lock().unwrap().push(sha.clone());

        let now_in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now_in_flight, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(10)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let failure = self
            .commit_failures
            .lock()
            .unwrap()
            .get_mut(sha)
            .and_then(Failure::take);
        if let Some(err) = failure {
            return Err(err);
        }

        self.commits
            .lock()
            .unwrap()
            .get(sha)
            .cloned()
            .ok_or_else(|| GitHubApiError::permanent_without_source("No commit found for SHA"))
    }
}

/// A [`Notifier`] that records every message and can be told to reject some.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<String>>,
    reject_containing: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    /// Every message that contains `needle` fails with a webhook error.
    pub fn reject_messages_containing(&self, needle: &str) {
        self.reject_containing
            .lock()
            .unwrap()
            .push(needle.to_string());
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let rejected = self
            .reject_containing
            .lock()
            .unwrap()
            .iter()
            .any(|needle| text.contains(needle.as_str()));
        if rejected {
            return Err(NotifyError::Rejected {
                status: 400,
                body: "invalid_payload".to_string(),
            });
        }
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}
