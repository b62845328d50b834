//! Slack incoming-webhook delivery.

use std::time::Duration;

use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::Serialize;

use crate::retry::{RetryConfig, parse_retry_after, retry_with_backoff};

use super::{Notifier, NotifyError};

/// Per-request timeout for webhook POSTs.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Body of an incoming-webhook POST.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlackMessage<'a> {
    pub text: &'a str,
}

/// Posts messages to a Slack incoming webhook.
#[derive(Clone)]
pub struct SlackWebhook {
    http: Client,
    url: String,
    retry: RetryConfig,
}

impl SlackWebhook {
    pub fn new(url: impl Into<String>, retry: RetryConfig) -> Result<Self, NotifyError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("stale-branch-notifier/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            url: url.into(),
            retry,
        })
    }

    async fn post_once(&self, text: &str) -> Result<(), NotifyError> {
        let response = self
            .http
            .post(&self.url)
            .json(&SlackMessage { text })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| parse_retry_after(v, Utc::now()));

        if status == StatusCode::TOO_MANY_REQUESTS
            && let Some(retry_after) = retry_after
        {
            return Err(NotifyError::RateLimited { retry_after });
        }

        let body = response.text().await.unwrap_or_default();
        Err(NotifyError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

impl Notifier for SlackWebhook {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        retry_with_backoff(self.retry, || self.post_once(text))
            .await
            .into_result()
    }
}

impl std::fmt::Debug for SlackWebhook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The webhook URL is a credential.
        f.debug_struct("SlackWebhook")
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum::http::StatusCode as AxumStatus;
    use axum::response::{IntoResponse, Response};
    use axum::routing::post;
    use axum::{Json, Router};

    /// Responses to play back, in order; once exhausted every POST gets 200.
    #[derive(Clone, Default)]
    struct FakeSlack {
        script: Arc<Mutex<Vec<Response>>>,
        bodies: Arc<Mutex<Vec<serde_json::Value>>>,
        hits: Arc<AtomicU32>,
    }

    async fn receive(
        State(fake): State<FakeSlack>,
        Json(body): Json<serde_json::Value>,
    ) -> Response {
        fake.hits.fetch_add(1, Ordering::SeqCst);
        fake.bodies.lock().unwrap().push(body);
        let mut script = fake.script.lock().unwrap();
        if script.is_empty() {
            "ok".into_response()
        } else {
            script.remove(0)
        }
    }

    async fn spawn_fake(fake: FakeSlack) -> SocketAddr {
        let app = Router::new()
            .route("/services/T000/B000/XXXX", post(receive))
            .with_state(fake);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn fast_retry() -> RetryConfig {
        RetryConfig::new(3, Duration::from_millis(5), Duration::from_millis(10), 2.0)
    }

    fn webhook_for(addr: SocketAddr) -> SlackWebhook {
        SlackWebhook::new(format!("http://{}/services/T000/B000/XXXX", addr), fast_retry()).unwrap()
    }

    #[tokio::test]
    async fn posts_text_as_json() {
        let fake = FakeSlack::default();
        let addr = spawn_fake(fake.clone()).await;

        webhook_for(addr).send("hello @carol").await.unwrap();

        let bodies = fake.bodies.lock().unwrap();
        assert_eq!(*bodies, vec![serde_json::json!({ "text": "hello @carol" })]);
    }

    #[tokio::test]
    async fn server_errors_are_retried() {
        let fake = FakeSlack::default();
        fake.script
            .lock()
            .unwrap()
            .push((AxumStatus::INTERNAL_SERVER_ERROR, "oops").into_response());
        let addr = spawn_fake(fake.clone()).await;

        webhook_for(addr).send("hi").await.unwrap();

        assert_eq!(fake.hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn rate_limit_honours_retry_after() {
        let fake = FakeSlack::default();
        fake.script.lock().unwrap().push(
            (AxumStatus::TOO_MANY_REQUESTS, [("retry-after", "0")], "slow down").into_response(),
        );
        let addr = spawn_fake(fake.clone()).await;

        webhook_for(addr).send("hi").await.unwrap();

        assert_eq!(fake.hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let fake = FakeSlack::default();
        fake.script
            .lock()
            .unwrap()
            .push((AxumStatus::BAD_REQUEST, "invalid_payload").into_response());
        let addr = spawn_fake(fake.clone()).await;

        let err = webhook_for(addr).send("hi").await.unwrap_err();

        match err {
            NotifyError::Rejected { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, "invalid_payload");
            }
            other => panic!("Expected Rejected, got {:?}", other),
        }
        assert_eq!(fake.hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn debug_hides_url() {
        let webhook =
            SlackWebhook::new("https://hooks.slack.com/services/secret", RetryConfig::DEFAULT)
                .unwrap();
        assert!(!format!("{:?}", webhook).contains("secret"));
    }
}
