//! Fetching upstream payloads with bounded retry.
//!
//! [`Fetch`] performs a single attempt; [`fetch_with_retry`] wraps it with
//! the [`RetryPolicy`] and turns exhaustion into
//! [`TriageError::FetchExhausted`].

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::RetryPolicy;
use crate::domain::{Result, TriageError};

const USER_AGENT: &str = concat!("wpt-triage/", env!("CARGO_PKG_VERSION"));

/// One transient failure of a single attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct AttemptError(pub String);

impl From<reqwest::Error> for AttemptError {
    fn from(err: reqwest::Error) -> Self {
        AttemptError(err.to_string())
    }
}

/// A single fetch attempt.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch_once(&self, url: &str) -> std::result::Result<Vec<u8>, AttemptError>;
}

/// HTTP(S) fetcher backed by `reqwest`.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TriageError::Http(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch_once(&self, url: &str) -> std::result::Result<Vec<u8>, AttemptError> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}

/// In-memory fetcher keyed by URL, with optional scripted failures.
///
/// Each URL fails `failures` times before returning its body; unknown URLs
/// always fail.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    bodies: HashMap<String, Vec<u8>>,
    failures: Mutex<HashMap<String, u32>>,
    calls: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.bodies.insert(url.into(), body.into());
        self
    }

    pub fn with_failures(self, url: impl Into<String>, count: u32) -> Self {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(url.into(), count);
        self
    }

    /// URLs requested so far, one entry per attempt.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl Fetch for StaticFetcher {
    async fn fetch_once(&self, url: &str) -> std::result::Result<Vec<u8>, AttemptError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(url.to_string());

        {
            let mut failures = self.failures.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(remaining) = failures.get_mut(url) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(AttemptError(format!("scripted failure for {url}")));
                }
            }
        }

        self.bodies
            .get(url)
            .cloned()
            .ok_or_else(|| AttemptError(format!("404 Not Found: {url}")))
    }
}

/// Fetch `url`, retrying transient failures per `policy`.
///
/// Waits only between attempts. No partial body is ever returned.
pub async fn fetch_with_retry<F>(fetcher: &F, url: &str, policy: &RetryPolicy) -> Result<Vec<u8>>
where
    F: Fetch + ?Sized,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut last_error = String::new();

    for attempt in 1..=max_attempts {
        match fetcher.fetch_once(url).await {
            Ok(body) => {
                debug!(url, attempt, bytes = body.len(), "fetched");
                return Ok(body);
            }
            Err(err) => {
                last_error = err.0;
                if attempt < max_attempts {
                    let delay = policy.delay_after(attempt);
                    warn!(
                        url,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %last_error,
                        "fetch failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    Err(TriageError::FetchExhausted {
        url: url.to_string(),
        attempts: max_attempts,
        last_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const URL: &str = "https://example.test/TestExpectations";

    #[tokio::test(start_paused = true)]
    async fn test_success_on_first_attempt() {
        let fetcher = StaticFetcher::new().with_body(URL, "ok");
        let body = fetch_with_retry(&fetcher, URL, &RetryPolicy::default())
            .await
            .unwrap();
        assert_eq!(body, b"ok");
        assert_eq!(fetcher.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_then_succeeds_with_tripling_backoff() {
        let fetcher = StaticFetcher::new()
            .with_body(URL, "ok")
            .with_failures(URL, 3);
        let start = tokio::time::Instant::now();

        let body = fetch_with_retry(&fetcher, URL, &RetryPolicy::default())
            .await
            .unwrap();

        assert_eq!(body, b"ok");
        assert_eq!(fetcher.calls().len(), 4);
        // 1s + 3s + 9s
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(13));
        assert!(elapsed < Duration::from_secs(14));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_is_fatal_and_names_url() {
        let fetcher = StaticFetcher::new();
        let start = tokio::time::Instant::now();
        let err = fetch_with_retry(&fetcher, URL, &RetryPolicy::default())
            .await
            .unwrap_err();

        assert_eq!(fetcher.calls().len(), 4);
        // No wait after the last attempt.
        assert!(start.elapsed() < Duration::from_secs(14));
        match err {
            TriageError::FetchExhausted { url, attempts, .. } => {
                assert_eq!(url, URL);
                assert_eq!(attempts, 4);
            }
            other => panic!("expected FetchExhausted, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_attempts_still_tries_once() {
        let fetcher = StaticFetcher::new().with_body(URL, "ok");
        let policy = RetryPolicy {
            max_attempts: 0,
            ..RetryPolicy::default()
        };
        assert!(fetch_with_retry(&fetcher, URL, &policy).await.is_ok());
    }
}
