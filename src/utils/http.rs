// src/utils/http.rs

//! HTTP client utilities.
//!
//! `PageSource` is the raw transport (one GET, no retry). `Fetcher` wraps a
//! source with the bounded retry policy used for every page of the crawl.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::CrawlerConfig;

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &CrawlerConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// A transport able to GET a page body.
///
/// An `Err` means the attempt failed at the transport level (connection
/// error, timeout) and may be retried.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn get(&self, url: &str) -> Result<Vec<u8>>;
}

/// `PageSource` backed by a `reqwest::Client`.
pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &CrawlerConfig) -> Result<Self> {
        Ok(Self::new(create_async_client(config)?))
    }
}

#[async_trait]
impl PageSource for HttpSource {
    async fn get(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::transport(url, e))?;

        let status = response.status();
        if !status.is_success() {
            log::warn!("{} answered with status {}", url, status);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::transport(url, e))?;
        Ok(bytes.to_vec())
    }
}

/// Attempt budget and pause between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.retry_delay_ms),
        )
    }
}

/// Resilient page fetcher.
pub struct Fetcher<S> {
    source: S,
    policy: RetryPolicy,
}

impl<S: PageSource> Fetcher<S> {
    pub fn new(source: S, policy: RetryPolicy) -> Self {
        Self { source, policy }
    }

    /// Fetch a page as text, retrying transport failures.
    ///
    /// The body is always decoded as UTF-8 (lossy), whatever charset the
    /// server declares. After the last failed attempt an `AppError::Fetch`
    /// is returned; nothing is retried past the policy budget.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        let attempts = self.policy.max_attempts;
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match self.source.get(url).await {
                Ok(bytes) => {
                    log::debug!("Fetched {} ({} bytes, attempt {})", url, bytes.len(), attempt);
                    return Ok(String::from_utf8_lossy(&bytes).into_owned());
                }
                Err(e) => {
                    log::warn!("Attempt {}/{} failed for {}: {}", attempt, attempts, url, e);
                    last_error = e.to_string();
                    if attempt < attempts && !self.policy.delay.is_zero() {
                        tokio::time::sleep(self.policy.delay).await;
                    }
                }
            }
        }

        log::error!("Giving up on {} after {} attempt(s)", url, attempts);
        Err(AppError::fetch(url, attempts, last_error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Instant;

    /// Fails the first `failures` calls, then serves `body`.
    struct FlakySource {
        failures: u32,
        calls: AtomicU32,
        body: Vec<u8>,
    }

    impl FlakySource {
        fn new(failures: u32, body: &[u8]) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
                body: body.to_vec(),
            }
        }
    }

    #[async_trait]
    impl PageSource for FlakySource {
        async fn get(&self, url: &str) -> Result<Vec<u8>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.failures {
                return Err(AppError::transport(url, "connection reset"));
            }
            Ok(self.body.clone())
        }
    }

    fn no_delay() -> RetryPolicy {
        RetryPolicy::new(3, Duration::ZERO)
    }

    #[tokio::test]
    async fn test_succeeds_on_third_attempt() {
        let fetcher = Fetcher::new(FlakySource::new(2, b"<p>ok</p>"), no_delay());
        let body = fetcher.fetch("https://example.com/w").await.unwrap();
        assert_eq!(body, "<p>ok</p>");
        assert_eq!(fetcher.source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_three_attempts() {
        let fetcher = Fetcher::new(FlakySource::new(3, b"never"), no_delay());
        let result = fetcher.fetch("https://example.com/w").await;
        assert!(matches!(result, Err(AppError::Fetch { attempts: 3, .. })));
        assert_eq!(fetcher.source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_decodes_invalid_utf8_lossily() {
        let fetcher = Fetcher::new(FlakySource::new(0, b"Reuni\xe3o"), no_delay());
        let body = fetcher.fetch("https://example.com/w").await.unwrap();
        assert!(body.starts_with("Reuni"));
        assert!(body.contains('\u{FFFD}'));
    }

    /// Always fails, remembering when each attempt was made.
    #[derive(Default)]
    struct DeadSource {
        attempts: Mutex<Vec<Instant>>,
    }

    #[async_trait]
    impl PageSource for DeadSource {
        async fn get(&self, url: &str) -> Result<Vec<u8>> {
            if let Ok(mut attempts) = self.attempts.lock() {
                attempts.push(Instant::now());
            }
            Err(AppError::transport(url, "connection refused"))
        }
    }

    #[tokio::test]
    async fn test_pauses_between_attempts() {
        let delay = Duration::from_millis(30);
        let fetcher = Fetcher::new(DeadSource::default(), RetryPolicy::new(3, delay));
        let result = fetcher.fetch("https://example.com/w").await;
        assert!(matches!(result, Err(AppError::Fetch { attempts: 3, .. })));

        let attempts = fetcher.source.attempts.lock().unwrap().clone();
        assert_eq!(attempts.len(), 3);
        for pair in attempts.windows(2) {
            assert!(pair[1] - pair[0] >= delay);
        }
    }

    #[test]
    fn test_policy_clamps_attempts() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts, 1);
        let policy = RetryPolicy::from_config(&CrawlerConfig::default());
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.delay, Duration::from_secs(3));
    }
}
