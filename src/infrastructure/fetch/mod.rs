//! Resilient page fetching
//!
//! Wraps reqwest with a politeness delay before every request and
//! bounded retries for the handful of failures that are worth retrying:
//! HTTP 403, HTTP 429 and reset/aborted connections. Everything else
//! propagates immediately.

use std::error::Error as _;
use std::io::ErrorKind;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use serde_json::json;
use url::Url;

use crate::domain::{ActivityLog, DomainError};

/// Retry and pacing knobs. Defaults match production pacing; tests shrink
/// the delays to keep runs fast.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub max_retries: u32,
    pub retry_base_delay: Duration,
    pub retry_max_jitter: Duration,
    pub request_delay_min: Duration,
    pub request_delay_max: Duration,
    pub timeout: Duration,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_base_delay: Duration::from_millis(2000),
            retry_max_jitter: Duration::from_millis(1000),
            request_delay_min: Duration::from_millis(1000),
            request_delay_max: Duration::from_millis(3000),
            timeout: Duration::from_secs(15),
        }
    }
}

impl FetcherConfig {
    /// Configuration with no pacing delays, for tests.
    pub fn immediate() -> Self {
        Self {
            retry_base_delay: Duration::ZERO,
            retry_max_jitter: Duration::ZERO,
            request_delay_min: Duration::ZERO,
            request_delay_max: Duration::ZERO,
            ..Self::default()
        }
    }
}

/// Fetches a remote page as text.
#[async_trait]
pub trait PageFetcher: Send + Sync + std::fmt::Debug {
    async fn fetch(&self, url: &str) -> Result<String, DomainError>;
}

/// One failed attempt, classified for the retry loop.
#[derive(Debug)]
struct FetchFailure {
    retryable: bool,
    status: Option<u16>,
    retry_after: Option<Duration>,
    message: String,
}

/// reqwest-backed [`PageFetcher`] with exponential backoff and jitter.
#[derive(Debug)]
pub struct HttpPageFetcher {
    client: reqwest::Client,
    config: FetcherConfig,
    activity: Arc<dyn ActivityLog>,
}

impl HttpPageFetcher {
    pub fn new(config: FetcherConfig, activity: Arc<dyn ActivityLog>) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .default_headers(default_headers())
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| DomainError::internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            activity,
        })
    }

    async fn attempt(&self, url: &str) -> Result<String, FetchFailure> {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(error) => return Err(classify_transport_error(&error)),
        };

        let status = response.status();
        if status.is_success() {
            return response.text().await.map_err(|e| FetchFailure {
                retryable: false,
                status: Some(status.as_u16()),
                retry_after: None,
                message: format!("Failed to read body: {e}"),
            });
        }

        let code = status.as_u16();
        let retryable = matches!(code, 403 | 429);
        let retry_after = if retryable {
            parse_retry_after(response.headers())
        } else {
            None
        };

        Err(FetchFailure {
            retryable,
            status: Some(code),
            retry_after,
            message: format!("HTTP {status}"),
        })
    }

    /// Random pre-request delay, so bursts of sequential fetches do not
    /// trip upstream bot protection.
    async fn politeness_delay(&self) {
        let min = self.config.request_delay_min.as_millis() as u64;
        let max = self.config.request_delay_max.as_millis() as u64;
        if max == 0 {
            return;
        }

        let millis = rand::thread_rng().gen_range(min..=max.max(min));
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }

    fn backoff_delay(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let base = retry_after
            .unwrap_or_else(|| self.config.retry_base_delay * 2u32.saturating_pow(attempt));

        let max_jitter = self.config.retry_max_jitter.as_millis() as u64;
        let jitter = if max_jitter == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=max_jitter)
        };

        base + Duration::from_millis(jitter)
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<String, DomainError> {
        Url::parse(url)
            .map_err(|e| DomainError::permanent_fetch(url, format!("Invalid URL: {e}")))?;

        let mut attempt: u32 = 0;

        loop {
            self.politeness_delay().await;

            let failure = match self.attempt(url).await {
                Ok(body) => return Ok(body),
                Err(failure) => failure,
            };

            if failure.retryable && attempt < self.config.max_retries {
                self.activity.activity(
                    "RETRY_ATTEMPT",
                    json!({
                        "url": url,
                        "attempt": attempt + 1,
                        "status": failure.status,
                    }),
                );

                let delay = self.backoff_delay(attempt, failure.retry_after);
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            let attempts = attempt + 1;
            let error = if failure.retryable {
                DomainError::fetch_exhausted(url, attempts, failure.message)
            } else {
                DomainError::permanent_fetch(url, failure.message)
            };

            self.activity.error(
                &error,
                json!({
                    "operation": "fetch_page",
                    "url": url,
                    "attempts": attempts,
                    "status": failure.status,
                }),
            );

            return Err(error);
        }
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
             (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36",
        ),
    );
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers
}

fn classify_transport_error(error: &reqwest::Error) -> FetchFailure {
    let message = if error.is_timeout() {
        "Request timed out".to_string()
    } else {
        format!("Request failed: {error}")
    };

    FetchFailure {
        retryable: is_connection_reset(error),
        status: None,
        retry_after: None,
        message,
    }
}

/// Walks the source chain looking for a reset or aborted connection.
fn is_connection_reset(error: &reqwest::Error) -> bool {
    let mut source = error.source();
    while let Some(current) = source {
        if let Some(io) = current.downcast_ref::<std::io::Error>() {
            if matches!(
                io.kind(),
                ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted
            ) {
                return true;
            }
        }
        source = current.source();
    }
    false
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
