//! Sliding-window rate limiting
//!
//! Per-identifier request timestamps live in the injected [`TtlCache`]
//! under `ratelimit:{id}` with TTL equal to the window, so idle
//! identifiers age out on their own. Admission runs as one atomic
//! read-modify-write on the cache.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;

use crate::domain::{ActivityLog, DomainError};
use crate::infrastructure::cache::TtlCache;

const KEY_PREFIX: &str = "ratelimit:";

/// Window configuration. Defaults to 100 requests per 15 minutes.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub window: Duration,
    pub max_requests: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(15 * 60),
            max_requests: 100,
        }
    }
}

/// Read-only projection of one identifier's window state.
#[derive(Debug, Clone)]
pub struct RateLimitStatus {
    pub remaining: usize,
    pub reset_at: DateTime<Utc>,
    pub max_requests: usize,
}

/// Sliding-window admission control per identifier.
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    cache: Arc<TtlCache<Vec<i64>>>,
    config: RateLimitConfig,
    activity: Arc<dyn ActivityLog>,
}

impl SlidingWindowLimiter {
    pub fn new(
        cache: Arc<TtlCache<Vec<i64>>>,
        config: RateLimitConfig,
        activity: Arc<dyn ActivityLog>,
    ) -> Self {
        Self {
            cache,
            config,
            activity,
        }
    }

    /// Admits or rejects a request for `identifier`.
    ///
    /// A request is admitted while the in-window count is below the
    /// maximum; the admission that reaches the maximum still succeeds, and
    /// only then are further requests rejected. Admission records the
    /// request timestamp; rejection records nothing.
    pub async fn check(&self, identifier: &str) -> Result<(), DomainError> {
        let now = Utc::now().timestamp_millis();
        let window_ms = self.window_millis();
        let max_requests = self.config.max_requests;
        let key = cache_key(identifier);

        let outcome = self
            .cache
            .update(&key, self.config.window, |current| {
                let mut valid: Vec<i64> = current
                    .map(|timestamps| {
                        timestamps
                            .iter()
                            .copied()
                            .filter(|&t| now - t < window_ms)
                            .collect()
                    })
                    .unwrap_or_default();

                if valid.len() >= max_requests {
                    let oldest = valid.iter().copied().min().unwrap_or(now);
                    (None, Err(oldest + window_ms))
                } else {
                    valid.push(now);
                    (Some(valid), Ok(()))
                }
            })
            .await;

        match outcome {
            Ok(()) => Ok(()),
            Err(reset_millis) => {
                let reset_at = millis_to_datetime(reset_millis);
                self.activity.activity(
                    "RATE_LIMIT_EXCEEDED",
                    json!({
                        "identifier": identifier,
                        "max_requests": max_requests,
                        "reset_at": reset_at.to_rfc3339(),
                    }),
                );
                Err(DomainError::rate_limit_exceeded(reset_at))
            }
        }
    }

    /// Requests still admissible in the current window. Never records a
    /// request.
    pub async fn remaining_requests(&self, identifier: &str) -> usize {
        let in_window = self.in_window_timestamps(identifier).await;
        self.config.max_requests.saturating_sub(in_window.len())
    }

    /// When the current window frees a slot: oldest in-window request plus
    /// the window length, or now for an idle identifier. Never records a
    /// request.
    pub async fn reset_time(&self, identifier: &str) -> DateTime<Utc> {
        let in_window = self.in_window_timestamps(identifier).await;

        match in_window.iter().copied().min() {
            Some(oldest) => millis_to_datetime(oldest + self.window_millis()),
            None => Utc::now(),
        }
    }

    pub async fn status(&self, identifier: &str) -> RateLimitStatus {
        RateLimitStatus {
            remaining: self.remaining_requests(identifier).await,
            reset_at: self.reset_time(identifier).await,
            max_requests: self.config.max_requests,
        }
    }

    /// Forgets one identifier's window.
    pub async fn clear(&self, identifier: &str) {
        self.cache.remove(&cache_key(identifier)).await;
        self.activity.activity(
            "RATE_LIMIT_CLEARED",
            json!({ "identifier": identifier }),
        );
    }

    /// Forgets every tracked window.
    pub async fn reset_all(&self) {
        let keys = self.cache.keys().await;
        let mut cleared = 0usize;

        for key in keys {
            if key.starts_with(KEY_PREFIX) && self.cache.remove(&key).await {
                cleared += 1;
            }
        }

        self.activity
            .activity("ALL_RATE_LIMITS_RESET", json!({ "cleared": cleared }));
    }

    async fn in_window_timestamps(&self, identifier: &str) -> Vec<i64> {
        let now = Utc::now().timestamp_millis();
        let window_ms = self.window_millis();

        self.cache
            .get(&cache_key(identifier))
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|&t| now - t < window_ms)
            .collect()
    }

    fn window_millis(&self) -> i64 {
        self.config.window.as_millis() as i64
    }
}

fn cache_key(identifier: &str) -> String {
    format!("{KEY_PREFIX}{identifier}")
}

fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .unwrap_or_else(Utc::now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::activity::mock::RecordingActivityLog;

    fn limiter(window: Duration, max_requests: usize) -> SlidingWindowLimiter {
        SlidingWindowLimiter::new(
            Arc::new(TtlCache::new()),
            RateLimitConfig {
                window,
                max_requests,
            },
            Arc::new(RecordingActivityLog::new()),
        )
    }

    #[tokio::test]
    async fn test_admits_up_to_max_then_rejects() {
        let limiter = limiter(Duration::from_secs(1), 3);

        for _ in 0..3 {
            limiter.check("client").await.unwrap();
        }

        let err = limiter.check("client").await.unwrap_err();
        match err {
            DomainError::RateLimitExceeded { remaining, reset_at } => {
                assert_eq!(remaining, 0);
                assert!(reset_at > Utc::now());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_window_elapse_readmits() {
        let limiter = limiter(Duration::from_millis(200), 2);

        limiter.check("client").await.unwrap();
        limiter.check("client").await.unwrap();
        assert!(limiter.check("client").await.is_err());

        tokio::time::sleep(Duration::from_millis(250)).await;

        limiter.check("client").await.unwrap();
    }

    #[tokio::test]
    async fn test_identifiers_are_independent() {
        let limiter = limiter(Duration::from_secs(1), 1);

        limiter.check("alice").await.unwrap();
        limiter.check("bob").await.unwrap();
        assert!(limiter.check("alice").await.is_err());
    }

    #[tokio::test]
    async fn test_projections_do_not_record() {
        let limiter = limiter(Duration::from_secs(1), 2);

        limiter.check("client").await.unwrap();

        for _ in 0..10 {
            assert_eq!(limiter.remaining_requests("client").await, 1);
            let _ = limiter.reset_time("client").await;
        }

        // One slot must still be admissible.
        limiter.check("client").await.unwrap();
    }

    #[tokio::test]
    async fn test_reset_time_for_idle_identifier_is_now() {
        let limiter = limiter(Duration::from_secs(60), 2);

        let before = Utc::now();
        let reset = limiter.reset_time("nobody").await;
        let after = Utc::now();

        assert!(reset >= before && reset <= after);
    }

    #[tokio::test]
    async fn test_clear_frees_identifier() {
        let limiter = limiter(Duration::from_secs(60), 1);

        limiter.check("client").await.unwrap();
        assert!(limiter.check("client").await.is_err());

        limiter.clear("client").await;
        limiter.check("client").await.unwrap();
    }

    #[tokio::test]
    async fn test_reset_all_clears_every_window() {
        let limiter = limiter(Duration::from_secs(60), 1);

        limiter.check("alice").await.unwrap();
        limiter.check("bob").await.unwrap();

        limiter.reset_all().await;

        limiter.check("alice").await.unwrap();
        limiter.check("bob").await.unwrap();
    }

    #[tokio::test]
    async fn test_no_lost_admissions_under_concurrency() {
        let limiter = Arc::new(limiter(Duration::from_secs(60), 10));
        let mut handles = Vec::new();

        for _ in 0..25 {
            let limiter = Arc::clone(&limiter);
            handles.push(tokio::spawn(async move { limiter.check("shared").await.is_ok() }));
        }

        let mut admitted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                admitted += 1;
            }
        }

        // Exactly max admissions succeed; none are lost or duplicated.
        assert_eq!(admitted, 10);
        assert_eq!(limiter.remaining_requests("shared").await, 0);
    }
}
