//! Per-client rate limiting.
//!
//! Fixed-window counters keyed by [`ClientIdentity`]. Besides per-key window
//! expiry, the whole table is cleared once per cleanup interval to bound memory.
//! A client can therefore get a fresh window early right after a cleanup.

use dashmap::DashMap;
use gateway_core::{ClassifiedError, ClientIdentity, GatewayResult};
use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Rate limiter settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimiterConfig {
    /// Requests admitted per client per window
    pub max_requests: u32,
    /// Window length
    pub window: Duration,
    /// Interval after which every window is discarded
    pub cleanup_interval: Duration,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_requests: 20,
            window: Duration::from_secs(60 * 60),
            cleanup_interval: Duration::from_secs(60 * 60),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct RateWindow {
    count: u32,
    window_start: Instant,
}

/// Fixed-window rate limiter, safe to share across tasks
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    windows: DashMap<ClientIdentity, RateWindow>,
    last_cleanup: Mutex<Instant>,
}

impl RateLimiter {
    /// Create a new rate limiter
    #[must_use]
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            windows: DashMap::new(),
            last_cleanup: Mutex::new(Instant::now()),
        }
    }

    /// Requests allowed per window
    #[must_use]
    pub fn limit(&self) -> u32 {
        self.config.max_requests
    }

    /// Admit one request for `client` and return how many remain.
    ///
    /// A rejected request does not count against the window.
    ///
    /// # Errors
    /// Returns `RateLimitExceeded` once the window budget is spent.
    pub fn check_and_consume(&self, client: &ClientIdentity) -> GatewayResult<u32> {
        let now = Instant::now();
        self.maybe_cleanup(now);

        let limit = self.config.max_requests;
        // The entry guard holds the shard lock for the whole read-modify-write.
        let mut window = self.windows.entry(client.clone()).or_insert(RateWindow {
            count: 0,
            window_start: now,
        });

        if now.duration_since(window.window_start) > self.config.window {
            window.count = 0;
            window.window_start = now;
        }

        if window.count >= limit {
            warn!(client_id = %client, limit, "Rate limit exceeded");
            return Err(ClassifiedError::rate_limit_exceeded(limit));
        }

        window.count += 1;
        Ok(limit - window.count)
    }

    /// Remaining requests for `client` in its current window
    #[must_use]
    pub fn remaining(&self, client: &ClientIdentity) -> u32 {
        let limit = self.config.max_requests;
        self.windows.get(client).map_or(limit, |window| {
            if Instant::now().duration_since(window.window_start) > self.config.window {
                limit
            } else {
                limit.saturating_sub(window.count)
            }
        })
    }

    /// Number of clients currently tracked
    #[must_use]
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }

    fn maybe_cleanup(&self, now: Instant) {
        let mut last = self.last_cleanup.lock();
        if now.duration_since(*last) > self.config.cleanup_interval {
            let cleared = self.windows.len();
            self.windows.clear();
            *last = now;
            debug!(cleared, "Rate limit table cleared");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_core::ErrorKind;
    use std::sync::Arc;

    fn limiter(max_requests: u32) -> RateLimiter {
        RateLimiter::new(RateLimiterConfig {
            max_requests,
            window: Duration::from_secs(3600),
            cleanup_interval: Duration::from_secs(7200),
        })
    }

    fn id(s: &str) -> ClientIdentity {
        ClientIdentity::new(s)
    }

    #[tokio::test(start_paused = true)]
    async fn test_admits_exactly_limit_then_rejects() {
        let limiter = limiter(3);
        let client = id("aaaaaaaaaaaa");

        assert_eq!(limiter.check_and_consume(&client).unwrap(), 2);
        assert_eq!(limiter.check_and_consume(&client).unwrap(), 1);
        assert_eq!(limiter.check_and_consume(&client).unwrap(), 0);

        let err = limiter.check_and_consume(&client).unwrap_err();
        assert_eq!(err.kind, ErrorKind::RateLimitExceeded);
        assert_eq!(err.http_status, 429);
        assert_eq!(limiter.remaining(&client), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_expiry_resets_counter() {
        let limiter = limiter(2);
        let client = id("bbbbbbbbbbbb");

        limiter.check_and_consume(&client).unwrap();
        limiter.check_and_consume(&client).unwrap();
        assert!(limiter.check_and_consume(&client).is_err());

        tokio::time::advance(Duration::from_secs(3601)).await;
        assert_eq!(limiter.remaining(&client), 2);
        assert_eq!(limiter.check_and_consume(&client).unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_not_reset_at_exact_boundary() {
        let limiter = limiter(1);
        let client = id("cccccccccccc");

        limiter.check_and_consume(&client).unwrap();
        tokio::time::advance(Duration::from_secs(3600)).await;
        assert!(limiter.check_and_consume(&client).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clients_are_independent() {
        let limiter = limiter(1);
        limiter.check_and_consume(&id("one")).unwrap();
        assert!(limiter.check_and_consume(&id("one")).is_err());
        assert_eq!(limiter.check_and_consume(&id("two")).unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_global_cleanup_clears_every_window() {
        let limiter = RateLimiter::new(RateLimiterConfig {
            max_requests: 1,
            window: Duration::from_secs(3600),
            cleanup_interval: Duration::from_secs(60),
        });
        let client = id("dddddddddddd");

        limiter.check_and_consume(&client).unwrap();
        assert!(limiter.check_and_consume(&client).is_err());

        // Window still open, but the cleanup tick grants a fresh budget
        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(limiter.check_and_consume(&client).unwrap(), 0);
        assert_eq!(limiter.tracked_clients(), 1);
    }

    #[test]
    fn test_remaining_for_unknown_client_is_limit() {
        let limiter = limiter(20);
        assert_eq!(limiter.remaining(&id("never-seen")), 20);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_requests_are_counted_exactly() {
        let limiter = Arc::new(limiter(50));
        let client = id("eeeeeeeeeeee");

        let mut handles = Vec::new();
        for _ in 0..100 {
            let limiter = Arc::clone(&limiter);
            let client = client.clone();
            handles.push(tokio::spawn(async move {
                limiter.check_and_consume(&client).is_ok()
            }));
        }

        let mut admitted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                admitted += 1;
            }
        }

        assert_eq!(admitted, 50);
        assert_eq!(limiter.remaining(&client), 0);
    }
}
