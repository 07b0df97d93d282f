//! Retry policy with linear backoff.
//!
//! Attempts run strictly one after another. After failed attempt `n`
//! (1-indexed) the policy waits `base_delay * n` before trying again, unless
//! the error is not retryable or the attempt budget is spent.

use gateway_core::ClassifiedError;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Retry configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay unit for the linear backoff
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

/// Retry policy implementation
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    /// Create a new retry policy with the given configuration
    #[must_use]
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Create with default configuration
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(RetryConfig::default())
    }

    /// Delay after the given failed attempt (1-indexed)
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.config.base_delay.saturating_mul(attempt)
    }

    /// Execute an operation with retry logic
    ///
    /// # Errors
    /// Returns the first non-retryable error, or the last error once every
    /// attempt has failed
    pub async fn execute<F, Fut, T>(&self, operation: F) -> Result<T, ClassifiedError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ClassifiedError>>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match operation().await {
                Ok(result) => {
                    if attempt > 1 {
                        debug!(attempt, "Retry succeeded");
                    }
                    return Ok(result);
                }
                Err(error) => {
                    if !error.retryable || attempt >= max_attempts {
                        return Err(error);
                    }

                    let delay = self.delay_for_attempt(attempt);
                    warn!(
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        kind = %error.kind,
                        provider = error.provider.as_deref().unwrap_or("unknown"),
                        "Retrying after error"
                    );

                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Get the configuration
    #[must_use]
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Builder for retry policy
#[derive(Debug, Default)]
pub struct RetryPolicyBuilder {
    config: RetryConfig,
}

impl RetryPolicyBuilder {
    /// Create a new builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set total attempts
    #[must_use]
    pub fn max_attempts(mut self, n: u32) -> Self {
        self.config.max_attempts = n;
        self
    }

    /// Set base delay
    #[must_use]
    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.config.base_delay = delay;
        self
    }

    /// Build the policy
    #[must_use]
    pub fn build(self) -> RetryPolicy {
        RetryPolicy::new(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_core::ErrorKind;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    /// Collects attempt timestamps
    #[derive(Default)]
    struct Recorder(Mutex<Vec<Instant>>);

    impl Recorder {
        fn record(&self) {
            self.0.lock().unwrap().push(Instant::now());
        }

        fn gaps(&self) -> Vec<Duration> {
            let times = self.0.lock().unwrap();
            times.windows(2).map(|w| w[1] - w[0]).collect()
        }
    }

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicyBuilder::new()
            .max_attempts(max_attempts)
            .base_delay(Duration::from_millis(1000))
            .build()
    }

    #[test]
    fn test_linear_delay() {
        let policy = policy(3);
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(2000));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(3000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_success_first_attempt() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = Arc::clone(&counter);

        let result = policy(3)
            .execute(|| {
                let c = Arc::clone(&counter_clone);
                async move {
                    c.fetch_add(1, Ordering::Relaxed);
                    Ok::<_, ClassifiedError>(42)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(counter.load(Ordering::Relaxed), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_success_after_server_errors() {
        let counter = Arc::new(AtomicU32::new(0));
        let recorder = Arc::new(Recorder::default());
        let (c, r) = (Arc::clone(&counter), Arc::clone(&recorder));

        let result = policy(3)
            .execute(|| {
                let c = Arc::clone(&c);
                let r = Arc::clone(&r);
                async move {
                    r.record();
                    let attempt = c.fetch_add(1, Ordering::Relaxed) + 1;
                    if attempt < 3 {
                        Err(ClassifiedError::new(ErrorKind::UpstreamServerError))
                    } else {
                        Ok("converted")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "converted");
        assert_eq!(counter.load(Ordering::Relaxed), 3);

        let gaps = recorder.gaps();
        assert_eq!(gaps.len(), 2);
        assert!(gaps[1] > gaps[0]);
        assert!(gaps[0] >= Duration::from_millis(1000) && gaps[0] < Duration::from_millis(1100));
        assert!(gaps[1] >= Duration::from_millis(2000) && gaps[1] < Duration::from_millis(2100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_error_stops_immediately() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = Arc::clone(&counter);

        let result: Result<(), _> = policy(3)
            .execute(|| {
                let c = Arc::clone(&counter_clone);
                async move {
                    c.fetch_add(1, Ordering::Relaxed);
                    Err(ClassifiedError::new(ErrorKind::UpstreamUnauthorized))
                }
            })
            .await;

        assert_eq!(result.unwrap_err().kind, ErrorKind::UpstreamUnauthorized);
        assert_eq!(counter.load(Ordering::Relaxed), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_exhausted_returns_last_error() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = Arc::clone(&counter);
        let start = Instant::now();

        let result: Result<(), _> = policy(3)
            .execute(|| {
                let c = Arc::clone(&counter_clone);
                async move {
                    let attempt = c.fetch_add(1, Ordering::Relaxed) + 1;
                    let kind = if attempt == 3 {
                        ErrorKind::Timeout
                    } else {
                        ErrorKind::NetworkUnreachable
                    };
                    Err(ClassifiedError::new(kind))
                }
            })
            .await;

        assert_eq!(result.unwrap_err().kind, ErrorKind::Timeout);
        assert_eq!(counter.load(Ordering::Relaxed), 3);
        // 1s + 2s of backoff, no sleep after the final attempt
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(3000) && elapsed < Duration::from_millis(3100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_attempt_never_sleeps() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = Arc::clone(&counter);
        let start = Instant::now();

        let result: Result<(), _> = policy(1)
            .execute(|| {
                let c = Arc::clone(&counter_clone);
                async move {
                    c.fetch_add(1, Ordering::Relaxed);
                    Err(ClassifiedError::new(ErrorKind::UpstreamRateLimited))
                }
            })
            .await;

        assert_eq!(result.unwrap_err().kind, ErrorKind::UpstreamRateLimited);
        assert_eq!(counter.load(Ordering::Relaxed), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_builder_and_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.config().max_attempts, 3);
        assert_eq!(policy.config().base_delay, Duration::from_millis(1000));
    }
}
