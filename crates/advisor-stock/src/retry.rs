//! Retry logic with exponential backoff for rate-limited provider calls
//!
//! Fixed attempt count, delay doubling from the base, no jitter and no cap.
//! Only errors carrying a rate-limit signature are retried.

use crate::config::StockConfig;
use crate::error::{Result, StockError};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Retry policy configuration
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, first call included
    pub max_attempts: u32,

    /// Delay before the first retry
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Create a new retry policy
    pub fn new(max_attempts: u32, initial_backoff: Duration) -> Self {
        Self {
            max_attempts,
            initial_backoff,
        }
    }

    /// Build the policy described by a [`StockConfig`]
    pub fn from_config(config: &StockConfig) -> Self {
        Self::new(config.max_retries, config.retry_backoff_base)
    }

    /// Delay before retry number `retry` (0-based): base, 2×base, 4×base, …
    ///
    /// Saturates instead of overflowing for large retry numbers.
    pub fn backoff_duration(&self, retry: u32) -> Duration {
        self.initial_backoff.saturating_mul(2_u32.saturating_pow(retry))
    }

    /// Check if an error is retryable
    fn is_retryable(error: &StockError) -> bool {
        error.is_rate_limited()
    }

    /// Execute an async operation with retry logic
    ///
    /// # Arguments
    ///
    /// * `operation_name` - Name of the operation (for logging)
    /// * `operation` - Async operation to execute
    ///
    /// # Returns
    ///
    /// Result of the operation, or the last error if all attempts fail
    pub async fn execute<F, Fut, T>(&self, operation_name: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!(
                "Attempt {}/{} for operation: {}",
                attempt, self.max_attempts, operation_name
            );

            let error = match operation().await {
                Ok(result) => {
                    if attempt > 1 {
                        debug!(
                            "Operation '{}' succeeded after {} retries",
                            operation_name,
                            attempt - 1
                        );
                    }
                    return Ok(result);
                }
                Err(e) => e,
            };

            if !Self::is_retryable(&error) {
                debug!("Operation '{}' failed with non-retryable error", operation_name);
                return Err(error);
            }

            if attempt >= self.max_attempts {
                warn!(
                    "Operation '{}' failed after {} attempts: {}",
                    operation_name, self.max_attempts, error
                );
                return Err(error);
            }

            let backoff = self.backoff_duration(attempt - 1);
            warn!(
                "Rate limit hit for '{}' (attempt {}/{}), waiting {:?}",
                operation_name, attempt, self.max_attempts, backoff
            );
            sleep(backoff).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn rate_limited() -> StockError {
        StockError::ProviderError("429 Too Many Requests".to_string())
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.initial_backoff, Duration::from_secs(2));
    }

    #[test]
    fn test_backoff_calculation() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_duration(0), Duration::from_secs(2));
        assert_eq!(policy.backoff_duration(1), Duration::from_secs(4));
        assert_eq!(policy.backoff_duration(2), Duration::from_secs(8));
    }

    #[test]
    fn test_backoff_saturates() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_duration(40), Duration::from_secs(2) * u32::MAX);
        assert_eq!(
            RetryPolicy::new(3, Duration::MAX).backoff_duration(1),
            Duration::MAX
        );
    }

    #[test]
    fn test_from_config() {
        let config = StockConfig::default();
        let policy = RetryPolicy::from_config(&config);
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.backoff_duration(0), config.retry_backoff_base);
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_two_rate_limits() {
        let policy = RetryPolicy::default();
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&attempts);
        let started = Instant::now();

        let result = policy
            .execute("quote", || {
                let counter = Arc::clone(&counter);
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(rate_limited())
                    } else {
                        Ok(42)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        // Exactly two delays: 2s then 4s
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(6), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_secs(7), "elapsed {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_third_attempt() {
        let policy = RetryPolicy::default();
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&attempts);
        let started = Instant::now();

        let result: Result<u32> = policy
            .execute("quote", || {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(rate_limited())
                }
            })
            .await;

        assert!(matches!(result, Err(StockError::ProviderError(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        // No sleep after the final attempt
        assert!(started.elapsed() < Duration::from_secs(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_rate_limit_error_is_not_retried() {
        let policy = RetryPolicy::default();
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&attempts);
        let started = Instant::now();

        let result: Result<u32> = policy
            .execute("quote", || {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(StockError::ProviderError("connection refused".to_string()))
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }
}
