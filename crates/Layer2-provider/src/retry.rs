//! Retry logic with exponential backoff

use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (after the first call)
    pub max_retries: u32,

    /// Initial delay between retries (milliseconds)
    pub initial_delay_ms: u64,

    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,

    /// Maximum delay between retries (milliseconds)
    pub max_delay_ms: u64,

    /// Whether to add jitter to prevent thundering herd
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay_ms: 2000,
            backoff_multiplier: 2.0,
            max_delay_ms: 30000,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Create a config with no retries
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Config bounded by a total attempt count (first call included)
    pub fn from_attempts(max_attempts: u32) -> Self {
        Self {
            max_retries: max_attempts.max(1) - 1,
            ..Default::default()
        }
    }

    /// Total attempts this config allows
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// Calculate delay for a given attempt (0-indexed)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base_delay =
            self.initial_delay_ms as f64 * self.backoff_multiplier.powi(attempt as i32);

        let capped_delay = base_delay.min(self.max_delay_ms as f64);

        let final_delay = if self.jitter {
            // 20% jitter (0.8 to 1.2)
            capped_delay * rand::thread_rng().gen_range(0.8..1.2)
        } else {
            capped_delay
        };

        Duration::from_millis(final_delay as u64)
    }
}

/// Error classification for retry decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryClassification {
    /// Should retry (transient error)
    Retry,

    /// Should not retry (permanent error)
    NoRetry,

    /// Rate limited - use provided delay if available
    RateLimited { retry_after_ms: Option<u64> },
}

/// Trait for errors that can be classified for retry
pub trait RetryableError {
    fn classify(&self) -> RetryClassification;
}

/// Execute an async operation with retry logic
///
/// Returns the last error once retries are exhausted or a non-retryable
/// error is seen.
pub async fn with_retry<T, E, F, Fut>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
) -> Result<T, E>
where
    E: RetryableError + std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
{
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                let classification = e.classify();

                match classification {
                    RetryClassification::NoRetry => {
                        debug!(
                            "{}: non-retryable error on attempt {}: {}",
                            operation_name,
                            attempt + 1,
                            e
                        );
                        return Err(e);
                    }
                    RetryClassification::Retry | RetryClassification::RateLimited { .. } => {
                        if attempt >= config.max_retries {
                            warn!(
                                "{}: giving up after {} attempts: {}",
                                operation_name,
                                attempt + 1,
                                e
                            );
                            return Err(e);
                        }

                        let delay = match classification {
                            RetryClassification::RateLimited {
                                retry_after_ms: Some(ms),
                            } => Duration::from_millis(ms.min(config.max_delay_ms)),
                            _ => config.delay_for_attempt(attempt),
                        };

                        warn!(
                            "{}: attempt {} failed, retrying in {:?}: {}",
                            operation_name,
                            attempt + 1,
                            delay,
                            e
                        );

                        sleep(delay).await;
                        attempt += 1;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProviderError;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast(max_retries: u32) -> RetryConfig {
        RetryConfig {
            max_retries,
            initial_delay_ms: 1,
            max_delay_ms: 5,
            jitter: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_delay_calculation() {
        let config = RetryConfig {
            initial_delay_ms: 1000,
            backoff_multiplier: 2.0,
            max_delay_ms: 30000,
            jitter: false,
            ..Default::default()
        };

        assert_eq!(config.delay_for_attempt(0), Duration::from_millis(1000));
        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(2000));
        assert_eq!(config.delay_for_attempt(2), Duration::from_millis(4000));
        assert_eq!(config.delay_for_attempt(5), Duration::from_millis(30000)); // capped
    }

    #[test]
    fn test_from_attempts() {
        assert_eq!(RetryConfig::from_attempts(3).max_retries, 2);
        assert_eq!(RetryConfig::from_attempts(0).max_attempts(), 1);
    }

    #[tokio::test]
    async fn test_transient_errors_exhaust_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), ProviderError> = with_retry(&fast(2), "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(ProviderError::Timeout(1)) }
        })
        .await;

        assert_eq!(result, Err(ProviderError::Timeout(1)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_error_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), ProviderError> = with_retry(&fast(2), "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(ProviderError::Authentication("401".into())) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failure() {
        let calls = AtomicU32::new(0);
        let result = with_retry(&fast(2), "test", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(ProviderError::RateLimited {
                        retry_after_ms: Some(1),
                    })
                } else {
                    Ok("text")
                }
            }
        })
        .await;

        assert_eq!(result, Ok("text"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
