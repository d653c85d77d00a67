use backoff::{backoff::Backoff, Error as BackoffError, ExponentialBackoff, ExponentialBackoffBuilder};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tracing::{error, warn};

use crate::config::RetryConfig;

/// Retry policy configuration
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_retries: u32,
    pub initial_interval: Duration,
    pub max_interval: Duration,
    pub multiplier: f64,
    pub randomization_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_interval: Duration::from_secs(2),
            max_interval: Duration::from_secs(10),
            multiplier: 2.0,
            randomization_factor: 0.25,
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries.max(1),
            initial_interval: Duration::from_millis(config.initial_interval_ms),
            max_interval: Duration::from_millis(config.max_interval_ms),
            ..Default::default()
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    /// Policy without waits between attempts
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            initial_interval: Duration::from_millis(1),
            max_interval: Duration::from_millis(1),
            multiplier: 1.0,
            randomization_factor: 0.0,
        }
    }

    pub fn to_exponential_backoff(&self) -> ExponentialBackoff {
        let mut backoff = ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_interval)
            .with_max_interval(self.max_interval)
            .with_multiplier(self.multiplier)
            .with_randomization_factor(self.randomization_factor)
            .with_max_elapsed_time(None)
            .build();
        backoff.reset();
        backoff
    }

    /// Retry an async operation with exponential backoff.
    ///
    /// The operation runs at most `max_retries` times; the last error is
    /// returned once the attempts are used up.
    pub async fn retry_async<F, Fut, T, E>(&self, operation_name: &str, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let max_attempts = self.max_retries.max(1);
        let attempts = AtomicU32::new(0);

        let retry_operation = || {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            let fut = operation();
            async move {
                match fut.await {
                    Ok(result) => Ok(result),
                    Err(e) if attempt >= max_attempts => {
                        error!(
                            "{} failed after {} attempts: {}",
                            operation_name, attempt, e
                        );
                        Err(BackoffError::permanent(e))
                    }
                    Err(e) => {
                        warn!(
                            "{} failed on attempt {}/{}, will retry: {}",
                            operation_name, attempt, max_attempts, e
                        );
                        Err(BackoffError::transient(e))
                    }
                }
            }
        };

        backoff::future::retry(self.to_exponential_backoff(), retry_operation).await
    }
}
