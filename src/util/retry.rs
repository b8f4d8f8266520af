//! Bounded retry with exponential backoff for completion calls.

use std::future::Future;
use std::time::Duration;

use crate::error::InventoryError;

/// How often and how patiently a failed completion call is retried.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay before attempt `attempt + 1`, honoring a server-provided
    /// retry-after when it is longer than the computed backoff.
    pub fn backoff_for(&self, attempt: u32, error: &InventoryError) -> Duration {
        let exp = self.multiplier.powi(attempt as i32);
        let computed = self.initial_backoff.mul_f64(exp).min(self.max_backoff);
        match error {
            InventoryError::RateLimited {
                retry_after_ms: Some(ms),
            } => computed.max(Duration::from_millis(*ms)).min(self.max_backoff),
            _ => computed,
        }
    }

    /// Run `operation` until it succeeds, fails with a non-retryable error,
    /// or attempts run out. The last error is returned.
    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> Result<T, InventoryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, InventoryError>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_retryable() || attempt + 1 >= attempts => return Err(e),
                Err(e) => {
                    let delay = self.backoff_for(attempt, &e);
                    tracing::warn!(
                        attempt = attempt + 1,
                        max_attempts = attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "completion call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
