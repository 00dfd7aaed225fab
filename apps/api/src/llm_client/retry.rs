//! Retry policy for completion calls: bounded attempts, exponential backoff,
//! and an explicit predicate for which failures are worth another try.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;

use super::CompletionError;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts including the first. Treated as at least 1.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub retryable: fn(&CompletionError) -> bool,
}

impl Default for RetryPolicy {
    /// Three attempts, 4s then 8s between them, only on rate limiting.
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(4),
            max_delay: Duration::from_secs(10),
            retryable: CompletionError::is_rate_limited,
        }
    }
}

#[derive(Debug, Error)]
pub enum RetryError {
    #[error("Gave up after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        last: CompletionError,
    },

    #[error(transparent)]
    Aborted(CompletionError),
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based), doubling from `base_delay`
    /// and capped at `max_delay`.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, RetryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CompletionError>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if !(self.retryable)(&e) => return Err(RetryError::Aborted(e)),
                Err(e) if attempt >= attempts => {
                    return Err(RetryError::Exhausted { attempts, last: e })
                }
                Err(e) => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        "Completion attempt {}/{} failed ({}), retrying in {:?}",
                        attempt, attempts, e, delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
