// Conflict retry logic for store transactions
use crate::application::constants::{
    DEFAULT_BACKOFF_FACTOR, DEFAULT_MAX_COMMIT_ATTEMPTS, DEFAULT_RETRY_BASE_DELAY_MS,
    JITTER_MAX, JITTER_MIN, MAX_RETRY_DELAY_MS,
};
use crate::error::{AppError, Result};
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Retry policy for transactions that lost a race against another writer
///
/// Every attempt re-runs the whole transaction, so keys are always
/// recomputed from a fresh read. Any error other than
/// `AppError::Conflict` is returned immediately.
#[derive(Debug, Clone, PartialEq)]
pub struct ConflictRetryPolicy {
    max_attempts: u32,
    base_delay_ms: u64,
    backoff_factor: f64,
}

impl ConflictRetryPolicy {
    /// Create a new retry policy
    ///
    /// # Arguments
    /// * `max_attempts` - Total attempts including the first (at least 1)
    /// * `base_delay_ms` - Delay before the first retry; 0 retries immediately
    pub fn new(max_attempts: u32, base_delay_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay_ms,
            backoff_factor: DEFAULT_BACKOFF_FACTOR,
        }
    }

    pub fn with_backoff_factor(mut self, backoff_factor: f64) -> Self {
        self.backoff_factor = backoff_factor.max(1.0);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay after the given failed attempt (1-based)
    ///
    /// delay = base_delay * (backoff_factor ^ (attempt - 1)) * jitter, with
    /// jitter drawn per call from [0.5, 1.5) and the result capped at
    /// `MAX_RETRY_DELAY_MS`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if self.base_delay_ms == 0 {
            return Duration::ZERO;
        }

        let exponent = attempt.saturating_sub(1).min(16) as i32;
        let base = self.base_delay_ms as f64 * self.backoff_factor.powi(exponent);

        // Fresh draw per writer so contenders stop retrying in lockstep
        let jitter = rand::thread_rng().gen_range(JITTER_MIN..JITTER_MAX);

        let delay_ms = ((base * jitter) as u64).min(MAX_RETRY_DELAY_MS);
        Duration::from_millis(delay_ms)
    }

    /// Run `attempt_fn` until it stops reporting conflicts
    ///
    /// Returns `AppError::Transient` once `max_attempts` conflicting
    /// attempts have been made.
    pub async fn run<T, F, Fut>(
        &self,
        operation: &'static str,
        queue: &str,
        mut attempt_fn: F,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            match attempt_fn().await {
                Err(err) if err.is_conflict() => {
                    if attempt >= self.max_attempts {
                        warn!(
                            operation,
                            queue,
                            attempts = attempt,
                            error = %err,
                            "Conflict retries exhausted"
                        );
                        return Err(AppError::Transient {
                            operation,
                            attempts: attempt,
                        });
                    }

                    let delay = self.delay_for(attempt);
                    warn!(
                        operation,
                        queue,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Store conflict, retrying"
                    );
                    if !delay.is_zero() {
                        sleep(delay).await;
                    }
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}

impl Default for ConflictRetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_COMMIT_ATTEMPTS, DEFAULT_RETRY_BASE_DELAY_MS)
    }
}
