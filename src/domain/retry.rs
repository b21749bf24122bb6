//! Bounded retry with exponential backoff for transient backend errors

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::{debug, warn};

use super::DomainError;

/// Retry configuration for calls to external backends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Initial delay before first retry
    pub initial_delay_ms: u64,
    /// Maximum delay between retries
    pub max_delay_ms: u64,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
    /// Randomize each delay between half and the full computed value
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 100,
            max_delay_ms: 5000,
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    /// Single attempt, no retries
    pub fn disabled() -> Self {
        Self::new(0)
    }

    pub fn with_initial_delay(mut self, ms: u64) -> Self {
        self.initial_delay_ms = ms;
        self
    }

    pub fn with_max_delay(mut self, ms: u64) -> Self {
        self.max_delay_ms = ms;
        self
    }

    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Calculate delay for a given attempt number (0-indexed), before jitter
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::from_millis(self.initial_delay_ms.min(self.max_delay_ms));
        }

        let delay = self.initial_delay_ms as f64 * self.backoff_multiplier.powi(attempt as i32);
        let delay_ms = delay.min(self.max_delay_ms as f64) as u64;

        Duration::from_millis(delay_ms)
    }

    fn sleep_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self.delay_for_attempt(attempt);

        if !self.jitter || delay.is_zero() {
            return delay;
        }

        let factor = rand::thread_rng().gen_range(0.5..=1.0);
        delay.mul_f64(factor)
    }
}

/// Runs `operation` until it succeeds, fails with a non-transient error, or
/// the retry budget is spent
pub async fn with_retry<T, F, Fut>(
    config: &RetryConfig,
    operation: &str,
    mut f: F,
) -> Result<T, DomainError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DomainError>>,
{
    let max_attempts = config.max_retries + 1;
    let mut attempt = 0;

    loop {
        match f().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!(operation, attempts = attempt + 1, "Operation succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) if e.is_transient() && attempt + 1 < max_attempts => {
                let delay = config.sleep_for_attempt(attempt);
                warn!(
                    operation,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Transient failure, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Bounds a single call with a deadline
pub async fn with_timeout<T, Fut>(
    limit: Duration,
    operation: &str,
    future: Fut,
) -> Result<T, DomainError>
where
    Fut: Future<Output = Result<T, DomainError>>,
{
    match timeout(limit, future).await {
        Ok(result) => result,
        Err(_) => Err(DomainError::timeout(operation, limit.as_millis() as u64)),
    }
}
