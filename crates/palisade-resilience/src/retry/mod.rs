//! Retry policy implementation.

use palisade_core::{Classify, FailureKind};
use std::time::Duration;
use tracing::debug;

/// Retry policy configuration.
///
/// `max_attempts` bounds the total number of calls, including the first.
/// Only failures classified [`FailureKind::Transient`] are retried;
/// permanent failures and cancellations return after a single call.
///
/// Precondition: every retry issues a new real call to the wrapped
/// operation, so the operation must be idempotent.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
    /// Initial delay between attempts.
    pub initial_delay: Duration,
    /// Maximum delay between attempts.
    pub max_delay: Duration,
    /// Multiplier for exponential backoff.
    pub multiplier: f64,
    /// Whether to add jitter to delays.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Creates a new retry policy with the specified max attempts.
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Default::default()
        }
    }

    /// Calculates the delay applied before the given attempt number
    /// (the first attempt is number 0 and has no delay).
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let base_delay =
            self.initial_delay.as_millis() as f64 * self.multiplier.powi(attempt as i32 - 1);
        let delay = Duration::from_millis(base_delay.min(self.max_delay.as_millis() as f64) as u64);

        if self.jitter {
            // Add up to 25% jitter
            let jitter_factor = 1.0 + (rand_simple() * 0.5 - 0.25);
            Duration::from_millis((delay.as_millis() as f64 * jitter_factor) as u64)
        } else {
            delay
        }
    }

    /// Executes a function with retry logic.
    ///
    /// Backoff sleeps suspend only the calling task. Each attempt's
    /// failure is logged with its attempt number so retry storms can be
    /// diagnosed from the logs.
    pub async fn execute<F, Fut, T, E>(&self, mut f: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
        E: Classify + std::fmt::Display,
    {
        let mut last_error = None;

        for attempt in 0..self.max_attempts.max(1) {
            if attempt > 0 {
                let delay = self.delay_for_attempt(attempt);
                debug!("Retry attempt {} after {:?}", attempt, delay);
                tokio::time::sleep(delay).await;
            }

            match f().await {
                Ok(result) => return Ok(result),
                Err(e) => match e.failure_kind() {
                    FailureKind::Transient => {
                        debug!("Attempt {} failed: {}", attempt + 1, e);
                        last_error = Some(e);
                    }
                    FailureKind::Permanent | FailureKind::Cancelled => {
                        debug!("Attempt {} failed without retry: {}", attempt + 1, e);
                        return Err(e);
                    }
                },
            }
        }

        Err(last_error.expect("at least one attempt should have been made"))
    }
}

/// Simple pseudo-random number generator for jitter.
fn rand_simple() -> f64 {
    use std::time::SystemTime;
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .subsec_nanos();
    (nanos % 1000) as f64 / 1000.0
}
