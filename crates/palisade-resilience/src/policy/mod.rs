//! Composed resilience policy: circuit breaker around retry.

use crate::{CircuitBreaker, RetryPolicy};
use palisade_core::{PalisadeError, PalisadeResult};
use std::sync::Arc;

/// Retry and circuit breaking composed into one call wrapper.
///
/// The breaker is outermost: it records one outcome per caller-visible
/// call rather than one per internal retry, and while it is open no
/// retry attempt is made at all. Exhausting the retries therefore counts
/// as a single failure toward the breaker's threshold.
#[derive(Clone)]
pub struct ResiliencePolicy {
    retry: RetryPolicy,
    breaker: Arc<CircuitBreaker>,
}

impl ResiliencePolicy {
    /// Creates a policy from its two halves.
    pub fn new(retry: RetryPolicy, breaker: Arc<CircuitBreaker>) -> Self {
        Self { retry, breaker }
    }

    /// Returns the circuit breaker, e.g. for state inspection.
    #[must_use]
    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }

    /// Returns the retry policy.
    #[must_use]
    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Executes an operation under the composed policy.
    pub async fn execute<F, Fut, T>(&self, op: F) -> PalisadeResult<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = PalisadeResult<T>>,
    {
        let retry = &self.retry;
        self.breaker
            .call(|| retry.execute(op))
            .await
            .map_err(PalisadeError::from)
    }
}
