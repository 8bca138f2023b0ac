//! Timeout and cancellation wrappers for async operations.

use palisade_core::PalisadeError;
use std::time::Duration;

/// Wraps an async operation with a timeout.
///
/// Elapsing maps to [`PalisadeError::Timeout`], a transient failure: a
/// dependency that stopped answering in time is a reliability signal.
pub async fn with_timeout<F, Fut, T>(duration: Duration, f: F) -> Result<T, PalisadeError>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<T, PalisadeError>>,
{
    tokio::time::timeout(duration, f())
        .await
        .map_err(|_| PalisadeError::timeout(format!("Operation timed out after {:?}", duration)))?
}

/// Races an operation against a caller-supplied cancellation signal.
///
/// Cancellation maps to [`PalisadeError::Cancelled`], which is neither
/// retried nor counted by circuit breakers — the caller giving up says
/// nothing about the dependency's health. The abandoned operation is
/// dropped, so no shared cache or breaker state is left half-updated.
pub async fn with_cancellation<C, F, Fut, T>(cancel: C, f: F) -> Result<T, PalisadeError>
where
    C: std::future::Future<Output = ()>,
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<T, PalisadeError>>,
{
    let operation = f();
    tokio::select! {
        result = operation => result,
        () = cancel => Err(PalisadeError::cancelled("operation cancelled by caller")),
    }
}

/// Timeout configuration.
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Default timeout duration.
    pub default_timeout: Duration,
    /// Timeout for backing store operations.
    pub store_timeout: Duration,
    /// Timeout for outbound dependency calls.
    pub dependency_timeout: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_secs(30),
            store_timeout: Duration::from_secs(10),
            dependency_timeout: Duration::from_secs(60),
        }
    }
}
