//! Circuit breaker implementation.

use palisade_core::{Classify, PalisadeError};
use parking_lot::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Circuit breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Circuit is closed - requests are allowed.
    Closed,
    /// Circuit is open - requests are rejected.
    Open,
    /// Circuit is half-open - a single probe request is allowed.
    HalfOpen,
}

/// Circuit breaker configuration.
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Number of consecutive failures before opening the circuit.
    pub failure_threshold: u32,
    /// Duration to keep the circuit open before admitting a probe.
    pub break_duration: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            break_duration: Duration::from_secs(30),
        }
    }
}

/// Everything the breaker mutates, guarded by one lock so a counter
/// increment and the transition it triggers are a single atomic step.
struct BreakerInner {
    state: CircuitState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
    /// Set while a half-open probe is in flight.
    probe_started_at: Option<Instant>,
}

/// The kind of admission a call was granted.
#[derive(Debug, Clone, Copy)]
enum Permit {
    /// Normal closed-state execution.
    Normal,
    /// The single half-open trial call.
    Probe,
}

/// Circuit breaker for protecting against cascading failures.
///
/// Closed until `failure_threshold` consecutive counted failures, then
/// open for `break_duration`, rejecting calls without invoking the
/// operation. The open-to-half-open transition is a lazy check on the
/// next call; half-open admits exactly one probe whose outcome decides
/// between closing and reopening.
pub struct CircuitBreaker {
    name: String,
    inner: Mutex<BreakerInner>,
    config: CircuitBreakerConfig,
}

impl CircuitBreaker {
    /// Creates a new circuit breaker.
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            inner: Mutex::new(BreakerInner {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                opened_at: None,
                probe_started_at: None,
            }),
            config,
        }
    }

    /// Creates a new circuit breaker with default configuration.
    pub fn with_defaults(name: impl Into<String>) -> Self {
        Self::new(name, CircuitBreakerConfig::default())
    }

    /// Returns the current state of the circuit breaker.
    pub fn state(&self) -> CircuitState {
        self.inner.lock().state
    }

    /// Returns the name of the circuit breaker.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Executes a function with circuit breaker protection.
    ///
    /// When the circuit is open the function is not invoked at all and
    /// the caller receives [`CircuitBreakerError::Open`] — distinct from
    /// the dependency itself failing.
    pub async fn call<F, Fut, T, E>(&self, f: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
        E: Classify,
    {
        let Some(permit) = self.try_acquire() else {
            return Err(CircuitBreakerError::Open(self.name.clone()));
        };

        match f().await {
            Ok(result) => {
                self.record_success(permit);
                Ok(result)
            }
            Err(e) => {
                self.record_failure(permit, &e);
                Err(CircuitBreakerError::Failure(e))
            }
        }
    }

    /// Decides whether a call may proceed, performing any lazy
    /// open-to-half-open transition.
    fn try_acquire(&self) -> Option<Permit> {
        let mut inner = self.inner.lock();
        match inner.state {
            CircuitState::Closed => Some(Permit::Normal),
            CircuitState::Open => {
                let opened_at = inner.opened_at?;
                if opened_at.elapsed() >= self.config.break_duration {
                    inner.state = CircuitState::HalfOpen;
                    inner.probe_started_at = Some(Instant::now());
                    debug!("Circuit breaker '{}' half-open, admitting probe", self.name);
                    Some(Permit::Probe)
                } else {
                    None
                }
            }
            CircuitState::HalfOpen => match inner.probe_started_at {
                None => {
                    inner.probe_started_at = Some(Instant::now());
                    Some(Permit::Probe)
                }
                // A probe whose caller went away can be reclaimed once it
                // has been silent for a full break duration.
                Some(started) if started.elapsed() >= self.config.break_duration => {
                    inner.probe_started_at = Some(Instant::now());
                    Some(Permit::Probe)
                }
                Some(_) => None,
            },
        }
    }

    /// Records a successful call.
    fn record_success(&self, permit: Permit) {
        let mut inner = self.inner.lock();
        match inner.state {
            CircuitState::Closed => {
                inner.consecutive_failures = 0;
            }
            CircuitState::HalfOpen => {
                if matches!(permit, Permit::Probe) {
                    inner.state = CircuitState::Closed;
                    inner.consecutive_failures = 0;
                    inner.opened_at = None;
                    inner.probe_started_at = None;
                    debug!("Circuit breaker '{}' closed after successful probe", self.name);
                }
            }
            // A call admitted before the circuit opened finished late;
            // resetting an open breaker from it would be incoherent.
            CircuitState::Open => {}
        }
    }

    /// Records a failed call.
    fn record_failure<E: Classify>(&self, permit: Permit, error: &E) {
        let mut inner = self.inner.lock();

        if !error.counts_toward_breaker() {
            // A cancelled attempt is no reliability signal; just release
            // the probe so another caller can try.
            if matches!(permit, Permit::Probe) && inner.state == CircuitState::HalfOpen {
                inner.probe_started_at = None;
            }
            return;
        }

        match inner.state {
            CircuitState::Closed => {
                inner.consecutive_failures += 1;
                if inner.consecutive_failures >= self.config.failure_threshold {
                    inner.state = CircuitState::Open;
                    inner.opened_at = Some(Instant::now());
                    warn!(
                        "Circuit breaker '{}' opened after {} consecutive failures",
                        self.name, inner.consecutive_failures
                    );
                }
            }
            CircuitState::HalfOpen => {
                if matches!(permit, Permit::Probe) {
                    inner.state = CircuitState::Open;
                    inner.opened_at = Some(Instant::now());
                    inner.probe_started_at = None;
                    warn!(
                        "Circuit breaker '{}' reopened after failed probe",
                        self.name
                    );
                }
            }
            // A late failure from a call admitted earlier; the break
            // timer is already running.
            CircuitState::Open => {}
        }
    }

    /// Manually resets the circuit breaker to closed state.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.state = CircuitState::Closed;
        inner.consecutive_failures = 0;
        inner.opened_at = None;
        inner.probe_started_at = None;
        debug!("Circuit breaker '{}' manually reset", self.name);
    }
}

/// Error type for circuit breaker operations.
#[derive(Debug)]
pub enum CircuitBreakerError<E> {
    /// Circuit is open, request was rejected without calling the
    /// operation.
    Open(String),
    /// The underlying operation failed.
    Failure(E),
}

impl<E: std::fmt::Display> std::fmt::Display for CircuitBreakerError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open(name) => write!(f, "Circuit breaker '{}' is open", name),
            Self::Failure(e) => write!(f, "Operation failed: {}", e),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for CircuitBreakerError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Open(_) => None,
            Self::Failure(e) => Some(e),
        }
    }
}

impl From<CircuitBreakerError<PalisadeError>> for PalisadeError {
    fn from(err: CircuitBreakerError<PalisadeError>) -> Self {
        match err {
            CircuitBreakerError::Open(name) => PalisadeError::CircuitOpen(name),
            CircuitBreakerError::Failure(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palisade_core::PalisadeError;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn config(failure_threshold: u32, break_ms: u64) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold,
            break_duration: Duration::from_millis(break_ms),
        }
    }

    async fn fail(cb: &CircuitBreaker) -> Result<i32, CircuitBreakerError<PalisadeError>> {
        cb.call(|| async { Err(PalisadeError::dependency("remote", "503")) })
            .await
    }

    async fn succeed(cb: &CircuitBreaker) -> Result<i32, CircuitBreakerError<PalisadeError>> {
        cb.call(|| async { Ok::<_, PalisadeError>(42) }).await
    }

    #[tokio::test]
    async fn test_circuit_breaker_initial_state() {
        let cb = CircuitBreaker::with_defaults("test");
        assert_eq!(cb.state(), CircuitState::Closed);
        assert_eq!(cb.name(), "test");
    }

    #[tokio::test]
    async fn test_circuit_breaker_closed_success() {
        let cb = CircuitBreaker::with_defaults("test");
        assert_eq!(succeed(&cb).await.unwrap(), 42);
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_circuit_breaker_opens_on_threshold() {
        let cb = CircuitBreaker::new("test", config(2, 1000));

        let _ = fail(&cb).await;
        assert_eq!(cb.state(), CircuitState::Closed);

        let _ = fail(&cb).await;
        assert_eq!(cb.state(), CircuitState::Open);

        // Rejected without touching the operation.
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();
        let result = cb
            .call(|| {
                let calls = calls_clone.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, PalisadeError>(42)
                }
            })
            .await;
        assert!(matches!(result, Err(CircuitBreakerError::Open(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_success_resets_consecutive_failures() {
        let cb = CircuitBreaker::new("test", config(2, 1000));

        let _ = fail(&cb).await;
        let _ = succeed(&cb).await;
        let _ = fail(&cb).await;
        // Two failures total, but never two consecutive.
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_probe_success_closes_circuit() {
        let cb = CircuitBreaker::new("test", config(1, 50));

        let _ = fail(&cb).await;
        assert_eq!(cb.state(), CircuitState::Open);

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(succeed(&cb).await.unwrap(), 42);
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_probe_failure_reopens_circuit() {
        let cb = CircuitBreaker::new("test", config(1, 50));

        let _ = fail(&cb).await;
        tokio::time::sleep(Duration::from_millis(60)).await;
        let _ = fail(&cb).await;
        assert_eq!(cb.state(), CircuitState::Open);

        // The break timer restarted on the failed probe.
        let result = succeed(&cb).await;
        assert!(matches!(result, Err(CircuitBreakerError::Open(_))));
    }

    #[tokio::test]
    async fn test_half_open_admits_single_probe() {
        let cb = Arc::new(CircuitBreaker::new("test", config(1, 50)));

        let _ = fail(&cb).await;
        tokio::time::sleep(Duration::from_millis(60)).await;

        let slow_probe = {
            let cb = cb.clone();
            tokio::spawn(async move {
                cb.call(|| async {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Ok::<_, PalisadeError>(42)
                })
                .await
            })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        // While the probe is in flight, other callers are rejected.
        let result = succeed(&cb).await;
        assert!(matches!(result, Err(CircuitBreakerError::Open(_))));

        assert_eq!(slow_probe.await.unwrap().unwrap(), 42);
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_cancelled_outcome_is_not_counted() {
        let cb = CircuitBreaker::new("test", config(1, 1000));

        let result = cb
            .call(|| async { Err::<i32, _>(PalisadeError::cancelled("caller aborted")) })
            .await;
        assert!(matches!(result, Err(CircuitBreakerError::Failure(_))));
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_cancelled_probe_releases_slot() {
        let cb = CircuitBreaker::new("test", config(1, 50));

        let _ = fail(&cb).await;
        tokio::time::sleep(Duration::from_millis(60)).await;

        let result = cb
            .call(|| async { Err::<i32, _>(PalisadeError::cancelled("caller aborted")) })
            .await;
        assert!(matches!(result, Err(CircuitBreakerError::Failure(_))));
        assert_eq!(cb.state(), CircuitState::HalfOpen);

        // The slot freed up immediately; the next call is the new probe.
        assert_eq!(succeed(&cb).await.unwrap(), 42);
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_permanent_failure_counts_toward_threshold() {
        let cb = CircuitBreaker::new("test", config(1, 1000));

        let result = cb
            .call(|| async { Err::<i32, _>(PalisadeError::rejected("remote", "404")) })
            .await;
        assert!(matches!(result, Err(CircuitBreakerError::Failure(_))));
        assert_eq!(cb.state(), CircuitState::Open);
    }

    #[tokio::test]
    async fn test_break_scenario_threshold_one() {
        // Fail -> Open; early call short-circuits; post-break success
        // closes; the next failure opens again.
        let cb = CircuitBreaker::new("demo", config(1, 50));

        let _ = fail(&cb).await;
        assert_eq!(cb.state(), CircuitState::Open);

        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();
        let result = cb
            .call(|| {
                let calls = calls_clone.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, PalisadeError>(1)
                }
            })
            .await;
        assert!(matches!(result, Err(CircuitBreakerError::Open(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(succeed(&cb).await.unwrap(), 42);
        assert_eq!(cb.state(), CircuitState::Closed);

        let _ = fail(&cb).await;
        assert_eq!(cb.state(), CircuitState::Open);
    }

    #[tokio::test]
    async fn test_manual_reset() {
        let cb = CircuitBreaker::new("test", config(1, 60_000));

        let _ = fail(&cb).await;
        assert_eq!(cb.state(), CircuitState::Open);

        cb.reset();
        assert_eq!(cb.state(), CircuitState::Closed);
        assert_eq!(succeed(&cb).await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_circuit_breaker_config_default() {
        let config = CircuitBreakerConfig::default();
        assert_eq!(config.failure_threshold, 5);
        assert!(config.break_duration.as_secs() > 0);
    }
}
