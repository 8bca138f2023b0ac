//! Unified error types for all layers of the library.

use thiserror::Error;

/// How a failed operation should be treated by retry and circuit-breaker
/// policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Expected to be temporary (timeout, connection reset, 5xx).
    /// Worth retrying; counted by the circuit breaker.
    Transient,
    /// Will not succeed on retry (4xx rejection, bad configuration).
    /// Never retried; still counted by the circuit breaker.
    Permanent,
    /// The caller aborted the attempt. Neither retried nor counted —
    /// a cancelled call says nothing about the dependency's health.
    Cancelled,
}

/// Classification hook used by the resilience wrappers.
///
/// Implemented for [`PalisadeError`]; custom error types can implement it
/// to reuse the retry and circuit-breaker policies unchanged.
pub trait Classify {
    /// Returns the failure kind driving retry and breaker decisions.
    fn failure_kind(&self) -> FailureKind;

    /// Whether this failure counts toward a circuit breaker's
    /// consecutive-failure threshold.
    fn counts_toward_breaker(&self) -> bool {
        !matches!(self.failure_kind(), FailureKind::Cancelled)
    }
}

/// Unified error type for all layers of Palisade.
#[derive(Error, Debug)]
pub enum PalisadeError {
    // ============ Lookup Outcomes ============
    /// Key absent in the backing store. A valid empty result, surfaced as
    /// an error only where a caller insists on the record existing.
    #[error("Resource not found: {resource_type} with key {key}")]
    NotFound {
        resource_type: &'static str,
        key: String,
    },

    // ============ Infrastructure Errors ============
    /// Backing store connectivity or query failure.
    #[error("Backing store error: {0}")]
    Store(String),

    /// Cache layer failure.
    #[error("Cache error: {0}")]
    Cache(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    // ============ Dependency Errors ============
    /// Transient failure from an outbound dependency.
    #[error("Dependency error: {service} - {message}")]
    Dependency { service: String, message: String },

    /// Permanent rejection from an outbound dependency.
    #[error("Dependency rejected request: {service} - {message}")]
    Rejected { service: String, message: String },

    /// Operation timed out.
    #[error("Operation timed out: {0}")]
    Timeout(String),

    // ============ Resilience Errors ============
    /// Short-circuited by an open circuit breaker. The dependency was not
    /// called at all, which is distinct from the dependency failing.
    #[error("Service unavailable: circuit breaker open for {0}")]
    CircuitOpen(String),

    /// Aborted by a caller-supplied cancellation signal or deadline.
    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    // ============ Internal Errors ============
    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error wrapper.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PalisadeError {
    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Store(_) => "STORE_ERROR",
            Self::Cache(_) => "CACHE_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Dependency { .. } => "DEPENDENCY_ERROR",
            Self::Rejected { .. } => "DEPENDENCY_REJECTED",
            Self::Timeout(_) => "TIMEOUT",
            Self::CircuitOpen(_) => "CIRCUIT_OPEN",
            Self::Cancelled(_) => "CANCELLED",
            Self::Internal(_) | Self::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// Creates a not found error for a resource.
    #[must_use]
    pub fn not_found<T: ToString>(resource_type: &'static str, key: T) -> Self {
        Self::NotFound {
            resource_type,
            key: key.to_string(),
        }
    }

    /// Creates a backing store error.
    #[must_use]
    pub fn store<T: Into<String>>(message: T) -> Self {
        Self::Store(message.into())
    }

    /// Creates a cache error.
    #[must_use]
    pub fn cache<T: Into<String>>(message: T) -> Self {
        Self::Cache(message.into())
    }

    /// Creates a transient dependency error.
    #[must_use]
    pub fn dependency<S: Into<String>, M: Into<String>>(service: S, message: M) -> Self {
        Self::Dependency {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Creates a permanent dependency rejection.
    #[must_use]
    pub fn rejected<S: Into<String>, M: Into<String>>(service: S, message: M) -> Self {
        Self::Rejected {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Creates a timeout error.
    #[must_use]
    pub fn timeout<T: Into<String>>(message: T) -> Self {
        Self::Timeout(message.into())
    }

    /// Creates a cancellation error.
    #[must_use]
    pub fn cancelled<T: Into<String>>(message: T) -> Self {
        Self::Cancelled(message.into())
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn configuration<T: Into<String>>(message: T) -> Self {
        Self::Configuration(message.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal(message.into())
    }

    /// Checks if this error is worth retrying.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(
            self,
            Self::Store(_) | Self::Cache(_) | Self::Dependency { .. } | Self::Timeout(_)
        )
    }

    /// Checks if this error should count toward a circuit breaker's
    /// failure threshold.
    ///
    /// Permanent dependency rejections count: a dependency answering every
    /// request with 4xx is unhealthy and worth isolating. Open-circuit
    /// rejections and cancellations do not — neither involved a real call.
    #[must_use]
    pub const fn should_trip_circuit_breaker(&self) -> bool {
        matches!(
            self,
            Self::Store(_) | Self::Dependency { .. } | Self::Rejected { .. } | Self::Timeout(_)
        )
    }
}

impl Classify for PalisadeError {
    fn failure_kind(&self) -> FailureKind {
        match self {
            Self::Store(_) | Self::Cache(_) | Self::Dependency { .. } | Self::Timeout(_) => {
                FailureKind::Transient
            }
            Self::Cancelled(_) => FailureKind::Cancelled,
            _ => FailureKind::Permanent,
        }
    }

    fn counts_toward_breaker(&self) -> bool {
        self.should_trip_circuit_breaker()
    }
}

impl From<serde_json::Error> for PalisadeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON serialization error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(PalisadeError::not_found("Person", 1).error_code(), "NOT_FOUND");
        assert_eq!(PalisadeError::store("connection lost").error_code(), "STORE_ERROR");
        assert_eq!(PalisadeError::cache("shard poisoned").error_code(), "CACHE_ERROR");
        assert_eq!(
            PalisadeError::dependency("billing", "503").error_code(),
            "DEPENDENCY_ERROR"
        );
        assert_eq!(
            PalisadeError::rejected("billing", "404").error_code(),
            "DEPENDENCY_REJECTED"
        );
        assert_eq!(PalisadeError::timeout("30s elapsed").error_code(), "TIMEOUT");
        assert_eq!(
            PalisadeError::CircuitOpen("billing".to_string()).error_code(),
            "CIRCUIT_OPEN"
        );
        assert_eq!(PalisadeError::cancelled("caller gave up").error_code(), "CANCELLED");
        assert_eq!(PalisadeError::internal("oops").error_code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_retriable_errors() {
        assert!(PalisadeError::store("connection lost").is_retriable());
        assert!(PalisadeError::dependency("billing", "503").is_retriable());
        assert!(PalisadeError::timeout("request timed out").is_retriable());
        assert!(!PalisadeError::not_found("Person", 1).is_retriable());
        assert!(!PalisadeError::rejected("billing", "404").is_retriable());
        assert!(!PalisadeError::cancelled("aborted").is_retriable());
        assert!(!PalisadeError::CircuitOpen("billing".to_string()).is_retriable());
    }

    #[test]
    fn test_failure_kinds() {
        assert_eq!(
            PalisadeError::dependency("billing", "503").failure_kind(),
            FailureKind::Transient
        );
        assert_eq!(
            PalisadeError::rejected("billing", "404").failure_kind(),
            FailureKind::Permanent
        );
        assert_eq!(
            PalisadeError::cancelled("aborted").failure_kind(),
            FailureKind::Cancelled
        );
        assert_eq!(
            PalisadeError::CircuitOpen("billing".to_string()).failure_kind(),
            FailureKind::Permanent
        );
    }

    #[test]
    fn test_circuit_breaker_counting() {
        assert!(PalisadeError::dependency("billing", "503").counts_toward_breaker());
        assert!(PalisadeError::rejected("billing", "404").counts_toward_breaker());
        assert!(PalisadeError::timeout("elapsed").counts_toward_breaker());
        assert!(!PalisadeError::cancelled("aborted").counts_toward_breaker());
        assert!(!PalisadeError::CircuitOpen("billing".to_string()).counts_toward_breaker());
        assert!(!PalisadeError::not_found("Person", 1).counts_toward_breaker());
    }

    #[test]
    fn test_error_constructors() {
        let not_found = PalisadeError::not_found("Person", "123");
        assert!(not_found.to_string().contains("Person"));

        let dependency = PalisadeError::dependency("billing", "connection reset");
        assert!(dependency.to_string().contains("connection reset"));

        let cancelled = PalisadeError::cancelled("deadline passed");
        assert!(cancelled.to_string().contains("deadline passed"));
    }
}
