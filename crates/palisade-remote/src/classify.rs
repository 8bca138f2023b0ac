//! Failure classification for HTTP dependency outcomes.

use palisade_core::PalisadeError;
use reqwest::StatusCode;

/// Maps a response status to a failure, or `None` for success.
///
/// 5xx, 408 and 429 are transient: the request was fine and may succeed
/// later. Other 4xx are permanent rejections of this request; retrying
/// them only adds load.
#[must_use]
pub fn classify_status(service: &str, status: StatusCode) -> Option<PalisadeError> {
    if status.is_success() {
        return None;
    }

    let message = format!("dependency answered {}", status);
    if status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
    {
        Some(PalisadeError::dependency(service, message))
    } else {
        Some(PalisadeError::rejected(service, message))
    }
}

/// Maps a transport-level error to a failure.
///
/// Timeouts and connection failures are transient. A request that could
/// not even be built is our bug, not the dependency's.
#[must_use]
pub fn classify_error(service: &str, err: &reqwest::Error) -> PalisadeError {
    if err.is_timeout() {
        PalisadeError::timeout(format!("request to {} timed out: {}", service, err))
    } else if err.is_builder() {
        PalisadeError::internal(format!("malformed request to {}: {}", service, err))
    } else {
        PalisadeError::dependency(service, err.to_string())
    }
}
