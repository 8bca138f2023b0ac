//! Guarded HTTP client for one outbound dependency.

use crate::classify::{classify_error, classify_status};
use palisade_core::{PalisadeError, PalisadeResult};
use palisade_resilience::ResiliencePolicy;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Default per-request timeout.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for a named outbound dependency, guarded by a composed
/// resilience policy.
///
/// Every request runs through the policy: transient failures are retried
/// with backoff, and repeated failures open the dependency's circuit
/// breaker. Only idempotent GET requests are exposed, since the policy
/// may issue a request more than once.
pub struct DependencyClient {
    service: String,
    client: Client,
    base_url: String,
    policy: ResiliencePolicy,
}

impl DependencyClient {
    /// Creates a client for the dependency at `base_url`.
    pub fn new(
        service: impl Into<String>,
        base_url: &str,
        policy: ResiliencePolicy,
    ) -> PalisadeResult<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()
            .map_err(|e| PalisadeError::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self::with_client(service, client, base_url, policy))
    }

    /// Creates a client with custom `reqwest` configuration.
    pub fn with_client(
        service: impl Into<String>,
        client: Client,
        base_url: &str,
        policy: ResiliencePolicy,
    ) -> Self {
        Self {
            service: service.into(),
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            policy,
        }
    }

    /// Returns the dependency's name.
    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Returns the composed policy, e.g. for breaker state inspection.
    #[must_use]
    pub fn policy(&self) -> &ResiliencePolicy {
        &self.policy
    }

    /// Fetches a path and returns the response body as text.
    pub async fn get_text(&self, path: &str) -> PalisadeResult<String> {
        let url = self.url(path);
        let url = url.as_str();
        self.policy
            .execute(|| async move {
                let response = self.send(url).await?;
                response
                    .text()
                    .await
                    .map_err(|e| classify_error(&self.service, &e))
            })
            .await
    }

    /// Fetches a path and deserializes the JSON response body.
    pub async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> PalisadeResult<T> {
        let url = self.url(path);
        let url = url.as_str();
        self.policy
            .execute(|| async move {
                let response = self.send(url).await?;
                response
                    .json::<T>()
                    .await
                    .map_err(|e| classify_error(&self.service, &e))
            })
            .await
    }

    async fn send(&self, url: &str) -> PalisadeResult<reqwest::Response> {
        debug!("GET {} ({})", url, self.service);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_error(&self.service, &e))?;

        match classify_status(&self.service, response.status()) {
            Some(err) => Err(err),
            None => Ok(response),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
