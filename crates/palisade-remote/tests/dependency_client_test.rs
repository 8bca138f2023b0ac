//! Integration tests for `DependencyClient` against a mock HTTP server.

use palisade_core::PalisadeError;
use palisade_remote::DependencyClient;
use palisade_resilience::{CircuitBreaker, CircuitBreakerConfig, CircuitState, ResiliencePolicy, RetryPolicy};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn policy(max_attempts: u32, failure_threshold: u32, break_ms: u64) -> ResiliencePolicy {
    let retry = RetryPolicy {
        max_attempts,
        initial_delay: Duration::from_millis(1),
        jitter: false,
        ..Default::default()
    };
    let breaker = Arc::new(CircuitBreaker::new(
        "mock-dependency",
        CircuitBreakerConfig {
            failure_threshold,
            break_duration: Duration::from_millis(break_ms),
        },
    ));
    ResiliencePolicy::new(retry, breaker)
}

#[tokio::test]
async fn test_retry_recovers_after_transient_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("recovered"))
        .mount(&server)
        .await;

    let client = DependencyClient::new("flaky", &server.uri(), policy(3, 10, 60_000)).unwrap();

    assert_eq!(client.get_text("/flaky").await.unwrap(), "recovered");
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_retry_exhaustion_returns_last_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = DependencyClient::new("down", &server.uri(), policy(3, 10, 60_000)).unwrap();

    let result = client.get_text("/down").await;
    assert!(matches!(result, Err(PalisadeError::Dependency { .. })));
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_permanent_rejection_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = DependencyClient::new("missing", &server.uri(), policy(5, 10, 60_000)).unwrap();

    let result = client.get_text("/missing").await;
    assert!(matches!(result, Err(PalisadeError::Rejected { .. })));
}

#[tokio::test]
async fn test_circuit_opens_and_short_circuits() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fail"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = DependencyClient::new("fail", &server.uri(), policy(1, 1, 60_000)).unwrap();

    let result = client.get_text("/fail").await;
    assert!(matches!(result, Err(PalisadeError::Dependency { .. })));
    assert_eq!(client.policy().breaker().state(), CircuitState::Open);

    // Short-circuited: the mock's expect(1) verifies no second request.
    let result = client.get_text("/fail").await;
    assert!(matches!(result, Err(PalisadeError::CircuitOpen(_))));
}

#[tokio::test]
async fn test_probe_closes_circuit_after_cooldown() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/recovering"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/recovering"))
        .respond_with(ResponseTemplate::new(200).set_body_string("back"))
        .mount(&server)
        .await;

    let client = DependencyClient::new("recovering", &server.uri(), policy(1, 1, 100)).unwrap();

    let result = client.get_text("/recovering").await;
    assert!(result.is_err());
    assert_eq!(client.policy().breaker().state(), CircuitState::Open);

    tokio::time::sleep(Duration::from_millis(120)).await;

    assert_eq!(client.get_text("/recovering").await.unwrap(), "back");
    assert_eq!(client.policy().breaker().state(), CircuitState::Closed);
}

#[tokio::test]
async fn test_get_json_deserializes_body() {
    #[derive(serde::Deserialize)]
    struct Person {
        id: u32,
        first_name: String,
    }

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/people/7"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "id": 7, "first_name": "Jim" })),
        )
        .mount(&server)
        .await;

    let client = DependencyClient::new("people", &server.uri(), policy(3, 10, 60_000)).unwrap();

    let person: Person = client.get_json("/people/7").await.unwrap();
    assert_eq!(person.id, 7);
    assert_eq!(person.first_name, "Jim");
}
