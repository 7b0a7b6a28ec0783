use std::sync::Arc;

use admin_gateway::notify::Notifier;
use admin_gateway::utils::logger::setup_logger;
use admin_gateway::{ApiRequest, HttpError};
use mockito::Server;
use pretty_assertions::assert_eq;
use reqwest::Method;
use serde_json::Value;

use super::common::{build_gateway, error_envelope, RecordingNotifier};

#[tokio::test]
async fn budget_r_yields_r_plus_one_attempts() {
    setup_logger();
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/api/article/list")
        .with_status(503)
        .with_body(error_envelope(503, "maintenance"))
        .expect(3)
        .create_async()
        .await;

    let (gateway, _session) = build_gateway(&server.url());

    let err = gateway
        .get::<Value>(
            ApiRequest::new(Method::GET, "/api/article/list")
                .with_retries(2)
                .silent(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, HttpError::Server { code: 503, .. }));
    mock.assert_async().await;
}

#[tokio::test]
async fn default_budget_is_zero() {
    setup_logger();
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/api/article/list")
        .with_status(503)
        .with_body(error_envelope(503, "maintenance"))
        .expect(1)
        .create_async()
        .await;

    let (gateway, _session) = build_gateway(&server.url());

    let err = gateway
        .get::<Value>(ApiRequest::new(Method::GET, "/api/article/list").silent())
        .await
        .unwrap_err();

    assert!(matches!(err, HttpError::Server { code: 503, .. }));
    mock.assert_async().await;
}

#[tokio::test]
async fn non_retryable_error_propagates_on_first_occurrence() {
    setup_logger();
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/api/article/999")
        .with_status(200)
        .with_body(error_envelope(404, "article not found"))
        .expect(1)
        .create_async()
        .await;

    let (gateway, _session) = build_gateway(&server.url());

    let err = gateway
        .get::<Value>(
            ApiRequest::new(Method::GET, "/api/article/999")
                .with_retries(3)
                .silent(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, HttpError::Client { code: 404, .. }));
    mock.assert_async().await;
}

#[tokio::test]
async fn unauthorized_never_consumes_retry_budget() {
    setup_logger();
    let mut server = Server::new_async().await;

    // Always 401, and the refresh endpoint also rejects: the request must
    // fail once through the auth path instead of burning retries.
    let data_mock = server
        .mock("GET", "/api/article/list")
        .with_status(401)
        .with_body(error_envelope(401, "token expired"))
        .expect(1)
        .create_async()
        .await;

    server
        .mock("POST", "/api/auth/refresh")
        .with_status(400)
        .with_body(error_envelope(400, "invalid refresh token"))
        .expect(1)
        .create_async()
        .await;

    let recording = RecordingNotifier::new();
    let notifier: Arc<dyn Notifier> = recording.clone();
    let (gateway, session) = build_gateway(&server.url());
    let gateway = gateway.with_notifier(notifier);
    session.set_tokens("expired", "refresh-1");

    let err = gateway
        .get::<Value>(ApiRequest::new(Method::GET, "/api/article/list").with_retries(2))
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
    // The debounced path notified once; the generic error path stayed quiet.
    assert_eq!(recording.error_messages().len(), 1);
    data_mock.assert_async().await;
}
