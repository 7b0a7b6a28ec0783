use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use admin_gateway::notify::Notifier;
use admin_gateway::utils::logger::setup_logger;
use admin_gateway::{ApiRequest, HttpError, TokenRefresher};
use mockito::{Matcher, Server};
use pretty_assertions::assert_eq;
use reqwest::Method;
use serde_json::{json, Value};
use tokio::time::sleep;

use super::common::{build_gateway, envelope, error_envelope, RecordingNotifier};

struct SlowRefresher {
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl TokenRefresher for SlowRefresher {
    async fn refresh(&self, _refresh_token: &str) -> Result<String, HttpError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        sleep(Duration::from_millis(100)).await;
        Ok("fresh".to_string())
    }
}

#[tokio::test]
async fn expired_token_is_refreshed_transparently() {
    setup_logger();
    let mut server = Server::new_async().await;

    // The expired token gets a transport-level 401 ...
    server
        .mock("GET", "/api/article/42")
        .match_header("Authorization", "expired")
        .with_status(401)
        .with_body(error_envelope(401, "token expired"))
        .expect(1)
        .create_async()
        .await;

    // ... the refresh endpoint exchanges the stored refresh token ...
    let refresh_mock = server
        .mock("POST", "/api/auth/refresh")
        .match_body(Matcher::Json(json!({"refreshToken": "refresh-1"})))
        .with_status(200)
        .with_body(envelope(json!({"accessToken": "fresh"})))
        .expect(1)
        .create_async()
        .await;

    // ... and the reissued request carries the new token.
    let retried = server
        .mock("GET", "/api/article/42")
        .match_header("Authorization", "fresh")
        .with_status(200)
        .with_body(envelope(json!({"id": 42, "title": "hello"})))
        .expect(1)
        .create_async()
        .await;

    let (gateway, session) = build_gateway(&server.url());
    session.set_tokens("expired", "refresh-1");

    let article: Value = gateway
        .get(ApiRequest::new(Method::GET, "/api/article/42"))
        .await
        .unwrap();

    assert_eq!(article, json!({"id": 42, "title": "hello"}));
    assert_eq!(gateway.session().access_token().as_deref(), Some("fresh"));
    assert_eq!(
        gateway.session().refresh_token().as_deref(),
        Some("refresh-1")
    );
    refresh_mock.assert_async().await;
    retried.assert_async().await;
}

#[tokio::test]
async fn envelope_level_401_also_triggers_refresh() {
    setup_logger();
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/api/user/profile")
        .match_header("Authorization", "expired")
        .with_status(200)
        .with_body(error_envelope(401, "token expired"))
        .expect(1)
        .create_async()
        .await;

    let refresh_mock = server
        .mock("POST", "/api/auth/refresh")
        .with_status(200)
        .with_body(envelope(json!({"accessToken": "fresh"})))
        .expect(1)
        .create_async()
        .await;

    server
        .mock("GET", "/api/user/profile")
        .match_header("Authorization", "fresh")
        .with_status(200)
        .with_body(envelope(json!({"name": "admin"})))
        .expect(1)
        .create_async()
        .await;

    let (gateway, session) = build_gateway(&server.url());
    session.set_tokens("expired", "refresh-1");

    let profile: Value = gateway
        .get(ApiRequest::new(Method::GET, "/api/user/profile"))
        .await
        .unwrap();

    assert_eq!(profile, json!({"name": "admin"}));
    refresh_mock.assert_async().await;
}

#[tokio::test]
async fn concurrent_unauthorized_requests_share_one_refresh() {
    setup_logger();
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/api/article/list")
        .match_header("Authorization", "expired")
        .with_status(401)
        .with_body(error_envelope(401, "token expired"))
        .expect_at_least(1)
        .create_async()
        .await;

    let succeeded = server
        .mock("GET", "/api/article/list")
        .match_header("Authorization", "fresh")
        .with_status(200)
        .with_body(envelope(json!({"total": 5})))
        .expect(3)
        .create_async()
        .await;

    let refresher = Arc::new(SlowRefresher {
        calls: AtomicUsize::new(0),
    });
    let (gateway, session) = build_gateway(&server.url());
    let gateway = Arc::new(gateway.with_refresher(refresher.clone()));
    session.set_tokens("expired", "refresh-1");

    let mut handles = Vec::new();
    for _ in 0..3 {
        let gateway = Arc::clone(&gateway);
        handles.push(tokio::spawn(async move {
            gateway
                .get::<Value>(ApiRequest::new(Method::GET, "/api/article/list"))
                .await
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), json!({"total": 5}));
    }

    assert_eq!(refresher.calls.load(Ordering::SeqCst), 1);
    succeeded.assert_async().await;
}

#[tokio::test]
async fn failed_refresh_rejects_and_debounces_logout() {
    setup_logger();
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/api/article/list")
        .with_status(401)
        .with_body(error_envelope(401, "token expired"))
        .expect_at_least(1)
        .create_async()
        .await;

    server
        .mock("POST", "/api/auth/refresh")
        .with_status(400)
        .with_body(error_envelope(400, "invalid refresh token"))
        .expect_at_least(1)
        .create_async()
        .await;

    let recording = RecordingNotifier::new();
    let notifier: Arc<dyn Notifier> = recording.clone();
    let (gateway, session) = build_gateway(&server.url());
    let gateway = gateway.with_notifier(notifier);
    session.set_tokens("expired", "refresh-1");

    let first = gateway
        .get::<Value>(ApiRequest::new(Method::GET, "/api/article/list"))
        .await
        .unwrap_err();
    assert!(first.is_unauthorized());

    // A second unauthorized event inside the debounce window adds nothing.
    let second = gateway
        .get::<Value>(ApiRequest::new(Method::GET, "/api/article/list"))
        .await
        .unwrap_err();
    assert!(second.is_unauthorized());

    assert_eq!(recording.error_messages().len(), 1);

    // Logout is dispatched after the settle delay.
    sleep(Duration::from_millis(60)).await;
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn missing_refresh_token_rejects_without_refresh_call() {
    setup_logger();
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/api/article/list")
        .with_status(401)
        .with_body(error_envelope(401, "token expired"))
        .expect(1)
        .create_async()
        .await;

    let refresh_mock = server
        .mock("POST", "/api/auth/refresh")
        .expect(0)
        .create_async()
        .await;

    let (gateway, _session) = build_gateway(&server.url());

    let err = gateway
        .get::<Value>(ApiRequest::new(Method::GET, "/api/article/list"))
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(err.to_string(), "no refresh token available");
    refresh_mock.assert_async().await;
}
