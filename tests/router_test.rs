mod common;

use plane_mcp_server::auth::SessionStore;
use plane_mcp_server::plane::{ApiVersion, AuthMode};
use plane_mcp_server::{classify, Config, PlaneClient, PlaneError};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio_test::assert_ok;
use wiremock::matchers::{body_json, header, header_regex, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const PAGES_PATH: &str = "workspaces/acme/projects/p1/pages/";

fn client_for(server: &MockServer, api_key: Option<&str>) -> (PlaneClient, Arc<SessionStore>) {
    let mut config = Config::new(&server.uri()).unwrap();
    if let Some(key) = api_key {
        config = config.with_api_key(key);
    }
    let session = Arc::new(SessionStore::new().with_verification(false));
    let client = PlaneClient::new(&config, Arc::clone(&session)).unwrap();
    (client, session)
}

fn no_body(req: &Request) -> bool {
    req.body.is_empty() && !req.headers.contains_key("content-type")
}

/// Classification depends on nothing but the path
#[test]
fn test_classification_of_pages_and_non_pages() {
    let pages = classify(PAGES_PATH);
    assert_eq!(pages.auth, AuthMode::Session);
    assert_eq!(pages.version, ApiVersion::Unversioned);

    let issues = classify("workspaces/acme/projects/p1/issues/");
    assert_eq!(issues.auth, AuthMode::ApiKey);
    assert_eq!(issues.version, ApiVersion::V1);
}

/// API-key routes go to /api/v1/ with the configured key
#[tokio::test]
async fn test_api_key_route_sends_key() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/users/me/"))
        .and(header("x-api-key", "plane_api_123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "u1" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, _) = client_for(&mock_server, Some("plane_api_123"));
    let user = assert_ok!(client.get("users/me/").await);

    assert_eq!(user, json!({ "id": "u1" }));
}

#[tokio::test]
async fn test_api_key_header_omitted_when_unset() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/users/me/"))
        .and(|req: &Request| !req.headers.contains_key("x-api-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, _) = client_for(&mock_server, None);
    assert_ok!(client.get("users/me/").await);
}

/// Error statuses carry the status code and the body
#[tokio::test]
async fn test_forbidden_error_contains_status_and_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/workspaces/acme/projects/"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({ "error": "forbidden" })))
        .mount(&mock_server)
        .await;

    let (client, _) = client_for(&mock_server, Some("k"));
    let err = client.get("workspaces/acme/projects/").await.unwrap_err();

    assert_eq!(err.status(), Some(403));
    let message = err.to_string();
    assert!(message.contains("403"), "{message}");
    assert!(message.contains("forbidden"), "{message}");
}

#[tokio::test]
async fn test_long_error_body_is_truncated() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/users/me/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("e".repeat(5000)))
        .mount(&mock_server)
        .await;

    let (client, _) = client_for(&mock_server, Some("k"));
    let err = client.get("users/me/").await.unwrap_err();

    match err {
        PlaneError::Request {
            status: Some(500),
            body: Some(body),
            ..
        } => {
            assert_eq!(body.len(), 1003);
            assert!(body.ends_with("..."));
        }
        other => panic!("Expected Request error, got {:?}", other),
    }
}

/// A JSON body is sent as JSON and the JSON response comes back unchanged
#[tokio::test]
async fn test_post_json_round_trip() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/workspaces/acme/projects/"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({ "a": 1 })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "a": 1 })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, _) = client_for(&mock_server, Some("k"));
    let response = assert_ok!(
        client
            .post("workspaces/acme/projects/", Some(json!({ "a": 1 })))
            .await
    );

    assert_eq!(response, json!({ "a": 1 }));
}

/// GET never carries a body, even when one is supplied
#[tokio::test]
async fn test_get_drops_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/users/me/"))
        .and(no_body)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, _) = client_for(&mock_server, Some("k"));
    let response: Value = assert_ok!(
        client
            .request("get", "users/me/", Some(json!({ "ignored": true })))
            .await
    );

    assert_eq!(response["ok"], true);
}

#[tokio::test]
async fn test_post_without_body_has_no_content_type() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/workspaces/acme/projects/p1/cycles/c1/transfer-issues/"))
        .and(no_body)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, _) = client_for(&mock_server, Some("k"));
    assert_ok!(
        client
            .post("workspaces/acme/projects/p1/cycles/c1/transfer-issues/", None)
            .await
    );
}

#[tokio::test]
async fn test_no_content_decodes_to_null() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/workspaces/acme/projects/p1/cycles/c1/"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let (client, _) = client_for(&mock_server, Some("k"));
    let response = assert_ok!(client.delete("workspaces/acme/projects/p1/cycles/c1/").await);

    assert_eq!(response, Value::Null);
}

#[tokio::test]
async fn test_non_json_success_becomes_string() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/users/me/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("plain text"))
        .mount(&mock_server)
        .await;

    let (client, _) = client_for(&mock_server, Some("k"));
    let response = assert_ok!(client.get("users/me/").await);

    assert_eq!(response, Value::String("plain text".to_string()));
}

#[tokio::test]
async fn test_response_shape_mismatch_is_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/users/me/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "a": 1 })))
        .mount(&mock_server)
        .await;

    let (client, _) = client_for(&mock_server, Some("k"));
    let result: Result<Vec<String>, _> = client.request("GET", "users/me/", None).await;

    assert!(matches!(result, Err(PlaneError::Decode(_))));
}

#[tokio::test]
async fn test_query_string_preserved() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/workspaces/acme/projects/p1/issues/"))
        .and(query_param("search", "pages"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, _) = client_for(&mock_server, Some("k"));
    assert_ok!(
        client
            .get("workspaces/acme/projects/p1/issues/?search=pages&limit=5")
            .await
    );
}

/// Session routes fail fast before login, with no network call
#[tokio::test]
async fn test_session_route_requires_login() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/workspaces/acme/projects/p1/pages/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (client, _) = client_for(&mock_server, Some("k"));
    let result = client.get(PAGES_PATH).await;

    assert!(matches!(result, Err(PlaneError::AuthRequired)));
    assert!(result.unwrap_err().to_string().contains("plane_login"));
}

/// Sequential session calls reuse the cookies from one login
#[tokio::test]
async fn test_session_reused_across_requests() {
    let mock_server = MockServer::start().await;
    common::mount_login(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/api/workspaces/acme/projects/p1/pages/"))
        .and(header_regex("cookie", &format!("session-id={}", common::SESSION_ID)))
        .and(|req: &Request| !req.headers.contains_key("x-api-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": "pg1" }])))
        .expect(2)
        .mount(&mock_server)
        .await;

    let (client, session) = client_for(&mock_server, Some("k"));
    let login = session.login("a@b.c", "pw", &mock_server.uri()).await;
    assert!(login.success, "{:?}", login);

    let first = assert_ok!(client.get(PAGES_PATH).await);
    let second = assert_ok!(client.get(PAGES_PATH).await);

    assert_eq!(first, second);
    assert_eq!(first[0]["id"], "pg1");
}

#[tokio::test]
async fn test_concurrent_session_requests() {
    let mock_server = MockServer::start().await;
    common::mount_login(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/api/workspaces/acme/projects/p1/pages-summary/"))
        .and(header_regex("cookie", "session-id="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(3)
        .mount(&mock_server)
        .await;

    let (client, session) = client_for(&mock_server, None);
    assert!(session.login("a@b.c", "pw", &mock_server.uri()).await.success);

    let summary = "workspaces/acme/projects/p1/pages-summary/";
    let (a, b, c) = tokio::join!(client.get(summary), client.get(summary), client.get(summary));
    assert_ok!(a);
    assert_ok!(b);
    assert_ok!(c);
}

#[tokio::test]
async fn test_logout_then_session_route_fails() {
    let mock_server = MockServer::start().await;
    common::mount_login(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/api/workspaces/acme/projects/p1/pages/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, session) = client_for(&mock_server, Some("k"));
    assert!(session.login("a@b.c", "pw", &mock_server.uri()).await.success);
    assert_ok!(client.get(PAGES_PATH).await);

    session.logout().await;

    assert!(matches!(client.get(PAGES_PATH).await, Err(PlaneError::AuthRequired)));
}

/// A rejected session is dropped so the next call asks for a fresh login
#[tokio::test]
async fn test_unauthorized_session_is_invalidated() {
    let mock_server = MockServer::start().await;
    common::mount_login(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/api/workspaces/acme/projects/p1/pages/"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "detail": "Authentication credentials were not provided." })),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, session) = client_for(&mock_server, Some("k"));
    assert!(session.login("a@b.c", "pw", &mock_server.uri()).await.success);

    let err = client.get(PAGES_PATH).await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert!(!session.is_authenticated().await);

    assert!(matches!(client.get(PAGES_PATH).await, Err(PlaneError::AuthRequired)));
}

/// Non-session routes keep working while a session exists
#[tokio::test]
async fn test_api_key_route_unaffected_by_session() {
    let mock_server = MockServer::start().await;
    common::mount_login(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/workspaces/acme/projects/p1/issues/"))
        .and(header("x-api-key", "k"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, session) = client_for(&mock_server, Some("k"));
    assert!(session.login("a@b.c", "pw", &mock_server.uri()).await.success);

    assert_ok!(client.get("workspaces/acme/projects/p1/issues/").await);
}

/// A rejection answered after a newer login must not clear that login
#[tokio::test]
async fn test_stale_rejection_keeps_newer_login() {
    let mock_server = MockServer::start().await;
    common::mount_csrf(&mock_server).await;
    common::mount_sign_in_times(&mock_server, 2).await;

    Mock::given(method("GET"))
        .and(path("/api/workspaces/acme/projects/p1/pages/"))
        .respond_with(ResponseTemplate::new(401).set_delay(Duration::from_millis(500)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, session) = client_for(&mock_server, Some("k"));
    assert!(session.login("a@b.c", "pw", &mock_server.uri()).await.success);

    let (rejected, relogin) = tokio::join!(client.get(PAGES_PATH), async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        session.login("a@b.c", "pw", &mock_server.uri()).await
    });

    assert_eq!(rejected.unwrap_err().status(), Some(401));
    assert!(relogin.success, "{:?}", relogin);
    assert!(session.is_authenticated().await);
}

/// Logout waits for an in-flight session request instead of cutting it off
#[tokio::test]
async fn test_logout_waits_for_in_flight_request() {
    let mock_server = MockServer::start().await;
    common::mount_login(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/api/workspaces/acme/projects/p1/pages/"))
        .and(header_regex("cookie", &format!("session-id={}", common::SESSION_ID)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "id": "pg1" }]))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, session) = client_for(&mock_server, None);
    assert!(session.login("a@b.c", "pw", &mock_server.uri()).await.success);

    let (pages, logged_out_at) = tokio::join!(
        async {
            let result = client.get(PAGES_PATH).await;
            (result, tokio::time::Instant::now())
        },
        async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            assert!(session.is_authenticated().await);
            session.logout().await;
            tokio::time::Instant::now()
        }
    );

    let (result, finished_at) = pages;
    let body = assert_ok!(result);
    assert_eq!(body[0]["id"], "pg1");
    assert!(finished_at <= logged_out_at);
    assert!(!session.is_authenticated().await);
}

/// A stalled session request times out and releases the store
#[tokio::test]
async fn test_stalled_session_request_times_out() {
    let mock_server = MockServer::start().await;
    common::mount_login(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/api/workspaces/acme/projects/p1/pages/"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&mock_server)
        .await;

    let config = Config::new(&mock_server.uri()).unwrap();
    let session = Arc::new(
        SessionStore::new()
            .with_verification(false)
            .with_timeout(Duration::from_millis(200)),
    );
    let client = PlaneClient::new(&config, Arc::clone(&session)).unwrap();
    assert!(session.login("a@b.c", "pw", &mock_server.uri()).await.success);

    let (stalled, logout) = tokio::join!(client.get(PAGES_PATH), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        tokio::time::timeout(Duration::from_secs(2), session.logout()).await
    });

    let err = stalled.unwrap_err();
    assert!(matches!(err, PlaneError::Request { status: None, .. }), "{err:?}");
    assert!(logout.is_ok(), "logout stayed blocked behind the stalled request");
    assert!(!session.is_authenticated().await);
}
