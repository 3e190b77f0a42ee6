#![allow(dead_code)]

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CSRF_TOKEN: &str = "tok123";
pub const SESSION_ID: &str = "sess456";

/// CSRF endpoint that sets the anti-forgery cookie
pub async fn mount_csrf(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/auth/get-csrf-token/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", format!("csrftoken={}; Path=/", CSRF_TOKEN).as_str())
                .set_body_json(serde_json::json!({ "csrf_token": CSRF_TOKEN })),
        )
        .mount(server)
        .await;
}

/// Sign-in endpoint that redirects and sets the session cookie. Expected
/// to be hit exactly once.
pub async fn mount_sign_in(server: &MockServer) {
    mount_sign_in_times(server, 1).await;
}

/// Sign-in endpoint expected to be hit `times` times
pub async fn mount_sign_in_times(server: &MockServer, times: u64) {
    Mock::given(method("POST"))
        .and(path("/auth/sign-in/"))
        .and(header("x-csrftoken", CSRF_TOKEN))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("location", "/")
                .insert_header(
                    "set-cookie",
                    format!("session-id={}; Path=/; HttpOnly", SESSION_ID).as_str(),
                ),
        )
        .expect(times)
        .mount(server)
        .await;
}

/// Full handshake without the verification step
pub async fn mount_login(server: &MockServer) {
    mount_csrf(server).await;
    mount_sign_in(server).await;
}
