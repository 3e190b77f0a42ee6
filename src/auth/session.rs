use super::cookie_jar::{CookieJar, CookieStore};
use super::types::{AuthResult, LoginError};
use reqwest::header::{CONTENT_TYPE, SET_COOKIE};
use reqwest::{redirect, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, RwLockReadGuard};
use tracing::{debug, info, warn};
use url::Url;

const USER_AGENT: &str = concat!("plane-mcp-server/", env!("CARGO_PKG_VERSION"));

/// Cookie that carries the anti-forgery token between handshake steps
pub const CSRF_COOKIE: &str = "csrftoken";

/// Cookie that authenticates a Plane session
pub const SESSION_COOKIE: &str = "session-id";

/// Upper bound for any session-mode request, including each login step.
/// A session request holds the store's read lock, so this also bounds how
/// long `login`/`logout` can be kept waiting.
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(30);

/// Cookie-bound HTTP handle shared by every session-mode call.
///
/// Both clients write to and read from the same jar; `no_redirect` exists only
/// for the sign-in POST, whose redirect response carries the session cookies.
#[derive(Clone)]
pub struct SessionClient {
    http: reqwest::Client,
    no_redirect: reqwest::Client,
    jar: Arc<CookieJar>,
}

impl SessionClient {
    fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let jar = Arc::new(CookieJar::new());

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .cookie_provider(Arc::clone(&jar))
            .build()?;

        let no_redirect = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .cookie_provider(Arc::clone(&jar))
            .redirect(redirect::Policy::none())
            .build()?;

        Ok(Self {
            http,
            no_redirect,
            jar,
        })
    }

    /// HTTP client that sends and stores session cookies
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Cookie jar backing this client
    pub fn cookies(&self) -> &dyn CookieStore {
        self.jar.as_ref()
    }

    /// True when both handles share the same jar
    pub fn same_session(&self, other: &SessionClient) -> bool {
        Arc::ptr_eq(&self.jar, &other.jar)
    }
}

#[derive(Default)]
struct SessionState {
    client: Option<SessionClient>,
    authenticated: bool,
    /// Bumped by every login and logout
    generation: u64,
}

impl SessionState {
    fn client(&mut self, timeout: Duration) -> Result<SessionClient, reqwest::Error> {
        match &self.client {
            Some(client) => {
                debug!("Reusing existing session client");
                Ok(client.clone())
            }
            None => {
                debug!("Creating new session client with cookie jar");
                let client = SessionClient::new(timeout)?;
                self.client = Some(client.clone());
                Ok(client)
            }
        }
    }
}

/// Read access to an authenticated session.
///
/// Holding this guard keeps `login`/`logout` out until the request using it
/// has completed.
pub struct AuthenticatedSession<'a> {
    _guard: RwLockReadGuard<'a, SessionState>,
    client: SessionClient,
    generation: u64,
}

impl AuthenticatedSession<'_> {
    pub fn client(&self) -> &SessionClient {
        &self.client
    }

    /// Login generation this session belongs to, for [`SessionStore::invalidate`]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Process-lifetime password session with Plane.
///
/// All mutations (client creation, login, logout) take the write lock;
/// session-mode requests hold the read lock across the call.
pub struct SessionStore {
    state: RwLock<SessionState>,
    verify_login: bool,
    timeout: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(SessionState::default()),
            verify_login: true,
            timeout: DEFAULT_SESSION_TIMEOUT,
        }
    }

    /// Toggle the `users/me/` verification round-trip at the end of login
    pub fn with_verification(mut self, verify: bool) -> Self {
        self.verify_login = verify;
        self
    }

    /// Request timeout for clients created from now on
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the cookie-bound client, creating it on first use
    pub async fn client(&self) -> Result<SessionClient, reqwest::Error> {
        self.state.write().await.client(self.timeout)
    }

    /// Current authentication flag, no side effects
    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.authenticated
    }

    /// Read guard over the session, or `None` when not logged in
    pub async fn authenticated(&self) -> Option<AuthenticatedSession<'_>> {
        let guard = self.state.read().await;
        if !guard.authenticated {
            return None;
        }
        let client = guard.client.clone()?;
        let generation = guard.generation;
        Some(AuthenticatedSession {
            _guard: guard,
            client,
            generation,
        })
    }

    /// Clear the authenticated flag without touching cookies.
    ///
    /// Used when the server rejects a session-mode call, so the next one fails
    /// fast and asks for a fresh login. A no-op when `generation` is no longer
    /// current: a login or logout in the meantime supersedes the rejection.
    pub async fn invalidate(&self, generation: u64) {
        let mut state = self.state.write().await;
        if state.generation != generation {
            debug!(generation, current = state.generation, "Ignoring stale session rejection");
            return;
        }
        if state.authenticated {
            warn!("Session rejected by server, marking as unauthenticated");
            state.authenticated = false;
        }
    }

    /// Authenticate with email and password, establishing a cookie session.
    ///
    /// Handshake: fetch the CSRF cookie, POST the credentials with the token
    /// echoed in `X-CSRFToken`, require a `session-id` cookie, then optionally
    /// verify the session against `api/v1/users/me/`. Never fails: every error
    /// is reported through the returned [`AuthResult`], and a failed attempt
    /// leaves the store unauthenticated.
    pub async fn login(&self, email: &str, password: &str, host_url: &str) -> AuthResult {
        let mut state = self.state.write().await;
        state.generation += 1;

        match Self::handshake(&mut state, email, password, host_url, self.verify_login, self.timeout)
            .await
        {
            Ok(()) => {
                state.authenticated = true;
                info!("Authentication successful");
                AuthResult::ok()
            }
            Err(e) => {
                // the handshake may have replaced cookies of an earlier session
                state.authenticated = false;
                warn!(error = %e, kind = ?e.kind(), "Authentication failed");
                AuthResult::from(e)
            }
        }
    }

    async fn handshake(
        state: &mut SessionState,
        email: &str,
        password: &str,
        host_url: &str,
        verify: bool,
        timeout: Duration,
    ) -> Result<(), LoginError> {
        let client = state.client(timeout).map_err(LoginError::Client)?;
        let host = Url::parse(&format!("{}/", host_url.trim_end_matches('/')))?;

        debug!(host = %host, "Starting authentication flow");

        // Step 1: the response body is irrelevant, only the cookie it sets
        let csrf_url = host.join("auth/get-csrf-token/")?;
        let response = client
            .http
            .get(csrf_url)
            .send()
            .await
            .map_err(LoginError::Network)?;
        if !response.status().is_success() {
            return Err(LoginError::from_status(response.status()));
        }
        debug!(cookies = ?client.jar.names(&host), "CSRF token requested");

        // Step 2
        let csrf_token = client
            .jar
            .get(&host, CSRF_COOKIE)
            .ok_or(LoginError::CsrfMissing)?;

        // Step 3: form-encoded sign-in, redirects are not followed
        let sign_in_url = host.join("auth/sign-in/")?;
        let response = client
            .no_redirect
            .post(sign_in_url)
            .header("X-CSRFToken", csrf_token)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .form(&[("email", email), ("password", password)])
            .send()
            .await
            .map_err(LoginError::Network)?;

        let status = response.status();
        debug!(status = %status, "Login response received");
        if !(status.is_success() || status.is_redirection()) {
            return Err(LoginError::from_status(status));
        }

        // Step 4
        if response.headers().get_all(SET_COOKIE).iter().next().is_none() {
            return Err(LoginError::NoSetCookie);
        }

        // Step 5
        let names = client.jar.names(&host);
        debug!(cookies = ?names, total = names.len(), "Cookies after login");
        if client.jar.get(&host, SESSION_COOKIE).is_none() {
            return Err(LoginError::SessionCookieMissing);
        }

        // Step 6
        if verify {
            let verify_url = host.join("api/v1/users/me/")?;
            let response = client
                .http
                .get(verify_url)
                .send()
                .await
                .map_err(LoginError::VerificationUnreachable)?;

            if response.status() != StatusCode::OK {
                debug!(status = %response.status(), "Session verification failed");
                return Err(LoginError::VerificationFailed {
                    status: response.status().as_u16(),
                });
            }
            debug!("Session verified successfully");
        }

        Ok(())
    }

    /// Clear cookies, drop the client and reset the flag. Safe when never
    /// logged in.
    pub async fn logout(&self) {
        let mut state = self.state.write().await;
        if let Some(client) = state.client.take() {
            client.jar.clear();
            debug!("Cookie jar cleared");
        }
        state.authenticated = false;
        state.generation += 1;
        info!("Authentication reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::types::AuthErrorKind;

    #[tokio::test]
    async fn test_new_store_is_unauthenticated() {
        let store = SessionStore::new();
        assert!(!store.is_authenticated().await);
        assert!(store.authenticated().await.is_none());
    }

    #[tokio::test]
    async fn test_client_is_reused() {
        let store = SessionStore::new();
        let first = store.client().await.unwrap();
        let second = store.client().await.unwrap();
        assert!(first.same_session(&second));
    }

    #[tokio::test]
    async fn test_logout_without_login_is_safe() {
        let store = SessionStore::new();
        store.logout().await;
        assert!(!store.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_logout_drops_client() {
        let store = SessionStore::new();
        let before = store.client().await.unwrap();
        let url = Url::parse("https://plane.example.com/").unwrap();
        before.cookies().set(&url, "csrftoken=abc; Path=/");

        store.logout().await;

        assert!(before.cookies().get(&url, "csrftoken").is_none());
        let after = store.client().await.unwrap();
        assert!(!before.same_session(&after));
    }

    #[tokio::test]
    async fn test_login_network_error() {
        let store = SessionStore::new();
        // Port 9 (discard) on localhost is not expected to accept HTTP
        let result = store.login("a@b.c", "pw", "http://127.0.0.1:9/").await;

        assert!(!result.success);
        assert_eq!(result.error, Some(AuthErrorKind::Network));
        assert!(!store.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_login_invalid_host() {
        let store = SessionStore::new();
        let result = store.login("a@b.c", "pw", "not a url").await;
        assert!(!result.success);
        assert_eq!(result.error, Some(AuthErrorKind::Unknown));
    }

    #[tokio::test]
    async fn test_invalidate_ignores_stale_generation() {
        let store = SessionStore::new();
        store.client().await.unwrap();
        {
            let mut state = store.state.write().await;
            state.authenticated = true;
            state.generation = 3;
        }

        let generation = store.authenticated().await.unwrap().generation();
        assert_eq!(generation, 3);

        store.invalidate(generation - 1).await;
        assert!(store.is_authenticated().await);

        store.invalidate(generation).await;
        assert!(!store.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_logout_advances_generation() {
        let store = SessionStore::new();
        store.logout().await;
        store.logout().await;
        assert_eq!(store.state.read().await.generation, 2);
    }
}
