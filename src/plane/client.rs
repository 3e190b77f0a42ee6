use crate::auth::SessionStore;
use crate::config::Config;
use crate::plane::routes::{classify, AuthMode, RouteClassification};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Longest response body carried in an error message
const MAX_BODY_SNIPPET: usize = 1000;

const USER_AGENT: &str = concat!("plane-mcp-server/", env!("CARGO_PKG_VERSION"));

/// Error types for Plane API requests
#[derive(Debug, thiserror::Error)]
pub enum PlaneError {
    #[error(
        "Session authentication required for this endpoint. \
         Call plane_login with your Plane email and password first."
    )]
    AuthRequired,

    #[error(
        "Request failed: {message}{}{}",
        status_suffix(.status),
        body_suffix(.body)
    )]
    Request {
        message: String,
        status: Option<u16>,
        body: Option<String>,
    },

    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),
}

impl PlaneError {
    /// HTTP status attached to the failure, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            PlaneError::Request { status, .. } => *status,
            _ => None,
        }
    }

    fn transport(err: reqwest::Error) -> Self {
        PlaneError::Request {
            message: err.to_string(),
            status: err.status().map(|s| s.as_u16()),
            body: None,
        }
    }
}

/// Single entry point for every Plane API call.
///
/// Chooses the API root and authentication per path: the pages family goes
/// to `api/` with the session cookies, everything else to `api/v1/` with the
/// configured API key.
pub struct PlaneClient {
    http_client: reqwest::Client,
    session: Arc<SessionStore>,
    host_url: String,
    api_key: Option<String>,
}

impl PlaneClient {
    /// Create a new Plane API client
    pub fn new(config: &Config, session: Arc<SessionStore>) -> Result<Self, PlaneError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(PlaneError::Client)?;

        Ok(Self {
            http_client,
            session,
            host_url: config.host_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Full URL for a logical API path under the given classification
    pub fn url_for(&self, route: RouteClassification, path: &str) -> String {
        let host = self.host_url.trim_end_matches('/');
        format!(
            "{}/{}{}",
            host,
            route.version.prefix(),
            path.trim_start_matches('/')
        )
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Value, PlaneError> {
        self.request("GET", path, None).await
    }

    /// Make a POST request
    pub async fn post(&self, path: &str, body: Option<Value>) -> Result<Value, PlaneError> {
        self.request("POST", path, body).await
    }

    /// Make a PATCH request
    pub async fn patch(&self, path: &str, body: Option<Value>) -> Result<Value, PlaneError> {
        self.request("PATCH", path, body).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, path: &str) -> Result<Value, PlaneError> {
        self.request("DELETE", path, None).await
    }

    /// Issue `method` against `path`, decoding the response into `T`.
    ///
    /// GET never carries a body. Other methods send `body` as JSON when
    /// present. The response is not validated beyond deserializing into `T`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, PlaneError> {
        let method = Method::from_bytes(method.trim().to_ascii_uppercase().as_bytes())
            .map_err(|_| PlaneError::InvalidMethod(method.to_string()))?;
        let route = classify(path);
        let url = self.url_for(route, path);
        let body = if method == Method::GET { None } else { body };

        debug!(
            method = %method,
            url = %url,
            session = route.uses_session_auth(),
            "Dispatching Plane request"
        );

        let value = match route.auth {
            AuthMode::Session => {
                let session = self
                    .session
                    .authenticated()
                    .await
                    .ok_or(PlaneError::AuthRequired)?;
                let generation = session.generation();
                let request = session.client().http().request(method, &url);
                let result = Self::execute(request, body).await;
                drop(session);

                if let Err(PlaneError::Request {
                    status: Some(401 | 403),
                    ..
                }) = &result
                {
                    self.session.invalidate(generation).await;
                }
                result?
            }
            AuthMode::ApiKey => {
                let mut request = self.http_client.request(method, &url);
                if let Some(key) = &self.api_key {
                    request = request.header("X-API-Key", key);
                }
                Self::execute(request, body).await?
            }
        };

        Ok(serde_json::from_value(value)?)
    }

    /// Execute a single HTTP request and normalize its outcome
    async fn execute(
        mut request: reqwest::RequestBuilder,
        body: Option<Value>,
    ) -> Result<Value, PlaneError> {
        if let Some(body_value) = body.filter(|b| !b.is_null()) {
            request = request
                .header(CONTENT_TYPE, "application/json")
                .json(&body_value);
        }

        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "Plane request failed before a response arrived");
            PlaneError::transport(e)
        })?;

        let status = response.status();
        let text = response.text().await.map_err(PlaneError::transport)?;

        if !status.is_success() {
            warn!(status = %status, "Plane request returned an error status");
            return Err(PlaneError::Request {
                message: status
                    .canonical_reason()
                    .unwrap_or("HTTP error")
                    .to_string(),
                status: Some(status.as_u16()),
                body: body_snippet(&text),
            });
        }

        if status == StatusCode::NO_CONTENT || text.trim().is_empty() {
            return Ok(Value::Null);
        }

        match serde_json::from_str(&text) {
            Ok(json) => Ok(json),
            Err(_) => Ok(Value::String(text)),
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (status {})", s)).unwrap_or_default()
}

fn body_suffix(body: &Option<String>) -> String {
    body.as_ref().map(|b| format!(": {}", b)).unwrap_or_default()
}

/// Compact, length-limited rendering of an error response body
fn body_snippet(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    let rendered = match serde_json::from_str::<Value>(trimmed) {
        Ok(json) => json.to_string(),
        Err(_) => trimmed.to_string(),
    };

    if rendered.chars().count() <= MAX_BODY_SNIPPET {
        return Some(rendered);
    }
    let mut snippet: String = rendered.chars().take(MAX_BODY_SNIPPET).collect();
    snippet.push_str("...");
    Some(snippet)
}
