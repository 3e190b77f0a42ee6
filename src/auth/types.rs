use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Category of a failed password login
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthErrorKind {
    /// No response reached us
    Network,
    /// The csrftoken cookie was not issued
    Csrf,
    /// Set-Cookie or the session-id cookie was missing
    Cookies,
    /// 401/403 or failed session verification
    Credentials,
    /// Any other upstream failure
    Unknown,
}

/// Outcome of a login attempt. Login never raises; callers branch on `error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<AuthErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AuthResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
            message: None,
        }
    }

    pub fn failure(kind: AuthErrorKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(kind),
            message: Some(message.into()),
        }
    }
}

/// Internal login failure, flattened into an [`AuthResult`] at the boundary
#[derive(Error, Debug)]
pub enum LoginError {
    #[error("Network error - could not connect to server")]
    Network(#[source] reqwest::Error),

    #[error("CSRF token not found in response")]
    CsrfMissing,

    #[error("No session cookies received from server")]
    NoSetCookie,

    #[error("session-id cookie not found after login")]
    SessionCookieMissing,

    #[error("Invalid email or password")]
    InvalidCredentials { status: u16 },

    #[error("Session verification failed")]
    VerificationFailed { status: u16 },

    #[error("Could not verify session validity")]
    VerificationUnreachable(#[source] reqwest::Error),

    #[error("Server error: {status}")]
    Server { status: u16 },

    #[error("Invalid host URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl LoginError {
    pub fn kind(&self) -> AuthErrorKind {
        match self {
            LoginError::Network(_) => AuthErrorKind::Network,
            LoginError::CsrfMissing => AuthErrorKind::Csrf,
            LoginError::NoSetCookie | LoginError::SessionCookieMissing => AuthErrorKind::Cookies,
            LoginError::InvalidCredentials { .. }
            | LoginError::VerificationFailed { .. }
            | LoginError::VerificationUnreachable(_) => AuthErrorKind::Credentials,
            LoginError::Server { .. } | LoginError::InvalidUrl(_) | LoginError::Client(_) => {
                AuthErrorKind::Unknown
            }
        }
    }

    /// Classify a non-success HTTP status from a handshake step
    pub(crate) fn from_status(status: reqwest::StatusCode) -> Self {
        match status {
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                LoginError::InvalidCredentials {
                    status: status.as_u16(),
                }
            }
            _ => LoginError::Server {
                status: status.as_u16(),
            },
        }
    }
}

impl From<LoginError> for AuthResult {
    fn from(err: LoginError) -> Self {
        AuthResult::failure(err.kind(), err.to_string())
    }
}
