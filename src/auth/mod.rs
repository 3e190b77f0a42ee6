pub mod cookie_jar;
pub mod session;
pub mod types;

pub use cookie_jar::{CookieJar, CookieStore};
pub use session::{AuthenticatedSession, SessionClient, SessionStore};
pub use types::{AuthErrorKind, AuthResult, LoginError};
