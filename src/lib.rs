pub mod auth;
pub mod config;
#[cfg(feature = "stdio-mcp")]
pub mod mcp;
pub mod plane;

pub use auth::{AuthErrorKind, AuthResult, CookieJar, CookieStore, SessionStore};
pub use config::{Config, ConfigError};
#[cfg(feature = "stdio-mcp")]
pub use mcp::PlaneMcpServer;
pub use plane::{classify, PlaneClient, PlaneError};
