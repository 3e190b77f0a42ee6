use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

/// Default Plane cloud host used when no host is configured
pub const DEFAULT_HOST_URL: &str = "https://api.plane.so/";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration value: {0}")]
    ParseError(String),

    #[error("Invalid host URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::error::Error),
}

/// Configuration file format (for deserialization). Every key is optional,
/// environment variables take precedence over the file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    /// Plane API host, e.g. https://api.plane.so/
    host_url: Option<String>,

    /// API key sent as X-API-Key on /api/v1/ calls
    api_key: Option<String>,

    /// Workspace slug used by nearly every tool path
    workspace_slug: Option<String>,

    /// Verify the session with /users/me/ after password login
    verify_login: Option<bool>,
}

/// Configuration for the Plane MCP Server, resolved once at startup
#[derive(Debug, Clone)]
pub struct Config {
    /// Plane host URL, always ending with exactly one '/'
    pub host_url: String,

    /// Static API key for versioned endpoints
    pub api_key: Option<String>,

    /// Workspace slug (validated by the tool layer, not here)
    pub workspace_slug: Option<String>,

    /// Whether login performs the session verification round-trip
    pub verify_login: bool,
}

impl Config {
    /// Build a configuration for the given host with everything else unset.
    pub fn new(host_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            host_url: normalize_host(host_url)?,
            api_key: None,
            workspace_slug: None,
            verify_login: true,
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_workspace_slug(mut self, slug: impl Into<String>) -> Self {
        self.workspace_slug = Some(slug.into());
        self
    }

    pub fn with_verify_login(mut self, verify: bool) -> Self {
        self.verify_login = verify;
        self
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::resolve(ConfigFile::default())
    }

    /// Load configuration from environment variables, falling back to
    /// ~/.config/mcp/plane-mcp-server/config.json for unset keys
    pub fn from_env_or_file() -> Result<Self, ConfigError> {
        let file = match Self::get_config_path() {
            Some(path) if path.exists() => {
                let contents = fs::read_to_string(&path)?;
                serde_json::from_str(&contents)?
            }
            _ => ConfigFile::default(),
        };

        Self::resolve(file)
    }

    fn resolve(file: ConfigFile) -> Result<Self, ConfigError> {
        let host_url = env_var("PLANE_API_HOST_URL")
            .or(file.host_url)
            .unwrap_or_else(|| DEFAULT_HOST_URL.to_string());

        let verify_login = match env_var("PLANE_VERIFY_LOGIN") {
            Some(value) => parse_bool(&value).ok_or_else(|| {
                ConfigError::ParseError(format!(
                    "PLANE_VERIFY_LOGIN must be true or false, got '{}'",
                    value
                ))
            })?,
            None => file.verify_login.unwrap_or(true),
        };

        Ok(Config {
            host_url: normalize_host(&host_url)?,
            api_key: env_var("PLANE_API_KEY").or(non_empty(file.api_key)),
            workspace_slug: env_var("PLANE_WORKSPACE_SLUG").or(non_empty(file.workspace_slug)),
            verify_login,
        })
    }

    /// Get the configuration file path: ~/.config/mcp/plane-mcp-server/config.json
    fn get_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config/mcp/plane-mcp-server/config.json"))
    }
}

/// Validate a host URL and make sure it ends with a single trailing slash.
pub fn normalize_host(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let host = format!("{}/", trimmed);

    url::Url::parse(&host).map_err(|source| ConfigError::InvalidUrl {
        url: raw.to_string(),
        source,
    })?;

    Ok(host)
}

fn env_var(key: &str) -> Option<String> {
    non_empty(std::env::var(key).ok())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
