use crate::auth::SessionStore;
use crate::config::Config;
use crate::plane::{PlaneClient, PlaneError};
use rmcp::{
    handler::server::tool::ToolRouter, model::*, tool_handler, ErrorData as McpError,
    ServerHandler,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::warn;

const INSTRUCTIONS: &str = "Plane MCP Server - projects, issues, cycles, modules, metadata and \
worklogs use the configured API key (/api/v1/). Pages use a browser-style session: call \
plane_login with your Plane email and password first. plane_auth_status reports which mode is \
active.";

/// MCP server for Plane
#[derive(Clone)]
pub struct PlaneMcpServer {
    pub(crate) config: Arc<Config>,
    pub(crate) client: Arc<PlaneClient>,
    tool_router: ToolRouter<Self>,
}

impl PlaneMcpServer {
    /// Create a new MCP server with a fresh session store
    pub fn new(config: &Config) -> Result<Self, PlaneError> {
        let session = Arc::new(SessionStore::new().with_verification(config.verify_login));
        Self::with_session(config, session)
    }

    /// Create a server sharing an existing session store
    pub fn with_session(config: &Config, session: Arc<SessionStore>) -> Result<Self, PlaneError> {
        let client = Arc::new(PlaneClient::new(config, session)?);

        Ok(Self {
            config: Arc::new(config.clone()),
            client,
            tool_router: Self::auth_tool_router()
                + Self::user_tool_router()
                + Self::project_tool_router()
                + Self::issue_tool_router()
                + Self::cycle_tool_router()
                + Self::module_tool_router()
                + Self::metadata_tool_router()
                + Self::worklog_tool_router()
                + Self::page_tool_router(),
        })
    }

    pub fn client(&self) -> &PlaneClient {
        &self.client
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        self.client.session()
    }

    /// Every tool registered with this server
    pub fn tools(&self) -> Vec<Tool> {
        self.tool_router.list_all()
    }

    /// Configured workspace slug, required by everything below `workspaces/`
    pub(crate) fn workspace(&self) -> Result<&str, McpError> {
        self.config.workspace_slug.as_deref().ok_or_else(|| {
            McpError::invalid_params(
                "PLANE_WORKSPACE_SLUG is required for this tool. \
                 Set it to your workspace slug.",
                None,
            )
        })
    }

    /// `workspaces/<slug>/<rest>`
    pub(crate) fn workspace_path(&self, rest: &str) -> Result<String, McpError> {
        Ok(format!("workspaces/{}/{}", segment(self.workspace()?), rest))
    }

    /// `workspaces/<slug>/projects/<project_id>/<rest>`
    pub(crate) fn project_path(&self, project_id: &str, rest: &str) -> Result<String, McpError> {
        self.workspace_path(&format!("projects/{}/{}", segment(project_id), rest))
    }
}

/// Percent-encode a caller-supplied id so it stays a single path segment
pub(crate) fn segment(id: &str) -> String {
    // form encoding turns spaces into '+', which a path would keep literally
    url::form_urlencoded::byte_serialize(id.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Pretty-printed JSON as a single text content item
pub(crate) fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

pub(crate) fn text_result(message: impl Into<String>) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(message.into())]))
}

pub(crate) fn api_error(err: PlaneError) -> McpError {
    warn!(error = %err, status = ?err.status(), "Plane API call failed");
    McpError::internal_error(err.to_string(), None)
}

/// Reject a create payload missing any of `fields`
pub(crate) fn require_fields(data: &Map<String, Value>, fields: &[&str]) -> Result<(), McpError> {
    let missing: Vec<&str> = fields
        .iter()
        .copied()
        .filter(|field| data.get(*field).is_none_or(Value::is_null))
        .collect();

    if missing.is_empty() {
        return Ok(());
    }
    Err(McpError::invalid_params(
        format!("Missing required field(s): {}", missing.join(", ")),
        None,
    ))
}

#[tool_handler]
impl ServerHandler for PlaneMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            instructions: Some(INSTRUCTIONS.into()),
            ..Default::default()
        }
    }
}
