use crate::mcp::server::{json_result, PlaneMcpServer};
use rmcp::{
    handler::server::wrapper::Parameters,
    model::*,
    tool, tool_router, ErrorData as McpError,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct LoginParams {
    #[schemars(description = "Your Plane account email")]
    pub email: String,
    #[schemars(description = "Your Plane account password")]
    pub password: String,
}

#[tool_router(router = auth_tool_router, vis = "pub(crate)")]
impl PlaneMcpServer {
    #[tool(
        description = "Authenticate with Plane using email and password for session-based access to Pages and /api/ endpoints"
    )]
    pub async fn plane_login(
        &self,
        params: Parameters<LoginParams>,
    ) -> Result<CallToolResult, McpError> {
        let LoginParams { email, password } = params.0;
        if !email.contains('@') {
            return Err(McpError::invalid_params(
                "email must be a valid email address",
                None,
            ));
        }

        info!("Password login requested");
        let result = self
            .session()
            .login(&email, &password, &self.config.host_url)
            .await;

        if result.success {
            json_result(&json!({
                "message": "Successfully authenticated with Plane",
                "authenticated": true,
                "note": "Session authentication enabled for Pages and /api/ endpoints. \
                         Other endpoints (/api/v1/) use API key if configured.",
            }))
        } else {
            json_result(&json!({
                "message": "Authentication failed",
                "authenticated": false,
                "error": result.error,
                "details": result.message,
            }))
        }
    }

    #[tool(description = "Check current Plane authentication status")]
    pub async fn plane_auth_status(&self) -> Result<CallToolResult, McpError> {
        let authenticated = self.session().is_authenticated().await;
        let has_api_key = self.config.api_key.is_some();

        let (mode, note) = match (authenticated, has_api_key) {
            (true, _) => (
                "session (Pages + /api/ endpoints)",
                "Using session authentication - access to Pages and /api/ endpoints",
            ),
            (false, true) => (
                "api_key (/api/v1/ endpoints)",
                "Using API key - access to /api/v1/ endpoints only",
            ),
            (false, false) => ("unauthenticated", "No authentication configured"),
        };

        json_result(&json!({
            "session_authenticated": authenticated,
            "api_key_configured": has_api_key,
            "current_mode": mode,
            "note": note,
        }))
    }

    #[tool(description = "Logout and clear Plane session")]
    pub async fn plane_logout(&self) -> Result<CallToolResult, McpError> {
        self.session().logout().await;

        json_result(&json!({
            "message": "Session cleared",
            "authenticated": false,
        }))
    }
}
