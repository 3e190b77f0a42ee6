use crate::mcp::server::{api_error, json_result, PlaneMcpServer};
use rmcp::{model::*, tool, tool_router, ErrorData as McpError};
use serde_json::Value;

#[tool_router(router = user_tool_router, vis = "pub(crate)")]
impl PlaneMcpServer {
    #[tool(description = "Get the current user's information")]
    pub async fn get_user(&self) -> Result<CallToolResult, McpError> {
        let user: Value = self.client.get("users/me/").await.map_err(api_error)?;
        json_result(&user)
    }

    #[tool(description = "Get all members in the current workspace")]
    pub async fn get_workspace_members(&self) -> Result<CallToolResult, McpError> {
        let path = self.workspace_path("members/")?;
        let members = self.client.get(&path).await.map_err(api_error)?;
        json_result(&members)
    }
}
