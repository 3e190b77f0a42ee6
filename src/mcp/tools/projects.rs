use crate::mcp::server::{api_error, json_result, PlaneMcpServer};
use crate::plane::types::{CreateProjectRequest, Paginated, ProjectSummary};
use rmcp::{
    handler::server::wrapper::Parameters,
    model::*,
    tool, tool_router, ErrorData as McpError,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Longest identifier Plane accepts
const MAX_IDENTIFIER_LEN: usize = 7;

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateProjectParams {
    #[schemars(description = "The name of the project")]
    pub name: String,
    #[schemars(
        description = "The identifier of the project. This is typically a word of around 5 characters derived from the name of the project in uppercase."
    )]
    pub identifier: String,
}

#[tool_router(router = project_tool_router, vis = "pub(crate)")]
impl PlaneMcpServer {
    #[tool(description = "Get all projects for the current user")]
    pub async fn get_projects(&self) -> Result<CallToolResult, McpError> {
        let path = self.workspace_path("projects/")?;
        let page: Paginated<ProjectSummary> = self
            .client
            .request("GET", &path, None)
            .await
            .map_err(api_error)?;

        json_result(&page.results)
    }

    #[tool(description = "Create a new project")]
    pub async fn create_project(
        &self,
        params: Parameters<CreateProjectParams>,
    ) -> Result<CallToolResult, McpError> {
        if params.0.identifier.chars().count() > MAX_IDENTIFIER_LEN {
            return Err(McpError::invalid_params(
                format!("identifier must be at most {MAX_IDENTIFIER_LEN} characters"),
                None,
            ));
        }

        let path = self.workspace_path("projects/")?;
        let body = CreateProjectRequest::new(params.0.name, &params.0.identifier);
        let body = serde_json::to_value(body)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;

        let project = self.client.post(&path, Some(body)).await.map_err(api_error)?;
        json_result(&project)
    }
}
