use super::{IssueParams, ProjectParams};
use crate::mcp::server::{
    api_error, json_result, require_fields, segment, text_result, PlaneMcpServer,
};
use rmcp::{
    handler::server::wrapper::Parameters,
    model::*,
    tool, tool_router, ErrorData as McpError,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateWorklogParams {
    #[schemars(description = "The uuid identifier of the project containing the issue")]
    pub project_id: String,
    #[schemars(description = "The uuid identifier of the issue to create worklog for")]
    pub issue_id: String,
    #[schemars(
        description = "The data for creating the worklog. `duration` (minutes) and `description` are required."
    )]
    pub worklog_data: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct WorklogParams {
    #[schemars(description = "The uuid identifier of the project containing the issue")]
    pub project_id: String,
    #[schemars(description = "The uuid identifier of the issue containing the worklog")]
    pub issue_id: String,
    #[schemars(description = "The uuid identifier of the worklog")]
    pub worklog_id: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UpdateWorklogParams {
    #[schemars(description = "The uuid identifier of the project containing the issue")]
    pub project_id: String,
    #[schemars(description = "The uuid identifier of the issue containing the worklog")]
    pub issue_id: String,
    #[schemars(description = "The uuid identifier of the worklog to update")]
    pub worklog_id: String,
    #[schemars(description = "The fields to update on the worklog")]
    pub worklog_data: Map<String, Value>,
}

fn worklog_path(issue_id: &str, worklog_id: Option<&str>) -> String {
    match worklog_id {
        Some(id) => format!("issues/{}/worklogs/{}/", segment(issue_id), segment(id)),
        None => format!("issues/{}/worklogs/", segment(issue_id)),
    }
}

#[tool_router(router = worklog_tool_router, vis = "pub(crate)")]
impl PlaneMcpServer {
    #[tool(description = "Get all worklogs for a specific issue")]
    pub async fn get_issue_worklogs(
        &self,
        params: Parameters<IssueParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = self.project_path(&params.0.project_id, &worklog_path(&params.0.issue_id, None))?;
        let worklogs = self.client.get(&path).await.map_err(api_error)?;
        json_result(&worklogs)
    }

    #[tool(description = "Get total logged time for a project")]
    pub async fn get_total_worklogs(
        &self,
        params: Parameters<ProjectParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = self.project_path(&params.0.project_id, "total-worklogs/")?;
        let totals = self.client.get(&path).await.map_err(api_error)?;
        json_result(&totals)
    }

    #[tool(description = "Create a new worklog for an issue")]
    pub async fn create_worklog(
        &self,
        params: Parameters<CreateWorklogParams>,
    ) -> Result<CallToolResult, McpError> {
        let CreateWorklogParams {
            project_id,
            issue_id,
            worklog_data,
        } = params.0;
        require_fields(&worklog_data, &["duration", "description"])?;

        let path = self.project_path(&project_id, &worklog_path(&issue_id, None))?;
        let worklog = self
            .client
            .post(&path, Some(Value::Object(worklog_data)))
            .await
            .map_err(api_error)?;
        json_result(&worklog)
    }

    #[tool(description = "Update an existing worklog")]
    pub async fn update_worklog(
        &self,
        params: Parameters<UpdateWorklogParams>,
    ) -> Result<CallToolResult, McpError> {
        let UpdateWorklogParams {
            project_id,
            issue_id,
            worklog_id,
            worklog_data,
        } = params.0;

        let path = self.project_path(&project_id, &worklog_path(&issue_id, Some(&worklog_id)))?;
        let worklog = self
            .client
            .patch(&path, Some(Value::Object(worklog_data)))
            .await
            .map_err(api_error)?;
        json_result(&worklog)
    }

    #[tool(description = "Delete a worklog")]
    pub async fn delete_worklog(
        &self,
        params: Parameters<WorklogParams>,
    ) -> Result<CallToolResult, McpError> {
        let WorklogParams {
            project_id,
            issue_id,
            worklog_id,
        } = params.0;

        let path = self.project_path(&project_id, &worklog_path(&issue_id, Some(&worklog_id)))?;
        self.client.delete(&path).await.map_err(api_error)?;
        text_result("Worklog deleted successfully")
    }
}
