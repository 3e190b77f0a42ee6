use super::ProjectParams;
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
use serde_json::{json, Map, Value};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CycleParams {
    #[schemars(description = "The uuid identifier of the project containing the cycle")]
    pub project_id: String,
    #[schemars(description = "The uuid identifier of the cycle")]
    pub cycle_id: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateCycleParams {
    #[schemars(description = "The uuid identifier of the project to create the cycle in")]
    pub project_id: String,
    #[schemars(
        description = "The data for creating the cycle. `name` and `project_id` are required; start_date, end_date, description and other cycle fields are passed through."
    )]
    pub cycle_data: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UpdateCycleParams {
    #[schemars(description = "The uuid identifier of the project containing the cycle")]
    pub project_id: String,
    #[schemars(description = "The uuid identifier of the cycle to update")]
    pub cycle_id: String,
    #[schemars(description = "The fields to update on the cycle")]
    pub cycle_data: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct TransferCycleIssuesParams {
    #[schemars(description = "The uuid identifier of the project containing the cycle")]
    pub project_id: String,
    #[schemars(description = "The uuid identifier of the source cycle")]
    pub cycle_id: String,
    #[schemars(description = "The uuid identifier of the target cycle")]
    pub new_cycle_id: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct AddCycleIssuesParams {
    #[schemars(description = "The uuid identifier of the project containing the cycle")]
    pub project_id: String,
    #[schemars(description = "The uuid identifier of the cycle to add issues to")]
    pub cycle_id: String,
    #[schemars(description = "Array of issue UUIDs to add to the cycle")]
    pub issues: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CycleIssueParams {
    #[schemars(description = "The uuid identifier of the project containing the cycle")]
    pub project_id: String,
    #[schemars(description = "The uuid identifier of the cycle containing the issue")]
    pub cycle_id: String,
    #[schemars(description = "The uuid identifier of the issue to remove from the cycle")]
    pub issue_id: String,
}

#[tool_router(router = cycle_tool_router, vis = "pub(crate)")]
impl PlaneMcpServer {
    #[tool(description = "Get all cycles for a specific project")]
    pub async fn list_cycles(
        &self,
        params: Parameters<ProjectParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = self.project_path(&params.0.project_id, "cycles/")?;
        let cycles = self.client.get(&path).await.map_err(api_error)?;
        json_result(&cycles)
    }

    #[tool(description = "Get details of a specific cycle")]
    pub async fn get_cycle(
        &self,
        params: Parameters<CycleParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = self.project_path(
            &params.0.project_id,
            &format!("cycles/{}/", segment(&params.0.cycle_id)),
        )?;
        let cycle = self.client.get(&path).await.map_err(api_error)?;
        json_result(&cycle)
    }

    #[tool(description = "Create a new cycle in a project")]
    pub async fn create_cycle(
        &self,
        params: Parameters<CreateCycleParams>,
    ) -> Result<CallToolResult, McpError> {
        let CreateCycleParams {
            project_id,
            mut cycle_data,
        } = params.0;
        cycle_data
            .entry("project_id")
            .or_insert_with(|| Value::String(project_id.clone()));
        require_fields(&cycle_data, &["name", "project_id"])?;

        let path = self.project_path(&project_id, "cycles/")?;
        let cycle = self
            .client
            .post(&path, Some(Value::Object(cycle_data)))
            .await
            .map_err(api_error)?;
        json_result(&cycle)
    }

    #[tool(description = "Update an existing cycle")]
    pub async fn update_cycle(
        &self,
        params: Parameters<UpdateCycleParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = self.project_path(
            &params.0.project_id,
            &format!("cycles/{}/", segment(&params.0.cycle_id)),
        )?;
        let cycle = self
            .client
            .patch(&path, Some(Value::Object(params.0.cycle_data)))
            .await
            .map_err(api_error)?;
        json_result(&cycle)
    }

    #[tool(description = "Delete a cycle")]
    pub async fn delete_cycle(
        &self,
        params: Parameters<CycleParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = self.project_path(
            &params.0.project_id,
            &format!("cycles/{}/", segment(&params.0.cycle_id)),
        )?;
        self.client.delete(&path).await.map_err(api_error)?;
        text_result("Cycle deleted successfully")
    }

    #[tool(description = "Transfer issues from one cycle to another")]
    pub async fn transfer_cycle_issues(
        &self,
        params: Parameters<TransferCycleIssuesParams>,
    ) -> Result<CallToolResult, McpError> {
        let TransferCycleIssuesParams {
            project_id,
            cycle_id,
            new_cycle_id,
        } = params.0;
        let path =
            self.project_path(&project_id, &format!("cycles/{}/transfer-issues/", segment(&cycle_id)))?;

        let response = self
            .client
            .post(&path, Some(json!({ "new_cycle_id": new_cycle_id })))
            .await
            .map_err(api_error)?;
        json_result(&response)
    }

    #[tool(description = "Get all issues for a specific cycle")]
    pub async fn list_cycle_issues(
        &self,
        params: Parameters<CycleParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = self.project_path(
            &params.0.project_id,
            &format!("cycles/{}/cycle-issues/", segment(&params.0.cycle_id)),
        )?;
        let issues = self.client.get(&path).await.map_err(api_error)?;
        json_result(&issues)
    }

    #[tool(description = "Add issues to a cycle")]
    pub async fn add_cycle_issues(
        &self,
        params: Parameters<AddCycleIssuesParams>,
    ) -> Result<CallToolResult, McpError> {
        let AddCycleIssuesParams {
            project_id,
            cycle_id,
            issues,
        } = params.0;
        let path = self.project_path(&project_id, &format!("cycles/{}/cycle-issues/", segment(&cycle_id)))?;

        let response = self
            .client
            .post(&path, Some(json!({ "issues": issues })))
            .await
            .map_err(api_error)?;
        json_result(&response)
    }

    #[tool(description = "Remove an issue from a cycle")]
    pub async fn delete_cycle_issue(
        &self,
        params: Parameters<CycleIssueParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = self.project_path(
            &params.0.project_id,
            &format!(
                "cycles/{}/cycle-issues/{}/",
                segment(&params.0.cycle_id),
                segment(&params.0.issue_id)
            ),
        )?;
        self.client.delete(&path).await.map_err(api_error)?;
        text_result("Issue removed from cycle successfully")
    }
}
