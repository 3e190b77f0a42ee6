use super::ProjectParams;
use crate::mcp::server::{api_error, json_result, require_fields, segment, PlaneMcpServer};
use rmcp::{
    handler::server::wrapper::Parameters,
    model::*,
    tool, tool_router, ErrorData as McpError,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ModuleParams {
    #[schemars(description = "The uuid identifier of the project containing the module")]
    pub project_id: String,
    #[schemars(description = "The uuid identifier of the module")]
    pub module_id: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateModuleParams {
    #[schemars(description = "The uuid identifier of the project to create the module in")]
    pub project_id: String,
    #[schemars(description = "The data for creating the module. `name` is required.")]
    pub module_data: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UpdateModuleParams {
    #[schemars(description = "The uuid identifier of the project containing the module")]
    pub project_id: String,
    #[schemars(description = "The uuid identifier of the module to update")]
    pub module_id: String,
    #[schemars(description = "The fields to update on the module")]
    pub module_data: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct AddModuleIssuesParams {
    #[schemars(description = "The uuid identifier of the project containing the module")]
    pub project_id: String,
    #[schemars(description = "The uuid identifier of the module to add issues to")]
    pub module_id: String,
    #[schemars(description = "Array of issue UUIDs to add to the module")]
    pub issues: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ModuleIssueParams {
    #[schemars(description = "The uuid identifier of the project containing the module")]
    pub project_id: String,
    #[schemars(description = "The uuid identifier of the module containing the issue")]
    pub module_id: String,
    #[schemars(description = "The uuid identifier of the issue to remove from the module")]
    pub issue_id: String,
}

#[tool_router(router = module_tool_router, vis = "pub(crate)")]
impl PlaneMcpServer {
    #[tool(description = "Get all modules for a specific project")]
    pub async fn list_modules(
        &self,
        params: Parameters<ProjectParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = self.project_path(&params.0.project_id, "modules/")?;
        let modules = self.client.get(&path).await.map_err(api_error)?;
        json_result(&modules)
    }

    #[tool(description = "Get details of a specific module")]
    pub async fn get_module(
        &self,
        params: Parameters<ModuleParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = self.project_path(
            &params.0.project_id,
            &format!("modules/{}/", segment(&params.0.module_id)),
        )?;
        let module = self.client.get(&path).await.map_err(api_error)?;
        json_result(&module)
    }

    #[tool(description = "Create a new module in a project")]
    pub async fn create_module(
        &self,
        params: Parameters<CreateModuleParams>,
    ) -> Result<CallToolResult, McpError> {
        require_fields(&params.0.module_data, &["name"])?;
        let path = self.project_path(&params.0.project_id, "modules/")?;

        let module = self
            .client
            .post(&path, Some(Value::Object(params.0.module_data)))
            .await
            .map_err(api_error)?;
        json_result(&module)
    }

    #[tool(description = "Update an existing module")]
    pub async fn update_module(
        &self,
        params: Parameters<UpdateModuleParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = self.project_path(
            &params.0.project_id,
            &format!("modules/{}/", segment(&params.0.module_id)),
        )?;
        let module = self
            .client
            .patch(&path, Some(Value::Object(params.0.module_data)))
            .await
            .map_err(api_error)?;
        json_result(&module)
    }

    #[tool(description = "Delete a module")]
    pub async fn delete_module(
        &self,
        params: Parameters<ModuleParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = self.project_path(
            &params.0.project_id,
            &format!("modules/{}/", segment(&params.0.module_id)),
        )?;
        let response = self.client.delete(&path).await.map_err(api_error)?;
        json_result(&response)
    }

    #[tool(description = "Get all issues for a specific module")]
    pub async fn list_module_issues(
        &self,
        params: Parameters<ModuleParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = self.project_path(
            &params.0.project_id,
            &format!("modules/{}/module-issues/", segment(&params.0.module_id)),
        )?;
        let issues = self.client.get(&path).await.map_err(api_error)?;
        json_result(&issues)
    }

    #[tool(description = "Add issues to a module. Assign module to issues.")]
    pub async fn add_module_issues(
        &self,
        params: Parameters<AddModuleIssuesParams>,
    ) -> Result<CallToolResult, McpError> {
        let AddModuleIssuesParams {
            project_id,
            module_id,
            issues,
        } = params.0;
        let path =
            self.project_path(&project_id, &format!("modules/{}/module-issues/", segment(&module_id)))?;

        let response = self
            .client
            .post(&path, Some(json!({ "issues": issues })))
            .await
            .map_err(api_error)?;
        json_result(&response)
    }

    #[tool(description = "Remove an issue from a module. Unassign module from issue.")]
    pub async fn delete_module_issue(
        &self,
        params: Parameters<ModuleIssueParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = self.project_path(
            &params.0.project_id,
            &format!(
                "modules/{}/module-issues/{}/",
                segment(&params.0.module_id),
                segment(&params.0.issue_id)
            ),
        )?;
        let response = self.client.delete(&path).await.map_err(api_error)?;
        json_result(&response)
    }
}
