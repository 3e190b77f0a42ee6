//! Project metadata: issue types, states and labels.
//!
//! The three families share one CRUD shape under
//! `workspaces/<slug>/projects/<project_id>/<collection>/`.

use super::ProjectParams;
use crate::mcp::server::{api_error, json_result, require_fields, segment, PlaneMcpServer};
use rmcp::{
    handler::server::wrapper::Parameters,
    model::*,
    tool, tool_router, ErrorData as McpError,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const ISSUE_TYPES: &str = "issue-types";
const STATES: &str = "states";
const LABELS: &str = "labels";

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct IssueTypeParams {
    #[schemars(description = "The uuid identifier of the project containing the issue type")]
    pub project_id: String,
    #[schemars(description = "The uuid identifier of the issue type")]
    pub type_id: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateIssueTypeParams {
    #[schemars(description = "The uuid identifier of the project to create the issue type in")]
    pub project_id: String,
    #[schemars(description = "Issue type fields. `name` and `description` are required.")]
    pub issue_type_data: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UpdateIssueTypeParams {
    #[schemars(description = "The uuid identifier of the project containing the issue type")]
    pub project_id: String,
    #[schemars(description = "The uuid identifier of the issue type to update")]
    pub type_id: String,
    #[schemars(description = "The fields to update on the issue type")]
    pub issue_type_data: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct StateParams {
    #[schemars(description = "The uuid identifier of the project containing the state")]
    pub project_id: String,
    #[schemars(description = "The uuid identifier of the state")]
    pub state_id: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateStateParams {
    #[schemars(description = "The uuid identifier of the project to create the state in")]
    pub project_id: String,
    #[schemars(
        description = "State fields. `name`, `color` and `group` (backlog, unstarted, started, completed, cancelled) are required."
    )]
    pub state_data: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UpdateStateParams {
    #[schemars(description = "The uuid identifier of the project containing the state")]
    pub project_id: String,
    #[schemars(description = "The uuid identifier of the state to update")]
    pub state_id: String,
    #[schemars(description = "The fields to update on the state")]
    pub state_data: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct LabelParams {
    #[schemars(description = "The uuid identifier of the project containing the label")]
    pub project_id: String,
    #[schemars(description = "The uuid identifier of the label")]
    pub label_id: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateLabelParams {
    #[schemars(description = "The uuid identifier of the project to create the label in")]
    pub project_id: String,
    #[schemars(description = "Label fields. `name` and `color` are required.")]
    pub label_data: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UpdateLabelParams {
    #[schemars(description = "The uuid identifier of the project containing the label")]
    pub project_id: String,
    #[schemars(description = "The uuid identifier of the label to update")]
    pub label_id: String,
    #[schemars(description = "The fields to update on the label")]
    pub label_data: Map<String, Value>,
}

impl PlaneMcpServer {
    async fn list_collection(
        &self,
        project_id: &str,
        collection: &str,
    ) -> Result<CallToolResult, McpError> {
        let path = self.project_path(project_id, &format!("{}/", collection))?;
        let items = self.client.get(&path).await.map_err(api_error)?;
        json_result(&items)
    }

    async fn get_member(
        &self,
        project_id: &str,
        collection: &str,
        id: &str,
    ) -> Result<CallToolResult, McpError> {
        let path = self.project_path(project_id, &format!("{}/{}/", collection, segment(id)))?;
        let item = self.client.get(&path).await.map_err(api_error)?;
        json_result(&item)
    }

    async fn create_member(
        &self,
        project_id: &str,
        collection: &str,
        data: Map<String, Value>,
        required: &[&str],
    ) -> Result<CallToolResult, McpError> {
        require_fields(&data, required)?;
        let path = self.project_path(project_id, &format!("{}/", collection))?;
        let item = self
            .client
            .post(&path, Some(Value::Object(data)))
            .await
            .map_err(api_error)?;
        json_result(&item)
    }

    async fn update_member(
        &self,
        project_id: &str,
        collection: &str,
        id: &str,
        data: Map<String, Value>,
    ) -> Result<CallToolResult, McpError> {
        let path = self.project_path(project_id, &format!("{}/{}/", collection, segment(id)))?;
        let item = self
            .client
            .patch(&path, Some(Value::Object(data)))
            .await
            .map_err(api_error)?;
        json_result(&item)
    }

    async fn delete_member(
        &self,
        project_id: &str,
        collection: &str,
        id: &str,
    ) -> Result<CallToolResult, McpError> {
        let path = self.project_path(project_id, &format!("{}/{}/", collection, segment(id)))?;
        let response = self.client.delete(&path).await.map_err(api_error)?;
        json_result(&response)
    }
}

#[tool_router(router = metadata_tool_router, vis = "pub(crate)")]
impl PlaneMcpServer {
    // Issue types

    #[tool(description = "Get all issue types for a specific project")]
    pub async fn list_issue_types(
        &self,
        params: Parameters<ProjectParams>,
    ) -> Result<CallToolResult, McpError> {
        self.list_collection(&params.0.project_id, ISSUE_TYPES).await
    }

    #[tool(description = "Get details of a specific issue type")]
    pub async fn get_issue_type(
        &self,
        params: Parameters<IssueTypeParams>,
    ) -> Result<CallToolResult, McpError> {
        self.get_member(&params.0.project_id, ISSUE_TYPES, &params.0.type_id)
            .await
    }

    #[tool(description = "Create a new issue type in a project")]
    pub async fn create_issue_type(
        &self,
        params: Parameters<CreateIssueTypeParams>,
    ) -> Result<CallToolResult, McpError> {
        let CreateIssueTypeParams {
            project_id,
            issue_type_data,
        } = params.0;
        self.create_member(&project_id, ISSUE_TYPES, issue_type_data, &["name", "description"])
            .await
    }

    #[tool(description = "Update an existing issue type")]
    pub async fn update_issue_type(
        &self,
        params: Parameters<UpdateIssueTypeParams>,
    ) -> Result<CallToolResult, McpError> {
        let UpdateIssueTypeParams {
            project_id,
            type_id,
            issue_type_data,
        } = params.0;
        self.update_member(&project_id, ISSUE_TYPES, &type_id, issue_type_data)
            .await
    }

    #[tool(description = "Delete an issue type")]
    pub async fn delete_issue_type(
        &self,
        params: Parameters<IssueTypeParams>,
    ) -> Result<CallToolResult, McpError> {
        self.delete_member(&params.0.project_id, ISSUE_TYPES, &params.0.type_id)
            .await
    }

    // States

    #[tool(description = "Get all states for a specific project")]
    pub async fn list_states(
        &self,
        params: Parameters<ProjectParams>,
    ) -> Result<CallToolResult, McpError> {
        self.list_collection(&params.0.project_id, STATES).await
    }

    #[tool(description = "Get details of a specific state")]
    pub async fn get_state(
        &self,
        params: Parameters<StateParams>,
    ) -> Result<CallToolResult, McpError> {
        self.get_member(&params.0.project_id, STATES, &params.0.state_id)
            .await
    }

    #[tool(description = "Create a new state in a project")]
    pub async fn create_state(
        &self,
        params: Parameters<CreateStateParams>,
    ) -> Result<CallToolResult, McpError> {
        let CreateStateParams {
            project_id,
            state_data,
        } = params.0;
        self.create_member(&project_id, STATES, state_data, &["name", "color", "group"])
            .await
    }

    #[tool(description = "Update an existing state")]
    pub async fn update_state(
        &self,
        params: Parameters<UpdateStateParams>,
    ) -> Result<CallToolResult, McpError> {
        let UpdateStateParams {
            project_id,
            state_id,
            state_data,
        } = params.0;
        self.update_member(&project_id, STATES, &state_id, state_data)
            .await
    }

    #[tool(description = "Delete a state")]
    pub async fn delete_state(
        &self,
        params: Parameters<StateParams>,
    ) -> Result<CallToolResult, McpError> {
        self.delete_member(&params.0.project_id, STATES, &params.0.state_id)
            .await
    }

    // Labels

    #[tool(description = "Get all labels for a specific project")]
    pub async fn list_labels(
        &self,
        params: Parameters<ProjectParams>,
    ) -> Result<CallToolResult, McpError> {
        self.list_collection(&params.0.project_id, LABELS).await
    }

    #[tool(description = "Get details of a specific label")]
    pub async fn get_label(
        &self,
        params: Parameters<LabelParams>,
    ) -> Result<CallToolResult, McpError> {
        self.get_member(&params.0.project_id, LABELS, &params.0.label_id)
            .await
    }

    #[tool(description = "Create a new label in a project")]
    pub async fn create_label(
        &self,
        params: Parameters<CreateLabelParams>,
    ) -> Result<CallToolResult, McpError> {
        let CreateLabelParams {
            project_id,
            label_data,
        } = params.0;
        self.create_member(&project_id, LABELS, label_data, &["name", "color"])
            .await
    }

    #[tool(description = "Update an existing label")]
    pub async fn update_label(
        &self,
        params: Parameters<UpdateLabelParams>,
    ) -> Result<CallToolResult, McpError> {
        let UpdateLabelParams {
            project_id,
            label_id,
            label_data,
        } = params.0;
        self.update_member(&project_id, LABELS, &label_id, label_data)
            .await
    }

    #[tool(description = "Delete a label")]
    pub async fn delete_label(
        &self,
        params: Parameters<LabelParams>,
    ) -> Result<CallToolResult, McpError> {
        self.delete_member(&params.0.project_id, LABELS, &params.0.label_id)
            .await
    }
}
