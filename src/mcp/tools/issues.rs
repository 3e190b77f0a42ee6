use super::IssueParams;
use crate::mcp::server::{api_error, json_result, require_fields, segment, PlaneMcpServer};
use crate::plane::types::{Issue, IssueSummary, Paginated, ProjectSummary};
use rmcp::{
    handler::server::wrapper::Parameters,
    model::*,
    tool, tool_router, ErrorData as McpError,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::debug;

/// Project searched when `search_issues` gets no project id
const DEFAULT_SEARCH_PROJECT: &str = "TEST";

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ListIssuesParams {
    #[schemars(description = "The uuid identifier of the project to get issues for")]
    pub project_id: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ReadableIdentifierParams {
    #[schemars(description = "The readable identifier of the project (e.g., 'FIRST' for FIRST-123)")]
    pub project_identifier: String,
    #[schemars(description = "The issue number (e.g., '123' for FIRST-123)")]
    pub issue_identifier: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct AddCommentParams {
    #[schemars(description = "The uuid identifier of the project containing the issue")]
    pub project_id: String,
    #[schemars(description = "The uuid identifier of the issue to comment on")]
    pub issue_id: String,
    #[schemars(description = "The html content of the comment to add")]
    pub comment_html: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateIssueParams {
    #[schemars(description = "The uuid identifier of the project to create the issue for")]
    pub project_id: String,
    #[schemars(
        description = "Issue fields. `name` and `description_html` are required; any other Plane issue field (state, priority, assignees, labels, ...) is passed through."
    )]
    pub issue_data: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UpdateIssueParams {
    #[schemars(description = "The uuid identifier of the project containing the issue")]
    pub project_id: String,
    #[schemars(description = "The uuid identifier of the issue to update")]
    pub issue_id: String,
    #[schemars(description = "The fields to update on the issue")]
    pub issue_data: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchIssuesParams {
    #[schemars(description = "The search query")]
    pub search: String,
    #[schemars(description = "The uuid identifier of the project to search issues for")]
    pub project_id: Option<String>,
    #[schemars(description = "The number of issues to return")]
    pub limit: Option<u32>,
    #[schemars(description = "Whether to search across all projects in the workspace")]
    pub workspace_search: Option<bool>,
}

/// Query string for `search_issues`, omitting unset and falsy options
fn search_query(params: &SearchIssuesParams) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    if let Some(limit) = params.limit.filter(|l| *l > 0) {
        query.append_pair("limit", &limit.to_string());
    }
    if params.workspace_search == Some(true) {
        query.append_pair("workspace_search", "true");
    }
    if !params.search.is_empty() {
        query.append_pair("search", &params.search);
    }
    query.finish()
}

#[tool_router(router = issue_tool_router, vis = "pub(crate)")]
impl PlaneMcpServer {
    #[tool(
        description = "Get all issues for a specific project. This requests project_id as uuid parameter. If you have a readable identifier for project, you can use the get_projects tool to get the project_id from it"
    )]
    pub async fn list_project_issues(
        &self,
        params: Parameters<ListIssuesParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = self.project_path(&params.0.project_id, "issues/")?;
        let page: Paginated<Issue> = self
            .client
            .request("GET", &path, None)
            .await
            .map_err(api_error)?;

        let results: Vec<IssueSummary> = page.results.into_iter().map(IssueSummary::from).collect();
        json_result(&json!({
            "total_count": page.total_count,
            "count": page.count,
            "results": results,
        }))
    }

    #[tool(
        description = "Get a specific issue using its readable identifier. When issue identifier is provided something like FIRST-123, ABC-123, etc. For FIRST-123, project_identifier is FIRST and issue_identifier is 123"
    )]
    pub async fn get_issue_using_readable_identifier(
        &self,
        params: Parameters<ReadableIdentifierParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = self.workspace_path(&format!(
            "issues/{}-{}/",
            segment(&params.0.project_identifier),
            segment(&params.0.issue_identifier)
        ))?;
        let issue = self.client.get(&path).await.map_err(api_error)?;
        json_result(&issue)
    }

    #[tool(
        description = "Get all comments for a specific issue. This requests project_id and issue_id as uuid parameters. If you have a readable identifier, you can use the get_issue_using_readable_identifier tool to get the issue_id and project_id"
    )]
    pub async fn get_issue_comments(
        &self,
        params: Parameters<IssueParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = self.project_path(
            &params.0.project_id,
            &format!("issues/{}/comments/", segment(&params.0.issue_id)),
        )?;
        let comments = self.client.get(&path).await.map_err(api_error)?;
        json_result(&comments)
    }

    #[tool(
        description = "Add a comment to a specific issue. This requests project_id and issue_id as uuid parameters. If you have a readable identifier, you can use the get_issue_using_readable_identifier tool to get the issue_id and project_id"
    )]
    pub async fn add_issue_comment(
        &self,
        params: Parameters<AddCommentParams>,
    ) -> Result<CallToolResult, McpError> {
        let AddCommentParams {
            project_id,
            issue_id,
            comment_html,
        } = params.0;
        let path = self.project_path(&project_id, &format!("issues/{}/comments/", segment(&issue_id)))?;

        let comment = self
            .client
            .post(&path, Some(json!({ "comment_html": comment_html })))
            .await
            .map_err(api_error)?;
        json_result(&comment)
    }

    #[tool(
        description = "Create an issue. This requests project_id as uuid parameter. If you have a readable identifier for project, you can use the get_projects tool to get the project_id from it"
    )]
    pub async fn create_issue(
        &self,
        params: Parameters<CreateIssueParams>,
    ) -> Result<CallToolResult, McpError> {
        require_fields(&params.0.issue_data, &["name", "description_html"])?;
        let path = self.project_path(&params.0.project_id, "issues/")?;

        let issue = self
            .client
            .post(&path, Some(Value::Object(params.0.issue_data)))
            .await
            .map_err(api_error)?;
        json_result(&issue)
    }

    #[tool(
        description = "Update an issue. This requests project_id and issue_id as uuid parameters. If you have a readable identifier, you can use the get_issue_using_readable_identifier tool to get the issue_id and project_id"
    )]
    pub async fn update_issue(
        &self,
        params: Parameters<UpdateIssueParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = self.project_path(
            &params.0.project_id,
            &format!("issues/{}/", segment(&params.0.issue_id)),
        )?;

        let issue = self
            .client
            .patch(&path, Some(Value::Object(params.0.issue_data)))
            .await
            .map_err(api_error)?;
        json_result(&issue)
    }

    #[tool(
        description = "Use this to search issues by text query. If no project_id is provided, defaults to the 'TEST' project. If you have a readable identifier for project, you can use the get_projects tool to get the project_id from it"
    )]
    pub async fn search_issues(
        &self,
        params: Parameters<SearchIssuesParams>,
    ) -> Result<CallToolResult, McpError> {
        let query = search_query(&params.0);

        let project_id = match params.0.project_id {
            Some(id) => id,
            None => {
                debug!(
                    identifier = DEFAULT_SEARCH_PROJECT,
                    "No project given, resolving default search project"
                );
                let path = self.workspace_path("projects/")?;
                let projects: Paginated<ProjectSummary> = self
                    .client
                    .request("GET", &path, None)
                    .await
                    .map_err(api_error)?;

                projects
                    .results
                    .into_iter()
                    .find(|p| p.identifier.as_deref() == Some(DEFAULT_SEARCH_PROJECT))
                    .map(|p| p.id)
                    .ok_or_else(|| {
                        McpError::invalid_params(
                            "TEST project not found. Please provide a project_id or ensure TEST project exists.",
                            None,
                        )
                    })?
            }
        };

        let path = self.project_path(&project_id, &format!("issues/?{}", query))?;
        let issues = self.client.get(&path).await.map_err(api_error)?;
        json_result(&issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(search: &str) -> SearchIssuesParams {
        SearchIssuesParams {
            search: search.to_string(),
            project_id: None,
            limit: None,
            workspace_search: None,
        }
    }

    #[test]
    fn test_search_query_only_search() {
        assert_eq!(search_query(&params("login bug")), "search=login+bug");
    }

    #[test]
    fn test_search_query_all_options() {
        let mut p = params("sso");
        p.limit = Some(5);
        p.workspace_search = Some(true);
        assert_eq!(search_query(&p), "limit=5&workspace_search=true&search=sso");
    }

    #[test]
    fn test_search_query_skips_falsy_options() {
        let mut p = params("");
        p.limit = Some(0);
        p.workspace_search = Some(false);
        assert_eq!(search_query(&p), "");
    }
}
