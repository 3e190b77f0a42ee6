//! Pages family. Every path here classifies as session mode, so these tools
//! fail with an authentication error until `plane_login` has succeeded.

use super::ProjectParams;
use crate::mcp::server::{api_error, json_result, segment, PlaneMcpServer};
use crate::plane::types::PageSummary;
use rmcp::{
    handler::server::wrapper::Parameters,
    model::*,
    tool, tool_router, ErrorData as McpError,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct PageParams {
    #[schemars(description = "The uuid identifier of the project containing the page")]
    pub project_id: String,
    #[schemars(description = "The uuid identifier of the page")]
    pub page_id: String,
}

/// Writable page fields; unset fields are left out of the request body
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct PageFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "The HTML content of the page")]
    pub description_html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "0 = Public, 1 = Private. Defaults to 0 (Public)")]
    pub access: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Color for the page")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Parent page ID if this is a sub-page")]
    pub parent: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreatePageParams {
    #[schemars(description = "The uuid identifier of the project to create the page in")]
    pub project_id: String,
    #[schemars(description = "The name of the page")]
    pub name: String,
    #[serde(flatten)]
    pub fields: PageFields,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UpdatePageParams {
    #[schemars(description = "The uuid identifier of the project containing the page")]
    pub project_id: String,
    #[schemars(description = "The uuid identifier of the page to update")]
    pub page_id: String,
    #[serde(default)]
    #[schemars(description = "The name of the page")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub fields: PageFields,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SetPageAccessParams {
    #[schemars(description = "The uuid identifier of the project containing the page")]
    pub project_id: String,
    #[schemars(description = "The uuid identifier of the page to update")]
    pub page_id: String,
    #[schemars(description = "0 = Public, 1 = Private")]
    pub access: u8,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct PageDescriptionParams {
    #[schemars(description = "The uuid identifier of the project containing the page")]
    pub project_id: String,
    #[schemars(description = "The uuid identifier of the page")]
    pub page_id: String,
    #[schemars(description = "The HTML content for the page description")]
    pub description_html: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct PageVersionParams {
    #[schemars(description = "The uuid identifier of the project containing the page")]
    pub project_id: String,
    #[schemars(description = "The uuid identifier of the page")]
    pub page_id: String,
    #[schemars(description = "The uuid identifier of the specific version")]
    pub version_id: String,
}

fn check_access(access: Option<u8>) -> Result<(), McpError> {
    match access {
        Some(level) if level > 1 => Err(McpError::invalid_params(
            "access must be 0 (Public) or 1 (Private)",
            None,
        )),
        _ => Ok(()),
    }
}

/// Merge `name` with the optional page fields into one JSON object
fn page_body(name: Option<String>, fields: PageFields) -> Result<Value, McpError> {
    check_access(fields.access)?;
    let mut body =
        serde_json::to_value(fields).map_err(|e| McpError::internal_error(e.to_string(), None))?;
    if let (Some(name), Some(object)) = (name, body.as_object_mut()) {
        object.insert("name".to_string(), Value::String(name));
    }
    Ok(body)
}

fn page_action(message: &str, page_id: &str) -> Result<CallToolResult, McpError> {
    json_result(&json!({ "message": message, "page_id": page_id }))
}

impl PlaneMcpServer {
    fn page_path(&self, project_id: &str, page_id: &str, rest: &str) -> Result<String, McpError> {
        self.project_path(project_id, &format!("pages/{}/{}", segment(page_id), rest))
    }
}

#[tool_router(router = page_tool_router, vis = "pub(crate)")]
impl PlaneMcpServer {
    #[tool(description = "Get all pages for a specific project")]
    pub async fn list_pages(
        &self,
        params: Parameters<ProjectParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = self.project_path(&params.0.project_id, "pages/")?;
        let pages: Vec<PageSummary> = self
            .client
            .request("GET", &path, None)
            .await
            .map_err(api_error)?;
        json_result(&pages)
    }

    #[tool(description = "Get details of a specific page")]
    pub async fn get_page(&self, params: Parameters<PageParams>) -> Result<CallToolResult, McpError> {
        let path = self.page_path(&params.0.project_id, &params.0.page_id, "")?;
        let page = self.client.get(&path).await.map_err(api_error)?;
        json_result(&page)
    }

    #[tool(description = "Create a new page in a project")]
    pub async fn create_page(
        &self,
        params: Parameters<CreatePageParams>,
    ) -> Result<CallToolResult, McpError> {
        let CreatePageParams {
            project_id,
            name,
            fields,
        } = params.0;
        let body = page_body(Some(name), fields)?;

        let path = self.project_path(&project_id, "pages/")?;
        let page = self.client.post(&path, Some(body)).await.map_err(api_error)?;
        json_result(&page)
    }

    #[tool(description = "Update an existing page")]
    pub async fn update_page(
        &self,
        params: Parameters<UpdatePageParams>,
    ) -> Result<CallToolResult, McpError> {
        let UpdatePageParams {
            project_id,
            page_id,
            name,
            fields,
        } = params.0;
        let body = page_body(name, fields)?;

        let path = self.page_path(&project_id, &page_id, "")?;
        let page = self.client.patch(&path, Some(body)).await.map_err(api_error)?;
        json_result(&page)
    }

    #[tool(description = "Delete a page")]
    pub async fn delete_page(
        &self,
        params: Parameters<PageParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = self.page_path(&params.0.project_id, &params.0.page_id, "")?;
        self.client.delete(&path).await.map_err(api_error)?;
        page_action("Page deleted successfully", &params.0.page_id)
    }

    #[tool(description = "Archive a page")]
    pub async fn archive_page(
        &self,
        params: Parameters<PageParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = self.page_path(&params.0.project_id, &params.0.page_id, "archive/")?;
        self.client.post(&path, None).await.map_err(api_error)?;
        page_action("Page archived successfully", &params.0.page_id)
    }

    #[tool(description = "Unarchive a page")]
    pub async fn unarchive_page(
        &self,
        params: Parameters<PageParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = self.page_path(&params.0.project_id, &params.0.page_id, "archive/")?;
        self.client.delete(&path).await.map_err(api_error)?;
        page_action("Page unarchived successfully", &params.0.page_id)
    }

    #[tool(description = "Lock a page to prevent editing")]
    pub async fn lock_page(&self, params: Parameters<PageParams>) -> Result<CallToolResult, McpError> {
        let path = self.page_path(&params.0.project_id, &params.0.page_id, "lock/")?;
        self.client.post(&path, None).await.map_err(api_error)?;
        page_action("Page locked successfully", &params.0.page_id)
    }

    #[tool(description = "Unlock a page to allow editing")]
    pub async fn unlock_page(
        &self,
        params: Parameters<PageParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = self.page_path(&params.0.project_id, &params.0.page_id, "lock/")?;
        self.client.delete(&path).await.map_err(api_error)?;
        page_action("Page unlocked successfully", &params.0.page_id)
    }

    #[tool(description = "Mark a page as favorite for quick access")]
    pub async fn favorite_page(
        &self,
        params: Parameters<PageParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = self.project_path(
            &params.0.project_id,
            &format!("favorite-pages/{}/", segment(&params.0.page_id)),
        )?;
        self.client.post(&path, None).await.map_err(api_error)?;
        page_action("Page marked as favorite", &params.0.page_id)
    }

    #[tool(description = "Remove a page from favorites")]
    pub async fn unfavorite_page(
        &self,
        params: Parameters<PageParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = self.project_path(
            &params.0.project_id,
            &format!("favorite-pages/{}/", segment(&params.0.page_id)),
        )?;
        self.client.delete(&path).await.map_err(api_error)?;
        page_action("Page removed from favorites", &params.0.page_id)
    }

    #[tool(description = "Duplicate a page to create a template or copy")]
    pub async fn duplicate_page(
        &self,
        params: Parameters<PageParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = self.page_path(&params.0.project_id, &params.0.page_id, "duplicate/")?;
        let page = self.client.post(&path, None).await.map_err(api_error)?;
        json_result(&page)
    }

    #[tool(description = "Set page access level (public or private)")]
    pub async fn set_page_access(
        &self,
        params: Parameters<SetPageAccessParams>,
    ) -> Result<CallToolResult, McpError> {
        check_access(Some(params.0.access))?;
        let path = self.page_path(&params.0.project_id, &params.0.page_id, "access/")?;
        let page = self
            .client
            .post(&path, Some(json!({ "access": params.0.access })))
            .await
            .map_err(api_error)?;
        json_result(&page)
    }

    #[tool(description = "Get a summary view of pages (filtered list of root-level pages)")]
    pub async fn get_pages_summary(
        &self,
        params: Parameters<ProjectParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = self.project_path(&params.0.project_id, "pages-summary/")?;
        let summary = self.client.get(&path).await.map_err(api_error)?;
        json_result(&summary)
    }

    #[tool(description = "Get the description content of a specific page")]
    pub async fn get_page_description(
        &self,
        params: Parameters<PageParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = self.page_path(&params.0.project_id, &params.0.page_id, "description/")?;
        let description = self.client.get(&path).await.map_err(api_error)?;
        json_result(&description)
    }

    #[tool(description = "Update the description content of a specific page")]
    pub async fn update_page_description(
        &self,
        params: Parameters<PageDescriptionParams>,
    ) -> Result<CallToolResult, McpError> {
        let PageDescriptionParams {
            project_id,
            page_id,
            description_html,
        } = params.0;
        let path = self.page_path(&project_id, &page_id, "description/")?;

        let description = self
            .client
            .patch(&path, Some(json!({ "description_html": description_html })))
            .await
            .map_err(api_error)?;
        json_result(&description)
    }

    #[tool(description = "Get version history for a specific page")]
    pub async fn get_page_versions(
        &self,
        params: Parameters<PageParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = self.page_path(&params.0.project_id, &params.0.page_id, "versions/")?;
        let versions = self.client.get(&path).await.map_err(api_error)?;
        json_result(&versions)
    }

    #[tool(description = "Get a specific version of a page")]
    pub async fn get_page_version(
        &self,
        params: Parameters<PageVersionParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = self.page_path(
            &params.0.project_id,
            &params.0.page_id,
            &format!("versions/{}/", segment(&params.0.version_id)),
        )?;
        let version = self.client.get(&path).await.map_err(api_error)?;
        json_result(&version)
    }
}
