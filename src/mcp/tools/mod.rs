//! Tool families exposed by [`PlaneMcpServer`](super::PlaneMcpServer).
//!
//! Each module contributes one `#[tool_router]` impl block; the server sums
//! them into a single router.

pub mod auth;
pub mod cycles;
pub mod issues;
pub mod metadata;
pub mod modules;
pub mod pages;
pub mod projects;
pub mod users;
pub mod worklogs;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ProjectParams {
    #[schemars(description = "The uuid identifier of the project")]
    pub project_id: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct IssueParams {
    #[schemars(description = "The uuid identifier of the project containing the issue")]
    pub project_id: String,
    #[schemars(description = "The uuid identifier of the issue")]
    pub issue_id: String,
}
