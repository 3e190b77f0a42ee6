use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Cursor-paginated list envelope returned by Plane list endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct Paginated<T> {
    #[serde(default)]
    pub total_count: Option<u64>,
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub next_page_results: Option<bool>,
    pub results: Vec<T>,
}

/// Project fields kept by `get_projects`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProjectSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub project_lead: Option<Value>,
}

/// Request body for creating a project
#[derive(Debug, Serialize)]
pub struct CreateProjectRequest {
    pub name: String,
    pub identifier: String,
}

impl CreateProjectRequest {
    /// Plane identifiers are upper-case without spaces
    pub fn new(name: String, identifier: &str) -> Self {
        Self {
            name,
            identifier: identifier.to_uppercase().replace(' ', ""),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StateDetail {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PriorityDetail {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
}

/// Issue as returned by the project issues list
#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub sequence_id: Option<u64>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub state_detail: Option<StateDetail>,
    /// Either a plain priority key or an expanded object
    #[serde(default)]
    pub priority: Option<Value>,
    #[serde(default)]
    pub priority_detail: Option<PriorityDetail>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateSummary {
    pub id: Option<String>,
    pub name: Option<String>,
    pub color: Option<String>,
    pub group: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrioritySummary {
    pub id: Option<String>,
    pub label: Option<String>,
    pub key: Option<String>,
}

/// Issue fields kept by `list_project_issues`
#[derive(Debug, Clone, Serialize)]
pub struct IssueSummary {
    pub id: String,
    pub name: String,
    pub sequence_id: Option<u64>,
    pub state: StateSummary,
    pub priority: PrioritySummary,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<Issue> for IssueSummary {
    fn from(issue: Issue) -> Self {
        let state_detail = issue.state_detail.unwrap_or_default();

        let priority_detail = issue.priority_detail.or_else(|| match &issue.priority {
            Some(value @ Value::Object(_)) => serde_json::from_value(value.clone()).ok(),
            _ => None,
        });
        let priority_id = match &issue.priority {
            Some(Value::String(key)) => Some(key.clone()),
            _ => priority_detail.as_ref().and_then(|p| p.id.clone()),
        };
        let priority_detail = priority_detail.unwrap_or_default();

        IssueSummary {
            id: issue.id,
            name: issue.name,
            sequence_id: issue.sequence_id,
            state: StateSummary {
                id: issue.state.or(state_detail.id),
                name: state_detail.name,
                color: state_detail.color,
                group: state_detail.group,
            },
            priority: PrioritySummary {
                id: priority_id,
                label: priority_detail.label.or(priority_detail.name),
                key: priority_detail.key,
            },
            created_at: issue.created_at,
            updated_at: issue.updated_at,
        }
    }
}

/// Page fields kept by `list_pages`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PageSummary {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub owned_by: Option<String>,
    #[serde(default)]
    pub access: Option<u8>,
    #[serde(default)]
    pub is_locked: Option<bool>,
    #[serde(default)]
    pub is_favorite: Option<bool>,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub archived_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}
