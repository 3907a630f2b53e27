/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust response structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::enums::TaskStatus;
use super::models::Task;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTaskResponse {
    pub task_id: String,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `GET /api/tasks` answers either a bare array or `{"tasks": [...]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskListResponse {
    Wrapped { tasks: Vec<Task> },
    Bare(Vec<Task>),
}

impl TaskListResponse {
    pub fn into_tasks(self) -> Vec<Task> {
        match self {
            TaskListResponse::Wrapped { tasks } => tasks,
            TaskListResponse::Bare(tasks) => tasks,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteTaskResponse {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub arch: Vec<String>,
}

/// Supported distributions keyed by system type (`rpm`, `deb`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SystemsResponse(pub BTreeMap<String, Vec<DistributionInfo>>);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub active_downloads: u32,
    #[serde(default)]
    pub total_tasks: u32,
}

/// Error body returned with non-2xx statuses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// Flatten `detail` into display text.
    ///
    /// Validation failures carry a list of `{loc, msg, type}` objects instead of a string.
    pub fn detail_text(&self) -> Option<String> {
        match self.detail.as_ref()? {
            serde_json::Value::String(text) => Some(text.clone()),
            serde_json::Value::Array(items) => {
                let messages: Vec<String> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(|msg| msg.as_str()))
                    .map(str::to_string)
                    .collect();
                if messages.is_empty() {
                    Some(serde_json::Value::Array(items.clone()).to_string())
                } else {
                    Some(messages.join("; "))
                }
            }
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}
