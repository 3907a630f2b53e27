/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
[UPDATE]: Accept both `task_id` and `id`, plus the nested `request` echo
*/

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::TaskStatus;

/// Request fields as echoed by service builds that nest them under `request`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestEcho {
    #[serde(default)]
    pub packages: Vec<String>,
    #[serde(default)]
    pub system_type: Option<String>,
    #[serde(default)]
    pub distribution: Option<String>,
    #[serde(default)]
    pub arch: Option<String>,
}

/// Snapshot of a server-side bundling task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(alias = "id")]
    pub task_id: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub progress: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_step: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packages: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<RequestEcho>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packages_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
}

impl Task {
    /// Minimal snapshot, mostly useful for tests and fakes
    pub fn new(task_id: impl Into<String>, status: TaskStatus) -> Self {
        Self {
            task_id: task_id.into(),
            status,
            progress: None,
            current_step: None,
            message: None,
            archive_path: None,
            error: None,
            packages: None,
            system_type: None,
            distribution: None,
            arch: None,
            request: None,
            packages_count: None,
            total_size: None,
            created_at: None,
            completed_at: None,
            download_url: None,
        }
    }

    /// Progress clamped to 0..=100
    pub fn progress_percent(&self) -> Option<u8> {
        self.progress.map(|value| value.min(100) as u8)
    }

    pub fn packages(&self) -> &[String] {
        if let Some(packages) = self.packages.as_deref() {
            return packages;
        }
        self.request
            .as_ref()
            .map(|request| request.packages.as_slice())
            .unwrap_or(&[])
    }

    pub fn system_type(&self) -> Option<&str> {
        self.system_type
            .as_deref()
            .or_else(|| self.request.as_ref()?.system_type.as_deref())
    }

    pub fn distribution(&self) -> Option<&str> {
        self.distribution
            .as_deref()
            .or_else(|| self.request.as_ref()?.distribution.as_deref())
    }

    pub fn arch(&self) -> Option<&str> {
        self.arch
            .as_deref()
            .or_else(|| self.request.as_ref()?.arch.as_deref())
    }

    /// Creation time as reported by the service (ISO-8601 without offset)
    pub fn created_at_naive(&self) -> Option<NaiveDateTime> {
        let raw = self.created_at.as_deref()?;
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
            .ok()
            .or_else(|| {
                chrono::DateTime::parse_from_rfc3339(raw)
                    .ok()
                    .map(|dt| dt.naive_utc())
            })
    }
}
