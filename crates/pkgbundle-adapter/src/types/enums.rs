/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust enums with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Server-side task status.
///
/// Older service builds report `running` where newer ones report `processing`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    #[serde(alias = "running")]
    Processing,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    /// Completed and failed tasks never transition again
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Processing => "processing",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
            TaskStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Package format family of the target system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemType {
    Rpm,
    Deb,
}

impl SystemType {
    pub const ALL: [SystemType; 2] = [SystemType::Rpm, SystemType::Deb];

    pub fn as_str(self) -> &'static str {
        match self {
            SystemType::Rpm => "rpm",
            SystemType::Deb => "deb",
        }
    }
}

impl fmt::Display for SystemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SystemType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rpm" => Ok(SystemType::Rpm),
            "deb" => Ok(SystemType::Deb),
            other => Err(format!("unsupported system type: {other}")),
        }
    }
}
