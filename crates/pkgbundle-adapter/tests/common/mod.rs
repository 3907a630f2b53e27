/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for pkgbundle-adapter tests

use pkgbundle_adapter::{BuildRequest, SystemType};
use wiremock::MockServer;

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Build request for a single rpm package
pub fn rpm_request(package: &str) -> BuildRequest {
    BuildRequest {
        system_type: SystemType::Rpm,
        distribution: "centos7".to_string(),
        arch: None,
        packages: vec![package.to_string()],
        deep_download: false,
    }
}

/// JSON snapshot of a task as the service reports it
pub fn task_json(task_id: &str, status: &str, progress: u32) -> serde_json::Value {
    serde_json::json!({
        "task_id": task_id,
        "status": status,
        "progress": progress,
        "message": "working",
        "packages": ["nginx"],
        "system_type": "rpm",
        "distribution": "centos7",
        "created_at": "2024-05-01T10:00:00"
    })
}
