/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for pkgbundle-client tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use pkgbundle_adapter::{BundleClient, SystemType, TaskService};
use pkgbundle_client::machine::{SubmitForm, TrackerView};
use pkgbundle_client::{ClientSettings, Session, SessionUpdate};
use tokio::sync::watch;
use wiremock::MockServer;

pub const WAIT_TIMEOUT: Duration = Duration::from_secs(5);

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

pub fn service_for(server: &MockServer) -> Arc<dyn TaskService> {
    Arc::new(BundleClient::new(&server.uri()).expect("client"))
}

/// Fresh directory under the system temp dir
pub fn temp_dir(tag: &str) -> PathBuf {
    let n = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!("pkgbundle-{tag}-{}-{n}", std::process::id()))
}

/// Fast cadence so lifecycle tests finish quickly
pub fn test_settings(base_url: &str, download_dir: &Path) -> ClientSettings {
    ClientSettings {
        base_url: base_url.to_string(),
        poll_interval_ms: 25,
        cooldown_ms: 60,
        download_dir: Some(download_dir.to_path_buf()),
        ..ClientSettings::default()
    }
}

pub fn test_session(server: &MockServer, download_dir: &Path) -> Session {
    Session::new(service_for(server), &test_settings(&server.uri(), download_dir))
}

pub fn rpm_form() -> SubmitForm {
    SubmitForm {
        system_type: SystemType::Rpm,
        distribution: "centos7".to_string(),
        arch: Some("auto".to_string()),
        deep_download: false,
    }
}

pub fn packages(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
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
        "arch": "auto",
        "created_at": "2024-05-01T10:00:00"
    })
}

pub async fn wait_for_view<F>(rx: &mut watch::Receiver<TrackerView>, predicate: F) -> TrackerView
where
    F: FnMut(&TrackerView) -> bool,
{
    tokio::time::timeout(WAIT_TIMEOUT, rx.wait_for(predicate))
        .await
        .expect("timed out waiting for tracker view")
        .expect("tracker dropped")
        .clone()
}

/// Next download result for `task_id`, skipping other updates
pub async fn wait_for_download(session: &mut Session, task_id: &str) -> Result<PathBuf, String> {
    let wait = async {
        while let Some(update) = session.next_update().await {
            match update {
                SessionUpdate::Downloaded { task_id: id, path } if id == task_id => return Ok(path),
                SessionUpdate::DownloadFailed { task_id: id, error } if id == task_id => {
                    return Err(error);
                }
                _ => {}
            }
        }
        Err("session closed".to_string())
    };
    tokio::time::timeout(WAIT_TIMEOUT, wait)
        .await
        .expect("timed out waiting for download")
}

/// Number of requests the server saw for `path`
pub async fn request_count(server: &MockServer, path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == path)
        .count()
}
