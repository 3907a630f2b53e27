/*
[INPUT]:  Mock HTTP responses
[OUTPUT]: Test results for HTTP client and TaskService implementation
[POS]:    Integration tests - HTTP endpoints
[UPDATE]: When HTTP endpoints change
*/

mod common;

use common::{rpm_request, setup_mock_server, task_json};
use pkgbundle_adapter::{BundleClient, BundleError, ClientConfig, TaskService, TaskStatus};
use tokio_test::assert_ok;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

#[test]
fn test_client_creation() {
    let client = assert_ok!(BundleClient::new("http://127.0.0.1:8000"));
    assert_eq!(client.base_url().as_str(), "http://127.0.0.1:8000/");
}

#[test]
fn test_client_with_config() {
    let config = ClientConfig::default();
    let _client = assert_ok!(BundleClient::with_config(config, "https://bundler.example.com"));
}

#[test]
fn test_client_rejects_garbage_url() {
    let err = BundleClient::new("not a url").unwrap_err();
    assert!(matches!(err, BundleError::UrlParse(_)));
}

#[tokio::test]
async fn test_service_submit_returns_task_id() {
    let server = setup_mock_server().await;
    Mock::given(method("POST"))
        .and(path("/api/download"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "task_id": "t1" })),
        )
        .mount(&server)
        .await;

    let client = assert_ok!(BundleClient::new(&server.uri()));
    let service: &dyn TaskService = &client;
    let task_id = assert_ok!(service.submit(&rpm_request("nginx")).await);
    assert_eq!(task_id, "t1");
}

#[tokio::test]
async fn test_service_fetch_task_and_list() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_json("t1", "running", 40)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            task_json("t1", "running", 40),
            task_json("t0", "failed", 30),
        ])))
        .mount(&server)
        .await;

    let client = assert_ok!(BundleClient::new(&server.uri()));
    let service: &dyn TaskService = &client;

    let task = assert_ok!(service.fetch_task("t1").await);
    assert_eq!(task.status, TaskStatus::Processing);
    assert_eq!(task.progress_percent(), Some(40));

    let tasks = assert_ok!(service.fetch_tasks().await);
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[1].status, TaskStatus::Failed);
}

#[tokio::test]
async fn test_server_error_without_json_detail() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks/t1"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let client = assert_ok!(BundleClient::new(&server.uri()));
    let err = client.get_task("t1").await.unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(err.user_message(), "Bad Gateway");
}

#[tokio::test]
async fn test_unreachable_service_is_http_error() {
    // Nothing listens on port 9 on test machines.
    let client = assert_ok!(BundleClient::new("http://127.0.0.1:9"));
    let err = client.health().await.unwrap_err();
    assert!(matches!(err, BundleError::Http(_)));
    assert!(err.is_retryable());
}
