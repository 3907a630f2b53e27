/*
[INPUT]:  Mock bundling service, TaskRegistry
[OUTPUT]: History list polling verification
[POS]:    Integration test layer - registry against HTTP
[UPDATE]: When registry refresh or polling behavior changes
*/

mod common;

use std::time::Duration;

use common::*;
use pkgbundle_client::TaskRegistry;
use pkgbundle_client::render::{EMPTY_STATE_TEXT, RenderedList, render_task_list};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

fn registry_for(server: &wiremock::MockServer) -> TaskRegistry {
    TaskRegistry::new(service_for(server), Duration::from_millis(25))
}

#[tokio::test]
async fn test_empty_collection_renders_empty_state() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let registry = registry_for(&server);
    assert!(!registry.snapshot().loaded);
    assert!(registry.refresh().await);

    let snapshot = registry.snapshot();
    assert!(snapshot.loaded);
    assert!(snapshot.refreshed_at.is_some());
    assert_eq!(
        render_task_list(&snapshot.tasks),
        RenderedList::Empty(EMPTY_STATE_TEXT)
    );
}

#[tokio::test]
async fn test_list_published_in_service_order() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tasks": [
                task_json("newest", "processing", 10),
                task_json("oldest", "completed", 100),
                {"id": "legacy", "status": "running"}
            ]
        })))
        .mount(&server)
        .await;

    let registry = registry_for(&server);
    registry.refresh().await;

    let ids: Vec<String> = registry
        .snapshot()
        .tasks
        .into_iter()
        .map(|task| task.task_id)
        .collect();
    assert_eq!(ids, vec!["newest", "oldest", "legacy"]);
}

#[tokio::test]
async fn test_failed_refresh_keeps_previous_list() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            task_json("a", "completed", 100),
            task_json("b", "pending", 0)
        ])))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "database locked"})))
        .mount(&server)
        .await;

    let registry = registry_for(&server);
    assert!(registry.refresh().await);
    assert!(!registry.refresh().await);

    let snapshot = registry.snapshot();
    assert_eq!(snapshot.tasks.len(), 2);
    assert_eq!(snapshot.last_error.as_deref(), Some("database locked"));
    assert!(snapshot.loaded);
}

#[tokio::test]
async fn test_polling_start_stop_idempotent() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let registry = registry_for(&server);
    assert!(registry.start_polling());
    assert!(!registry.start_polling());
    assert!(registry.is_polling());

    let mut rx = registry.subscribe();
    tokio::time::timeout(WAIT_TIMEOUT, rx.wait_for(|snapshot| snapshot.loaded))
        .await
        .expect("first poll")
        .expect("registry alive");

    assert!(registry.stop_polling());
    assert!(!registry.stop_polling());
    assert!(!registry.is_polling());

    tokio::time::sleep(Duration::from_millis(60)).await;
    let seen = request_count(&server, "/api/tasks").await;
    tokio::time::sleep(Duration::from_millis(120)).await;
    assert_eq!(request_count(&server, "/api/tasks").await, seen);
}

#[tokio::test]
async fn test_registry_poll_independent_of_tracker() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let dir = temp_dir("independent");
    let session = test_session(&server, &dir);
    assert!(session.registry().start_polling());

    session.tracker().cancel();
    assert!(session.registry().is_polling());

    session.shutdown().await;
    tokio::time::sleep(Duration::from_millis(60)).await;
    let seen = request_count(&server, "/api/tasks").await;
    tokio::time::sleep(Duration::from_millis(120)).await;
    assert_eq!(request_count(&server, "/api/tasks").await, seen);
}
