/*
[INPUT]:  Build requests and task identifiers
[OUTPUT]: Created task ids and task snapshots
[POS]:    HTTP layer - task lifecycle endpoints
[UPDATE]: When adding new task endpoints or changing response format
*/

use reqwest::Method;
use tracing::debug;

use crate::http::{BundleClient, BundleError, Result};
use crate::types::{BuildRequest, CreateTaskResponse, DeleteTaskResponse, Task, TaskListResponse};

impl BundleClient {
    /// Submit a bundling request
    ///
    /// POST /api/download
    pub async fn create_task(&self, request: &BuildRequest) -> Result<CreateTaskResponse> {
        let builder = self.request(Method::POST, &["api", "download"])?.json(request);
        let response: CreateTaskResponse = self.send_json(builder).await?;
        if response.task_id.trim().is_empty() {
            return Err(BundleError::InvalidResponse(
                "service returned an empty task_id".to_string(),
            ));
        }
        debug!(task_id = %response.task_id, "task created");
        Ok(response)
    }

    /// Query a single task snapshot
    ///
    /// GET /api/tasks/{task_id}
    pub async fn get_task(&self, task_id: &str) -> Result<Task> {
        let builder = self.request(Method::GET, &["api", "tasks", task_id])?;
        self.send_json(builder).await
    }

    /// List all known tasks, in service order
    ///
    /// GET /api/tasks
    pub async fn list_tasks(&self) -> Result<Vec<Task>> {
        let builder = self.request(Method::GET, &["api", "tasks"])?;
        let response: TaskListResponse = self.send_json(builder).await?;
        Ok(response.into_tasks())
    }

    /// Delete a task and its files on the service
    ///
    /// DELETE /api/tasks/{task_id}
    pub async fn delete_task(&self, task_id: &str) -> Result<DeleteTaskResponse> {
        let builder = self.request(Method::DELETE, &["api", "tasks", task_id])?;
        self.send_json(builder).await
    }
}

#[cfg(test)]
mod tests {
    use crate::http::{BundleClient, BundleError};
    use crate::types::{BuildRequest, SystemType, TaskStatus};
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn nginx_request() -> BuildRequest {
        BuildRequest {
            system_type: SystemType::Rpm,
            distribution: "centos7".to_string(),
            arch: Some("x86_64".to_string()),
            packages: vec!["nginx".to_string()],
            deep_download: false,
        }
    }

    #[tokio::test]
    async fn test_create_task() {
        let server = MockServer::start().await;

        let _mock = Mock::given(method("POST"))
            .and(path("/api/download"))
            .and(body_json(serde_json::json!({
                "system_type": "rpm",
                "distribution": "centos7",
                "arch": "x86_64",
                "packages": ["nginx"],
                "deep_download": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "task_id": "t1",
                "status": "pending",
                "message": "task created"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = BundleClient::new(&server.uri()).expect("client init");
        let response = client
            .create_task(&nginx_request())
            .await
            .expect("create_task failed");

        assert_eq!(response.task_id, "t1");
        assert_eq!(response.status, Some(TaskStatus::Pending));
    }

    #[tokio::test]
    async fn test_create_task_surfaces_detail() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/download"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "detail": "invalid distribution"
            })))
            .mount(&server)
            .await;

        let client = BundleClient::new(&server.uri()).expect("client init");
        let err = client.create_task(&nginx_request()).await.unwrap_err();

        match err {
            BundleError::Api { code, message } => {
                assert_eq!(code, 400);
                assert_eq!(message, "invalid distribution");
            }
            other => panic!("Expected Api error variant, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_task_rejects_empty_task_id() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/download"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "task_id": "" })),
            )
            .mount(&server)
            .await;

        let client = BundleClient::new(&server.uri()).expect("client init");
        let err = client.create_task(&nginx_request()).await.unwrap_err();
        assert!(matches!(err, BundleError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_get_task() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/tasks/t1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "task_id": "t1",
                "status": "completed",
                "progress": 100,
                "archive_path": "/tmp/t1.tar.gz"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = BundleClient::new(&server.uri()).expect("client init");
        let task = client.get_task("t1").await.expect("get_task failed");

        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.progress_percent(), Some(100));
        assert_eq!(task.archive_path.as_deref(), Some("/tmp/t1.tar.gz"));
    }

    #[tokio::test]
    async fn test_get_task_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/tasks/missing"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({ "detail": "task not found" })),
            )
            .mount(&server)
            .await;

        let client = BundleClient::new(&server.uri()).expect("client init");
        let err = client.get_task("missing").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.user_message(), "task not found");
    }

    #[tokio::test]
    async fn test_list_tasks_keeps_service_order() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/tasks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "tasks": [
                    { "task_id": "newest", "status": "running" },
                    { "task_id": "oldest", "status": "completed" }
                ]
            })))
            .mount(&server)
            .await;

        let client = BundleClient::new(&server.uri()).expect("client init");
        let tasks = client.list_tasks().await.expect("list_tasks failed");

        let ids: Vec<&str> = tasks.iter().map(|task| task.task_id.as_str()).collect();
        assert_eq!(ids, vec!["newest", "oldest"]);
        assert_eq!(tasks[0].status, TaskStatus::Processing);
    }

    #[tokio::test]
    async fn test_list_tasks_malformed_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/tasks"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("not json", "text/plain"))
            .mount(&server)
            .await;

        let client = BundleClient::new(&server.uri()).expect("client init");
        let err = client.list_tasks().await.unwrap_err();
        assert!(matches!(err, BundleError::Serialization(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_delete_task() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/api/tasks/t1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "message": "task deleted" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = BundleClient::new(&server.uri()).expect("client init");
        let response = client.delete_task("t1").await.expect("delete_task failed");
        assert_eq!(response.message, "task deleted");
    }
}
