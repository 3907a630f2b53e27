/*
[INPUT]:  Build requests and task identifiers
[OUTPUT]: Task lifecycle operations behind an object-safe trait
[POS]:    Service abstraction - seam between the lifecycle core and the network
[UPDATE]: When the core needs another service operation
*/

use std::path::Path;

use async_trait::async_trait;

use crate::http::{BundleClient, Result};
use crate::types::{BuildRequest, Task};

/// Operations the client core needs from the bundling service.
///
/// Implemented by [`BundleClient`]; tests provide scripted implementations.
#[async_trait]
pub trait TaskService: Send + Sync {
    /// Submit a build request and return the new task id
    async fn submit(&self, request: &BuildRequest) -> Result<String>;

    /// Fetch the current snapshot of one task
    async fn fetch_task(&self, task_id: &str) -> Result<Task>;

    /// Fetch every known task, in service order
    async fn fetch_tasks(&self) -> Result<Vec<Task>>;

    /// Download the archive of a completed task into `dest`
    async fn download_archive(&self, task_id: &str, dest: &Path) -> Result<u64>;
}

#[async_trait]
impl TaskService for BundleClient {
    async fn submit(&self, request: &BuildRequest) -> Result<String> {
        Ok(self.create_task(request).await?.task_id)
    }

    async fn fetch_task(&self, task_id: &str) -> Result<Task> {
        self.get_task(task_id).await
    }

    async fn fetch_tasks(&self) -> Result<Vec<Task>> {
        self.list_tasks().await
    }

    async fn download_archive(&self, task_id: &str, dest: &Path) -> Result<u64> {
        self.download_archive_to(task_id, dest).await
    }
}
