/*
[INPUT]:  ClientSettings, TaskService
[OUTPUT]: Wired tracker, registry, downloader and a SessionUpdate stream
[POS]:    Composition root shared by the headless and interactive front ends
[UPDATE]: When a new tracker side effect needs handling
*/

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use pkgbundle_adapter::TaskService;

use crate::config::ClientSettings;
use crate::download::ArchiveDownloader;
use crate::machine::{Notice, SubmitError, SubmitForm};
use crate::registry::TaskRegistry;
use crate::tracker::{TaskTracker, TrackerEvent};

/// Outcome of background work, for the front end to display
#[derive(Debug)]
pub enum SessionUpdate {
    Submitted {
        packages: Vec<String>,
        result: Result<String, SubmitError>,
    },
    Downloaded {
        task_id: String,
        path: PathBuf,
    },
    DownloadFailed {
        task_id: String,
        error: String,
    },
    Notice(Notice),
}

/// One user session against the service
pub struct Session {
    service: Arc<dyn TaskService>,
    tracker: TaskTracker,
    registry: TaskRegistry,
    downloader: ArchiveDownloader,
    updates_tx: mpsc::UnboundedSender<SessionUpdate>,
    updates_rx: mpsc::UnboundedReceiver<SessionUpdate>,
    effects: JoinHandle<()>,
}

impl Session {
    /// Wire components and start handling tracker events. Requires a tokio runtime.
    pub fn new(service: Arc<dyn TaskService>, settings: &ClientSettings) -> Self {
        let (tracker, events_rx) = TaskTracker::new(Arc::clone(&service), settings.tracker_config());
        let registry = TaskRegistry::new(Arc::clone(&service), settings.poll_interval());
        let downloader =
            ArchiveDownloader::new(Arc::clone(&service), settings.resolved_download_dir());
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();

        let effects = tokio::spawn(run_effects(
            events_rx,
            registry.clone(),
            downloader.clone(),
            updates_tx.clone(),
        ));

        Self {
            service,
            tracker,
            registry,
            downloader,
            updates_tx,
            updates_rx,
            effects,
        }
    }

    pub fn service(&self) -> &Arc<dyn TaskService> {
        &self.service
    }

    pub fn tracker(&self) -> &TaskTracker {
        &self.tracker
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    pub fn downloader(&self) -> &ArchiveDownloader {
        &self.downloader
    }

    /// Submit and wait for the creation result
    pub async fn submit(
        &self,
        packages: Vec<String>,
        form: &SubmitForm,
    ) -> Result<String, SubmitError> {
        self.tracker.submit(packages, form).await
    }

    /// Submit without blocking; the result arrives as `SessionUpdate::Submitted`
    pub fn submit_in_background(&self, packages: Vec<String>, form: SubmitForm) {
        let tracker = self.tracker.clone();
        let tx = self.updates_tx.clone();
        tokio::spawn(async move {
            let result = tracker.submit(packages.clone(), &form).await;
            let _ = tx.send(SessionUpdate::Submitted { packages, result });
        });
    }

    /// Download the archive of any completed task, e.g. picked from history
    pub fn download_in_background(&self, task_id: String, file_name: String) {
        spawn_download(self.downloader.clone(), task_id, file_name, self.updates_tx.clone());
    }

    pub async fn next_update(&mut self) -> Option<SessionUpdate> {
        self.updates_rx.recv().await
    }

    pub fn try_next_update(&mut self) -> Option<SessionUpdate> {
        self.updates_rx.try_recv().ok()
    }

    /// Cancel tracking, stop the history poll and the event handler
    pub async fn shutdown(self) {
        self.tracker.shutdown().await;
        self.registry.shutdown().await;
        self.effects.abort();
        info!("session closed");
    }
}

async fn run_effects(
    mut events_rx: mpsc::UnboundedReceiver<TrackerEvent>,
    registry: TaskRegistry,
    downloader: ArchiveDownloader,
    updates_tx: mpsc::UnboundedSender<SessionUpdate>,
) {
    while let Some(event) = events_rx.recv().await {
        match event {
            TrackerEvent::DownloadRequested { task_id, file_name } => {
                spawn_download(downloader.clone(), task_id, file_name, updates_tx.clone());
            }
            TrackerEvent::HistoryRefreshRequested => {
                registry.refresh().await;
            }
            TrackerEvent::Notice(notice) => {
                let _ = updates_tx.send(SessionUpdate::Notice(notice));
            }
        }
    }
}

fn spawn_download(
    downloader: ArchiveDownloader,
    task_id: String,
    file_name: String,
    updates_tx: mpsc::UnboundedSender<SessionUpdate>,
) {
    tokio::spawn(async move {
        let update = match downloader.download(&task_id, &file_name).await {
            Ok(path) => SessionUpdate::Downloaded { task_id, path },
            Err(err) => {
                let error = format!("{err:#}");
                warn!(task_id = %task_id, error = %error, "archive download failed");
                SessionUpdate::DownloadFailed { task_id, error }
            }
        };
        let _ = updates_tx.send(update);
    });
}
