/*
[INPUT]:  TaskService, poll interval
[OUTPUT]: watch::Receiver<RegistrySnapshot> with the service's task list
[POS]:    History view source - read-only poller over all tasks
[UPDATE]: When the history view needs more than the raw list
*/

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::sync::watch;
use tracing::{debug, warn};

use pkgbundle_adapter::{Task, TaskService};

use crate::poller::Poller;

/// Latest known task list.
///
/// A failed refresh keeps `tasks` and only records `last_error`.
#[derive(Debug, Clone, Default)]
pub struct RegistrySnapshot {
    pub tasks: Vec<Task>,
    /// Set once any fetch succeeded
    pub loaded: bool,
    pub last_error: Option<String>,
    pub refreshed_at: Option<DateTime<Local>>,
}

#[derive(Clone)]
pub struct TaskRegistry {
    inner: Arc<RegistryInner>,
}

struct RegistryInner {
    service: Arc<dyn TaskService>,
    interval: Duration,
    poller: Mutex<Poller>,
    snapshot_tx: watch::Sender<RegistrySnapshot>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl TaskRegistry {
    pub fn new(service: Arc<dyn TaskService>, interval: Duration) -> Self {
        let (snapshot_tx, _) = watch::channel(RegistrySnapshot::default());
        Self {
            inner: Arc::new(RegistryInner {
                service,
                interval,
                poller: Mutex::new(Poller::new("registry")),
                snapshot_tx,
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<RegistrySnapshot> {
        self.inner.snapshot_tx.subscribe()
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        self.inner.snapshot_tx.borrow().clone()
    }

    /// Fetch the list once; returns whether the fetch succeeded
    pub async fn refresh(&self) -> bool {
        match self.inner.service.fetch_tasks().await {
            Ok(tasks) => {
                debug!(count = tasks.len(), "task list refreshed");
                self.inner.snapshot_tx.send_modify(|snapshot| {
                    snapshot.tasks = tasks;
                    snapshot.loaded = true;
                    snapshot.last_error = None;
                    snapshot.refreshed_at = Some(Local::now());
                });
                true
            }
            Err(err) => {
                warn!(
                    error = %err,
                    retryable = err.is_retryable(),
                    "task list refresh failed, keeping previous list"
                );
                let message = err.user_message();
                self.inner
                    .snapshot_tx
                    .send_modify(|snapshot| snapshot.last_error = Some(message));
                false
            }
        }
    }

    /// Returns `false` when already polling
    pub fn start_polling(&self) -> bool {
        let weak = Arc::downgrade(&self.inner);
        lock(&self.inner.poller).start(self.inner.interval, move || {
            let weak = weak.clone();
            async move {
                if let Some(inner) = weak.upgrade() {
                    TaskRegistry { inner }.refresh().await;
                }
            }
        })
    }

    /// Returns `false` when not polling
    pub fn stop_polling(&self) -> bool {
        lock(&self.inner.poller).stop()
    }

    pub fn is_polling(&self) -> bool {
        lock(&self.inner.poller).is_running()
    }

    pub async fn shutdown(&self) {
        let mut poller = std::mem::replace(&mut *lock(&self.inner.poller), Poller::new("registry"));
        poller.shutdown().await;
    }
}
