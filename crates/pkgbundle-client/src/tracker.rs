/*
[INPUT]:  TaskService, package snapshot + form, TrackerConfig
[OUTPUT]: watch::Receiver<TrackerView>, TrackerEvent stream (download, history refresh, notices)
[POS]:    Tracker driver - runs the state machine against the network and timers
[UPDATE]: When adding tracker side effects or changing poll/cooldown handling
*/

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use pkgbundle_adapter::{BundleError, TaskService};

use crate::machine::{
    Effect, Notice, SUBMISSION_FALLBACK_MESSAGE, SubmitError, SubmitForm, SubmitTicket,
    TrackerMachine, TrackerView,
};
use crate::poller::Poller;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerConfig {
    pub poll_interval: Duration,
    /// Delay before submit is re-enabled after a terminal transition
    pub cooldown: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(2000),
            cooldown: Duration::from_millis(2000),
        }
    }
}

/// Side effects for the front end to carry out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerEvent {
    DownloadRequested { task_id: String, file_name: String },
    HistoryRefreshRequested,
    Notice(Notice),
}

/// Drives one submission at a time from submit to a terminal state.
///
/// Cheap to clone; clones share the same machine and poll loop.
#[derive(Clone)]
pub struct TaskTracker {
    inner: Arc<TrackerInner>,
}

struct TrackerInner {
    service: Arc<dyn TaskService>,
    config: TrackerConfig,
    machine: Mutex<TrackerMachine>,
    poller: Mutex<Poller>,
    cooldown: Mutex<Option<CancellationToken>>,
    view_tx: watch::Sender<TrackerView>,
    events_tx: mpsc::UnboundedSender<TrackerEvent>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl TaskTracker {
    pub fn new(
        service: Arc<dyn TaskService>,
        config: TrackerConfig,
    ) -> (Self, mpsc::UnboundedReceiver<TrackerEvent>) {
        let machine = TrackerMachine::new();
        let (view_tx, _) = watch::channel(machine.view());
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let tracker = Self {
            inner: Arc::new(TrackerInner {
                service,
                config,
                machine: Mutex::new(machine),
                poller: Mutex::new(Poller::new("tracker")),
                cooldown: Mutex::new(None),
                view_tx,
                events_tx,
            }),
        };
        (tracker, events_rx)
    }

    pub fn subscribe(&self) -> watch::Receiver<TrackerView> {
        self.inner.view_tx.subscribe()
    }

    pub fn view(&self) -> TrackerView {
        self.inner.view_tx.borrow().clone()
    }

    pub fn config(&self) -> TrackerConfig {
        self.inner.config
    }

    pub fn is_polling(&self) -> bool {
        lock(&self.inner.poller).is_running()
    }

    /// Submit `packages` with the chosen target and begin tracking the new task.
    ///
    /// Empty submissions and submissions while busy are refused before any
    /// request is sent. A submission cancelled before the service answered
    /// yields `SubmitError::Cancelled`. The caller clears its package set on `Ok`.
    pub async fn submit(
        &self,
        packages: Vec<String>,
        form: &SubmitForm,
    ) -> Result<String, SubmitError> {
        let SubmitTicket {
            generation,
            request,
        } = lock(&self.inner.machine).begin_submit(packages, form)?;
        self.publish();

        info!(
            system_type = %request.system_type,
            distribution = %request.distribution,
            arch = request.arch.as_deref().unwrap_or("-"),
            packages = request.packages.len(),
            deep_download = request.deep_download,
            "submitting build request"
        );

        match self.inner.service.submit(&request).await {
            Ok(task_id) => {
                info!(task_id = %task_id, "task created");
                let accepted =
                    lock(&self.inner.machine).submission_accepted(generation, task_id.clone());
                match accepted {
                    Ok(effects) => {
                        self.apply(effects);
                        Ok(task_id)
                    }
                    Err(err) => {
                        info!(task_id = %task_id, "submission was cancelled, not tracking task");
                        Err(err)
                    }
                }
            }
            Err(err) => {
                warn!(error = %err, "submission failed");
                let message = submission_error_message(&err);
                let effects = lock(&self.inner.machine).submission_failed(generation, &message)?;
                self.apply(effects);
                let shown = self
                    .view()
                    .notice
                    .map(|notice| notice.text)
                    .unwrap_or_else(|| SUBMISSION_FALLBACK_MESSAGE.to_string());
                Err(SubmitError::Rejected(shown))
            }
        }
    }

    /// Stop tracking: ends the poll, drops a pending cooldown, returns to Idle
    pub fn cancel(&self) {
        let effects = lock(&self.inner.machine).cancel();
        self.apply(effects);
        debug!("tracker cancelled");
    }

    /// Cancel and wait for the poll loop to exit
    pub async fn shutdown(&self) {
        self.cancel();
        let mut poller = std::mem::replace(&mut *lock(&self.inner.poller), Poller::new("tracker"));
        poller.shutdown().await;
    }

    fn apply(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartPolling { task_id } => {
                    self.start_polling(task_id);
                }
                Effect::StopPolling => {
                    lock(&self.inner.poller).stop();
                }
                Effect::RequestDownload { task_id, file_name } => {
                    self.emit(TrackerEvent::DownloadRequested { task_id, file_name });
                }
                Effect::RefreshHistory => self.emit(TrackerEvent::HistoryRefreshRequested),
                Effect::EnableSubmitAfterCooldown => self.schedule_cooldown(),
                Effect::CancelCooldown => {
                    if let Some(token) = lock(&self.inner.cooldown).take() {
                        token.cancel();
                    }
                }
                Effect::Notify(notice) => self.emit(TrackerEvent::Notice(notice)),
            }
        }
        self.publish();
    }

    fn publish(&self) {
        let view = lock(&self.inner.machine).view();
        self.inner.view_tx.send_replace(view);
    }

    fn emit(&self, event: TrackerEvent) {
        if self.inner.events_tx.send(event).is_err() {
            debug!("tracker event receiver dropped");
        }
    }

    fn start_polling(&self, task_id: String) -> bool {
        let weak = Arc::downgrade(&self.inner);
        let interval = self.inner.config.poll_interval;
        lock(&self.inner.poller).start(interval, move || {
            let weak = weak.clone();
            let task_id = task_id.clone();
            async move {
                if let Some(inner) = weak.upgrade() {
                    TaskTracker { inner }.poll_once(&task_id).await;
                }
            }
        })
    }

    async fn poll_once(&self, task_id: &str) {
        match self.inner.service.fetch_task(task_id).await {
            Ok(task) => {
                debug!(
                    task_id = %task_id,
                    status = %task.status,
                    progress = ?task.progress,
                    "task snapshot"
                );
                let effects = lock(&self.inner.machine).observe(&task);
                self.apply(effects);
            }
            Err(err) if err.is_not_found() => {
                warn!(task_id = %task_id, error = %err, "service does not know the task yet, retrying next tick");
            }
            Err(err) => {
                warn!(
                    task_id = %task_id,
                    error = %err,
                    retryable = err.is_retryable(),
                    "task status poll failed, retrying next tick"
                );
            }
        }
    }

    fn schedule_cooldown(&self) {
        let token = CancellationToken::new();
        if let Some(previous) = lock(&self.inner.cooldown).replace(token.clone()) {
            previous.cancel();
        }

        let weak = Arc::downgrade(&self.inner);
        let delay = self.inner.config.cooldown;
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    if let Some(inner) = weak.upgrade() {
                        let tracker = TaskTracker { inner };
                        lock(&tracker.inner.machine).enable_submit();
                        tracker.publish();
                        debug!("submit re-enabled after cooldown");
                    }
                }
            }
        });
    }
}

/// Service detail when the service sent one, else the generic fallback
fn submission_error_message(err: &BundleError) -> String {
    match err {
        BundleError::Api { message, .. } if !message.trim().is_empty() => message.clone(),
        _ => SUBMISSION_FALLBACK_MESSAGE.to_string(),
    }
}
