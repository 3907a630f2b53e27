/*
[INPUT]:  Submit requests, creation results, polled task snapshots
[OUTPUT]: Tracker phase, progress view, and the side effects a driver must run
[POS]:    Tracker domain logic - pure state machine, no I/O and no timers
[UPDATE]: When lifecycle transitions or user-facing progress texts change
*/

use thiserror::Error;

use pkgbundle_adapter::{BuildRequest, SystemType, Task, TaskStatus};

use crate::download::archive_file_name;

pub const EMPTY_SUBMISSION_MESSAGE: &str = "enter at least one package name";
pub const SUBMISSION_FALLBACK_MESSAGE: &str = "submission failed";
pub const TASK_CREATED_MESSAGE: &str = "task created, processing...";
pub const PROCESSING_MESSAGE: &str = "processing...";
pub const COMPLETED_MESSAGE: &str = "bundle ready, downloading archive";
pub const UNKNOWN_ERROR_MESSAGE: &str = "unknown error";

/// Lifecycle phase of the current submission
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TrackerPhase {
    #[default]
    Idle,
    Submitting,
    Polling,
    Completed,
    Failed,
}

impl TrackerPhase {
    /// Idle and terminal phases accept a new submission
    pub fn accepts_submit(self) -> bool {
        !matches!(self, TrackerPhase::Submitting | TrackerPhase::Polling)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TrackerPhase::Idle => "idle",
            TrackerPhase::Submitting => "submitting",
            TrackerPhase::Polling => "polling",
            TrackerPhase::Completed => "completed",
            TrackerPhase::Failed => "failed",
        }
    }
}

/// Why a submission did not reach the service or was refused by it
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("enter at least one package name")]
    EmptyPackages,
    #[error("a submission is already in progress")]
    Busy,
    #[error("{0}")]
    Rejected(String),
    /// The submission was cancelled or superseded before the service answered
    #[error("submission cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// One-line message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressView {
    pub visible: bool,
    pub percent: u8,
    pub message: String,
}

/// Build target chosen in the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitForm {
    pub system_type: SystemType,
    pub distribution: String,
    pub arch: Option<String>,
    pub deep_download: bool,
}

impl SubmitForm {
    pub fn to_request(&self, packages: Vec<String>) -> BuildRequest {
        BuildRequest {
            system_type: self.system_type,
            distribution: self.distribution.clone(),
            arch: self
                .arch
                .as_deref()
                .map(str::trim)
                .filter(|arch| !arch.is_empty())
                .map(str::to_string),
            packages,
            deep_download: self.deep_download,
        }
    }
}

/// Work the driver performs after a transition, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartPolling { task_id: String },
    StopPolling,
    RequestDownload { task_id: String, file_name: String },
    RefreshHistory,
    EnableSubmitAfterCooldown,
    CancelCooldown,
    Notify(Notice),
}

/// A started submission: the request to send and the attempt it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitTicket {
    pub generation: u64,
    pub request: BuildRequest,
}

/// Everything a front end needs to draw the tracker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerView {
    pub phase: TrackerPhase,
    pub task_id: Option<String>,
    pub progress: ProgressView,
    pub submit_enabled: bool,
    pub notice: Option<Notice>,
}

impl Default for TrackerView {
    fn default() -> Self {
        TrackerMachine::new().view()
    }
}

/// Submission lifecycle: Idle -> Submitting -> Polling -> Completed | Failed
#[derive(Debug, Clone)]
pub struct TrackerMachine {
    phase: TrackerPhase,
    task_id: Option<String>,
    progress: ProgressView,
    submit_enabled: bool,
    notice: Option<Notice>,
    generation: u64,
}

impl Default for TrackerMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackerMachine {
    pub fn new() -> Self {
        Self {
            phase: TrackerPhase::Idle,
            task_id: None,
            progress: ProgressView::default(),
            submit_enabled: true,
            notice: None,
            generation: 0,
        }
    }

    pub fn phase(&self) -> TrackerPhase {
        self.phase
    }

    pub fn task_id(&self) -> Option<&str> {
        self.task_id.as_deref()
    }

    pub fn submit_enabled(&self) -> bool {
        self.submit_enabled
    }

    pub fn view(&self) -> TrackerView {
        TrackerView {
            phase: self.phase,
            task_id: self.task_id.clone(),
            progress: self.progress.clone(),
            submit_enabled: self.submit_enabled,
            notice: self.notice.clone(),
        }
    }

    /// Idle -> Submitting. Leaves the machine untouched on error.
    pub fn begin_submit(
        &mut self,
        packages: Vec<String>,
        form: &SubmitForm,
    ) -> Result<SubmitTicket, SubmitError> {
        if !self.phase.accepts_submit() || !self.submit_enabled {
            return Err(SubmitError::Busy);
        }
        if packages.is_empty() {
            return Err(SubmitError::EmptyPackages);
        }

        self.phase = TrackerPhase::Submitting;
        self.submit_enabled = false;
        self.task_id = None;
        self.notice = None;
        self.generation += 1;
        Ok(SubmitTicket {
            generation: self.generation,
            request: form.to_request(packages),
        })
    }

    /// Whether a creation result for `generation` still belongs to the live submission
    pub fn is_current(&self, generation: u64) -> bool {
        self.phase == TrackerPhase::Submitting && self.generation == generation
    }

    /// Submitting -> Polling
    pub fn submission_accepted(
        &mut self,
        generation: u64,
        task_id: String,
    ) -> Result<Vec<Effect>, SubmitError> {
        if !self.is_current(generation) {
            return Err(SubmitError::Cancelled);
        }
        self.phase = TrackerPhase::Polling;
        self.task_id = Some(task_id.clone());
        self.progress = ProgressView {
            visible: true,
            percent: 0,
            message: TASK_CREATED_MESSAGE.to_string(),
        };
        self.notice = Some(Notice::info(format!("task {task_id} created")));
        Ok(vec![Effect::StartPolling { task_id }])
    }

    /// Submitting -> Idle; an empty message falls back to a generic one
    pub fn submission_failed(
        &mut self,
        generation: u64,
        message: &str,
    ) -> Result<Vec<Effect>, SubmitError> {
        if !self.is_current(generation) {
            return Err(SubmitError::Cancelled);
        }
        let message = match message.trim() {
            "" => SUBMISSION_FALLBACK_MESSAGE,
            text => text,
        };
        let notice = Notice::error(message);
        self.phase = TrackerPhase::Idle;
        self.submit_enabled = true;
        self.notice = Some(notice.clone());
        Ok(vec![Effect::Notify(notice)])
    }

    /// Apply a polled snapshot. Snapshots of other tasks, or arriving after a
    /// terminal transition, are ignored.
    pub fn observe(&mut self, task: &Task) -> Vec<Effect> {
        if self.phase != TrackerPhase::Polling
            || self.task_id.as_deref() != Some(task.task_id.as_str())
        {
            return Vec::new();
        }

        if let Some(percent) = task.progress_percent() {
            self.progress.percent = percent;
            self.progress.message = progress_message(task);
        }

        match task.status {
            TaskStatus::Completed => {
                self.phase = TrackerPhase::Completed;
                self.progress = ProgressView {
                    visible: true,
                    percent: 100,
                    message: COMPLETED_MESSAGE.to_string(),
                };
                let notice = Notice::success(format!("task {} completed", task.task_id));
                self.notice = Some(notice.clone());
                vec![
                    Effect::StopPolling,
                    Effect::RequestDownload {
                        task_id: task.task_id.clone(),
                        file_name: archive_file_name(&task.task_id, task.archive_path.as_deref()),
                    },
                    Effect::RefreshHistory,
                    Effect::EnableSubmitAfterCooldown,
                    Effect::Notify(notice),
                ]
            }
            TaskStatus::Failed => {
                let reason = failure_reason(task);
                self.phase = TrackerPhase::Failed;
                self.progress = ProgressView {
                    visible: true,
                    percent: 0,
                    message: format!("failed: {reason}"),
                };
                let notice = Notice::error(reason);
                self.notice = Some(notice.clone());
                vec![
                    Effect::StopPolling,
                    Effect::Notify(notice),
                    Effect::RefreshHistory,
                    Effect::EnableSubmitAfterCooldown,
                ]
            }
            TaskStatus::Pending | TaskStatus::Processing | TaskStatus::Unknown => Vec::new(),
        }
    }

    /// Cooldown elapsed
    pub fn enable_submit(&mut self) {
        if self.phase.accepts_submit() {
            self.submit_enabled = true;
        }
    }

    /// Abandon the current submission and return to Idle
    pub fn cancel(&mut self) -> Vec<Effect> {
        let was_polling = self.phase == TrackerPhase::Polling;
        self.generation += 1;
        self.phase = TrackerPhase::Idle;
        self.task_id = None;
        self.progress = ProgressView::default();
        self.submit_enabled = true;

        let mut effects = vec![Effect::CancelCooldown];
        if was_polling {
            effects.insert(0, Effect::StopPolling);
        }
        effects
    }
}

/// Status line for an in-flight task
pub fn progress_message(task: &Task) -> String {
    if let Some(step) = non_empty(task.current_step.as_deref()) {
        return format!("running: {step}");
    }
    non_empty(task.message.as_deref())
        .map(str::to_string)
        .unwrap_or_else(|| PROCESSING_MESSAGE.to_string())
}

/// Failure text: `error`, else `message`, else a generic one
pub fn failure_reason(task: &Task) -> String {
    non_empty(task.error.as_deref())
        .or_else(|| non_empty(task.message.as_deref()))
        .unwrap_or(UNKNOWN_ERROR_MESSAGE)
        .to_string()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|text| !text.is_empty())
}
