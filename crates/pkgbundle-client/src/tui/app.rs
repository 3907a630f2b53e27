/*
[INPUT]:  Session, ClientSettings, Catalog, log buffer, tracker and registry snapshots
[OUTPUT]: AppState helpers for form editing, submission and history actions
[POS]:    TUI app state
[UPDATE]: When adding form fields or history actions
*/

use ratatui::widgets::ListState;
use tui_input::{Input, InputRequest};

use pkgbundle_adapter::{SystemType, Task, TaskStatus};
use pkgbundle_client::catalog::{self, Catalog, DistributionOption};
use pkgbundle_client::download::archive_file_name;
use pkgbundle_client::machine::{Notice, SubmitError, SubmitForm, TrackerPhase, TrackerView};
use pkgbundle_client::{
    AddOutcome, ClientSettings, PackageInput, RegistrySnapshot, Session, SessionUpdate,
};

use super::LogBufferHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Focus {
    Packages,
    SystemType,
    Distribution,
    Arch,
    Deep,
    History,
}

impl Focus {
    const ORDER: [Focus; 6] = [
        Focus::Packages,
        Focus::SystemType,
        Focus::Distribution,
        Focus::Arch,
        Focus::Deep,
        Focus::History,
    ];

    fn shifted(self, delta: isize) -> Focus {
        let len = Self::ORDER.len() as isize;
        let idx = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0) as isize;
        Self::ORDER[(idx + delta).rem_euclid(len) as usize]
    }
}

pub(super) struct AppState {
    pub(super) session: Session,
    pub(super) catalog: Catalog,
    pub(super) log_buffer: LogBufferHandle,
    pub(super) packages: PackageInput,
    pub(super) input: Input,
    pub(super) focus: Focus,
    pub(super) system_type: SystemType,
    pub(super) distribution_idx: usize,
    pub(super) arch_idx: usize,
    pub(super) deep_download: bool,
    pub(super) suggestion_state: ListState,
    pub(super) tracker_view: TrackerView,
    pub(super) registry: RegistrySnapshot,
    pub(super) history_state: ListState,
    pub(super) status: Notice,
}

impl AppState {
    pub(super) fn new(
        session: Session,
        settings: &ClientSettings,
        catalog: Catalog,
        log_buffer: LogBufferHandle,
    ) -> Self {
        let defaults = &settings.defaults;
        let distribution_idx = catalog
            .distributions(defaults.system_type)
            .iter()
            .position(|option| option.id == defaults.distribution)
            .unwrap_or(0);
        let tracker_view = session.tracker().view();
        let mut app = Self {
            session,
            catalog,
            log_buffer,
            packages: PackageInput::new(),
            input: Input::default(),
            focus: Focus::Packages,
            system_type: defaults.system_type,
            distribution_idx,
            arch_idx: 0,
            deep_download: defaults.deep_download,
            suggestion_state: ListState::default(),
            tracker_view,
            registry: RegistrySnapshot::default(),
            history_state: ListState::default(),
            status: Notice::info("Ready"),
        };
        app.arch_idx = app
            .arches()
            .iter()
            .position(|arch| *arch == defaults.arch)
            .unwrap_or(0);
        app
    }

    pub(super) fn distribution(&self) -> Option<&DistributionOption> {
        self.catalog
            .distributions(self.system_type)
            .get(self.distribution_idx)
    }

    pub(super) fn arches(&self) -> Vec<String> {
        let distribution = self.distribution().map(|option| option.id.as_str()).unwrap_or("");
        self.catalog.arches(self.system_type, distribution)
    }

    pub(super) fn arch(&self) -> Option<String> {
        self.arches().get(self.arch_idx).cloned()
    }

    pub(super) fn suggestions(&self) -> Vec<&'static str> {
        catalog::suggest(self.system_type, self.input.value())
    }

    pub(super) fn form(&self) -> Option<SubmitForm> {
        Some(SubmitForm {
            system_type: self.system_type,
            distribution: self.distribution()?.id.clone(),
            arch: self.arch(),
            deep_download: self.deep_download,
        })
    }

    pub(super) fn is_tracking(&self) -> bool {
        matches!(
            self.tracker_view.phase,
            TrackerPhase::Submitting | TrackerPhase::Polling
        )
    }

    pub(super) fn shift_focus(&mut self, delta: isize) {
        self.focus = self.focus.shifted(delta);
    }

    pub(super) fn cycle_system_type(&mut self, delta: isize) {
        let len = SystemType::ALL.len() as isize;
        let idx = SystemType::ALL
            .iter()
            .position(|t| *t == self.system_type)
            .unwrap_or(0) as isize;
        self.system_type = SystemType::ALL[(idx + delta).rem_euclid(len) as usize];
        // A new family starts from its first distribution.
        self.distribution_idx = 0;
        self.arch_idx = 0;
        self.suggestion_state.select(None);
    }

    pub(super) fn cycle_distribution(&mut self, delta: isize) {
        let len = self.catalog.distributions(self.system_type).len();
        if len == 0 {
            return;
        }
        self.distribution_idx = cycle(self.distribution_idx, delta, len);
        if self.arch_idx >= self.arches().len() {
            self.arch_idx = 0;
        }
    }

    pub(super) fn cycle_arch(&mut self, delta: isize) {
        let len = self.arches().len();
        if len > 0 {
            self.arch_idx = cycle(self.arch_idx, delta, len);
        }
    }

    pub(super) fn toggle_deep(&mut self) {
        self.deep_download = !self.deep_download;
    }

    pub(super) fn edit_input(&mut self, request: InputRequest) {
        if self.input.handle(request).is_some() {
            self.packages.set_text(self.input.value());
            self.suggestion_state.select(None);
        }
    }

    pub(super) fn move_suggestion(&mut self, delta: isize) {
        let len = self.suggestions().len();
        if len == 0 {
            self.suggestion_state.select(None);
            return;
        }
        let next = match self.suggestion_state.selected() {
            Some(current) => cycle(current, delta, len),
            None if delta < 0 => len - 1,
            None => 0,
        };
        self.suggestion_state.select(Some(next));
    }

    /// Enter in the package field: pick the highlighted suggestion or add the typed text
    pub(super) fn commit_input(&mut self) {
        let picked = self
            .suggestion_state
            .selected()
            .and_then(|idx| self.suggestions().get(idx).copied());
        let outcome = match picked {
            Some(name) => self.packages.select(name),
            None => self.packages.commit(),
        };
        if self.packages.text().is_empty() {
            self.input.reset();
        }
        self.suggestion_state.select(None);

        self.status = match outcome {
            AddOutcome::Added => Notice::info(format!("{} package(s) queued", self.packages.packages().len())),
            AddOutcome::Duplicate => Notice::warning("package already added"),
            AddOutcome::Empty => return,
        };
    }

    pub(super) fn remove_last_package(&mut self) {
        let Some(last) = self.packages.packages().last().map(str::to_string) else {
            return;
        };
        self.packages.packages_mut().remove(&last);
        self.status = Notice::info(format!("removed {last}"));
    }

    pub(super) fn submit(&mut self) {
        if !self.tracker_view.submit_enabled {
            self.status = Notice::warning("submit is not available right now");
            return;
        }
        let Some(form) = self.form() else {
            self.status = Notice::error("no distribution available for this system type");
            return;
        };
        self.session
            .submit_in_background(self.packages.packages().list(), form);
        self.status = Notice::info("submitting...");
    }

    pub(super) fn cancel_tracking(&mut self) {
        if self.is_tracking() {
            self.session.tracker().cancel();
            self.status = Notice::warning("stopped tracking; the task keeps running on the service");
        }
    }

    pub(super) fn refresh_history(&self) {
        let registry = self.session.registry().clone();
        tokio::spawn(async move {
            registry.refresh().await;
        });
    }

    pub(super) fn set_registry(&mut self, snapshot: RegistrySnapshot) {
        self.registry = snapshot;
        let len = self.registry.tasks.len();
        match self.history_state.selected() {
            _ if len == 0 => self.history_state.select(None),
            None => self.history_state.select(Some(0)),
            Some(selected) if selected >= len => self.history_state.select(Some(len - 1)),
            Some(_) => {}
        }
    }

    pub(super) fn move_history(&mut self, delta: isize) {
        let len = self.registry.tasks.len();
        if len == 0 {
            return;
        }
        let current = self.history_state.selected().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, len as isize - 1) as usize;
        self.history_state.select(Some(next));
    }

    pub(super) fn selected_task(&self) -> Option<&Task> {
        self.registry.tasks.get(self.history_state.selected()?)
    }

    pub(super) fn download_selected(&mut self) {
        let Some(task) = self.selected_task() else {
            return;
        };
        if task.status != TaskStatus::Completed {
            self.status = Notice::warning("only completed tasks have an archive");
            return;
        }
        let task_id = task.task_id.clone();
        let file_name = archive_file_name(&task.task_id, task.archive_path.as_deref());
        self.session.download_in_background(task_id.clone(), file_name);
        self.status = Notice::info(format!("downloading archive of {task_id}"));
    }

    pub(super) fn apply_update(&mut self, update: SessionUpdate) {
        self.status = match update {
            SessionUpdate::Submitted {
                packages,
                result: Ok(task_id),
            } => {
                self.packages.packages_mut().remove_all(&packages);
                Notice::success(format!("task {task_id} submitted"))
            }
            SessionUpdate::Submitted {
                result: Err(SubmitError::Cancelled),
                ..
            } => Notice::info("submission cancelled"),
            SessionUpdate::Submitted { result: Err(err), .. } => Notice::error(err.to_string()),
            SessionUpdate::Downloaded { path, .. } => {
                Notice::success(format!("archive saved to {}", path.display()))
            }
            SessionUpdate::DownloadFailed { task_id, error } => {
                Notice::error(format!("download of {task_id} failed: {error}"))
            }
            SessionUpdate::Notice(notice) => notice,
        };
    }
}

fn cycle(current: usize, delta: isize, len: usize) -> usize {
    (current as isize + delta).rem_euclid(len as isize) as usize
}
