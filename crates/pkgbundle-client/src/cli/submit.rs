/*
[INPUT]:  Package names and target flags, ClientSettings, Session
[OUTPUT]: Submitted task tracked to completion, archive saved locally
[POS]:    CLI headless submit flow
[UPDATE]: When submit flags or progress reporting change
*/

use anyhow::{Result, anyhow, bail};
use clap::Args;
use console::style;
use tracing::{info, warn};

use pkgbundle_adapter::SystemType;
use pkgbundle_client::catalog::Catalog;
use pkgbundle_client::machine::{SubmitForm, TrackerPhase, TrackerView};
use pkgbundle_client::render::{render_progress_bar, sanitize_display};
use pkgbundle_client::{ClientSettings, PackageSet, Session, SessionUpdate};

#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// Package format family (rpm or deb)
    #[arg(long = "system-type", value_name = "TYPE")]
    pub system_type: Option<SystemType>,
    /// Distribution id, e.g. centos7 or ubuntu22
    #[arg(long, value_name = "ID")]
    pub distribution: Option<String>,
    /// Target architecture; `auto` lets the service decide
    #[arg(long, value_name = "ARCH")]
    pub arch: Option<String>,
    /// Also bundle transitive dependencies
    #[arg(long = "deep")]
    pub deep_download: bool,
    /// Track the task but skip saving the archive
    #[arg(long = "no-download")]
    pub no_download: bool,
    /// Package names
    #[arg(value_name = "PKG", required = true)]
    pub packages: Vec<String>,
}

impl SubmitArgs {
    pub fn to_form(&self, settings: &ClientSettings, catalog: &Catalog) -> SubmitForm {
        let defaults = &settings.defaults;
        let system_type = self.system_type.unwrap_or(defaults.system_type);
        let distribution = match &self.distribution {
            Some(distribution) => distribution.clone(),
            None if system_type == defaults.system_type => defaults.distribution.clone(),
            None => catalog
                .first_distribution(system_type)
                .map(|option| option.id.clone())
                .unwrap_or_else(|| defaults.distribution.clone()),
        };
        SubmitForm {
            system_type,
            distribution,
            arch: Some(self.arch.clone().unwrap_or_else(|| defaults.arch.clone())),
            deep_download: self.deep_download || defaults.deep_download,
        }
    }
}

pub async fn run_submit(mut session: Session, settings: &ClientSettings, args: SubmitArgs) -> Result<()> {
    let packages: PackageSet = args.packages.iter().collect();
    let form = args.to_form(settings, &Catalog::builtin());
    let mut view_rx = session.tracker().subscribe();

    let task_id = match session.submit(packages.list(), &form).await {
        Ok(task_id) => task_id,
        Err(err) => {
            session.shutdown().await;
            bail!("{}", sanitize_display(&err.to_string()));
        }
    };
    println!(
        "{} {}",
        style("task created:").bold(),
        style(sanitize_display(&task_id)).cyan()
    );

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut last_line = String::new();
    let phase = loop {
        tokio::select! {
            changed = view_rx.changed() => {
                if changed.is_err() {
                    break TrackerPhase::Idle;
                }
                let view = view_rx.borrow_and_update().clone();
                let line = progress_line(&view);
                if line != last_line {
                    info!(task_id = %task_id, "{line}");
                    last_line = line;
                }
                if matches!(view.phase, TrackerPhase::Completed | TrackerPhase::Failed) {
                    break view.phase;
                }
            }
            _ = &mut ctrl_c => {
                warn!(task_id = %task_id, "interrupted, task keeps running on the service");
                break TrackerPhase::Idle;
            }
        }
    };

    let result = match phase {
        TrackerPhase::Completed if args.no_download => {
            println!("{}", style("task completed").green());
            Ok(())
        }
        TrackerPhase::Completed => wait_for_download(&mut session, &task_id).await,
        TrackerPhase::Failed => {
            let reason = session
                .tracker()
                .view()
                .notice
                .map(|notice| notice.text)
                .unwrap_or_default();
            Err(anyhow!(failure_message(&task_id, &reason)))
        }
        _ => Err(anyhow!(
            "tracking of task {} stopped",
            sanitize_display(&task_id)
        )),
    };

    session.shutdown().await;
    result
}

async fn wait_for_download(session: &mut Session, task_id: &str) -> Result<()> {
    while let Some(update) = session.next_update().await {
        match update {
            SessionUpdate::Downloaded { task_id: id, path } if id == task_id => {
                println!(
                    "{} {}",
                    style("archive saved:").bold().green(),
                    style(path.display()).cyan()
                );
                return Ok(());
            }
            SessionUpdate::DownloadFailed { task_id: id, error } if id == task_id => {
                return Err(anyhow!("download failed: {}", sanitize_display(&error)));
            }
            _ => {}
        }
    }
    Err(anyhow!("session closed before the archive was saved"))
}

/// Progress bar plus status text, safe to print
fn progress_line(view: &TrackerView) -> String {
    format!(
        "{} {}",
        render_progress_bar(&view.progress, 20),
        sanitize_display(&view.progress.message)
    )
}

fn failure_message(task_id: &str, reason: &str) -> String {
    format!(
        "task {} failed: {}",
        sanitize_display(task_id),
        sanitize_display(reason)
    )
}
