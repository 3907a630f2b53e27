/*
[INPUT]:  CLI arguments, YAML configuration file, PKGBUNDLE_* environment
[OUTPUT]: Interactive TUI or one-shot subcommands against the bundling service
[POS]:    Binary entry point
[UPDATE]: When changing CLI flags, subcommands, or logging setup
*/

mod cli;
mod tui;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use console::style;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

use pkgbundle_adapter::TaskService;
use pkgbundle_client::render::sanitize_display;
use pkgbundle_client::{ClientSettings, Session};

use crate::cli::submit::SubmitArgs;
use crate::tui::{LogBufferHandle, LogWriterFactory};

#[derive(Parser, Debug)]
#[command(name = "pkgbundle", version, about = "Offline package bundle client")]
struct Cli {
    #[arg(long = "config", value_name = "PATH", global = true)]
    config_path: Option<PathBuf>,
    /// Overrides base_url from the configuration
    #[arg(long = "base-url", value_name = "URL", global = true)]
    base_url: Option<String>,
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info", global = true)]
    log_level: String,
    /// Also append logs to this file
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    log_file: Option<PathBuf>,
    /// Validate configuration and exit
    #[arg(long = "dry-run")]
    dry_run: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit packages and wait for the archive
    Submit(SubmitArgs),
    /// List tasks known to the service
    Tasks,
    /// Delete a task on the service
    Delete {
        #[arg(value_name = "TASK_ID")]
        task_id: String,
    },
    /// Show supported systems
    Systems,
    /// Show service health
    Health,
    /// Write a configuration file interactively
    Init {
        #[arg(long, value_name = "PATH", default_value = "pkgbundle.yaml")]
        output: PathBuf,
    },
    /// Interactive terminal UI (default)
    Tui,
}

enum LogTarget {
    Stderr,
    Buffer(LogBufferHandle),
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Error chains carry service text.
            eprintln!(
                "{} {}",
                style("error:").red().bold(),
                sanitize_display(&format!("{err:#}"))
            );
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Cli) -> Result<()> {

    if let Some(Command::Init { output }) = &args.command {
        return cli::init::run_init(output.clone());
    }

    let interactive = matches!(args.command, None | Some(Command::Tui)) && !args.dry_run;
    let log_buffer = tui::new_log_buffer();
    let target = if interactive {
        LogTarget::Buffer(log_buffer.clone())
    } else {
        LogTarget::Stderr
    };
    let _log_guard = init_tracing(&args.log_level, target, args.log_file.as_ref())?;

    let mut settings = ClientSettings::load(args.config_path.as_deref()).context("load config")?;
    if let Some(base_url) = &args.base_url {
        settings.base_url = base_url.clone();
        settings.validate()?;
    }
    info!(
        base_url = %settings.base_url,
        poll_interval_ms = settings.poll_interval_ms,
        download_dir = %settings.resolved_download_dir().display(),
        "configuration loaded"
    );

    let client = settings.build_client()?;

    if args.dry_run {
        info!("dry-run requested; configuration validated");
        return Ok(());
    }

    let service: Arc<dyn TaskService> = Arc::new(client.clone());

    match args.command {
        Some(Command::Submit(submit_args)) => {
            let session = Session::new(service, &settings);
            cli::submit::run_submit(session, &settings, submit_args).await
        }
        Some(Command::Tasks) => cli::tasks::run_tasks(&client).await,
        Some(Command::Delete { task_id }) => cli::tasks::run_delete(&client, &task_id).await,
        Some(Command::Systems) => cli::tasks::run_systems(&client).await,
        Some(Command::Health) => cli::tasks::run_health(&client).await,
        Some(Command::Init { .. }) => Ok(()),
        None | Some(Command::Tui) => {
            let session = Session::new(service, &settings);
            tui::run_tui(&client, session, &settings, log_buffer).await
        }
    }
}

fn init_tracing(
    log_level: &str,
    target: LogTarget,
    log_file: Option<&PathBuf>,
) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;

    let (file_writer, guard) = match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));
            let file_name = path
                .file_name()
                .context("log file path must name a file")?;
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = match (target, file_writer) {
        (LogTarget::Stderr, None) => builder.with_writer(std::io::stderr).try_init(),
        (LogTarget::Stderr, Some(file)) => builder
            .with_writer(std::io::stderr.and(file))
            .try_init(),
        (LogTarget::Buffer(buffer), None) => builder
            .with_ansi(false)
            .with_writer(LogWriterFactory::new(buffer))
            .try_init(),
        (LogTarget::Buffer(buffer), Some(file)) => builder
            .with_ansi(false)
            .with_writer(LogWriterFactory::new(buffer).and(file))
            .try_init(),
    };
    result
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(guard)
}
