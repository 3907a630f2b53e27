/*
[INPUT]:  Session (tracker, registry, downloader), ClientSettings, log buffer
[OUTPUT]: Ratatui front end for composing, submitting and tracking bundles
[POS]:    TUI module for the pkgbundle binary
[UPDATE]: When changing TUI layout, keybindings, or the run loop
*/

mod app;
mod events;
mod terminal;
mod ui;

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;

use anyhow::Result;
use crossterm::event::Event as CrosstermEvent;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::fmt::MakeWriter;

use pkgbundle_adapter::BundleClient;
use pkgbundle_client::catalog::Catalog;
use pkgbundle_client::{ClientSettings, Session};

use app::AppState;
use terminal::TerminalGuard;

const UI_TICK_INTERVAL: Duration = Duration::from_millis(250);
const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(200);
pub(crate) const LOG_BUFFER_CAPACITY: usize = 2000;

pub type LogBufferHandle = Arc<StdMutex<LogBuffer>>;

#[derive(Debug, Default)]
pub struct LogBuffer {
    lines: VecDeque<String>,
    capacity: usize,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            capacity,
        }
    }

    pub fn push_line(&mut self, line: String) {
        if self.capacity == 0 {
            return;
        }
        if self.lines.len() >= self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    /// Last `count` lines, oldest first
    pub fn tail(&self, count: usize) -> Vec<String> {
        let start = self.lines.len().saturating_sub(count);
        self.lines.iter().skip(start).cloned().collect()
    }
}

pub fn new_log_buffer() -> LogBufferHandle {
    Arc::new(StdMutex::new(LogBuffer::new(LOG_BUFFER_CAPACITY)))
}

/// `MakeWriter` feeding formatted log lines into a [`LogBuffer`]
#[derive(Clone)]
pub struct LogWriterFactory {
    buffer: LogBufferHandle,
}

impl LogWriterFactory {
    pub fn new(buffer: LogBufferHandle) -> Self {
        Self { buffer }
    }
}

pub struct LogWriter {
    buffer: LogBufferHandle,
    partial: String,
}

impl LogWriter {
    fn push(&self, line: String) {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_line(line);
    }
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.partial.push_str(&String::from_utf8_lossy(buf));
        while let Some(pos) = self.partial.find('\n') {
            let line = self.partial[..pos].trim_end_matches('\r').to_string();
            self.partial.drain(..=pos);
            self.push(line);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.partial.is_empty() {
            let line = std::mem::take(&mut self.partial);
            self.push(line);
        }
        Ok(())
    }
}

impl Drop for LogWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

impl<'a> MakeWriter<'a> for LogWriterFactory {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriter {
            buffer: self.buffer.clone(),
            partial: String::new(),
        }
    }
}

pub async fn run_tui(
    client: &BundleClient,
    session: Session,
    settings: &ClientSettings,
    log_buffer: LogBufferHandle,
) -> Result<()> {
    let catalog = load_catalog(client).await;

    let mut terminal = TerminalGuard::new()?;
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let input_shutdown = CancellationToken::new();
    let input_shutdown_clone = input_shutdown.clone();

    tokio::task::spawn_blocking(move || {
        while !input_shutdown_clone.is_cancelled() {
            if crossterm::event::poll(INPUT_POLL_INTERVAL).unwrap_or(false) {
                if let Ok(event) = crossterm::event::read() {
                    let _ = event_tx.send(event);
                }
            }
        }
    });

    let mut tracker_rx = session.tracker().subscribe();
    let mut registry_rx = session.registry().subscribe();
    session.registry().start_polling();

    let mut app = AppState::new(session, settings, catalog, log_buffer);
    app.refresh_history();

    let mut tick = tokio::time::interval(UI_TICK_INTERVAL);
    let mut should_quit = false;

    while !should_quit {
        tokio::select! {
            _ = tick.tick() => {}
            changed = tracker_rx.changed() => {
                if changed.is_ok() {
                    app.tracker_view = tracker_rx.borrow_and_update().clone();
                }
            }
            changed = registry_rx.changed() => {
                if changed.is_ok() {
                    let snapshot = registry_rx.borrow_and_update().clone();
                    app.set_registry(snapshot);
                }
            }
            maybe_event = event_rx.recv() => {
                match maybe_event {
                    Some(CrosstermEvent::Key(key)) => {
                        should_quit = events::handle_key_event(&mut app, key);
                    }
                    Some(_) => {}
                    None => should_quit = true,
                }
            }
        }

        while let Some(update) = app.session.try_next_update() {
            app.apply_update(update);
        }
        terminal.draw(|frame| ui::draw(frame, &mut app))?;
    }

    input_shutdown.cancel();
    drop(terminal);
    info!("leaving TUI");
    app.session.shutdown().await;
    Ok(())
}

/// Targets advertised by the service, or the built-in list when it does not answer
async fn load_catalog(client: &BundleClient) -> Catalog {
    match client.list_systems().await {
        Ok(systems) => Catalog::from_systems(&systems),
        Err(err) => {
            warn!(error = %err, "could not load supported systems, using built-in list");
            Catalog::builtin()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_buffer_capacity() {
        let mut buffer = LogBuffer::new(2);
        buffer.push_line("a".to_string());
        buffer.push_line("b".to_string());
        buffer.push_line("c".to_string());
        assert_eq!(buffer.tail(10), vec!["b", "c"]);
        assert_eq!(buffer.tail(1), vec!["c"]);
    }

    #[test]
    fn test_log_writer_splits_lines() {
        let handle = new_log_buffer();
        let factory = LogWriterFactory::new(handle.clone());
        {
            let mut writer = factory.make_writer();
            writer.write_all(b"first\nsec").expect("write");
            writer.write_all(b"ond\r\nthird").expect("write");
        }
        let lines = handle.lock().expect("lock").tail(10);
        assert_eq!(lines, vec!["first", "second", "third"]);
    }
}
