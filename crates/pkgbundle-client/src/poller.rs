/*
[INPUT]:  Poll interval, tick closure producing a future
[OUTPUT]: Background fixed-interval loop with idempotent start/stop
[POS]:    Concurrency primitive - owns one spawned polling task
[UPDATE]: When tick scheduling or shutdown semantics change
*/

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

const STOP_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug)]
struct ManagedLoop {
    shutdown: CancellationToken,
    handle: JoinHandle<()>,
}

/// Handle to at most one running polling loop.
///
/// `None` means stopped; start and stop are both no-ops when already in
/// the requested state.
#[derive(Debug)]
pub struct Poller {
    name: &'static str,
    active: Option<ManagedLoop>,
}

impl Poller {
    pub fn new(name: &'static str) -> Self {
        Self { name, active: None }
    }

    pub fn is_running(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| !active.shutdown.is_cancelled() && !active.handle.is_finished())
    }

    /// Spawn the loop; the first tick fires one `interval` after start.
    ///
    /// Returns `false` when a loop is already running.
    pub fn start<F, Fut>(&mut self, interval: Duration, mut tick: F) -> bool
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if self.is_running() {
            return false;
        }
        // Finished loop left behind by a tick that stopped itself.
        self.active = None;

        let shutdown = CancellationToken::new();
        let loop_shutdown = shutdown.clone();
        let name = self.name;
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    biased;
                    _ = loop_shutdown.cancelled() => break,
                    _ = ticker.tick() => tick().await,
                }
            }
            debug!(poller = name, "poll loop exited");
        });

        debug!(poller = name, interval_ms = interval.as_millis() as u64, "poll loop started");
        self.active = Some(ManagedLoop { shutdown, handle });
        true
    }

    /// Signal the loop to exit after any in-flight tick.
    ///
    /// Returns `false` when nothing was running.
    pub fn stop(&mut self) -> bool {
        match self.active.take() {
            Some(active) => {
                active.shutdown.cancel();
                debug!(poller = self.name, "poll loop stop requested");
                true
            }
            None => false,
        }
    }

    /// Stop and wait for the loop to exit, aborting it after a deadline
    pub async fn shutdown(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        active.shutdown.cancel();

        let mut handle = active.handle;
        tokio::select! {
            res = &mut handle => {
                if let Err(join_err) = res {
                    warn!(poller = self.name, error = %join_err, "poll loop join error");
                }
            }
            _ = tokio::time::sleep(STOP_TIMEOUT) => {
                handle.abort();
                warn!(poller = self.name, "poll loop did not stop in time; aborted");
            }
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            active.shutdown.cancel();
        }
    }
}
