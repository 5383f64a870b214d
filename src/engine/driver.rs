//! Drives a `ScanScheduler` on the tokio runtime.
//!
//! The loop sleeps until the scheduler's next deadline, polls it, and spawns
//! each fire as its own task so a slow agent never delays the timer. A tick
//! that lands while a fire is still running is skipped by the scheduler.

use std::sync::Arc;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::clock::Clock;
use super::scheduler::{FireOutcome, FireReason, ScanScheduler, ScanStatus};
use crate::agent::AgentChannel;
use crate::state::AgentStateStore;

/// Default prompt sent on every scan.
pub const DEFAULT_SCAN_PROMPT: &str =
    "Scan for the best market opportunities right now, update the watchlist and report what you found.";

pub struct ScanDriver<C: Clock> {
    scheduler: Mutex<ScanScheduler<C>>,
    agent: Arc<dyn AgentChannel>,
    store: Arc<AgentStateStore>,
    prompt: String,
}

/// Handle to a running scan loop. Dropping it aborts the loop and stops the
/// scheduler, so manual triggers are refused afterwards too.
pub struct ScanHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
    stop: Option<Box<dyn FnOnce() + Send>>,
}

impl ScanHandle {
    /// Stop the loop and wait for it to exit.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Scan loop exited abnormally");
            }
        }
    }
}

impl Drop for ScanHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            if let Some(stop) = self.stop.take() {
                stop();
            }
        }
    }
}

impl<C: Clock + 'static> ScanDriver<C> {
    pub fn new(
        scheduler: ScanScheduler<C>,
        agent: Arc<dyn AgentChannel>,
        store: Arc<AgentStateStore>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            scheduler: Mutex::new(scheduler),
            agent,
            store,
            prompt: prompt.into(),
        }
    }

    pub async fn status(&self) -> ScanStatus {
        self.scheduler.lock().await.status()
    }

    /// Mount the scheduler and start the timer loop.
    pub fn spawn(self: &Arc<Self>) -> ScanHandle {
        let (tx, mut rx) = oneshot::channel();
        let driver = Arc::clone(self);

        let task = tokio::spawn(async move {
            driver.scheduler.lock().await.mount();
            info!("Scan loop started");

            loop {
                let deadline = driver.scheduler.lock().await.next_deadline();
                let Some(deadline) = deadline else {
                    // Stopped from elsewhere; wait for shutdown.
                    let _ = (&mut rx).await;
                    break;
                };

                tokio::select! {
                    _ = tokio::time::sleep_until(deadline) => {
                        let reason = driver.scheduler.lock().await.poll();
                        if let Some(reason) = reason {
                            let fire = Arc::clone(&driver);
                            tokio::spawn(async move { fire.fire(reason).await });
                        }
                    }
                    _ = &mut rx => break,
                }
            }

            driver.scheduler.lock().await.stop();
            info!("Scan loop stopped");
        });

        let stopper = Arc::clone(self);
        ScanHandle {
            shutdown: Some(tx),
            task: Some(task),
            stop: Some(Box::new(move || stopper.stop_now())),
        }
    }

    /// Stop the scheduler without awaiting. When the lock is held the stop
    /// finishes on a spawned task.
    fn stop_now(self: Arc<Self>) {
        if let Ok(mut scheduler) = self.scheduler.try_lock() {
            scheduler.stop();
            return;
        }
        match tokio::runtime::Handle::try_current() {
            Ok(rt) => {
                rt.spawn(async move { self.scheduler.lock().await.stop() });
            }
            Err(_) => warn!("Scan scheduler busy at drop and no runtime to stop it"),
        }
    }

    /// Out-of-band scan. Returns `None` when the scheduler is not accepting
    /// fires, otherwise the fire's outcome.
    pub async fn trigger_manual(&self) -> Option<FireOutcome> {
        let reason = self.scheduler.lock().await.trigger_manual()?;
        Some(self.fire(reason).await)
    }

    /// Send the scan prompt once and report back to the scheduler. Failures
    /// are logged and swallowed.
    async fn fire(&self, reason: FireReason) -> FireOutcome {
        let outcome = if self.agent.is_loading() {
            debug!(?reason, "Agent busy, scan skipped");
            FireOutcome::SkippedInFlight
        } else {
            let snapshot = self.store.current();
            match self.agent.send_prompt(&self.prompt, &snapshot.state).await {
                Ok(()) => {
                    info!(?reason, version = snapshot.version, "Scan prompt sent");
                    FireOutcome::Sent
                }
                Err(e) => {
                    warn!(?reason, error = %e, "Scan prompt failed");
                    FireOutcome::SendFailed
                }
            }
        };
        self.scheduler.lock().await.complete(outcome);
        outcome
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
