//! Scan scheduler state machine.
//!
//! One initial fire shortly after mount (latched, never repeated), then a
//! fire every `interval` anchored on that initial fire. A fire while a
//! prompt is in flight is skipped, not queued. Time comes from an injected
//! `Clock`, so the machine is fully deterministic under test.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use super::clock::Clock;

/// Fixed delay before the first scan after mount.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(2);

/// Period between recurring scans.
pub const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScheduleConfig {
    pub initial_delay: Duration,
    pub interval: Duration,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            initial_delay: DEFAULT_INITIAL_DELAY,
            interval: DEFAULT_SCAN_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerPhase {
    /// Not yet mounted; nothing scheduled.
    Unmounted,
    /// Waiting for the one-shot initial fire.
    AwaitingInitial,
    /// Waiting for the next periodic fire.
    Idle,
    /// A fire is being processed.
    Triggering,
    /// Torn down; nothing will fire again.
    Stopped,
}

impl fmt::Display for SchedulerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SchedulerPhase::Unmounted => "unmounted",
            SchedulerPhase::AwaitingInitial => "awaiting_initial",
            SchedulerPhase::Idle => "idle",
            SchedulerPhase::Triggering => "triggering",
            SchedulerPhase::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FireReason {
    Initial,
    Periodic,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FireOutcome {
    Sent,
    /// Another prompt was in flight.
    SkippedInFlight,
    /// Transport not ready or agent rejected the prompt.
    SendFailed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub sent: u64,
    pub skipped: u64,
    pub failed: u64,
}

/// Read-only view for the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct ScanStatus {
    pub phase: SchedulerPhase,
    pub last_scan: Option<DateTime<Utc>>,
    pub stats: ScanStats,
    pub interval_secs: u64,
}

pub struct ScanScheduler<C: Clock> {
    clock: C,
    config: ScheduleConfig,
    phase: SchedulerPhase,
    /// Set once the initial fire has happened. Never cleared.
    initial_fired: bool,
    next_due: Option<Instant>,
    last_scan: Option<DateTime<Utc>>,
    stats: ScanStats,
}

impl<C: Clock> ScanScheduler<C> {
    pub fn new(clock: C, config: ScheduleConfig) -> Self {
        Self {
            clock,
            config,
            phase: SchedulerPhase::Unmounted,
            initial_fired: false,
            next_due: None,
            last_scan: None,
            stats: ScanStats::default(),
        }
    }

    pub fn phase(&self) -> SchedulerPhase {
        self.phase
    }

    pub fn last_scan(&self) -> Option<DateTime<Utc>> {
        self.last_scan
    }

    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    pub fn status(&self) -> ScanStatus {
        ScanStatus {
            phase: self.phase,
            last_scan: self.last_scan,
            stats: self.stats,
            interval_secs: self.config.interval.as_secs(),
        }
    }

    /// Start (or restart) scheduling. The initial fire is only armed if it
    /// has never happened; a remount resumes the periodic cadence instead.
    pub fn mount(&mut self) {
        match self.phase {
            SchedulerPhase::Unmounted | SchedulerPhase::Stopped => {}
            _ => return,
        }
        let now = self.clock.now();
        if self.initial_fired {
            self.phase = SchedulerPhase::Idle;
            self.next_due = Some(now + self.config.interval);
        } else {
            self.phase = SchedulerPhase::AwaitingInitial;
            self.next_due = Some(now + self.config.initial_delay);
        }
        debug!(phase = %self.phase, "Scan scheduler mounted");
    }

    /// Tear down. Clears every pending deadline.
    pub fn stop(&mut self) {
        self.phase = SchedulerPhase::Stopped;
        self.next_due = None;
        debug!("Scan scheduler stopped");
    }

    /// Next time `poll` may return a fire.
    pub fn next_deadline(&self) -> Option<Instant> {
        match self.phase {
            SchedulerPhase::Unmounted | SchedulerPhase::Stopped => None,
            _ => self.next_due,
        }
    }

    /// Check the clock. Returns the reason to fire when a deadline has
    /// passed, and moves into `Triggering`. A deadline reached while
    /// already triggering counts as a skip.
    pub fn poll(&mut self) -> Option<FireReason> {
        let due = self.next_deadline()?;
        let now = self.clock.now();
        if now < due {
            return None;
        }
        self.next_due = Some(self.advance_from(due, now));

        match self.phase {
            SchedulerPhase::AwaitingInitial => {
                self.initial_fired = true;
                self.phase = SchedulerPhase::Triggering;
                Some(FireReason::Initial)
            }
            SchedulerPhase::Idle => {
                self.phase = SchedulerPhase::Triggering;
                Some(FireReason::Periodic)
            }
            SchedulerPhase::Triggering => {
                self.stats.skipped += 1;
                debug!("Scan tick skipped, previous fire still running");
                None
            }
            SchedulerPhase::Unmounted | SchedulerPhase::Stopped => None,
        }
    }

    /// Request an out-of-band scan. Does not move the periodic deadline.
    pub fn trigger_manual(&mut self) -> Option<FireReason> {
        match self.phase {
            SchedulerPhase::AwaitingInitial | SchedulerPhase::Idle => {
                self.phase = SchedulerPhase::Triggering;
                Some(FireReason::Manual)
            }
            SchedulerPhase::Triggering => {
                self.stats.skipped += 1;
                None
            }
            SchedulerPhase::Unmounted | SchedulerPhase::Stopped => None,
        }
    }

    /// Record the outcome of a fire and return to waiting.
    pub fn complete(&mut self, outcome: FireOutcome) {
        match outcome {
            FireOutcome::Sent => {
                self.stats.sent += 1;
                self.last_scan = Some(self.clock.wall_now());
            }
            FireOutcome::SkippedInFlight => self.stats.skipped += 1,
            FireOutcome::SendFailed => self.stats.failed += 1,
        }
        if self.phase == SchedulerPhase::Triggering {
            self.phase = if self.initial_fired {
                SchedulerPhase::Idle
            } else {
                SchedulerPhase::AwaitingInitial
            };
        }
    }

    /// First deadline after `now` on the grid anchored at `due`. Missed
    /// periods collapse into the fire that is happening now.
    fn advance_from(&self, due: Instant, now: Instant) -> Instant {
        let interval = self.config.interval.max(Duration::from_millis(1));
        let mut next = due + interval;
        if next <= now {
            let behind = now.duration_since(next);
            let skips = behind.as_nanos() / interval.as_nanos() + 1;
            next += interval * skips.min(u32::MAX as u128) as u32;
        }
        next
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
