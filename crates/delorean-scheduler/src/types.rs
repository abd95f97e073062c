use std::time::Duration;

use delorean_core::{ResolvedConfig, ScheduleTimes};

/// Scheduler-facing slice of the resolved configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub times: ScheduleTimes,
    pub poll_interval: Duration,
    /// Same-day failure count (and days-without-success count) at which the
    /// user is alerted. At least 1, enforced at config resolution.
    pub max_daily_failure_alerts: u32,
}

impl From<&ResolvedConfig> for EngineConfig {
    fn from(config: &ResolvedConfig) -> Self {
        Self {
            times: config.times,
            poll_interval: config.poll_interval,
            max_daily_failure_alerts: config.max_daily_failure_alerts,
        }
    }
}

/// Lifecycle state of the single backup slot.
///
/// At most one backup is in flight at any time: `Running` gates new launches
/// (a concurrent trigger is rejected, not queued). Completion is transient:
/// applying a `BackupExited` event does its bookkeeping (log append,
/// notification) and lands back in `Idle` in the same step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    /// `start()` has been called but no handle exists yet.
    Launching,
    /// A backup process is running; `run_id` tags its completion event so
    /// stale events (e.g. after an abort) are dropped.
    Running { run_id: u64 },
}

/// How a backup process finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupExit {
    Success,
    Failure { code: Option<i32> },
}

/// Outcome of the per-tick decision ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickDecision {
    Skip(SkipReason),
    Launch,
    /// Destination unreachable at/past the scheduled time with no success
    /// yet today: append a NetworkUnreachable attempt, then alert if the
    /// same-day streak reaches the threshold.
    RecordUnreachable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    OutsideWindow,
    AlreadyCompletedToday,
    BeforeScheduledTime,
}
