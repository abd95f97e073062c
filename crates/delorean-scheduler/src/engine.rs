use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use delorean_core::ScheduleTimes;
use delorean_log::{LogEntry, LogStore, Outcome};

use crate::{
    analyzer, clock,
    launcher::BackupLauncher,
    notify::Notifier,
    probe::DestinationProbe,
    types::{BackupExit, EngineConfig, RunState, SkipReason, TickDecision},
};

/// Messages consumed one at a time by the engine task.
///
/// Manual triggers, abort requests and process completions all arrive here,
/// so every mutation of the run state happens on one logical execution
/// context and can never race a tick.
#[derive(Debug)]
pub enum EngineCommand {
    /// Launch a backup now, bypassing window and log checks (the user asked).
    StartNow,
    /// Terminate the in-flight backup, if any.
    Abort,
    /// The backup process finished. `run_id` identifies which launch;
    /// events from a superseded launch (e.g. after an abort) are dropped.
    BackupExited { run_id: u64, exit: BackupExit },
}

/// Cloneable handle for poking the engine from outside (signals, UI).
#[derive(Clone)]
pub struct SchedulerHandle {
    tx: mpsc::Sender<EngineCommand>,
}

impl SchedulerHandle {
    pub fn new(tx: mpsc::Sender<EngineCommand>) -> Self {
        Self { tx }
    }

    pub async fn start_now(&self) {
        if self.tx.send(EngineCommand::StartNow).await.is_err() {
            warn!("scheduler engine is gone; start request dropped");
        }
    }

    pub async fn abort(&self) {
        if self.tx.send(EngineCommand::Abort).await.is_err() {
            warn!("scheduler engine is gone; abort request dropped");
        }
    }
}

/// Pure per-tick decision over the current time, the log and the probe
/// result. Calling it twice on unchanged inputs yields the same decision.
pub fn decide(
    now: NaiveDateTime,
    entries: &[LogEntry],
    destination_reachable: bool,
    times: &ScheduleTimes,
) -> TickDecision {
    let tod = now.time();

    if !clock::is_within_window(tod, times) {
        return TickDecision::Skip(SkipReason::OutsideWindow);
    }
    // Bootstrap: no baseline exists yet, launch as soon as the window opens.
    if entries.is_empty() {
        return TickDecision::Launch;
    }
    if analyzer::has_succeeded_today(entries, now.date()) {
        return TickDecision::Skip(SkipReason::AlreadyCompletedToday);
    }
    if !clock::is_at_or_past_scheduled(tod, times) {
        return TickDecision::Skip(SkipReason::BeforeScheduledTime);
    }
    if destination_reachable {
        TickDecision::Launch
    } else {
        TickDecision::RecordUnreachable
    }
}

/// Core scheduler: owns the polling loop and the single backup slot.
pub struct SchedulerEngine {
    config: EngineConfig,
    log: LogStore,
    launcher: Box<dyn BackupLauncher>,
    notifier: Arc<dyn Notifier>,
    probe: Box<dyn DestinationProbe>,
    /// Engine's own sender — handed to completion waiter tasks.
    events: mpsc::Sender<EngineCommand>,
    state: RunState,
    last_poll: Option<NaiveDateTime>,
    next_run_id: u64,
    /// Held while a backup runs; firing (or dropping) it terminates the
    /// external process.
    abort_tx: Option<oneshot::Sender<()>>,
}

impl SchedulerEngine {
    pub fn new(
        config: EngineConfig,
        log: LogStore,
        launcher: Box<dyn BackupLauncher>,
        notifier: Arc<dyn Notifier>,
        probe: Box<dyn DestinationProbe>,
        events: mpsc::Sender<EngineCommand>,
    ) -> Self {
        Self {
            config,
            log,
            launcher,
            notifier,
            probe,
            events,
            state: RunState::Idle,
            last_poll: None,
            next_run_id: 0,
            abort_tx: None,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_backup_running(&self) -> bool {
        self.state != RunState::Idle
    }

    pub fn last_poll(&self) -> Option<NaiveDateTime> {
        self.last_poll
    }

    /// Main event loop. Ticks at the poll interval until `shutdown`
    /// broadcasts `true`; a tick that comes due while the previous one is
    /// still processing is skipped, not queued.
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<EngineCommand>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        info!(
            poll_interval_secs = self.config.poll_interval.as_secs(),
            "scheduler engine started"
        );
        // First tick fires immediately: the prolonged-failure check runs at
        // startup before the first full interval elapses.
        let mut ticker = tokio::time::interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick(Local::now().naive_local()).await;
                }
                Some(command) = commands.recv() => {
                    self.apply(command, Local::now().naive_local()).await;
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("scheduler engine shutting down");
                        if let Some(abort) = self.abort_tx.take() {
                            info!("terminating in-flight backup process");
                            let _ = abort.send(());
                        }
                        break;
                    }
                }
            }
        }
    }

    /// One pass of the polling loop at `now`. Public so callers can drive
    /// the engine without the timer.
    pub async fn tick(&mut self, now: NaiveDateTime) {
        self.last_poll = Some(now);
        let entries = self.log.read_all();

        if self.state == RunState::Idle {
            let reachable = self.probe.is_reachable();
            match decide(now, &entries, reachable, &self.config.times) {
                TickDecision::Skip(reason) => debug!(reason = ?reason, "tick: no action"),
                TickDecision::Launch => self.launch("schedule").await,
                TickDecision::RecordUnreachable => self.record_unreachable(now),
            }
        } else {
            debug!("tick: backup already in progress");
        }

        // Separate from the per-attempt counter: this may fire even when no
        // attempt was made this tick (machine suspended, window closed).
        self.check_prolonged_failures(now, &entries);
    }

    /// Apply one command at `now`. Serialized with [`tick`](Self::tick) by
    /// the engine task.
    pub async fn apply(&mut self, command: EngineCommand, now: NaiveDateTime) {
        match command {
            EngineCommand::StartNow => {
                if self.state == RunState::Idle {
                    info!("manual backup trigger");
                    self.launch("manual").await;
                } else {
                    debug!(state = ?self.state, "manual trigger rejected: backup in flight");
                    self.notifier.notify(
                        "Process is still running",
                        "A backup process is already in progress.",
                    );
                }
            }

            EngineCommand::Abort => {
                if self.state == RunState::Idle {
                    self.notifier
                        .notify("Abort Ignored", "No backup is currently in progress.");
                    return;
                }
                if let Some(abort) = self.abort_tx.take() {
                    let _ = abort.send(());
                }
                self.state = RunState::Idle;
                info!("backup aborted by user");
                self.append(LogEntry::new(now, Outcome::UserAborted));
                self.notifier
                    .notify("Backup Aborted", "The backup process has been cancelled.");
            }

            EngineCommand::BackupExited { run_id, exit } => {
                if self.state != (RunState::Running { run_id }) {
                    debug!(run_id, "dropping stale completion event");
                    return;
                }
                self.state = RunState::Idle;
                self.abort_tx = None;

                match exit {
                    BackupExit::Success => {
                        info!(run_id, "backup completed successfully");
                        self.append(LogEntry::new(now, Outcome::Success));
                        self.notifier.notify(
                            "Sync Completed",
                            "Your files have been successfully backed up.",
                        );
                    }
                    BackupExit::Failure { code } => {
                        warn!(run_id, code = ?code, "backup process failed");
                        let detail = match code {
                            Some(code) => {
                                format!("Backup Failed: Sync process exited with status {code}")
                            }
                            None => "Backup Failed: Sync process terminated by signal".to_string(),
                        };
                        self.append(LogEntry::new(now, Outcome::Other(detail)));
                        self.notifier.notify(
                            "Sync Failed",
                            "There was an issue with the backup process.",
                        );
                    }
                }
            }
        }
    }

    // --- private helpers ---------------------------------------------------

    async fn launch(&mut self, trigger: &str) {
        self.state = RunState::Launching;
        match self.launcher.start().await {
            Ok(running) => {
                let run_id = self.next_run_id;
                self.next_run_id += 1;
                self.abort_tx = Some(running.abort);
                self.state = RunState::Running { run_id };
                info!(run_id, trigger, "backup process started");

                // Waiter: forward the exit into the command queue so the
                // completion is applied on the engine task, never here.
                let events = self.events.clone();
                let done = running.done;
                tokio::spawn(async move {
                    let exit = done.await.unwrap_or(BackupExit::Failure { code: None });
                    if events
                        .send(EngineCommand::BackupExited { run_id, exit })
                        .await
                        .is_err()
                    {
                        warn!(run_id, "engine gone; completion event dropped");
                    }
                });
            }
            Err(e) => {
                // Not a backup attempt: nothing is logged, so a spawn failure
                // never counts toward the unreachable streak.
                warn!(error = %e, "backup process failed to spawn");
                self.notifier
                    .notify("Error", "Failed to start the backup process.");
                self.state = RunState::Idle;
            }
        }
    }

    fn record_unreachable(&mut self, now: NaiveDateTime) {
        info!("destination unreachable; recording failed attempt");
        self.append(LogEntry::new(now, Outcome::NetworkUnreachable));

        // Recompute from the updated log so the attempt just recorded counts.
        let entries = self.log.read_all();
        let failures =
            analyzer::failures_since_scheduled(&entries, now.date(), self.config.times.scheduled);
        if failures >= self.config.max_daily_failure_alerts as usize {
            warn!(failures, "same-day unreachable threshold reached");
            self.notifier.notify(
                "Backup Error",
                "The network drive is not accessible. Ensure you are connected to the network and try again.",
            );
        }
    }

    fn check_prolonged_failures(&self, now: NaiveDateTime, entries: &[LogEntry]) {
        let Some(days) = analyzer::days_since_last_success(entries, now) else {
            // No success ever (fresh install): nothing meaningful to report.
            return;
        };
        if days >= i64::from(self.config.max_daily_failure_alerts) {
            warn!(days, "no successful backup past threshold");
            self.notifier.notify(
                "Backup Warning",
                &format!("No successful backup for {days} days. Please check your network drive."),
            );
        }
    }

    /// Best-effort append: a log write failure must never crash the loop or
    /// leave the run state stuck.
    fn append(&self, entry: LogEntry) {
        if let Err(e) = self.log.append(&entry) {
            warn!(error = %e, "log append failed");
        }
    }
}
