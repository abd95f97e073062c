//! `delorean-scheduler` — the backup scheduling and failure-detection engine.
//!
//! # Overview
//!
//! [`engine::SchedulerEngine`] polls at the configured interval. Each tick it
//! reads the event log and decides one of: do nothing, launch the backup
//! process, or record a NetworkUnreachable attempt (alerting past the
//! configured threshold). Ticks, manual triggers, abort requests and process
//! completions are all messages consumed one at a time by the engine task, so
//! a completion callback can never race a tick.
//!
//! # Per-tick decision (engine idle only)
//!
//! | Condition                                                | Decision            |
//! |----------------------------------------------------------|---------------------|
//! | outside the daily window                                 | skip                |
//! | log empty (fresh install)                                | launch              |
//! | a Success entry dated today exists                       | skip                |
//! | destination reachable and at/past the scheduled time     | launch              |
//! | destination unreachable and at/past the scheduled time   | record + maybe alert|
//!
//! Independently, every tick checks the days since the last successful
//! backup and raises a prolonged-failure alert past the same threshold.

pub mod analyzer;
pub mod clock;
pub mod engine;
pub mod error;
pub mod launcher;
pub mod notify;
pub mod probe;
pub mod types;

pub use engine::{decide, EngineCommand, SchedulerEngine, SchedulerHandle};
pub use error::{Result, SchedulerError};
pub use launcher::{BackupLauncher, RunningBackup};
pub use notify::Notifier;
pub use probe::{DestinationProbe, PathProbe};
pub use types::{BackupExit, EngineConfig, RunState, SkipReason, TickDecision};
