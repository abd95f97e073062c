use thiserror::Error;

/// Errors that can occur within the scheduler subsystem.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The backup process could not be spawned. Not a backup attempt:
    /// nothing is logged, the engine returns to idle after notifying.
    #[error("Failed to start backup process: {0}")]
    Spawn(String),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
