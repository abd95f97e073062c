use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeloreanError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// The backup script (or an explicitly named config file) does not exist.
    /// The daemon refuses to start the polling loop in this case.
    #[error("Not found: {}", .0.display())]
    ConfigMissing(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DeloreanError>;
