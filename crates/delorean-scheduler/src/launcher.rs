use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::error::Result;
use crate::types::BackupExit;

/// Handles to one in-flight backup process.
pub struct RunningBackup {
    /// Terminate request. Dropping the sender also terminates: an
    /// implementation treats "sender gone" the same as an explicit signal,
    /// which makes termination idempotent and covers engine shutdown.
    pub abort: oneshot::Sender<()>,
    /// Resolves once with the process exit classification.
    pub done: oneshot::Receiver<BackupExit>,
}

/// Capability to start the external backup process.
///
/// The engine is the only caller and enforces single-flight; implementations
/// do not need to guard against concurrent starts.
#[async_trait]
pub trait BackupLauncher: Send + Sync {
    async fn start(&self) -> Result<RunningBackup>;
}
