//! External backup process: `/bin/bash <script>`, run to completion in the
//! background with an abort hook.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use delorean_scheduler::{BackupExit, BackupLauncher, RunningBackup, SchedulerError};

pub struct ScriptLauncher {
    script: PathBuf,
}

impl ScriptLauncher {
    pub fn new(script: impl Into<PathBuf>) -> Self {
        Self {
            script: script.into(),
        }
    }
}

#[async_trait]
impl BackupLauncher for ScriptLauncher {
    async fn start(&self) -> Result<RunningBackup, SchedulerError> {
        let mut child = Command::new("/bin/bash")
            .arg(&self.script)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| SchedulerError::Spawn(e.to_string()))?;

        let (abort_tx, mut abort_rx) = oneshot::channel::<()>();
        let (done_tx, done_rx) = oneshot::channel();
        let script = self.script.clone();

        tokio::spawn(async move {
            let exit = tokio::select! {
                status = child.wait() => match status {
                    Ok(status) if status.success() => BackupExit::Success,
                    Ok(status) => BackupExit::Failure { code: status.code() },
                    Err(e) => {
                        warn!(script = %script.display(), error = %e, "waiting on backup process failed");
                        BackupExit::Failure { code: None }
                    }
                },
                // Fires on an explicit abort and when the engine drops the
                // sender at shutdown; killing an already-dead child is a
                // no-op, so terminate stays idempotent.
                _ = &mut abort_rx => {
                    debug!(script = %script.display(), "terminating backup process");
                    if let Err(e) = child.start_kill() {
                        debug!(error = %e, "backup process already gone");
                    }
                    let _ = child.wait().await;
                    BackupExit::Failure { code: None }
                }
            };
            // Receiver gone means the engine no longer cares (stale run).
            let _ = done_tx.send(exit);
        });

        Ok(RunningBackup {
            abort: abort_tx,
            done: done_rx,
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::io::Write;
    use std::os::unix::fs::PermissionsExt;

    fn script_with(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "#!/bin/bash\n{body}").unwrap();
        let mut perms = file.as_file().metadata().unwrap().permissions();
        perms.set_mode(0o755);
        file.as_file().set_permissions(perms).unwrap();
        file
    }

    #[tokio::test]
    async fn clean_exit_reports_success() {
        let script = script_with("exit 0");
        let running = ScriptLauncher::new(script.path()).start().await.unwrap();
        assert_eq!(running.done.await.unwrap(), BackupExit::Success);
    }

    #[tokio::test]
    async fn nonzero_exit_reports_failure_with_code() {
        let script = script_with("exit 23");
        let running = ScriptLauncher::new(script.path()).start().await.unwrap();
        assert_eq!(
            running.done.await.unwrap(),
            BackupExit::Failure { code: Some(23) }
        );
    }

    #[tokio::test]
    async fn abort_terminates_a_long_running_script() {
        let script = script_with("sleep 600");
        let running = ScriptLauncher::new(script.path()).start().await.unwrap();
        running.abort.send(()).unwrap();
        assert_eq!(
            running.done.await.unwrap(),
            BackupExit::Failure { code: None }
        );
    }
}
