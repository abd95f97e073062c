//! User notification delivery.
//!
//! Alerts go out through whatever desktop notifier the platform offers
//! (`osascript` on macOS, `notify-send` elsewhere). Delivery is
//! fire-and-forget: a failed send is logged and forgotten, never propagated
//! into the scheduling loop.

use std::path::PathBuf;

use tokio::process::Command;
use tracing::{info, warn};

use delorean_scheduler::Notifier;

enum Flavor {
    /// macOS: `osascript -e 'display notification ... with title ...'`.
    OsaScript,
    /// freedesktop: `notify-send <title> <body>`.
    NotifySend,
}

/// Delivers notifications by spawning the platform's notification command.
pub struct CommandNotifier {
    program: PathBuf,
    flavor: Flavor,
}

impl CommandNotifier {
    /// Locate a usable notification command, if the platform has one.
    pub fn detect() -> Option<Self> {
        if cfg!(target_os = "macos") {
            which::which("osascript").ok().map(|program| Self {
                program,
                flavor: Flavor::OsaScript,
            })
        } else {
            which::which("notify-send").ok().map(|program| Self {
                program,
                flavor: Flavor::NotifySend,
            })
        }
    }
}

impl Notifier for CommandNotifier {
    fn notify(&self, title: &str, body: &str) {
        let mut command = Command::new(&self.program);
        match self.flavor {
            Flavor::OsaScript => {
                let escaped_title = title.replace('"', "\\\"");
                let escaped_body = body.replace('"', "\\\"");
                command.arg("-e").arg(format!(
                    "display notification \"{escaped_body}\" with title \"{escaped_title}\""
                ));
            }
            Flavor::NotifySend => {
                command.arg(title).arg(body);
            }
        }

        let title = title.to_string();
        tokio::spawn(async move {
            match command.output().await {
                Ok(output) if !output.status.success() => {
                    warn!(%title, status = ?output.status.code(), "notification command failed");
                }
                Err(e) => warn!(%title, error = %e, "notification command did not run"),
                _ => {}
            }
        });
    }
}

/// Fallback when no desktop notifier exists: alerts land in the log stream.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, title: &str, body: &str) {
        info!(%title, %body, "user notification");
    }
}
