use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveTime;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DeloreanError, Result};

/// Clock-time format used in config files ("HH:MM", 24-hour).
pub const TIME_FORMAT: &str = "%H:%M";

/// Default seconds between scheduler ticks when `frequencyCheck` is absent.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 3600;

/// Default failure/stale-day threshold when `maxDayAttemptNotification` is
/// absent. Doubles as the "days without a successful backup" alert threshold.
pub const DEFAULT_MAX_DAILY_FAILURES: u32 = 6;

/// Top-level config (delorean.toml + DELOREAN_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeloreanConfig {
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub alerts: AlertConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

impl Default for DeloreanConfig {
    fn default() -> Self {
        Self {
            schedule: ScheduleConfig::default(),
            poll: PollConfig::default(),
            alerts: AlertConfig::default(),
            paths: PathsConfig::default(),
        }
    }
}

/// When a backup may run. Times are local wall-clock "HH:MM" strings; the
/// window may not wrap midnight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Preferred launch time inside the window.
    #[serde(default = "default_scheduled_time")]
    pub time: String,
    #[serde(default = "default_window_start")]
    pub window_start: String,
    #[serde(default = "default_window_end")]
    pub window_end: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            time: default_scheduled_time(),
            window_start: default_window_start(),
            window_end: default_window_end(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    #[serde(default = "default_poll_interval_secs")]
    pub interval_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_poll_interval_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Same-day NetworkUnreachable attempts (and days without a success)
    /// tolerated before the user is alerted. Must be at least 1.
    #[serde(default = "default_max_daily_failures")]
    pub max_daily_failures: u32,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            max_daily_failures: default_max_daily_failures(),
        }
    }
}

/// Paths may contain `~`, `$HOME` and `$USER`; expansion happens in
/// [`DeloreanConfig::resolve`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// The external backup executable the scheduler launches.
    #[serde(default = "default_script_path")]
    pub script: String,
    /// Append-only event log shared with the legacy tooling.
    #[serde(default = "default_log_path")]
    pub log_file: String,
    /// Backup destination; existence of this path is the reachability probe.
    #[serde(default = "default_destination")]
    pub destination: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            script: default_script_path(),
            log_file: default_log_path(),
            destination: default_destination(),
        }
    }
}

/// Validated time-of-day triple consumed by the scheduler.
///
/// The effective trigger is the intersection of the window and the scheduled
/// time: nothing fires outside `[window_start, window_end]` even when the
/// scheduled time alone would allow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleTimes {
    pub scheduled: NaiveTime,
    pub window_start: NaiveTime,
    pub window_end: NaiveTime,
}

/// Fully validated configuration with expanded paths.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub times: ScheduleTimes,
    pub poll_interval: Duration,
    pub max_daily_failure_alerts: u32,
    pub script: PathBuf,
    pub log_file: PathBuf,
    pub destination: PathBuf,
}

impl DeloreanConfig {
    /// Load config from a TOML file with DELOREAN_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.delorean/delorean.toml
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: DeloreanConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("DELOREAN_").split("_"))
            .extract()
            .map_err(|e| DeloreanError::Config(e.to_string()))?;

        Ok(config)
    }

    /// Import config from the key=value pairs embedded in the legacy backup
    /// shell script (`scheduledBackupTime=HH:MM`, `rangeStart`, `rangeEnd`,
    /// `frequencyCheck`, `maxDayAttemptNotification`, `LOG_FILE`, `DEST`).
    ///
    /// Quotes and spaces are stripped from values the way the legacy
    /// extractor did; missing or unparseable keys keep their defaults.
    pub fn from_backup_script(script: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(script)
            .map_err(|_| DeloreanError::ConfigMissing(script.to_path_buf()))?;

        let mut config = DeloreanConfig::default();
        config.paths.script = script.to_string_lossy().into_owned();

        for line in contents.lines() {
            let line = line.trim();
            if line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.replace(['"', ' '], "");
            match key {
                "scheduledBackupTime" => config.schedule.time = value,
                "rangeStart" => config.schedule.window_start = value,
                "rangeEnd" => config.schedule.window_end = value,
                "frequencyCheck" => {
                    config.poll.interval_secs =
                        value.parse().unwrap_or(DEFAULT_POLL_INTERVAL_SECS);
                }
                "maxDayAttemptNotification" => {
                    config.alerts.max_daily_failures =
                        value.parse().unwrap_or(DEFAULT_MAX_DAILY_FAILURES);
                }
                "LOG_FILE" => config.paths.log_file = value,
                "DEST" => config.paths.destination = value,
                _ => {}
            }
        }

        debug!(script = %script.display(), "imported legacy configuration");
        Ok(config)
    }

    /// Validate and type the raw config.
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        let scheduled = parse_time("schedule.time", &self.schedule.time)?;
        let window_start = parse_time("schedule.window_start", &self.schedule.window_start)?;
        let window_end = parse_time("schedule.window_end", &self.schedule.window_end)?;

        if window_start > window_end {
            return Err(DeloreanError::Config(format!(
                "backup window may not wrap midnight: {} > {}",
                self.schedule.window_start, self.schedule.window_end
            )));
        }
        if self.alerts.max_daily_failures < 1 {
            return Err(DeloreanError::Config(
                "alerts.max_daily_failures must be at least 1".into(),
            ));
        }
        if self.poll.interval_secs < 1 {
            return Err(DeloreanError::Config(
                "poll.interval_secs must be at least 1".into(),
            ));
        }

        Ok(ResolvedConfig {
            times: ScheduleTimes {
                scheduled,
                window_start,
                window_end,
            },
            poll_interval: Duration::from_secs(self.poll.interval_secs),
            max_daily_failure_alerts: self.alerts.max_daily_failures,
            script: expand_path(&self.paths.script),
            log_file: expand_path(&self.paths.log_file),
            destination: expand_path(&self.paths.destination),
        })
    }
}

fn parse_time(key: &str, value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value, TIME_FORMAT)
        .map_err(|_| DeloreanError::Config(format!("{key}: expected HH:MM, got {value:?}")))
}

/// Expand `~`, `$HOME` and `$USER` in a configured path.
pub fn expand_path(raw: &str) -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    let user = std::env::var("USER").unwrap_or_else(|_| "unknown".to_string());

    let mut expanded = raw.replace("$HOME", &home).replace("$USER", &user);
    if expanded == "~" {
        expanded = home;
    } else if let Some(rest) = expanded.strip_prefix("~/") {
        expanded = format!("{home}/{rest}");
    }
    PathBuf::from(expanded)
}

fn default_scheduled_time() -> String {
    "02:00".to_string()
}
fn default_window_start() -> String {
    "00:00".to_string()
}
fn default_window_end() -> String {
    "23:59".to_string()
}
fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}
fn default_max_daily_failures() -> u32 {
    DEFAULT_MAX_DAILY_FAILURES
}
fn default_script_path() -> String {
    "$HOME/.delorean/sync_files.sh".to_string()
}
fn default_log_path() -> String {
    "$HOME/delorean.log".to_string()
}
fn default_destination() -> String {
    "/Volumes/SFA-All/User Data/$USER".to_string()
}

/// `~/.delorean/delorean.toml` — where [`DeloreanConfig::load`] looks when no
/// explicit path is given.
pub fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.delorean/delorean.toml", home)
}
