use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

use delorean_core::{config, DeloreanConfig, DeloreanError, ResolvedConfig};
use delorean_log::LogStore;
use delorean_scheduler::{
    analyzer, EngineConfig, Notifier, PathProbe, SchedulerEngine, SchedulerHandle,
};

use crate::notify::{CommandNotifier, TracingNotifier};
use crate::script::ScriptLauncher;

mod notify;
mod script;

#[derive(Parser)]
#[command(name = "delorean", version, about = "Backup scheduling daemon")]
struct Cli {
    /// Path to delorean.toml (default: ~/.delorean/delorean.toml).
    #[arg(long, env = "DELOREAN_CONFIG")]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the scheduling loop (the default).
    Run,
    /// Print the last log entry and days since the last successful backup.
    Status,
    /// Validate the configuration and print the effective schedule.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "delorean=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let resolved = load_config(cli.config.as_deref())?.resolve()?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(resolved).await,
        Command::Status => {
            print_status(&resolved);
            Ok(())
        }
        Command::CheckConfig => {
            print_config(&resolved);
            Ok(())
        }
    }
}

/// Load config: explicit path > DELOREAN_CONFIG > ~/.delorean/delorean.toml,
/// falling back to the key=value pairs in the legacy backup script when no
/// TOML config exists yet.
fn load_config(explicit: Option<&str>) -> anyhow::Result<DeloreanConfig> {
    let path = explicit
        .map(String::from)
        .unwrap_or_else(config::default_config_path);

    if std::path::Path::new(&path).exists() {
        return Ok(DeloreanConfig::load(Some(&path))?);
    }

    let script = config::expand_path(&DeloreanConfig::default().paths.script);
    if script.exists() {
        info!(script = %script.display(), "no delorean.toml; importing legacy script configuration");
        return Ok(DeloreanConfig::from_backup_script(&script)?);
    }

    // Neither file exists: defaults plus DELOREAN_* env overrides.
    Ok(DeloreanConfig::load(Some(&path))?)
}

async fn run(config: ResolvedConfig) -> anyhow::Result<()> {
    // Without the backup script there is nothing to schedule; refuse to
    // start rather than tick uselessly.
    if !config.script.exists() {
        return Err(DeloreanError::ConfigMissing(config.script).into());
    }

    info!(
        script = %config.script.display(),
        log_file = %config.log_file.display(),
        destination = %config.destination.display(),
        "delorean starting"
    );

    let notifier: Arc<dyn Notifier> = match CommandNotifier::detect() {
        Some(notifier) => Arc::new(notifier),
        None => {
            warn!("no desktop notification command found; alerts go to the log stream");
            Arc::new(TracingNotifier)
        }
    };

    let (events_tx, events_rx) = mpsc::channel(16);

    #[cfg(unix)]
    spawn_signal_listeners(SchedulerHandle::new(events_tx.clone()));

    let engine = SchedulerEngine::new(
        EngineConfig::from(&config),
        LogStore::new(&config.log_file),
        Box::new(ScriptLauncher::new(&config.script)),
        notifier,
        Box::new(PathProbe::new(&config.destination)),
        events_tx,
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let engine_task = tokio::spawn(engine.run(events_rx, shutdown_rx));

    wait_for_shutdown().await;
    info!("shutdown requested");

    // The engine terminates any in-flight backup process on its way out.
    let _ = shutdown_tx.send(true);
    let _ = engine_task.await;
    Ok(())
}

/// SIGUSR1 = start a backup now, SIGUSR2 = abort the running one — the
/// daemon-shaped replacement for the menu items of the desktop original.
#[cfg(unix)]
fn spawn_signal_listeners(handle: SchedulerHandle) {
    use tokio::signal::unix::{signal, SignalKind};

    let start_handle = handle.clone();
    tokio::spawn(async move {
        match signal(SignalKind::user_defined1()) {
            Ok(mut stream) => {
                while stream.recv().await.is_some() {
                    info!("SIGUSR1: manual backup requested");
                    start_handle.start_now().await;
                }
            }
            Err(e) => warn!(error = %e, "cannot listen for SIGUSR1"),
        }
    });

    tokio::spawn(async move {
        match signal(SignalKind::user_defined2()) {
            Ok(mut stream) => {
                while stream.recv().await.is_some() {
                    info!("SIGUSR2: abort requested");
                    handle.abort().await;
                }
            }
            Err(e) => warn!(error = %e, "cannot listen for SIGUSR2"),
        }
    });
}

async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                warn!(error = %e, "cannot listen for SIGTERM");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

fn print_status(config: &ResolvedConfig) {
    let store = LogStore::new(&config.log_file);
    let entries = store.read_all();

    match entries.last() {
        Some(entry) => println!("Last Backup: {}", entry.render()),
        None => println!("Last Backup: N/A"),
    }
    match analyzer::days_since_last_success(&entries, chrono::Local::now().naive_local()) {
        Some(0) => println!("Last success: today"),
        Some(days) => println!("Last success: {days} day(s) ago"),
        None => println!("Last success: never"),
    }
}

fn print_config(config: &ResolvedConfig) {
    println!(
        "scheduled time:  {}",
        config.times.scheduled.format("%H:%M")
    );
    println!(
        "backup window:   {} - {}",
        config.times.window_start.format("%H:%M"),
        config.times.window_end.format("%H:%M")
    );
    println!("poll interval:   {}s", config.poll_interval.as_secs());
    println!("alert threshold: {}", config.max_daily_failure_alerts);
    println!("backup script:   {}", config.script.display());
    println!("log file:        {}", config.log_file.display());
    println!("destination:     {}", config.destination.display());
    if !config.script.exists() {
        println!("warning: backup script not found");
    }
}
