//! Command handler for `watchdogd run`: wires a loaded config into a
//! `Supervisor`/`Scheduler` pair and drives the scheduler loop until a
//! shutdown signal arrives.

use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use colored::Colorize;

use watchdog_config::WatchdogConfig;
use watchdog_core::{
    Controller, LogSink, NotificationSink, PidFile, Scheduler, ShellController, StateStore,
    Supervisor, SystemClock, WatchdogState,
};
use watchdog_probe::DefaultProber;

use crate::logging::{self, TracingLogSink};

/// Executes the `watchdogd run` command.
pub fn execute(config_path: &str, daemon: bool, dry_run_flag: bool, verbose: bool) {
    let config = match watchdog_config::load_from_path(config_path.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} Configuration error: {}", "x".red().bold(), e);
            process::exit(1);
        }
    };

    let dry_run = config.dry_run || dry_run_flag;

    if daemon {
        if let Err(e) = daemonize(&config) {
            eprintln!("{} Failed to daemonize: {}", "x".red().bold(), e);
            process::exit(1);
        }
    }

    let log_level = if verbose { "debug" } else { config.log_level.as_str() };
    let _guard = logging::init_logging(log_level, &config.log_file, dry_run);
    let log: Arc<dyn LogSink> = Arc::new(TracingLogSink);

    // A dry-run never writes the pid file (§8 "Dry-run isolation"); the
    // daemon flag still forks, but nothing durable is left behind.
    let pid_file = if dry_run {
        None
    } else {
        match PidFile::write(config.pid_file.clone()) {
            Ok(pid_file) => Some(pid_file),
            Err(e) => {
                log.warn(&format!("failed to write pid file {}: {e}", config.pid_file));
                None
            }
        }
    };

    let clock = Arc::new(SystemClock);
    let store = if dry_run {
        StateStore::disabled()
    } else {
        StateStore::new(config.state_file.clone())
    };

    let state = match store.load() {
        Some(state) => state,
        None => {
            log.warn("no usable state file found; starting with fresh state");
            WatchdogState::new(clock.now_epoch_secs())
        }
    };

    let service_count = config.services.len();
    let sinks: Vec<Box<dyn NotificationSink>> = config
        .notifiers
        .into_iter()
        .map(watchdog_notify::build_sink)
        .collect();
    let notifier_count = sinks.len();

    let controller: Box<dyn Controller> = Box::new(ShellController::new(dry_run));
    let prober = Box::new(DefaultProber::new());

    let supervisor = Supervisor::new(config.services, state, controller, sinks, clock.clone(), log.clone());
    let mut scheduler = Scheduler::new(supervisor, prober, store, clock, log.clone());

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        if let Err(e) = ctrlc::set_handler(move || {
            running.store(false, Ordering::SeqCst);
        }) {
            log.warn(&format!("failed to install signal handler: {e}"));
        }
    }

    log.info(&format!(
        "watchdogd starting: {service_count} service(s), {notifier_count} notifier(s), dry_run={dry_run}"
    ));

    scheduler.run(running);

    log.info("watchdogd shutting down");
    if let Some(pid_file) = pid_file {
        if let Err(e) = pid_file.remove() {
            log.warn(&format!("failed to remove pid file: {e}"));
        }
    }
}

/// Double-forks into the background on Unix, mirroring the original
/// `cli.py::_daemonize`. Rejected outright on non-Unix rather than
/// silently running in the foreground. The pid file itself is written
/// after this returns, by the caller, so dry-run mode (which never
/// touches disk) stays true regardless of whether `--daemon` was passed.
#[cfg(unix)]
fn daemonize(_config: &WatchdogConfig) -> Result<(), String> {
    daemonize::Daemonize::new()
        .working_directory(".")
        .start()
        .map_err(|e| e.to_string())
}

#[cfg(not(unix))]
fn daemonize(_config: &WatchdogConfig) -> Result<(), String> {
    Err("--daemon is only supported on Unix".to_string())
}
