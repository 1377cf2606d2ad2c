//! Command handler for `watchdogd status`.

use std::process;
use std::sync::Arc;

use colored::Colorize;

use watchdog_core::{Clock, Controller, NotificationSink, ShellController, SystemClock};
use watchdog_core::{NullLogSink, StateStore, Supervisor};
use watchdog_probe::DefaultProber;

/// Executes the `watchdogd status` command.
pub fn execute(config_path: &str, as_json: bool) {
    let config = match watchdog_config::load_from_path(config_path.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} Configuration error: {}", "x".red().bold(), e);
            process::exit(1);
        }
    };

    let store = StateStore::new(config.state_file.clone().into());
    let clock = Arc::new(SystemClock);
    let state = store
        .load()
        .unwrap_or_else(|| watchdog_core::WatchdogState::new(clock.now_epoch_secs()));

    let sinks: Vec<Box<dyn NotificationSink>> = Vec::new();
    let controller: Box<dyn Controller> = Box::new(ShellController::new(true));
    let supervisor = Supervisor::new(
        config.services,
        state,
        controller,
        sinks,
        clock,
        Arc::new(NullLogSink),
    );

    let prober = DefaultProber::new();
    let statuses = supervisor.status(&prober);

    if as_json {
        match serde_json::to_string_pretty(&statuses) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("{} Failed to serialize status: {}", "x".red().bold(), e);
                process::exit(1);
            }
        }
        return;
    }

    println!("Watchdog Status");
    println!("{}", "=".repeat(50));

    for status in &statuses {
        let icon = if status.healthy {
            "RUNNING".green()
        } else if status.running {
            "DEGRADED".yellow()
        } else {
            "DOWN".red()
        };

        println!("\n{} {}", icon, status.name);
        println!("   Running: {}", status.running);
        println!("   Healthy: {}", status.healthy);
        if let Some(pid) = status.pid {
            println!("   PID: {pid}");
        }
        if let Some(error) = &status.error {
            println!("   Error: {error}");
        }
        println!("   Check method: {}", status.probe_method.as_str());
        println!("   Failures: {}", status.consecutive_failures);
        println!("   Restarts: {}", status.restart_count);
    }
    println!();
}
