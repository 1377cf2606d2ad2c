//! Command handler for `watchdogd restart`.

use std::process;

use colored::Colorize;

use watchdog_core::{Controller, ShellController};

/// Executes the `watchdogd restart` command: a manual, one-off restart
/// that bypasses the supervisor's rate limiter entirely.
pub fn execute(config_path: &str, service_name: &str) {
    let config = match watchdog_config::load_from_path(config_path.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} Configuration error: {}", "x".red().bold(), e);
            process::exit(1);
        }
    };

    let Some(spec) = config.services.iter().find(|s| s.name == service_name) else {
        eprintln!("{} Service not found: {}", "x".red().bold(), service_name);
        process::exit(1);
    };

    let controller = ShellController::new(config.dry_run);
    let (success, message) = controller.restart(spec);

    if success {
        println!("{} {}", "OK".green().bold(), message);
    } else {
        eprintln!("{} {}", "x".red().bold(), message);
        process::exit(1);
    }
}
