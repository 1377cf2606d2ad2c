//! Command handler for `watchdogd validate`.

use colored::Colorize;
use std::process;

/// Executes the `watchdogd validate` command.
pub fn execute(config_path: &str) {
    let config = match watchdog_config::load_from_path(config_path.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} Configuration error: {}", "x".red().bold(), e);
            process::exit(1);
        }
    };

    println!("{} Configuration is valid", "OK".green().bold());

    println!("\nServices configured: {}", config.services.len());
    for entry in watchdog_config::service_roster(&config) {
        let status = if entry.enabled { "enabled" } else { "disabled" };
        println!("  - {} ({status})", entry.name);
    }

    println!("\nNotifiers configured: {}", config.notifiers.len());
    for entry in watchdog_config::notifier_roster(&config) {
        let status = if entry.enabled { "enabled" } else { "disabled" };
        println!("  - {} ({status})", entry.name);
    }
}
