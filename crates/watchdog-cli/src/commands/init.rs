//! Command handler for `watchdogd init`.

use colored::Colorize;
use std::fs;
use std::process;

/// Executes the `watchdogd init` command.
pub fn execute(output: Option<&str>) {
    let sample = watchdog_config::sample_config();

    match output {
        Some(path) => {
            if let Err(e) = fs::write(path, &sample) {
                eprintln!("{} Failed to write sample config: {}", "x".red().bold(), e);
                process::exit(1);
            }
            println!("{} Sample config written to: {}", "OK".green().bold(), path);
        }
        None => print!("{sample}"),
    }
}
