// SPDX-License-Identifier: Apache-2.0

//! watchdogd binary entrypoint.

mod commands;
mod logging;
mod paths;

use clap::Parser;
use commands::Commands;

/// watchdogd - YAML-driven service supervisor with health probing,
/// auto-restart, and pluggable alert notifiers
#[derive(Parser)]
#[command(name = "watchdogd", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Parses CLI arguments and dispatches to command handlers.
fn main() {
    let cli = Cli::parse();
    commands::execute(cli.command);
}
