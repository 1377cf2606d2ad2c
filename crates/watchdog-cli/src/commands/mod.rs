//! CLI subcommand declarations and dispatch.

pub mod init;
pub mod restart;
pub mod run;
pub mod status;
pub mod validate;

use clap::Subcommand;

/// Top-level CLI subcommands supported by `watchdogd`.
#[derive(Subcommand)]
pub enum Commands {
    /// Start the watchdog daemon
    Run {
        /// Path to configuration file (YAML). Defaults to
        /// `$XDG_CONFIG_HOME/watchdogd/config.yml` (or `/etc/watchdogd/config.yml`).
        #[arg(short = 'c', long = "config")]
        config: Option<String>,

        /// Run as a background daemon (Unix only)
        #[arg(short = 'd', long)]
        daemon: bool,

        /// Dry-run mode: log actions instead of executing them
        #[arg(long)]
        dry_run: bool,

        /// Enable verbose (debug) logging
        #[arg(short = 'v', long)]
        verbose: bool,
    },

    /// Validate a configuration file
    Validate {
        /// Path to configuration file (YAML). Same default as `run`.
        #[arg(short = 'c', long = "config")]
        config: Option<String>,
    },

    /// Show status of monitored services
    Status {
        /// Path to configuration file (YAML). Same default as `run`.
        #[arg(short = 'c', long = "config")]
        config: Option<String>,

        /// Output as JSON
        #[arg(long = "json")]
        as_json: bool,
    },

    /// Manually restart a single service, bypassing the rate limiter
    Restart {
        /// Path to configuration file (YAML). Same default as `run`.
        #[arg(short = 'c', long = "config")]
        config: Option<String>,

        /// Service name
        service_name: String,
    },

    /// Generate a sample configuration file
    Init {
        /// Output file path (defaults to stdout)
        #[arg(short = 'o', long = "output")]
        output: Option<String>,
    },
}

/// Resolves an explicit `-c/--config` value, falling back to the
/// conventional per-user location when the flag was omitted.
fn resolve_config(config: Option<String>) -> String {
    config.unwrap_or_else(|| crate::paths::default_config_path().to_string_lossy().into_owned())
}

/// Dispatches a parsed CLI command to its command module.
pub fn execute(command: Commands) {
    match command {
        Commands::Run {
            config,
            daemon,
            dry_run,
            verbose,
        } => run::execute(&resolve_config(config), daemon, dry_run, verbose),
        Commands::Validate { config } => validate::execute(&resolve_config(config)),
        Commands::Status { config, as_json } => status::execute(&resolve_config(config), as_json),
        Commands::Restart {
            config,
            service_name,
        } => restart::execute(&resolve_config(config), &service_name),
        Commands::Init { output } => init::execute(output.as_deref()),
    }
}
