// SPDX-License-Identifier: Apache-2.0

//! YAML configuration loading for the watchdog daemon: `${VAR}`
//! substitution, `serde_yaml` parsing with unknown-key rejection,
//! structural validation, and conversion into the types `watchdog-core`
//! and `watchdog-notify` consume.

mod convert;
mod error;
mod raw;
mod sample;
mod substitution;
mod validate;

use std::path::Path;

pub use error::ConfigError;
pub use sample::sample_config;

use raw::RawConfig;
use watchdog_core::ServiceSpec;
use watchdog_notify::NotifierSpec;

/// Fully parsed and validated configuration, ready to build a
/// `Supervisor`/`Scheduler` from.
#[derive(Debug, Clone)]
pub struct WatchdogConfig {
    pub log_file: String,
    pub log_level: String,
    pub pid_file: String,
    pub state_file: String,
    pub dry_run: bool,
    pub daemon: bool,
    pub services: Vec<ServiceSpec>,
    pub notifiers: Vec<NotifierSpec>,
}

/// Loads and validates a config from its raw YAML text. `lookup` resolves
/// `${VAR}` references; production callers pass `|name| std::env::var(name).ok()`.
pub fn load_from_str(
    text: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<WatchdogConfig, ConfigError> {
    let substituted = substitution::substitute_env(text, lookup)?;
    let raw: RawConfig = serde_yaml::from_str(&substituted)?;

    let errors = validate::validate_raw(&raw);
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.join("; ")));
    }

    Ok(WatchdogConfig {
        log_file: raw.log_file.clone(),
        log_level: raw.log_level.clone(),
        pid_file: raw.pid_file.clone(),
        state_file: raw.state_file.clone(),
        dry_run: raw.dry_run,
        daemon: raw.daemon,
        services: convert::to_service_specs(&raw),
        notifiers: convert::to_notifier_specs(&raw),
    })
}

/// Loads a config from disk, resolving `${VAR}` against the process
/// environment.
pub fn load_from_path(path: &Path) -> Result<WatchdogConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    load_from_str(&text, |name| std::env::var(name).ok())
}

/// Roster entry printed by `validate`/`init` (§C.5): service or notifier
/// name plus whether it's enabled, without exposing full config detail.
pub struct RosterEntry {
    pub name: String,
    pub enabled: bool,
}

pub fn service_roster(config: &WatchdogConfig) -> Vec<RosterEntry> {
    config
        .services
        .iter()
        .map(|s| RosterEntry {
            name: s.name.clone(),
            enabled: s.enabled,
        })
        .collect()
}

pub fn notifier_roster(config: &WatchdogConfig) -> Vec<RosterEntry> {
    config
        .notifiers
        .iter()
        .map(|n| RosterEntry {
            name: transport_name(n).to_string(),
            enabled: n.flags.enabled,
        })
        .collect()
}

fn transport_name(spec: &NotifierSpec) -> &'static str {
    match spec.transport {
        watchdog_notify::Transport::Telegram { .. } => "telegram",
        watchdog_notify::Transport::Slack { .. } => "slack",
        watchdog_notify::Transport::Email { .. } => "email",
        watchdog_notify::Transport::Webhook { .. } => "webhook",
    }
}
