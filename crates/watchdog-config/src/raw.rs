//! Serde shapes mirrored straight off the YAML schema. Unknown keys are
//! rejected at this layer (§9 "reject unknown keys") rather than silently
//! ignored the way the Python original's `dict.get`-based loader does.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

fn default_true() -> bool {
    true
}

fn default_check_interval() -> u64 {
    30
}

fn default_failure_threshold() -> u32 {
    2
}

fn default_restart_delay() -> u64 {
    60
}

fn default_max_restarts() -> u32 {
    3
}

fn default_restart_window() -> u64 {
    3600
}

fn default_health_timeout() -> u64 {
    10
}

fn default_smtp_port() -> u16 {
    587
}

fn default_webhook_method() -> String {
    "POST".to_string()
}

fn default_log_file() -> String {
    "/var/log/watchdogd.log".to_string()
}

fn default_log_level() -> String {
    "INFO".to_string()
}

fn default_pid_file() -> String {
    "/var/run/watchdogd.pid".to_string()
}

fn default_state_file() -> String {
    "/var/lib/watchdogd/state.toml".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawServiceConfig {
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub process_name: Option<String>,
    #[serde(default)]
    pub pid_file_path: Option<PathBuf>,
    #[serde(default)]
    pub tcp_port: Option<u16>,
    #[serde(default)]
    pub health_url: Option<String>,
    #[serde(default)]
    pub restart_cmd: Option<String>,
    #[serde(default)]
    pub start_cmd: Option<String>,
    #[serde(default)]
    pub stop_cmd: Option<String>,
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    #[serde(default = "default_check_interval")]
    pub check_interval: u64,
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
    #[serde(default = "default_restart_delay")]
    pub restart_delay: u64,
    #[serde(default = "default_max_restarts")]
    pub max_restarts: u32,
    #[serde(default = "default_restart_window")]
    pub restart_window: u64,
    #[serde(default = "default_health_timeout")]
    pub health_timeout: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawNotifierConfig {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub on_failure: bool,
    #[serde(default = "default_true")]
    pub on_recovery: bool,
    #[serde(default = "default_true")]
    pub on_restart: bool,

    // telegram
    #[serde(default)]
    pub bot_token: Option<String>,
    #[serde(default)]
    pub chat_id: Option<String>,

    // slack
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,

    // email
    #[serde(default)]
    pub smtp_host: Option<String>,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub smtp_user: Option<String>,
    #[serde(default)]
    pub smtp_password: Option<String>,
    #[serde(default)]
    pub from_addr: Option<String>,
    #[serde(default)]
    pub to_addrs: Vec<String>,

    // webhook
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_webhook_method")]
    pub method: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    #[serde(default = "default_log_file")]
    pub log_file: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_pid_file")]
    pub pid_file: String,
    #[serde(default = "default_state_file")]
    pub state_file: String,
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub daemon: bool,
    #[serde(default)]
    pub services: Vec<RawServiceConfig>,
    #[serde(default)]
    pub notifiers: Vec<RawNotifierConfig>,
}
