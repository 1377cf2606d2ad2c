//! Core data model: service specs, probe observations, and the persistent
//! per-service state (§3).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// The detection method that produced (or was last attempted for) an
/// `Observation`. Tags the most specific check for failure diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeMethod {
    HealthUrl,
    TcpPort,
    PidFile,
    ProcessName,
    Unknown,
}

impl ProbeMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeMethod::HealthUrl => "health_url",
            ProbeMethod::TcpPort => "tcp_port",
            ProbeMethod::PidFile => "pid_file",
            ProbeMethod::ProcessName => "process_name",
            ProbeMethod::Unknown => "unknown",
        }
    }
}

/// Immutable, config-derived description of one monitored service.
#[derive(Debug, Clone)]
pub struct ServiceSpec {
    pub name: String,
    pub process_name: Option<String>,
    pub pid_file_path: Option<PathBuf>,
    pub tcp_port: Option<u16>,
    pub health_url: Option<String>,
    pub restart_cmd: Option<String>,
    pub start_cmd: Option<String>,
    pub stop_cmd: Option<String>,
    pub working_dir: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
    pub check_interval: u64,
    pub failure_threshold: u32,
    pub restart_delay: u64,
    pub max_restarts: u32,
    pub restart_window: u64,
    pub health_timeout: u64,
    pub enabled: bool,
}

/// A single liveness/health verdict returned by the prober (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    pub running: bool,
    pub probe_method: ProbeMethod,
    pub pid: Option<u32>,
    pub cpu_percent: Option<f64>,
    pub memory_bytes: Option<u64>,
    pub uptime_seconds: Option<u64>,
    pub error_text: Option<String>,
}

impl Observation {
    /// `running` and free of an error: the only condition the supervisor
    /// treats as healthy.
    pub fn healthy(&self) -> bool {
        self.running && self.error_text.is_none()
    }
}

/// Per-service mutable counters and timers; the durable record (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceState {
    #[serde(default)]
    pub consecutive_failures: u32,
    #[serde(default)]
    pub alerted: bool,
    #[serde(default)]
    pub pending_restart_at: Option<u64>,
    #[serde(default)]
    pub restart_window_start: Option<u64>,
    #[serde(default)]
    pub restart_count: u32,
    #[serde(default)]
    pub last_check: Option<u64>,
    #[serde(skip, default)]
    pub last_observation: Option<Observation>,
}

impl Default for ServiceState {
    fn default() -> Self {
        ServiceState {
            consecutive_failures: 0,
            alerted: false,
            pending_restart_at: None,
            restart_window_start: None,
            restart_count: 0,
            last_check: None,
            last_observation: None,
        }
    }
}

/// Full persisted snapshot: `started_at` plus one `ServiceState` per
/// configured service (§3). Unknown keys on read are ignored by `toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchdogState {
    pub started_at: u64,
    #[serde(default)]
    pub services: BTreeMap<String, ServiceState>,
}

impl WatchdogState {
    pub fn new(started_at: u64) -> Self {
        WatchdogState {
            started_at,
            services: BTreeMap::new(),
        }
    }

    pub fn service_mut(&mut self, name: &str) -> &mut ServiceState {
        self.services.entry(name.to_string()).or_default()
    }
}

/// A point-in-time snapshot combining a live probe result with persisted
/// counters, returned by the in-process `status()` surface (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub name: String,
    pub enabled: bool,
    pub running: bool,
    pub healthy: bool,
    pub pid: Option<u32>,
    pub probe_method: ProbeMethod,
    pub error: Option<String>,
    pub consecutive_failures: u32,
    pub restart_count: u32,
}
