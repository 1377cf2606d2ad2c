// SPDX-License-Identifier: Apache-2.0

//! Default implementation of `watchdog_core::Prober`: evaluates
//! `health_url`, `tcp_port`, `pid_file`, and `process_name` in that fixed
//! order, returning on the first method that reports the service running.

use std::fs;
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use sysinfo::{Pid, System};
use watchdog_core::{Observation, ProbeMethod, Prober, ServiceSpec};

const TCP_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Probes a service using whichever detection methods its spec configures.
/// Stateless with respect to the daemon; every call refreshes its own view
/// of the process table.
pub struct DefaultProber;

impl DefaultProber {
    pub fn new() -> Self {
        DefaultProber
    }
}

impl Default for DefaultProber {
    fn default() -> Self {
        DefaultProber::new()
    }
}

impl Prober for DefaultProber {
    fn probe(&self, spec: &ServiceSpec) -> Observation {
        if spec.health_url.is_some() {
            let observation = probe_health_url(spec);
            if observation.running {
                return observation;
            }
            if spec.tcp_port.is_none() && spec.pid_file_path.is_none() && spec.process_name.is_none()
            {
                return observation;
            }
        }

        if spec.tcp_port.is_some() {
            let observation = probe_tcp_port(spec);
            if observation.running {
                return observation;
            }
            if spec.pid_file_path.is_none() && spec.process_name.is_none() {
                return observation;
            }
        }

        if spec.pid_file_path.is_some() {
            let observation = probe_pid_file(spec);
            if observation.running {
                return observation;
            }
            if spec.process_name.is_none() {
                return observation;
            }
        }

        if let Some(process_name) = &spec.process_name {
            return probe_process_name(process_name);
        }

        Observation {
            running: false,
            probe_method: ProbeMethod::Unknown,
            pid: None,
            cpu_percent: None,
            memory_bytes: None,
            uptime_seconds: None,
            error_text: None,
        }
    }
}

fn probe_health_url(spec: &ServiceSpec) -> Observation {
    let url = spec.health_url.as_ref().expect("health_url configured");
    let client = match reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(spec.health_timeout))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            return unhealthy(ProbeMethod::HealthUrl, format!("failed to build HTTP client: {e}"))
        }
    };

    match client.get(url).send() {
        Ok(response) => {
            let status = response.status();
            if status.as_u16() < 500 {
                Observation {
                    running: true,
                    probe_method: ProbeMethod::HealthUrl,
                    pid: None,
                    cpu_percent: None,
                    memory_bytes: None,
                    uptime_seconds: None,
                    error_text: None,
                }
            } else {
                unhealthy(
                    ProbeMethod::HealthUrl,
                    format!("health check returned {}", status.as_u16()),
                )
            }
        }
        Err(e) if e.is_timeout() => unhealthy(
            ProbeMethod::HealthUrl,
            format!("health check timed out after {}s", spec.health_timeout),
        ),
        Err(e) => unhealthy(ProbeMethod::HealthUrl, format!("health check failed: {e}")),
    }
}

fn probe_tcp_port(spec: &ServiceSpec) -> Observation {
    let port = spec.tcp_port.expect("tcp_port configured");
    let addr: SocketAddr = ([127, 0, 0, 1], port).into();

    match TcpStream::connect_timeout(&addr, TCP_CONNECT_TIMEOUT) {
        Ok(_stream) => {
            // The port check is itself the authority; a failure to resolve
            // the owning process (permission denied, racing exit) is
            // swallowed rather than downgrading the observation (§4.1).
            let (pid, cpu_percent, memory_bytes, uptime_seconds) = resolve_port_owner(port)
                .map(|pid| process_metrics(pid))
                .unwrap_or((None, None, None, None));
            Observation {
                running: true,
                probe_method: ProbeMethod::TcpPort,
                pid,
                cpu_percent,
                memory_bytes,
                uptime_seconds,
                error_text: None,
            }
        }
        Err(e) => unhealthy(ProbeMethod::TcpPort, format!("port {port} not listening: {e}")),
    }
}

fn probe_pid_file(spec: &ServiceSpec) -> Observation {
    let path = spec.pid_file_path.as_ref().expect("pid_file_path configured");

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => {
            return unhealthy(
                ProbeMethod::PidFile,
                format!("PID file not found: {}", path.display()),
            )
        }
    };

    let pid: u32 = match content.trim().parse() {
        Ok(pid) => pid,
        Err(_) => {
            return unhealthy(
                ProbeMethod::PidFile,
                format!("invalid PID file: {}", path.display()),
            )
        }
    };

    let mut system = System::new_all();
    system.refresh_all();
    match system.process(Pid::from_u32(pid)) {
        Some(process) => Observation {
            running: true,
            probe_method: ProbeMethod::PidFile,
            pid: Some(pid),
            cpu_percent: Some(process.cpu_usage() as f64),
            memory_bytes: Some(process.memory()),
            uptime_seconds: Some(process.run_time()),
            error_text: None,
        },
        None => unhealthy(
            ProbeMethod::PidFile,
            format!("PID {pid} not running (stale PID file)"),
        ),
    }
}

fn probe_process_name(process_name: &str) -> Observation {
    let mut system = System::new_all();
    system.refresh_all();

    for (pid, process) in system.processes() {
        if process.name().to_string_lossy() == process_name {
            return Observation {
                running: true,
                probe_method: ProbeMethod::ProcessName,
                pid: Some(pid.as_u32()),
                cpu_percent: Some(process.cpu_usage() as f64),
                memory_bytes: Some(process.memory()),
                uptime_seconds: Some(process.run_time()),
                error_text: None,
            };
        }
    }

    unhealthy(
        ProbeMethod::ProcessName,
        format!("no process named `{process_name}` found"),
    )
}

fn process_metrics(pid: u32) -> (Option<u32>, Option<f64>, Option<u64>, Option<u64>) {
    let mut system = System::new_all();
    system.refresh_all();
    match system.process(Pid::from_u32(pid)) {
        Some(process) => (
            Some(pid),
            Some(process.cpu_usage() as f64),
            Some(process.memory()),
            Some(process.run_time()),
        ),
        None => (Some(pid), None, None, None),
    }
}

/// Best-effort lookup of the process listening on `port`, using the same
/// shell-out-and-parse approach the daemon already relies on for process
/// liveness. Any failure (missing tool, permission denied) is swallowed.
#[cfg(unix)]
fn resolve_port_owner(port: u16) -> Option<u32> {
    let output = std::process::Command::new("ss")
        .args(["-ltnp"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&output.stdout);
    let pattern = regex::Regex::new(&format!(r":{port}\s.*pid=(\d+)")).ok()?;
    pattern
        .captures(&text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(not(unix))]
fn resolve_port_owner(_port: u16) -> Option<u32> {
    None
}

fn unhealthy(probe_method: ProbeMethod, error_text: String) -> Observation {
    Observation {
        running: false,
        probe_method,
        pid: None,
        cpu_percent: None,
        memory_bytes: None,
        uptime_seconds: None,
        error_text: Some(error_text),
    }
}
