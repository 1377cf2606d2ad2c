//! Executes service start/stop/restart shell actions with a bounded
//! timeout and merged environment (§4.2).

use crate::types::ServiceSpec;
use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const ACTION_TIMEOUT: Duration = Duration::from_secs(60);
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Starts, stops, and restarts a service via its configured shell commands.
/// Stateless: every call is given the full spec it needs.
pub trait Controller: Send + Sync {
    fn start(&self, spec: &ServiceSpec) -> (bool, String);
    fn stop(&self, spec: &ServiceSpec) -> (bool, String);
    fn restart(&self, spec: &ServiceSpec) -> (bool, String);
}

/// Runs each configured command through the host shell. `std::process::Command`
/// inherits the daemon's full environment by default, and `.envs()` only
/// overrides the keys present in the service's `env` map, which already
/// satisfies "inherit then overlay, service wins" (§9) without a manual merge.
pub struct ShellController {
    dry_run: bool,
}

impl ShellController {
    pub fn new(dry_run: bool) -> Self {
        ShellController { dry_run }
    }

    fn run(&self, spec: &ServiceSpec, cmd: &str, label: &str) -> (bool, String) {
        if self.dry_run {
            return (true, format!("dry-run: would run {label} `{cmd}`"));
        }

        let mut command = shell_command(cmd);
        command
            .envs(&spec.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &spec.working_dir {
            command.current_dir(dir);
        }

        let child = match command.spawn() {
            Ok(child) => child,
            Err(e) => return (false, format!("failed to spawn {label} `{cmd}`: {e}")),
        };

        run_with_timeout(child, ACTION_TIMEOUT, label, cmd)
    }
}

impl Controller for ShellController {
    fn start(&self, spec: &ServiceSpec) -> (bool, String) {
        match &spec.start_cmd {
            Some(cmd) => self.run(spec, cmd, "start_cmd"),
            None => (false, "no start_cmd configured".to_string()),
        }
    }

    fn stop(&self, spec: &ServiceSpec) -> (bool, String) {
        match &spec.stop_cmd {
            Some(cmd) => self.run(spec, cmd, "stop_cmd"),
            None => (true, "no stop_cmd configured; nothing to do".to_string()),
        }
    }

    /// Prefers `restart_cmd`. If absent, runs `stop_cmd` (if configured)
    /// followed by `start_cmd`.
    fn restart(&self, spec: &ServiceSpec) -> (bool, String) {
        if let Some(cmd) = &spec.restart_cmd {
            return self.run(spec, cmd, "restart_cmd");
        }

        if let Some(stop_cmd) = &spec.stop_cmd {
            let (ok, message) = self.run(spec, stop_cmd, "stop_cmd");
            if !ok {
                return (false, format!("stop_cmd failed before restart: {message}"));
            }
        }

        match &spec.start_cmd {
            Some(start_cmd) => self.run(spec, start_cmd, "start_cmd"),
            None => (false, "no restart_cmd or start_cmd configured".to_string()),
        }
    }
}

#[cfg(unix)]
fn shell_command(cmd: &str) -> Command {
    let mut command = Command::new("sh");
    command.arg("-c").arg(cmd);
    command
}

#[cfg(windows)]
fn shell_command(cmd: &str) -> Command {
    let mut command = Command::new("cmd");
    command.arg("/C").arg(cmd);
    command
}

/// Polls a spawned child for completion, killing it and reporting a timeout
/// once `timeout` has elapsed without an exit.
fn run_with_timeout(
    mut child: Child,
    timeout: Duration,
    label: &str,
    cmd: &str,
) -> (bool, String) {
    let started = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                let output = collect_stderr(&mut child);
                return if status.success() {
                    (true, format!("{label} `{cmd}` exited 0{output}"))
                } else {
                    let code = status
                        .code()
                        .map(|c| c.to_string())
                        .unwrap_or_else(|| "signal".to_string());
                    (false, format!("{label} `{cmd}` exited {code}{output}"))
                };
            }
            Ok(None) => {
                if started.elapsed() >= timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return (
                        false,
                        format!("{label} `{cmd}` timed out after {}s", timeout.as_secs()),
                    );
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(e) => return (false, format!("failed to wait on {label} `{cmd}`: {e}")),
        }
    }
}

fn collect_stderr(child: &mut Child) -> String {
    let mut combined = String::new();
    if let Some(mut stderr) = child.stderr.take() {
        let mut buf = String::new();
        if stderr.read_to_string(&mut buf).is_ok() && !buf.trim().is_empty() {
            combined.push_str(": ");
            combined.push_str(buf.trim());
        }
    }
    combined
}
