// SPDX-License-Identifier: Apache-2.0

//! Core state machine for the watchdog supervisor daemon: service specs,
//! probe observations, the per-service remediation state machine, the
//! scheduler loop, and durable state persistence. Probe methods, notifier
//! transports, YAML configuration, and the CLI live in sibling crates and
//! consume the traits defined here.

pub mod clock;
pub mod controller;
pub mod error;
pub mod log;
pub mod notify;
pub mod pidfile;
pub mod probe;
pub mod scheduler;
pub mod state_store;
pub mod supervisor;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{Controller, ShellController};
pub use error::SupervisorError;
pub use log::{LogSink, NullLogSink, RecordingLogSink};
pub use notify::{Event, EventKind, NotificationSink};
pub use pidfile::PidFile;
pub use probe::Prober;
pub use scheduler::Scheduler;
pub use state_store::StateStore;
pub use supervisor::Supervisor;
pub use types::{
    Observation, ProbeMethod, ServiceSpec, ServiceState, ServiceStatus, WatchdogState,
};

/// Returns crate version for runtime diagnostics/tests.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
