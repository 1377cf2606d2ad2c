//! Event payloads dispatched to notifier sinks on meaningful state
//! transitions (§6 "Event kinds", §9 "Plugin polymorphism").

use crate::types::Observation;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Failure,
    Recovery,
    Restart,
    RestartFailed,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Failure => "FAILURE",
            EventKind::Recovery => "RECOVERY",
            EventKind::Restart => "RESTART",
            EventKind::RestartFailed => "RESTART_FAILED",
        }
    }
}

/// Kind, target service, human message, timestamp, and an optional
/// observation snapshot taken at emission time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    pub service: String,
    pub message: String,
    pub timestamp: u64,
    pub observation: Option<Observation>,
}

/// A sink that accepts an event and either delivers or drops it. A sink's
/// failure never propagates to the supervisor and never affects state
/// transitions (§4.3 "Event emission", §7 "Notifier errors").
pub trait NotificationSink: Send + Sync {
    /// Identifies the sink in logs (e.g. `"telegram"`, `"slack:#ops"`).
    fn name(&self) -> &str;

    /// Pre-filter by event kind and the sink's own `on_failure` /
    /// `on_recovery` / `on_restart` flags.
    fn should_deliver(&self, event: &Event) -> bool;

    /// Transport-specific delivery. The core never inspects the failure
    /// reason beyond logging it.
    fn deliver(&self, event: &Event) -> (bool, String);
}
