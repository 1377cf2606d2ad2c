//! The per-service monitoring and remediation state machine (§4.3). The
//! heart of the system: every probe observation and every restart-due
//! trigger passes through exactly one of the two entry points here.

use crate::clock::Clock;
use crate::controller::Controller;
use crate::error::SupervisorError;
use crate::log::LogSink;
use crate::notify::{Event, EventKind, NotificationSink};
use crate::probe::Prober;
use crate::types::{Observation, ServiceSpec, ServiceStatus, WatchdogState};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Drives every service's `ServiceState` transitions and dispatches events
/// to notifier sinks. Owns the full `WatchdogState` for the run.
pub struct Supervisor {
    clock: Arc<dyn Clock>,
    log: Arc<dyn LogSink>,
    controller: Box<dyn Controller>,
    sinks: Vec<Box<dyn NotificationSink>>,
    specs: BTreeMap<String, ServiceSpec>,
    state: WatchdogState,
}

impl Supervisor {
    pub fn new(
        specs: Vec<ServiceSpec>,
        state: WatchdogState,
        controller: Box<dyn Controller>,
        sinks: Vec<Box<dyn NotificationSink>>,
        clock: Arc<dyn Clock>,
        log: Arc<dyn LogSink>,
    ) -> Self {
        let specs = specs.into_iter().map(|s| (s.name.clone(), s)).collect();
        Supervisor {
            clock,
            log,
            controller,
            sinks,
            specs,
            state,
        }
    }

    pub fn specs(&self) -> impl Iterator<Item = &ServiceSpec> {
        self.specs.values()
    }

    pub fn spec(&self, name: &str) -> Option<&ServiceSpec> {
        self.specs.get(name)
    }

    pub fn state(&self) -> &WatchdogState {
        &self.state
    }

    pub fn replace_state(&mut self, state: WatchdogState) {
        self.state = state;
    }

    /// Feeds one probe result through the state machine for `name`.
    ///
    /// 1. Records `last_check` / `last_observation`.
    /// 2. Healthy ⇒ recovery edge (if warranted), then reset counters.
    ///    `restart_window_start`/`restart_count` are deliberately left
    ///    untouched — recovery does not reset the rate-limiter window (§9
    ///    Open Question).
    /// 3. Unhealthy ⇒ bump `consecutive_failures`; at the threshold, emit at
    ///    most one FAILURE per outage and schedule a restart if one is not
    ///    already pending.
    pub fn on_observation(
        &mut self,
        name: &str,
        observation: Observation,
    ) -> Result<(), SupervisorError> {
        let cfg = self
            .specs
            .get(name)
            .cloned()
            .ok_or_else(|| SupervisorError::UnknownService(name.to_string()))?;
        let now = self.clock.now_epoch_secs();
        let healthy = observation.healthy();

        let s = self.state.service_mut(name);
        s.last_check = Some(now);
        s.last_observation = Some(observation.clone());

        if healthy {
            let should_recover = s.consecutive_failures > 0 || s.alerted;
            s.consecutive_failures = 0;
            s.alerted = false;
            s.pending_restart_at = None;
            if should_recover {
                self.emit(Event {
                    kind: EventKind::Recovery,
                    service: name.to_string(),
                    message: format!("{name} recovered"),
                    timestamp: now,
                    observation: Some(observation),
                });
            }
            return Ok(());
        }

        s.consecutive_failures += 1;
        let crossed_threshold = s.consecutive_failures >= cfg.failure_threshold;
        let newly_alerted = crossed_threshold && !s.alerted;
        if newly_alerted {
            s.alerted = true;
        }
        let needs_restart_scheduled = crossed_threshold && s.pending_restart_at.is_none();
        if needs_restart_scheduled {
            s.pending_restart_at = Some(now + cfg.restart_delay);
        }

        if newly_alerted {
            let message = observation.error_text.clone().unwrap_or_else(|| {
                let failures = self.state.service_mut(name).consecutive_failures;
                format!("{name} is unhealthy after {failures} consecutive failures")
            });
            self.emit(Event {
                kind: EventKind::Failure,
                service: name.to_string(),
                message,
                timestamp: now,
                observation: Some(observation),
            });
        }

        Ok(())
    }

    /// Fires the restart-due trigger for `name`, independent of any probe.
    ///
    /// 1. Rolls the rate-limit window if it has never been started, or if
    ///    more than `restart_window` seconds have elapsed since it started.
    /// 2. If the window's budget is exhausted, emits RESTART_FAILED
    ///    ("exceeded maximum restart attempts"), clears the pending restart,
    ///    and returns without invoking the controller.
    /// 3. Otherwise invokes `controller.restart()`, always increments
    ///    `restart_count` and clears `pending_restart_at`, then emits
    ///    RESTART on success or RESTART_FAILED (with a reschedule) on
    ///    failure.
    pub fn on_restart_due(&mut self, name: &str) -> Result<(), SupervisorError> {
        let cfg = self
            .specs
            .get(name)
            .cloned()
            .ok_or_else(|| SupervisorError::UnknownService(name.to_string()))?;
        let now = self.clock.now_epoch_secs();

        let s = self.state.service_mut(name);
        match s.restart_window_start {
            None => {
                s.restart_window_start = Some(now);
                s.restart_count = 0;
            }
            Some(start) if now.saturating_sub(start) > cfg.restart_window => {
                s.restart_window_start = Some(now);
                s.restart_count = 0;
            }
            Some(_) => {}
        }

        if s.restart_count >= cfg.max_restarts {
            s.pending_restart_at = None;
            self.emit(Event {
                kind: EventKind::RestartFailed,
                service: name.to_string(),
                message: "exceeded maximum restart attempts".to_string(),
                timestamp: now,
                observation: None,
            });
            return Ok(());
        }

        let (ok, message) = self.controller.restart(&cfg);

        let s = self.state.service_mut(name);
        s.restart_count += 1;
        s.pending_restart_at = None;
        let restart_count = s.restart_count;

        if ok {
            self.emit(Event {
                kind: EventKind::Restart,
                service: name.to_string(),
                message: format!(
                    "restarted {name} (attempt {restart_count}/{}): {message}",
                    cfg.max_restarts
                ),
                timestamp: now,
                observation: None,
            });
        } else {
            self.state.service_mut(name).pending_restart_at = Some(now + cfg.restart_delay);
            self.emit(Event {
                kind: EventKind::RestartFailed,
                service: name.to_string(),
                message,
                timestamp: now,
                observation: None,
            });
        }

        Ok(())
    }

    /// Runs one probe per configured service without mutating any counters
    /// (§6). Used by the CLI `status` surface.
    pub fn status(&self, prober: &dyn Prober) -> Vec<ServiceStatus> {
        self.specs
            .values()
            .map(|spec| {
                let observation = prober.probe(spec);
                let state = self.state.services.get(&spec.name);
                ServiceStatus {
                    name: spec.name.clone(),
                    enabled: spec.enabled,
                    running: observation.running,
                    healthy: observation.healthy(),
                    pid: observation.pid,
                    probe_method: observation.probe_method,
                    error: observation.error_text.clone(),
                    consecutive_failures: state.map(|s| s.consecutive_failures).unwrap_or(0),
                    restart_count: state.map(|s| s.restart_count).unwrap_or(0),
                }
            })
            .collect()
    }

    /// Dispatches `event` to every sink whose own filter accepts it. A
    /// sink's failure is logged at warn level and otherwise discarded; it
    /// never affects state transitions (§7 "Notifier errors").
    fn emit(&self, event: Event) {
        self.log.info(&format!(
            "{} {}: {}",
            event.kind.as_str(),
            event.service,
            event.message
        ));
        for sink in &self.sinks {
            if !sink.should_deliver(&event) {
                continue;
            }
            let (ok, message) = sink.deliver(&event);
            if !ok {
                self.log.warn(&format!(
                    "notifier {} failed to deliver {}: {}",
                    sink.name(),
                    event.kind.as_str(),
                    message
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::log::RecordingLogSink;
    use std::collections::BTreeMap as Map;
    use std::sync::Mutex;

    fn spec(name: &str) -> ServiceSpec {
        ServiceSpec {
            name: name.to_string(),
            process_name: None,
            pid_file_path: None,
            tcp_port: Some(9),
            health_url: None,
            restart_cmd: Some("true".to_string()),
            start_cmd: None,
            stop_cmd: None,
            working_dir: None,
            env: Map::new(),
            check_interval: 1,
            failure_threshold: 2,
            restart_delay: 3,
            max_restarts: 3,
            restart_window: 60,
            health_timeout: 10,
            enabled: true,
        }
    }

    fn healthy_observation() -> Observation {
        Observation {
            running: true,
            probe_method: crate::types::ProbeMethod::TcpPort,
            pid: Some(42),
            cpu_percent: None,
            memory_bytes: None,
            uptime_seconds: None,
            error_text: None,
        }
    }

    fn unhealthy_observation(message: &str) -> Observation {
        Observation {
            running: false,
            probe_method: crate::types::ProbeMethod::TcpPort,
            pid: None,
            cpu_percent: None,
            memory_bytes: None,
            uptime_seconds: None,
            error_text: Some(message.to_string()),
        }
    }

    struct ScriptedController {
        outcomes: Mutex<Vec<(bool, String)>>,
    }

    impl ScriptedController {
        fn new(outcomes: Vec<(bool, String)>) -> Self {
            ScriptedController {
                outcomes: Mutex::new(outcomes),
            }
        }
    }

    impl Controller for ScriptedController {
        fn start(&self, _spec: &ServiceSpec) -> (bool, String) {
            (true, "started".to_string())
        }
        fn stop(&self, _spec: &ServiceSpec) -> (bool, String) {
            (true, "stopped".to_string())
        }
        fn restart(&self, _spec: &ServiceSpec) -> (bool, String) {
            let mut outcomes = self.outcomes.lock().unwrap();
            if outcomes.is_empty() {
                (true, "restarted".to_string())
            } else {
                outcomes.remove(0)
            }
        }
    }

    struct RecordingSink {
        events: Mutex<Vec<Event>>,
    }

    impl RecordingSink {
        fn new() -> Self {
            RecordingSink {
                events: Mutex::new(Vec::new()),
            }
        }
    }

    impl NotificationSink for RecordingSink {
        fn name(&self) -> &str {
            "recording"
        }
        fn should_deliver(&self, _event: &Event) -> bool {
            true
        }
        fn deliver(&self, event: &Event) -> (bool, String) {
            self.events.lock().unwrap().push(event.clone());
            (true, "ok".to_string())
        }
    }

    fn supervisor_with(
        spec: ServiceSpec,
        controller: ScriptedController,
        clock: Arc<ManualClock>,
    ) -> (Supervisor, Arc<RecordingLogSink>) {
        let log = Arc::new(RecordingLogSink::new());
        let sup = Supervisor::new(
            vec![spec],
            WatchdogState::new(clock.now_epoch_secs()),
            Box::new(controller),
            vec![Box::new(RecordingSink::new())],
            clock,
            log.clone(),
        );
        (sup, log)
    }

    #[test]
    fn failure_debounced_until_threshold() {
        let clock = Arc::new(ManualClock::new(1_000));
        let (mut sup, _log) = supervisor_with(spec("web"), ScriptedController::new(vec![]), clock);

        sup.on_observation("web", unhealthy_observation("connect refused")).unwrap();
        assert!(!sup.state().services["web"].alerted);
        assert_eq!(sup.state().services["web"].consecutive_failures, 1);
        assert!(sup.state().services["web"].pending_restart_at.is_none());

        sup.on_observation("web", unhealthy_observation("connect refused")).unwrap();
        assert!(sup.state().services["web"].alerted);
        assert_eq!(sup.state().services["web"].consecutive_failures, 2);
        assert!(sup.state().services["web"].pending_restart_at.is_some());
    }

    #[test]
    fn only_one_failure_event_per_outage() {
        let clock = Arc::new(ManualClock::new(1_000));
        let (mut sup, _log) = supervisor_with(spec("web"), ScriptedController::new(vec![]), clock);

        for _ in 0..5 {
            sup.on_observation("web", unhealthy_observation("down")).unwrap();
        }
        assert!(sup.state().services["web"].alerted);
        assert_eq!(sup.state().services["web"].consecutive_failures, 5);
    }

    #[test]
    fn recovery_clears_counters_but_preserves_restart_window() {
        let clock = Arc::new(ManualClock::new(1_000));
        let (mut sup, _log) = supervisor_with(
            spec("web"),
            ScriptedController::new(vec![(true, "ok".to_string())]),
            clock.clone(),
        );

        sup.on_observation("web", unhealthy_observation("down")).unwrap();
        sup.on_observation("web", unhealthy_observation("down")).unwrap();
        assert!(sup.state().services["web"].alerted);

        clock.advance(3);
        sup.on_restart_due("web").unwrap();
        assert_eq!(sup.state().services["web"].restart_count, 1);
        let window_start = sup.state().services["web"].restart_window_start;
        assert!(window_start.is_some());

        sup.on_observation("web", healthy_observation()).unwrap();
        let s = &sup.state().services["web"];
        assert_eq!(s.consecutive_failures, 0);
        assert!(!s.alerted);
        assert!(s.pending_restart_at.is_none());
        assert_eq!(s.restart_window_start, window_start);
        assert_eq!(s.restart_count, 1);
    }

    #[test]
    fn recovery_only_fires_after_a_real_outage() {
        let clock = Arc::new(ManualClock::new(1_000));
        let (mut sup, log) = supervisor_with(spec("web"), ScriptedController::new(vec![]), clock);

        sup.on_observation("web", healthy_observation()).unwrap();
        assert!(!log.lines().iter().any(|l| l.contains("RECOVERY")));
    }

    #[test]
    fn rate_limit_stops_attempts_at_max_restarts() {
        let clock = Arc::new(ManualClock::new(1_000));
        let mut s = spec("web");
        s.max_restarts = 2;
        let (mut sup, log) = supervisor_with(
            s,
            ScriptedController::new(vec![
                (false, "boom".to_string()),
                (false, "boom".to_string()),
            ]),
            clock,
        );

        sup.on_observation("web", unhealthy_observation("down")).unwrap();
        sup.on_observation("web", unhealthy_observation("down")).unwrap();

        sup.on_restart_due("web").unwrap();
        assert_eq!(sup.state().services["web"].restart_count, 1);
        sup.on_restart_due("web").unwrap();
        assert_eq!(sup.state().services["web"].restart_count, 2);

        sup.on_restart_due("web").unwrap();
        assert_eq!(sup.state().services["web"].restart_count, 2);
        assert!(sup.state().services["web"].pending_restart_at.is_none());
        assert!(log
            .lines()
            .iter()
            .any(|l| l.contains("exceeded maximum restart attempts")));
    }

    #[test]
    fn window_rolls_over_after_restart_window_elapses() {
        let clock = Arc::new(ManualClock::new(1_000));
        let mut s = spec("web");
        s.max_restarts = 1;
        s.restart_window = 60;
        let (mut sup, _log) = supervisor_with(
            s,
            ScriptedController::new(vec![(true, "ok".to_string())]),
            clock.clone(),
        );

        sup.on_observation("web", unhealthy_observation("down")).unwrap();
        sup.on_observation("web", unhealthy_observation("down")).unwrap();
        sup.on_restart_due("web").unwrap();
        assert_eq!(sup.state().services["web"].restart_count, 1);

        clock.advance(61);
        sup.on_restart_due("web").unwrap();
        assert_eq!(sup.state().services["web"].restart_count, 1);
    }

    #[test]
    fn status_does_not_mutate_counters() {
        use crate::types::ProbeMethod;

        struct FixedProber;
        impl Prober for FixedProber {
            fn probe(&self, _spec: &ServiceSpec) -> Observation {
                Observation {
                    running: true,
                    probe_method: ProbeMethod::TcpPort,
                    pid: Some(7),
                    cpu_percent: None,
                    memory_bytes: None,
                    uptime_seconds: None,
                    error_text: None,
                }
            }
        }

        let clock = Arc::new(ManualClock::new(1_000));
        let (mut sup, _log) = supervisor_with(spec("web"), ScriptedController::new(vec![]), clock);
        sup.on_observation("web", unhealthy_observation("down")).unwrap();
        let before = sup.state().services["web"].consecutive_failures;

        let statuses = sup.status(&FixedProber);
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0].consecutive_failures, before);
        assert_eq!(sup.state().services["web"].consecutive_failures, before);
    }
}
