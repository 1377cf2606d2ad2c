//! Ticks at a fixed 1-second cadence; for each enabled service decides
//! whether to fire a pending restart, skip, or probe, then persists the
//! full state snapshot (§4.4).

use crate::clock::Clock;
use crate::log::LogSink;
use crate::probe::Prober;
use crate::state_store::StateStore;
use crate::supervisor::Supervisor;
use crate::types::ServiceStatus;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Drives a `Supervisor` at a fixed cadence until told to stop.
pub struct Scheduler {
    supervisor: Supervisor,
    prober: Box<dyn Prober>,
    store: StateStore,
    clock: Arc<dyn Clock>,
    log: Arc<dyn LogSink>,
}

impl Scheduler {
    pub fn new(
        supervisor: Supervisor,
        prober: Box<dyn Prober>,
        store: StateStore,
        clock: Arc<dyn Clock>,
        log: Arc<dyn LogSink>,
    ) -> Self {
        Scheduler {
            supervisor,
            prober,
            store,
            clock,
            log,
        }
    }

    pub fn supervisor(&self) -> &Supervisor {
        &self.supervisor
    }

    /// Runs the loop at 1-second cadence until `running` is cleared. The
    /// signal is only checked between ticks; an in-flight probe or restart
    /// is allowed to finish (§5 "Cancellation"). Every step inside a tick —
    /// probing, controller execution, state persistence — blocks the
    /// calling thread by design (§5 "Suspension / blocking points"), so the
    /// loop itself is plain synchronous code rather than an async task.
    pub fn run(&mut self, running: Arc<AtomicBool>) {
        while running.load(Ordering::SeqCst) {
            self.tick();
            thread::sleep(TICK_INTERVAL);
        }
    }

    /// Walks every enabled service once, in configured order, then persists
    /// the full snapshot. A persistence failure is logged and does not stop
    /// the loop (§7 "Persistence errors").
    pub fn tick(&mut self) {
        let names: Vec<String> = self
            .supervisor
            .specs()
            .filter(|s| s.enabled)
            .map(|s| s.name.clone())
            .collect();
        for name in names {
            self.tick_one(&name);
        }
        if let Err(e) = self.store.save(self.supervisor.state()) {
            self.log.warn(&format!("failed to persist state: {e}"));
        }
    }

    fn tick_one(&mut self, name: &str) {
        let now = self.clock.now_epoch_secs();
        let spec = match self.supervisor.spec(name) {
            Some(spec) => spec.clone(),
            None => return,
        };

        let pending = self
            .supervisor
            .state()
            .services
            .get(name)
            .and_then(|s| s.pending_restart_at);
        if let Some(pending_at) = pending {
            if now >= pending_at {
                if let Err(e) = self.supervisor.on_restart_due(name) {
                    self.log.error(&format!("restart-due trigger failed for {name}: {e}"));
                }
                return;
            }
        }

        let last_check = self
            .supervisor
            .state()
            .services
            .get(name)
            .and_then(|s| s.last_check);
        if let Some(last) = last_check {
            if now.saturating_sub(last) < spec.check_interval {
                return;
            }
        }

        let observation = self.prober.probe(&spec);
        if let Err(e) = self.supervisor.on_observation(name, observation) {
            self.log.error(&format!("observation handling failed for {name}: {e}"));
        }
    }

    /// In-process status snapshot; does not mutate counters (§6).
    pub fn status(&self) -> Vec<ServiceStatus> {
        self.supervisor.status(self.prober.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::controller::Controller;
    use crate::log::NullLogSink;
    use crate::notify::{Event, NotificationSink};
    use crate::types::{Observation, ProbeMethod, ServiceSpec, WatchdogState};
    use std::collections::BTreeMap;
    use std::sync::atomic::AtomicU32;

    struct CountingProber {
        calls: Arc<AtomicU32>,
        running: bool,
    }

    impl Prober for CountingProber {
        fn probe(&self, _spec: &ServiceSpec) -> Observation {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Observation {
                running: self.running,
                probe_method: ProbeMethod::TcpPort,
                pid: None,
                cpu_percent: None,
                memory_bytes: None,
                uptime_seconds: None,
                error_text: if self.running {
                    None
                } else {
                    Some("refused".to_string())
                },
            }
        }
    }

    struct NoopController;
    impl Controller for NoopController {
        fn start(&self, _spec: &ServiceSpec) -> (bool, String) {
            (true, String::new())
        }
        fn stop(&self, _spec: &ServiceSpec) -> (bool, String) {
            (true, String::new())
        }
        fn restart(&self, _spec: &ServiceSpec) -> (bool, String) {
            (true, "restarted".to_string())
        }
    }

    struct NoopSink;
    impl NotificationSink for NoopSink {
        fn name(&self) -> &str {
            "noop"
        }
        fn should_deliver(&self, _event: &Event) -> bool {
            false
        }
        fn deliver(&self, _event: &Event) -> (bool, String) {
            (true, String::new())
        }
    }

    fn spec(check_interval: u64) -> ServiceSpec {
        ServiceSpec {
            name: "web".to_string(),
            process_name: None,
            pid_file_path: None,
            tcp_port: Some(9),
            health_url: None,
            restart_cmd: Some("true".to_string()),
            start_cmd: None,
            stop_cmd: None,
            working_dir: None,
            env: BTreeMap::new(),
            check_interval,
            failure_threshold: 2,
            restart_delay: 3,
            max_restarts: 3,
            restart_window: 60,
            health_timeout: 10,
            enabled: true,
        }
    }

    #[test]
    fn skips_probe_before_check_interval_elapses() {
        let clock = Arc::new(ManualClock::new(1_000));
        let calls = Arc::new(AtomicU32::new(0));
        let prober = CountingProber {
            calls: calls.clone(),
            running: true,
        };
        let tmp = tempfile::tempdir().unwrap();
        let sup = Supervisor::new(
            vec![spec(30)],
            WatchdogState::new(1_000),
            Box::new(NoopController),
            vec![Box::new(NoopSink)],
            clock.clone(),
            Arc::new(NullLogSink),
        );
        let mut scheduler = Scheduler::new(
            sup,
            Box::new(prober),
            StateStore::new(tmp.path().join("state.toml")),
            clock.clone(),
            Arc::new(NullLogSink),
        );

        scheduler.tick();
        clock.advance(1);
        scheduler.tick();

        // check_interval=30s, only the first tick should have probed.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn restart_due_skips_probing_that_tick() {
        let clock = Arc::new(ManualClock::new(1_000));
        let tmp = tempfile::tempdir().unwrap();
        let mut state = WatchdogState::new(1_000);
        state.service_mut("web").pending_restart_at = Some(1_000);
        let sup = Supervisor::new(
            vec![spec(1)],
            state,
            Box::new(NoopController),
            vec![Box::new(NoopSink)],
            clock.clone(),
            Arc::new(NullLogSink),
        );
        let mut scheduler = Scheduler::new(
            sup,
            Box::new(CountingProber {
                calls: Arc::new(AtomicU32::new(0)),
                running: true,
            }),
            StateStore::new(tmp.path().join("state.toml")),
            clock,
            Arc::new(NullLogSink),
        );

        scheduler.tick();
        assert_eq!(scheduler.supervisor().state().services["web"].restart_count, 1);
        assert!(scheduler.supervisor().state().services["web"]
            .pending_restart_at
            .is_none());
    }

    #[test]
    fn tick_persists_state_to_disk() {
        let clock = Arc::new(ManualClock::new(1_000));
        let tmp = tempfile::tempdir().unwrap();
        let state_path = tmp.path().join("state.toml");
        let sup = Supervisor::new(
            vec![spec(1)],
            WatchdogState::new(1_000),
            Box::new(NoopController),
            vec![Box::new(NoopSink)],
            clock.clone(),
            Arc::new(NullLogSink),
        );
        let mut scheduler = Scheduler::new(
            sup,
            Box::new(CountingProber {
                calls: Arc::new(AtomicU32::new(0)),
                running: true,
            }),
            StateStore::new(state_path.clone()),
            clock,
            Arc::new(NullLogSink),
        );

        scheduler.tick();
        assert!(state_path.exists());
    }
}
