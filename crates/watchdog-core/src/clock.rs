//! Injectable time source for the supervisor and scheduler (§9 "Time source").

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// A source of the current time, expressed as whole seconds since the Unix epoch.
pub trait Clock: Send + Sync {
    fn now_epoch_secs(&self) -> u64;
}

/// Production clock backed by the system wall clock.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_secs(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

/// Test clock that only advances when told to, so scenarios involving
/// restart delays and window rollovers don't have to sleep.
#[derive(Debug)]
pub struct ManualClock {
    secs: AtomicU64,
}

impl ManualClock {
    pub fn new(start_epoch_secs: u64) -> Self {
        ManualClock {
            secs: AtomicU64::new(start_epoch_secs),
        }
    }

    pub fn advance(&self, delta_secs: u64) {
        self.secs.fetch_add(delta_secs, Ordering::SeqCst);
    }

    pub fn set(&self, epoch_secs: u64) {
        self.secs.store(epoch_secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_epoch_secs(&self) -> u64 {
        self.secs.load(Ordering::SeqCst)
    }
}
