//! Contract for liveness/health probing (§4.1), implemented by `watchdog-probe`.

use crate::types::{Observation, ServiceSpec};

/// Given one service spec, returns a single liveness observation. Stateless;
/// impure with respect to the environment (process table, sockets, HTTP).
/// Never fails outright — every failure mode becomes an `Observation` with
/// `running = false` and an explanatory `error_text`.
pub trait Prober: Send + Sync {
    fn probe(&self, spec: &ServiceSpec) -> Observation;
}
