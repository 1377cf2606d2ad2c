//! Error conditions that are not themselves I/O failures.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("unknown service `{0}`")]
    UnknownService(String),
}
