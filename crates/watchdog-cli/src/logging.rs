//! Wires `watchdog_core::LogSink` to the `tracing` crate, and configures
//! the process-wide subscriber the way `cli.py::_setup_logging` configures
//! Python's `logging` module: a console layer plus an optional file layer
//! at the same level.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use watchdog_core::LogSink;

/// Forwards `Supervisor`/`Scheduler` log calls to `tracing` at matching
/// levels, tagged under the `watchdogd` target.
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn debug(&self, message: &str) {
        tracing::debug!(target: "watchdogd", "{message}");
    }

    fn info(&self, message: &str) {
        tracing::info!(target: "watchdogd", "{message}");
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "watchdogd", "{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "watchdogd", "{message}");
    }
}

fn filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_new(log_level.to_lowercase()).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Opens `log_file` for append-only writing via a non-blocking file
/// appender, creating its parent directory if needed. `None` if the path
/// has no usable parent/file-name component.
fn file_writer(log_file: &str) -> Option<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    let path = Path::new(log_file);
    let parent = path.parent()?;
    let file_name = path.file_name()?;
    if !parent.as_os_str().is_empty() {
        std::fs::create_dir_all(parent).ok()?;
    }
    let file_appender = tracing_appender::rolling::never(parent, file_name);
    Some(tracing_appender::non_blocking(file_appender))
}

/// Installs the global subscriber: a console layer, plus a file layer at
/// the same level unless `dry_run` is set or the log file path can't be
/// opened. The two layers are composed onto one `Registry` rather than
/// bound to a single `fmt()` subscriber, so logs reach both sinks at once.
/// Returns the file-appender guard, which must be kept alive for the
/// process lifetime or buffered lines are lost on exit.
pub fn init_logging(log_level: &str, log_file: &str, dry_run: bool) -> Option<WorkerGuard> {
    let console_layer = tracing_subscriber::fmt::layer()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(false);

    if dry_run {
        tracing_subscriber::registry()
            .with(filter(log_level))
            .with(console_layer)
            .init();
        return None;
    }

    match file_writer(log_file) {
        Some((non_blocking, guard)) => {
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
                .with_target(false);
            tracing_subscriber::registry()
                .with(filter(log_level))
                .with(console_layer)
                .with(file_layer)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter(log_level))
                .with(console_layer)
                .init();
            None
        }
    }
}
