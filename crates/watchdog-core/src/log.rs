//! Injectable logging sink so the supervisor and scheduler can be tested
//! without touching process-wide logging state (§9 "Global logger").

use std::sync::Mutex;

/// Severity-leveled sink consumed by the supervisor and scheduler.
pub trait LogSink: Send + Sync {
    fn debug(&self, message: &str);
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

/// Discards everything. Used where a caller needs a sink but does not care
/// about its output.
#[derive(Debug, Default)]
pub struct NullLogSink;

impl LogSink for NullLogSink {
    fn debug(&self, _message: &str) {}
    fn info(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
}

/// Collects every logged line, in order, so tests can assert on output
/// without capturing stdout.
#[derive(Debug, Default)]
pub struct RecordingLogSink {
    lines: Mutex<Vec<String>>,
}

impl RecordingLogSink {
    pub fn new() -> Self {
        RecordingLogSink {
            lines: Mutex::new(Vec::new()),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    fn push(&self, level: &str, message: &str) {
        self.lines.lock().unwrap().push(format!("{level} {message}"));
    }
}

impl LogSink for RecordingLogSink {
    fn debug(&self, message: &str) {
        self.push("DEBUG", message);
    }
    fn info(&self, message: &str) {
        self.push("INFO", message);
    }
    fn warn(&self, message: &str) {
        self.push("WARN", message);
    }
    fn error(&self, message: &str) {
        self.push("ERROR", message);
    }
}
