//! Report sink implementations.

use std::sync::Mutex;
use tracing::{error, info, warn};
use vfsearch_core::{ReportSink, Severity};

/// Report sink forwarding to `tracing`.
pub struct LogReport;

impl ReportSink for LogReport {
    fn println(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Note => info!("{message}"),
            Severity::Warn => warn!("{message}"),
            Severity::Error => error!("{message}"),
        }
    }
}

/// Report sink capturing messages for assertions in tests.
#[derive(Default)]
pub struct CapturingReport {
    messages: Mutex<Vec<(Severity, String)>>,
}

impl CapturingReport {
    /// Create an empty capturing sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all captured messages.
    pub fn messages(&self) -> Vec<(Severity, String)> {
        self.messages.lock().map(|m| m.clone()).unwrap_or_default()
    }

    /// Number of messages at the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.messages()
            .iter()
            .filter(|(s, _)| *s == severity)
            .count()
    }

    /// Whether any captured message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.messages().iter().any(|(_, m)| m.contains(needle))
    }
}

impl ReportSink for CapturingReport {
    fn println(&self, message: &str, severity: Severity) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push((severity, message.to_string()));
        }
    }
}
