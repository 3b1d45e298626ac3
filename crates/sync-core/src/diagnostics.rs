//! Diagnostics sink.
//!
//! Components never log through a global logger directly. Each one holds a
//! `Arc<dyn Diagnostics>` and reports through it, so the binary can forward
//! everything to `tracing` while tests capture events in memory and assert
//! on them. No component reads diagnostics back to make decisions.

use serde::Serialize;
use std::fmt;
use std::sync::Mutex;

/// Event severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Critical => "critical",
        };
        f.write_str(s)
    }
}

/// A single diagnostic event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticEvent {
    pub severity: Severity,
    /// Emitting component, e.g. "inspector" or "transfer"
    pub component: &'static str,
    pub message: String,
}

/// Sink for diagnostic events.
pub trait Diagnostics: Send + Sync {
    fn emit(&self, event: DiagnosticEvent);

    fn debug(&self, component: &'static str, message: String) {
        self.emit(DiagnosticEvent {
            severity: Severity::Debug,
            component,
            message,
        });
    }

    fn info(&self, component: &'static str, message: String) {
        self.emit(DiagnosticEvent {
            severity: Severity::Info,
            component,
            message,
        });
    }

    fn warning(&self, component: &'static str, message: String) {
        self.emit(DiagnosticEvent {
            severity: Severity::Warning,
            component,
            message,
        });
    }

    fn error(&self, component: &'static str, message: String) {
        self.emit(DiagnosticEvent {
            severity: Severity::Error,
            component,
            message,
        });
    }

    fn critical(&self, component: &'static str, message: String) {
        self.emit(DiagnosticEvent {
            severity: Severity::Critical,
            component,
            message,
        });
    }
}

/// Forwards events to the `tracing` subscriber installed by the binary.
///
/// `critical` has no `tracing` level of its own; it is logged at error level
/// with a `critical = true` field.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn emit(&self, event: DiagnosticEvent) {
        let DiagnosticEvent {
            severity,
            component,
            message,
        } = event;
        match severity {
            Severity::Debug => tracing::debug!(component, "{message}"),
            Severity::Info => tracing::info!(component, "{message}"),
            Severity::Warning => tracing::warn!(component, "{message}"),
            Severity::Error => tracing::error!(component, "{message}"),
            Severity::Critical => tracing::error!(component, critical = true, "{message}"),
        }
    }
}

/// Keeps every event in memory. Used by tests.
#[derive(Debug, Default)]
pub struct MemoryDiagnostics {
    events: Mutex<Vec<DiagnosticEvent>>,
}

impl MemoryDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events captured so far.
    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Number of events at exactly `severity`.
    pub fn count(&self, severity: Severity) -> usize {
        self.events()
            .iter()
            .filter(|e| e.severity == severity)
            .count()
    }

    /// Whether an event at `severity` has a message containing `needle`.
    pub fn contains(&self, severity: Severity, needle: &str) -> bool {
        self.events()
            .iter()
            .any(|e| e.severity == severity && e.message.contains(needle))
    }
}

impl Diagnostics for MemoryDiagnostics {
    fn emit(&self, event: DiagnosticEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_memory_diagnostics_captures_events() {
        let memory = Arc::new(MemoryDiagnostics::new());
        let sink: Arc<dyn Diagnostics> = memory.clone();

        sink.info("test", "hello".to_string());
        sink.warning("test", "careful".to_string());
        sink.warning("test", "careful again".to_string());

        assert_eq!(memory.count(Severity::Warning), 2);
        assert!(memory.contains(Severity::Info, "hello"));
        assert!(!memory.contains(Severity::Error, "hello"));
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Debug < Severity::Info);
        assert!(Severity::Error < Severity::Critical);
        assert_eq!(Severity::Warning.to_string(), "warning");
    }

    #[test]
    fn test_tracing_diagnostics_accepts_all_levels() {
        let sink = TracingDiagnostics;
        for severity in [
            Severity::Debug,
            Severity::Info,
            Severity::Warning,
            Severity::Error,
            Severity::Critical,
        ] {
            sink.emit(DiagnosticEvent {
                severity,
                component: "test",
                message: "no subscriber installed".to_string(),
            });
        }
    }
}
