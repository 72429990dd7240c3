use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// Severity of a log message written through a [`Logger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
    /// Reserved for failures that leave compensation incomplete.
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        };
        f.write_str(name)
    }
}

/// A leveled logging capability.
///
/// The engine only needs "write a message at a severity level"; anything
/// beyond that (formatting, filtering, output) belongs to the implementation.
pub trait Logger: Send + Sync {
    fn write(&self, severity: Severity, message: &str);
}

impl<L: Logger + ?Sized> Logger for Arc<L> {
    fn write(&self, severity: Severity, message: &str) {
        (**self).write(severity, message);
    }
}

/// [`Logger`] backed by the `tracing` crate.
///
/// `tracing` has no level above `error`, so [`Severity::Critical`] is
/// emitted as an error event carrying a `critical = true` field.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn write(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Debug => tracing::debug!("{message}"),
            Severity::Info => tracing::info!("{message}"),
            Severity::Warning => tracing::warn!("{message}"),
            Severity::Error => tracing::error!("{message}"),
            Severity::Critical => tracing::error!(critical = true, "{message}"),
        }
    }
}

/// [`Logger`] that keeps every record in memory.
///
/// Useful in tests, and for callers that want to inspect the log stream
/// after a run, e.g. to tell a cleanly compensated failure from a critical
/// one.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    records: Mutex<Vec<(Severity, String)>>,
}

impl MemoryLogger {
    /// Snapshot of all records written so far, in write order.
    #[must_use]
    pub fn records(&self) -> Vec<(Severity, String)> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether any record at `severity` contains `needle`.
    #[must_use]
    pub fn contains(&self, severity: Severity, needle: &str) -> bool {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|(s, message)| *s == severity && message.contains(needle))
    }
}

impl Logger for MemoryLogger {
    fn write(&self, severity: Severity, message: &str) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((severity, message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_displays_lowercase_names() {
        assert_eq!(Severity::Debug.to_string(), "debug");
        assert_eq!(Severity::Warning.to_string(), "warning");
        assert_eq!(Severity::Critical.to_string(), "critical");
    }

    #[test]
    fn severity_orders_by_escalation() {
        assert!(Severity::Debug < Severity::Info);
        assert!(Severity::Error < Severity::Critical);
    }

    #[test]
    fn memory_logger_records_in_write_order() {
        let logger = MemoryLogger::default();
        logger.write(Severity::Info, "first");
        logger.write(Severity::Error, "second");

        let records = logger.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], (Severity::Info, "first".to_string()));
        assert_eq!(records[1], (Severity::Error, "second".to_string()));
    }

    #[test]
    fn contains_matches_severity_and_substring() {
        let logger = MemoryLogger::default();
        logger.write(Severity::Critical, "panic handler failed: boom");

        assert!(logger.contains(Severity::Critical, "boom"));
        assert!(!logger.contains(Severity::Error, "boom"));
        assert!(!logger.contains(Severity::Critical, "quiet"));
    }

    #[test]
    fn arc_logger_writes_through() {
        let logger = Arc::new(MemoryLogger::default());
        let as_capability: &dyn Logger = &Arc::clone(&logger);
        as_capability.write(Severity::Debug, "shared");

        assert!(logger.contains(Severity::Debug, "shared"));
    }
}
