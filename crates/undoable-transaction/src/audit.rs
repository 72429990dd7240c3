use std::time::Instant;

/// State of an attempted step.
///
/// Forward phase: `CommitAttempted` then `Committed` or `CommitFailed`.
/// Once any commit fails, popped steps move through `RollbackAttempted`
/// into one of the unwind outcomes. Steps whose commit is absent are never
/// attempted and never appear in the audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum StepStatus {
    CommitAttempted,
    Committed,
    CommitFailed,
    RollbackAttempted,
    RolledBack,
    /// Rollback failed with no panic handler to escalate to.
    RollbackFailed,
    /// Rollback failed and the panic handler completed.
    PanicHandled,
    /// The panic handler itself failed; the unwind was aborted here.
    PanicCritical,
}

/// Record of one attempted step.
#[derive(Debug)]
pub struct StepRecord {
    /// Position in the canonical step sequence.
    pub index: usize,
    /// Label, or a positional fallback.
    pub name: String,
    /// Current status.
    pub status: StepStatus,
    /// When the commit was attempted.
    pub started_at: Instant,
    /// When the step reached its latest settled status.
    pub completed_at: Option<Instant>,
}

/// Audit of what one run did, step by step.
///
/// Created fresh per run and returned by
/// [`Transaction::run_with_audit`](crate::Transaction::run_with_audit).
/// The boolean contract does not distinguish a cleanly compensated failure
/// from a critical one; this is where callers look when they need to.
#[derive(Debug, Default)]
pub struct RunAudit {
    records: Vec<StepRecord>,
}

impl RunAudit {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_attempt(&mut self, index: usize, name: &str) {
        self.records.push(StepRecord {
            index,
            name: name.to_string(),
            status: StepStatus::CommitAttempted,
            started_at: Instant::now(),
            completed_at: None,
        });
    }

    pub(crate) fn commit_succeeded(&mut self) {
        self.settle_last(StepStatus::Committed);
    }

    pub(crate) fn commit_failed(&mut self) {
        self.settle_last(StepStatus::CommitFailed);
    }

    pub(crate) fn rollback_started(&mut self, index: usize) {
        if let Some(record) = self.record_mut(index) {
            record.status = StepStatus::RollbackAttempted;
        }
    }

    pub(crate) fn rolled_back(&mut self, index: usize) {
        self.settle(index, StepStatus::RolledBack);
    }

    pub(crate) fn rollback_failed(&mut self, index: usize) {
        self.settle(index, StepStatus::RollbackFailed);
    }

    pub(crate) fn panic_handled(&mut self, index: usize) {
        self.settle(index, StepStatus::PanicHandled);
    }

    pub(crate) fn panic_critical(&mut self, index: usize) {
        self.settle(index, StepStatus::PanicCritical);
    }

    fn settle_last(&mut self, status: StepStatus) {
        if let Some(record) = self.records.last_mut() {
            record.status = status;
            record.completed_at = Some(Instant::now());
        }
    }

    fn settle(&mut self, index: usize, status: StepStatus) {
        if let Some(record) = self.record_mut(index) {
            record.status = status;
            record.completed_at = Some(Instant::now());
        }
    }

    fn record_mut(&mut self, index: usize) -> Option<&mut StepRecord> {
        self.records.iter_mut().find(|r| r.index == index)
    }

    /// All records, in attempt order.
    #[must_use]
    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    /// Whether the unwind was aborted by a failing panic handler.
    #[must_use]
    pub fn has_critical(&self) -> bool {
        self.records
            .iter()
            .any(|r| r.status == StepStatus::PanicCritical)
    }

    /// One line per attempted step, for display.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        for record in &self.records {
            let glyph = match record.status {
                StepStatus::CommitAttempted | StepStatus::RollbackAttempted => "…",
                StepStatus::Committed => "✓",
                StepStatus::CommitFailed => "✗",
                StepStatus::RolledBack => "↩",
                StepStatus::RollbackFailed => "⚠",
                StepStatus::PanicHandled => "!",
                StepStatus::PanicCritical => "‼",
            };
            lines.push(format!("{glyph} {}", record.name));
        }
        lines.join("\n")
    }
}
