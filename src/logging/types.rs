//! Core logging types: phase entries, status, and the [`Log`] trait.

/// Phase execution result for summary reporting.
#[derive(Debug, Clone)]
pub struct PhaseEntry {
    /// Human-readable phase name.
    pub name: String,
    /// Final status of the phase.
    pub status: PhaseStatus,
    /// Optional detail message (e.g., skip reason or error description).
    pub message: Option<String>,
}

/// Status of a completed phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseStatus {
    /// Phase completed successfully.
    Ok,
    /// Phase had nothing declared and made no calls.
    NotApplicable,
    /// Phase was skipped (declined confirmation, halted run, filtered out).
    Skipped,
    /// Phase ran in dry-run mode; no changes were applied.
    DryRun,
    /// Phase encountered an error and could not complete.
    Failed,
}

/// Abstraction over logging backends.
///
/// Phase and resource code log through this trait so tests can swap in an
/// isolated [`Logger`](super::logger::Logger) without touching the global
/// subscriber.
pub trait Log: Send + Sync {
    /// Log a stage header (one per phase).
    fn stage(&self, msg: &str);
    /// Log a single per-item progress line.
    fn note(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (suppressed on console unless verbose).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
    /// Record a phase result for the summary.
    fn record_phase(&self, name: &str, status: PhaseStatus, message: Option<&str>);
}
