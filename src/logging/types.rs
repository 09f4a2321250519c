//! Core logging types: per-group entries, status, and the [`Log`] trait.

/// Per-group outcome recorded for the end-of-run summary.
#[derive(Debug, Clone)]
pub struct GroupEntry {
    /// Group name.
    pub name: String,
    /// Final status of the operation on this group.
    pub status: GroupStatus,
    /// Optional detail message (e.g., error description).
    pub message: Option<String>,
}

/// Status of a group after a command has run over it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupStatus {
    /// The operation completed.
    Ok,
    /// The selected mapping list was empty; nothing was touched.
    NothingToDo,
    /// The operation completed and found drift or missing binaries.
    Differs,
    /// The operation ran in dry-run mode; no changes were applied.
    DryRun,
    /// The operation failed and the rest of the group was abandoned.
    Failed,
}

/// Abstraction over logging backends.
///
/// [`Logger`](super::logger::Logger) is the production implementation;
/// group operations only see this trait so tests can swap in their own.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
    /// Emit diff text verbatim (no indentation or decoration on the console).
    fn diff(&self, text: &str);
    /// Record a group result for the summary.
    fn record_group(&self, name: &str, status: GroupStatus, message: Option<&str>);
}
