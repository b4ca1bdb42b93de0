use serde::{Deserialize, Serialize};
use std::fmt;

/// The execution substrate a window scan runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScanPath {
    Host,
    Accelerator,
}

impl ScanPath {
    /// Returns the other execution path.
    pub fn opposite(&self) -> Self {
        match self {
            ScanPath::Host => ScanPath::Accelerator,
            ScanPath::Accelerator => ScanPath::Host,
        }
    }
}

impl fmt::Display for ScanPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanPath::Host => write!(f, "CPU"),
            ScanPath::Accelerator => write!(f, "GPU"),
        }
    }
}

/// Lifecycle state of a single run task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Constructed, not yet executed.
    Pending,
    /// Results computed and held in memory, output not yet written.
    Computed,
    /// New rows were appended (or a fresh file written).
    Written,
    /// The prior output already covered every admissible day.
    UpToDate,
    /// The series is not longer than the window; nothing to do.
    Skipped,
    /// The stop signal was observed.
    Cancelled,
    /// Loading or scanning failed; no results.
    Failed,
    /// Results were computed but could not be written.
    PersistFailed,
}

impl TaskStatus {
    /// True once the task can make no further progress.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskStatus::Pending | TaskStatus::Computed)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, TaskStatus::Failed | TaskStatus::PersistFailed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Computed => "computed",
            TaskStatus::Written => "written",
            TaskStatus::UpToDate => "up to date",
            TaskStatus::Skipped => "skipped",
            TaskStatus::Cancelled => "cancelled",
            TaskStatus::Failed => "failed",
            TaskStatus::PersistFailed => "failed to persist",
        };
        f.write_str(label)
    }
}
