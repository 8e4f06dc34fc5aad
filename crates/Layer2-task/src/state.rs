//! Worker state machine
//!
//! ```text
//! (none) --create ok-->    Running
//! (none) --create fails--> Failed    (terminal)
//! Running --stop-->        Stopped   (terminal)
//! ```
//!
//! A probe-triggered restart keeps the worker `Running`.

use serde::{Deserialize, Serialize};

/// Possible states of a worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerStatus {
    /// Being provisioned
    Starting,

    /// Agent launched in its session
    Running,

    /// Interrupted by the operator
    Stopped,

    /// Provisioning failed
    Failed,
}

impl WorkerStatus {
    /// Check if this is a terminal state (cannot transition further)
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkerStatus::Stopped | WorkerStatus::Failed)
    }

    /// Check if worker is currently running
    pub fn is_running(&self) -> bool {
        matches!(self, WorkerStatus::Running)
    }

    /// Whether `next` is a legal successor of this state
    pub fn can_transition_to(&self, next: WorkerStatus) -> bool {
        match self {
            WorkerStatus::Starting => matches!(next, WorkerStatus::Running | WorkerStatus::Failed),
            WorkerStatus::Running => matches!(next, WorkerStatus::Running | WorkerStatus::Stopped),
            WorkerStatus::Stopped | WorkerStatus::Failed => false,
        }
    }

    /// Get display name for the state
    pub fn display_name(&self) -> &'static str {
        match self {
            WorkerStatus::Starting => "starting",
            WorkerStatus::Running => "running",
            WorkerStatus::Stopped => "stopped",
            WorkerStatus::Failed => "failed",
        }
    }

    /// Get a symbol for the state
    pub fn symbol(&self) -> &'static str {
        match self {
            WorkerStatus::Starting => "◎",
            WorkerStatus::Running => "⟳",
            WorkerStatus::Stopped => "⊘",
            WorkerStatus::Failed => "✗",
        }
    }
}

impl std::fmt::Display for WorkerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
