//! Error types for codex-agent
//!
//! Every failure the orchestrator can surface lives here, grouped by the
//! category an operator has to react to (see [`ErrorKind`]).

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse failure category, used for propagation policy and exit reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad manifest, task or argument; raised before any side effect
    Validation,
    /// Sandbox or session already exists
    ResourceConflict,
    /// Referenced worker, sandbox, session or run is absent
    ResourceNotFound,
    /// git or tmux returned a failure
    ExternalTool,
    /// Containment check failed; never bypassed
    SafetyViolation,
    /// Storage, configuration and everything else
    Internal,
}

/// codex-agent error type
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Manifest / task validation
    // ========================================================================
    #[error("Invalid manifest {}: {reason}", .path.display())]
    ManifestInvalid { path: PathBuf, reason: String },

    #[error("Invalid task at index {index}: missing required \"{field}\" field (manifest: {})", .manifest.display())]
    TaskInvalid {
        index: usize,
        field: &'static str,
        manifest: PathBuf,
    },

    #[error("Invalid task ID {id:?} (task index {index}): '.', ':', '/', '\\' and whitespace are not allowed")]
    InvalidTaskId { id: String, index: usize },

    #[error("Duplicate task ID: {id} (task index {index})")]
    DuplicateTaskId { id: String, index: usize },

    #[error("Task file not found for task {id} (index {index}): resolved path {}, original path {original}", .resolved.display())]
    TaskFileNotFound {
        id: String,
        index: usize,
        resolved: PathBuf,
        original: String,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Worker {id} is {status}; no further transitions are allowed")]
    WorkerNotActive { id: String, status: String },

    // ========================================================================
    // Resource conflicts
    // ========================================================================
    #[error("Sandbox already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Session already exists: {0}")]
    SessionAlreadyExists(String),

    // ========================================================================
    // Missing resources
    // ========================================================================
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Sandbox not found: {}", .0.display())]
    SandboxNotFound(PathBuf),

    #[error("Worker not found: {0}")]
    WorkerNotFound(String),

    #[error("No active run found (run `codex-agent start` first)")]
    NoActiveRun,

    #[error("Not a git repository: {}", .0.display())]
    NotARepository(PathBuf),

    // ========================================================================
    // External tools
    // ========================================================================
    #[error("{tool} {args} failed: {message}")]
    ToolFailed {
        tool: &'static str,
        args: String,
        message: String,
    },

    // ========================================================================
    // Safety
    // ========================================================================
    #[error("Path {} is not contained in {}", .path.display(), .root.display())]
    PathNotContained { path: PathBuf, root: PathBuf },

    // ========================================================================
    // Configuration / storage
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    // ========================================================================
    // External error conversions
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ManifestInvalid { .. }
            | Error::TaskInvalid { .. }
            | Error::InvalidTaskId { .. }
            | Error::DuplicateTaskId { .. }
            | Error::TaskFileNotFound { .. }
            | Error::InvalidArgument(_)
            | Error::WorkerNotActive { .. } => ErrorKind::Validation,
            Error::AlreadyExists(_) | Error::SessionAlreadyExists(_) => {
                ErrorKind::ResourceConflict
            }
            Error::SessionNotFound(_)
            | Error::SandboxNotFound(_)
            | Error::WorkerNotFound(_)
            | Error::NoActiveRun
            | Error::NotARepository(_) => ErrorKind::ResourceNotFound,
            Error::ToolFailed { .. } => ErrorKind::ExternalTool,
            Error::PathNotContained { .. } => ErrorKind::SafetyViolation,
            Error::Config(_) | Error::Storage(_) | Error::Io(_) => ErrorKind::Internal,
        }
    }

    /// Containment failures are always fatal
    pub fn is_safety_violation(&self) -> bool {
        self.kind() == ErrorKind::SafetyViolation
    }

    /// Sandbox/session already present
    pub fn is_conflict(&self) -> bool {
        self.kind() == ErrorKind::ResourceConflict
    }

    /// Referenced resource absent
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::ResourceNotFound
    }

    /// External tool failure helper
    pub fn tool(tool: &'static str, args: &[&str], message: impl Into<String>) -> Self {
        Error::ToolFailed {
            tool,
            args: args.join(" "),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let err = Error::DuplicateTaskId {
            id: "t1".to_string(),
            index: 1,
        };
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = Error::InvalidTaskId {
            id: "a.b".to_string(),
            index: 0,
        };
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("\"a.b\""));

        let err = Error::PathNotContained {
            path: PathBuf::from("/tmp/x"),
            root: PathBuf::from("/repo/.codex-agent/worktrees"),
        };
        assert!(err.is_safety_violation());

        assert!(Error::SessionAlreadyExists("s".to_string()).is_conflict());
        assert!(Error::SessionNotFound("s".to_string()).is_not_found());
    }

    #[test]
    fn test_tool_error_preserves_diagnostic() {
        let err = Error::tool("git", &["worktree", "add"], "fatal: invalid reference: HEAD");
        let message = err.to_string();
        assert!(message.contains("git worktree add"));
        assert!(message.contains("fatal: invalid reference: HEAD"));
        assert_eq!(err.kind(), ErrorKind::ExternalTool);
    }

    #[test]
    fn test_task_file_not_found_is_actionable() {
        let err = Error::TaskFileNotFound {
            id: "t2".to_string(),
            index: 3,
            resolved: PathBuf::from("/repo/tasks/missing.md"),
            original: "tasks/missing.md".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("t2"));
        assert!(message.contains("index 3"));
        assert!(message.contains("/repo/tasks/missing.md"));
    }
}
