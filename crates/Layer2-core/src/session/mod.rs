//! Session Module
//!
//! One addressable, interactive terminal session per task.
//!
//! ## Features
//!
//! - **SessionAdapter**: the seam the orchestrator drives (fakeable in tests)
//! - **TmuxAdapter**: detached tmux sessions, literal send-keys, capture-pane
//! - **Sanitizer**: ANSI-free, control-free text for display and probing

mod sanitize;
mod tmux;

pub use sanitize::sanitize_output;
pub use tmux::TmuxAdapter;

use crate::TeardownReport;
use codex_agent_foundation::Result;
use std::path::Path;

// ============================================================================
// SessionAdapter Trait
// ============================================================================

/// Task-scoped terminal sessions
pub trait SessionAdapter: Send + Sync {
    /// Deterministic session name for a task
    fn session_name(&self, task_id: &str) -> String;

    fn exists(&self, task_id: &str) -> bool;

    /// Detached session rooted at `cwd`; `SessionAlreadyExists` if taken
    fn create(&self, task_id: &str, cwd: &Path) -> Result<String>;

    /// Literal text followed by Enter; never reinterpreted by a shell
    fn send_text(&self, task_id: &str, text: &str) -> Result<()>;

    /// Interrupt keystroke (Ctrl-C)
    fn interrupt(&self, task_id: &str) -> Result<()>;

    /// Visible buffer, bounded to the last `lines` lines when given
    fn capture(&self, task_id: &str, lines: Option<u32>) -> Result<String>;

    /// No-op when the session is gone
    fn kill(&self, task_id: &str) -> Result<()>;

    /// Sessions created for this repository
    fn list_managed(&self) -> Result<Vec<String>>;

    /// Kill everything discoverable; never aborts on a single failure
    fn kill_all(&self) -> TeardownReport;
}

// ============================================================================
// Naming
// ============================================================================

/// Replace characters tmux treats specially in targets
pub fn session_safe(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '.' | ':' => '_',
            c if c.is_whitespace() => '_',
            c => c,
        })
        .collect()
}

/// `<prefix>-<repo>-`
pub fn session_prefix(prefix: &str, repo_name: &str) -> String {
    format!("{}-{}-", prefix, session_safe(repo_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_safe() {
        assert_eq!(session_safe("my.repo:v2 beta"), "my_repo_v2_beta");
        assert_eq!(session_safe("plain-name"), "plain-name");
    }

    #[test]
    fn test_session_prefix() {
        assert_eq!(session_prefix("codex", "web.app"), "codex-web_app-");
    }
}
