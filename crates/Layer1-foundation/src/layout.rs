//! Control directory layout
//!
//! Every durable file the orchestrator owns lives under `<repo>/.codex-agent/`:
//!
//! ```text
//! .codex-agent/
//!   config.json
//!   state.json
//!   worktrees/<taskId>/
//!   runs/<runId>/{summary.json,status.json}
//!   runs/<runId>/workers/<id>/{task.md,command.txt,logs.txt,diff.patch,diffstat.txt}
//! ```

use std::path::{Path, PathBuf};

/// Control directory name at the repository root
pub const CONTROL_DIR_NAME: &str = ".codex-agent";

/// Run state file name
pub const STATE_FILE: &str = "state.json";

/// Paths under the control directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlDir {
    root: PathBuf,
}

impl ControlDir {
    pub fn new(repo_root: &Path) -> Self {
        Self {
            root: repo_root.join(CONTROL_DIR_NAME),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn state_file(&self) -> PathBuf {
        self.root.join(STATE_FILE)
    }

    /// Managed sandbox root
    pub fn worktrees_dir(&self) -> PathBuf {
        self.root.join("worktrees")
    }

    pub fn runs_dir(&self) -> PathBuf {
        self.root.join("runs")
    }

    pub fn run_dir(&self, run_id: &str) -> PathBuf {
        self.runs_dir().join(run_id)
    }

    pub fn worker_dir(&self, run_id: &str, worker_id: &str) -> PathBuf {
        self.run_dir(run_id).join("workers").join(worker_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_paths() {
        let dir = ControlDir::new(Path::new("/repo"));
        assert_eq!(dir.root(), Path::new("/repo/.codex-agent"));
        assert_eq!(dir.state_file(), PathBuf::from("/repo/.codex-agent/state.json"));
        assert_eq!(
            dir.worktrees_dir(),
            PathBuf::from("/repo/.codex-agent/worktrees")
        );
        assert_eq!(
            dir.worker_dir("run-1", "t1"),
            PathBuf::from("/repo/.codex-agent/runs/run-1/workers/t1")
        );
    }
}
