//! Sandbox Module
//!
//! One isolated working copy and companion branch per task, reclaimable
//! individually or in bulk.
//!
//! ## Features
//!
//! - **SandboxProvider**: the seam the orchestrator drives (fakeable in tests)
//! - **WorktreeProvisioner**: git worktrees under `.codex-agent/worktrees/`
//! - **Containment**: every path is lexically normalised and must sit strictly
//!   inside the managed root before anything touches the filesystem

mod worktree;

pub use worktree::WorktreeProvisioner;

use crate::TeardownReport;
use codex_agent_foundation::{Error, Result};
use std::path::{Component, Path, PathBuf};

// ============================================================================
// Types
// ============================================================================

/// A provisioned sandbox
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxInfo {
    pub task_id: String,
    pub path: PathBuf,
    pub branch: String,
}

/// Result of removing one sandbox
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoveOutcome {
    /// False when there was nothing to remove
    pub removed: bool,
    /// Branch deletion failure; the worktree removal stands
    pub branch_error: Option<String>,
}

// ============================================================================
// SandboxProvider Trait
// ============================================================================

/// Task-scoped isolated working copies
pub trait SandboxProvider: Send + Sync {
    /// Deterministic sandbox path for a task
    fn path_for(&self, task_id: &str) -> PathBuf;

    /// Deterministic branch name for a task
    fn branch_for(&self, task_id: &str) -> String;

    /// Whether the sandbox directory exists
    fn exists(&self, task_id: &str) -> bool;

    /// Provision a sandbox; `AlreadyExists` if one is present
    fn create(&self, task_id: &str) -> Result<SandboxInfo>;

    /// Remove a sandbox; no-op when absent, `PathNotContained` when unsafe
    fn remove(&self, task_id: &str, delete_branch: bool, force: bool) -> Result<RemoveOutcome>;

    /// Change-set against the base revision
    fn diff(&self, task_id: &str) -> Result<String>;

    /// Tracked statistics plus an `Untracked files:` section
    fn diff_stat(&self, task_id: &str) -> Result<String>;

    /// Sandboxes that exist on disk under the managed root
    fn list_orphans(&self) -> Result<Vec<SandboxInfo>>;

    /// Branches under the managed prefix
    fn list_managed_branches(&self) -> Result<Vec<String>>;

    /// Remove everything discoverable; never aborts on a single failure
    fn remove_all(&self, delete_branches: bool, force: bool) -> TeardownReport;
}

// ============================================================================
// Containment
// ============================================================================

/// Resolve `.` and `..` without touching the filesystem
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// `path` must normalise to something strictly inside `root`
pub fn ensure_contained(path: &Path, root: &Path) -> Result<PathBuf> {
    let normalized = normalize_path(path);
    let root = normalize_path(root);
    if normalized != root && normalized.starts_with(&root) {
        Ok(normalized)
    } else {
        Err(Error::PathNotContained {
            path: normalized,
            root,
        })
    }
}
