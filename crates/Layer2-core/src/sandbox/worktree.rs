//! Git worktree sandboxes

use super::{ensure_contained, RemoveOutcome, SandboxInfo, SandboxProvider};
use crate::git::{GitOps, Repository};
use crate::TeardownReport;
use codex_agent_foundation::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Sandboxes as linked worktrees of the repository
pub struct WorktreeProvisioner {
    git: GitOps,
    root: PathBuf,
    branch_prefix: String,
}

impl WorktreeProvisioner {
    pub fn new(repo: &Repository, branch_prefix: impl Into<String>) -> Self {
        Self {
            git: repo.git(),
            root: repo.control().worktrees_dir(),
            branch_prefix: branch_prefix.into(),
        }
    }

    /// Managed sandbox root
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn contained_path(&self, task_id: &str) -> Result<PathBuf> {
        ensure_contained(&self.root.join(task_id), &self.root)
    }

    fn is_managed(&self, path: &Path) -> bool {
        // git reports canonical paths; the root may sit behind a symlink
        let canonical_root = fs::canonicalize(&self.root).unwrap_or_else(|_| self.root.clone());
        [&self.root, &canonical_root]
            .iter()
            .any(|root| path != root.as_path() && path.starts_with(root))
    }

    fn existing_path(&self, task_id: &str) -> Result<PathBuf> {
        let path = self.contained_path(task_id)?;
        if !path.exists() {
            return Err(Error::SandboxNotFound(path));
        }
        Ok(path)
    }
}

impl SandboxProvider for WorktreeProvisioner {
    fn path_for(&self, task_id: &str) -> PathBuf {
        self.root.join(task_id)
    }

    fn branch_for(&self, task_id: &str) -> String {
        format!("{}/{}", self.branch_prefix, task_id)
    }

    fn exists(&self, task_id: &str) -> bool {
        self.contained_path(task_id)
            .map(|p| p.exists())
            .unwrap_or(false)
    }

    fn create(&self, task_id: &str) -> Result<SandboxInfo> {
        let path = self.contained_path(task_id)?;
        if path.exists() {
            return Err(Error::AlreadyExists(path));
        }

        fs::create_dir_all(&self.root)?;
        self.git.worktree_prune()?;

        let branch = self.branch_for(task_id);
        if self.git.branch_exists(&branch) {
            info!(branch = %branch, "deleting leftover branch from a previous run");
            self.git.delete_branch(&branch)?;
        }

        self.git.worktree_add(&path, &branch, "HEAD")?;
        debug!(task_id = %task_id, path = %path.display(), "worktree created");

        Ok(SandboxInfo {
            task_id: task_id.to_string(),
            path,
            branch,
        })
    }

    fn remove(&self, task_id: &str, delete_branch: bool, force: bool) -> Result<RemoveOutcome> {
        let path = self.contained_path(task_id)?;
        if !path.exists() {
            return Ok(RemoveOutcome::default());
        }

        self.git.worktree_remove(&path, force)?;
        debug!(task_id = %task_id, "worktree removed");

        let mut outcome = RemoveOutcome {
            removed: true,
            branch_error: None,
        };

        if delete_branch {
            let branch = self.branch_for(task_id);
            if let Err(e) = self.git.delete_branch(&branch) {
                warn!(branch = %branch, error = %e, "failed to delete branch");
                outcome.branch_error = Some(e.to_string());
            }
        }

        Ok(outcome)
    }

    fn diff(&self, task_id: &str) -> Result<String> {
        let path = self.existing_path(task_id)?;
        GitOps::new(path).diff_head()
    }

    fn diff_stat(&self, task_id: &str) -> Result<String> {
        let path = self.existing_path(task_id)?;
        let git = GitOps::new(path);

        let tracked = git.diff_stat_head()?;
        let status = git.status_all_untracked()?;
        Ok(render_diff_stat(&tracked, &status.untracked()))
    }

    fn list_orphans(&self) -> Result<Vec<SandboxInfo>> {
        let entries = self.git.worktree_list()?;
        Ok(entries
            .into_iter()
            .filter(|e| self.is_managed(&e.path))
            .map(|e| {
                let task_id = e
                    .path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                let branch = e.branch.unwrap_or_else(|| self.branch_for(&task_id));
                SandboxInfo {
                    task_id,
                    path: e.path,
                    branch,
                }
            })
            .collect())
    }

    fn list_managed_branches(&self) -> Result<Vec<String>> {
        self.git.list_branches(&format!("{}/*", self.branch_prefix))
    }

    fn remove_all(&self, delete_branches: bool, force: bool) -> TeardownReport {
        let mut report = TeardownReport::new();

        match self.list_orphans() {
            Ok(sandboxes) => {
                for sandbox in sandboxes {
                    let target = sandbox.path.display().to_string();
                    match self.git.worktree_remove(&sandbox.path, force) {
                        Ok(()) => report.record_removed(target),
                        Err(e) => {
                            warn!(path = %target, error = %e, "failed to remove worktree");
                            report.record_failure(target, e);
                        }
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to list worktrees");
                report.record_failure(self.root.display().to_string(), e);
            }
        }

        if delete_branches {
            match self.list_managed_branches() {
                Ok(branches) => {
                    for branch in branches {
                        match self.git.delete_branch(&branch) {
                            Ok(()) => report.record_removed(branch),
                            Err(e) => {
                                warn!(branch = %branch, error = %e, "failed to delete branch");
                                report.record_failure(branch, e);
                            }
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, "failed to list branches");
                    report.record_failure(format!("{}/*", self.branch_prefix), e);
                }
            }
        }

        if let Err(e) = self.git.worktree_prune() {
            warn!(error = %e, "git worktree prune failed");
            report.record_failure("worktree prune", e);
        }

        report
    }
}

fn render_diff_stat(tracked: &str, untracked: &[&Path]) -> String {
    let mut out = tracked.trim_end().to_string();
    if !untracked.is_empty() {
        if !out.is_empty() {
            out.push_str("\n\n");
        }
        out.push_str("Untracked files:\n");
        for path in untracked {
            out.push_str("  ");
            out.push_str(&path.to_string_lossy());
            out.push('\n');
        }
    }
    out
}
