//! Git Operations
//!
//! Thin wrappers over the `git` CLI. Every call passes argv directly (no
//! shell); a non-zero exit becomes [`Error::ToolFailed`] carrying git's
//! stderr verbatim.

use codex_agent_foundation::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

// ============================================================================
// Git Status Types
// ============================================================================

/// Status of a single file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// Added to the index
    New,
    Modified,
    Deleted,
    /// Renamed
    Renamed { from: String },
    /// Untracked
    Untracked,
}

/// Working tree status from `git status --porcelain`
#[derive(Debug, Clone, Default)]
pub struct GitStatus {
    /// Files with their status
    pub files: Vec<(PathBuf, FileStatus)>,
}

impl GitStatus {
    /// Parse `--porcelain=v1` output
    pub fn parse(output: &str) -> Self {
        let mut status = GitStatus::default();

        for line in output.lines() {
            if line.len() < 4 {
                continue;
            }

            let mut codes = line.chars();
            let index_status = codes.next().unwrap_or(' ');
            let worktree_status = codes.next().unwrap_or(' ');
            let path = &line[3..];

            let file_status = match (index_status, worktree_status) {
                ('?', '?') => FileStatus::Untracked,
                ('R', _) => {
                    if let Some((from, to)) = path.split_once(" -> ") {
                        status.files.push((
                            PathBuf::from(to),
                            FileStatus::Renamed {
                                from: from.to_string(),
                            },
                        ));
                        continue;
                    }
                    FileStatus::Renamed {
                        from: String::new(),
                    }
                }
                ('A', _) => FileStatus::New,
                ('D', _) | (_, 'D') => FileStatus::Deleted,
                _ => FileStatus::Modified,
            };

            status.files.push((PathBuf::from(path), file_status));
        }

        status
    }

    /// Check if working tree is clean
    pub fn is_clean(&self) -> bool {
        self.files.is_empty()
    }

    /// Untracked paths, in git's order
    pub fn untracked(&self) -> Vec<&Path> {
        self.files
            .iter()
            .filter(|(_, s)| *s == FileStatus::Untracked)
            .map(|(p, _)| p.as_path())
            .collect()
    }
}

/// One entry of `git worktree list --porcelain`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorktreeEntry {
    pub path: PathBuf,
    /// Short branch name, `None` when detached
    pub branch: Option<String>,
}

// ============================================================================
// Git Operations
// ============================================================================

/// Git operations handler bound to one working directory
#[derive(Debug, Clone)]
pub struct GitOps {
    root: PathBuf,
}

impl GitOps {
    /// Operate in `root` (a repository root or a worktree)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get working directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `git rev-parse --show-toplevel` from `cwd`
    pub fn toplevel(cwd: &Path) -> Result<PathBuf> {
        let output = Command::new("git")
            .args(["rev-parse", "--show-toplevel"])
            .current_dir(cwd)
            .output()
            .map_err(|_| Error::NotARepository(cwd.to_path_buf()))?;

        if !output.status.success() {
            return Err(Error::NotARepository(cwd.to_path_buf()));
        }
        let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(PathBuf::from(root))
    }

    /// Run a git command, returning trimmed stdout
    fn run_git(&self, args: &[&str]) -> Result<String> {
        self.run_git_raw(args).map(|s| s.trim().to_string())
    }

    /// Run a git command, returning stdout untouched
    fn run_git_raw(&self, args: &[&str]) -> Result<String> {
        debug!(cwd = %self.root.display(), "git {}", args.join(" "));
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()
            .map_err(|e| Error::tool("git", args, e.to_string()))?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(Error::tool("git", args, stderr.trim()))
        }
    }

    /// Whether the command exits zero (for `--quiet` probes)
    fn git_succeeds(&self, args: &[&str]) -> bool {
        Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    // ========================================================================
    // Status / Diff
    // ========================================================================

    /// Get working tree status (tracked changes and top-level untracked)
    pub fn status(&self) -> Result<GitStatus> {
        let output = self.run_git_raw(&["status", "--porcelain=v1"])?;
        Ok(GitStatus::parse(&output))
    }

    /// Status listing every untracked file individually
    pub fn status_all_untracked(&self) -> Result<GitStatus> {
        let output = self.run_git_raw(&["status", "--porcelain", "--untracked-files=all"])?;
        Ok(GitStatus::parse(&output))
    }

    /// Check if there are uncommitted changes
    pub fn is_dirty(&self) -> Result<bool> {
        Ok(!self.status()?.is_clean())
    }

    /// Get diff of all tracked changes against HEAD
    pub fn diff_head(&self) -> Result<String> {
        self.run_git_raw(&["diff", "HEAD"])
    }

    /// `git diff --stat HEAD`
    pub fn diff_stat_head(&self) -> Result<String> {
        self.run_git(&["diff", "--stat", "HEAD"])
    }

    // ========================================================================
    // Branches
    // ========================================================================

    /// Check if a local branch exists
    pub fn branch_exists(&self, branch: &str) -> bool {
        let reference = format!("refs/heads/{}", branch);
        self.git_succeeds(&["show-ref", "--verify", "--quiet", &reference])
    }

    /// Force-delete a local branch
    pub fn delete_branch(&self, branch: &str) -> Result<()> {
        self.run_git(&["branch", "-D", branch])?;
        Ok(())
    }

    /// Local branches matching a glob (`git branch --list`)
    pub fn list_branches(&self, pattern: &str) -> Result<Vec<String>> {
        let output = self.run_git(&["branch", "--list", pattern])?;
        Ok(output
            .lines()
            .map(|l| l.trim_start_matches(['*', '+']).trim())
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    // ========================================================================
    // Worktrees
    // ========================================================================

    /// `git worktree add -b <branch> <path> <base>`
    pub fn worktree_add(&self, path: &Path, branch: &str, base: &str) -> Result<()> {
        let path = path.to_string_lossy();
        self.run_git(&["worktree", "add", "-b", branch, &path, base])?;
        Ok(())
    }

    /// `git worktree remove [--force] <path>`
    pub fn worktree_remove(&self, path: &Path, force: bool) -> Result<()> {
        let path = path.to_string_lossy();
        let mut args = vec!["worktree", "remove"];
        if force {
            args.push("--force");
        }
        args.push(&path);
        self.run_git(&args)?;
        Ok(())
    }

    /// Drop registrations of worktrees whose directories are gone
    pub fn worktree_prune(&self) -> Result<()> {
        self.run_git(&["worktree", "prune"])?;
        Ok(())
    }

    /// `git worktree list --porcelain`
    pub fn worktree_list(&self) -> Result<Vec<WorktreeEntry>> {
        let output = self.run_git(&["worktree", "list", "--porcelain"])?;
        Ok(parse_worktree_list(&output))
    }
}

fn parse_worktree_list(output: &str) -> Vec<WorktreeEntry> {
    let mut entries = Vec::new();
    let mut current: Option<WorktreeEntry> = None;

    for line in output.lines() {
        if let Some(path) = line.strip_prefix("worktree ") {
            if let Some(entry) = current.take() {
                entries.push(entry);
            }
            current = Some(WorktreeEntry {
                path: PathBuf::from(path),
                branch: None,
            });
        } else if let Some(reference) = line.strip_prefix("branch ") {
            if let Some(entry) = current.as_mut() {
                let short = reference.strip_prefix("refs/heads/").unwrap_or(reference);
                entry.branch = Some(short.to_string());
            }
        }
    }

    if let Some(entry) = current {
        entries.push(entry);
    }
    entries
}

// ============================================================================
// Tests
// ============================================================================
