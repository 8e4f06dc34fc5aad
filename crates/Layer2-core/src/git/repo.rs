//! Repository discovery

use super::GitOps;
use codex_agent_foundation::{ControlDir, Result};
use std::path::{Path, PathBuf};
use tracing::warn;

/// The repository every command operates on
#[derive(Debug, Clone)]
pub struct Repository {
    root: PathBuf,
    name: String,
    control: ControlDir,
}

impl Repository {
    /// Locate the enclosing repository of `cwd`
    ///
    /// Warns when the working tree is dirty: worktrees branch from the
    /// committed `HEAD`, so uncommitted edits never reach the workers.
    pub fn discover(cwd: &Path) -> Result<Self> {
        let root = GitOps::toplevel(cwd)?;
        let repo = Self::at(root);

        match GitOps::new(repo.root()).is_dirty() {
            Ok(true) => warn!(
                repo = %repo.root.display(),
                "repository has uncommitted changes; workers start from HEAD"
            ),
            Ok(false) => {}
            Err(e) => warn!(error = %e, "could not read repository status"),
        }

        Ok(repo)
    }

    /// Use `root` as-is, without asking git
    pub fn at(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "repo".to_string());
        let control = ControlDir::new(&root);
        Self {
            root,
            name,
            control,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Last path component of the root
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn control(&self) -> &ControlDir {
        &self.control
    }

    pub fn git(&self) -> GitOps {
        GitOps::new(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::ops::tests::{git_available, init_repo};
    use std::fs;

    #[test]
    fn test_at_derives_name() {
        let repo = Repository::at("/work/my-project");
        assert_eq!(repo.name(), "my-project");
        assert_eq!(
            repo.control().state_file(),
            PathBuf::from("/work/my-project/.codex-agent/state.json")
        );
    }

    #[test]
    fn test_discover_from_subdirectory() {
        if !git_available() {
            return;
        }
        let dir = init_repo();
        let sub = dir.path().join("src");
        fs::create_dir(&sub).unwrap();

        let repo = Repository::discover(&sub).unwrap();
        assert_eq!(
            repo.root().canonicalize().unwrap(),
            dir.path().canonicalize().unwrap()
        );
    }
}
