//! Task definition

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One unit of work from the manifest; immutable once validated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique within a manifest; also the worker id
    pub id: String,

    /// Prompt file, relative to the repository root unless absolute
    pub file: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Task {
    pub fn new(id: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            file: file.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Usable as a path component, branch suffix and tmux session name
    ///
    /// `.`, `:`, path separators and whitespace are rejected; tmux would
    /// rewrite the first two and distinct ids could share a session.
    pub fn has_valid_id(&self) -> bool {
        !self.id.is_empty()
            && !self
                .id
                .chars()
                .any(|c| matches!(c, '.' | ':' | '/' | '\\') || c.is_whitespace())
    }

    /// Prompt file path resolved against `repo_root`
    pub fn resolved_path(&self, repo_root: &Path) -> PathBuf {
        let file = Path::new(&self.file);
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            repo_root.join(file)
        }
    }
}
