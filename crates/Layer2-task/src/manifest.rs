//! Task Manifest Resolver
//!
//! ```yaml
//! tasks:
//!   - id: auth
//!     file: tasks/task-1-auth.md
//!     description: Add login endpoint
//! ```
//!
//! Validation happens in full before the orchestrator sees anything:
//! required fields first, then id syntax, duplicate ids and file existence
//! per index.

use crate::task::Task;
use codex_agent_foundation::{Error, Result};
use serde_yaml::Value;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolves manifests against one repository root
#[derive(Debug, Clone)]
pub struct ManifestResolver {
    repo_root: PathBuf,
}

impl ManifestResolver {
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: repo_root.into(),
        }
    }

    /// Manifest path resolved against the repository root
    pub fn manifest_path(&self, manifest: &Path) -> PathBuf {
        if manifest.is_absolute() {
            manifest.to_path_buf()
        } else {
            self.repo_root.join(manifest)
        }
    }

    /// Read, parse and validate a manifest file
    pub fn load(&self, manifest: &Path) -> Result<Vec<Task>> {
        let path = self.manifest_path(manifest);
        let content = fs::read_to_string(&path).map_err(|e| Error::ManifestInvalid {
            path: path.clone(),
            reason: format!("cannot read manifest: {}", e),
        })?;
        let value: Value = serde_yaml::from_str(&content).map_err(|e| Error::ManifestInvalid {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        self.resolve(&value, &path)
    }

    /// Validate an already-parsed manifest, preserving task order
    pub fn resolve(&self, manifest: &Value, manifest_path: &Path) -> Result<Vec<Task>> {
        let entries = manifest
            .get("tasks")
            .and_then(Value::as_sequence)
            .ok_or_else(|| Error::ManifestInvalid {
                path: manifest_path.to_path_buf(),
                reason: "missing or invalid \"tasks\" list".to_string(),
            })?;

        let tasks = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| parse_entry(index, entry, manifest_path))
            .collect::<Result<Vec<_>>>()?;

        self.validate(&tasks)?;
        debug!(count = tasks.len(), manifest = %manifest_path.display(), "manifest resolved");
        Ok(tasks)
    }

    /// Well-formed unique ids and existing prompt files
    pub fn validate(&self, tasks: &[Task]) -> Result<()> {
        let mut seen = HashSet::new();
        for (index, task) in tasks.iter().enumerate() {
            if !task.has_valid_id() {
                return Err(Error::InvalidTaskId {
                    id: task.id.clone(),
                    index,
                });
            }
            if !seen.insert(task.id.as_str()) {
                return Err(Error::DuplicateTaskId {
                    id: task.id.clone(),
                    index,
                });
            }

            let resolved = task.resolved_path(&self.repo_root);
            if !resolved.is_file() {
                return Err(Error::TaskFileNotFound {
                    id: task.id.clone(),
                    index,
                    resolved,
                    original: task.file.clone(),
                });
            }
        }
        Ok(())
    }
}

fn parse_entry(index: usize, entry: &Value, manifest: &Path) -> Result<Task> {
    let invalid = |field: &'static str| Error::TaskInvalid {
        index,
        field,
        manifest: manifest.to_path_buf(),
    };

    let id = scalar_string(entry.get("id")).ok_or_else(|| invalid("id"))?;
    let file = scalar_string(entry.get("file")).ok_or_else(|| invalid("file"))?;
    let description = scalar_string(entry.get("description"));

    Ok(Task {
        id,
        file,
        description,
    })
}

/// Non-empty string or number
fn scalar_string(value: Option<&Value>) -> Option<String> {
    let s = match value? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!s.is_empty()).then_some(s)
}
