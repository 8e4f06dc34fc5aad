//! Orchestrator Config
//!
//! Settings consumed by the worker orchestrator, merged from three layers:
//! built-in defaults, the global file and the project file.

use crate::layout::ControlDir;
use crate::storage::JsonStore;
use crate::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Config file name (both global and project)
pub const CONFIG_FILE: &str = "config.json";

// ============================================================================
// OrchestratorConfig (effective)
// ============================================================================

/// Effective orchestrator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestratorConfig {
    /// Agent invocation; the prompt file is attached by stdin redirection
    #[serde(default = "default_agent_command")]
    pub agent_command: String,

    /// Session names are `<sessionPrefix>-<repoName>-<taskId>`
    #[serde(default = "default_prefix")]
    pub session_prefix: String,

    /// Branches are `<branchPrefix>/<taskId>`
    #[serde(default = "default_prefix")]
    pub branch_prefix: String,

    /// Tail length captured by the liveness probe
    #[serde(default = "default_probe_lines")]
    pub probe_lines: u32,

    /// Pause after replaying the invocation command
    #[serde(default = "default_restart_delay_ms")]
    pub restart_delay_ms: u64,

    /// Substrings that mark an active agent
    #[serde(default = "default_agent_markers")]
    pub agent_markers: Vec<String>,

    /// Bare shell prompt on the last non-empty line
    #[serde(default = "default_shell_prompt_pattern")]
    pub shell_prompt_pattern: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            agent_command: default_agent_command(),
            session_prefix: default_prefix(),
            branch_prefix: default_prefix(),
            probe_lines: default_probe_lines(),
            restart_delay_ms: default_restart_delay_ms(),
            agent_markers: default_agent_markers(),
            shell_prompt_pattern: default_shell_prompt_pattern(),
        }
    }
}

impl OrchestratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Load
    // ========================================================================

    /// Defaults → global → project, then validate
    pub fn load(repo_root: &Path) -> Result<Self> {
        let global = JsonStore::global().ok();
        let project = JsonStore::new(ControlDir::new(repo_root).root());
        Self::load_layers(global.as_ref(), &project)
    }

    /// Merge the given layers over the defaults
    pub fn load_layers(global: Option<&JsonStore>, project: &JsonStore) -> Result<Self> {
        let mut config = Self::new();

        if let Some(store) = global {
            if let Some(file) = load_file(store)? {
                config.merge(file);
            }
        }

        if let Some(file) = load_file(project)? {
            config.merge(file);
        }

        config.validate()?;
        Ok(config)
    }

    /// Write this config as the project file
    pub fn save_project(&self, repo_root: &Path) -> Result<()> {
        let store = JsonStore::new(ControlDir::new(repo_root).root());
        store.save(CONFIG_FILE, self)
    }

    // ========================================================================
    // Merge / Validate
    // ========================================================================

    /// Merge a file layer (fields present in `other` win)
    pub fn merge(&mut self, other: OrchestratorConfigFile) {
        if let Some(v) = other.agent_command {
            self.agent_command = v;
        }
        if let Some(v) = other.session_prefix {
            self.session_prefix = v;
        }
        if let Some(v) = other.branch_prefix {
            self.branch_prefix = v;
        }
        if let Some(v) = other.probe_lines {
            self.probe_lines = v;
        }
        if let Some(v) = other.restart_delay_ms {
            self.restart_delay_ms = v;
        }
        if let Some(v) = other.agent_markers {
            self.agent_markers = v;
        }
        if let Some(v) = other.shell_prompt_pattern {
            self.shell_prompt_pattern = v;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.agent_command.trim().is_empty() {
            return Err(Error::Config("agentCommand must not be empty".to_string()));
        }
        if self.probe_lines == 0 {
            return Err(Error::Config("probeLines must be at least 1".to_string()));
        }
        if self.session_prefix.trim().is_empty() || self.branch_prefix.trim().is_empty() {
            return Err(Error::Config(
                "sessionPrefix and branchPrefix must not be empty".to_string(),
            ));
        }
        self.shell_prompt_regex()?;
        Ok(())
    }

    /// Compiled `shellPromptPattern`
    pub fn shell_prompt_regex(&self) -> Result<Regex> {
        Regex::new(&self.shell_prompt_pattern).map_err(|e| {
            Error::Config(format!(
                "invalid shellPromptPattern {:?}: {}",
                self.shell_prompt_pattern, e
            ))
        })
    }
}

// ============================================================================
// File layer
// ============================================================================

/// One config file; absent fields fall through to the layer below
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestratorConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probe_lines: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restart_delay_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_markers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shell_prompt_pattern: Option<String>,
}

fn load_file(store: &JsonStore) -> Result<Option<OrchestratorConfigFile>> {
    let file = store
        .load_optional::<OrchestratorConfigFile>(CONFIG_FILE)
        .map_err(|e| Error::Config(e.to_string()))?;
    if file.is_some() {
        debug!(path = %store.file_path(CONFIG_FILE).display(), "Loaded config layer");
    }
    Ok(file)
}

// ============================================================================
// Defaults
// ============================================================================

fn default_agent_command() -> String {
    "codex exec --sandbox workspace-write".to_string()
}

fn default_prefix() -> String {
    "codex".to_string()
}

fn default_probe_lines() -> u32 {
    20
}

fn default_restart_delay_ms() -> u64 {
    2000
}

fn default_agent_markers() -> Vec<String> {
    vec![
        "assistant>".to_string(),
        "Claude".to_string(),
        "codex>".to_string(),
    ]
}

fn default_shell_prompt_pattern() -> String {
    r"[$#%]\s*$".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.agent_command, "codex exec --sandbox workspace-write");
        assert_eq!(config.session_prefix, "codex");
        assert_eq!(config.branch_prefix, "codex");
        assert_eq!(config.probe_lines, 20);
        assert_eq!(config.restart_delay_ms, 2000);
        assert!(config.agent_markers.contains(&"codex>".to_string()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_project_overrides_global() {
        let global_dir = TempDir::new().unwrap();
        let project_dir = TempDir::new().unwrap();
        fs::write(
            global_dir.path().join(CONFIG_FILE),
            r#"{"agentCommand": "global-agent", "probeLines": 5}"#,
        )
        .unwrap();
        fs::write(
            project_dir.path().join(CONFIG_FILE),
            r#"{"agentCommand": "project-agent"}"#,
        )
        .unwrap();

        let global = JsonStore::new(global_dir.path());
        let project = JsonStore::new(project_dir.path());
        let config = OrchestratorConfig::load_layers(Some(&global), &project).unwrap();

        assert_eq!(config.agent_command, "project-agent");
        assert_eq!(config.probe_lines, 5);
        assert_eq!(config.restart_delay_ms, 2000);
    }

    #[test]
    fn test_missing_files_yield_defaults() {
        let project_dir = TempDir::new().unwrap();
        let project = JsonStore::new(project_dir.path().join("absent"));
        let config = OrchestratorConfig::load_layers(None, &project).unwrap();
        assert_eq!(config, OrchestratorConfig::default());
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let project_dir = TempDir::new().unwrap();
        fs::write(project_dir.path().join(CONFIG_FILE), "{ nope").unwrap();

        let project = JsonStore::new(project_dir.path());
        let err = OrchestratorConfig::load_layers(None, &project).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = OrchestratorConfig::default();
        config.probe_lines = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = OrchestratorConfig::default();
        config.agent_command = "  ".to_string();
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = OrchestratorConfig::default();
        config.shell_prompt_pattern = "[unclosed".to_string();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_string(&OrchestratorConfig::default()).unwrap();
        assert!(json.contains("\"agentCommand\""));
        assert!(json.contains("\"shellPromptPattern\""));
        assert!(json.contains("\"restartDelayMs\""));
    }
}
