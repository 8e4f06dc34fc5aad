//! Run artifacts
//!
//! Every operator action leaves its result on disk under
//! `runs/<runId>/workers/<id>/`. Files are overwritten on each call, not
//! accumulated.

use crate::state::WorkerStatus;
use crate::worker::RunState;
use chrono::{DateTime, Duration, Utc};
use codex_agent_foundation::{ControlDir, JsonStore, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

pub const TASK_FILE: &str = "task.md";
pub const COMMAND_FILE: &str = "command.txt";
pub const LOGS_FILE: &str = "logs.txt";
pub const DIFF_FILE: &str = "diff.patch";
pub const DIFFSTAT_FILE: &str = "diffstat.txt";
pub const SUMMARY_FILE: &str = "summary.json";
pub const STATUS_FILE: &str = "status.json";

// ============================================================================
// Summary types
// ============================================================================

/// Artifact paths of one worker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerArtifacts {
    pub task_file: PathBuf,
    pub command: PathBuf,
    pub logs: PathBuf,
    pub diff: PathBuf,
    pub diffstat: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerSummary {
    pub status: WorkerStatus,
    pub artifacts: WorkerArtifacts,
}

/// `runs/<runId>/summary.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub workers: BTreeMap<String, WorkerSummary>,
}

// ============================================================================
// ArtifactStore
// ============================================================================

/// Writes per-run and per-worker artifacts
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    control: ControlDir,
}

impl ArtifactStore {
    pub fn new(control: ControlDir) -> Self {
        Self { control }
    }

    /// `run-<yyyymmdd-HHMMSS-mmm>`, advanced by a millisecond until unused
    ///
    /// Creates the run directory so the id is claimed.
    pub fn allocate_run_id(&self, now: DateTime<Utc>) -> Result<String> {
        let mut at = now;
        loop {
            let id = format!("run-{}", at.format("%Y%m%d-%H%M%S-%3f"));
            let dir = self.control.run_dir(&id);
            if !dir.exists() {
                fs::create_dir_all(&dir)?;
                return Ok(id);
            }
            at += Duration::milliseconds(1);
        }
    }

    pub fn run_dir(&self, run_id: &str) -> PathBuf {
        self.control.run_dir(run_id)
    }

    pub fn worker_dir(&self, run_id: &str, worker_id: &str) -> PathBuf {
        self.control.worker_dir(run_id, worker_id)
    }

    pub fn artifact_paths(&self, run_id: &str, worker_id: &str) -> WorkerArtifacts {
        let dir = self.worker_dir(run_id, worker_id);
        WorkerArtifacts {
            task_file: dir.join(TASK_FILE),
            command: dir.join(COMMAND_FILE),
            logs: dir.join(LOGS_FILE),
            diff: dir.join(DIFF_FILE),
            diffstat: dir.join(DIFFSTAT_FILE),
        }
    }

    fn write(&self, run_id: &str, worker_id: &str, name: &str, content: &str) -> Result<PathBuf> {
        let dir = self.worker_dir(run_id, worker_id);
        fs::create_dir_all(&dir)?;
        let path = dir.join(name);
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Resolved prompt; the returned path is what the agent reads from
    pub fn write_task(&self, run_id: &str, worker_id: &str, content: &str) -> Result<PathBuf> {
        self.write(run_id, worker_id, TASK_FILE, content)
    }

    pub fn write_command(&self, run_id: &str, worker_id: &str, command: &str) -> Result<PathBuf> {
        self.write(run_id, worker_id, COMMAND_FILE, command)
    }

    /// Persisted invocation, `None` if it was never written
    pub fn read_command(&self, run_id: &str, worker_id: &str) -> Result<Option<String>> {
        let path = self.worker_dir(run_id, worker_id).join(COMMAND_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let command = fs::read_to_string(path)?;
        Ok(Some(command.trim().to_string()).filter(|c| !c.is_empty()))
    }

    pub fn write_logs(&self, run_id: &str, worker_id: &str, logs: &str) -> Result<PathBuf> {
        self.write(run_id, worker_id, LOGS_FILE, logs)
    }

    pub fn write_diff(&self, run_id: &str, worker_id: &str, diff: &str) -> Result<PathBuf> {
        self.write(run_id, worker_id, DIFF_FILE, diff)
    }

    pub fn write_diffstat(&self, run_id: &str, worker_id: &str, diffstat: &str) -> Result<PathBuf> {
        self.write(run_id, worker_id, DIFFSTAT_FILE, diffstat)
    }

    /// Rewrite `summary.json` from the current state
    pub fn write_summary(&self, state: &RunState) -> Result<RunSummary> {
        let workers = state
            .workers
            .iter()
            .map(|w| {
                (
                    w.id.clone(),
                    WorkerSummary {
                        status: w.status,
                        artifacts: self.artifact_paths(&state.run_id, &w.id),
                    },
                )
            })
            .collect();

        let summary = RunSummary {
            run_id: state.run_id.clone(),
            started_at: state.started_at,
            updated_at: Utc::now(),
            workers,
        };
        self.json(&state.run_id).save(SUMMARY_FILE, &summary)?;
        Ok(summary)
    }

    /// Write `status.json`
    pub fn write_status<T: Serialize>(&self, run_id: &str, snapshot: &T) -> Result<PathBuf> {
        self.json(run_id).save(STATUS_FILE, snapshot)?;
        Ok(self.run_dir(run_id).join(STATUS_FILE))
    }

    fn json(&self, run_id: &str) -> JsonStore {
        JsonStore::new(self.run_dir(run_id))
    }
}
