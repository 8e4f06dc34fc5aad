//! Worker records and run state

use crate::state::WorkerStatus;
use chrono::{DateTime, Utc};
use codex_agent_foundation::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One task's sandbox, session and lifecycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerRecord {
    /// Same as `task_id`
    pub id: String,
    pub task_id: String,
    pub task_file: String,
    pub session_name: String,
    pub sandbox_path: PathBuf,
    pub branch_name: String,
    pub status: WorkerStatus,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stopped_at: Option<DateTime<Utc>>,
    /// Why a `Failed` worker failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WorkerRecord {
    /// Fresh record in `Starting`
    pub fn starting(
        task_id: impl Into<String>,
        task_file: impl Into<String>,
        session_name: impl Into<String>,
        sandbox_path: impl Into<PathBuf>,
        branch_name: impl Into<String>,
    ) -> Self {
        let task_id = task_id.into();
        Self {
            id: task_id.clone(),
            task_id,
            task_file: task_file.into(),
            session_name: session_name.into(),
            sandbox_path: sandbox_path.into(),
            branch_name: branch_name.into(),
            status: WorkerStatus::Starting,
            started_at: Utc::now(),
            stopped_at: None,
            error: None,
        }
    }

    /// Apply a transition; terminal states are never left
    pub fn transition(&mut self, next: WorkerStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(Error::WorkerNotActive {
                id: self.id.clone(),
                status: self.status.to_string(),
            });
        }
        self.status = next;
        if next.is_terminal() {
            self.stopped_at = Some(Utc::now());
        }
        Ok(())
    }

    /// Starting → Running
    pub fn mark_running(&mut self) -> Result<()> {
        self.transition(WorkerStatus::Running)
    }

    /// Running → Stopped
    pub fn mark_stopped(&mut self) -> Result<()> {
        self.transition(WorkerStatus::Stopped)
    }

    /// Starting → Failed, keeping the cause
    pub fn mark_failed(&mut self, error: impl Into<String>) -> Result<()> {
        self.transition(WorkerStatus::Failed)?;
        self.error = Some(error.into());
        Ok(())
    }
}

/// The single active run of a repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunState {
    pub run_id: String,
    pub repo_root: PathBuf,
    pub repo_name: String,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub workers: Vec<WorkerRecord>,
}

impl RunState {
    pub fn new(
        run_id: impl Into<String>,
        repo_root: impl Into<PathBuf>,
        repo_name: impl Into<String>,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            repo_root: repo_root.into(),
            repo_name: repo_name.into(),
            started_at: Utc::now(),
            workers: Vec::new(),
        }
    }

    pub fn worker(&self, id: &str) -> Result<&WorkerRecord> {
        self.workers
            .iter()
            .find(|w| w.id == id)
            .ok_or_else(|| Error::WorkerNotFound(id.to_string()))
    }

    pub fn worker_mut(&mut self, id: &str) -> Result<&mut WorkerRecord> {
        self.workers
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| Error::WorkerNotFound(id.to_string()))
    }

    /// Count workers in `status`
    pub fn count(&self, status: WorkerStatus) -> usize {
        self.workers.iter().filter(|w| w.status == status).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> WorkerRecord {
        WorkerRecord::starting(
            "t1",
            "tasks/a.md",
            "codex-repo-t1",
            "/repo/.codex-agent/worktrees/t1",
            "codex/t1",
        )
    }

    #[test]
    fn test_record_lifecycle() {
        let mut worker = record();
        assert_eq!(worker.status, WorkerStatus::Starting);

        worker.mark_running().unwrap();
        assert!(worker.stopped_at.is_none());

        worker.mark_stopped().unwrap();
        assert_eq!(worker.status, WorkerStatus::Stopped);
        assert!(worker.stopped_at.is_some());

        let err = worker.mark_running().unwrap_err();
        assert!(matches!(err, Error::WorkerNotActive { .. }));
    }

    #[test]
    fn test_failed_keeps_cause() {
        let mut worker = record();
        worker.mark_failed("Sandbox already exists").unwrap();
        assert_eq!(worker.status, WorkerStatus::Failed);
        assert_eq!(worker.error.as_deref(), Some("Sandbox already exists"));
    }

    #[test]
    fn test_json_shape() {
        let mut state = RunState::new("run-1", "/repo", "repo");
        state.workers.push(record());

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["runId"], "run-1");
        assert_eq!(json["workers"][0]["sessionName"], "codex-repo-t1");
        assert_eq!(json["workers"][0]["status"], "starting");
        assert!(json["workers"][0].get("stoppedAt").is_none());
    }

    #[test]
    fn test_worker_lookup() {
        let mut state = RunState::new("run-1", "/repo", "repo");
        state.workers.push(record());
        assert!(state.worker("t1").is_ok());
        assert!(matches!(state.worker("t9"), Err(Error::WorkerNotFound(_))));
        assert_eq!(state.count(WorkerStatus::Starting), 1);
    }
}
