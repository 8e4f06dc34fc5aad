//! Worker Orchestrator
//!
//! Turns validated tasks into running workers and keeps their records
//! consistent with three independently fallible resources: the sandbox, the
//! terminal session and the agent process inside it.
//!
//! ## Features
//!
//! - Per-task failure containment during `start` (never whole-batch)
//! - Liveness-probe-guarded instruction delivery with command replay
//! - Terminal `Stopped`/`Failed` states
//! - Discovery-driven teardown that works without (or with corrupt) state
//! - Every read (`status`, `logs`, `diff`) archived under `runs/<runId>/`
//!
//! ## Example
//!
//! ```ignore
//! let repo = Repository::discover(&cwd)?;
//! let config = OrchestratorConfig::load(repo.root())?;
//! let orchestrator = WorkerOrchestrator::with_defaults(repo, config)?;
//!
//! let tasks = ManifestResolver::new(orchestrator.repo().root()).load(Path::new("tasks.yaml"))?;
//! let run = orchestrator.start_workers(&tasks)?;
//! orchestrator.send_instruction("auth", "also add tests")?;
//! orchestrator.stop_all_workers()?;
//! ```

use crate::artifacts::ArtifactStore;
use crate::probe::{Liveness, LivenessProbe, PromptPatternProbe};
use crate::state::WorkerStatus;
use crate::store::RunStateStore;
use crate::task::Task;
use crate::worker::{RunState, WorkerRecord};
use chrono::{DateTime, Utc};
use codex_agent_core::{
    sanitize_output, Repository, SandboxProvider, SessionAdapter, TeardownReport, TmuxAdapter,
    WorktreeProvisioner,
};
use codex_agent_foundation::{Error, OrchestratorConfig, Result};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

// ============================================================================
// Reports
// ============================================================================

/// Live view of one worker
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerView {
    #[serde(flatten)]
    pub record: WorkerRecord,
    pub session_alive: bool,
    pub sandbox_present: bool,
}

/// Result of `get_status`, also written as `status.json`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub captured_at: DateTime<Utc>,
    pub workers: Vec<WorkerView>,
}

/// Result of `send_instruction`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendOutcome {
    pub liveness: Liveness,
    /// The invocation command was replayed before delivery
    pub restarted: bool,
}

/// Result of `stop_all_workers`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopReport {
    pub stopped: Vec<String>,
    /// (worker id, error)
    pub failures: Vec<(String, String)>,
}

/// Result of `cleanup`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// A readable state file existed before cleanup
    pub had_state: bool,
    pub sessions: TeardownReport,
    pub sandboxes: TeardownReport,
}

impl CleanupReport {
    pub fn is_clean(&self) -> bool {
        self.sessions.is_clean() && self.sandboxes.is_clean()
    }

    /// Sessions and sandboxes folded into one report
    pub fn combined(&self) -> TeardownReport {
        let mut report = self.sessions.clone();
        report.extend(self.sandboxes.clone());
        report
    }
}

// ============================================================================
// WorkerOrchestrator
// ============================================================================

/// Coordinates sandboxes, sessions and run state for one repository
pub struct WorkerOrchestrator {
    repo: Repository,
    config: OrchestratorConfig,
    sandboxes: Box<dyn SandboxProvider>,
    sessions: Box<dyn SessionAdapter>,
    probe: Box<dyn LivenessProbe>,
    state: RunStateStore,
    artifacts: ArtifactStore,
}

impl WorkerOrchestrator {
    pub fn new(
        repo: Repository,
        config: OrchestratorConfig,
        sandboxes: Box<dyn SandboxProvider>,
        sessions: Box<dyn SessionAdapter>,
        probe: Box<dyn LivenessProbe>,
    ) -> Self {
        let state = RunStateStore::new(repo.control());
        let artifacts = ArtifactStore::new(repo.control().clone());
        Self {
            repo,
            config,
            sandboxes,
            sessions,
            probe,
            state,
            artifacts,
        }
    }

    /// git worktrees, tmux and the prompt-pattern probe
    pub fn with_defaults(repo: Repository, config: OrchestratorConfig) -> Result<Self> {
        let sandboxes = WorktreeProvisioner::new(&repo, config.branch_prefix.clone());
        let sessions = TmuxAdapter::new(&config.session_prefix, repo.name(), repo.root());
        let probe = PromptPatternProbe::from_config(&config)?;
        Ok(Self::new(
            repo,
            config,
            Box::new(sandboxes),
            Box::new(sessions),
            Box::new(probe),
        ))
    }

    pub fn repo(&self) -> &Repository {
        &self.repo
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn state_store(&self) -> &RunStateStore {
        &self.state
    }

    pub fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }

    // ========================================================================
    // Start
    // ========================================================================

    /// Start one worker per task and persist the new run
    ///
    /// A failing task yields a `Failed` record; the remaining tasks are still
    /// attempted. The state is saved once, after every task has resolved, and
    /// replaces any previous run.
    pub fn start_workers(&self, tasks: &[Task]) -> Result<RunState> {
        let mut seen = HashSet::new();
        for (index, task) in tasks.iter().enumerate() {
            if task.id.trim().is_empty() {
                return Err(Error::InvalidArgument(format!(
                    "task at index {} has an empty id",
                    index
                )));
            }
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
        }

        let run_id = self.artifacts.allocate_run_id(Utc::now())?;
        let mut run = RunState::new(&run_id, self.repo.root(), self.repo.name());
        info!(run_id = %run_id, tasks = tasks.len(), "starting workers");

        for task in tasks {
            // Sandbox path and branch are filled in once the sandbox exists
            let mut record = WorkerRecord::starting(
                &task.id,
                &task.file,
                self.sessions.session_name(&task.id),
                PathBuf::new(),
                String::new(),
            );

            let outcome = self
                .start_worker(&run_id, task, &mut record)
                .and_then(|()| record.mark_running());

            if let Err(e) = outcome {
                warn!(task_id = %task.id, error = %e, "failed to start worker");
                record.mark_failed(e.to_string())?;
            } else {
                info!(task_id = %task.id, session = %record.session_name, "worker running");
            }
            run.workers.push(record);
        }

        self.state.save(&run)?;
        self.artifacts.write_summary(&run)?;
        Ok(run)
    }

    fn start_worker(&self, run_id: &str, task: &Task, record: &mut WorkerRecord) -> Result<()> {
        let sandbox = self.sandboxes.create(&task.id)?;
        record.sandbox_path = sandbox.path.clone();
        record.branch_name = sandbox.branch.clone();

        // The prompt lives in the run artifacts, never inside the sandbox
        let content = fs::read_to_string(task.resolved_path(self.repo.root()))?;
        let prompt_path = self.artifacts.write_task(run_id, &task.id, &content)?;
        let command = self.invocation_command(&prompt_path)?;

        record.session_name = self.sessions.create(&task.id, &sandbox.path)?;
        self.sessions.send_text(&task.id, &command)?;
        self.artifacts.write_command(run_id, &task.id, &command)?;
        debug!(task_id = %task.id, command = %command, "agent launched");
        Ok(())
    }

    /// `<agentCommand> < <quoted prompt path>`
    pub fn invocation_command(&self, prompt_path: &Path) -> Result<String> {
        let path = prompt_path.to_string_lossy();
        let quoted = shlex::try_quote(&path).map_err(|e| {
            Error::InvalidArgument(format!(
                "cannot quote prompt path {}: {}",
                prompt_path.display(),
                e
            ))
        })?;
        Ok(format!("{} < {}", self.config.agent_command.trim(), quoted))
    }

    // ========================================================================
    // Send / Stop
    // ========================================================================

    /// Deliver an instruction, relaunching the agent first if it looks gone
    ///
    /// The record's status is never changed here.
    pub fn send_instruction(&self, worker_id: &str, text: &str) -> Result<SendOutcome> {
        let run = self.state.require()?;
        let worker = run.worker(worker_id)?;
        if worker.status.is_terminal() {
            return Err(Error::WorkerNotActive {
                id: worker.id.clone(),
                status: worker.status.to_string(),
            });
        }

        let tail = self
            .sessions
            .capture(worker_id, Some(self.config.probe_lines))?;
        let liveness = self.probe.classify(&sanitize_output(&tail));
        debug!(worker = %worker_id, ?liveness, "liveness probe");

        let mut restarted = false;
        if liveness.needs_restart() {
            match self.artifacts.read_command(&run.run_id, worker_id)? {
                Some(command) => {
                    info!(worker = %worker_id, "agent not detected, replaying invocation");
                    self.sessions.send_text(worker_id, &command)?;
                    restarted = true;
                    if self.config.restart_delay_ms > 0 {
                        thread::sleep(Duration::from_millis(self.config.restart_delay_ms));
                    }
                }
                None => warn!(
                    worker = %worker_id,
                    "no persisted invocation command; sending instruction anyway"
                ),
            }
        }

        self.sessions.send_text(worker_id, text)?;
        Ok(SendOutcome {
            liveness,
            restarted,
        })
    }

    /// Interrupt the agent and mark the worker `Stopped`
    ///
    /// Stopping a worker that is already terminal is a no-op.
    pub fn stop_worker(&self, worker_id: &str) -> Result<WorkerRecord> {
        let mut run = self.state.require()?;
        let worker = run.worker_mut(worker_id)?;

        if worker.status.is_terminal() {
            info!(worker = %worker_id, status = %worker.status, "worker already terminal");
            return Ok(worker.clone());
        }

        self.sessions.interrupt(worker_id)?;
        worker.mark_stopped()?;
        let stopped = worker.clone();

        self.state.save(&run)?;
        Ok(stopped)
    }

    /// Stop every running worker; one failure does not stop the sweep
    pub fn stop_all_workers(&self) -> Result<StopReport> {
        let mut run = self.state.require()?;
        let mut report = StopReport::default();

        for worker in run.workers.iter_mut() {
            if worker.status != WorkerStatus::Running {
                continue;
            }
            match self
                .sessions
                .interrupt(&worker.id)
                .and_then(|()| worker.mark_stopped())
            {
                Ok(()) => report.stopped.push(worker.id.clone()),
                Err(e) => {
                    warn!(worker = %worker.id, error = %e, "failed to stop worker");
                    report.failures.push((worker.id.clone(), e.to_string()));
                }
            }
        }

        self.state.save(&run)?;
        Ok(report)
    }

    // ========================================================================
    // Cleanup
    // ========================================================================

    /// Kill managed sessions, remove managed sandboxes, then clear the state
    ///
    /// Driven by discovery, so it works without a state file and after
    /// partial failures. The state is cleared last, keeping a failed cleanup
    /// retryable.
    pub fn cleanup(&self, delete_branches: bool, force: bool) -> Result<CleanupReport> {
        let had_state = match self.state.load() {
            Ok(state) => state.is_some(),
            Err(e) => {
                warn!(error = %e, "run state unreadable; cleaning up by discovery only");
                false
            }
        };

        let sessions = self.sessions.kill_all();
        let sandboxes = self.sandboxes.remove_all(delete_branches, force);

        self.state.clear()?;
        info!(
            sessions = sessions.removed.len(),
            sandboxes = sandboxes.removed.len(),
            failures = sessions.failures.len() + sandboxes.failures.len(),
            "cleanup complete"
        );

        Ok(CleanupReport {
            had_state,
            sessions,
            sandboxes,
        })
    }

    // ========================================================================
    // Read-only projections (archived)
    // ========================================================================

    /// Records with live session/sandbox presence
    pub fn get_status(&self, worker_id: Option<&str>) -> Result<StatusReport> {
        let run = self.state.require()?;

        let records: Vec<&WorkerRecord> = match worker_id {
            Some(id) => vec![run.worker(id)?],
            None => run.workers.iter().collect(),
        };

        let workers = records
            .into_iter()
            .map(|record| WorkerView {
                session_alive: self.sessions.exists(&record.id),
                sandbox_present: self.sandboxes.exists(&record.id),
                record: record.clone(),
            })
            .collect();

        let report = StatusReport {
            run_id: run.run_id.clone(),
            started_at: run.started_at,
            captured_at: Utc::now(),
            workers,
        };

        self.artifacts.write_status(&run.run_id, &report)?;
        self.artifacts.write_summary(&run)?;
        Ok(report)
    }

    /// Full diff, or the stat view with untracked files
    pub fn get_diff(&self, worker_id: &str, stat: bool) -> Result<String> {
        let run = self.state.require()?;
        run.worker(worker_id)?;

        if stat {
            let diffstat = self.sandboxes.diff_stat(worker_id)?;
            self.artifacts
                .write_diffstat(&run.run_id, worker_id, &diffstat)?;
            Ok(diffstat)
        } else {
            let diff = self.sandboxes.diff(worker_id)?;
            self.artifacts.write_diff(&run.run_id, worker_id, &diff)?;
            Ok(diff)
        }
    }

    /// Session output, sanitised unless `raw`
    pub fn get_logs(&self, worker_id: &str, lines: Option<u32>, raw: bool) -> Result<String> {
        let run = self.state.require()?;
        run.worker(worker_id)?;

        let captured = self.sessions.capture(worker_id, lines)?;
        let logs = if raw {
            captured
        } else {
            sanitize_output(&captured)
        };

        self.artifacts.write_logs(&run.run_id, worker_id, &logs)?;
        Ok(logs)
    }
}
