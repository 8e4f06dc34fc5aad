//! # codex-agent-task
//!
//! Worker orchestration for codex-agent.
//! Turns a task manifest into workers, each a git worktree plus a tmux
//! session running the coding agent, and tracks them in a per-repository
//! run state.
//!
//! ## Features
//!
//! - Task manifest resolution (unique ids, existing prompt files)
//! - Worker state machine with terminal `stopped`/`failed` states
//! - Durable run state (`state.json`) with atomic replace
//! - Per-run artifact archive (prompt, command, logs, diff, diffstat)
//! - Pluggable liveness probe guarding instruction delivery
//! - **Discovery-driven cleanup that survives missing or corrupt state**

pub mod artifacts;
pub mod manifest;
pub mod orchestrator;
pub mod probe;
pub mod state;
pub mod store;
pub mod task;
pub mod worker;

// Task system
pub use manifest::ManifestResolver;
pub use state::WorkerStatus;
pub use task::Task;
pub use worker::{RunState, WorkerRecord};

// Storage
pub use artifacts::{ArtifactStore, RunSummary, WorkerArtifacts, WorkerSummary};
pub use store::RunStateStore;

// Orchestration
pub use orchestrator::{
    CleanupReport, SendOutcome, StatusReport, StopReport, WorkerOrchestrator, WorkerView,
};
pub use probe::{Liveness, LivenessProbe, PromptPatternProbe};
