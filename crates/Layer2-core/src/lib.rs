//! codex-agent-core: runtime resources for codex-agent
//!
//! Layer2 - external resources the orchestrator drives
//!
//! # Modules
//!
//! - `git`: repository discovery and git CLI operations
//! - `sandbox`: SandboxProvider trait + git worktree provisioner
//! - `session`: SessionAdapter trait + tmux adapter, output sanitizer
//! - `teardown`: bulk teardown reports
//!
//! # Example
//!
//! ```ignore
//! use codex_agent_core::{Repository, SandboxProvider, SessionAdapter, TmuxAdapter, WorktreeProvisioner};
//!
//! let repo = Repository::discover(&std::env::current_dir()?)?;
//! let sandboxes = WorktreeProvisioner::new(&repo, "codex");
//! let sessions = TmuxAdapter::new("codex", repo.name(), repo.root());
//!
//! let sandbox = sandboxes.create("t1")?;
//! sessions.create("t1", &sandbox.path)?;
//! sessions.send_text("t1", "cargo test")?;
//! ```

pub mod git;
pub mod sandbox;
pub mod session;
pub mod teardown;

// Re-exports: Git
pub use git::{FileStatus, GitOps, GitStatus, Repository, WorktreeEntry};

// Re-exports: Sandbox
pub use sandbox::{
    ensure_contained, normalize_path, RemoveOutcome, SandboxInfo, SandboxProvider,
    WorktreeProvisioner,
};

// Re-exports: Session
pub use session::{sanitize_output, session_prefix, session_safe, SessionAdapter, TmuxAdapter};

// Re-exports: Teardown
pub use teardown::{TeardownFailure, TeardownReport};
