//! # codex-agent-foundation
//!
//! Foundation layer for codex-agent:
//! - Error: central error enum and failure taxonomy
//! - Config: OrchestratorConfig (defaults → global → project)
//! - Storage: JsonStore with atomic replace
//! - Layout: paths under the `.codex-agent/` control directory

pub mod config;
pub mod error;
pub mod layout;
pub mod storage;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, ErrorKind, Result};

// ============================================================================
// Config
// ============================================================================
pub use config::{OrchestratorConfig, OrchestratorConfigFile, CONFIG_FILE};

// ============================================================================
// Storage / Layout
// ============================================================================
pub use layout::{ControlDir, CONTROL_DIR_NAME, STATE_FILE};
pub use storage::JsonStore;
