//! Config - orchestrator settings
//!
//! - `orchestrator.rs` - OrchestratorConfig (defaults → global → project)

mod orchestrator;

pub use orchestrator::{OrchestratorConfig, OrchestratorConfigFile, CONFIG_FILE};
