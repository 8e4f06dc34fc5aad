//! Storage module for codex-agent
//!
//! - `json`: JSON documents under the control directory, replaced atomically

mod json;

pub use json::JsonStore;
