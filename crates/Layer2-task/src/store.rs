//! Run State Store
//!
//! One `state.json` per repository, read fresh on every command and replaced
//! atomically on save. There is no locking: concurrent invocations against
//! the same repository race and the last write wins, so one operator at a
//! time is the supported usage model.

use crate::worker::RunState;
use codex_agent_foundation::{ControlDir, Error, JsonStore, Result, STATE_FILE};

/// Durable RunState storage
#[derive(Debug, Clone)]
pub struct RunStateStore {
    store: JsonStore,
}

impl RunStateStore {
    pub fn new(control: &ControlDir) -> Self {
        Self {
            store: JsonStore::new(control.root()),
        }
    }

    /// `None` means no active run
    pub fn load(&self) -> Result<Option<RunState>> {
        self.store.load_optional(STATE_FILE)
    }

    /// Active run, or `NoActiveRun`
    pub fn require(&self) -> Result<RunState> {
        self.load()?.ok_or(Error::NoActiveRun)
    }

    /// Replace the stored state (never merges)
    pub fn save(&self, state: &RunState) -> Result<()> {
        self.store.save(STATE_FILE, state)
    }

    pub fn clear(&self) -> Result<()> {
        self.store.remove(STATE_FILE)
    }

    pub fn exists(&self) -> bool {
        self.store.exists(STATE_FILE)
    }
}
