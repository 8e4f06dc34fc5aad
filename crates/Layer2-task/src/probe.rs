//! Liveness probe
//!
//! Guesses from the tail of a session whether the agent is still in the
//! foreground. The guess is pluggable so the heuristic can change without
//! touching the orchestrator.

use codex_agent_foundation::{OrchestratorConfig, Result};
use regex::Regex;

/// Probe verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    /// Agent markers visible
    Present,
    /// Bare shell prompt on the last line
    Absent,
    /// Neither
    Unknown,
}

impl Liveness {
    /// Unknown is treated as Absent: a spurious restart is cheaper than a
    /// lost instruction
    pub fn needs_restart(&self) -> bool {
        !matches!(self, Liveness::Present)
    }
}

/// Classifies sanitised session output
pub trait LivenessProbe: Send + Sync {
    fn classify(&self, tail: &str) -> Liveness;
}

/// Shell-prompt regex on the last non-empty line, then agent markers
#[derive(Debug, Clone)]
pub struct PromptPatternProbe {
    shell_prompt: Regex,
    agent_markers: Vec<String>,
}

impl PromptPatternProbe {
    pub fn new(shell_prompt: Regex, agent_markers: Vec<String>) -> Self {
        Self {
            shell_prompt,
            agent_markers,
        }
    }

    pub fn from_config(config: &OrchestratorConfig) -> Result<Self> {
        Ok(Self::new(
            config.shell_prompt_regex()?,
            config.agent_markers.clone(),
        ))
    }
}

impl LivenessProbe for PromptPatternProbe {
    fn classify(&self, tail: &str) -> Liveness {
        let last_line = tail
            .lines()
            .rev()
            .find(|l| !l.trim().is_empty())
            .unwrap_or("");

        if self.shell_prompt.is_match(last_line) {
            return Liveness::Absent;
        }

        if self
            .agent_markers
            .iter()
            .any(|marker| !marker.is_empty() && tail.contains(marker.as_str()))
        {
            return Liveness::Present;
        }

        Liveness::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe() -> PromptPatternProbe {
        PromptPatternProbe::from_config(&OrchestratorConfig::default()).unwrap()
    }

    #[test]
    fn test_shell_prompt_is_absent() {
        assert_eq!(probe().classify("codex> done\nuser@host:~/repo$ \n\n"), Liveness::Absent);
        assert_eq!(probe().classify("root@box:/# "), Liveness::Absent);
        assert_eq!(probe().classify("host% "), Liveness::Absent);
    }

    #[test]
    fn test_agent_marker_is_present() {
        assert_eq!(probe().classify("working...\ncodex> thinking"), Liveness::Present);
        assert_eq!(probe().classify("assistant> editing src/lib.rs"), Liveness::Present);
    }

    #[test]
    fn test_ambiguous_is_unknown_and_restarts() {
        let verdict = probe().classify("compiling crate 3 of 9");
        assert_eq!(verdict, Liveness::Unknown);
        assert!(verdict.needs_restart());
        assert!(probe().classify("").needs_restart());
        assert!(!Liveness::Present.needs_restart());
    }
}
