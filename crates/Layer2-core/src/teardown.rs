//! Bulk teardown reporting

use std::fmt;

/// One resource that could not be torn down
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeardownFailure {
    /// Session name, worktree path or branch
    pub target: String,
    pub error: String,
}

/// Outcome of a bulk teardown; sub-failures never abort the sweep
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeardownReport {
    pub removed: Vec<String>,
    pub failures: Vec<TeardownFailure>,
}

impl TeardownReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_removed(&mut self, target: impl Into<String>) {
        self.removed.push(target.into());
    }

    pub fn record_failure(&mut self, target: impl Into<String>, error: impl fmt::Display) {
        self.failures.push(TeardownFailure {
            target: target.into(),
            error: error.to_string(),
        });
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Fold another report into this one
    pub fn extend(&mut self, other: TeardownReport) {
        self.removed.extend(other.removed);
        self.failures.extend(other.failures);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_accumulates() {
        let mut report = TeardownReport::new();
        report.record_removed("codex-repo-t1");
        assert!(report.is_clean());

        let mut other = TeardownReport::new();
        other.record_failure("codex/t2", "branch is checked out");
        report.extend(other);

        assert_eq!(report.removed, vec!["codex-repo-t1"]);
        assert_eq!(report.failures.len(), 1);
        assert!(!report.is_clean());
    }
}
