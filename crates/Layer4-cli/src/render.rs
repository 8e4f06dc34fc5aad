//! Human-readable output

use codex_agent_task::{CleanupReport, RunState, StatusReport, StopReport, WorkerStatus};
use std::fmt::Write;

/// Output of `start`
pub fn start_summary(run: &RunState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\nRun ID: {}", run.run_id);
    for worker in &run.workers {
        let _ = write!(out, "  {} {:<16} {}", worker.status.symbol(), worker.id, worker.status);
        if let Some(error) = &worker.error {
            let _ = write!(out, "  ({})", error);
        }
        out.push('\n');
    }
    let _ = writeln!(
        out,
        "\n{} running, {} failed",
        run.count(WorkerStatus::Running),
        run.count(WorkerStatus::Failed)
    );
    out.push_str("\nMonitor with:\n");
    out.push_str("  codex-agent status            # all workers\n");
    out.push_str("  codex-agent logs <worker-id>  # recent output\n");
    out.push_str("  codex-agent diff <worker-id>  # changes so far\n");
    out
}

/// Output of `status`
pub fn status_report(report: &StatusReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Run {} (started {})\n", report.run_id, report.started_at.to_rfc3339());

    for view in &report.workers {
        let w = &view.record;
        let _ = writeln!(out, "ID:        {}", w.id);
        let _ = writeln!(out, "Task:      {}", w.task_file);
        let _ = writeln!(out, "Status:    {} {}", w.status.symbol(), w.status);
        if !w.branch_name.is_empty() {
            let _ = writeln!(out, "Branch:    {}", w.branch_name);
        }
        let _ = writeln!(
            out,
            "Session:   {} ({})",
            w.session_name,
            if view.session_alive { "alive" } else { "gone" }
        );
        if !w.sandbox_path.as_os_str().is_empty() {
            let _ = writeln!(
                out,
                "Worktree:  {} ({})",
                w.sandbox_path.display(),
                if view.sandbox_present { "present" } else { "missing" }
            );
        }
        let _ = writeln!(out, "Started:   {}", w.started_at.to_rfc3339());
        if let Some(stopped) = w.stopped_at {
            let _ = writeln!(out, "Stopped:   {}", stopped.to_rfc3339());
        }
        if let Some(error) = &w.error {
            let _ = writeln!(out, "Error:     {}", error);
        }
        out.push_str("---\n");
    }
    out
}

/// Output of `stop --force`
pub fn stop_report(report: &StopReport) -> String {
    let mut out = String::new();
    for id in &report.stopped {
        let _ = writeln!(out, "✓ Stopped {}", id);
    }
    for (id, error) in &report.failures {
        let _ = writeln!(out, "✗ {}: {}", id, error);
    }
    if report.stopped.is_empty() && report.failures.is_empty() {
        out.push_str("No running workers\n");
    }
    out
}

/// Output of `cleanup`
pub fn cleanup_report(report: &CleanupReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Killed {} sessions", report.sessions.removed.len());
    let _ = writeln!(
        out,
        "Removed {} worktrees/branches",
        report.sandboxes.removed.len()
    );
    for failure in &report.combined().failures {
        let _ = writeln!(out, "✗ {}: {}", failure.target, failure.error);
    }
    if report.is_clean() {
        out.push_str("✓ Cleanup complete\n");
    } else {
        out.push_str("Cleanup finished with failures; re-run to retry\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use codex_agent_task::WorkerRecord;

    fn run() -> RunState {
        let mut run = RunState::new("run-20240501-120000-000", "/repo", "repo");
        let mut ok = WorkerRecord::starting("t1", "tasks/a.md", "codex-repo-t1", "/wt/t1", "codex/t1");
        ok.mark_running().unwrap();
        let mut bad = WorkerRecord::starting("t2", "tasks/b.md", "codex-repo-t2", "/wt/t2", "codex/t2");
        bad.mark_failed("Sandbox already exists: /wt/t2").unwrap();
        run.workers = vec![ok, bad];
        run
    }

    #[test]
    fn test_start_summary() {
        let out = start_summary(&run());
        assert!(out.contains("Run ID: run-20240501-120000-000"));
        assert!(out.contains("1 running, 1 failed"));
        assert!(out.contains("(Sandbox already exists: /wt/t2)"));
    }

    #[test]
    fn test_stop_report_lists_failures() {
        let report = StopReport {
            stopped: vec!["t1".to_string()],
            failures: vec![("t2".to_string(), "Session not found".to_string())],
        };
        let out = stop_report(&report);
        assert!(out.contains("✓ Stopped t1"));
        assert!(out.contains("✗ t2: Session not found"));
    }

    #[test]
    fn test_cleanup_report_clean() {
        let out = cleanup_report(&CleanupReport::default());
        assert!(out.contains("Killed 0 sessions"));
        assert!(out.contains("✓ Cleanup complete"));
    }

    #[test]
    fn test_cleanup_report_lists_failures() {
        let mut report = CleanupReport::default();
        report.sessions.record_failure("codex-repo-t1", "server exited");
        report.sandboxes.record_removed("/repo/.codex-agent/worktrees/t2");
        report.sandboxes.record_failure("codex/t2", "branch is checked out");

        let out = cleanup_report(&report);
        assert!(out.contains("✗ codex-repo-t1: server exited"));
        assert!(out.contains("✗ codex/t2: branch is checked out"));
        assert!(out.contains("re-run to retry"));
    }
}
