//! tmux session adapter

use super::{session_prefix, session_safe, SessionAdapter};
use crate::TeardownReport;
use codex_agent_foundation::{Error, Result};
use std::path::Path;
use std::process::Command;
use tracing::{debug, warn};

/// Session option carrying the owning repository root
pub const ROOT_OPTION: &str = "@codex-agent-root";

/// Sessions named `<prefix>-<repo>-<taskId>`, tagged with the repository root
pub struct TmuxAdapter {
    prefix: String,
    repo_root: String,
}

impl TmuxAdapter {
    pub fn new(session_prefix_name: &str, repo_name: &str, repo_root: &Path) -> Self {
        Self {
            prefix: session_prefix(session_prefix_name, repo_name),
            repo_root: repo_root.to_string_lossy().to_string(),
        }
    }

    /// Whether a tmux binary is on PATH
    pub fn available() -> bool {
        which::which("tmux").is_ok()
    }

    fn run_tmux(&self, args: &[&str]) -> Result<String> {
        debug!("tmux {}", args.join(" "));
        let output = Command::new("tmux")
            .args(args)
            .output()
            .map_err(|e| Error::tool("tmux", args, e.to_string()))?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(Error::tool("tmux", args, stderr.trim()))
        }
    }

    fn session_exists(&self, name: &str) -> bool {
        let target = format!("={}", name);
        Command::new("tmux")
            .args(["has-session", "-t", &target])
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn require_session(&self, task_id: &str) -> Result<String> {
        let name = self.session_name(task_id);
        if !self.session_exists(&name) {
            return Err(Error::SessionNotFound(name));
        }
        Ok(name)
    }

    fn kill_session(&self, name: &str) -> Result<()> {
        let target = format!("={}", name);
        self.run_tmux(&["kill-session", "-t", &target])?;
        Ok(())
    }
}

impl SessionAdapter for TmuxAdapter {
    fn session_name(&self, task_id: &str) -> String {
        format!("{}{}", self.prefix, session_safe(task_id))
    }

    fn exists(&self, task_id: &str) -> bool {
        self.session_exists(&self.session_name(task_id))
    }

    fn create(&self, task_id: &str, cwd: &Path) -> Result<String> {
        let name = self.session_name(task_id);
        if self.session_exists(&name) {
            return Err(Error::SessionAlreadyExists(name));
        }

        let cwd = cwd.to_string_lossy();
        self.run_tmux(&["new-session", "-d", "-s", &name, "-c", &cwd])?;

        // Untagged sessions are invisible to discovery, so never keep one
        let tagged = self.run_tmux(&["set-option", "-t", &name, ROOT_OPTION, &self.repo_root]);
        if let Err(e) = tagged {
            let _ = self.kill_session(&name);
            return Err(e);
        }
        debug!(session = %name, root = %self.repo_root, "session created");
        Ok(name)
    }

    fn send_text(&self, task_id: &str, text: &str) -> Result<()> {
        let name = self.require_session(task_id)?;
        if !text.is_empty() {
            self.run_tmux(&["send-keys", "-t", &name, "-l", "--", text])?;
        }
        self.run_tmux(&["send-keys", "-t", &name, "Enter"])?;
        Ok(())
    }

    fn interrupt(&self, task_id: &str) -> Result<()> {
        let name = self.require_session(task_id)?;
        self.run_tmux(&["send-keys", "-t", &name, "C-c"])?;
        Ok(())
    }

    fn capture(&self, task_id: &str, lines: Option<u32>) -> Result<String> {
        if lines == Some(0) {
            return Err(Error::InvalidArgument(
                "lines must be a positive integer".to_string(),
            ));
        }
        let name = self.require_session(task_id)?;

        match lines {
            Some(n) => {
                let start = format!("-{}", n);
                let output =
                    self.run_tmux(&["capture-pane", "-p", "-t", &name, "-S", &start])?;
                Ok(tail_lines(&output, n as usize))
            }
            None => self.run_tmux(&["capture-pane", "-p", "-t", &name]),
        }
    }

    fn kill(&self, task_id: &str) -> Result<()> {
        let name = self.session_name(task_id);
        if !self.session_exists(&name) {
            return Ok(());
        }
        self.kill_session(&name)
    }

    fn list_managed(&self) -> Result<Vec<String>> {
        let format = format!("#{{session_name}}\t#{{{}}}", ROOT_OPTION);
        let output = Command::new("tmux")
            .args(["list-sessions", "-F", &format])
            .output();

        let output = match output {
            Ok(o) if o.status.success() => o,
            // No tmux binary or no server running
            _ => return Ok(Vec::new()),
        };

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter_map(|line| line.split_once('\t'))
            .filter(|(name, root)| name.starts_with(&self.prefix) && *root == self.repo_root)
            .map(|(name, _)| name.to_string())
            .collect())
    }

    fn kill_all(&self) -> TeardownReport {
        let mut report = TeardownReport::new();

        let sessions = match self.list_managed() {
            Ok(sessions) => sessions,
            Err(e) => {
                warn!(error = %e, "failed to list sessions");
                report.record_failure(self.prefix.clone(), e);
                return report;
            }
        };

        for session in sessions {
            match self.kill_session(&session) {
                Ok(()) => report.record_removed(session),
                Err(e) => {
                    warn!(session = %session, error = %e, "failed to kill session");
                    report.record_failure(session, e);
                }
            }
        }

        report
    }
}

/// Last `n` lines, ignoring trailing blank padding of the pane
fn tail_lines(output: &str, n: usize) -> String {
    let lines: Vec<&str> = output.lines().collect();
    let end = lines
        .iter()
        .rposition(|l| !l.trim().is_empty())
        .map(|i| i + 1)
        .unwrap_or(0);
    let start = end.saturating_sub(n);
    let mut out = lines[start..end].join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;
    use tempfile::TempDir;

    fn adapter(dir: &TempDir) -> TmuxAdapter {
        let repo = dir.path().file_name().unwrap().to_string_lossy().to_string();
        TmuxAdapter::new("codex-test", &repo, dir.path())
    }

    #[test]
    fn test_session_name() {
        let tmux = TmuxAdapter::new("codex", "my.repo", Path::new("/repo/my.repo"));
        assert_eq!(tmux.session_name("t1"), "codex-my_repo-t1");
    }

    #[test]
    fn test_tail_lines() {
        assert_eq!(tail_lines("a\nb\nc\n\n\n", 2), "b\nc\n");
        assert_eq!(tail_lines("a\n", 5), "a\n");
        assert_eq!(tail_lines("\n\n", 3), "");
    }

    #[test]
    fn test_capture_zero_lines_invalid() {
        let tmux = TmuxAdapter::new("codex", "repo", Path::new("/repo"));
        let err = tmux.capture("t1", Some(0)).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_capture_missing_session() {
        let tmux = TmuxAdapter::new("codex", "no-such-repo-for-tests", Path::new("/nowhere"));
        let err = tmux.capture("missing-worker", Some(10)).unwrap_err();
        assert!(matches!(err, Error::SessionNotFound(_)));
    }

    #[test]
    fn test_kill_missing_is_noop() {
        let tmux = TmuxAdapter::new("codex", "no-such-repo-for-tests", Path::new("/nowhere"));
        tmux.kill("missing-worker").unwrap();
    }

    #[test]
    fn test_session_lifecycle() {
        if !TmuxAdapter::available() {
            return;
        }
        let dir = TempDir::new().unwrap();
        let tmux = adapter(&dir);

        tmux.create("t1", dir.path()).unwrap();
        assert!(tmux.exists("t1"));
        assert!(matches!(
            tmux.create("t1", dir.path()),
            Err(Error::SessionAlreadyExists(_))
        ));

        tmux.send_text("t1", "echo 'quoted \"text\" `tick`'").unwrap();
        sleep(Duration::from_millis(300));
        let output = tmux.capture("t1", Some(50)).unwrap();
        assert!(output.contains("quoted \"text\" `tick`"));

        assert_eq!(tmux.list_managed().unwrap(), vec![tmux.session_name("t1")]);

        let report = tmux.kill_all();
        assert!(report.is_clean());
        assert!(!tmux.exists("t1"));
    }

    #[test]
    fn test_kill_all_spares_other_repository() {
        if !TmuxAdapter::available() {
            return;
        }
        let parent = TempDir::new().unwrap();
        let app_root = parent.path().join("app");
        let web_root = parent.path().join("app-web");
        std::fs::create_dir_all(&app_root).unwrap();
        std::fs::create_dir_all(&web_root).unwrap();

        // "codex-test-app-" is a string prefix of "codex-test-app-web-t1"
        let app = TmuxAdapter::new("codex-test", "app", &app_root);
        let web = TmuxAdapter::new("codex-test", "app-web", &web_root);

        app.create("t1", &app_root).unwrap();
        web.create("t1", &web_root).unwrap();
        assert_eq!(app.list_managed().unwrap(), vec![app.session_name("t1")]);

        let report = app.kill_all();
        assert!(report.is_clean());
        assert!(!app.exists("t1"));
        assert!(web.exists("t1"));

        web.kill("t1").unwrap();
    }
}
