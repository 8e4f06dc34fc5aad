//! CLI integration tests against the built binary
//!
//! `cargo test -p codex-agent-cli --test cli_test`
//!
//! The end-to-end flow needs `git` and `tmux`; it skips itself otherwise.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use std::thread::sleep;
use std::time::Duration;
use tempfile::TempDir;

fn codex_agent(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_codex-agent"))
        .args(args)
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run codex-agent")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn tool_available(tool: &str) -> bool {
    which::which(tool).is_ok()
}

fn git(cwd: &Path, args: &[&str]) {
    let output = Command::new("git").args(args).current_dir(cwd).output().unwrap();
    assert!(output.status.success(), "git {:?}: {}", args, stderr(&output));
}

fn init_repo() -> TempDir {
    let dir = TempDir::new().unwrap();
    git(dir.path(), &["init", "-q"]);
    git(dir.path(), &["config", "user.email", "test@example.com"]);
    git(dir.path(), &["config", "user.name", "Test"]);
    git(dir.path(), &["config", "commit.gpgsign", "false"]);
    fs::write(dir.path().join("README.md"), "hello\n").unwrap();
    fs::write(dir.path().join(".gitignore"), ".codex-agent/\n").unwrap();
    git(dir.path(), &["add", "."]);
    git(dir.path(), &["commit", "-q", "-m", "initial"]);
    dir
}

#[test]
fn test_init_outside_repository() {
    let dir = TempDir::new().unwrap();
    let output = codex_agent(dir.path(), &["init"]);

    assert!(output.status.success(), "{}", stderr(&output));
    assert!(dir.path().join("tasks.yaml").exists());
    assert!(dir.path().join("tasks/task-1-auth.md").exists());
    assert!(dir.path().join(".codex-agent/config.json").exists());
    assert!(stdout(&output).contains("Created tasks.yaml"));
}

#[test]
fn test_commands_require_repository() {
    if !tool_available("git") {
        return;
    }
    let dir = TempDir::new().unwrap();
    let output = codex_agent(dir.path(), &["status"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Not a git repository"));
}

#[test]
fn test_guards_on_destructive_commands() {
    if !tool_available("git") {
        return;
    }
    let repo = init_repo();

    let output = codex_agent(repo.path(), &["status"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("No active run"));

    let output = codex_agent(repo.path(), &["cleanup"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("--force"));

    let output = codex_agent(repo.path(), &["stop"]);
    assert_eq!(output.status.code(), Some(1));

    let output = codex_agent(repo.path(), &["send", "t1", "hello"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("No active run"));
}

#[test]
fn test_start_rejects_invalid_manifest() {
    if !tool_available("git") {
        return;
    }
    let repo = init_repo();
    fs::write(
        repo.path().join("tasks.yaml"),
        "tasks:\n  - id: t1\n    file: tasks/missing.md\n",
    )
    .unwrap();

    let output = codex_agent(repo.path(), &["start", "--tasks", "tasks.yaml"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("tasks/missing.md"));
    assert!(!repo.path().join(".codex-agent/state.json").exists());
}

#[test]
fn test_end_to_end_with_stub_agent() {
    if !tool_available("git") || !tool_available("tmux") {
        return;
    }
    let repo = init_repo();
    assert!(codex_agent(repo.path(), &["init"]).status.success());

    // `cat` stands in for the agent: it prints the prompt and exits
    fs::write(
        repo.path().join(".codex-agent/config.json"),
        r#"{"agentCommand": "cat", "restartDelayMs": 100}"#,
    )
    .unwrap();

    let output = codex_agent(repo.path(), &["start", "--tasks", "tasks.yaml"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("2 running, 0 failed"));

    let output = codex_agent(repo.path(), &["status", "--json"]);
    let status: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(status["workers"][0]["status"], "running");
    assert_eq!(status["workers"][0]["sandboxPresent"], true);

    sleep(Duration::from_millis(500));
    let output = codex_agent(repo.path(), &["logs", "task-1", "--lines", "200"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("Add User Authentication"));

    let worktree = repo.path().join(".codex-agent/worktrees/task-1");
    fs::write(worktree.join("NOTES.md"), "notes\n").unwrap();
    let output = codex_agent(repo.path(), &["diff", "task-1", "--stat"]);
    assert!(stdout(&output).contains("Untracked files:"));
    assert!(stdout(&output).contains("NOTES.md"));

    let output = codex_agent(repo.path(), &["send", "task-1", "echo follow-up"]);
    assert!(output.status.success(), "{}", stderr(&output));

    let output = codex_agent(repo.path(), &["stop", "task-1"]);
    assert!(stdout(&output).contains("stopped"));

    let output = codex_agent(repo.path(), &["send", "task-1", "more"]);
    assert_eq!(output.status.code(), Some(1));

    let output = codex_agent(repo.path(), &["cleanup", "--force"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(!worktree.exists());
    assert!(!repo.path().join(".codex-agent/state.json").exists());
}
