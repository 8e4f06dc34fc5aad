//! codex-agent CLI - Main entry point

mod init;
mod render;

use anyhow::bail;
use clap::{Parser, Subcommand};
use codex_agent_core::{Repository, TmuxAdapter};
use codex_agent_foundation::{Error, OrchestratorConfig};
use codex_agent_task::{CleanupReport, ManifestResolver, WorkerOrchestrator, WorkerStatus};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// codex-agent - run coding-agent workers in git worktrees and tmux sessions
#[derive(Parser, Debug)]
#[command(name = "codex-agent")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate an example manifest, task files and project config
    Init {
        /// Overwrite existing files
        #[arg(short, long)]
        force: bool,
    },
    /// Start one worker per task in the manifest
    ///
    /// The run state file is not locked: run one codex-agent command at a
    /// time per repository, or the last write wins.
    Start {
        /// Path to the task manifest (YAML)
        #[arg(short, long)]
        tasks: PathBuf,
    },
    /// Show worker status (all or one)
    Status {
        worker_id: Option<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Capture recent output from a worker's session
    Logs {
        worker_id: String,

        /// Only the last N lines
        #[arg(short = 'n', long)]
        lines: Option<u32>,

        /// Keep ANSI escapes and control characters
        #[arg(long)]
        raw: bool,
    },
    /// Show a worker's changes against its base revision
    Diff {
        worker_id: String,

        /// Statistics only, plus untracked files
        #[arg(long)]
        stat: bool,
    },
    /// Send an instruction to a worker, relaunching the agent if needed
    Send {
        worker_id: String,
        instruction: String,
    },
    /// Interrupt one worker, or all workers with --force
    Stop {
        worker_id: Option<String>,

        /// Required to stop every worker
        #[arg(short, long)]
        force: bool,
    },
    /// Kill all sessions, remove all worktrees and clear the run state
    Cleanup {
        /// Required; cleanup is destructive
        #[arg(short, long)]
        force: bool,

        /// Keep the worker branches
        #[arg(long)]
        keep_branches: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging (stderr, so stdout stays machine-readable)
    let log_level = if args.debug { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cwd = std::env::current_dir()?;

    if let Command::Init { force } = args.command {
        return init::init_project(&cwd, force);
    }

    let repo = Repository::discover(&cwd)?;
    let config = OrchestratorConfig::load(repo.root())?;
    let orchestrator = WorkerOrchestrator::with_defaults(repo, config)?;

    match args.command {
        Command::Init { .. } => Ok(()),
        Command::Start { tasks } => start(&orchestrator, tasks),
        Command::Status { worker_id, json } => status(&orchestrator, worker_id.as_deref(), json),
        Command::Logs {
            worker_id,
            lines,
            raw,
        } => {
            let logs = orchestrator.get_logs(&worker_id, lines, raw)?;
            print!("{}", logs);
            Ok(())
        }
        Command::Diff { worker_id, stat } => {
            let diff = orchestrator.get_diff(&worker_id, stat)?;
            if diff.trim().is_empty() {
                println!("No changes in {}", worker_id);
            } else {
                print!("{}", diff);
                if !diff.ends_with('\n') {
                    println!();
                }
            }
            Ok(())
        }
        Command::Send {
            worker_id,
            instruction,
        } => {
            let outcome = orchestrator.send_instruction(&worker_id, &instruction)?;
            if outcome.restarted {
                println!("Agent was not running in {}; relaunched it", worker_id);
            }
            println!("✓ Sent instruction to {}", worker_id);
            Ok(())
        }
        Command::Stop { worker_id, force } => stop(&orchestrator, worker_id.as_deref(), force),
        Command::Cleanup {
            force,
            keep_branches,
        } => {
            if !force {
                bail!("cleanup removes every worker session and worktree; re-run with --force");
            }
            let report = orchestrator.cleanup(!keep_branches, force)?;
            print!("{}", render::cleanup_report(&report));
            ensure_cleaned(&report)
        }
    }
}

fn start(orchestrator: &WorkerOrchestrator, manifest: PathBuf) -> anyhow::Result<()> {
    let tasks = ManifestResolver::new(orchestrator.repo().root()).load(&manifest)?;
    println!("Found {} tasks", tasks.len());

    if !TmuxAdapter::available() {
        bail!("tmux was not found on PATH");
    }

    let run = orchestrator.start_workers(&tasks)?;
    print!("{}", render::start_summary(&run));

    if !run.workers.is_empty() && run.count(WorkerStatus::Failed) == run.workers.len() {
        bail!("all {} workers failed to start", run.workers.len());
    }
    Ok(())
}

fn status(
    orchestrator: &WorkerOrchestrator,
    worker_id: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let report = match orchestrator.get_status(worker_id) {
        Ok(report) => report,
        Err(Error::NoActiveRun) => {
            if json {
                println!("{}", serde_json::json!({ "runId": null, "workers": [] }));
            } else {
                println!("No active run");
            }
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render::status_report(&report));
    }
    Ok(())
}

fn stop(orchestrator: &WorkerOrchestrator, worker_id: Option<&str>, force: bool) -> anyhow::Result<()> {
    match worker_id {
        Some(id) => {
            let record = orchestrator.stop_worker(id)?;
            println!("✓ {} is {}", record.id, record.status);
            Ok(())
        }
        None if force => {
            let report = orchestrator.stop_all_workers()?;
            print!("{}", render::stop_report(&report));
            if !report.failures.is_empty() {
                bail!("{} workers could not be stopped", report.failures.len());
            }
            Ok(())
        }
        None => bail!("specify a worker id, or pass --force to stop all workers"),
    }
}

/// Every sub-failure has been reported; the exit status still reflects it
fn ensure_cleaned(report: &CleanupReport) -> anyhow::Result<()> {
    let failures = report.combined().failures.len();
    if failures > 0 {
        bail!("{} resources could not be cleaned up", failures);
    }
    Ok(())
}
