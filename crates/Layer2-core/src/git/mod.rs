//! Git Integration Module
//!
//! ## Features
//!
//! - **Discovery**: locate the repository root and its control directory
//! - **Worktrees**: add, remove, list and prune linked worktrees
//! - **Branches**: existence probe, listing by glob, force delete
//! - **Diffs**: full patch and `--stat` against `HEAD`, porcelain status

pub mod ops;
pub mod repo;

pub use ops::{FileStatus, GitOps, GitStatus, WorktreeEntry};
pub use repo::Repository;
