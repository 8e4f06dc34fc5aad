//! codex-agent init command
//!
//! Scaffolds an example manifest, two task prompts and the project config.

use codex_agent_core::GitOps;
use codex_agent_foundation::{ControlDir, OrchestratorConfig, CONFIG_FILE};
use std::fs;
use std::path::{Path, PathBuf};

const TASK_AUTH: &str = r#"# Add User Authentication

Implement user authentication with the following requirements:
- Add login and registration endpoints
- Use JWT tokens for authentication
- Add middleware to protect routes
- Include password hashing with bcrypt
"#;

const TASK_DOCS: &str = r#"# Create API Documentation

Generate API documentation with the following requirements:
- Document all endpoints
- Include request/response examples
- Add authentication requirements
- Use OpenAPI/Swagger format
"#;

const MANIFEST: &str = r#"tasks:
  - id: task-1
    file: tasks/task-1-auth.md
    description: Add user authentication

  - id: task-2
    file: tasks/task-2-docs.md
    description: Create API documentation
"#;

/// Initialize at the repository root, or `cwd` outside a repository
pub fn init_project(cwd: &Path, force: bool) -> anyhow::Result<()> {
    let root = GitOps::toplevel(cwd).unwrap_or_else(|_| cwd.to_path_buf());
    println!("Initializing codex-agent in {}...", root.display());

    let created = scaffold(&root, force)?;
    for path in &created {
        let shown = path.strip_prefix(&root).unwrap_or(path);
        println!("  Created {}", shown.display());
    }
    if created.is_empty() {
        println!("  Nothing to do; use --force to overwrite existing files.");
    }

    println!("\n✓ codex-agent initialized!");
    println!("\nNext steps:");
    println!("  1. Edit tasks.yaml and the files under tasks/");
    println!("  2. Run 'codex-agent start --tasks tasks.yaml'");

    Ok(())
}

/// Write the example files, returning the ones written
fn scaffold(root: &Path, force: bool) -> anyhow::Result<Vec<PathBuf>> {
    let mut created = Vec::new();
    fs::create_dir_all(root.join("tasks"))?;

    let files = [
        (root.join("tasks/task-1-auth.md"), TASK_AUTH),
        (root.join("tasks/task-2-docs.md"), TASK_DOCS),
        (root.join("tasks.yaml"), MANIFEST),
    ];
    for (path, content) in files {
        if path.exists() && !force {
            continue;
        }
        fs::write(&path, content)?;
        created.push(path);
    }

    let config_path = ControlDir::new(root).root().join(CONFIG_FILE);
    if force || !config_path.exists() {
        OrchestratorConfig::default().save_project(root)?;
        created.push(config_path);
    }

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use codex_agent_task::ManifestResolver;
    use tempfile::TempDir;

    #[test]
    fn test_scaffold_creates_valid_manifest() {
        let dir = TempDir::new().unwrap();
        let created = scaffold(dir.path(), false).unwrap();
        assert_eq!(created.len(), 4);

        let tasks = ManifestResolver::new(dir.path())
            .load(Path::new("tasks.yaml"))
            .unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].id, "task-1");

        let config = OrchestratorConfig::load_layers(
            None,
            &codex_agent_foundation::JsonStore::new(ControlDir::new(dir.path()).root()),
        )
        .unwrap();
        assert_eq!(config, OrchestratorConfig::default());
    }

    #[test]
    fn test_scaffold_keeps_existing_without_force() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("tasks.yaml"), "tasks: []\n").unwrap();

        let created = scaffold(dir.path(), false).unwrap();
        assert!(!created.contains(&dir.path().join("tasks.yaml")));
        assert_eq!(
            fs::read_to_string(dir.path().join("tasks.yaml")).unwrap(),
            "tasks: []\n"
        );

        let created = scaffold(dir.path(), true).unwrap();
        assert_eq!(created.len(), 4);
        assert_eq!(
            fs::read_to_string(dir.path().join("tasks.yaml")).unwrap(),
            MANIFEST
        );
    }
}
