// src/services/sync.rs
//! Workspace sync: push local artifacts to the workspace's git remote after
//! a run that wrote something.
//!
//! Sync is an external collaborator. Its failure is reported to the
//! operator and logged, but it never rolls back or invalidates local writes
//! that already completed. A clean tree counts as success.

use anyhow::{Context, Result, bail};
use std::path::PathBuf;
use std::process::{Command, Output};

#[derive(Debug, Clone)]
pub struct WorkspaceSync {
    root: PathBuf,
}

impl WorkspaceSync {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `git add -A && git commit && git push`, best effort on the commit:
    /// "nothing to commit" is not a failure.
    pub fn push(&self, message: &str) -> Result<()> {
        let add = self.git(&["add", "-A"])?;
        if !add.status.success() {
            bail!("git add failed: {}", stderr_of(&add));
        }
        let commit = self.git(&["commit", "-m", message])?;
        if !commit.status.success() {
            let out = format!(
                "{}{}",
                String::from_utf8_lossy(&commit.stdout),
                String::from_utf8_lossy(&commit.stderr)
            );
            if out.contains("nothing to commit") {
                return Ok(());
            }
            bail!("git commit failed: {}", out.trim());
        }
        let push = self.git(&["push"])?;
        if !push.status.success() {
            bail!("git push failed: {}", stderr_of(&push));
        }
        Ok(())
    }

    fn git(&self, args: &[&str]) -> Result<Output> {
        Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()
            .with_context(|| format!("spawning git {:?}", args))
    }
}

fn stderr_of(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).trim().to_string()
}
