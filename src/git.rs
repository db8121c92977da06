//! # Version-Control Collaborator
//!
//! Blocking wrappers around the system `git` binary, one function per
//! operation the publish guard needs. Using the system binary means SSH
//! keys, credential helpers, and anything else in the operator's git
//! configuration just work.
//!
//! Every wrapper runs in a given working directory and returns a `Result`:
//! a command that cannot be spawned or exits non-zero becomes
//! [`Error::Git`] carrying the command line and captured stderr. There are
//! no retries and no timeouts.

use std::path::Path;
use std::process::{Command, Output};

use crate::error::{Error, Result};

/// Current branch name via `git rev-parse --abbrev-ref HEAD`, trimmed.
///
/// A detached HEAD reports the literal string `HEAD`, which callers treat
/// as a branch mismatch.
pub fn current_branch(dir: &Path) -> Result<String> {
    let output = run_checked(dir, &["rev-parse", "--abbrev-ref", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Non-empty lines of `git status --porcelain`, untracked files included.
pub fn status_lines(dir: &Path) -> Result<Vec<String>> {
    let output = run_checked(dir, &["status", "--porcelain"])?;
    Ok(String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.to_string())
        .collect())
}

/// Whether the working tree has nothing pending.
pub fn is_clean(dir: &Path) -> Result<bool> {
    Ok(status_lines(dir)?.is_empty())
}

/// `git fetch --all`.
pub fn fetch_all(dir: &Path) -> Result<()> {
    run_checked(dir, &["fetch", "--all"]).map(|_| ())
}

/// `git pull` on the current branch.
pub fn pull(dir: &Path) -> Result<()> {
    run_checked(dir, &["pull"]).map(|_| ())
}

/// Stage everything, `git add -A`.
pub fn add_all(dir: &Path) -> Result<()> {
    run_checked(dir, &["add", "-A"]).map(|_| ())
}

/// Commit staged changes with the given message.
pub fn commit(dir: &Path, message: &str) -> Result<()> {
    run_checked(dir, &["commit", "-m", message]).map(|_| ())
}

/// `git push` to the configured upstream.
pub fn push(dir: &Path) -> Result<()> {
    run_checked(dir, &["push"]).map(|_| ())
}

/// Run one git command in `dir`, capturing output.
fn run_checked(dir: &Path, args: &[&str]) -> Result<Output> {
    let command_line = format!("git {}", args.join(" "));
    log::debug!("running {} in {}", command_line, dir.display());

    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|e| Error::Git {
            command: command_line.clone(),
            dir: dir.display().to_string(),
            stderr: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Git {
            command: command_line,
            dir: dir.display().to_string(),
            stderr: stderr.trim().to_string(),
        });
    }

    Ok(output)
}
