//! # Publish Guard
//!
//! The checks wrapped around mutation during a publish run: [`preflight`]
//! before a target is touched, [`finalize`] after. The guard keeps the tool
//! from overwriting work in progress or pushing on top of a stale branch.
//!
//! Order per target: branch check, clean check, fetch, pull, then the sync
//! and merge stages run elsewhere, then the changed check picks between
//! skip and stage-commit-push. Every failure here is fatal for the whole
//! run. A misconfigured target halts the fleet rather than being skipped,
//! since it is a situation the operator has to resolve by hand.

use std::path::Path;

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::git;
use crate::target::Target;

/// What [`finalize`] did with a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Working tree identical after mutation; nothing committed or pushed.
    Unchanged,
    /// Changes staged, committed with the fixed message, and pushed.
    Pushed,
}

/// Verify a target may be mutated and bring it up to date.
///
/// Branch and tree checks run before any network operation.
pub fn preflight(target: &Target, settings: &Settings) -> Result<()> {
    let dir: &Path = &target.path;

    let branch = git::current_branch(dir)?;
    if branch != settings.primary_branch {
        return Err(Error::Precondition {
            target: target.name.clone(),
            message: format!(
                "on branch '{}', expected '{}'",
                branch, settings.primary_branch
            ),
        });
    }

    let pending = git::status_lines(dir)?;
    if !pending.is_empty() {
        return Err(Error::Precondition {
            target: target.name.clone(),
            message: format!("working tree has {} uncommitted change(s)", pending.len()),
        });
    }

    git::fetch_all(dir)?;
    git::pull(dir)?;
    Ok(())
}

/// Commit and push a mutated target, or skip it untouched.
///
/// Change detection is the porcelain status: an empty status means the
/// sync and merge stages were no-ops and the target is skipped.
pub fn finalize(target: &Target, settings: &Settings) -> Result<PublishOutcome> {
    let dir: &Path = &target.path;

    if git::is_clean(dir)? {
        log::debug!("{} clean after sync, skipping commit", target.name);
        return Ok(PublishOutcome::Unchanged);
    }

    git::add_all(dir)?;
    git::commit(dir, &settings.commit_message)?;
    git::push(dir)?;
    Ok(PublishOutcome::Pushed)
}
