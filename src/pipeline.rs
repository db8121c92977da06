//! # Per-Target Pipeline
//!
//! Stage compositions for a single target. The commands enumerate the fleet
//! and drive these one target at a time, strictly in order; the first `Err`
//! anywhere aborts the whole run, leaving later targets untouched and the
//! current one possibly half-written. There is no rollback.
//!
//! Three compositions exist:
//!
//! - [`sync_target`]: overlay sync then manifest merge (the plain variant).
//! - [`publish_target`]: the same, wrapped in the publish guard.
//! - [`plan_target`]: the read-only variant behind the `status` command.

use crate::config::{Settings, TemplateStore};
use crate::error::Result;
use crate::manifest;
use crate::overlay::{self, PlannedChange, SyncStats};
use crate::publish::{self, PublishOutcome};
use crate::target::Target;

/// Result of the sync and merge stages for one target.
#[derive(Debug, Clone, Copy)]
pub struct SyncOutcome {
    /// Overlay stage counters and verdict.
    pub overlay: SyncStats,
    /// Whether the manifest file was rewritten.
    pub manifest_changed: bool,
}

impl SyncOutcome {
    /// Whether anything about the target changed.
    pub fn is_changed(&self) -> bool {
        self.overlay.changed || self.manifest_changed
    }
}

/// Result of a guarded publish pass over one target.
#[derive(Debug, Clone, Copy)]
pub struct PublishReport {
    /// What the sync and merge stages did.
    pub sync: SyncOutcome,
    /// Whether the guard committed and pushed, or skipped.
    pub outcome: PublishOutcome,
}

/// Pending changes for one target, computed without writing.
#[derive(Debug, Clone)]
pub struct TargetPlan {
    /// Overlay differences, removals first, then writes sorted by path.
    pub changes: Vec<PlannedChange>,
    /// Whether the manifest would be rewritten.
    pub manifest_changed: bool,
}

impl TargetPlan {
    /// Whether the target already matches the template store.
    pub fn is_in_sync(&self) -> bool {
        self.changes.is_empty() && !self.manifest_changed
    }

    /// Number of pending changes, the manifest counted as one.
    pub fn pending(&self) -> usize {
        self.changes.len() + usize::from(self.manifest_changed)
    }
}

/// Run the mutating stages for one target: overlay sync, then manifest
/// merge.
pub fn sync_target(target: &Target, store: &TemplateStore) -> Result<SyncOutcome> {
    let overlay = overlay::sync(&target.path, store, target.package_manager)?;
    let manifest_changed = manifest::apply(&target.path, store, target.package_manager)?;
    Ok(SyncOutcome {
        overlay,
        manifest_changed,
    })
}

/// Run one target under the publish guard: preflight, mutate, finalize.
pub fn publish_target(
    target: &Target,
    settings: &Settings,
    store: &TemplateStore,
) -> Result<PublishReport> {
    publish::preflight(target, settings)?;
    let sync = sync_target(target, store)?;
    let outcome = publish::finalize(target, settings)?;
    Ok(PublishReport { sync, outcome })
}

/// Compute a target's pending changes without mutating it.
pub fn plan_target(target: &Target, store: &TemplateStore) -> Result<TargetPlan> {
    let changes = overlay::plan(&target.path, store, target.package_manager)?;
    let manifest_changed =
        manifest::merge(&target.path, store, target.package_manager)?.is_changed();
    Ok(TargetPlan {
        changes,
        manifest_changed,
    })
}
