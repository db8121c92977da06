//! # File Synchronizer
//!
//! Applies the template store to a single target directory in two stages,
//! always in this order:
//!
//! 1. **Denylist removal**: each denylisted relative path that exists under
//!    the target is removed, recursively for directories. Missing paths are
//!    silent no-ops. Symlinks are removed as links, never followed.
//!
//! 2. **Overlay copy**: every file of the base overlay is copied into the
//!    target at its relative path, creating parent directories as needed.
//!    Overlay entries that are symlinks are read through the link and land
//!    as regular files. For pnpm targets the alternate overlay is copied
//!    afterwards, so its files win wherever the two overlays collide.
//!
//! Copies overwrite whatever is at the destination. As an optimization a
//! destination that already matches the source, bytes and unix permission
//! bits alike, is left untouched, which keeps repeated runs from rewriting
//! identical files.
//!
//! [`plan`] is the read-only twin used by the `status` command: it reports
//! what a sync would change without touching the target.

use crate::config::TemplateStore;
use crate::error::{Error, Result};
use crate::target::PackageManager;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Counters for one target's sync, plus the net-change verdict.
///
/// `removed` and `copied` count the literal operations performed. `changed`
/// is computed up front from [`plan`]: a denylisted path the overlays
/// immediately recreate bumps both counters but is not a net change.
#[derive(Debug, Default, Clone, Copy)]
pub struct SyncStats {
    /// Paths removed by the denylist stage.
    pub removed: usize,
    /// Overlay files written into the target.
    pub copied: usize,
    /// Whether the target's content differs after the sync.
    pub changed: bool,
}

/// One difference between a target and the template store.
///
/// Paths are relative to the target directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedChange {
    /// A denylisted path that exists and would be removed.
    Remove(PathBuf),
    /// An overlay file whose destination is missing or holds different bytes.
    Write(PathBuf),
}

impl PlannedChange {
    /// The target-relative path this change touches.
    pub fn path(&self) -> &Path {
        match self {
            PlannedChange::Remove(path) => path,
            PlannedChange::Write(path) => path,
        }
    }
}

/// Synchronize one target directory with the template store.
///
/// Runs the denylist stage, then the base overlay, then (for pnpm targets)
/// the alternate overlay. The first failing operation aborts with no
/// rollback of earlier ones.
pub fn sync(target: &Path, store: &TemplateStore, manager: PackageManager) -> Result<SyncStats> {
    let planned = plan(target, store, manager)?;
    let mut stats = SyncStats {
        changed: !planned.is_empty(),
        ..Default::default()
    };

    for entry in &store.denylist {
        if remove_denylisted(&target.join(entry))? {
            stats.removed += 1;
        }
    }

    stats.copied += copy_overlay(&store.base_overlay, target)?;
    if manager.is_pnpm() {
        stats.copied += copy_overlay(&store.pnpm_overlay, target)?;
    }

    Ok(stats)
}

/// Compute the changes a [`sync`] would make, without writing anything.
///
/// Removals come first in denylist order, then writes sorted by path. A
/// denylisted path whose removal the overlay copy undoes is not reported:
/// a file an overlay ships at the same path, or a directory whose entire
/// contents sit at overlay paths. Byte and permission differences under
/// such paths still surface as writes.
pub fn plan(
    target: &Path,
    store: &TemplateStore,
    manager: PackageManager,
) -> Result<Vec<PlannedChange>> {
    let map = overlay_map(store, manager)?;
    let mut changes = Vec::new();

    for entry in &store.denylist {
        let rel = PathBuf::from(entry);
        let dest = target.join(&rel);
        let metadata = match fs::symlink_metadata(&dest) {
            Ok(m) => m,
            Err(_) => continue,
        };
        if metadata.is_file() && map.contains_key(&rel) {
            // Recreated by an overlay: equal bytes are a wash, different
            // bytes surface as the write below.
            continue;
        }
        if metadata.is_dir() && dir_rebuilt_by_overlays(&dest, &rel, &map)? {
            // Same wash when the overlays rebuild the whole directory.
            continue;
        }
        changes.push(PlannedChange::Remove(rel));
    }

    for (rel, src) in &map {
        let dest = target.join(rel);
        if differs(src, &dest)? {
            changes.push(PlannedChange::Write(rel.clone()));
        }
    }

    Ok(changes)
}

/// Effective overlay contents as relative path -> source file.
///
/// Base overlay entries first, alternate overlay entries overwriting them,
/// matching the copy order of [`sync`].
fn overlay_map(
    store: &TemplateStore,
    manager: PackageManager,
) -> Result<BTreeMap<PathBuf, PathBuf>> {
    let mut map = BTreeMap::new();
    collect_overlay(&store.base_overlay, &mut map)?;
    if manager.is_pnpm() {
        collect_overlay(&store.pnpm_overlay, &mut map)?;
    }
    Ok(map)
}

fn collect_overlay(overlay: &Path, map: &mut BTreeMap<PathBuf, PathBuf>) -> Result<()> {
    for entry in WalkDir::new(overlay).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::Filesystem {
            message: format!("failed to walk overlay {}: {}", overlay.display(), e),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry.path().strip_prefix(overlay).map_err(|_| Error::Filesystem {
            message: format!("overlay entry escapes its root: {}", entry.path().display()),
        })?;
        map.insert(rel.to_path_buf(), entry.path().to_path_buf());
    }
    Ok(())
}

/// Whether removing a denylisted directory is undone by the overlay copy.
///
/// True when every file under the directory sits at an overlay path, so the
/// copy stage recreates the same tree. Symlinks, special files, and
/// directories holding no files are never recreated, so their presence keeps
/// the removal a real change. Byte and permission differences are left to
/// the per-file comparison.
fn dir_rebuilt_by_overlays(
    dest: &Path,
    rel: &Path,
    map: &BTreeMap<PathBuf, PathBuf>,
) -> Result<bool> {
    let mut fileless_dirs = BTreeSet::new();
    for entry in WalkDir::new(dest) {
        let entry = entry.map_err(|e| Error::Filesystem {
            message: format!("failed to walk {}: {}", dest.display(), e),
        })?;
        if entry.file_type().is_symlink() {
            return Ok(false);
        }
        let entry_rel = entry.path().strip_prefix(dest).map_err(|_| Error::Filesystem {
            message: format!("walk entry escapes its root: {}", entry.path().display()),
        })?;
        if entry.file_type().is_dir() {
            if !entry_rel.as_os_str().is_empty() {
                fileless_dirs.insert(entry_rel.to_path_buf());
            }
            continue;
        }
        if !entry.file_type().is_file() {
            return Ok(false);
        }
        if !map.contains_key(&rel.join(entry_rel)) {
            return Ok(false);
        }
        for ancestor in entry_rel.ancestors().skip(1) {
            fileless_dirs.remove(ancestor);
        }
    }
    Ok(fileless_dirs.is_empty())
}

/// Remove one denylisted path. Returns whether anything was removed.
fn remove_denylisted(dest: &Path) -> Result<bool> {
    let metadata = match fs::symlink_metadata(dest) {
        Ok(m) => m,
        Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
            return Ok(false);
        }
        Err(e) => {
            return Err(Error::Filesystem {
                message: format!("failed to inspect {}: {}", dest.display(), e),
            });
        }
    };

    // symlink_metadata reports the link itself, so a symlink to a directory
    // takes the remove_file branch and only the link goes away.
    let result = if metadata.is_dir() {
        fs::remove_dir_all(dest)
    } else {
        fs::remove_file(dest)
    };
    result.map_err(|e| Error::Filesystem {
        message: format!("failed to remove {}: {}", dest.display(), e),
    })?;

    log::debug!("removed {}", dest.display());
    Ok(true)
}

/// Copy every file of one overlay into the target. Returns the number of
/// files actually written.
fn copy_overlay(overlay: &Path, target: &Path) -> Result<usize> {
    let mut copied = 0;
    for entry in WalkDir::new(overlay).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::Filesystem {
            message: format!("failed to walk overlay {}: {}", overlay.display(), e),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry.path().strip_prefix(overlay).map_err(|_| Error::Filesystem {
            message: format!("overlay entry escapes its root: {}", entry.path().display()),
        })?;
        let dest = target.join(rel);
        if copy_file(entry.path(), &dest)? {
            log::debug!("wrote {}", dest.display());
            copied += 1;
        }
    }
    Ok(copied)
}

/// Copy one file, creating parent directories. Returns `false` when the
/// destination already matches the source and was left alone.
fn copy_file(src: &Path, dest: &Path) -> Result<bool> {
    let content = fs::read(src).map_err(|e| Error::Filesystem {
        message: format!("failed to read template file {}: {}", src.display(), e),
    })?;

    if let Ok(existing) = fs::read(dest) {
        if existing == content && !mode_differs(src, dest)? {
            return Ok(false);
        }
    }

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::Filesystem {
            message: format!("failed to create directory {}: {}", parent.display(), e),
        })?;
    }

    fs::write(dest, &content).map_err(|e| Error::Filesystem {
        message: format!("failed to write {}: {}", dest.display(), e),
    })?;

    // Carry the source mode so template scripts stay executable.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(src)
            .map_err(|e| Error::Filesystem {
                message: format!("failed to stat template file {}: {}", src.display(), e),
            })?
            .permissions()
            .mode();
        fs::set_permissions(dest, fs::Permissions::from_mode(mode)).map_err(|e| {
            Error::Filesystem {
                message: format!("failed to set permissions on {}: {}", dest.display(), e),
            }
        })?;
    }

    Ok(true)
}

/// Whether a destination is missing or differs from its source.
///
/// Bytes are compared first, then the unix permission bits. An unreadable
/// source is fatal; an unreadable destination counts as differing and gets
/// resolved by the actual write.
fn differs(src: &Path, dest: &Path) -> Result<bool> {
    let source = fs::read(src).map_err(|e| Error::Filesystem {
        message: format!("failed to read template file {}: {}", src.display(), e),
    })?;
    match fs::read(dest) {
        Ok(existing) => {
            if existing != source {
                return Ok(true);
            }
            mode_differs(src, dest)
        }
        Err(_) => Ok(true),
    }
}

/// Whether the permission bits of two files disagree.
#[cfg(unix)]
fn mode_differs(src: &Path, dest: &Path) -> Result<bool> {
    use std::os::unix::fs::PermissionsExt;

    let src_mode = fs::metadata(src)
        .map_err(|e| Error::Filesystem {
            message: format!("failed to stat template file {}: {}", src.display(), e),
        })?
        .permissions()
        .mode();
    let dest_mode = fs::metadata(dest)
        .map_err(|e| Error::Filesystem {
            message: format!("failed to inspect {}: {}", dest.display(), e),
        })?
        .permissions()
        .mode();
    Ok(src_mode & 0o777 != dest_mode & 0o777)
}

#[cfg(not(unix))]
fn mode_differs(_src: &Path, _dest: &Path) -> Result<bool> {
    Ok(false)
}
