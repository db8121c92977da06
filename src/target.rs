//! # Target Enumeration and Detection
//!
//! The first two stages of every run live here: listing the fleet root's
//! immediate children and probing each one for its package manager.
//!
//! Enumeration returns every child sorted by name so runs are deterministic;
//! it does not filter out stray non-directory entries. A file sitting in the
//! fleet root becomes a target like any other and fails in the overlay or
//! manifest stage with a path-bearing error, which is more useful than being
//! silently skipped.
//!
//! Detection is a read probe of `pnpm-lock.yaml`. The probe never errors:
//! a missing or unreadable lockfile simply means npm.

use crate::error::{Error, Result};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Lockfile whose presence marks a target as pnpm-managed.
pub const PNPM_LOCKFILE: &str = "pnpm-lock.yaml";

/// Package manager governing a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    /// Default when no pnpm lockfile is found.
    Npm,
    /// Selected when the target has a readable `pnpm-lock.yaml`.
    Pnpm,
}

impl PackageManager {
    /// Whether the alternate overlay and the pinned manager field apply.
    pub fn is_pnpm(self) -> bool {
        matches!(self, PackageManager::Pnpm)
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageManager::Npm => write!(f, "npm"),
            PackageManager::Pnpm => write!(f, "pnpm"),
        }
    }
}

/// A single fleet member scheduled for synchronization.
#[derive(Debug, Clone)]
pub struct Target {
    /// Path of the target directory (fleet root joined with the child name).
    pub path: PathBuf,
    /// Directory name, used in progress lines and error context.
    pub name: String,
    /// Manager chosen by the lockfile probe.
    pub package_manager: PackageManager,
}

impl Target {
    /// Build a target from an enumerated child path, running the probe.
    pub fn discover(path: PathBuf) -> Target {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let package_manager = detect_package_manager(&path);
        Target {
            path,
            name,
            package_manager,
        }
    }
}

/// List the immediate children of the fleet root, sorted by name.
///
/// An unreadable root is fatal. Children are returned unfiltered; type
/// checks happen in the stages that actually touch them.
pub fn enumerate(root: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(root).map_err(|e| Error::Filesystem {
        message: format!("failed to read fleet root {}: {}", root.display(), e),
    })?;

    let mut children = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::Filesystem {
            message: format!("failed to read entry under {}: {}", root.display(), e),
        })?;
        children.push(entry.path());
    }
    children.sort();
    Ok(children)
}

/// Read probe for the pnpm lockfile.
///
/// Any failure to read the file, whatever the cause, selects npm.
pub fn detect_package_manager(dir: &Path) -> PackageManager {
    if fs::read(dir.join(PNPM_LOCKFILE)).is_ok() {
        PackageManager::Pnpm
    } else {
        PackageManager::Npm
    }
}
