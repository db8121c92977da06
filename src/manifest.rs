//! # Manifest Merger
//!
//! Shallow-merges the store's fixed fields into a target's `package.json`.
//!
//! The merge is a top-level overwrite: each store field replaces whatever the
//! manifest had under that key, wholesale. Nothing is merged recursively, so
//! a store field holding an object replaces the target's entire object. Keys
//! the store does not mention keep their values and their positions; new keys
//! are appended at the end.
//!
//! pnpm targets additionally get the pinned `packageManager` field. npm
//! targets never do; an existing value is left alone there.
//!
//! Output is normalized: two-space indentation and a trailing newline, key
//! order as encountered. A manifest whose only difference is formatting is
//! therefore rewritten once and stable afterwards.

use crate::config::TemplateStore;
use crate::error::{Error, Result};
use crate::target::PackageManager;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Manifest file name inside each target.
pub const MANIFEST_FILE: &str = "package.json";

/// Field pinning the package manager for pnpm targets.
pub const PACKAGE_MANAGER_FIELD: &str = "packageManager";

/// Pinned manager version written into pnpm targets.
pub const PNPM_PACKAGE_MANAGER: &str = "pnpm@9.15.0";

/// A manifest with the store fields merged in, not yet written back.
#[derive(Debug, Clone)]
pub struct MergedManifest {
    /// Path of the manifest file.
    pub path: PathBuf,
    original: String,
    rendered: String,
}

impl MergedManifest {
    /// Whether writing would change the file's bytes.
    pub fn is_changed(&self) -> bool {
        self.original != self.rendered
    }

    /// Write the merged manifest back to its file.
    pub fn write(&self) -> Result<()> {
        fs::write(&self.path, &self.rendered).map_err(|e| Error::Manifest {
            path: self.path.display().to_string(),
            message: format!("failed to write: {}", e),
        })
    }
}

/// Read a target's manifest and merge the store fields into it.
///
/// Missing file, malformed JSON, and a non-object root are all fatal.
pub fn merge(dir: &Path, store: &TemplateStore, manager: PackageManager) -> Result<MergedManifest> {
    let path = dir.join(MANIFEST_FILE);
    let original = fs::read_to_string(&path).map_err(|e| Error::Manifest {
        path: path.display().to_string(),
        message: format!("failed to read: {}", e),
    })?;

    let mut value: Value = serde_json::from_str(&original).map_err(|e| Error::Manifest {
        path: path.display().to_string(),
        message: format!("invalid JSON: {}", e),
    })?;

    let object = value.as_object_mut().ok_or_else(|| Error::Manifest {
        path: path.display().to_string(),
        message: "root is not a JSON object".to_string(),
    })?;

    for (key, field) in &store.fields {
        object.insert(key.clone(), field.clone());
    }
    if manager.is_pnpm() {
        object.insert(
            PACKAGE_MANAGER_FIELD.to_string(),
            Value::String(PNPM_PACKAGE_MANAGER.to_string()),
        );
    }

    let mut rendered = serde_json::to_string_pretty(&value).map_err(|e| Error::Manifest {
        path: path.display().to_string(),
        message: format!("failed to serialize: {}", e),
    })?;
    rendered.push('\n');

    Ok(MergedManifest {
        path,
        original,
        rendered,
    })
}

/// Merge and write in one step. Returns whether the file changed.
///
/// An already up-to-date manifest is left untouched on disk.
pub fn apply(dir: &Path, store: &TemplateStore, manager: PackageManager) -> Result<bool> {
    let merged = merge(dir, store, manager)?;
    let changed = merged.is_changed();
    if changed {
        merged.write()?;
    }
    Ok(changed)
}
