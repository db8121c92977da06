//! # Settings and Template Store
//!
//! Runtime configuration for repo-overlay. Two pieces live here:
//!
//! - **`Settings`**: the immutable run configuration (fleet root, template
//!   store location, primary branch, commit message). The CLI builds it once
//!   from flags and environment fallbacks and passes it by reference into
//!   every stage; there is no process-wide configuration singleton.
//!
//! - **`TemplateStore`**: the template store contents (overlay roots,
//!   denylist, manifest fields), read once at startup and immutable after.
//!
//! ## Template store layout
//!
//! ```text
//! <templates>/
//!   001-npm/                 base overlay, copied into every target
//!   002-pnpm/                alternate overlay, copied into pnpm targets
//!   files-to-delete.txt      newline-delimited relative paths to remove
//!   package-fields.json      flat JSON object merged into package.json
//! ```
//!
//! Both overlay directories and both files must exist; a store missing any
//! piece fails the run before any target is touched.

use crate::error::{Error, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Directory name of the base overlay inside the template store.
pub const BASE_OVERLAY_DIR: &str = "001-npm";

/// Directory name of the alternate overlay applied to pnpm targets.
pub const PNPM_OVERLAY_DIR: &str = "002-pnpm";

/// Newline-delimited list of relative paths removed from each target.
pub const DENYLIST_FILE: &str = "files-to-delete.txt";

/// Flat JSON object of fields merged into each target manifest.
pub const FIELDS_FILE: &str = "package-fields.json";

/// Branch each target must be on before a publish run mutates it.
pub const DEFAULT_PRIMARY_BRANCH: &str = "main";

/// Commit message used by publish runs.
pub const COMMIT_MESSAGE: &str = "chore: sync template files";

/// Immutable configuration for a single run.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Fleet root whose immediate children are the sync targets.
    pub root: PathBuf,
    /// Template store directory.
    pub templates: PathBuf,
    /// Branch publish runs require each target to be on.
    pub primary_branch: String,
    /// Commit message for publish runs.
    pub commit_message: String,
}

impl Settings {
    /// Build settings from CLI-provided paths, expanding a leading `~`.
    pub fn new(root: &str, templates: &str) -> Self {
        Settings {
            root: expand_tilde(root),
            templates: expand_tilde(templates),
            primary_branch: DEFAULT_PRIMARY_BRANCH.to_string(),
            commit_message: COMMIT_MESSAGE.to_string(),
        }
    }
}

/// Expand a leading `~` or `~/` to the user's home directory.
///
/// Values without a leading tilde pass through untouched, as does the
/// literal value when no home directory can be determined.
pub fn expand_tilde(value: &str) -> PathBuf {
    if value == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = value.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(value)
}

/// Loaded template store contents.
///
/// Read-only after `load`: every run stage borrows the same store.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    /// Base overlay directory, applied to every target.
    pub base_overlay: PathBuf,
    /// Alternate overlay directory, applied to pnpm targets after the base.
    pub pnpm_overlay: PathBuf,
    /// Relative paths removed from each target before the overlays land.
    pub denylist: Vec<String>,
    /// Fields written over the top level of each target manifest.
    pub fields: Map<String, Value>,
}

impl TemplateStore {
    /// Load the store from a template directory.
    ///
    /// Fails when either overlay directory is missing, the denylist or
    /// fields file is unreadable, a denylist entry escapes the target
    /// (absolute or containing `..`), or the fields file does not hold a
    /// JSON object at its root.
    pub fn load(templates: &Path) -> Result<TemplateStore> {
        let base_overlay = templates.join(BASE_OVERLAY_DIR);
        if !base_overlay.is_dir() {
            return Err(Error::Template {
                message: format!(
                    "base overlay directory not found: {}",
                    base_overlay.display()
                ),
            });
        }

        let pnpm_overlay = templates.join(PNPM_OVERLAY_DIR);
        if !pnpm_overlay.is_dir() {
            return Err(Error::Template {
                message: format!(
                    "alternate overlay directory not found: {}",
                    pnpm_overlay.display()
                ),
            });
        }

        let denylist = load_denylist(&templates.join(DENYLIST_FILE))?;
        let fields = load_fields(&templates.join(FIELDS_FILE))?;

        Ok(TemplateStore {
            base_overlay,
            pnpm_overlay,
            denylist,
            fields,
        })
    }
}

/// Parse the denylist file: one relative path per line, blank lines skipped.
fn load_denylist(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|e| Error::Template {
        message: format!("failed to read denylist {}: {}", path.display(), e),
    })?;

    let mut entries = Vec::new();
    for line in content.lines() {
        let entry = line.trim();
        if entry.is_empty() {
            continue;
        }
        // Entries are removed recursively under each target; anything that
        // could resolve outside the target is rejected up front.
        let entry_path = Path::new(entry);
        if entry_path.is_absolute()
            || entry_path
                .components()
                .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(Error::Template {
                message: format!("denylist entry must stay inside the target: {}", entry),
            });
        }
        entries.push(entry.to_string());
    }
    Ok(entries)
}

/// Parse the fields file into a JSON object, preserving key order.
fn load_fields(path: &Path) -> Result<Map<String, Value>> {
    let content = fs::read_to_string(path).map_err(|e| Error::Template {
        message: format!("failed to read manifest fields {}: {}", path.display(), e),
    })?;

    let value: Value = serde_json::from_str(&content).map_err(|e| Error::Template {
        message: format!("invalid JSON in {}: {}", path.display(), e),
    })?;

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(Error::Template {
            message: format!("{} must hold a JSON object at the root", path.display()),
        }),
    }
}
