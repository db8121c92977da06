//! # Repo Overlay Library
//!
//! This library provides the core functionality for keeping a fleet of
//! package repositories aligned with a shared set of template files. It is
//! designed to be used by the `repo-overlay` command-line tool but can also
//! be embedded in other automation that manages many checkouts at once.
//!
//! ## Quick Example
//!
//! ```
//! use repo_overlay::config::{expand_tilde, Settings};
//! use repo_overlay::target::PackageManager;
//!
//! // Settings resolve `~` and carry the fixed publish parameters.
//! let settings = Settings::new("/srv/fleet", "/srv/fleet-templates");
//! assert_eq!(settings.root, expand_tilde("/srv/fleet"));
//! assert_eq!(settings.primary_branch, "main");
//!
//! // Targets are classified by the lockfile they carry.
//! assert!(PackageManager::Pnpm.is_pnpm());
//! assert_eq!(PackageManager::Npm.to_string(), "npm");
//! ```
//!
//! ## Core Concepts
//!
//! The library is built around a few key concepts:
//!
//! - **Settings and Templates (`config`)**: Resolves the fleet root and the
//!   template directory, and loads the template store (overlay directories,
//!   the removal list, and the manifest fields to pin).
//! - **Targets (`target`)**: Enumerates the immediate children of the fleet
//!   root and classifies each one as an npm or pnpm project by probing for
//!   its lockfile.
//! - **Overlays (`overlay`)**: Removes denylisted paths and copies template
//!   files into a target, with the alternate overlay layered on top for pnpm
//!   projects. Also computes read-only plans of what a sync would do.
//! - **Manifests (`manifest`)**: Shallow-merges the pinned fields into each
//!   target's `package.json` and normalizes its formatting.
//! - **Publishing (`publish`, `git`)**: Guards each target (right branch,
//!   clean tree, up to date with its remote) and then commits and pushes
//!   whatever the sync changed.
//! - **Pipeline (`pipeline`)**: Composes the per-target steps into the three
//!   flows the CLI exposes.
//!
//! ## Execution Flow
//!
//! A sync of one target runs these steps in order:
//!
//! 1.  **Detect**: Classify the target by the presence of `pnpm-lock.yaml`.
//! 2.  **Remove**: Delete every denylisted path that exists.
//! 3.  **Base overlay**: Copy the base overlay over the target.
//! 4.  **Alternate overlay**: For pnpm targets, copy the alternate overlay
//!     on top of the base one.
//! 5.  **Manifest merge**: Rewrite `package.json` with the pinned fields.
//!
//! The publish flow wraps the same steps with a git guard in front (branch,
//! cleanliness, fetch, pull) and a commit-and-push behind, skipping the
//! commit when the sync turned out to be a no-op. Targets are always
//! processed sequentially in lexicographic order, and the first failure
//! aborts the run.

pub mod config;
pub mod error;
pub mod git;
pub mod manifest;
pub mod output;
pub mod overlay;
pub mod pipeline;
pub mod publish;
pub mod target;

#[cfg(test)]
mod overlay_proptest;
