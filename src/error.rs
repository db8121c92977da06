//! # Error Handling
//!
//! Centralized error type for the `repo-overlay` library, built with
//! `thiserror`. Every variant is fatal: the run aborts on the first error and
//! the binary exits non-zero, leaving later targets unprocessed. The only
//! conditions deliberately *not* represented here are the lockfile probe
//! (absence means "npm", never an error) and the no-changes-after-edit case
//! (a skip, not a failure).
//!
//! ## Taxonomy
//!
//! - Precondition failures (`Precondition`): a target was not on the primary
//!   branch or had uncommitted changes before the tool touched it.
//! - I/O failures (`Io`, `Filesystem`, `Template`, `Manifest`): unreadable
//!   fleet root, failed copy or directory creation, missing template store
//!   pieces, missing or malformed `package.json`.
//! - External command failures (`Git`): any git invocation that could not be
//!   spawned or exited non-zero.

use thiserror::Error;

/// Main error type for repo-overlay operations
#[derive(Error, Debug)]
pub enum Error {
    /// A publish precondition was violated before the target was mutated.
    ///
    /// This aborts the entire run, not just the offending target: a
    /// misconfigured repository is a situation the operator has to resolve
    /// by hand before any automated pushes are safe.
    #[error("Precondition failed for '{target}': {message}")]
    Precondition { target: String, message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A filesystem operation (enumerate, copy, create, remove) failed.
    #[error("Filesystem operation error: {message}")]
    Filesystem { message: String },

    /// The template store is incomplete or malformed.
    #[error("Template store error: {message}")]
    Template { message: String },

    /// A target's manifest is missing, unreadable, or not a JSON object.
    #[error("Manifest error for {path}: {message}")]
    Manifest { path: String, message: String },

    /// A git command failed to spawn or exited non-zero.
    #[error("Git command failed in {dir}: {command} - {stderr}")]
    Git {
        command: String,
        dir: String,
        stderr: String,
    },
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
