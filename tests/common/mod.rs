//! Shared test utilities for integration and E2E tests.
//!
//! This module provides a fleet fixture and git helpers to reduce
//! duplication across test files.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = FleetFixture::new()
//!         .with_base_file("tsconfig.json", "{}\n")
//!         .with_project("proj-a");
//!     fixture.command("sync").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::{git, git_stdout, FleetFixture};
}

/// A test fixture holding a template store and a fleet root.
///
/// The fixture lays out the directory structure the CLI expects:
///
/// ```text
/// <temp>/templates/001-npm/         base overlay
/// <temp>/templates/002-pnpm/        alternate overlay
/// <temp>/templates/files-to-delete.txt
/// <temp>/templates/package-fields.json
/// <temp>/fleet/<project>/           one child per project
/// <temp>/remotes/<project>.git      bare remote, when requested
/// ```
///
/// Builders consume and return `self` so fixtures read as one chain.
pub struct FleetFixture {
    temp_dir: assert_fs::TempDir,
}

impl FleetFixture {
    /// Create a fixture with an empty store and an empty fleet root.
    pub fn new() -> Self {
        let temp_dir = assert_fs::TempDir::new().expect("Failed to create temp directory");
        temp_dir
            .child("templates/001-npm")
            .create_dir_all()
            .expect("Failed to create base overlay");
        temp_dir
            .child("templates/002-pnpm")
            .create_dir_all()
            .expect("Failed to create alternate overlay");
        temp_dir
            .child("templates/files-to-delete.txt")
            .write_str("")
            .expect("Failed to write denylist");
        temp_dir
            .child("templates/package-fields.json")
            .write_str("{}")
            .expect("Failed to write fields file");
        temp_dir
            .child("fleet")
            .create_dir_all()
            .expect("Failed to create fleet root");
        Self { temp_dir }
    }

    /// Add a file to the base overlay.
    pub fn with_base_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(format!("templates/001-npm/{path}"))
            .write_str(content)
            .expect("Failed to write base overlay file");
        self
    }

    /// Add a file to the alternate (pnpm) overlay.
    pub fn with_pnpm_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(format!("templates/002-pnpm/{path}"))
            .write_str(content)
            .expect("Failed to write alternate overlay file");
        self
    }

    /// Replace the denylist with the given entries.
    pub fn with_denylist(self, entries: &[&str]) -> Self {
        let mut body = entries.join("\n");
        body.push('\n');
        self.temp_dir
            .child("templates/files-to-delete.txt")
            .write_str(&body)
            .expect("Failed to write denylist");
        self
    }

    /// Replace the shared manifest fields document.
    pub fn with_fields(self, json: &str) -> Self {
        self.temp_dir
            .child("templates/package-fields.json")
            .write_str(json)
            .expect("Failed to write fields file");
        self
    }

    /// Add an npm project (a fleet child with a minimal `package.json`).
    pub fn with_project(self, name: &str) -> Self {
        let manifest = format!("{{\n  \"name\": \"{name}\",\n  \"version\": \"1.0.0\"\n}}\n");
        self.temp_dir
            .child(format!("fleet/{name}/package.json"))
            .write_str(&manifest)
            .expect("Failed to write project manifest");
        self
    }

    /// Add a pnpm project (same as [`with_project`] plus a lockfile).
    ///
    /// [`with_project`]: FleetFixture::with_project
    pub fn with_pnpm_project(self, name: &str) -> Self {
        let fixture = self.with_project(name);
        fixture
            .temp_dir
            .child(format!("fleet/{name}/pnpm-lock.yaml"))
            .write_str("lockfileVersion: '9.0'\n")
            .expect("Failed to write lockfile");
        fixture
    }

    /// Add a file to an existing project.
    pub fn with_project_file(self, project: &str, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(format!("fleet/{project}/{path}"))
            .write_str(content)
            .expect("Failed to write project file");
        self
    }

    /// Turn an existing project into a git repository tracking a local bare
    /// remote. Everything currently in the project lands in the initial
    /// commit.
    pub fn with_git_remote(self, name: &str) -> Self {
        let remote = self.remote_path(name);
        std::fs::create_dir_all(&remote).expect("Failed to create remote directory");
        git(&remote, &["init", "--bare", "-b", "main"]);

        let project = self.project_path(name);
        git(&project, &["init", "-b", "main"]);
        git(&project, &["config", "user.email", "fleet@example.com"]);
        git(&project, &["config", "user.name", "Fleet Bot"]);
        git(&project, &["add", "."]);
        git(&project, &["commit", "-m", "initial import"]);
        git(
            &project,
            &[
                "remote",
                "add",
                "origin",
                remote.to_str().expect("remote path is not UTF-8"),
            ],
        );
        git(&project, &["push", "-u", "origin", "main"]);
        self
    }

    /// Get the fleet root directory.
    pub fn root(&self) -> PathBuf {
        self.temp_dir.path().join("fleet")
    }

    /// Get the template store directory.
    pub fn templates(&self) -> PathBuf {
        self.temp_dir.path().join("templates")
    }

    /// Get a project's directory.
    pub fn project_path(&self, name: &str) -> PathBuf {
        self.root().join(name)
    }

    /// Get a project's bare remote directory.
    pub fn remote_path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join("remotes").join(format!("{name}.git"))
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a command for the given subcommand, pointed at this fixture.
    ///
    /// Ambient `REPO_OVERLAY_*` variables are cleared so the outer
    /// environment cannot leak into assertions.
    pub fn command(&self, subcommand: &str) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("repo-overlay");
        cmd.env_remove("REPO_OVERLAY_ROOT")
            .env_remove("REPO_OVERLAY_TEMPLATES")
            .arg(subcommand)
            .arg("--root")
            .arg(self.root())
            .arg("--templates")
            .arg(self.templates());
        cmd
    }
}

impl Default for FleetFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Run a git command in `dir`, panicking on failure.
pub fn git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to spawn git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Run a git command in `dir` and return its trimmed stdout.
pub fn git_stdout(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to spawn git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_store_layout() {
        let fixture = FleetFixture::new();
        assert!(fixture.templates().join("001-npm").is_dir());
        assert!(fixture.templates().join("002-pnpm").is_dir());
        assert!(fixture.templates().join("files-to-delete.txt").is_file());
        assert!(fixture.root().is_dir());
    }

    #[test]
    fn test_fixture_with_project() {
        let fixture = FleetFixture::new().with_project("proj-a");
        let manifest =
            std::fs::read_to_string(fixture.project_path("proj-a").join("package.json")).unwrap();
        assert!(manifest.contains("\"name\": \"proj-a\""));
    }

    #[test]
    fn test_fixture_with_pnpm_project() {
        let fixture = FleetFixture::new().with_pnpm_project("proj-b");
        assert!(fixture.project_path("proj-b").join("pnpm-lock.yaml").exists());
    }
}
