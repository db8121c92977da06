//! # Status Command Implementation
//!
//! This module implements the `status` subcommand, which reports which
//! repositories under the fleet root have template changes pending without
//! modifying anything.
//!
//! ## Functionality
//!
//! - **Drift Detection**: Plans the same removals, copies, and manifest
//!   merge a `sync` would apply and reports what is out of date.
//! - **Read-Only**: Never writes to a repository and never touches git.
//! - **Exit Codes**:
//!   - 0: Every repository is in sync
//!   - 1: At least one repository has pending changes
//!
//! The exit convention makes the command usable from shell hooks and CI
//! jobs that want to fail when the fleet has drifted.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use repo_overlay::config::{Settings, TemplateStore};
use repo_overlay::manifest::MANIFEST_FILE;
use repo_overlay::output::OutputConfig;
use repo_overlay::overlay::PlannedChange;
use repo_overlay::pipeline::{self, TargetPlan};
use repo_overlay::target::{self, Target};

/// Report which repositories have pending template changes
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Directory whose immediate children are the repositories to check.
    #[arg(long, value_name = "DIR", env = "REPO_OVERLAY_ROOT")]
    pub root: String,

    /// Directory holding the overlays, the removal list, and the shared
    /// manifest fields.
    #[arg(long, value_name = "DIR", env = "REPO_OVERLAY_TEMPLATES")]
    pub templates: String,

    /// List every pending change per repository.
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all output; the exit code carries the verdict.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Result of a fleet status check
#[derive(Debug)]
pub struct StatusReport {
    /// Repositories with at least one pending change.
    pub pending: usize,
    /// Repositories visited.
    pub total: usize,
}

impl StatusReport {
    /// Check whether the whole fleet is in sync
    pub fn is_in_sync(&self) -> bool {
        self.pending == 0
    }

    /// Map the verdict onto the command's exit code
    pub fn exit_code(&self) -> ExitCode {
        if self.is_in_sync() {
            ExitCode::SUCCESS
        } else {
            ExitCode::from(1)
        }
    }
}

/// Execute the `status` command.
///
/// Walks the fleet in order and plans each repository without writing.
/// The first planning failure aborts the run.
pub fn execute(args: StatusArgs, color_flag: &str) -> Result<StatusReport> {
    let out = OutputConfig::new(color_flag, args.quiet);
    let settings = Settings::new(&args.root, &args.templates);
    let store = TemplateStore::load(&settings.templates)
        .map_err(|e| anyhow::anyhow!("Failed to load templates: {}", e))?;

    let children = target::enumerate(&settings.root)
        .map_err(|e| anyhow::anyhow!("Failed to enumerate repositories: {}", e))?;

    if !args.quiet {
        println!(
            "{} Checking {} repositories in {}",
            out.emoji("🔍", "[SCAN]"),
            children.len(),
            settings.root.display()
        );
        println!();
    }

    let mut report = StatusReport {
        pending: 0,
        total: 0,
    };

    for child in children {
        let target = Target::discover(child);
        let plan = pipeline::plan_target(&target, &store)
            .map_err(|e| anyhow::anyhow!("Failed to check {}: {}", target.name, e))?;

        report.total += 1;
        if plan.is_in_sync() {
            if !args.quiet {
                println!(
                    "{} {} ({}): in sync",
                    out.emoji("✅", "[OK]"),
                    target.name,
                    target.package_manager
                );
            }
        } else {
            report.pending += 1;
            if !args.quiet {
                println!(
                    "{} {} ({}): {} pending change(s)",
                    out.emoji("⚠️", "[WARN]"),
                    target.name,
                    target.package_manager,
                    plan.pending()
                );
                if args.verbose {
                    print_pending_changes(&plan);
                }
            }
        }
    }

    if !args.quiet {
        println!();
        if report.is_in_sync() {
            println!("{} Fleet is in sync", out.emoji("🎯", "[RESULT]"));
        } else {
            println!(
                "{} {} of {} repositories need a sync",
                out.emoji("🎯", "[RESULT]"),
                report.pending,
                report.total
            );
            println!("Run 'repo-overlay sync' to update.");
        }
    }

    Ok(report)
}

/// Print one line per pending change, diff-style.
fn print_pending_changes(plan: &TargetPlan) {
    for change in &plan.changes {
        match change {
            PlannedChange::Remove(path) => println!("  - {}", path.display()),
            PlannedChange::Write(path) => println!("  + {}", path.display()),
        }
    }
    if plan.manifest_changed {
        println!("  ~ {}", MANIFEST_FILE);
    }
}
