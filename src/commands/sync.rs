//! # Sync Command Implementation
//!
//! This module implements the `sync` subcommand, which copies the shared
//! template files into every repository under the fleet root.
//!
//! ## Functionality
//!
//! - **Enumeration**: Visits the immediate children of the fleet root in
//!   lexicographic order.
//! - **Removal**: Deletes every denylisted path that still exists in a
//!   repository.
//! - **Overlays**: Copies the base overlay into each repository, then the
//!   alternate overlay on top for pnpm repositories.
//! - **Manifest Merge**: Rewrites each repository's `package.json` with the
//!   pinned shared fields.
//!
//! The command never touches version control; `publish` wraps the same sync
//! with the git guard.

use anyhow::Result;
use clap::Args;

use repo_overlay::config::{Settings, TemplateStore};
use repo_overlay::manifest::MANIFEST_FILE;
use repo_overlay::output::OutputConfig;
use repo_overlay::overlay::PlannedChange;
use repo_overlay::pipeline::{self, TargetPlan};
use repo_overlay::target::{self, Target};

/// Copy template files into every repository under the fleet root
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Directory whose immediate children are the repositories to sync.
    #[arg(long, value_name = "DIR", env = "REPO_OVERLAY_ROOT")]
    pub root: String,

    /// Directory holding the overlays, the removal list, and the shared
    /// manifest fields.
    #[arg(long, value_name = "DIR", env = "REPO_OVERLAY_TEMPLATES")]
    pub templates: String,

    /// List every applied change per repository.
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Execute the `sync` command.
///
/// Repositories are processed strictly in order; the first failure aborts
/// the run and repositories after it are left untouched.
pub fn execute(args: SyncArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::new(color_flag, args.quiet);
    let settings = Settings::new(&args.root, &args.templates);
    let store = TemplateStore::load(&settings.templates)
        .map_err(|e| anyhow::anyhow!("Failed to load templates: {}", e))?;

    let children = target::enumerate(&settings.root)
        .map_err(|e| anyhow::anyhow!("Failed to enumerate repositories: {}", e))?;

    if !args.quiet {
        println!(
            "{} Syncing {} repositories in {}",
            out.emoji("🔄", "[SYNC]"),
            children.len(),
            settings.root.display()
        );
        println!();
    }

    let mut updated = 0usize;
    let mut unchanged = 0usize;

    for child in children {
        let target = Target::discover(child);

        // The plan is only needed for the verbose listing; the sync itself
        // tracks whether it changed anything.
        let plan = if args.verbose {
            Some(
                pipeline::plan_target(&target, &store)
                    .map_err(|e| anyhow::anyhow!("Failed to plan {}: {}", target.name, e))?,
            )
        } else {
            None
        };

        let outcome = pipeline::sync_target(&target, &store)
            .map_err(|e| anyhow::anyhow!("Failed to sync {}: {}", target.name, e))?;

        if !args.quiet {
            if outcome.is_changed() {
                println!(
                    "{} {} ({}): updated",
                    out.emoji("✅", "[OK]"),
                    target.name,
                    target.package_manager
                );
            } else {
                println!(
                    "{} {} ({}): already up to date",
                    out.emoji("✅", "[OK]"),
                    target.name,
                    target.package_manager
                );
            }
            if let Some(plan) = plan {
                print_applied_changes(&plan);
            }
        }

        if outcome.is_changed() {
            updated += 1;
        } else {
            unchanged += 1;
        }
    }

    if !args.quiet {
        println!();
        println!(
            "{} {} updated, {} already up to date",
            out.emoji("📊", "[INFO]"),
            updated,
            unchanged
        );
    }

    Ok(())
}

/// Print one line per applied change, diff-style.
fn print_applied_changes(plan: &TargetPlan) {
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
