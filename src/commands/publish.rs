//! # Publish Command Implementation
//!
//! This module implements the `publish` subcommand, which syncs every
//! repository under the fleet root and then commits and pushes whatever
//! changed.
//!
//! ## Functionality
//!
//! - **Guard**: Each repository must sit on the primary branch with a clean
//!   working tree before anything is written; the guard then fetches and
//!   pulls so the push lands on an up-to-date branch.
//! - **Sync**: The same removals, overlay copies, and manifest merge the
//!   `sync` command applies.
//! - **Skip Detection**: Repositories the sync left untouched are skipped
//!   without a commit.
//! - **Fixed Message**: Every commit uses the same message, so fleet-wide
//!   template bumps read uniformly in history.
//!
//! A guard violation aborts the whole run; repositories after the failing
//! one are left untouched.

use anyhow::Result;
use clap::Args;

use repo_overlay::config::{Settings, TemplateStore};
use repo_overlay::output::OutputConfig;
use repo_overlay::pipeline;
use repo_overlay::publish::PublishOutcome;
use repo_overlay::target::{self, Target};

/// Sync every repository, then commit and push whatever changed
#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Directory whose immediate children are the repositories to publish.
    #[arg(long, value_name = "DIR", env = "REPO_OVERLAY_ROOT")]
    pub root: String,

    /// Directory holding the overlays, the removal list, and the shared
    /// manifest fields.
    #[arg(long, value_name = "DIR", env = "REPO_OVERLAY_TEMPLATES")]
    pub templates: String,

    /// Suppress all output except errors.
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the `publish` command.
///
/// Repositories are processed strictly in order; the first guard violation
/// or sync failure aborts the run.
pub fn execute(args: PublishArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::new(color_flag, args.quiet);
    let settings = Settings::new(&args.root, &args.templates);
    let store = TemplateStore::load(&settings.templates)
        .map_err(|e| anyhow::anyhow!("Failed to load templates: {}", e))?;

    let children = target::enumerate(&settings.root)
        .map_err(|e| anyhow::anyhow!("Failed to enumerate repositories: {}", e))?;

    if !args.quiet {
        println!(
            "{} Publishing template changes to {} repositories",
            out.emoji("🌐", "[NET]"),
            children.len()
        );
        println!();
    }

    let mut pushed = 0usize;
    let mut unchanged = 0usize;

    for child in children {
        let target = Target::discover(child);
        let report = pipeline::publish_target(&target, &settings, &store)
            .map_err(|e| anyhow::anyhow!("Failed to publish {}: {}", target.name, e))?;

        match report.outcome {
            PublishOutcome::Pushed => {
                pushed += 1;
                if !args.quiet {
                    println!(
                        "{} {} ({}): pushed",
                        out.emoji("✅", "[OK]"),
                        target.name,
                        target.package_manager
                    );
                }
            }
            PublishOutcome::Unchanged => {
                unchanged += 1;
                if !args.quiet {
                    println!(
                        "{} {} ({}): nothing to publish",
                        out.emoji("✅", "[OK]"),
                        target.name,
                        target.package_manager
                    );
                }
            }
        }
    }

    if !args.quiet {
        println!();
        println!(
            "{} {} pushed, {} unchanged",
            out.emoji("📊", "[INFO]"),
            pushed,
            unchanged
        );
    }

    Ok(())
}
