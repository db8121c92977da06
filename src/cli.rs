//! CLI argument parsing and command dispatch

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// Repo Overlay - Keep a fleet of repositories aligned with shared templates
#[derive(Parser, Debug)]
#[command(name = "repo-overlay")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Copy template files into every repository under the fleet root
    Sync(commands::sync::SyncArgs),

    /// Sync every repository, then commit and push whatever changed
    Publish(commands::publish::PublishArgs),

    /// Report which repositories have pending template changes
    Status(commands::status::StatusArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<ExitCode> {
        // RUST_LOG wins over the flag when both are set.
        env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(self.log_level.as_str()),
        )
        .init();

        match self.command {
            Commands::Sync(args) => {
                commands::sync::execute(args, &self.color)?;
                Ok(ExitCode::SUCCESS)
            }
            Commands::Publish(args) => {
                commands::publish::execute(args, &self.color)?;
                Ok(ExitCode::SUCCESS)
            }
            Commands::Status(args) => {
                let report = commands::status::execute(args, &self.color)?;
                Ok(report.exit_code())
            }
            Commands::Completions(args) => {
                commands::completions::execute(args)?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}
