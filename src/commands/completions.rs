//! # Completions Command Implementation
//!
//! This module implements the `completions` subcommand, which generates
//! shell completion scripts using `clap_complete`. Installing the generated
//! script enables tab-completion for all `repo-overlay` commands and
//! options.
//!
//! ## Example
//!
//! ```bash
//! # Generate and install bash completions
//! repo-overlay completions bash > ~/.local/share/bash-completion/completions/repo-overlay
//!
//! # Generate zsh completions
//! repo-overlay completions zsh > ~/.zfunc/_repo-overlay
//! ```

use anyhow::Result;
use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};
use std::io;

use crate::cli::Cli;

/// Generate shell completion scripts
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// The shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Execute the `completions` command.
///
/// Writes the completion script for the requested shell to stdout; users
/// redirect it into their shell's completion directory.
pub fn execute(args: CompletionsArgs) -> Result<()> {
    let mut cmd = Cli::command();
    generate(args.shell, &mut cmd, "repo-overlay", &mut io::stdout());
    Ok(())
}
