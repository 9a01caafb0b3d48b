//! Command-line interface of the `storm` binary.

use clap::{Parser, Subcommand};

/// Builds command-line applications from TypeScript command handlers.
#[derive(Parser, Debug)]
#[command(name = "storm", disable_help_subcommand = true)]
pub(crate) struct Cli {
    /// The operation to run.
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Operations of the `storm` binary.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CliCommand {
    /// Reflects the commands and writes the generated application.
    Prepare {
        /// Ignores the reflection cache even when its checksum matches.
        #[arg(long)]
        force: bool,
    },
    /// Prints the command tree without generating sources.
    Tree {
        /// Ignores the reflection cache even when its checksum matches.
        #[arg(long)]
        force: bool,
    },
    /// Removes the reflection cache and the generated sources.
    Clean,
}
