//! Runtime of the `storm` build tool.
//!
//! `storm` loads layered configuration, installs structured logging, and
//! drives the command engine in [`storm_cli_plugin`]:
//!
//! - `storm prepare [--force]` reflects the command handlers and writes the
//!   generated application
//! - `storm tree [--force]` prints the command tree
//! - `storm clean` removes the reflection cache and generated sources
//!
//! Configuration flags such as `--commands-dir` must precede the
//! sub-command.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use camino::Utf8PathBuf;
use clap::Parser;
use storm_cli_plugin::{CliContext, CliOptions, clean, load_tree, prepare};
use storm_reflection::StaticReflectionOracle;
use tracing::debug;

mod cli;
mod config;
mod errors;
mod output;
pub mod telemetry;

use cli::{Cli, CliCommand};
use config::{ConfigLoader, OrthoConfigLoader, split_arguments};
use errors::AppError;
use output::render_tree;

const RUN_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::run");

/// Runs `storm` with the given arguments and output streams.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    run_with_loader(args, stdout, stderr, &OrthoConfigLoader)
}

pub(crate) fn run_with_loader<I, W, E, L>(
    args: I,
    stdout: &mut W,
    stderr: &mut E,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    let argv: Vec<OsString> = args.into_iter().collect();
    match execute(&argv, stdout, loader) {
        Ok(()) => ExitCode::SUCCESS,
        Err(AppError::CliUsage(error)) if !error.use_stderr() => {
            write!(stdout, "{error}").map_or(ExitCode::FAILURE, |()| ExitCode::SUCCESS)
        }
        Err(error) => {
            writeln!(stderr, "{error}").unwrap_or_default();
            ExitCode::FAILURE
        }
    }
}

fn execute<W, L>(args: &[OsString], stdout: &mut W, loader: &L) -> Result<(), AppError>
where
    W: Write,
    L: ConfigLoader,
{
    let split = split_arguments(args);
    let cli = Cli::try_parse_from(&split.cli_arguments).map_err(AppError::CliUsage)?;
    let config = loader.load(&split.config_arguments)?;
    telemetry::initialise(&config)?;
    let options = CliOptions::from_config(&config).rooted_at(&working_directory()?);
    debug!(
        target: RUN_TARGET,
        command = ?cli.command,
        commands_dir = %options.commands_dir,
        "running storm"
    );

    match cli.command {
        CliCommand::Prepare { force } => {
            let context = engine_context(options);
            let outcome = prepare(&context, force)?;
            let origin = if outcome.cache_hit {
                "reflection cache"
            } else {
                "fresh reflection"
            };
            writeln!(
                stdout,
                "Prepared {} commands ({} files) in {} from {origin}",
                outcome.tree.len(),
                outcome.files.len(),
                context.options().artifacts_dir
            )?;
        }
        CliCommand::Tree { force } => {
            let context = engine_context(options);
            let loaded = load_tree(&context, force)?;
            write!(stdout, "{}", render_tree(&loaded.tree))?;
        }
        CliCommand::Clean => {
            let outcome = clean(&options)?;
            if outcome.cache_removed {
                writeln!(stdout, "Removed the reflection cache in {}", options.cache_dir)?;
            }
            if outcome.artifacts_removed {
                writeln!(stdout, "Removed generated sources in {}", options.artifacts_dir)?;
            }
            if !outcome.cache_removed && !outcome.artifacts_removed {
                writeln!(stdout, "Nothing to clean")?;
            }
        }
    }
    Ok(())
}

fn engine_context(options: CliOptions) -> CliContext {
    CliContext::new(options, Arc::new(StaticReflectionOracle::new()))
}

fn working_directory() -> Result<Utf8PathBuf, AppError> {
    let dir =
        std::env::current_dir().map_err(|error| AppError::WorkingDirectory(Arc::new(error)))?;
    Utf8PathBuf::from_path_buf(dir)
        .map_err(|path| AppError::NonUtf8WorkingDirectory(path.display().to_string()))
}

#[cfg(test)]
mod tests;
