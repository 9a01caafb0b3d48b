//! Command-tree reflection and code generation for Storm Stack applications.
//!
//! The engine turns a directory of TypeScript command handlers into a
//! generated command-line application:
//!
//! - **Discovery** maps handler modules to [`CommandEntry`] values named by
//!   their path, synthesizing virtual entries for grouping folders
//! - **Requests** derive every flag of a command from its handler's request
//!   type through a [`ReflectionOracle`](storm_reflection::ReflectionOracle),
//!   pairing boolean flags with their negations and adding the built-ins
//! - **Tree assembly** resolves entries into [`Command`]s in parallel and
//!   inserts them into a [`CommandTree`]
//! - **Persistence** keeps every command reflection in a binary cache gated
//!   by a checksum of the sources and options
//! - **Generation** emits usage renderers, handler wrappers, dispatchers,
//!   shell completions, and the executable entry
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use storm_cli_plugin::{CliContext, CliOptions, prepare};
//! use storm_reflection::StaticReflectionOracle;
//!
//! let context = CliContext::new(CliOptions::default(), Arc::new(StaticReflectionOracle::new()));
//! let outcome = prepare(&context, false)?;
//! println!("{} commands", outcome.tree.len());
//! ```

pub mod command;
pub mod context;
pub mod entry;
pub mod error;
pub mod extract;
pub mod generate;
pub mod naming;
pub mod options;
pub mod persistence;
pub mod prepare;
pub mod relations;
pub mod request;
pub mod tree;

#[cfg(test)]
mod test_support;

pub use self::command::Command;
pub use self::context::CliContext;
pub use self::entry::{CommandEntry, EntryInput, discover_entries};
pub use self::error::CommandError;
pub use self::generate::{GeneratedFile, generate_all, sort_args, write_files};
pub use self::options::CliOptions;
pub use self::persistence::{
    CacheManifest, ReflectionCache, compute_checksum, external_modules,
};
pub use self::prepare::{
    CleanOutcome, LoadedTree, PrepareError, PrepareOutcome, clean, load_tree, prepare,
};
pub use self::relations::{CommandRelations, build_relations};
pub use self::request::{ArgSpec, CommandRequest, CommandRequestArg};
pub use self::tree::{
    BranchId, CommandTree, CommandTreeBranch, CommandTreeRoot, reflect_command_tree,
};
