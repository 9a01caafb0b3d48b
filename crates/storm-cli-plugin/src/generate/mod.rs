//! TypeScript generation for an assembled command tree.
//!
//! Every generated module is derived from the same per-command flag list, so
//! usage text, parser options, and value bindings cannot drift apart. The
//! output is a list of [`GeneratedFile`]s relative to the artifacts
//! directory; [`write_files`] puts them on disk.

mod completions;
mod handler;
mod model;
mod root;
mod sort;
mod usage;
mod virtual_node;
mod writer;

use std::collections::BTreeMap;
use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use storm_reflection::ReflectedType;
use tracing::{debug, info};

pub use completions::{GET_COMPLETIONS_FLAG, Shell};
pub use handler::HandlerModule;
pub use model::{
    DispatchRoute, FieldBinding, FieldKind, ParserModel, UsageRow, dispatch_routes,
    field_bindings, relative_import, usage_file, usage_line, usage_rows,
};
pub use root::{COMPLETIONS_COMMAND, RootModule};
pub use sort::sort_args;
pub use usage::{ChildListing, UsageText, render_usage_module};
pub use virtual_node::VirtualModule;
pub use writer::{GENERATED_HEADER, SourceWriter};

use self::model::parent_dir;
use self::root::{completion_candidates, completion_key, root_candidates, shell_candidates};
use crate::command::Command;
use crate::context::CliContext;
use crate::entry::CommandEntry;
use crate::error::CommandError;
use crate::options::CliOptions;
use crate::request::CommandRequest;
use crate::tree::CommandTree;

const GENERATE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::generate");

/// Module providing the helpers generated code imports.
pub const RUNTIME_MODULE: &str = "@storm-stack/core/runtime/cli";

/// One generated source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Location relative to the artifacts directory.
    pub path: Utf8PathBuf,
    /// File contents.
    pub contents: String,
}

impl GeneratedFile {
    fn new(path: impl Into<Utf8PathBuf>, contents: String) -> Self {
        Self {
            path: path.into(),
            contents,
        }
    }
}

/// Generates every module of the application described by `tree`.
///
/// Real commands get `usage.ts` and `index.ts`, virtual commands a single
/// dispatching `index.ts`; the completion handlers and the executable entry
/// come last.
///
/// # Errors
///
/// Fails when a command's stored reflection no longer yields a request.
pub fn generate_all(
    context: &CliContext,
    tree: &CommandTree,
) -> Result<Vec<GeneratedFile>, CommandError> {
    let options = context.options();
    let bin = options.primary_bin();
    let mut files = Vec::new();
    let mut completions: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for branch in tree.walk() {
        let command = &branch.command;
        let request = command.request(context)?;
        let routes = dispatch_routes(tree, Some(branch));
        completions.insert(
            completion_key(command),
            completion_candidates(&routes, &request),
        );
        if command.is_virtual {
            let module = VirtualModule {
                bin,
                version: &options.version,
                command,
                request: &request,
                routes: &routes,
                colors: options.colors,
            };
            files.push(GeneratedFile::new(command.file.clone(), module.render()));
        } else {
            files.extend(real_command_files(options, command, &request, &routes));
        }
    }

    let top_level = dispatch_routes(tree, None);
    let root_request = CommandRequest::from_reflection(
        context,
        &CommandEntry::virtual_entry(Vec::new()),
        &ReflectedType::object(),
    )?;
    let handler_module = match &tree.root().command {
        Some(command) => {
            let request = command.request(context)?;
            files.extend(real_command_files(options, command, &request, &top_level));
            Some(relative_import(&parent_dir(&tree.root().entry), &command.file))
        }
        None => None,
    };
    completions.insert(String::new(), root_candidates(&top_level, &root_request));
    completions.insert(COMPLETIONS_COMMAND.to_owned(), shell_candidates());

    for shell in Shell::all() {
        files.push(GeneratedFile::new(shell.handler_file(), shell.render(bin)));
    }
    let root = RootModule {
        options,
        request: &root_request,
        routes: &top_level,
        handler_module,
        completions: &completions,
    };
    files.push(GeneratedFile::new(tree.root().entry.clone(), root.render()));

    info!(
        target: GENERATE_TARGET,
        files = files.len(),
        "generated command modules"
    );
    Ok(files)
}

fn real_command_files(
    options: &CliOptions,
    command: &Command,
    request: &CommandRequest,
    routes: &[DispatchRoute],
) -> [GeneratedFile; 2] {
    let bin = options.primary_bin();
    let text = UsageText::for_command(bin, command, request, routes.to_vec());
    let from_dir = options.artifacts_dir.join(parent_dir(&command.file));
    let handler = HandlerModule {
        bin,
        version: &options.version,
        command,
        request,
        routes,
        source_import: relative_import(&from_dir, command.source_file()),
    };
    [
        GeneratedFile::new(
            usage_file(command),
            render_usage_module(&text, options.colors),
        ),
        GeneratedFile::new(command.file.clone(), handler.render()),
    ]
}

/// Writes `files` below `artifacts_dir`, creating directories as needed.
///
/// # Errors
///
/// Returns [`CommandError::Io`] naming the path that could not be written.
pub fn write_files(artifacts_dir: &Utf8Path, files: &[GeneratedFile]) -> Result<(), CommandError> {
    for file in files {
        let path = artifacts_dir.join(&file.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|error| CommandError::io(parent, error))?;
        }
        fs::write(&path, &file.contents).map_err(|error| CommandError::io(&path, error))?;
        debug!(target: GENERATE_TARGET, path = %path, "wrote generated module");
    }
    Ok(())
}
