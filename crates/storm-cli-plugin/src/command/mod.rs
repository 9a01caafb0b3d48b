//! Resolution of discovered entries into commands.
//!
//! A [`Command`] pairs an entry's identity (id, path, generated file) with a
//! reflection class holding two properties: `request`, the fully derived
//! request type including every generated flag, and `result`, the handler's
//! return type. That class is what the reflection cache stores, so a command
//! reloaded from the cache resolves without consulting the oracle.

use camino::{Utf8Path, Utf8PathBuf};
use storm_reflection::{ReflectedProperty, ReflectedType, TagBag, TypeKind};
use tracing::debug;

use crate::context::CliContext;
use crate::entry::{CommandEntry, EntryInput};
use crate::error::CommandError;
use crate::naming::{command_depth, is_dynamic_segment, pascal_case, title_case};
use crate::relations::CommandRelations;
use crate::request::{CommandRequest, REQUEST_PROPERTY};

const COMMAND_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::command");

/// Property of a command reflection holding the handler's return type.
pub const RESULT_PROPERTY: &str = "result";

/// A resolved command, real or virtual.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    /// Path-derived id; empty for the root entry.
    pub id: String,
    /// Last non-dynamic path segment.
    pub name: String,
    /// Generated entry file, relative to the artifacts directory.
    pub file: Utf8PathBuf,
    /// Handler module; `None` for virtual commands.
    pub input: Option<EntryInput>,
    /// Whether no handler module backs the command.
    pub is_virtual: bool,
    /// Display title.
    pub title: String,
    /// Description shown in usage output.
    pub description: String,
    /// Path segments from the commands directory, dynamic ones included.
    pub path: Vec<String>,
    /// Parent and children, fixed at construction.
    pub relations: CommandRelations,
    ty: ReflectedType,
}

impl Command {
    /// Resolves `entry` into a command.
    ///
    /// The reflection is taken from the context's cache when present, then
    /// from `reflected` when it is already a command reflection; virtual
    /// entries get the built-in flags only, and real entries are reflected
    /// through the oracle (or from `reflected` when it holds the handler).
    /// The resulting reflection is stored back into the context.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::Resolution`] carrying the command id, its
    /// source file, and the oracle or request-shape failure.
    pub fn resolve(
        context: &CliContext,
        entry: &CommandEntry,
        relations: CommandRelations,
        reflected: Option<&ReflectedType>,
    ) -> Result<Self, CommandError> {
        let ty = reflect_command(context, entry, reflected)
            .map_err(|error| CommandError::resolution(&entry.id, entry.source_file(), error))?;

        let title = ty
            .tags
            .title
            .clone()
            .unwrap_or_else(|| default_title(entry));
        let description = ty
            .description
            .clone()
            .unwrap_or_else(|| default_description(entry, &title));
        Ok(Self {
            id: entry.id.clone(),
            name: entry.name(),
            file: entry.output.clone(),
            input: entry.input.clone(),
            is_virtual: entry.is_virtual(),
            title,
            description,
            path: entry.path.clone(),
            relations,
            ty,
        })
    }

    /// Re-derives the command's request from its reflection.
    ///
    /// Each call returns a fresh [`CommandRequest`]; the flags match the
    /// ones derived when the command was resolved.
    ///
    /// # Errors
    ///
    /// Fails only when the stored request type is not an object shape.
    pub fn request(&self, context: &CliContext) -> Result<CommandRequest, CommandError> {
        CommandRequest::from_reflection(context, &self.entry(), &self.ty)
            .map_err(|error| CommandError::resolution(&self.id, self.source_file(), error))
    }

    /// Snapshot of the handler's return type.
    #[must_use]
    pub fn result(&self) -> ReflectedType {
        self.ty
            .property(RESULT_PROPERTY)
            .map_or_else(ReflectedType::void, |result| result.ty.clone())
    }

    /// The command reflection stored in the cache.
    #[must_use]
    pub const fn reflection(&self) -> &ReflectedType {
        &self.ty
    }

    /// Number of non-dynamic path segments.
    #[must_use]
    pub fn depth(&self) -> usize {
        command_depth(&self.path)
    }

    /// Dynamic `[param]` segments of the path, in order.
    pub fn dynamic_segments(&self) -> impl Iterator<Item = &str> {
        self.path
            .iter()
            .map(String::as_str)
            .filter(|segment| is_dynamic_segment(segment))
    }

    /// Handler module, or the generated entry of a virtual command.
    #[must_use]
    pub fn source_file(&self) -> &Utf8Path {
        self.input
            .as_ref()
            .map_or(self.file.as_path(), |input| input.file.as_path())
    }

    /// Reconstructs the entry this command was resolved from.
    #[must_use]
    pub fn entry(&self) -> CommandEntry {
        CommandEntry {
            id: self.id.clone(),
            path: self.path.clone(),
            input: self.input.clone(),
            output: self.file.clone(),
            title: None,
            description: None,
        }
    }
}

fn reflect_command(
    context: &CliContext,
    entry: &CommandEntry,
    reflected: Option<&ReflectedType>,
) -> Result<ReflectedType, CommandError> {
    if let Some(cached) = context.cached_reflection(&entry.id) {
        debug!(target: COMMAND_TARGET, id = %entry.id, "reusing cached reflection");
        return Ok(cached);
    }
    if let Some(command) = reflected.filter(|ty| ty.has_property(REQUEST_PROPERTY)) {
        context.store_reflection(entry.id.clone(), command.clone());
        return Ok(command.clone());
    }

    let handler = match (&entry.input, reflected) {
        (None, _) => ReflectedType::object(),
        (Some(_), Some(handler)) => handler.clone(),
        (Some(input), None) => context
            .oracle()
            .reflect(&input.file, input.export.as_deref())
            .map_err(|source| CommandError::Reflection {
                file: input.file.clone(),
                source,
            })?,
    };
    let request = CommandRequest::from_reflection(context, entry, &handler)?;

    let title = entry
        .title
        .clone()
        .or_else(|| handler.tags.title.clone())
        .unwrap_or_else(|| default_title(entry));
    let description = entry
        .description
        .clone()
        .or_else(|| handler.description.clone())
        .unwrap_or_else(|| default_description(entry, &title));
    let result = result_type(&handler, &title);

    let ty = ReflectedType::class(
        class_name(entry),
        vec![
            ReflectedProperty::new(REQUEST_PROPERTY, request.request_type()),
            ReflectedProperty::new(RESULT_PROPERTY, result),
        ],
    )
    .with_description(description)
    .with_tags(TagBag {
        title: Some(title),
        ..TagBag::default()
    });

    debug!(
        target: COMMAND_TARGET,
        id = %entry.id,
        flags = request.args().len(),
        "reflected command"
    );
    context.store_reflection(entry.id.clone(), ty.clone());
    Ok(ty)
}

/// Return type of a handler: object shapes are reused, `void` stays `void`,
/// and other kinds are described as the command's result.
fn result_type(handler: &ReflectedType, title: &str) -> ReflectedType {
    let Some(signature) = handler.as_function() else {
        return ReflectedType::void();
    };
    let returns = signature.returns.as_ref();
    match &returns.kind {
        TypeKind::Void => ReflectedType::void(),
        _ if returns.is_object_like() => returns.clone(),
        _ => {
            let mut wrapped = returns.clone();
            if wrapped.description.is_none() {
                wrapped.description = Some(format!("The result of the {title} command."));
            }
            wrapped
        }
    }
}

fn class_name(entry: &CommandEntry) -> String {
    if entry.is_root() {
        "RootCommand".to_owned()
    } else {
        format!("{}Command", pascal_case(&entry.id))
    }
}

fn default_title(entry: &CommandEntry) -> String {
    title_case(&entry.name())
}

fn default_description(entry: &CommandEntry, title: &str) -> String {
    if entry.is_virtual() {
        format!("Commands grouped under {title}.")
    } else {
        format!("The {title} command.")
    }
}
