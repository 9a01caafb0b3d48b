//! Discovery of command entries in the commands directory.
//!
//! Every `*.ts` module except `index.ts` is a command named by its path;
//! `<folder>/index.ts` is the command of its folder, and the top-level
//! `index.ts` is the root entry. Folders that hold commands but have no
//! handler of their own get a synthesized virtual entry so every command has
//! a parent to hang from.

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::CommandError;
use crate::naming::{command_id, command_name, is_dynamic_segment};

const DISCOVERY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::entry");

/// File name suffixes that never define commands.
const SKIPPED_SUFFIXES: &[&str] = &[
    ".d.ts",
    ".test.ts",
    ".spec.ts",
    ".test.tsx",
    ".spec.tsx",
];

/// The module and export implementing a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryInput {
    /// Handler module.
    pub file: Utf8PathBuf,
    /// Named export; `None` selects the default export.
    pub export: Option<String>,
}

impl EntryInput {
    /// Input reading the default export of `file`.
    #[must_use]
    pub fn default_export(file: impl Into<Utf8PathBuf>) -> Self {
        Self {
            file: file.into(),
            export: None,
        }
    }
}

/// One discovered command, real or virtual.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandEntry {
    /// Path-derived id; empty for the root entry.
    pub id: String,
    /// Path segments from the commands directory, dynamic ones included.
    pub path: Vec<String>,
    /// Handler module; `None` for virtual entries.
    pub input: Option<EntryInput>,
    /// Generated entry file, relative to the artifacts directory.
    pub output: Utf8PathBuf,
    /// Explicit title overriding the derived one.
    pub title: Option<String>,
    /// Explicit description overriding the reflected one.
    pub description: Option<String>,
}

impl CommandEntry {
    /// Creates a real entry for a handler module.
    #[must_use]
    pub fn real(path: Vec<String>, input: EntryInput) -> Self {
        Self::new(path, Some(input))
    }

    /// Creates a virtual entry grouping the commands below `path`.
    #[must_use]
    pub fn virtual_entry(path: Vec<String>) -> Self {
        Self::new(path, None)
    }

    fn new(path: Vec<String>, input: Option<EntryInput>) -> Self {
        let output = path
            .iter()
            .map(String::as_str)
            .collect::<Utf8PathBuf>()
            .join("index.ts");
        Self {
            id: command_id(&path),
            path,
            input,
            output,
            title: None,
            description: None,
        }
    }

    /// Command name: the last non-dynamic path segment.
    #[must_use]
    pub fn name(&self) -> String {
        command_name(&self.path).unwrap_or_default()
    }

    /// Returns `true` when no handler module backs the entry.
    #[must_use]
    pub const fn is_virtual(&self) -> bool {
        self.input.is_none()
    }

    /// Returns `true` for the top-level entry.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    /// File named in diagnostics: the handler module, or the generated entry
    /// of a virtual command.
    #[must_use]
    pub fn source_file(&self) -> &Utf8Path {
        self.input
            .as_ref()
            .map_or(self.output.as_path(), |input| input.file.as_path())
    }
}

/// Scans `commands_dir` and returns every entry sorted by id, the root entry
/// (if present) first.
///
/// # Errors
///
/// Fails when the directory cannot be read, a path is not UTF-8, a file maps
/// to no command, or two files map to the same command id.
pub fn discover_entries(commands_dir: &Utf8Path) -> Result<Vec<CommandEntry>, CommandError> {
    let mut entries: BTreeMap<String, CommandEntry> = BTreeMap::new();

    for module in command_modules(commands_dir)? {
        let relative = module
            .strip_prefix(commands_dir)
            .map_err(|_| CommandError::InvalidEntry {
                file: module.clone(),
                reason: format!("not located under {commands_dir}"),
            })?;
        let path = entry_path(relative);
        let entry = CommandEntry::real(path, EntryInput::default_export(module.clone()));
        if !entry.is_root() && entry.id.is_empty() {
            return Err(CommandError::InvalidEntry {
                file: module,
                reason: "the path consists only of dynamic segments".to_owned(),
            });
        }
        if let Some(existing) = entries.get(&entry.id) {
            return Err(CommandError::DuplicateCommand {
                id: entry.id.clone(),
                first: existing.source_file().to_owned(),
                second: module,
            });
        }
        entries.insert(entry.id.clone(), entry);
    }

    for entry in synthesize_virtual_entries(&entries) {
        debug!(
            target: DISCOVERY_TARGET,
            id = %entry.id,
            "synthesized virtual command"
        );
        entries.insert(entry.id.clone(), entry);
    }

    Ok(entries.into_values().collect())
}

fn command_modules(commands_dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>, CommandError> {
    let mut modules = Vec::new();
    for walked in WalkDir::new(commands_dir).sort_by_file_name() {
        let item = walked.map_err(|error| CommandError::io(commands_dir, error.into()))?;
        if !item.file_type().is_file() {
            continue;
        }
        let path = Utf8Path::from_path(item.path()).ok_or_else(|| CommandError::NonUtf8Path {
            path: item.path().display().to_string(),
        })?;
        if is_command_module(path) {
            modules.push(path.to_owned());
        }
    }
    Ok(modules)
}

fn is_command_module(path: &Utf8Path) -> bool {
    let Some(file_name) = path.file_name() else {
        return false;
    };
    if SKIPPED_SUFFIXES
        .iter()
        .any(|suffix| file_name.ends_with(suffix))
    {
        return false;
    }
    matches!(path.extension(), Some("ts" | "tsx"))
}

fn entry_path(relative: &Utf8Path) -> Vec<String> {
    let mut path: Vec<String> = relative
        .parent()
        .map(|parent| parent.iter().map(str::to_owned).collect())
        .unwrap_or_default();
    if let Some(stem) = relative.file_stem()
        && stem != "index"
    {
        path.push(stem.to_owned());
    }
    path
}

/// Virtual entries for every static ancestor folder lacking an entry.
fn synthesize_virtual_entries(entries: &BTreeMap<String, CommandEntry>) -> Vec<CommandEntry> {
    let mut synthesized: BTreeMap<String, CommandEntry> = BTreeMap::new();
    for entry in entries.values() {
        for depth in 1..entry.path.len() {
            let prefix = entry.path.get(..depth).unwrap_or_default();
            if prefix.last().is_some_and(|segment| is_dynamic_segment(segment)) {
                continue;
            }
            let id = command_id(prefix);
            if id.is_empty() || entries.contains_key(&id) || synthesized.contains_key(&id) {
                continue;
            }
            synthesized.insert(id, CommandEntry::virtual_entry(prefix.to_vec()));
        }
    }
    synthesized.into_values().collect()
}
