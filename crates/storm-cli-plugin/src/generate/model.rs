//! Generation data model: what the renderers print, computed once from a
//! command's flags so the usage text, the parser, and the value bindings
//! always agree.

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use storm_reflection::DefaultValue;

use super::sort::sort_args;
use crate::command::Command;
use crate::naming::{dynamic_parameter, env_variable, flag_name};
use crate::request::{CommandRequest, CommandRequestArg, VERBOSE};
use crate::tree::{CommandTree, CommandTreeBranch};

/// One row of an options table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageRow {
    /// Flag cell, such as `--force, --no-force` or `-t, --target <target>`.
    pub flags: String,
    /// Description cell.
    pub description: String,
}

/// Builds the options table rows, pairing each flag with its negation.
#[must_use]
pub fn usage_rows(args: &[CommandRequestArg]) -> Vec<UsageRow> {
    let sorted = sort_args(args);
    let mut rows = Vec::new();
    let mut index = 0;
    while let Some(arg) = sorted.get(index) {
        index += 1;
        if arg.is_hidden() {
            continue;
        }
        let mut flags = flag_spellings(arg);
        if !arg.is_negation() {
            while let Some(negation) = sorted
                .get(index)
                .filter(|next| next.is_negative_of.as_deref() == Some(arg.name.as_str()))
            {
                index += 1;
                if !negation.is_hidden() {
                    flags.extend(flag_spellings(negation));
                }
            }
        }
        rows.push(UsageRow {
            flags: flag_cell(arg, &flags),
            description: row_description(arg),
        });
    }
    rows
}

fn flag_spellings(arg: &CommandRequestArg) -> Vec<String> {
    let mut short: Vec<String> = Vec::new();
    let mut long = vec![format!("--{}", arg.name)];
    for alias in arg.aliases() {
        if alias.chars().count() == 1 {
            short.push(format!("-{alias}"));
        } else {
            long.push(format!("--{alias}"));
        }
    }
    short.extend(long);
    short
}

fn flag_cell(arg: &CommandRequestArg, flags: &[String]) -> String {
    let joined = flags.join(", ");
    if arg.is_boolean() {
        joined
    } else if arg.is_array() {
        format!("{joined} <{}>...", arg.name)
    } else {
        format!("{joined} <{}>", arg.name)
    }
}

fn row_description(arg: &CommandRequestArg) -> String {
    let mut description = arg.description();
    if !arg.options.is_empty() {
        description.push_str(&format!(" (options: {})", arg.options.join(", ")));
    }
    if !arg.is_boolean()
        && let Some(default) = arg.property.effective_default()
    {
        description.push_str(&format!(" (default: {})", default.to_display_string()));
    }
    description
}

/// Width of the flag column: the longest flag cell.
#[must_use]
pub fn column_width(rows: &[UsageRow]) -> usize {
    rows.iter()
        .map(|row| row.flags.chars().count())
        .max()
        .unwrap_or(0)
}

/// Pads `cell` to `width` characters.
#[must_use]
pub fn pad(cell: &str, width: usize) -> String {
    format!("{cell:<width$}")
}

/// Usage line of a command: executable, static segments, then each dynamic
/// segment as `<param>`.
#[must_use]
pub fn usage_line(bin: &str, command: Option<&Command>, has_children: bool) -> String {
    let mut parts = vec![bin.to_owned()];
    if let Some(node) = command {
        parts.extend(
            node.path
                .iter()
                .filter(|segment| dynamic_parameter(segment).is_none())
                .map(|segment| flag_name(segment)),
        );
        parts.extend(
            node.dynamic_segments()
                .filter_map(dynamic_parameter)
                .map(|param| format!("<{param}>")),
        );
    }
    if has_children {
        parts.push("<command>".to_owned());
    }
    parts.push("[options]".to_owned());
    parts.join(" ")
}

/// Option lists handed to the generated argument parser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParserModel {
    /// Flags parsed as booleans.
    pub booleans: Vec<String>,
    /// Flags parsed as single strings (numbers are coerced later).
    pub strings: Vec<String>,
    /// Flags collecting every occurrence.
    pub arrays: Vec<String>,
    /// Aliases per flag.
    pub aliases: BTreeMap<String, Vec<String>>,
}

impl ParserModel {
    /// Parser options for `args`.
    #[must_use]
    pub fn from_args(args: &[CommandRequestArg]) -> Self {
        let mut model = Self::default();
        for arg in args {
            if arg.is_boolean() {
                model.booleans.push(arg.name.clone());
            } else if arg.is_array() {
                model.arrays.push(arg.name.clone());
            } else {
                model.strings.push(arg.name.clone());
            }
            if !arg.aliases().is_empty() {
                model
                    .aliases
                    .insert(arg.name.clone(), arg.aliases().to_vec());
            }
        }
        model
    }
}

/// How a collected value is coerced before reaching the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// `toBoolean`.
    Boolean,
    /// `toNumber`.
    Number,
    /// Passed through as a string.
    String,
    /// `toStringArray`.
    StringArray,
    /// `toNumberArray`.
    NumberArray,
}

impl FieldKind {
    fn of(arg: &CommandRequestArg) -> Self {
        match (arg.is_boolean(), arg.is_array(), arg.is_numeric()) {
            (true, _, _) => Self::Boolean,
            (false, true, true) => Self::NumberArray,
            (false, true, false) => Self::StringArray,
            (false, false, true) => Self::Number,
            (false, false, false) => Self::String,
        }
    }

    /// Name of the prompt kind passed to `promptValue`.
    #[must_use]
    pub const fn prompt_kind(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::StringArray | Self::NumberArray => "list",
        }
    }

    /// Runtime coercion helper, if any.
    #[must_use]
    pub const fn coercion(self) -> Option<&'static str> {
        match self {
            Self::Boolean => Some("toBoolean"),
            Self::Number => Some("toNumber"),
            Self::String => None,
            Self::StringArray => Some("toStringArray"),
            Self::NumberArray => Some("toNumberArray"),
        }
    }
}

/// How one request field is filled from the command line, the environment,
/// a prompt, or its default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldBinding {
    /// Key of the field in the request data.
    pub property: String,
    /// Flag the value is read from.
    pub flag: String,
    /// Negation flag forcing the value to `false`.
    pub negation: Option<String>,
    /// Environment variable consulted when the flag is absent.
    pub env: Option<String>,
    /// Coercion applied to the collected value.
    pub kind: FieldKind,
    /// Default as a TypeScript expression.
    pub default: Option<String>,
    /// Prompt message; `None` for fields never prompted for.
    pub prompt: Option<String>,
    /// Accepted values for choice prompts.
    pub options: Vec<String>,
    /// Whether the handler requires a value.
    pub required: bool,
}

/// Bindings for every field passed to the handler, in flag order.
#[must_use]
pub fn field_bindings(request: &CommandRequest, bin: &str) -> Vec<FieldBinding> {
    request
        .payload_args()
        .map(|arg| {
            let builtin = arg.name == VERBOSE;
            let negation = request
                .args()
                .iter()
                .find(|other| other.is_negative_of.as_deref() == Some(arg.name.as_str()))
                .map(|other| other.name.clone());
            let default = arg
                .property
                .effective_default()
                .map(DefaultValue::to_typescript);
            FieldBinding {
                property: arg.property.name.clone(),
                flag: arg.name.clone(),
                negation,
                env: (!builtin).then(|| env_variable(bin, &arg.name)),
                kind: FieldKind::of(arg),
                required: !arg.property.optional && default.is_none() && !arg.is_boolean(),
                default,
                prompt: (!builtin && !arg.is_hidden()).then(|| arg.description()),
                options: arg.options.clone(),
            }
        })
        .collect()
}

/// A sub-command reachable from a generated dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchRoute {
    /// Token matched case-insensitively.
    pub name: String,
    /// Import specifier of the child's entry module.
    pub module: String,
    /// Import specifier of the module exporting the child's `renderUsage`.
    pub usage_module: String,
    /// Child description for commands tables.
    pub description: String,
}

/// Routes to the children of `branch`, or to the top-level commands when
/// `branch` is `None`.
#[must_use]
pub fn dispatch_routes(
    tree: &CommandTree,
    branch: Option<&CommandTreeBranch>,
) -> Vec<DispatchRoute> {
    let from_dir = branch.map_or_else(Utf8PathBuf::new, |parent| parent_dir(&parent.command.file));
    let children: Vec<&CommandTreeBranch> = match branch {
        Some(parent) => tree.children(parent).collect(),
        None => tree.top_level().collect(),
    };
    children
        .into_iter()
        .map(|child| DispatchRoute {
            name: child.command.name.clone(),
            module: relative_import(&from_dir, &child.command.file),
            usage_module: relative_import(&from_dir, &usage_file(&child.command)),
            description: child.command.description.clone(),
        })
        .collect()
}

/// Generated usage module of a command: `usage.ts` beside its entry for
/// real commands, the entry itself for virtual ones.
#[must_use]
pub fn usage_file(command: &Command) -> Utf8PathBuf {
    if command.is_virtual {
        command.file.clone()
    } else {
        parent_dir(&command.file).join("usage.ts")
    }
}

/// Directory of a generated file, empty for files at the artifacts root.
#[must_use]
pub fn parent_dir(file: &Utf8Path) -> Utf8PathBuf {
    file.parent().map(Utf8Path::to_path_buf).unwrap_or_default()
}

/// Import specifier reaching `target` from a module in `from_dir`.
///
/// Both paths must share a base (both relative to the same directory or
/// both absolute). The `.ts`/`.tsx` extension is dropped.
#[must_use]
pub fn relative_import(from_dir: &Utf8Path, target: &Utf8Path) -> String {
    let from: Vec<&str> = from_dir
        .components()
        .map(|component| component.as_str())
        .collect();
    let to: Vec<&str> = target
        .components()
        .map(|component| component.as_str())
        .collect();
    let common = from
        .iter()
        .zip(&to)
        .take_while(|(left, right)| left == right)
        .count();

    let mut parts: Vec<&str> = Vec::new();
    parts.extend(std::iter::repeat_n("..", from.len().saturating_sub(common)));
    parts.extend(to.iter().skip(common).copied());
    let joined = parts.join("/");
    let trimmed = joined
        .strip_suffix(".tsx")
        .or_else(|| joined.strip_suffix(".ts"))
        .unwrap_or(&joined);
    if trimmed.starts_with("../") {
        trimmed.to_owned()
    } else {
        format!("./{trimmed}")
    }
}
