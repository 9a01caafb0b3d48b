//! Hierarchical command tree assembled from resolved commands.
//!
//! Branches live in an arena owned by [`CommandTree`]; parent and child links
//! are [`BranchId`] indices into it, so the tree has a single owner and
//! lookups in either direction stay cheap.

use std::collections::{BTreeMap, HashMap};

use camino::Utf8PathBuf;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::command::Command;
use crate::context::CliContext;
use crate::entry::CommandEntry;
use crate::error::CommandError;
use crate::options::CliOptions;
use crate::relations::{CommandRelations, build_relations};

const TREE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::tree");

/// Names a top-level command may not take.
pub const RESERVED_ROOT_NAMES: &[&str] = &["completions"];

/// Index of a branch within its tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BranchId(usize);

impl BranchId {
    /// Position of the branch in insertion order.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// The application itself: the parent of every top-level command.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandTreeRoot {
    /// Application name.
    pub name: String,
    /// Display title.
    pub title: String,
    /// Executable names.
    pub bin: Vec<String>,
    /// Generated root dispatcher, relative to the artifacts directory.
    pub entry: Utf8PathBuf,
    /// Root description.
    pub description: String,
    /// Application version.
    pub version: String,
    /// Handler run when the application is invoked without a command.
    pub command: Option<Command>,
}

impl CommandTreeRoot {
    /// Root shell built from generation options.
    #[must_use]
    pub fn from_options(options: &CliOptions) -> Self {
        Self {
            name: options.name.clone(),
            title: options.title.clone(),
            bin: options.bin.clone(),
            entry: Utf8PathBuf::from(&options.bin_entry),
            description: options.description.clone(),
            version: options.version.clone(),
            command: None,
        }
    }
}

/// A command placed in the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandTreeBranch {
    /// The command, re-titled with its ancestors' titles.
    pub command: Command,
    /// Parent branch; `None` under the root.
    pub parent: Option<BranchId>,
    /// Children keyed by command name.
    pub children: BTreeMap<String, BranchId>,
}

/// Rooted tree of every command.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandTree {
    root: CommandTreeRoot,
    branches: Vec<CommandTreeBranch>,
    root_children: BTreeMap<String, BranchId>,
    by_id: HashMap<String, BranchId>,
}

impl CommandTree {
    /// Creates a tree holding only `root`.
    #[must_use]
    pub fn new(root: CommandTreeRoot) -> Self {
        Self {
            root,
            branches: Vec::new(),
            root_children: BTreeMap::new(),
            by_id: HashMap::new(),
        }
    }

    /// Places `command` in the tree and returns its branch.
    ///
    /// Parents missing from the tree are inserted first from `resolved`,
    /// following `relations.parent`. Inserting a command whose id is already
    /// present with the same path returns the existing branch unchanged.
    ///
    /// # Errors
    ///
    /// Fails when the command has no id, its parent cannot be found, a
    /// top-level command uses a reserved name, or another command already
    /// holds its id or sibling name.
    pub fn insert(
        &mut self,
        mut command: Command,
        resolved: &BTreeMap<String, Command>,
    ) -> Result<BranchId, CommandError> {
        if command.id.is_empty() {
            return Err(CommandError::MissingOutput {
                path: command.path.join("/"),
            });
        }
        if let Some(existing) = self.by_id.get(&command.id).copied() {
            return self.existing_branch(existing, &command);
        }

        let parent = match &command.relations.parent {
            Some(parent_id) => Some(self.ensure_parent(parent_id, resolved)?),
            None if command.depth() > 1 => {
                return Err(CommandError::MissingRelation {
                    id: command.id.clone(),
                });
            }
            None => None,
        };

        let siblings = match parent {
            Some(parent_id) => {
                let parent_branch = self.branch(parent_id).ok_or_else(|| {
                    CommandError::MissingRelation {
                        id: command.id.clone(),
                    }
                })?;
                command.title = format!("{} - {}", parent_branch.command.title, command.title);
                &parent_branch.children
            }
            None => {
                if RESERVED_ROOT_NAMES.contains(&command.name.as_str()) {
                    return Err(CommandError::ReservedName {
                        id: command.id.clone(),
                        name: command.name.clone(),
                    });
                }
                &self.root_children
            }
        };
        if let Some(sibling) = siblings.get(&command.name).and_then(|id| self.branch(*id)) {
            return Err(CommandError::DuplicateCommand {
                id: command.id.clone(),
                first: sibling.command.source_file().to_owned(),
                second: command.source_file().to_owned(),
            });
        }

        let id = BranchId(self.branches.len());
        debug!(
            target: TREE_TARGET,
            id = %command.id,
            title = %command.title,
            "inserted command"
        );
        let name = command.name.clone();
        self.by_id.insert(command.id.clone(), id);
        self.branches.push(CommandTreeBranch {
            command,
            parent,
            children: BTreeMap::new(),
        });
        match parent.and_then(|parent_id| self.branches.get_mut(parent_id.0)) {
            Some(parent_branch) => {
                parent_branch.children.insert(name, id);
            }
            None => {
                self.root_children.insert(name, id);
            }
        }
        Ok(id)
    }

    fn existing_branch(&self, id: BranchId, command: &Command) -> Result<BranchId, CommandError> {
        let existing = self
            .branch(id)
            .ok_or_else(|| CommandError::MissingRelation {
                id: command.id.clone(),
            })?;
        if existing.command.path == command.path {
            return Ok(id);
        }
        Err(CommandError::DuplicateCommand {
            id: command.id.clone(),
            first: existing.command.source_file().to_owned(),
            second: command.source_file().to_owned(),
        })
    }

    fn ensure_parent(
        &mut self,
        parent_id: &str,
        resolved: &BTreeMap<String, Command>,
    ) -> Result<BranchId, CommandError> {
        if let Some(existing) = self.by_id.get(parent_id) {
            return Ok(*existing);
        }
        let parent = resolved
            .get(parent_id)
            .cloned()
            .ok_or_else(|| CommandError::MissingRelation {
                id: parent_id.to_owned(),
            })?;
        self.insert(parent, resolved)
    }

    /// The application root.
    #[must_use]
    pub const fn root(&self) -> &CommandTreeRoot {
        &self.root
    }

    /// Looks up a branch by index.
    #[must_use]
    pub fn branch(&self, id: BranchId) -> Option<&CommandTreeBranch> {
        self.branches.get(id.0)
    }

    /// Looks up a branch by command id.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&CommandTreeBranch> {
        self.by_id.get(id).and_then(|branch| self.branch(*branch))
    }

    /// Top-level branches ordered by name.
    pub fn top_level(&self) -> impl Iterator<Item = &CommandTreeBranch> {
        self.root_children
            .values()
            .filter_map(|id| self.branch(*id))
    }

    /// Children of `branch` ordered by name.
    pub fn children<'a>(
        &'a self,
        branch: &'a CommandTreeBranch,
    ) -> impl Iterator<Item = &'a CommandTreeBranch> + 'a {
        branch.children.values().filter_map(|id| self.branch(*id))
    }

    /// Parent of `branch`, or `None` under the root.
    #[must_use]
    pub fn parent(&self, branch: &CommandTreeBranch) -> Option<&CommandTreeBranch> {
        branch.parent.and_then(|id| self.branch(id))
    }

    /// Every branch in depth-first order, children sorted by name.
    #[must_use]
    pub fn walk(&self) -> Vec<&CommandTreeBranch> {
        let mut ordered = Vec::with_capacity(self.branches.len());
        let mut stack: Vec<BranchId> = self.root_children.values().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let Some(branch) = self.branch(id) else {
                continue;
            };
            ordered.push(branch);
            stack.extend(branch.children.values().rev().copied());
        }
        ordered
    }

    /// Number of commands in the tree, the root excluded.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.branches.len()
    }

    /// Returns `true` when no command has been inserted.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    /// Shape of the tree as parent and child ids per command, independent of
    /// insertion order.
    #[must_use]
    pub fn relation_map(&self) -> BTreeMap<String, CommandRelations> {
        self.branches
            .iter()
            .map(|branch| {
                let parent = self.parent(branch).map(|parent| parent.command.id.clone());
                let mut children: Vec<String> = self
                    .children(branch)
                    .map(|child| child.command.id.clone())
                    .collect();
                children.sort();
                (
                    branch.command.id.clone(),
                    CommandRelations { parent, children },
                )
            })
            .collect()
    }
}

/// Resolves every entry and assembles the command tree.
///
/// Non-root entries resolve in parallel; commands are then inserted one at a
/// time in ascending depth, ties broken by id. The root entry, when present,
/// becomes the root's handler.
///
/// # Errors
///
/// Propagates the first resolution failure and any tree invariant error.
pub fn reflect_command_tree(
    context: &CliContext,
    entries: &[CommandEntry],
) -> Result<CommandTree, CommandError> {
    let relations = build_relations(entries);
    let relations_of = |entry: &CommandEntry| {
        relations
            .get(&entry.id)
            .cloned()
            .ok_or_else(|| CommandError::MissingRelation {
                id: entry.id.clone(),
            })
    };

    let commands = entries
        .par_iter()
        .filter(|entry| !entry.is_root())
        .map(|entry| Command::resolve(context, entry, relations_of(entry)?, None))
        .collect::<Result<Vec<_>, _>>()?;
    let root_command = entries
        .iter()
        .find(|entry| entry.is_root())
        .map(|entry| Command::resolve(context, entry, relations_of(entry)?, None))
        .transpose()?;

    let mut root = CommandTreeRoot::from_options(context.options());
    root.command = root_command;
    let tree = assemble_tree(root, commands)?;
    info!(
        target: TREE_TARGET,
        commands = tree.len(),
        "assembled command tree"
    );
    Ok(tree)
}

/// Inserts `commands` into a tree under `root` in ascending depth, ties
/// broken by id.
///
/// # Errors
///
/// Returns the first tree invariant violation.
pub fn assemble_tree(
    root: CommandTreeRoot,
    mut commands: Vec<Command>,
) -> Result<CommandTree, CommandError> {
    commands.sort_by(|left, right| {
        left.depth()
            .cmp(&right.depth())
            .then_with(|| left.id.cmp(&right.id))
    });
    let resolved: BTreeMap<String, Command> = commands
        .iter()
        .map(|command| (command.id.clone(), command.clone()))
        .collect();

    let mut tree = CommandTree::new(root);
    for command in commands {
        tree.insert(command, &resolved)?;
    }
    Ok(tree)
}

#[cfg(test)]
mod tests;
