//! Parent and child links between discovered commands.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::entry::CommandEntry;
use crate::naming::command_id;

/// Nearest ancestor and direct children of one command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRelations {
    /// Id of the nearest existing ancestor; `None` for top-level commands.
    pub parent: Option<String>,
    /// Ids of the commands whose parent this is, sorted.
    pub children: Vec<String>,
}

/// Computes relations for every entry, keyed by command id.
///
/// The parent of a command is the entry whose id matches the longest proper
/// prefix of its path; dynamic segments contribute nothing to ids, so a
/// prefix that maps to the command's own id is skipped. The root entry is
/// never a parent.
#[must_use]
pub fn build_relations(entries: &[CommandEntry]) -> BTreeMap<String, CommandRelations> {
    let ids: BTreeSet<&str> = entries.iter().map(|entry| entry.id.as_str()).collect();
    let mut relations: BTreeMap<String, CommandRelations> = entries
        .iter()
        .map(|entry| (entry.id.clone(), CommandRelations::default()))
        .collect();

    for entry in entries.iter().filter(|entry| !entry.is_root()) {
        let parent = (1..entry.path.len())
            .rev()
            .filter_map(|len| entry.path.get(..len))
            .map(command_id)
            .find(|candidate| {
                !candidate.is_empty() && *candidate != entry.id && ids.contains(candidate.as_str())
            });

        if let Some(parent_id) = &parent
            && let Some(parent_relations) = relations.get_mut(parent_id)
        {
            parent_relations.children.push(entry.id.clone());
        }
        if let Some(own) = relations.get_mut(&entry.id) {
            own.parent = parent;
        }
    }

    for relation in relations.values_mut() {
        relation.children.sort();
        relation.children.dedup();
    }
    relations
}
