//! Text rendering of command trees.

use storm_cli_plugin::naming::dynamic_parameter;
use storm_cli_plugin::{CommandTree, CommandTreeBranch};

/// Renders `tree` as an indented outline, one command per line.
pub(crate) fn render_tree(tree: &CommandTree) -> String {
    let root = tree.root();
    let bin = root.bin.first().unwrap_or(&root.name);
    let mut lines = vec![format!("{bin} {}  {}", root.version, root.description)];
    if let Some(command) = &root.command {
        lines.push(format!("  (root handler {})", command.source_file()));
    }
    for branch in tree.walk() {
        let indent = "  ".repeat(depth(tree, branch) + 1);
        lines.push(format!("{indent}{}  {}", synopsis(branch), branch.command.description));
    }
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

fn depth(tree: &CommandTree, branch: &CommandTreeBranch) -> usize {
    let mut depth = 0;
    let mut current = tree.parent(branch);
    while let Some(parent) = current {
        depth += 1;
        current = tree.parent(parent);
    }
    depth
}

fn synopsis(branch: &CommandTreeBranch) -> String {
    let command = &branch.command;
    let mut parts = vec![command.name.clone()];
    parts.extend(
        command
            .dynamic_segments()
            .filter_map(dynamic_parameter)
            .map(|param| format!("<{param}>")),
    );
    if command.is_virtual {
        parts.push("(group)".to_owned());
    }
    parts.join(" ")
}
