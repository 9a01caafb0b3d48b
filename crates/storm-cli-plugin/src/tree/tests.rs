//! Unit tests for command tree assembly.

use std::sync::Arc;

use rstest::rstest;
use storm_reflection::ReflectedType;

use super::*;
use crate::entry::EntryInput;
use crate::test_support::{FakeOracle, bool_prop, context_with, handler, string_prop, test_options};

fn real_entry(path: &[&str]) -> CommandEntry {
    CommandEntry::real(
        path.iter().map(|segment| (*segment).to_owned()).collect(),
        EntryInput::default_export(format!("src/commands/{}.ts", path.join("/"))),
    )
}

fn virtual_entry(path: &[&str]) -> CommandEntry {
    CommandEntry::virtual_entry(path.iter().map(|segment| (*segment).to_owned()).collect())
}

fn simple_handler() -> ReflectedType {
    handler(vec![string_prop("target")], ReflectedType::void())
}

/// Entries of a small project: `deploy`, `deploy/status`, `tools/lint` with
/// a virtual `tools`, and `config/[name]/get` with a virtual `config`.
fn sample_entries() -> Vec<CommandEntry> {
    vec![
        virtual_entry(&["config"]),
        real_entry(&["config", "[name]", "get"]),
        real_entry(&["deploy"]),
        real_entry(&["deploy", "status"]),
        virtual_entry(&["tools"]),
        real_entry(&["tools", "lint"]),
    ]
}

fn sample_oracle() -> Arc<FakeOracle> {
    let oracle = FakeOracle::new()
        .with_export("src/commands/config/[name]/get.ts", simple_handler())
        .with_export(
            "src/commands/deploy.ts",
            handler(
                vec![string_prop("target"), bool_prop("force")],
                ReflectedType::void(),
            ),
        )
        .with_export("src/commands/deploy/status.ts", simple_handler())
        .with_export("src/commands/tools/lint.ts", simple_handler());
    Arc::new(oracle)
}

fn resolve_all(entries: &[CommandEntry]) -> Vec<Command> {
    let context = context_with(sample_oracle(), test_options());
    let relations = build_relations(entries);
    entries
        .iter()
        .map(|entry| {
            Command::resolve(&context, entry, relations[&entry.id].clone(), None)
                .expect("resolve entry")
        })
        .collect()
}

fn insert_in_order(commands: &[Command], order: &[usize]) -> CommandTree {
    let resolved: BTreeMap<String, Command> = commands
        .iter()
        .map(|command| (command.id.clone(), command.clone()))
        .collect();
    let mut tree = CommandTree::new(CommandTreeRoot::from_options(&test_options()));
    for index in order {
        tree.insert(commands[*index].clone(), &resolved)
            .expect("insert command");
    }
    tree
}

#[test]
fn builds_tree_from_entries() {
    let context = context_with(sample_oracle(), test_options());

    let tree = reflect_command_tree(&context, &sample_entries()).expect("tree");

    assert_eq!(tree.len(), 6);
    let top: Vec<&str> = tree
        .top_level()
        .map(|branch| branch.command.name.as_str())
        .collect();
    assert_eq!(top, ["config", "deploy", "tools"]);
    let status = tree.find("deploy-status").expect("deploy-status");
    assert_eq!(status.command.title, "Deploy - Status");
    assert_eq!(
        tree.parent(status).map(|parent| parent.command.id.as_str()),
        Some("deploy")
    );
    let get = tree.find("config-get").expect("config-get");
    assert_eq!(get.command.name, "get");
    assert_eq!(get.command.path, ["config", "[name]", "get"]);
}

#[test]
fn root_shell_comes_from_options() {
    let context = context_with(sample_oracle(), test_options());

    let tree = reflect_command_tree(&context, &sample_entries()).expect("tree");
    let root = tree.root();

    assert_eq!(root.name, "acme");
    assert_eq!(root.title, "Acme");
    assert_eq!(root.bin, ["acme"]);
    assert_eq!(root.entry, Utf8PathBuf::from("bin.ts"));
    assert!(root.command.is_none());
}

#[test]
fn root_entry_becomes_root_handler() {
    let oracle = FakeOracle::new().with_export("src/commands/index.ts", simple_handler());
    let context = context_with(Arc::new(oracle), test_options());
    let root_entry = CommandEntry::real(
        Vec::new(),
        EntryInput::default_export("src/commands/index.ts"),
    );

    let tree = reflect_command_tree(&context, &[root_entry]).expect("tree");

    assert!(tree.is_empty());
    let command = tree.root().command.as_ref().expect("root handler");
    assert!(command.id.is_empty());
}

#[rstest]
#[case::sorted(&[0, 1, 2, 3, 4, 5])]
#[case::reversed(&[5, 4, 3, 2, 1, 0])]
#[case::children_first(&[1, 3, 5, 0, 2, 4])]
#[case::interleaved(&[3, 0, 5, 2, 1, 4])]
fn insertion_order_does_not_change_shape(#[case] order: &[usize]) {
    let commands = resolve_all(&sample_entries());
    let expected = insert_in_order(&commands, &[0, 1, 2, 3, 4, 5]);

    let tree = insert_in_order(&commands, order);

    assert_eq!(tree.relation_map(), expected.relation_map());
    for branch in expected.walk() {
        let other = tree.find(&branch.command.id).expect("same ids");
        assert_eq!(other.command.title, branch.command.title);
    }
}

#[test]
fn reinsertion_returns_existing_branch() {
    let commands = resolve_all(&sample_entries());
    let resolved: BTreeMap<String, Command> = commands
        .iter()
        .map(|command| (command.id.clone(), command.clone()))
        .collect();
    let mut tree = CommandTree::new(CommandTreeRoot::from_options(&test_options()));

    let first = tree
        .insert(commands[3].clone(), &resolved)
        .expect("first insert");
    let before = tree.clone();
    let second = tree
        .insert(commands[3].clone(), &resolved)
        .expect("second insert");

    assert_eq!(first, second);
    assert_eq!(tree, before);
}

#[test]
fn walk_is_depth_first_by_name() {
    let context = context_with(sample_oracle(), test_options());
    let tree = reflect_command_tree(&context, &sample_entries()).expect("tree");

    let ids: Vec<&str> = tree
        .walk()
        .into_iter()
        .map(|branch| branch.command.id.as_str())
        .collect();

    assert_eq!(
        ids,
        ["config", "config-get", "deploy", "deploy-status", "tools", "tools-lint"]
    );
}

#[test]
fn reserved_top_level_name_is_rejected() {
    let entries = vec![virtual_entry(&["completions"])];
    let context = context_with(Arc::new(FakeOracle::new()), test_options());

    let error = reflect_command_tree(&context, &entries).expect_err("reserved name");

    assert!(matches!(
        error,
        CommandError::ReservedName { ref name, .. } if name == "completions"
    ));
}

#[test]
fn nested_reserved_name_is_allowed() {
    let entries = vec![virtual_entry(&["tools"]), virtual_entry(&["tools", "completions"])];
    let context = context_with(Arc::new(FakeOracle::new()), test_options());

    let tree = reflect_command_tree(&context, &entries).expect("tree");

    assert!(tree.find("tools-completions").is_some());
}

#[test]
fn missing_parent_is_fatal() {
    let commands = resolve_all(&[real_entry(&["deploy"]), real_entry(&["deploy", "status"])]);
    let status = commands
        .into_iter()
        .find(|command| command.id == "deploy-status")
        .expect("status");
    let mut tree = CommandTree::new(CommandTreeRoot::from_options(&test_options()));

    let error = tree
        .insert(status, &BTreeMap::new())
        .expect_err("parent unavailable");

    assert!(matches!(error, CommandError::MissingRelation { ref id } if id == "deploy"));
}

#[test]
fn nested_command_without_relation_is_fatal() {
    let context = context_with(sample_oracle(), test_options());
    let status = Command::resolve(
        &context,
        &real_entry(&["deploy", "status"]),
        CommandRelations::default(),
        None,
    )
    .expect("resolve");
    let mut tree = CommandTree::new(CommandTreeRoot::from_options(&test_options()));

    let error = tree
        .insert(status, &BTreeMap::new())
        .expect_err("no relation");

    assert!(matches!(error, CommandError::MissingRelation { ref id } if id == "deploy-status"));
}

#[test]
fn root_command_cannot_be_inserted() {
    let oracle = FakeOracle::new().with_export("src/commands/index.ts", simple_handler());
    let context = context_with(Arc::new(oracle), test_options());
    let root = Command::resolve(
        &context,
        &CommandEntry::real(Vec::new(), EntryInput::default_export("src/commands/index.ts")),
        CommandRelations::default(),
        None,
    )
    .expect("resolve root");
    let mut tree = CommandTree::new(CommandTreeRoot::from_options(&test_options()));

    let error = tree
        .insert(root, &BTreeMap::new())
        .expect_err("root has no id");

    assert!(matches!(error, CommandError::MissingOutput { .. }));
}

#[test]
fn same_id_with_different_path_is_duplicate() {
    let context = context_with(sample_oracle(), test_options());
    let deploy = Command::resolve(
        &context,
        &real_entry(&["deploy"]),
        CommandRelations::default(),
        None,
    )
    .expect("deploy");
    let mut impostor = deploy.clone();
    impostor.path = vec!["[stage]".into(), "deploy".into()];
    let mut tree = CommandTree::new(CommandTreeRoot::from_options(&test_options()));
    tree.insert(deploy, &BTreeMap::new()).expect("first");

    let error = tree
        .insert(impostor, &BTreeMap::new())
        .expect_err("duplicate id");

    assert!(matches!(error, CommandError::DuplicateCommand { ref id, .. } if id == "deploy"));
}
