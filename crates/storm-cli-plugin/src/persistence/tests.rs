//! Unit tests for the reflection cache.

use std::sync::Arc;

use rstest::{fixture, rstest};
use storm_reflection::{DefaultValue, LiteralValue, ReflectedProperty, TagBag};
use tempfile::TempDir;

use super::*;
use crate::command::Command;
use crate::entry::EntryInput;
use crate::relations::build_relations;
use crate::test_support::{FakeOracle, bool_prop, context_with, handler, string_prop, test_options};

struct CacheDir {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl CacheDir {
    fn cache(&self) -> ReflectionCache {
        ReflectionCache::new(&self.root.join(".storm/cache"))
    }

    fn options(&self) -> CliOptions {
        test_options().rooted_at(&self.root)
    }

    fn write_source(&self, relative: &str, contents: &str) {
        let path = self.options().commands_dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(path, contents).expect("write source");
    }
}

#[fixture]
fn cache_dir() -> CacheDir {
    let dir = TempDir::new().expect("temp dir");
    let root = Utf8Path::from_path(dir.path())
        .expect("utf8 temp dir")
        .to_owned();
    CacheDir { _dir: dir, root }
}

fn deploy_command() -> Command {
    let region = ReflectedProperty::new(
        "region",
        ReflectedType::union(vec![
            ReflectedType::literal(LiteralValue::String("eu".into())),
            ReflectedType::literal(LiteralValue::String("us".into())),
        ]),
    )
    .with_default(DefaultValue::String("eu".into()))
    .with_tags(TagBag {
        alias: vec!["r".into()],
        permission: vec!["deploy:write".into()],
        ..TagBag::default()
    });
    let oracle = FakeOracle::new().with_export(
        "src/commands/deploy.ts",
        handler(
            vec![string_prop("target"), bool_prop("force"), region],
            ReflectedType::object_literal(vec![string_prop("url")]),
        ),
    );
    let context = context_with(Arc::new(oracle), test_options());
    let entry = CommandEntry::real(
        vec!["deploy".into()],
        EntryInput::default_export("src/commands/deploy.ts"),
    );
    Command::resolve(&context, &entry, CommandRelations::default(), None).expect("resolve")
}

#[rstest]
fn command_reflection_round_trips(cache_dir: CacheDir) {
    let cache = cache_dir.cache();
    let command = deploy_command();

    cache
        .write_command(&command.id, command.reflection())
        .expect("write");
    let restored = cache.read_command(&command.id).expect("read");

    assert_eq!(&restored, command.reflection());
    let context = context_with(Arc::new(FakeOracle::new()), test_options());
    let reloaded = Command::resolve(
        &context,
        &command.entry(),
        CommandRelations::default(),
        Some(&restored),
    )
    .expect("reload");
    assert_eq!(reloaded, command);
    let original: Vec<String> = command
        .request(&context)
        .expect("request")
        .args()
        .iter()
        .map(|arg| arg.name.clone())
        .collect();
    let roundtrip: Vec<String> = reloaded
        .request(&context)
        .expect("request")
        .args()
        .iter()
        .map(|arg| arg.name.clone())
        .collect();
    assert_eq!(original, roundtrip);
}

#[rstest]
fn root_command_gets_a_file_name(cache_dir: CacheDir) {
    let cache = cache_dir.cache();

    let path = cache.command_path("");

    assert_eq!(path.file_name(), Some("_root.bin"));
    assert!(path.starts_with(cache.root()));
}

#[rstest]
fn missing_command_file_is_a_hard_error(cache_dir: CacheDir) {
    let error = cache_dir.cache().read_command("deploy").expect_err("missing");

    assert!(matches!(error, CommandError::CacheNotFound { .. }));
    let message = error.to_string();
    assert!(message.starts_with("CLI Command reflection file"), "{message}");
    assert!(message.ends_with("deploy.bin not found"), "{message}");
}

#[rstest]
fn corrupt_command_file_is_reported(cache_dir: CacheDir) {
    let cache = cache_dir.cache();
    let path = cache.command_path("deploy");
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(&path, b"not a reflection").expect("write garbage");

    let error = cache.read_command("deploy").expect_err("corrupt");

    assert!(matches!(error, CommandError::CacheCorrupt { .. }));
}

#[rstest]
fn manifest_round_trips(cache_dir: CacheDir) {
    let cache = cache_dir.cache();
    let entries = vec![
        CommandEntry::virtual_entry(vec!["tools".into()]),
        CommandEntry::real(
            vec!["tools".into(), "lint".into()],
            EntryInput::default_export("src/commands/tools/lint.ts"),
        ),
    ];
    let manifest = CacheManifest::new("abc123", entries.clone(), build_relations(&entries));

    cache.write_manifest(&manifest).expect("write");

    assert_eq!(cache.load_manifest(), Some(manifest));
}

#[rstest]
fn missing_or_corrupt_manifest_is_a_miss(cache_dir: CacheDir) {
    let cache = cache_dir.cache();
    assert_eq!(cache.load_manifest(), None);

    fs::create_dir_all(cache.root()).expect("mkdir");
    fs::write(cache.manifest_path(), b"garbage").expect("write garbage");

    assert_eq!(cache.load_manifest(), None);
}

#[rstest]
fn manifest_from_other_schema_is_a_miss(cache_dir: CacheDir) {
    let cache = cache_dir.cache();
    let mut manifest = CacheManifest::new("abc123", Vec::new(), BTreeMap::new());
    manifest.schema_version = CACHE_SCHEMA_VERSION + 1;

    cache.write_manifest(&manifest).expect("write");

    assert_eq!(cache.load_manifest(), None);
}

#[rstest]
fn command_file_is_not_a_manifest(cache_dir: CacheDir) {
    let cache = cache_dir.cache();
    let command = deploy_command();
    cache
        .write_command("deploy", command.reflection())
        .expect("write");
    fs::copy(cache.command_path("deploy"), cache.manifest_path()).expect("copy");

    assert_eq!(cache.load_manifest(), None);
}

#[rstest]
fn persist_writes_every_file(cache_dir: CacheDir) {
    let cache = cache_dir.cache();
    let command = deploy_command();
    let reflections = BTreeMap::from([(command.id.clone(), command.reflection().clone())]);
    let config = ReflectedType::class("StormConfigParams", vec![string_prop("TARGET")]);
    let manifest = CacheManifest::new("sum", Vec::new(), BTreeMap::new());

    cache
        .persist(&reflections, &config, &manifest)
        .expect("persist");

    assert!(cache.command_path("deploy").is_file());
    assert_eq!(cache.read_config_params().expect("config"), config);
    assert_eq!(cache.load_manifest(), Some(manifest));
}

#[rstest]
fn clear_removes_the_cache(cache_dir: CacheDir) {
    let cache = cache_dir.cache();
    assert!(!cache.clear().expect("clear empty"));

    cache
        .write_manifest(&CacheManifest::new("sum", Vec::new(), BTreeMap::new()))
        .expect("write");

    assert!(cache.clear().expect("clear"));
    assert!(!cache.root().exists());
}

#[rstest]
fn checksum_is_stable_for_unchanged_sources(cache_dir: CacheDir) {
    cache_dir.write_source("deploy.ts", "export default function deploy() {}\n");
    cache_dir.write_source("deploy/status.ts", "export default function status() {}\n");

    let first = compute_checksum(&cache_dir.options(), &[]).expect("first");
    let second = compute_checksum(&cache_dir.options(), &[]).expect("second");

    assert_eq!(first, second);
    assert_eq!(first.len(), 64);
}

#[rstest]
fn checksum_tracks_contents_paths_and_options(cache_dir: CacheDir) {
    cache_dir.write_source("deploy.ts", "export default function deploy() {}\n");
    let baseline = compute_checksum(&cache_dir.options(), &[]).expect("baseline");

    cache_dir.write_source("deploy.ts", "export default function deploy(a: {}) {}\n");
    let edited = compute_checksum(&cache_dir.options(), &[]).expect("edited");
    assert_ne!(baseline, edited);

    cache_dir.write_source("tools/lint.ts", "export default function lint() {}\n");
    let added = compute_checksum(&cache_dir.options(), &[]).expect("added");
    assert_ne!(edited, added);

    let renamed = CliOptions {
        version: "2.0.0".into(),
        ..cache_dir.options()
    };
    assert_ne!(added, compute_checksum(&renamed, &[]).expect("renamed"));
}

#[rstest]
fn checksum_fails_for_missing_commands_dir(cache_dir: CacheDir) {
    let error = compute_checksum(&cache_dir.options(), &[]).expect_err("missing dir");

    assert!(matches!(error, CommandError::Io { .. }));
}

#[rstest]
fn checksum_tracks_imported_modules(cache_dir: CacheDir) {
    cache_dir.write_source("deploy.ts", "export default function deploy() {}\n");
    let types = cache_dir.root.join("src/types.ts");
    fs::write(&types, "export interface DeployInput { target: string }\n").expect("write types");
    let dependencies = vec![types.clone()];
    let baseline = compute_checksum(&cache_dir.options(), &dependencies).expect("baseline");

    fs::write(&types, "export interface DeployInput { target: string; region: string }\n")
        .expect("edit types");
    let edited = compute_checksum(&cache_dir.options(), &dependencies).expect("edited");

    fs::remove_file(&types).expect("remove types");
    let removed = compute_checksum(&cache_dir.options(), &dependencies).expect("removed");

    assert_ne!(baseline, edited);
    assert_ne!(edited, removed);
    assert_ne!(removed, compute_checksum(&cache_dir.options(), &[]).expect("no imports"));
}

#[rstest]
fn external_modules_skip_the_commands_dir(cache_dir: CacheDir) {
    let options = cache_dir.options();
    let command_file = options.commands_dir.join("deploy.ts");
    let types = cache_dir.root.join("src/types.ts");

    let external = external_modules(&options, vec![command_file, types.clone()]);

    assert_eq!(external, vec![types]);
}

#[rstest]
fn manifest_round_trips_its_dependencies(cache_dir: CacheDir) {
    let cache = cache_dir.cache();
    let types = cache_dir.root.join("src/types.ts");
    let manifest =
        CacheManifest::new("sum", Vec::new(), BTreeMap::new()).with_dependencies(vec![types]);

    cache.write_manifest(&manifest).expect("write");

    assert_eq!(cache.load_manifest(), Some(manifest));
}
