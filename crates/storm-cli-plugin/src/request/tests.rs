//! Unit tests for command request derivation.

use std::sync::Arc;

use rstest::rstest;
use storm_config::InteractiveMode;
use storm_reflection::{DefaultValue, LiteralValue, ReflectedProperty, ReflectedType};

use super::*;
use crate::entry::{CommandEntry, EntryInput};
use crate::options::CliOptions;
use crate::test_support::{
    FakeOracle, aliased, bool_prop, context, context_with, handler, handler_taking, string_prop,
    test_options,
};

fn deploy_entry() -> CommandEntry {
    CommandEntry::real(
        vec!["deploy".into()],
        EntryInput::default_export("src/commands/deploy.ts"),
    )
}

fn names(request: &CommandRequest) -> Vec<&str> {
    request.args().iter().map(|arg| arg.name.as_str()).collect()
}

/// Every boolean flag that allows negation has exactly one `no-` partner,
/// and every generated negation points at an existing flag.
fn assert_paired(request: &CommandRequest) {
    for arg in request.args() {
        if let Some(positive) = &arg.is_negative_of {
            assert!(
                request.find(positive).is_some(),
                "{} negates missing flag {positive}",
                arg.name
            );
        } else if arg.is_boolean() && !arg.skip_negative {
            let negation = format!("no-{}", arg.name);
            let partners = request
                .args()
                .iter()
                .filter(|other| other.is_negative_of.as_deref() == Some(arg.name.as_str()))
                .count();
            assert_eq!(partners, 1, "{} has {partners} negations", arg.name);
            assert!(request.find(&negation).is_some(), "missing {negation}");
        }
    }
}

fn assert_no_equivalent_names(request: &CommandRequest) {
    let args = request.args();
    for (index, arg) in args.iter().enumerate() {
        for other in args.iter().skip(index + 1) {
            assert!(
                !same_name(&arg.name, &other.name),
                "{} and {} are equivalent",
                arg.name,
                other.name
            );
        }
    }
}

#[test]
fn declared_properties_come_before_builtins() {
    let context = context();
    let reflected = handler(
        vec![string_prop("target"), bool_prop("force")],
        ReflectedType::void(),
    );

    let request =
        CommandRequest::from_reflection(&context, &deploy_entry(), &reflected).expect("request");

    assert_eq!(
        names(&request),
        [
            "target",
            "force",
            "no-force",
            "help",
            "version",
            "interactive",
            "no-interactive",
            "no-banner",
            "verbose",
        ]
    );
    assert_paired(&request);
    assert_no_equivalent_names(&request);
}

#[test]
fn generated_negation_inverts_default() {
    let context = context();
    let force = bool_prop("force").with_default(DefaultValue::Boolean(true));
    let reflected = handler(vec![force], ReflectedType::void());

    let request =
        CommandRequest::from_reflection(&context, &deploy_entry(), &reflected).expect("request");
    let negation = request.find("no-force").expect("negation");

    assert_eq!(negation.is_negative_of.as_deref(), Some("force"));
    assert_eq!(negation.property.default, Some(DefaultValue::Boolean(false)));
    assert!(negation.skip_negative);
}

#[test]
fn multi_character_aliases_carry_over_to_negation() {
    let context = context();
    let dry_run = aliased(bool_prop("dryRun"), &["d", "simulate"]);
    let reflected = handler(vec![dry_run], ReflectedType::void());

    let request =
        CommandRequest::from_reflection(&context, &deploy_entry(), &reflected).expect("request");
    let negation = request.find("no-dry-run").expect("negation");

    assert_eq!(negation.aliases(), ["no-simulate"]);
    assert!(request.find("d").is_some_and(|arg| arg.name == "dry-run"));
    assert!(request.find("no-simulate").is_some());
}

#[test]
fn declared_negation_creates_positive() {
    let context = context();
    let reflected = handler(vec![bool_prop("noCache")], ReflectedType::void());

    let request =
        CommandRequest::from_reflection(&context, &deploy_entry(), &reflected).expect("request");

    let negation = request.find("no-cache").expect("declared negation");
    assert_eq!(negation.is_negative_of.as_deref(), Some("cache"));
    let positive = request.find("cache").expect("positive");
    assert!(!positive.is_negation());
    assert_eq!(
        request
            .args()
            .iter()
            .filter(|arg| same_name(&arg.name, "no-cache"))
            .count(),
        1
    );
    assert_paired(&request);
}

#[rstest]
#[case::booleans(&["force", "quiet", "watch"], &[])]
#[case::mixed(&["force", "dryRun"], &["target", "region"])]
#[case::declared_negations(&["noCache", "force", "no-color"], &["output"])]
#[case::camel_and_kebab(&["skipTests", "follow-links"], &["log_level"])]
#[case::strings_only(&[], &["name", "profile", "tag"])]
fn boolean_flags_are_always_paired(#[case] booleans: &[&str], #[case] strings: &[&str]) {
    let context = context();
    let mut properties: Vec<ReflectedProperty> =
        booleans.iter().copied().map(bool_prop).collect();
    properties.extend(strings.iter().copied().map(string_prop));
    let reflected = handler(properties, ReflectedType::void());

    let request =
        CommandRequest::from_reflection(&context, &deploy_entry(), &reflected).expect("request");

    assert_paired(&request);
    assert_no_equivalent_names(&request);
    for name in booleans.iter().chain(strings) {
        assert!(request.find(name).is_some(), "missing {name}");
    }
}

#[rstest]
#[case::string_first(vec![string_prop("noCache"), bool_prop("cache")], "cache")]
#[case::boolean_first(vec![bool_prop("cache"), string_prop("noCache")], "cache")]
#[case::string_positive(vec![string_prop("cache"), bool_prop("noCache")], "no-cache")]
fn negation_names_held_by_values_leave_the_flag_unpaired(
    #[case] properties: Vec<ReflectedProperty>,
    #[case] boolean: &str,
) {
    let context = context();
    let reflected = handler(properties, ReflectedType::void());

    let request =
        CommandRequest::from_reflection(&context, &deploy_entry(), &reflected).expect("request");

    assert_paired(&request);
    assert_no_equivalent_names(&request);
    let flag = request
        .args()
        .iter()
        .find(|arg| arg.name == boolean)
        .expect("boolean flag");
    assert!(flag.is_boolean());
    assert!(flag.skip_negative);
    assert!(!flag.is_negation());
    assert_eq!(request.args().iter().filter(|arg| !arg.is_boolean()).count(), 1);
}

#[test]
fn add_marks_flags_whose_negation_is_taken() {
    let context = context();
    let mut request = CommandRequest::empty("src/commands/deploy.ts");
    request.add(&context, ArgSpec::from_property(string_prop("noCache")));

    assert!(request.add(&context, ArgSpec::from_property(bool_prop("cache"))));

    let cache = request.find("cache").expect("cache");
    assert!(cache.skip_negative);
    assert_paired(&request);
}

/// Every subset of a pool mixing booleans with values whose names look like
/// negations, added in both directions.
#[test]
fn generated_flag_sets_stay_paired() {
    let pool: [fn() -> ReflectedProperty; 6] = [
        || bool_prop("cache"),
        || string_prop("noCache"),
        || bool_prop("force"),
        || bool_prop("noForce"),
        || string_prop("watch"),
        || bool_prop("noWatch"),
    ];
    for mask in 0_u32..(1 << pool.len()) {
        let chosen: Vec<ReflectedProperty> = pool
            .iter()
            .enumerate()
            .filter(|(bit, _)| mask & (1 << bit) != 0)
            .map(|(_, make)| make())
            .collect();
        for properties in [chosen.clone(), chosen.into_iter().rev().collect()] {
            let context = context();
            let reflected = handler(properties, ReflectedType::void());

            let request = CommandRequest::from_reflection(&context, &deploy_entry(), &reflected)
                .expect("request");

            assert_paired(&request);
            assert_no_equivalent_names(&request);
        }
    }
}

#[rstest]
#[case::plain(ArgSpec::from_property(string_prop("target")))]
#[case::boolean(ArgSpec::from_property(bool_prop("force")))]
#[case::negation(ArgSpec::from_property(bool_prop("noCache")))]
#[case::builtin(
    ArgSpec::boolean(HELP, "Show help information.", &["h", "?"], false).without_negation()
)]
fn add_is_idempotent(#[case] spec: ArgSpec) {
    let context = context();
    let mut request = CommandRequest::empty("src/commands/deploy.ts");

    assert!(request.add(&context, spec.clone()));
    let before: Vec<*const CommandRequestArg> = request
        .args()
        .iter()
        .map(std::ptr::from_ref)
        .collect();
    let count = request.args().len();

    assert!(!request.add(&context, spec.clone()));
    assert_eq!(request.args().len(), count);
    let after = request.find(&spec.name).expect("arg");
    assert!(before.contains(&std::ptr::from_ref(after)));
}

#[test]
fn add_rejects_alias_collisions() {
    let context = context();
    let mut request = CommandRequest::empty("src/commands/deploy.ts");
    request.add(&context, ArgSpec::from_property(aliased(string_prop("target"), &["t"])));

    let added = request.add(&context, ArgSpec::from_property(string_prop("t")));

    assert!(!added);
    assert_eq!(names(&request), ["target"]);
}

#[test]
fn add_matches_names_format_insensitively() {
    let context = context();
    let mut request = CommandRequest::empty("src/commands/deploy.ts");
    request.add(&context, ArgSpec::from_property(string_prop("dryRun")));

    assert!(!request.add(&context, ArgSpec::from_property(string_prop("dry_run"))));
    assert!(!request.add(&context, ArgSpec::from_property(string_prop("DRY-RUN"))));
    assert_eq!(names(&request), ["dry-run"]);
}

#[test]
fn virtual_commands_omit_interactive_and_verbose() {
    let context = context();
    let entry = CommandEntry::virtual_entry(vec!["tools".into()]);

    let request = CommandRequest::from_reflection(&context, &entry, &ReflectedType::object())
        .expect("request");

    assert_eq!(names(&request), ["help", "version", "no-banner"]);
}

#[test]
fn never_interactive_drops_interactive_flags() {
    let options = CliOptions {
        interactive: InteractiveMode::Never,
        ..test_options()
    };
    let context = context_with(Arc::new(FakeOracle::new()), options);

    let request = CommandRequest::from_reflection(
        &context,
        &deploy_entry(),
        &handler(Vec::new(), ReflectedType::void()),
    )
    .expect("request");

    assert!(request.find(INTERACTIVE).is_none());
    assert!(request.find(NO_INTERACTIVE).is_none());
    assert!(request.find(VERBOSE).is_some());
}

#[test]
fn declared_builtin_takes_builtin_rules() {
    let context = context();
    let help = string_prop("help").with_description("Custom help.");
    let reflected = handler(vec![help], ReflectedType::void());

    let request =
        CommandRequest::from_reflection(&context, &deploy_entry(), &reflected).expect("request");
    let arg = request.find(HELP).expect("help");

    assert!(arg.is_boolean());
    assert!(arg.skip_negative);
    assert!(request.find("no-help").is_none());
    assert_eq!(arg.description(), "Show help information.");
    assert_eq!(arg.aliases(), ["h", "?"]);
}

#[test]
fn union_options_are_listed_once() {
    let context = context();
    let region = ReflectedProperty::new(
        "region",
        ReflectedType::union(vec![
            ReflectedType::literal(LiteralValue::String("eu".into())),
            ReflectedType::literal(LiteralValue::String("us".into())),
            ReflectedType::literal(LiteralValue::String("eu".into())),
        ]),
    );
    let reflected = handler(vec![region], ReflectedType::void());

    let request =
        CommandRequest::from_reflection(&context, &deploy_entry(), &reflected).expect("request");

    assert_eq!(request.find("region").expect("region").options, ["eu", "us"]);
}

#[test]
fn boolean_types_have_no_options() {
    assert!(option_values(&ReflectedType::boolean()).is_empty());
    assert_eq!(
        option_values(&ReflectedType::array(ReflectedType::literal(
            LiteralValue::Number(3.0)
        ))),
        ["3"]
    );
}

#[test]
fn flags_are_mirrored_into_config_params() {
    let context = context();
    let reflected = handler(
        vec![string_prop("targetRegion"), bool_prop("force")],
        ReflectedType::void(),
    );

    CommandRequest::from_reflection(&context, &deploy_entry(), &reflected).expect("request");
    let params = context.config_params();

    assert!(params.has_property("TARGET_REGION"));
    assert!(params.has_property("FORCE"));
    assert!(!params.has_property("NO_FORCE"));
}

#[test]
fn wrapper_is_restored_on_request_type() {
    let context = context();
    let payload = ReflectedType::object_literal(vec![string_prop("target")]);
    let wrapped = ReflectedType::object_literal(vec![ReflectedProperty::new("data", payload)])
        .with_type_name("StormRequest");

    let request = CommandRequest::from_reflection(
        &context,
        &deploy_entry(),
        &handler_taking(wrapped),
    )
    .expect("request");
    let request_type = request.request_type();

    assert_eq!(request.wrapper(), Some("StormRequest"));
    assert_eq!(request_type.type_name.as_deref(), Some("StormRequest"));
    let data = request_type.property("data").expect("data");
    assert!(data.ty.has_property("target"));
    assert!(data.ty.has_property("help"));
}

#[test]
fn payload_args_skip_scaffold_and_negations() {
    let context = context();
    let reflected = handler(
        vec![string_prop("target"), bool_prop("force")],
        ReflectedType::void(),
    );

    let request =
        CommandRequest::from_reflection(&context, &deploy_entry(), &reflected).expect("request");
    let payload: Vec<&str> = request.payload_args().map(|arg| arg.name.as_str()).collect();

    assert_eq!(payload, ["target", "force", "verbose"]);
}

#[test]
fn invalid_request_shape_names_source() {
    let context = context();
    let error = CommandRequest::from_reflection(
        &context,
        &deploy_entry(),
        &handler_taking(ReflectedType::string()),
    )
    .expect_err("string request");

    assert!(error.to_string().contains("src/commands/deploy.ts"));
}
