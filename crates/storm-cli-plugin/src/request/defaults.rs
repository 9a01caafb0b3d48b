//! Argument specifications and the built-in flags every command carries.

use storm_config::InteractiveMode;
use storm_reflection::{DefaultValue, ReflectedProperty, ReflectedType, TagBag};

use crate::naming::flag_name;

/// `--help`.
pub const HELP: &str = "help";
/// `--version`.
pub const VERSION: &str = "version";
/// `--interactive`.
pub const INTERACTIVE: &str = "interactive";
/// `--no-interactive`.
pub const NO_INTERACTIVE: &str = "no-interactive";
/// `--no-banner`.
pub const NO_BANNER: &str = "no-banner";
/// `--verbose`.
pub const VERBOSE: &str = "verbose";

/// Built-in flags consumed by the generated scaffold rather than passed to
/// the handler.
pub const SCAFFOLD_FLAGS: &[&str] = &[HELP, VERSION, INTERACTIVE, NO_INTERACTIVE, NO_BANNER];

/// Prefix of generated negation flags.
pub const NEGATION_PREFIX: &str = "no-";

/// Input to [`CommandRequest::add`](super::CommandRequest::add).
#[derive(Debug, Clone, PartialEq)]
pub struct ArgSpec {
    /// Declared name; normalised to a flag name on insertion.
    pub name: String,
    /// Structural property backing the flag.
    pub property: ReflectedProperty,
    /// Name of the flag this one negates.
    pub is_negative_of: Option<String>,
    /// Suppresses the generated negation.
    pub skip_negative: bool,
}

impl ArgSpec {
    /// Specification for a declared request property.
    #[must_use]
    pub fn from_property(property: ReflectedProperty) -> Self {
        Self {
            name: property.name.clone(),
            property,
            is_negative_of: None,
            skip_negative: false,
        }
    }

    /// Boolean flag with a description, aliases, and a default.
    #[must_use]
    pub fn boolean(name: &str, description: &str, alias: &[&str], default: bool) -> Self {
        let property = ReflectedProperty::new(name, ReflectedType::boolean())
            .optional()
            .with_default(DefaultValue::Boolean(default))
            .with_description(description)
            .with_tags(TagBag {
                alias: alias.iter().map(|entry| (*entry).to_owned()).collect(),
                ..TagBag::default()
            });
        Self::from_property(property)
    }

    /// Marks the flag as never negated.
    #[must_use]
    pub const fn without_negation(mut self) -> Self {
        self.skip_negative = true;
        self
    }

    /// Declared aliases.
    #[must_use]
    pub fn aliases(&self) -> &[String] {
        &self.property.tags.alias
    }

    /// Merges a declared property with the built-in of the same name; the
    /// built-in's type, default, description, and negation rules win.
    #[must_use]
    pub fn merged_with(mut self, builtin: &Self) -> Self {
        self.property.ty = builtin.property.ty.clone();
        self.property.optional = true;
        if builtin.property.default.is_some() {
            self.property.default.clone_from(&builtin.property.default);
        }
        if builtin.property.description.is_some() {
            self.property
                .description
                .clone_from(&builtin.property.description);
        }
        self.property.tags = self.property.tags.merged(&builtin.property.tags);
        self.is_negative_of.clone_from(&builtin.is_negative_of);
        self.skip_negative = builtin.skip_negative;
        self
    }

    /// Generated `no-<name>` negation of a boolean flag.
    #[must_use]
    pub fn negation_of(positive: &str, property: &ReflectedProperty) -> Self {
        let name = format!("{NEGATION_PREFIX}{positive}");
        let tags = TagBag {
            alias: property
                .tags
                .alias
                .iter()
                .filter(|alias| alias.chars().count() > 1)
                .map(|alias| format!("{NEGATION_PREFIX}{}", flag_name(alias)))
                .collect(),
            hidden: property.tags.hidden,
            internal: property.tags.internal,
            ignore: property.tags.ignore,
            ..TagBag::default()
        };
        let mut negation = ReflectedProperty::new(name.clone(), ReflectedType::boolean())
            .optional()
            .with_description(format!("Negates the --{positive} flag."))
            .with_tags(tags);
        negation.default = inverse_default(property);
        Self {
            name,
            property: negation,
            is_negative_of: Some(positive.to_owned()),
            skip_negative: true,
        }
    }

    /// Positive counterpart of a declared `no-<name>` flag.
    #[must_use]
    pub fn positive_of(positive: &str, negation: &ReflectedProperty) -> Self {
        let tags = TagBag {
            alias: negation
                .tags
                .alias
                .iter()
                .filter_map(|alias| alias.strip_prefix(NEGATION_PREFIX))
                .map(str::to_owned)
                .collect(),
            hidden: negation.tags.hidden,
            internal: negation.tags.internal,
            ignore: negation.tags.ignore,
            ..TagBag::default()
        };
        let mut property = ReflectedProperty::new(positive, ReflectedType::boolean())
            .optional()
            .with_description(format!("Enables the --{positive} flag."))
            .with_tags(tags);
        property.default = inverse_default(negation);
        Self::from_property(property)
    }
}

fn inverse_default(property: &ReflectedProperty) -> Option<DefaultValue> {
    property
        .effective_default()
        .and_then(DefaultValue::as_bool)
        .map(|value| DefaultValue::Boolean(!value))
}

/// Built-in flags, in the order they are appended to a command.
#[must_use]
pub fn builtin_args(interactive: InteractiveMode, is_virtual: bool) -> Vec<ArgSpec> {
    let mut builtins = vec![
        ArgSpec::boolean(HELP, "Show help information.", &["h", "?"], false).without_negation(),
        ArgSpec::boolean(
            VERSION,
            "Show the version of the application.",
            &["v"],
            false,
        )
        .without_negation(),
    ];
    if interactive.allows_prompting() && !is_virtual {
        builtins.push(ArgSpec::boolean(
            INTERACTIVE,
            "Enable interactive mode (disabled automatically when no terminal is attached).",
            &["i", "interact"],
            true,
        ));
    }
    builtins.push(
        ArgSpec::boolean(
            NO_BANNER,
            "Hide the application banner.",
            &[],
            false,
        )
        .without_negation(),
    );
    if !is_virtual {
        builtins.push(
            ArgSpec::boolean(VERBOSE, "Print additional diagnostic output.", &[], false)
                .without_negation(),
        );
    }
    builtins
}

/// Returns `true` for flags consumed by the generated scaffold.
#[must_use]
pub fn is_scaffold_flag(name: &str) -> bool {
    SCAFFOLD_FLAGS.contains(&name)
}
