//! Command-line arguments derived from a handler's request type.
//!
//! A [`CommandRequest`] owns the structural request type of one command and
//! the ordered list of flags generated from it. Flags come from the declared
//! request properties first, then from the built-ins still missing. Every
//! boolean flag that allows negation is paired with a `no-<flag>` flag, and
//! the pairing is established through [`CommandRequest::add`] alone so the
//! list never holds two flags with equivalent names.

mod defaults;

use camino::{Utf8Path, Utf8PathBuf};
use storm_reflection::{ReflectedProperty, ReflectedType, ReflectionBuilder, TypeKind};
use tracing::trace;

use crate::context::CliContext;
use crate::entry::CommandEntry;
use crate::error::CommandError;
use crate::extract::{WRAPPER_DATA_PROPERTY, extract_request};
use crate::naming::{flag_name, same_name, title_case, upper_snake};

pub use defaults::{
    ArgSpec, HELP, INTERACTIVE, NEGATION_PREFIX, NO_BANNER, NO_INTERACTIVE, SCAFFOLD_FLAGS,
    VERBOSE, VERSION, builtin_args, is_scaffold_flag,
};

const REQUEST_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::request");

/// Domain recorded on every flag property.
pub const CLI_DOMAIN: &str = "cli";

/// Property of a command reflection holding the request type.
pub const REQUEST_PROPERTY: &str = "request";

/// One flag of a generated command.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandRequestArg {
    /// Kebab-case flag name.
    pub name: String,
    /// Human-facing label.
    pub title: String,
    /// Structural property backing the flag.
    pub property: ReflectedProperty,
    /// Values the flag accepts, for literal, union, and enum types.
    pub options: Vec<String>,
    /// Flag this one negates.
    pub is_negative_of: Option<String>,
    /// Whether the flag is exempt from negation pairing.
    pub skip_negative: bool,
}

impl CommandRequestArg {
    /// Aliases declared for the flag.
    #[must_use]
    pub fn aliases(&self) -> &[String] {
        &self.property.tags.alias
    }

    /// Returns `true` for boolean flags.
    #[must_use]
    pub fn is_boolean(&self) -> bool {
        self.property.ty.is_boolean()
    }

    /// Returns `true` for flags accepting several values.
    #[must_use]
    pub const fn is_array(&self) -> bool {
        self.property.ty.is_array()
    }

    /// Returns `true` for numeric flags (or arrays of numbers).
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        self.property
            .ty
            .element()
            .map_or_else(|| self.property.ty.is_numeric(), ReflectedType::is_numeric)
    }

    /// Returns `true` for generated or declared negations.
    #[must_use]
    pub const fn is_negation(&self) -> bool {
        self.is_negative_of.is_some()
    }

    /// Returns `true` when the flag is hidden from usage output.
    #[must_use]
    pub const fn is_hidden(&self) -> bool {
        self.property.tags.hidden || self.property.tags.internal
    }

    /// Description shown in usage output.
    #[must_use]
    pub fn description(&self) -> String {
        self.property
            .effective_description()
            .map_or_else(|| format!("The {} option.", self.title), str::to_owned)
    }
}

/// The flags and structural request type of one command.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandRequest {
    source: Utf8PathBuf,
    builder: ReflectionBuilder,
    args: Vec<CommandRequestArg>,
    wrapper: Option<String>,
}

impl CommandRequest {
    /// Derives the request of `entry` from a reflected handler, request
    /// shape, or command reflection carrying a `request` property.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::InvalidShape`] naming the entry's source file
    /// when no object request type can be extracted.
    pub fn from_reflection(
        context: &CliContext,
        entry: &CommandEntry,
        reflected: &ReflectedType,
    ) -> Result<Self, CommandError> {
        let target = reflected
            .property(REQUEST_PROPERTY)
            .map_or(reflected, |request| &request.ty);
        let extracted = extract_request(target, entry.source_file())?;

        let mut shell = extracted.ty.clone();
        if let Some(properties) = shell.properties_mut() {
            properties.clear();
        }
        let mut request = Self {
            source: entry.source_file().to_owned(),
            builder: ReflectionBuilder::from_type(&shell, flag_name),
            args: Vec::new(),
            wrapper: extracted.wrapper,
        };

        let builtins = builtin_args(context.options().interactive, entry.is_virtual());
        let value_flags: Vec<&str> = extracted
            .ty
            .properties()
            .iter()
            .filter(|property| !property.ty.is_boolean())
            .map(|property| property.name.as_str())
            .collect();
        for property in extracted.ty.properties() {
            let mut spec = ArgSpec::from_property(property.clone());
            if let Some(builtin) = builtins
                .iter()
                .find(|builtin| same_name(&builtin.name, &spec.name))
            {
                spec = spec.merged_with(builtin);
            }
            let negation = format!("{NEGATION_PREFIX}{}", flag_name(&spec.name));
            if property.ty.is_boolean()
                && value_flags.iter().any(|value| same_name(value, &negation))
            {
                spec = spec.without_negation();
            }
            request.add(context, spec);
        }
        for builtin in builtins {
            request.add(context, builtin);
        }
        Ok(request)
    }

    /// Empty request for `source`, used to exercise [`add`](Self::add)
    /// directly.
    #[must_use]
    pub fn empty(source: impl Into<Utf8PathBuf>) -> Self {
        Self {
            source: source.into(),
            builder: ReflectionBuilder::object_literal(),
            args: Vec::new(),
            wrapper: None,
        }
    }

    /// Adds a flag unless one with an equivalent name or alias exists.
    ///
    /// Boolean flags that allow negation are paired with `no-<flag>`; adding
    /// a negation first adds its positive counterpart. When the partner's
    /// name is already held by a non-boolean flag, the boolean stays
    /// unpaired and is marked `skip_negative`. Returns `true` when the flag
    /// was added.
    pub fn add(&mut self, context: &CliContext, spec: ArgSpec) -> bool {
        if self.find(&spec.name).is_some()
            || spec.aliases().iter().any(|alias| self.find(alias).is_some())
        {
            return false;
        }

        let name = flag_name(&spec.name);
        if !spec.property.ty.is_boolean() || spec.skip_negative {
            self.push(context, name, spec);
            return true;
        }

        let negates = spec
            .is_negative_of
            .as_deref()
            .map(flag_name)
            .or_else(|| {
                name.strip_prefix(NEGATION_PREFIX)
                    .filter(|positive| !positive.is_empty())
                    .map(str::to_owned)
            });
        match negates {
            Some(positive) if self.find(&positive).is_some_and(|arg| !arg.is_boolean()) => {
                self.push(
                    context,
                    name,
                    ArgSpec {
                        is_negative_of: None,
                        skip_negative: true,
                        ..spec
                    },
                );
            }
            Some(positive) => {
                let property = spec.property.clone();
                self.push(
                    context,
                    name,
                    ArgSpec {
                        is_negative_of: Some(positive.clone()),
                        skip_negative: true,
                        ..spec
                    },
                );
                if self.find(&positive).is_none() {
                    self.add(context, ArgSpec::positive_of(&positive, &property));
                }
            }
            None => {
                let property = spec.property.clone();
                let index = self.args.len();
                self.push(context, name.clone(), spec);
                if !self.add(context, ArgSpec::negation_of(&name, &property))
                    && let Some(positive) = self.args.get_mut(index)
                {
                    positive.skip_negative = true;
                }
            }
        }
        true
    }

    fn push(&mut self, context: &CliContext, name: String, spec: ArgSpec) {
        let mut property = spec.property;
        property.tags.domain = Some(CLI_DOMAIN.to_owned());
        if !self.builder.try_add(name.clone(), property.clone())
            && let Some(existing) = self.builder.get(&name)
        {
            property = existing.clone();
        }

        if !property.tags.ignore && spec.is_negative_of.is_none() {
            let key = upper_snake(&name);
            let mut parameter = property.clone();
            parameter.name.clone_from(&key);
            if context.register_config_param(&key, parameter) {
                trace!(target: REQUEST_TARGET, key = %key, "registered configuration parameter");
            }
        }

        self.args.push(CommandRequestArg {
            title: property
                .tags
                .title
                .clone()
                .unwrap_or_else(|| title_case(&name)),
            options: option_values(&property.ty),
            name,
            property,
            is_negative_of: spec.is_negative_of,
            skip_negative: spec.skip_negative,
        });
    }

    /// Looks up a flag by name or alias, ignoring case and word separators.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&CommandRequestArg> {
        self.args.iter().find(|arg| {
            same_name(&arg.name, name)
                || same_name(&arg.property.name, name)
                || arg.aliases().iter().any(|alias| same_name(alias, name))
        })
    }

    /// Flags in insertion order.
    #[must_use]
    pub fn args(&self) -> &[CommandRequestArg] {
        &self.args
    }

    /// Flags whose values are passed to the handler.
    pub fn payload_args(&self) -> impl Iterator<Item = &CommandRequestArg> {
        self.args
            .iter()
            .filter(|arg| !arg.is_negation() && !is_scaffold_flag(&arg.name))
    }

    /// The request payload type: declared properties plus every flag.
    #[must_use]
    pub fn payload_type(&self) -> ReflectedType {
        self.builder.build()
    }

    /// Request type as the handler receives it, re-wrapped in its request
    /// wrapper when the handler declared one.
    #[must_use]
    pub fn request_type(&self) -> ReflectedType {
        let payload = self.payload_type();
        match &self.wrapper {
            Some(wrapper) => ReflectedType::object_literal(vec![ReflectedProperty::new(
                WRAPPER_DATA_PROPERTY,
                payload,
            )])
            .with_type_name(wrapper.clone()),
            None => payload,
        }
    }

    /// Request wrapper type name, if the handler declared one.
    #[must_use]
    pub fn wrapper(&self) -> Option<&str> {
        self.wrapper.as_deref()
    }

    /// Source module the request was derived from.
    #[must_use]
    pub fn source(&self) -> &Utf8Path {
        &self.source
    }
}

/// Values a flag accepts, taken from literal, union, and enum types.
///
/// Non-literal union members such as `undefined` or `string` contribute
/// nothing.
#[must_use]
pub fn option_values(ty: &ReflectedType) -> Vec<String> {
    if ty.is_boolean() {
        return Vec::new();
    }
    match &ty.kind {
        TypeKind::Literal(value) => vec![value.to_plain_string()],
        TypeKind::Enum { members, .. } => members
            .iter()
            .map(|member| member.value.to_plain_string())
            .collect(),
        TypeKind::Union(members) => {
            let mut values: Vec<String> = Vec::new();
            for value in members.iter().flat_map(option_values) {
                if !values.contains(&value) {
                    values.push(value);
                }
            }
            values
        }
        TypeKind::Array(element) => option_values(element),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests;
