//! Structural type descriptions produced by a reflection oracle.
//!
//! A [`ReflectedType`] is a closed, tagged description of a TypeScript type:
//! its [`TypeKind`] plus the description, default value, and [`TagBag`] that
//! the declaration carried. The model deliberately avoids self-describing
//! values (no `serde_json::Value`) so whole graphs can round-trip through the
//! binary codec in [`crate::codec`].

use serde::{Deserialize, Serialize};

/// Literal value carried by a literal type or an enum member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LiteralValue {
    /// A string literal such as `"prod"`.
    String(String),
    /// A numeric literal.
    Number(f64),
    /// `true` or `false`.
    Boolean(bool),
}

impl LiteralValue {
    /// Renders the literal as TypeScript source text.
    #[must_use]
    pub fn to_typescript(&self) -> String {
        match self {
            Self::String(value) => quote(value),
            Self::Number(value) => format!("{value}"),
            Self::Boolean(value) => value.to_string(),
        }
    }

    /// Returns the literal as a plain, unquoted string.
    #[must_use]
    pub fn to_plain_string(&self) -> String {
        match self {
            Self::String(value) => value.clone(),
            Self::Number(value) => format!("{value}"),
            Self::Boolean(value) => value.to_string(),
        }
    }
}

/// Default value attached to a type, parameter, or property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DefaultValue {
    /// A string default.
    String(String),
    /// A numeric default.
    Number(f64),
    /// A boolean default.
    Boolean(bool),
    /// A list of string values, used for array-typed flags.
    List(Vec<String>),
}

impl DefaultValue {
    /// Renders the value as a TypeScript expression.
    #[must_use]
    pub fn to_typescript(&self) -> String {
        match self {
            Self::String(value) => quote(value),
            Self::Number(value) => format!("{value}"),
            Self::Boolean(value) => value.to_string(),
            Self::List(values) => {
                let items: Vec<String> = values.iter().map(|value| quote(value)).collect();
                format!("[{}]", items.join(", "))
            }
        }
    }

    /// Returns the boolean payload, if this is a boolean default.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    /// Renders the value for human-facing text such as usage tables.
    #[must_use]
    pub fn to_display_string(&self) -> String {
        match self {
            Self::String(value) => value.clone(),
            Self::Number(value) => format!("{value}"),
            Self::Boolean(value) => value.to_string(),
            Self::List(values) => values.join(", "),
        }
    }
}

/// Per-declaration metadata collected from documentation tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagBag {
    /// Alternative names the declaration answers to.
    pub alias: Vec<String>,
    /// Human-facing title.
    pub title: Option<String>,
    /// Hidden from generated help output.
    pub hidden: bool,
    /// Value may not be changed after start-up.
    pub readonly: bool,
    /// Excluded from generated configuration surfaces.
    pub ignore: bool,
    /// Internal to the framework.
    pub internal: bool,
    /// Permissions required to use the declaration.
    pub permission: Vec<String>,
    /// Owning domain (for example `cli`).
    pub domain: Option<String>,
}

impl TagBag {
    /// Merges `overrides` onto `self`.
    ///
    /// Scalar values from `overrides` win when present, flags are combined
    /// with a logical or, and list values are unioned preserving order.
    #[must_use]
    pub fn merged(&self, overrides: &Self) -> Self {
        Self {
            alias: union(&self.alias, &overrides.alias),
            title: overrides.title.clone().or_else(|| self.title.clone()),
            hidden: self.hidden || overrides.hidden,
            readonly: self.readonly || overrides.readonly,
            ignore: self.ignore || overrides.ignore,
            internal: self.internal || overrides.internal,
            permission: union(&self.permission, &overrides.permission),
            domain: overrides.domain.clone().or_else(|| self.domain.clone()),
        }
    }

    /// Returns `true` when no tag has been set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

fn union(left: &[String], right: &[String]) -> Vec<String> {
    let mut merged = left.to_vec();
    for value in right {
        if !merged.contains(value) {
            merged.push(value.clone());
        }
    }
    merged
}

/// Named property of an object-literal or class type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReflectedProperty {
    /// Property name exactly as declared.
    pub name: String,
    /// Declared type of the property.
    pub ty: ReflectedType,
    /// Whether the property was declared optional.
    pub optional: bool,
    /// Declared default value.
    pub default: Option<DefaultValue>,
    /// Free-text description from the declaration's documentation.
    pub description: Option<String>,
    /// Tags from the declaration's documentation.
    pub tags: TagBag,
}

impl ReflectedProperty {
    /// Creates a required property without metadata.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: ReflectedType) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: false,
            default: None,
            description: None,
            tags: TagBag::default(),
        }
    }

    /// Marks the property optional.
    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replaces the tag bag.
    #[must_use]
    pub fn with_tags(mut self, tags: TagBag) -> Self {
        self.tags = tags;
        self
    }

    /// Returns the property's description, falling back to its type's.
    #[must_use]
    pub fn effective_description(&self) -> Option<&str> {
        self.description
            .as_deref()
            .or(self.ty.description.as_deref())
    }

    /// Returns the property's default, falling back to its type's.
    #[must_use]
    pub fn effective_default(&self) -> Option<&DefaultValue> {
        self.default.as_ref().or(self.ty.default.as_ref())
    }
}

/// Parameter of a reflected function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReflectedParameter {
    /// Parameter name (`request` for destructured patterns).
    pub name: String,
    /// Declared type.
    pub ty: ReflectedType,
    /// Whether the parameter may be omitted.
    pub optional: bool,
    /// Default value expression, when it is a simple literal.
    pub default: Option<DefaultValue>,
}

/// Call signature of a reflected function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSignature {
    /// Declared function name, if any.
    pub name: Option<String>,
    /// Ordered parameters.
    pub parameters: Vec<ReflectedParameter>,
    /// Declared return type with any `Promise` wrapper removed.
    pub returns: Box<ReflectedType>,
}

/// Member of a reflected enum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumMember {
    /// Member name.
    pub name: String,
    /// Member value.
    pub value: LiteralValue,
}

/// Discriminant and payload of a [`ReflectedType`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeKind {
    /// `string`
    String,
    /// `number`
    Number,
    /// `boolean`
    Boolean,
    /// `void`, `undefined`, or `never`
    Void,
    /// `any` or `unknown`
    Any,
    /// The generic `object` type.
    Object,
    /// A single literal value.
    Literal(LiteralValue),
    /// A named enum.
    Enum {
        /// Enum name.
        name: String,
        /// Declared members.
        members: Vec<EnumMember>,
    },
    /// Homogeneous array.
    Array(Box<ReflectedType>),
    /// Union of two or more member types.
    Union(Vec<ReflectedType>),
    /// Anonymous object shape, interface, or type-alias object.
    ObjectLiteral(Vec<ReflectedProperty>),
    /// Named class with fields.
    Class {
        /// Class name.
        name: String,
        /// Declared fields.
        properties: Vec<ReflectedProperty>,
    },
    /// Callable.
    Function(FunctionSignature),
}

/// Structural description of a type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReflectedType {
    /// Kind and payload.
    pub kind: TypeKind,
    /// Declared name (interface, alias, or wrapper name), when known.
    pub type_name: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
    /// Default value.
    pub default: Option<DefaultValue>,
    /// Documentation tags.
    pub tags: TagBag,
}

impl ReflectedType {
    /// Creates a type of the given kind without metadata.
    #[must_use]
    pub fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            type_name: None,
            description: None,
            default: None,
            tags: TagBag::default(),
        }
    }

    /// `string`
    #[must_use]
    pub fn string() -> Self {
        Self::new(TypeKind::String)
    }

    /// `number`
    #[must_use]
    pub fn number() -> Self {
        Self::new(TypeKind::Number)
    }

    /// `boolean`
    #[must_use]
    pub fn boolean() -> Self {
        Self::new(TypeKind::Boolean)
    }

    /// `void`
    #[must_use]
    pub fn void() -> Self {
        Self::new(TypeKind::Void)
    }

    /// `any`
    #[must_use]
    pub fn any() -> Self {
        Self::new(TypeKind::Any)
    }

    /// The generic `object` type.
    #[must_use]
    pub fn object() -> Self {
        Self::new(TypeKind::Object)
    }

    /// A literal type.
    #[must_use]
    pub fn literal(value: LiteralValue) -> Self {
        Self::new(TypeKind::Literal(value))
    }

    /// An array of `element`.
    #[must_use]
    pub fn array(element: Self) -> Self {
        Self::new(TypeKind::Array(Box::new(element)))
    }

    /// A union of `members`.
    #[must_use]
    pub fn union(members: Vec<Self>) -> Self {
        Self::new(TypeKind::Union(members))
    }

    /// An anonymous object shape.
    #[must_use]
    pub fn object_literal(properties: Vec<ReflectedProperty>) -> Self {
        Self::new(TypeKind::ObjectLiteral(properties))
    }

    /// A named class.
    #[must_use]
    pub fn class(name: impl Into<String>, properties: Vec<ReflectedProperty>) -> Self {
        let type_name: String = name.into();
        Self::new(TypeKind::Class {
            name: type_name.clone(),
            properties,
        })
        .with_type_name(type_name)
    }

    /// A function type.
    #[must_use]
    pub fn function(signature: FunctionSignature) -> Self {
        Self::new(TypeKind::Function(signature))
    }

    /// A named enum.
    #[must_use]
    pub fn enumeration(name: impl Into<String>, members: Vec<EnumMember>) -> Self {
        let type_name: String = name.into();
        Self::new(TypeKind::Enum {
            name: type_name.clone(),
            members,
        })
        .with_type_name(type_name)
    }

    /// Sets the declared type name.
    #[must_use]
    pub fn with_type_name(mut self, name: impl Into<String>) -> Self {
        self.type_name = Some(name.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    /// Replaces the tag bag.
    #[must_use]
    pub fn with_tags(mut self, tags: TagBag) -> Self {
        self.tags = tags;
        self
    }

    /// Returns the camel-cased kind name used in diagnostics.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match &self.kind {
            TypeKind::String => "string",
            TypeKind::Number => "number",
            TypeKind::Boolean => "boolean",
            TypeKind::Void => "void",
            TypeKind::Any => "any",
            TypeKind::Object => "object",
            TypeKind::Literal(_) => "literal",
            TypeKind::Enum { .. } => "enum",
            TypeKind::Array(_) => "array",
            TypeKind::Union(_) => "union",
            TypeKind::ObjectLiteral(_) => "objectLiteral",
            TypeKind::Class { .. } => "class",
            TypeKind::Function(_) => "function",
        }
    }

    /// Returns `true` for object-literal and class types.
    #[must_use]
    pub const fn is_object_like(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::ObjectLiteral(_) | TypeKind::Class { .. }
        )
    }

    /// Returns `true` for boolean types, boolean literals, and unions made
    /// only of boolean members.
    #[must_use]
    pub fn is_boolean(&self) -> bool {
        match &self.kind {
            TypeKind::Boolean | TypeKind::Literal(LiteralValue::Boolean(_)) => true,
            TypeKind::Union(members) => {
                !members.is_empty() && members.iter().all(Self::is_boolean)
            }
            _ => false,
        }
    }

    /// Returns `true` for array types.
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self.kind, TypeKind::Array(_))
    }

    /// Returns `true` for numbers, numeric literals, and numeric enums.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        match &self.kind {
            TypeKind::Number | TypeKind::Literal(LiteralValue::Number(_)) => true,
            TypeKind::Enum { members, .. } => {
                !members.is_empty()
                    && members
                        .iter()
                        .all(|member| matches!(member.value, LiteralValue::Number(_)))
            }
            TypeKind::Union(members) => !members.is_empty() && members.iter().all(Self::is_numeric),
            _ => false,
        }
    }

    /// Returns the element type of an array.
    #[must_use]
    pub fn element(&self) -> Option<&Self> {
        match &self.kind {
            TypeKind::Array(element) => Some(element),
            _ => None,
        }
    }

    /// Returns the function signature of a function type.
    #[must_use]
    pub const fn as_function(&self) -> Option<&FunctionSignature> {
        match &self.kind {
            TypeKind::Function(signature) => Some(signature),
            _ => None,
        }
    }

    /// Returns the properties of an object-literal or class type.
    ///
    /// Other kinds have no properties and return an empty slice.
    #[must_use]
    pub fn properties(&self) -> &[ReflectedProperty] {
        match &self.kind {
            TypeKind::ObjectLiteral(properties) | TypeKind::Class { properties, .. } => properties,
            _ => &[],
        }
    }

    /// Mutable access to the properties of an object-literal or class type.
    pub fn properties_mut(&mut self) -> Option<&mut Vec<ReflectedProperty>> {
        match &mut self.kind {
            TypeKind::ObjectLiteral(properties) | TypeKind::Class { properties, .. } => {
                Some(properties)
            }
            _ => None,
        }
    }

    /// Looks up a property by its declared name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&ReflectedProperty> {
        self.properties()
            .iter()
            .find(|property| property.name == name)
    }

    /// Returns `true` when a property with `name` is declared.
    #[must_use]
    pub fn has_property(&self, name: &str) -> bool {
        self.property(name).is_some()
    }

    /// Renders the type as a TypeScript type expression.
    #[must_use]
    pub fn signature(&self) -> String {
        match &self.kind {
            TypeKind::String => "string".to_owned(),
            TypeKind::Number => "number".to_owned(),
            TypeKind::Boolean => "boolean".to_owned(),
            TypeKind::Void => "void".to_owned(),
            TypeKind::Any => "any".to_owned(),
            TypeKind::Object => "object".to_owned(),
            TypeKind::Literal(value) => value.to_typescript(),
            TypeKind::Enum { name, .. } | TypeKind::Class { name, .. } => name.clone(),
            TypeKind::Array(element) => match element.kind {
                TypeKind::Union(_) | TypeKind::Function(_) => {
                    format!("({})[]", element.signature())
                }
                _ => format!("{}[]", element.signature()),
            },
            TypeKind::Union(members) => members
                .iter()
                .map(Self::signature)
                .collect::<Vec<_>>()
                .join(" | "),
            TypeKind::ObjectLiteral(properties) => render_object(properties),
            TypeKind::Function(signature) => {
                let parameters: Vec<String> = signature
                    .parameters
                    .iter()
                    .map(|parameter| {
                        let marker = if parameter.optional { "?" } else { "" };
                        format!("{}{marker}: {}", parameter.name, parameter.ty.signature())
                    })
                    .collect();
                format!(
                    "({}) => {}",
                    parameters.join(", "),
                    signature.returns.signature()
                )
            }
        }
    }
}

fn render_object(properties: &[ReflectedProperty]) -> String {
    if properties.is_empty() {
        return "{}".to_owned();
    }
    let fields: Vec<String> = properties
        .iter()
        .map(|property| {
            let marker = if property.optional { "?" } else { "" };
            format!(
                "{}{marker}: {}",
                property_key(&property.name),
                property.ty.signature()
            )
        })
        .collect();
    format!("{{ {} }}", fields.join("; "))
}

/// Renders `name` as an object key, quoting it when it is not an identifier.
#[must_use]
pub fn property_key(name: &str) -> String {
    let is_identifier = name
        .chars()
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_' || first == '$')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if is_identifier {
        name.to_owned()
    } else {
        quote(name)
    }
}

/// Quotes `value` as a double-quoted TypeScript string literal.
#[must_use]
pub fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            other => quoted.push(other),
        }
    }
    quoted.push('"');
    quoted
}
