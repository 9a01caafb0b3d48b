//! Syntax-tree walking that turns TypeScript declarations into reflections.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use tracing::debug;
use tree_sitter::Node;

use super::ORACLE_TARGET;
use super::StaticReflectionOracle;
use super::jsdoc::{DocComment, leading_doc, parse_default};
use super::module::{ParsedModule, has_token, unquote};
use crate::error::ReflectionError;
use crate::types::{
    DefaultValue, EnumMember, FunctionSignature, LiteralValue, ReflectedParameter,
    ReflectedProperty, ReflectedType, TypeKind,
};

/// Named-type resolutions deeper than this collapse to `any`, which keeps
/// self-referential types finite.
const MAX_DEPTH: usize = 24;

/// Identifier indirections followed when locating an exported value.
const MAX_HOPS: usize = 8;

pub(super) struct Resolver<'a> {
    oracle: &'a StaticReflectionOracle,
    module: &'a ParsedModule,
    depth: usize,
}

impl<'a> Resolver<'a> {
    pub(super) const fn new(
        oracle: &'a StaticReflectionOracle,
        module: &'a ParsedModule,
        depth: usize,
    ) -> Self {
        Self {
            oracle,
            module,
            depth,
        }
    }

    fn text(&self, node: Node<'a>) -> &'a str {
        self.module.text(node)
    }

    // ------------------------------------------------------------------
    // Exports and declarations
    // ------------------------------------------------------------------

    pub(super) fn reflect_export(
        &self,
        export: Option<&str>,
    ) -> Result<ReflectedType, ReflectionError> {
        let node = self
            .find_export(export)
            .ok_or_else(|| ReflectionError::export_not_found(self.module.path(), export))?;
        self.reflect_value(node, 0)
            .ok_or_else(|| ReflectionError::UnsupportedExport {
                path: self.module.path().to_owned(),
                export: export.unwrap_or("default").to_owned(),
                found: node.kind().to_owned(),
            })
    }

    fn find_export(&self, export: Option<&str>) -> Option<Node<'a>> {
        let wanted = export.unwrap_or("default");
        let root = self.module.root();
        let mut cursor = root.walk();
        for statement in root.named_children(&mut cursor) {
            if statement.kind() != "export_statement" {
                continue;
            }
            if has_token(statement, "default") {
                if wanted != "default" {
                    continue;
                }
                if let Some(declaration) = statement.child_by_field_name("declaration") {
                    return Some(declaration);
                }
                if let Some(value) = statement.child_by_field_name("value") {
                    return match value.kind() {
                        "identifier" => self.find_declaration(self.text(value)),
                        _ => Some(value),
                    };
                }
                continue;
            }
            if let Some(found) = statement
                .child_by_field_name("declaration")
                .and_then(|declaration| self.declaration_named(declaration, wanted))
            {
                return Some(found);
            }
            if let Some(local) = self.export_clause_target(statement, wanted) {
                return self.find_declaration(local);
            }
        }
        None
    }

    /// Resolves `export { local as exported }` to the local name.
    fn export_clause_target(&self, statement: Node<'a>, exported: &str) -> Option<&'a str> {
        if statement.child_by_field_name("source").is_some() {
            return None;
        }
        let mut cursor = statement.walk();
        let clause = statement
            .named_children(&mut cursor)
            .find(|child| child.kind() == "export_clause")?;
        let mut clause_cursor = clause.walk();
        let specifiers: Vec<Node<'a>> = clause
            .named_children(&mut clause_cursor)
            .filter(|child| child.kind() == "export_specifier")
            .collect();
        specifiers.into_iter().find_map(|specifier| {
            let local = self.text(specifier.child_by_field_name("name")?);
            let public = specifier
                .child_by_field_name("alias")
                .map_or(local, |alias| self.text(alias));
            (public == exported).then_some(local)
        })
    }

    /// Finds a top-level declaration (exported or not) by name.
    fn find_declaration(&self, name: &str) -> Option<Node<'a>> {
        let root = self.module.root();
        let mut cursor = root.walk();
        let statements: Vec<Node<'a>> = root.named_children(&mut cursor).collect();
        statements.into_iter().find_map(|statement| {
            if statement.kind() == "export_statement" {
                statement
                    .child_by_field_name("declaration")
                    .and_then(|declaration| self.declaration_named(declaration, name))
            } else {
                self.declaration_named(statement, name)
            }
        })
    }

    fn declaration_named(&self, declaration: Node<'a>, name: &str) -> Option<Node<'a>> {
        match declaration.kind() {
            "function_declaration"
            | "generator_function_declaration"
            | "class_declaration"
            | "abstract_class_declaration"
            | "interface_declaration"
            | "type_alias_declaration"
            | "enum_declaration" => {
                let declared = declaration.child_by_field_name("name")?;
                (self.text(declared) == name).then_some(declaration)
            }
            "lexical_declaration" | "variable_declaration" => {
                let mut cursor = declaration.walk();
                let declarators: Vec<Node<'a>> = declaration
                    .named_children(&mut cursor)
                    .filter(|child| child.kind() == "variable_declarator")
                    .collect();
                declarators.into_iter().find(|declarator| {
                    declarator
                        .child_by_field_name("name")
                        .is_some_and(|declared| self.text(declared) == name)
                })
            }
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // Values
    // ------------------------------------------------------------------

    fn reflect_value(&self, node: Node<'a>, hops: usize) -> Option<ReflectedType> {
        if hops > MAX_HOPS {
            return None;
        }
        match node.kind() {
            "function_declaration"
            | "generator_function_declaration"
            | "function_expression"
            | "function"
            | "generator_function"
            | "arrow_function" => Some(self.reflect_function(node)),
            "class_declaration" | "abstract_class_declaration" | "class" => {
                Some(self.reflect_class(node))
            }
            "interface_declaration" | "type_alias_declaration" | "enum_declaration" => {
                Some(self.reflect_declaration(node))
            }
            "variable_declarator" => {
                let value = node.child_by_field_name("value")?;
                let mut ty = self.reflect_value(value, hops + 1)?;
                if ty.description.is_none()
                    && let Some(doc) = leading_doc(self.module, node)
                {
                    apply_doc(&mut ty, doc);
                }
                Some(ty)
            }
            "identifier" => {
                let declaration = self.find_declaration(self.text(node))?;
                self.reflect_value(declaration, hops + 1)
            }
            "parenthesized_expression" | "as_expression" | "satisfies_expression" => {
                self.reflect_value(node.named_child(0)?, hops + 1)
            }
            // `defineCommand(async (request) => ...)` style wrappers.
            "call_expression" => {
                let arguments = node.child_by_field_name("arguments")?;
                let mut cursor = arguments.walk();
                let first = arguments.named_children(&mut cursor).next()?;
                self.reflect_value(first, hops + 1)
            }
            _ => None,
        }
    }

    fn reflect_function(&self, node: Node<'a>) -> ReflectedType {
        let name = node
            .child_by_field_name("name")
            .map(|declared| self.text(declared).to_owned());
        let parameters = match node.child_by_field_name("parameters") {
            Some(parameters) => self.reflect_parameters(parameters),
            None => node
                .child_by_field_name("parameter")
                .map(|single| {
                    vec![ReflectedParameter {
                        name: self.text(single).to_owned(),
                        ty: ReflectedType::any(),
                        optional: false,
                        default: None,
                    }]
                })
                .unwrap_or_default(),
        };
        let returns = node
            .child_by_field_name("return_type")
            .map_or_else(ReflectedType::void, |annotation| self.reflect_annotation(annotation));

        let mut ty = ReflectedType::function(FunctionSignature {
            name,
            parameters,
            returns: Box::new(returns),
        });
        if let Some(doc) = leading_doc(self.module, node) {
            apply_doc(&mut ty, doc);
        }
        ty
    }

    fn reflect_parameters(&self, parameters: Node<'a>) -> Vec<ReflectedParameter> {
        let mut cursor = parameters.walk();
        let nodes: Vec<Node<'a>> = parameters
            .named_children(&mut cursor)
            .filter(|child| matches!(child.kind(), "required_parameter" | "optional_parameter"))
            .collect();
        nodes
            .into_iter()
            .enumerate()
            .map(|(index, parameter)| {
                let name = parameter
                    .child_by_field_name("pattern")
                    .filter(|pattern| pattern.kind() == "identifier")
                    .map_or_else(
                        || {
                            if index == 0 {
                                "request".to_owned()
                            } else {
                                format!("arg{index}")
                            }
                        },
                        |pattern| self.text(pattern).to_owned(),
                    );
                let value = parameter.child_by_field_name("value");
                let ty = parameter
                    .child_by_field_name("type")
                    .map(|annotation| self.reflect_annotation(annotation))
                    .or_else(|| value.and_then(|initializer| self.infer_from_value(initializer)))
                    .unwrap_or_else(ReflectedType::any);
                let default = value.and_then(|initializer| self.literal_default(initializer));
                ReflectedParameter {
                    name,
                    ty,
                    optional: parameter.kind() == "optional_parameter" || default.is_some(),
                    default,
                }
            })
            .collect()
    }

    fn reflect_class(&self, node: Node<'a>) -> ReflectedType {
        let name = node
            .child_by_field_name("name")
            .map_or_else(|| "AnonymousClass".to_owned(), |declared| self.text(declared).to_owned());

        let mut properties = self.base_class_properties(node);
        if let Some(body) = node.child_by_field_name("body") {
            merge_properties(&mut properties, self.reflect_members(body));
        }

        let mut ty = ReflectedType::class(name, properties);
        if let Some(doc) = leading_doc(self.module, node) {
            apply_doc(&mut ty, doc);
        }
        ty
    }

    fn base_class_properties(&self, node: Node<'a>) -> Vec<ReflectedProperty> {
        let mut cursor = node.walk();
        let Some(heritage) = node
            .named_children(&mut cursor)
            .find(|child| child.kind() == "class_heritage")
        else {
            return Vec::new();
        };
        let mut heritage_cursor = heritage.walk();
        let Some(extends) = heritage
            .named_children(&mut heritage_cursor)
            .find(|child| child.kind() == "extends_clause")
        else {
            return Vec::new();
        };
        extends
            .child_by_field_name("value")
            .filter(|value| value.kind() == "identifier")
            .map(|value| self.resolve_named(self.text(value)))
            .map(|base| base.properties().to_vec())
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------

    fn reflect_declaration(&self, node: Node<'a>) -> ReflectedType {
        let name = node
            .child_by_field_name("name")
            .map(|declared| self.text(declared).to_owned())
            .unwrap_or_default();
        let mut ty = match node.kind() {
            "interface_declaration" => {
                let mut properties = self.interface_bases(node);
                if let Some(body) = node.child_by_field_name("body") {
                    merge_properties(&mut properties, self.reflect_members(body));
                }
                ReflectedType::object_literal(properties).with_type_name(name)
            }
            "type_alias_declaration" => {
                let mut ty = node
                    .child_by_field_name("value")
                    .map_or_else(ReflectedType::any, |value| self.reflect_type(value));
                if ty.type_name.is_none() {
                    ty.type_name = Some(name);
                }
                ty
            }
            "enum_declaration" => self.reflect_enum(node, name),
            "class_declaration" | "abstract_class_declaration" => self.reflect_class(node),
            _ => ReflectedType::any().with_type_name(name),
        };
        if let Some(doc) = leading_doc(self.module, node) {
            apply_doc(&mut ty, doc);
        }
        ty
    }

    fn interface_bases(&self, node: Node<'a>) -> Vec<ReflectedProperty> {
        let mut cursor = node.walk();
        let clauses: Vec<Node<'a>> = node
            .named_children(&mut cursor)
            .filter(|child| child.kind() == "extends_type_clause")
            .collect();
        let mut properties = Vec::new();
        for clause in clauses {
            let mut clause_cursor = clause.walk();
            let bases: Vec<Node<'a>> = clause.named_children(&mut clause_cursor).collect();
            for base in bases {
                merge_properties(&mut properties, self.reflect_type(base).properties().to_vec());
            }
        }
        properties
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "numeric enum members continue from the previous member's value"
    )]
    fn reflect_enum(&self, node: Node<'a>, name: String) -> ReflectedType {
        let mut members = Vec::new();
        if let Some(body) = node.child_by_field_name("body") {
            let mut cursor = body.walk();
            let mut next_number = 0.0_f64;
            let entries: Vec<Node<'a>> = body.named_children(&mut cursor).collect();
            for entry in entries {
                let (member_name, declared) = match entry.kind() {
                    "property_identifier" | "string" => {
                        (unquote(self.text(entry)).to_owned(), None)
                    }
                    "enum_assignment" => (
                        entry
                            .child_by_field_name("name")
                            .map(|declared| unquote(self.text(declared)).to_owned())
                            .unwrap_or_default(),
                        entry
                            .child_by_field_name("value")
                            .and_then(|value| self.literal_value(value)),
                    ),
                    _ => continue,
                };
                let value = declared.unwrap_or(LiteralValue::Number(next_number));
                if let LiteralValue::Number(number) = value {
                    next_number = number + 1.0;
                }
                members.push(EnumMember {
                    name: member_name,
                    value,
                });
            }
        }
        ReflectedType::enumeration(name, members)
    }

    fn reflect_members(&self, body: Node<'a>) -> Vec<ReflectedProperty> {
        let mut cursor = body.walk();
        let members: Vec<Node<'a>> = body.named_children(&mut cursor).collect();
        members
            .into_iter()
            .filter_map(|member| match member.kind() {
                "property_signature" => Some(self.reflect_property_signature(member)),
                "public_field_definition" | "field_definition" => self.reflect_field(member),
                _ => None,
            })
            .collect()
    }

    fn reflect_property_signature(&self, node: Node<'a>) -> ReflectedProperty {
        let name = node
            .child_by_field_name("name")
            .map(|declared| unquote(self.text(declared)).to_owned())
            .unwrap_or_default();
        let ty = node
            .child_by_field_name("type")
            .map_or_else(ReflectedType::any, |annotation| self.reflect_annotation(annotation));
        let mut property = ReflectedProperty::new(name, ty);
        property.optional = has_token(node, "?");
        property.tags.readonly = has_token(node, "readonly");
        if let Some(doc) = leading_doc(self.module, node) {
            apply_property_doc(&mut property, doc);
        }
        property
    }

    fn reflect_field(&self, node: Node<'a>) -> Option<ReflectedProperty> {
        if has_token(node, "static") {
            return None;
        }
        let mut cursor = node.walk();
        let restricted = node.named_children(&mut cursor).any(|child| {
            child.kind() == "accessibility_modifier"
                && matches!(self.text(child), "private" | "protected")
        });
        if restricted {
            return None;
        }

        let name = unquote(self.text(node.child_by_field_name("name")?)).to_owned();
        let value = node.child_by_field_name("value");
        let ty = node
            .child_by_field_name("type")
            .map(|annotation| self.reflect_annotation(annotation))
            .or_else(|| value.and_then(|initializer| self.infer_from_value(initializer)))
            .unwrap_or_else(ReflectedType::any);
        let mut property = ReflectedProperty::new(name, ty);
        property.default = value.and_then(|initializer| self.literal_default(initializer));
        property.optional = has_token(node, "?") || property.default.is_some();
        property.tags.readonly = has_token(node, "readonly");
        if let Some(doc) = leading_doc(self.module, node) {
            apply_property_doc(&mut property, doc);
        }
        Some(property)
    }

    fn reflect_annotation(&self, node: Node<'a>) -> ReflectedType {
        if node.kind() == "type_annotation" {
            return node
                .named_child(0)
                .map_or_else(ReflectedType::any, |inner| self.reflect_type(inner));
        }
        self.reflect_type(node)
    }

    fn reflect_type(&self, node: Node<'a>) -> ReflectedType {
        match node.kind() {
            "type_annotation" => self.reflect_annotation(node),
            "predefined_type" => predefined(self.text(node)),
            "type_identifier" => self.reflect_named(self.text(node), &[]),
            "nested_type_identifier" => ReflectedType::any().with_type_name(self.text(node)),
            "generic_type" => {
                let name = node
                    .child_by_field_name("name")
                    .map(|declared| self.text(declared))
                    .unwrap_or_default();
                let arguments: Vec<Node<'a>> = node
                    .child_by_field_name("type_arguments")
                    .map(|list| {
                        let mut cursor = list.walk();
                        list.named_children(&mut cursor).collect()
                    })
                    .unwrap_or_default();
                self.reflect_named(name, &arguments)
            }
            "object_type" | "interface_body" => {
                ReflectedType::object_literal(self.reflect_members(node))
            }
            "union_type" => self.reflect_union(node),
            "intersection_type" => {
                let mut cursor = node.walk();
                let parts: Vec<Node<'a>> = node.named_children(&mut cursor).collect();
                let mut properties = Vec::new();
                for part in parts {
                    let members = self.reflect_type(part).properties().to_vec();
                    merge_properties(&mut properties, members);
                }
                ReflectedType::object_literal(properties)
            }
            "literal_type" => node
                .named_child(0)
                .map_or_else(ReflectedType::any, |literal| self.reflect_literal(literal)),
            "template_literal_type" => ReflectedType::string(),
            "array_type" => ReflectedType::array(
                node.named_child(0)
                    .map_or_else(ReflectedType::any, |element| self.reflect_type(element)),
            ),
            "tuple_type" => ReflectedType::array(ReflectedType::any()),
            "parenthesized_type" | "readonly_type" => node
                .named_child(0)
                .map_or_else(ReflectedType::any, |inner| self.reflect_type(inner)),
            "function_type" => {
                let parameters = node
                    .child_by_field_name("parameters")
                    .map(|parameters| self.reflect_parameters(parameters))
                    .unwrap_or_default();
                let returns = node
                    .child_by_field_name("return_type")
                    .map_or_else(ReflectedType::void, |returns| self.reflect_type(returns));
                ReflectedType::function(FunctionSignature {
                    name: None,
                    parameters,
                    returns: Box::new(returns),
                })
            }
            _ => ReflectedType::any(),
        }
    }

    fn reflect_union(&self, node: Node<'a>) -> ReflectedType {
        let mut members = Vec::new();
        self.collect_union_members(node, &mut members);
        let mut types: Vec<ReflectedType> = members
            .into_iter()
            .map(|member| self.reflect_type(member))
            .filter(|ty| !matches!(ty.kind, TypeKind::Void))
            .collect();

        if types.len() > 1 && types.iter().all(ReflectedType::is_boolean) {
            return ReflectedType::boolean();
        }
        if types.len() == 1 {
            return types.pop().unwrap_or_else(ReflectedType::void);
        }
        if types.is_empty() {
            return ReflectedType::void();
        }
        ReflectedType::union(types)
    }

    fn collect_union_members(&self, node: Node<'a>, members: &mut Vec<Node<'a>>) {
        if node.kind() != "union_type" {
            members.push(node);
            return;
        }
        let mut cursor = node.walk();
        let children: Vec<Node<'a>> = node.named_children(&mut cursor).collect();
        for child in children {
            self.collect_union_members(child, members);
        }
    }

    fn reflect_literal(&self, node: Node<'a>) -> ReflectedType {
        match node.kind() {
            "null" | "undefined" => ReflectedType::void(),
            _ => self
                .literal_value(node)
                .map_or_else(ReflectedType::any, ReflectedType::literal),
        }
    }

    fn reflect_named(&self, name: &str, arguments: &[Node<'a>]) -> ReflectedType {
        let first = || {
            arguments
                .first()
                .map(|argument| self.reflect_type(*argument))
        };
        match name {
            "Promise" | "PromiseLike" | "Awaited" | "Readonly" | "Required" | "NonNullable" => {
                first().unwrap_or_else(ReflectedType::void)
            }
            "Partial" => {
                let mut ty = first().unwrap_or_else(ReflectedType::object);
                if let Some(properties) = ty.properties_mut() {
                    for property in properties {
                        property.optional = true;
                    }
                }
                ty
            }
            "Array" | "ReadonlyArray" | "Set" | "ReadonlySet" => {
                ReflectedType::array(first().unwrap_or_else(ReflectedType::any))
            }
            "Record" | "Map" | "ReadonlyMap" => ReflectedType::object().with_type_name(name),
            wrapper if self.oracle.is_request_wrapper(wrapper) => {
                let data = first().unwrap_or_else(ReflectedType::object);
                ReflectedType::object_literal(vec![ReflectedProperty::new("data", data)])
                    .with_type_name(wrapper)
            }
            _ => self.resolve_named(name),
        }
    }

    /// Resolves a named type, collapsing unknown names to `any`.
    fn resolve_named(&self, name: &str) -> ReflectedType {
        self.resolve_declared(name).unwrap_or_else(|| {
            debug!(
                target: ORACLE_TARGET,
                module = %self.module.path(),
                type_name = name,
                "type could not be resolved; treating it as any"
            );
            ReflectedType::any().with_type_name(name)
        })
    }

    /// Resolves a named type declared locally or imported from a relative
    /// module.
    pub(super) fn resolve_declared(&self, name: &str) -> Option<ReflectedType> {
        if self.depth >= MAX_DEPTH {
            return Some(ReflectedType::any().with_type_name(name));
        }
        if let Some(declaration) = self.find_declaration(name) {
            let nested = Resolver::new(self.oracle, self.module, self.depth + 1);
            return match declaration.kind() {
                "variable_declarator" => nested.reflect_value(declaration, 0),
                _ => Some(nested.reflect_declaration(declaration)),
            };
        }
        let (path, original) = self.import_source(name)?;
        match self.oracle.module(&path) {
            Ok(module) => {
                Resolver::new(self.oracle, &module, self.depth + 1).resolve_declared(&original)
            }
            Err(error) => {
                debug!(
                    target: ORACLE_TARGET,
                    module = %path,
                    %error,
                    "imported module could not be loaded"
                );
                None
            }
        }
    }

    /// Finds the relative module a type name is imported from.
    fn import_source(&self, name: &str) -> Option<(Utf8PathBuf, String)> {
        let root = self.module.root();
        let mut cursor = root.walk();
        let imports: Vec<Node<'a>> = root
            .named_children(&mut cursor)
            .filter(|child| child.kind() == "import_statement")
            .collect();
        for import in imports {
            let Some(source) = import.child_by_field_name("source") else {
                continue;
            };
            let specifier = unquote(self.text(source));
            if !specifier.starts_with('.') {
                continue;
            }
            let Some(original) = self.imported_name(import, name) else {
                continue;
            };
            let directory = self.module.path().parent().unwrap_or_else(|| Utf8Path::new(""));
            let base = normalize(&directory.join(specifier));
            let candidates = [
                base.with_extension("ts"),
                base.with_extension("tsx"),
                base.join("index.ts"),
                base.clone(),
            ];
            if let Some(found) = candidates.into_iter().find(|candidate| candidate.is_file()) {
                return Some((found, original));
            }
        }
        None
    }

    fn imported_name(&self, import: Node<'a>, local: &str) -> Option<String> {
        let mut cursor = import.walk();
        let clause = import
            .named_children(&mut cursor)
            .find(|child| child.kind() == "import_clause")?;
        let mut clause_cursor = clause.walk();
        let named = clause
            .named_children(&mut clause_cursor)
            .find(|child| child.kind() == "named_imports")?;
        let mut named_cursor = named.walk();
        let specifiers: Vec<Node<'a>> = named
            .named_children(&mut named_cursor)
            .filter(|child| child.kind() == "import_specifier")
            .collect();
        specifiers.into_iter().find_map(|specifier| {
            let original = self.text(specifier.child_by_field_name("name")?);
            let alias = specifier
                .child_by_field_name("alias")
                .map_or(original, |alias| self.text(alias));
            (alias == local).then(|| original.to_owned())
        })
    }

    // ------------------------------------------------------------------
    // Literal values
    // ------------------------------------------------------------------

    fn literal_value(&self, node: Node<'a>) -> Option<LiteralValue> {
        let text = self.text(node);
        match node.kind() {
            "string" => Some(LiteralValue::String(unquote(text).to_owned())),
            "template_string" if !text.contains("${") => {
                Some(LiteralValue::String(unquote(text).to_owned()))
            }
            "number" | "unary_expression" => text.parse::<f64>().ok().map(LiteralValue::Number),
            "true" => Some(LiteralValue::Boolean(true)),
            "false" => Some(LiteralValue::Boolean(false)),
            _ => None,
        }
    }

    fn literal_default(&self, node: Node<'a>) -> Option<DefaultValue> {
        if node.kind() == "array" {
            let mut cursor = node.walk();
            let items: Vec<Node<'a>> = node.named_children(&mut cursor).collect();
            return items
                .into_iter()
                .map(|item| self.literal_value(item).map(|value| value.to_plain_string()))
                .collect::<Option<Vec<String>>>()
                .map(DefaultValue::List);
        }
        self.literal_value(node).map(|value| match value {
            LiteralValue::String(text) => DefaultValue::String(text),
            LiteralValue::Number(number) => DefaultValue::Number(number),
            LiteralValue::Boolean(flag) => DefaultValue::Boolean(flag),
        })
    }

    fn infer_from_value(&self, node: Node<'a>) -> Option<ReflectedType> {
        match node.kind() {
            "array" => {
                let element = node
                    .named_child(0)
                    .and_then(|first| self.infer_from_value(first))
                    .unwrap_or_else(ReflectedType::any);
                Some(ReflectedType::array(element))
            }
            _ => self.literal_value(node).map(|value| match value {
                LiteralValue::String(_) => ReflectedType::string(),
                LiteralValue::Number(_) => ReflectedType::number(),
                LiteralValue::Boolean(_) => ReflectedType::boolean(),
            }),
        }
    }
}

fn predefined(text: &str) -> ReflectedType {
    match text {
        "string" => ReflectedType::string(),
        "number" | "bigint" => ReflectedType::number(),
        "boolean" => ReflectedType::boolean(),
        "void" | "undefined" | "never" | "null" => ReflectedType::void(),
        "object" => ReflectedType::object(),
        _ => ReflectedType::any(),
    }
}

/// Appends `additions`, letting later declarations replace earlier ones of the
/// same name (interface members override inherited members).
fn merge_properties(properties: &mut Vec<ReflectedProperty>, additions: Vec<ReflectedProperty>) {
    for addition in additions {
        match properties
            .iter_mut()
            .find(|existing| existing.name == addition.name)
        {
            Some(existing) => *existing = addition,
            None => properties.push(addition),
        }
    }
}

fn apply_doc(ty: &mut ReflectedType, doc: DocComment) {
    if doc.description.is_some() {
        ty.description = doc.description;
    }
    ty.tags = ty.tags.merged(&doc.tags);
}

fn apply_property_doc(property: &mut ReflectedProperty, doc: DocComment) {
    if let Some(raw) = doc.default.as_deref() {
        property.default = parse_default(raw, &property.ty);
    }
    if doc.description.is_some() {
        property.description = doc.description;
    }
    property.tags = property.tags.merged(&doc.tags);
}

/// Folds `.` and `..` components so every module has one cache key.
fn normalize(path: &Utf8Path) -> Utf8PathBuf {
    let mut normalized = Utf8PathBuf::new();
    for component in path.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                if normalized.file_name().is_none() || !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_str()),
        }
    }
    normalized
}
