//! Documentation comment parsing.
//!
//! Property and function metadata comes from `/** ... */` blocks. Free text
//! before the first tag becomes the description; recognised tags populate the
//! [`TagBag`] and the raw `@default` value.

use crate::types::{DefaultValue, ReflectedType, TagBag};

use super::module::{ParsedModule, unquote};

/// Metadata parsed from one documentation block.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct DocComment {
    pub(crate) description: Option<String>,
    pub(crate) tags: TagBag,
    pub(crate) default: Option<String>,
}

/// Parses a `/** ... */` block. Plain `//` and `/* */` comments yield `None`.
pub(crate) fn parse_doc_comment(text: &str) -> Option<DocComment> {
    let body = text.trim().strip_prefix("/**")?.strip_suffix("*/")?;

    let mut doc = DocComment::default();
    let mut description: Vec<&str> = Vec::new();
    let mut current: Option<(String, String)> = None;

    for raw in body.lines() {
        let line = raw.trim().trim_start_matches('*').trim();
        if let Some(rest) = line.strip_prefix('@') {
            if let Some((name, value)) = current.take() {
                apply_tag(&mut doc, &name, &value);
            }
            let (name, value) = rest
                .split_once(char::is_whitespace)
                .unwrap_or((rest, ""));
            current = Some((name.to_owned(), value.trim().to_owned()));
        } else if let Some((_, value)) = current.as_mut() {
            if !line.is_empty() {
                if !value.is_empty() {
                    value.push(' ');
                }
                value.push_str(line);
            }
        } else if !line.is_empty() {
            description.push(line);
        }
    }
    if let Some((name, value)) = current.take() {
        apply_tag(&mut doc, &name, &value);
    }

    if doc.description.is_none() && !description.is_empty() {
        doc.description = Some(description.join(" "));
    }
    Some(doc)
}

fn apply_tag(doc: &mut DocComment, name: &str, value: &str) {
    match name {
        "alias" => push_words(&mut doc.tags.alias, value),
        "permission" => push_words(&mut doc.tags.permission, value),
        "title" => doc.tags.title = non_empty(value),
        "domain" => doc.tags.domain = non_empty(value),
        "hidden" => doc.tags.hidden = true,
        "readonly" => doc.tags.readonly = true,
        "ignore" => doc.tags.ignore = true,
        "internal" => doc.tags.internal = true,
        "default" | "defaultValue" => doc.default = non_empty(value),
        "description" | "desc" => doc.description = non_empty(value),
        _ => {}
    }
}

fn push_words(target: &mut Vec<String>, value: &str) {
    for word in value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|word| !word.is_empty())
    {
        if !target.iter().any(|existing| existing == word) {
            target.push(word.to_owned());
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// Finds the documentation block attached to `node`.
///
/// The comment may sit directly before the node or before the export or
/// variable statement wrapping it.
pub(crate) fn leading_doc(
    module: &ParsedModule,
    node: tree_sitter::Node<'_>,
) -> Option<DocComment> {
    let mut current = node;
    loop {
        if let Some(previous) = current.prev_named_sibling()
            && previous.kind() == "comment"
        {
            return parse_doc_comment(module.text(previous));
        }
        match current.parent() {
            Some(parent)
                if matches!(
                    parent.kind(),
                    "export_statement" | "lexical_declaration" | "variable_declaration"
                ) =>
            {
                current = parent;
            }
            _ => return None,
        }
    }
}

/// Interprets a raw `@default` value against the declared type.
pub(crate) fn parse_default(raw: &str, ty: &ReflectedType) -> Option<DefaultValue> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(inner) = trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
    {
        let items = inner
            .split(',')
            .map(|item| unquote(item).to_owned())
            .filter(|item| !item.is_empty())
            .collect();
        return Some(DefaultValue::List(items));
    }
    match trimmed {
        "true" => return Some(DefaultValue::Boolean(true)),
        "false" => return Some(DefaultValue::Boolean(false)),
        _ => {}
    }
    let unquoted = unquote(trimmed);
    if unquoted.len() != trimmed.len() {
        return Some(DefaultValue::String(unquoted.to_owned()));
    }
    if ty.is_numeric() || !matches!(ty.kind, crate::TypeKind::String) {
        if let Ok(number) = trimmed.parse::<f64>() {
            return Some(DefaultValue::Number(number));
        }
    }
    Some(DefaultValue::String(trimmed.to_owned()))
}
