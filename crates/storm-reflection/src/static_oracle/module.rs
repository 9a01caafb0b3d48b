//! Parsed TypeScript modules held in the oracle's module cache.

use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;

use super::ORACLE_TARGET;
use crate::dialect::SourceDialect;
use crate::error::ReflectionError;

/// A TypeScript module parsed once and shared between resolutions.
///
/// Tree-sitter is error tolerant, so a module with syntax errors still
/// produces a tree; resolution works on whatever declarations survived.
#[derive(Debug)]
pub(crate) struct ParsedModule {
    path: Utf8PathBuf,
    source: String,
    tree: tree_sitter::Tree,
}

impl ParsedModule {
    /// Parses `source` as the module at `path`.
    pub(crate) fn parse(path: &Utf8Path, source: String) -> Result<Self, ReflectionError> {
        let dialect = SourceDialect::from_path(path);
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&dialect.tree_sitter_language())
            .map_err(|error| ReflectionError::ParserInit {
                dialect: dialect.as_str(),
                message: error.to_string(),
            })?;

        let tree = parser
            .parse(&source, None)
            .ok_or_else(|| ReflectionError::parse(path, "parsing failed"))?;

        if tree.root_node().has_error() {
            debug!(
                target: ORACLE_TARGET,
                module = %path,
                "module contains syntax errors; reflecting recoverable declarations"
            );
        }

        Ok(Self {
            path: path.to_owned(),
            source,
            tree,
        })
    }

    /// Path the module was read from.
    pub(crate) fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Root `program` node.
    pub(crate) fn root(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }

    /// Source text covered by `node`.
    pub(crate) fn text(&self, node: tree_sitter::Node<'_>) -> &str {
        self.source.get(node.byte_range()).unwrap_or_default()
    }
}

/// Returns `true` when `node` has an anonymous child token spelled `token`.
pub(crate) fn has_token(node: tree_sitter::Node<'_>, token: &str) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|child| !child.is_named() && child.kind() == token);
    found
}

/// Strips one layer of matching quotes from a string literal.
pub(crate) fn unquote(text: &str) -> &str {
    let trimmed = text.trim();
    for quote in ['"', '\'', '`'] {
        if let Some(inner) = trimmed
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    trimmed
}
