//! TypeScript dialect detection and Tree-sitter grammar selection.

use std::fmt;

use camino::Utf8Path;

/// TypeScript dialects the static oracle can parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SourceDialect {
    /// Plain TypeScript (`.ts`, `.mts`, `.cts`).
    #[default]
    TypeScript,
    /// TypeScript with JSX (`.tsx`).
    Tsx,
}

impl SourceDialect {
    /// Detects the dialect from a file extension.
    ///
    /// Returns `None` if the extension is not a TypeScript extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "ts" | "mts" | "cts" => Some(Self::TypeScript),
            "tsx" => Some(Self::Tsx),
            _ => None,
        }
    }

    /// Detects the dialect from a file path, defaulting to plain TypeScript.
    #[must_use]
    pub fn from_path(path: &Utf8Path) -> Self {
        path.extension()
            .and_then(Self::from_extension)
            .unwrap_or_default()
    }

    /// Returns the Tree-sitter grammar for this dialect.
    #[must_use]
    pub fn tree_sitter_language(self) -> tree_sitter::Language {
        match self {
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Self::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }

    /// Returns the lower-case identifier for this dialect.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TypeScript => "typescript",
            Self::Tsx => "tsx",
        }
    }
}

impl fmt::Display for SourceDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
