//! Error types for reflection and persistence operations.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors raised while reflecting modules or decoding persisted reflections.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReflectionError {
    /// The Tree-sitter parser could not be initialised.
    #[error("failed to initialise the {dialect} parser: {message}")]
    ParserInit {
        /// Dialect that failed to initialise.
        dialect: &'static str,
        /// Description of the failure.
        message: String,
    },

    /// A module could not be read from disk.
    #[error("failed to read module {path}: {source}")]
    Io {
        /// Module path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// A module could not be parsed.
    #[error("failed to parse module {path}: {message}")]
    Parse {
        /// Module path.
        path: Utf8PathBuf,
        /// Description of the failure.
        message: String,
    },

    /// The module does not export the requested symbol.
    #[error("module {path} has no export named '{export}'")]
    ExportNotFound {
        /// Module path.
        path: Utf8PathBuf,
        /// Requested export (`default` for the default export).
        export: String,
    },

    /// The export exists but is not a function, class, or type.
    #[error("export '{export}' of {path} cannot be reflected: found {found}")]
    UnsupportedExport {
        /// Module path.
        path: Utf8PathBuf,
        /// Requested export.
        export: String,
        /// Syntax kind that was found instead.
        found: String,
    },

    /// A named type could not be resolved.
    #[error("type '{name}' could not be resolved in {path}")]
    TypeNotFound {
        /// Module path.
        path: Utf8PathBuf,
        /// Requested type name.
        name: String,
    },

    /// A value could not be encoded.
    #[error("failed to encode reflection: {0}")]
    Encode(#[source] bincode::Error),

    /// A byte buffer could not be decoded.
    #[error("failed to decode reflection: {0}")]
    Decode(#[source] bincode::Error),

    /// A decoded envelope was not a reflection message.
    #[error("reflection envelope has an invalid magic header")]
    InvalidMagic,

    /// A decoded envelope carries a different root interface id.
    #[error(
        "reflection envelope interface id {found:#018x} does not match expected {expected:#018x}"
    )]
    InterfaceMismatch {
        /// Interface id the reader expected.
        expected: u64,
        /// Interface id found in the envelope.
        found: u64,
    },
}

impl ReflectionError {
    /// Creates an I/O error for `path`.
    #[must_use]
    pub fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source: Arc::new(source),
        }
    }

    /// Creates a parse error for `path`.
    #[must_use]
    pub fn parse(path: impl Into<Utf8PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates an export-not-found error.
    #[must_use]
    pub fn export_not_found(path: impl Into<Utf8PathBuf>, export: Option<&str>) -> Self {
        Self::ExportNotFound {
            path: path.into(),
            export: export.unwrap_or("default").to_owned(),
        }
    }

    /// Creates a type-not-found error.
    #[must_use]
    pub fn type_not_found(path: impl Into<Utf8PathBuf>, name: impl Into<String>) -> Self {
        Self::TypeNotFound {
            path: path.into(),
            name: name.into(),
        }
    }
}
