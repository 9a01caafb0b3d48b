//! Domain errors raised while resolving commands and generating the CLI.
//!
//! All errors use `thiserror`-derived enums with structured context so callers
//! can inspect the failure programmatically. I/O errors are wrapped in `Arc`
//! and nested command errors are boxed to keep results small.

use std::sync::Arc;

use camino::Utf8PathBuf;
use storm_reflection::ReflectionError;
use thiserror::Error;

/// Errors arising from command discovery, resolution, tree assembly,
/// persistence, and generation.
#[derive(Debug, Error)]
pub enum CommandError {
    /// A handler's request shape cannot be turned into CLI arguments.
    #[error(
        "the command request in {file} must be of type objectLiteral or class, received {found}"
    )]
    InvalidShape {
        /// Source module of the handler.
        file: Utf8PathBuf,
        /// Description of the shape that was received.
        found: String,
    },

    /// The reflection oracle failed for a module.
    #[error("failed to reflect {file}: {source}")]
    Reflection {
        /// Module that was being reflected.
        file: Utf8PathBuf,
        /// Underlying oracle error.
        #[source]
        source: ReflectionError,
    },

    /// Resolving one entry into a command failed.
    #[error("failed to resolve command '{id}' from {file}: {source}")]
    Resolution {
        /// Command id of the entry.
        id: String,
        /// Source module, or the folder of a virtual command.
        file: Utf8PathBuf,
        /// Original failure.
        #[source]
        source: Box<CommandError>,
    },

    /// A command without an output id reached the tree builder.
    #[error("command at path '{path}' has no output id")]
    MissingOutput {
        /// Path segments of the offending command joined with `/`.
        path: String,
    },

    /// No relation data was computed for a command id.
    #[error("no relation data found for command '{id}'")]
    MissingRelation {
        /// Command id that was looked up.
        id: String,
    },

    /// A command collides with a name reserved by the generated application.
    #[error("command '{id}' uses the reserved name '{name}'")]
    ReservedName {
        /// Command id.
        id: String,
        /// Reserved name.
        name: String,
    },

    /// Two entries map to the same command id or sibling name.
    #[error("command '{id}' is defined more than once ({first} and {second})")]
    DuplicateCommand {
        /// Conflicting id.
        id: String,
        /// First definition.
        first: Utf8PathBuf,
        /// Second definition.
        second: Utf8PathBuf,
    },

    /// A file in the commands directory cannot be mapped to a command.
    #[error("{file} cannot be used as a command: {reason}")]
    InvalidEntry {
        /// Offending file.
        file: Utf8PathBuf,
        /// Why it was rejected.
        reason: String,
    },

    /// An explicitly requested cache file is missing.
    #[error("CLI Command reflection file {path} not found")]
    CacheNotFound {
        /// Expected location of the cache file.
        path: Utf8PathBuf,
    },

    /// A cache file exists but could not be decoded.
    #[error("failed to decode cache file {path}: {source}")]
    CacheCorrupt {
        /// Cache file path.
        path: Utf8PathBuf,
        /// Codec failure.
        #[source]
        source: ReflectionError,
    },

    /// A value could not be encoded for the cache.
    #[error("failed to encode cache file {path}: {source}")]
    CacheEncode {
        /// Cache file path.
        path: Utf8PathBuf,
        /// Codec failure.
        #[source]
        source: ReflectionError,
    },

    /// Filesystem access failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path being accessed.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// A path on disk is not valid UTF-8.
    #[error("path {path} is not valid UTF-8")]
    NonUtf8Path {
        /// Lossy rendering of the path.
        path: String,
    },
}

impl CommandError {
    /// Creates an I/O error for `path`.
    #[must_use]
    pub fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source: Arc::new(source),
        }
    }

    /// Creates an invalid shape error.
    #[must_use]
    pub fn invalid_shape(file: impl Into<Utf8PathBuf>, found: impl Into<String>) -> Self {
        Self::InvalidShape {
            file: file.into(),
            found: found.into(),
        }
    }

    /// Wraps a failure with the command id and source file, once.
    ///
    /// Errors that already carry resolution context are returned unchanged.
    #[must_use]
    pub fn resolution(id: impl Into<String>, file: impl Into<Utf8PathBuf>, source: Self) -> Self {
        match source {
            Self::Resolution { .. } => source,
            other => Self::Resolution {
                id: id.into(),
                file: file.into(),
                source: Box::new(other),
            },
        }
    }
}
