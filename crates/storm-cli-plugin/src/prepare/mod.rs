//! The `prepare` pipeline: discovery, checksum-gated reflection, tree
//! assembly, generation, and writing.
//!
//! When the manifest's checksum matches the sources and options, every
//! command reflection is reloaded from the cache and the oracle is never
//! consulted. Otherwise the cache is cleared, the commands are reflected
//! again, and the cache is rewritten before generation.

use std::fs;
use std::io::ErrorKind;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::context::CliContext;
use crate::entry::{CommandEntry, discover_entries};
use crate::error::CommandError;
use crate::generate::{generate_all, write_files};
use crate::options::CliOptions;
use crate::persistence::{CacheManifest, ReflectionCache, compute_checksum, external_modules};
use crate::relations::build_relations;
use crate::tree::{CommandTree, reflect_command_tree};

const PREPARE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::prepare");

/// Failures of a pipeline phase, each carrying the underlying command error.
#[derive(Debug, Error)]
pub enum PrepareError {
    /// The sources could not be fingerprinted.
    #[error("failed to checksum {dir}: {source}")]
    Checksum {
        /// Commands directory.
        dir: Utf8PathBuf,
        /// Underlying failure.
        #[source]
        source: Box<CommandError>,
    },

    /// The commands directory could not be scanned.
    #[error("failed to discover commands in {dir}: {source}")]
    Discover {
        /// Commands directory.
        dir: Utf8PathBuf,
        /// Underlying failure.
        #[source]
        source: Box<CommandError>,
    },

    /// A cache file named by a valid manifest could not be reloaded.
    #[error("failed to reload the reflection cache: {source}")]
    Reload {
        /// Underlying failure.
        #[source]
        source: Box<CommandError>,
    },

    /// Resolving the commands or assembling the tree failed.
    #[error("failed to reflect the command tree: {source}")]
    Reflect {
        /// Underlying failure.
        #[source]
        source: Box<CommandError>,
    },

    /// The reflection cache could not be written or cleared.
    #[error("failed to update the reflection cache in {dir}: {source}")]
    Persist {
        /// Cache directory.
        dir: Utf8PathBuf,
        /// Underlying failure.
        #[source]
        source: Box<CommandError>,
    },

    /// The TypeScript sources could not be generated.
    #[error("failed to generate the CLI sources: {source}")]
    Generate {
        /// Underlying failure.
        #[source]
        source: Box<CommandError>,
    },

    /// Generated sources could not be written or removed.
    #[error("failed to write generated sources to {dir}: {source}")]
    Write {
        /// Artifacts directory.
        dir: Utf8PathBuf,
        /// Underlying failure.
        #[source]
        source: Box<CommandError>,
    },
}

/// A command tree together with how it was obtained.
#[derive(Debug)]
pub struct LoadedTree {
    /// The assembled tree.
    pub tree: CommandTree,
    /// Entries the tree was built from.
    pub entries: Vec<CommandEntry>,
    /// Checksum of the sources and options.
    pub checksum: String,
    /// Whether every reflection came from the cache.
    pub cache_hit: bool,
}

/// Result of a complete `prepare` run.
#[derive(Debug)]
pub struct PrepareOutcome {
    /// The assembled tree.
    pub tree: CommandTree,
    /// Written files, relative to the artifacts directory.
    pub files: Vec<Utf8PathBuf>,
    /// Whether every reflection came from the cache.
    pub cache_hit: bool,
}

/// Builds the command tree, reusing the reflection cache when its checksum
/// still matches and `force` is not set.
///
/// # Errors
///
/// Returns the phase that failed along with the underlying command error.
pub fn load_tree(context: &CliContext, force: bool) -> Result<LoadedTree, PrepareError> {
    let options = context.options();
    let cache = ReflectionCache::new(&options.cache_dir);

    let previous = if force {
        debug!(target: PREPARE_TARGET, "cache bypassed");
        None
    } else {
        cache.load_manifest()
    };
    let recorded = previous
        .as_ref()
        .map_or_else(Vec::new, |manifest| manifest.dependencies.clone());
    let current = checksum(options, &recorded)?;
    let reusable = previous.filter(|manifest| manifest.checksum == current);

    let (entries, cache_hit) = if let Some(manifest) = reusable {
        reload(context, &cache, &manifest.entries)
            .map_err(|source| PrepareError::Reload { source: Box::new(source) })?;
        info!(target: PREPARE_TARGET, checksum = %current, "reflection cache hit");
        (manifest.entries, true)
    } else {
        info!(target: PREPARE_TARGET, checksum = %current, "reflection cache miss");
        cache.clear().map_err(|source| persist_error(&cache, source))?;
        let discovered = discover_entries(&options.commands_dir).map_err(|source| {
            PrepareError::Discover {
                dir: options.commands_dir.clone(),
                source: Box::new(source),
            }
        })?;
        (discovered, false)
    };

    let tree = reflect_command_tree(context, &entries)
        .map_err(|source| PrepareError::Reflect { source: Box::new(source) })?;

    if cache_hit {
        return Ok(LoadedTree {
            tree,
            entries,
            checksum: current,
            cache_hit,
        });
    }

    let dependencies = external_modules(options, context.oracle().loaded_modules());
    let fresh = checksum(options, &dependencies)?;
    let relations = build_relations(&entries);
    let manifest = CacheManifest::new(fresh.clone(), entries.clone(), relations)
        .with_dependencies(dependencies);
    cache
        .persist(&context.reflections(), &context.config_params(), &manifest)
        .map_err(|source| persist_error(&cache, source))?;

    Ok(LoadedTree {
        tree,
        entries,
        checksum: fresh,
        cache_hit,
    })
}

fn checksum(options: &CliOptions, dependencies: &[Utf8PathBuf]) -> Result<String, PrepareError> {
    compute_checksum(options, dependencies).map_err(|source| PrepareError::Checksum {
        dir: options.commands_dir.clone(),
        source: Box::new(source),
    })
}

fn reload(
    context: &CliContext,
    cache: &ReflectionCache,
    entries: &[CommandEntry],
) -> Result<(), CommandError> {
    for entry in entries {
        context.store_reflection(entry.id.clone(), cache.read_command(&entry.id)?);
    }
    context.restore_config_params(&cache.read_config_params()?);
    Ok(())
}

fn persist_error(cache: &ReflectionCache, source: CommandError) -> PrepareError {
    PrepareError::Persist {
        dir: cache.root().to_owned(),
        source: Box::new(source),
    }
}

/// Runs the whole pipeline and writes the generated sources.
///
/// # Errors
///
/// Returns the phase that failed along with the underlying command error.
pub fn prepare(context: &CliContext, force: bool) -> Result<PrepareOutcome, PrepareError> {
    let LoadedTree {
        tree, cache_hit, ..
    } = load_tree(context, force)?;

    let generated = generate_all(context, &tree)
        .map_err(|source| PrepareError::Generate { source: Box::new(source) })?;
    let artifacts_dir = &context.options().artifacts_dir;
    write_files(artifacts_dir, &generated).map_err(|source| PrepareError::Write {
        dir: artifacts_dir.clone(),
        source: Box::new(source),
    })?;
    info!(
        target: PREPARE_TARGET,
        commands = tree.len(),
        files = generated.len(),
        cache_hit,
        "prepared command-line application"
    );

    Ok(PrepareOutcome {
        tree,
        files: generated.into_iter().map(|file| file.path).collect(),
        cache_hit,
    })
}

/// What [`clean`] removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanOutcome {
    /// Whether a reflection cache existed.
    pub cache_removed: bool,
    /// Whether generated sources existed.
    pub artifacts_removed: bool,
}

/// Deletes the reflection cache and the generated sources.
///
/// # Errors
///
/// Fails when either directory exists but cannot be removed.
pub fn clean(options: &CliOptions) -> Result<CleanOutcome, PrepareError> {
    let cache = ReflectionCache::new(&options.cache_dir);
    let cache_removed = cache.clear().map_err(|source| persist_error(&cache, source))?;
    let artifacts_removed =
        remove_dir(&options.artifacts_dir).map_err(|source| PrepareError::Write {
            dir: options.artifacts_dir.clone(),
            source: Box::new(source),
        })?;
    debug!(
        target: PREPARE_TARGET,
        cache_removed,
        artifacts_removed,
        "cleaned generated state"
    );
    Ok(CleanOutcome {
        cache_removed,
        artifacts_removed,
    })
}

fn remove_dir(dir: &Utf8Path) -> Result<bool, CommandError> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(true),
        Err(error) if error.kind() == ErrorKind::NotFound => Ok(false),
        Err(error) => Err(CommandError::io(dir, error)),
    }
}
