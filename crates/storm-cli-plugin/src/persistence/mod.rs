//! Binary reflection cache gated by a source checksum.
//!
//! Layout under `<cache_dir>/cli`:
//!
//! - `commands/<id>.bin`: the reflection of one command
//! - `config.bin`: the shared configuration-parameter reflection
//! - `manifest.bin`: checksum, entries, relations, and imported modules of
//!   the last run
//!
//! The manifest is written last, so a run interrupted half way leaves either
//! no manifest or a stale one and the next run reflects again.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use storm_reflection::{ReflectedType, decode_message, decode_type, encode_message, encode_type};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::entry::CommandEntry;
use crate::error::CommandError;
use crate::options::CliOptions;
use crate::relations::CommandRelations;

const PERSISTENCE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::persistence");

/// Version of the cache layout; bumping it invalidates every checksum.
pub const CACHE_SCHEMA_VERSION: u32 = 2;

/// Interface id of a serialised [`CacheManifest`].
pub const MANIFEST_INTERFACE_ID: u64 = 0x51c4_7e02_b93a_6d15;

/// File name standing in for the root command's empty id.
const ROOT_COMMAND_FILE: &str = "_root";

/// Summary of the run that produced the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheManifest {
    /// Layout version the cache was written with.
    pub schema_version: u32,
    /// Checksum of the sources and options.
    pub checksum: String,
    /// Entries discovered in that run.
    pub entries: Vec<CommandEntry>,
    /// Relations between those entries.
    pub relations: BTreeMap<String, CommandRelations>,
    /// Modules outside the commands directory that reflection read, such as
    /// shared request types. They are part of the checksum.
    pub dependencies: Vec<Utf8PathBuf>,
}

impl CacheManifest {
    /// Manifest for the current schema version.
    #[must_use]
    pub fn new(
        checksum: impl Into<String>,
        entries: Vec<CommandEntry>,
        relations: BTreeMap<String, CommandRelations>,
    ) -> Self {
        Self {
            schema_version: CACHE_SCHEMA_VERSION,
            checksum: checksum.into(),
            entries,
            relations,
            dependencies: Vec::new(),
        }
    }

    /// Records the imported modules the checksum covers.
    #[must_use]
    pub fn with_dependencies(mut self, dependencies: Vec<Utf8PathBuf>) -> Self {
        self.dependencies = dependencies;
        self
    }
}

/// Reads and writes the reflection cache of one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectionCache {
    root: Utf8PathBuf,
}

impl ReflectionCache {
    /// Cache stored below `cache_dir`.
    #[must_use]
    pub fn new(cache_dir: &Utf8Path) -> Self {
        Self {
            root: cache_dir.join("cli"),
        }
    }

    /// Directory holding every cache file.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Location of the reflection of command `id`.
    #[must_use]
    pub fn command_path(&self, id: &str) -> Utf8PathBuf {
        let stem = if id.is_empty() { ROOT_COMMAND_FILE } else { id };
        self.root.join("commands").join(format!("{stem}.bin"))
    }

    /// Location of the configuration-parameter reflection.
    #[must_use]
    pub fn config_path(&self) -> Utf8PathBuf {
        self.root.join("config.bin")
    }

    /// Location of the manifest.
    #[must_use]
    pub fn manifest_path(&self) -> Utf8PathBuf {
        self.root.join("manifest.bin")
    }

    /// Writes the reflection of command `id`.
    ///
    /// # Errors
    ///
    /// Fails when the reflection cannot be encoded or written.
    pub fn write_command(&self, id: &str, reflection: &ReflectedType) -> Result<(), CommandError> {
        let path = self.command_path(id);
        let bytes = encode_type(reflection).map_err(|source| CommandError::CacheEncode {
            path: path.clone(),
            source,
        })?;
        write_file(&path, &bytes)
    }

    /// Reads the reflection of command `id`.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::CacheNotFound`] when the file does not exist
    /// and [`CommandError::CacheCorrupt`] when it cannot be decoded.
    pub fn read_command(&self, id: &str) -> Result<ReflectedType, CommandError> {
        read_reflection(&self.command_path(id))
    }

    /// Writes the configuration-parameter reflection.
    ///
    /// # Errors
    ///
    /// Fails when the reflection cannot be encoded or written.
    pub fn write_config_params(&self, reflection: &ReflectedType) -> Result<(), CommandError> {
        let path = self.config_path();
        let bytes = encode_type(reflection).map_err(|source| CommandError::CacheEncode {
            path: path.clone(),
            source,
        })?;
        write_file(&path, &bytes)
    }

    /// Reads the configuration-parameter reflection.
    ///
    /// # Errors
    ///
    /// As for [`read_command`](Self::read_command).
    pub fn read_config_params(&self) -> Result<ReflectedType, CommandError> {
        read_reflection(&self.config_path())
    }

    /// Writes the manifest.
    ///
    /// # Errors
    ///
    /// Fails when the manifest cannot be encoded or written.
    pub fn write_manifest(&self, manifest: &CacheManifest) -> Result<(), CommandError> {
        let path = self.manifest_path();
        let bytes = encode_message(MANIFEST_INTERFACE_ID, manifest).map_err(|source| {
            CommandError::CacheEncode {
                path: path.clone(),
                source,
            }
        })?;
        write_file(&path, &bytes)
    }

    /// Loads the manifest for checksum comparison.
    ///
    /// A missing, unreadable, or undecodable manifest, or one written with
    /// another schema version, is a cache miss.
    #[must_use]
    pub fn load_manifest(&self) -> Option<CacheManifest> {
        let path = self.manifest_path();
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(error) => {
                if error.kind() != ErrorKind::NotFound {
                    warn!(target: PERSISTENCE_TARGET, path = %path, %error, "manifest unreadable");
                }
                return None;
            }
        };
        match decode_message::<CacheManifest>(MANIFEST_INTERFACE_ID, &bytes) {
            Ok(manifest) if manifest.schema_version == CACHE_SCHEMA_VERSION => Some(manifest),
            Ok(manifest) => {
                debug!(
                    target: PERSISTENCE_TARGET,
                    found = manifest.schema_version,
                    expected = CACHE_SCHEMA_VERSION,
                    "manifest schema changed"
                );
                None
            }
            Err(error) => {
                warn!(target: PERSISTENCE_TARGET, path = %path, %error, "manifest corrupt");
                None
            }
        }
    }

    /// Writes every command reflection, the configuration parameters, and
    /// finally the manifest.
    ///
    /// # Errors
    ///
    /// Stops at the first encoding or I/O failure.
    pub fn persist(
        &self,
        reflections: &BTreeMap<String, ReflectedType>,
        config_params: &ReflectedType,
        manifest: &CacheManifest,
    ) -> Result<(), CommandError> {
        for (id, reflection) in reflections {
            self.write_command(id, reflection)?;
        }
        self.write_config_params(config_params)?;
        self.write_manifest(manifest)?;
        debug!(
            target: PERSISTENCE_TARGET,
            root = %self.root,
            commands = reflections.len(),
            "persisted reflection cache"
        );
        Ok(())
    }

    /// Deletes the cache directory. Returns `true` when something was
    /// removed.
    ///
    /// # Errors
    ///
    /// Fails when the directory exists but cannot be removed.
    pub fn clear(&self) -> Result<bool, CommandError> {
        match fs::remove_dir_all(&self.root) {
            Ok(()) => Ok(true),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(false),
            Err(error) => Err(CommandError::io(&self.root, error)),
        }
    }
}

fn read_reflection(path: &Utf8Path) -> Result<ReflectedType, CommandError> {
    let bytes = fs::read(path).map_err(|error| {
        if error.kind() == ErrorKind::NotFound {
            CommandError::CacheNotFound {
                path: path.to_owned(),
            }
        } else {
            CommandError::io(path, error)
        }
    })?;
    decode_type(&bytes).map_err(|source| CommandError::CacheCorrupt {
        path: path.to_owned(),
        source,
    })
}

fn write_file(path: &Utf8Path, bytes: &[u8]) -> Result<(), CommandError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|error| CommandError::io(parent, error))?;
    }
    fs::write(path, bytes).map_err(|error| CommandError::io(path, error))
}

/// Checksum of everything that shapes the generated CLI: the cache schema,
/// the crate version, the generation options, every file below the commands
/// directory (relative path and contents, in path order), and then each of
/// `dependencies`.
///
/// A dependency that no longer exists is hashed as absent rather than
/// failing, so deleting a shared type file invalidates the cache.
///
/// # Errors
///
/// Fails when the commands directory cannot be walked or a file read.
pub fn compute_checksum(
    options: &CliOptions,
    dependencies: &[Utf8PathBuf],
) -> Result<String, CommandError> {
    let mut hasher = Sha256::new();
    hasher.update(format!(
        "schema={CACHE_SCHEMA_VERSION}\nengine={}\n",
        env!("CARGO_PKG_VERSION")
    ));
    hasher.update(options.fingerprint());

    let commands_dir = &options.commands_dir;
    for item in WalkDir::new(commands_dir).sort_by_file_name() {
        let entry = item.map_err(|error| CommandError::io(commands_dir, error.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = Utf8Path::from_path(entry.path()).ok_or_else(|| CommandError::NonUtf8Path {
            path: entry.path().display().to_string(),
        })?;
        let relative = path.strip_prefix(commands_dir).unwrap_or(path);
        let contents = fs::read(path).map_err(|error| CommandError::io(path, error))?;
        hasher.update(format!("file={relative}\nlen={}\n", contents.len()));
        hasher.update(&contents);
    }

    for dependency in dependencies {
        match fs::read(dependency) {
            Ok(contents) => {
                hasher.update(format!("import={dependency}\nlen={}\n", contents.len()));
                hasher.update(&contents);
            }
            Err(error) if error.kind() == ErrorKind::NotFound => {
                hasher.update(format!("import={dependency}\nabsent\n"));
            }
            Err(error) => return Err(CommandError::io(dependency, error)),
        }
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Modules the oracle read that lie outside the commands directory.
#[must_use]
pub fn external_modules(options: &CliOptions, loaded: Vec<Utf8PathBuf>) -> Vec<Utf8PathBuf> {
    loaded
        .into_iter()
        .filter(|path| !path.starts_with(&options.commands_dir))
        .collect()
}

#[cfg(test)]
mod tests;
