//! The reflection oracle seam.
//!
//! The command engine never inspects TypeScript directly; it asks an oracle
//! for the structural shape of a module export or a named type. The
//! production implementation is
//! [`StaticReflectionOracle`](crate::StaticReflectionOracle). Tests implement
//! the trait with canned reflections.

use camino::{Utf8Path, Utf8PathBuf};

use crate::error::ReflectionError;
use crate::types::ReflectedType;

/// Resolves structural type descriptions for source modules.
///
/// Implementations must tolerate concurrent calls for distinct files.
pub trait ReflectionOracle: Send + Sync {
    /// Compiles `file` and reflects the named export (`None` selects the
    /// default export).
    ///
    /// # Errors
    ///
    /// Returns a [`ReflectionError`] when the module cannot be read or parsed,
    /// or when the export does not exist.
    fn reflect(&self, file: &Utf8Path, export: Option<&str>)
    -> Result<ReflectedType, ReflectionError>;

    /// Resolves the structural shape of the type named `type_name` declared
    /// in (or imported by) `file`.
    ///
    /// # Errors
    ///
    /// Returns [`ReflectionError::TypeNotFound`] when no such type exists.
    fn resolve_type(
        &self,
        file: &Utf8Path,
        type_name: &str,
    ) -> Result<ReflectedType, ReflectionError>;

    /// Every source module read so far, including relatively imported ones.
    ///
    /// Oracles without a module cache report nothing.
    fn loaded_modules(&self) -> Vec<Utf8PathBuf> {
        Vec::new()
    }
}
