//! Tree-sitter backed reflection of TypeScript command modules.
//!
//! The oracle reads the syntax of each module rather than running a type
//! checker. It understands the declaration forms command handlers use in
//! practice: exported functions and arrow functions, classes with public
//! fields, interfaces, type aliases, enums, literal unions, and relative
//! imports of any of those. Anything else reflects as `any`.

mod jsdoc;
mod module;
mod resolver;

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;

use crate::error::ReflectionError;
use crate::oracle::ReflectionOracle;
use crate::types::ReflectedType;

use self::module::ParsedModule;
use self::resolver::Resolver;

const ORACLE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::static_oracle");

/// Generic type names that wrap a command's payload as `{ data: T }`.
pub const DEFAULT_REQUEST_WRAPPERS: &[&str] = &["StormRequest"];

/// Reflection oracle that parses TypeScript sources with Tree-sitter.
///
/// Parsed modules are cached for the lifetime of the oracle, so resolving
/// many types from the same file parses it once.
/// [`compilations`](Self::compilations) reports how many modules were parsed.
#[derive(Debug)]
pub struct StaticReflectionOracle {
    request_wrappers: Vec<String>,
    modules: RwLock<HashMap<Utf8PathBuf, Arc<ParsedModule>>>,
    compilations: AtomicUsize,
}

impl Default for StaticReflectionOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticReflectionOracle {
    /// Creates an oracle recognising the default request wrappers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            request_wrappers: DEFAULT_REQUEST_WRAPPERS
                .iter()
                .map(|name| (*name).to_owned())
                .collect(),
            modules: RwLock::new(HashMap::new()),
            compilations: AtomicUsize::new(0),
        }
    }

    /// Replaces the set of generic request wrapper type names.
    #[must_use]
    pub fn with_request_wrappers<I, S>(mut self, wrappers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.request_wrappers = wrappers.into_iter().map(Into::into).collect();
        self
    }

    /// Number of modules parsed so far.
    #[must_use]
    pub fn compilations(&self) -> usize {
        self.compilations.load(Ordering::Relaxed)
    }

    fn is_request_wrapper(&self, name: &str) -> bool {
        self.request_wrappers.iter().any(|wrapper| wrapper == name)
    }

    fn module(&self, file: &Utf8Path) -> Result<Arc<ParsedModule>, ReflectionError> {
        if let Some(module) = self
            .modules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(file)
        {
            return Ok(Arc::clone(module));
        }

        let source =
            std::fs::read_to_string(file).map_err(|error| ReflectionError::io(file, error))?;
        let module = Arc::new(ParsedModule::parse(file, source)?);
        self.compilations.fetch_add(1, Ordering::Relaxed);
        debug!(target: ORACLE_TARGET, module = %file, "parsed module");

        let mut modules = self
            .modules
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(
            modules.entry(file.to_owned()).or_insert(module),
        ))
    }
}

impl ReflectionOracle for StaticReflectionOracle {
    fn reflect(
        &self,
        file: &Utf8Path,
        export: Option<&str>,
    ) -> Result<ReflectedType, ReflectionError> {
        let module = self.module(file)?;
        Resolver::new(self, &module, 0).reflect_export(export)
    }

    fn resolve_type(
        &self,
        file: &Utf8Path,
        type_name: &str,
    ) -> Result<ReflectedType, ReflectionError> {
        let module = self.module(file)?;
        Resolver::new(self, &module, 0)
            .resolve_declared(type_name)
            .ok_or_else(|| ReflectionError::type_not_found(file, type_name))
    }

    fn loaded_modules(&self) -> Vec<Utf8PathBuf> {
        let mut paths: Vec<Utf8PathBuf> = self
            .modules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        paths.sort();
        paths
    }
}
