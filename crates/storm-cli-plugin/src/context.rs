//! State shared by every command resolved in one `prepare` run.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use storm_reflection::{ReflectedProperty, ReflectedType, ReflectionBuilder, ReflectionOracle};

use crate::options::CliOptions;

/// Name of the shared configuration-parameter reflection.
pub const CONFIG_PARAMS_NAME: &str = "StormConfigParams";

/// Options, the reflection oracle, and the reflections collected so far.
///
/// Command resolution runs on several threads at once, so the reflection
/// cache and the configuration-parameter builder sit behind locks.
pub struct CliContext {
    options: CliOptions,
    oracle: Arc<dyn ReflectionOracle>,
    reflections: RwLock<HashMap<String, ReflectedType>>,
    config_params: Mutex<ReflectionBuilder>,
}

impl std::fmt::Debug for CliContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliContext")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl CliContext {
    /// Creates a context with empty caches.
    #[must_use]
    pub fn new(options: CliOptions, oracle: Arc<dyn ReflectionOracle>) -> Self {
        Self {
            options,
            oracle,
            reflections: RwLock::new(HashMap::new()),
            config_params: Mutex::new(ReflectionBuilder::class(CONFIG_PARAMS_NAME)),
        }
    }

    /// Generation options.
    #[must_use]
    pub const fn options(&self) -> &CliOptions {
        &self.options
    }

    /// The reflection oracle.
    #[must_use]
    pub fn oracle(&self) -> &dyn ReflectionOracle {
        self.oracle.as_ref()
    }

    /// Returns the cached reflection of command `id`.
    #[must_use]
    pub fn cached_reflection(&self, id: &str) -> Option<ReflectedType> {
        self.reflections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Caches the reflection of command `id`, replacing any previous one.
    pub fn store_reflection(&self, id: impl Into<String>, reflection: ReflectedType) {
        self.reflections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.into(), reflection);
    }

    /// Every cached reflection, ordered by command id.
    #[must_use]
    pub fn reflections(&self) -> BTreeMap<String, ReflectedType> {
        self.reflections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(id, reflection)| (id.clone(), reflection.clone()))
            .collect()
    }

    /// Adds a configuration parameter unless `key` is already present.
    ///
    /// Returns `true` when the parameter was added.
    pub fn register_config_param(&self, key: &str, property: ReflectedProperty) -> bool {
        self.config_params
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .try_add(key, property)
    }

    /// Snapshot of the shared configuration-parameter reflection.
    #[must_use]
    pub fn config_params(&self) -> ReflectedType {
        self.config_params
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .build()
    }

    /// Seeds the configuration parameters from a persisted reflection.
    pub fn restore_config_params(&self, reflection: &ReflectedType) {
        let mut builder = self
            .config_params
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        for property in reflection.properties() {
            builder.try_add(property.name.clone(), property.clone());
        }
    }
}
