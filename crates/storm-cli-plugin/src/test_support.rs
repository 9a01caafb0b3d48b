//! Shared fixtures for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use camino::{Utf8Path, Utf8PathBuf};
use storm_reflection::{
    FunctionSignature, ReflectedParameter, ReflectedProperty, ReflectedType, ReflectionError,
    ReflectionOracle, TagBag,
};

use crate::context::CliContext;
use crate::options::CliOptions;

/// Oracle answering from canned reflections and counting calls.
#[derive(Debug, Default)]
pub(crate) struct FakeOracle {
    exports: Mutex<HashMap<Utf8PathBuf, ReflectedType>>,
    calls: AtomicUsize,
}

impl FakeOracle {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_export(
        self,
        file: impl Into<Utf8PathBuf>,
        reflected: ReflectedType,
    ) -> Self {
        self.exports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(file.into(), reflected);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ReflectionOracle for FakeOracle {
    fn reflect(
        &self,
        file: &Utf8Path,
        export: Option<&str>,
    ) -> Result<ReflectedType, ReflectionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.exports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(file)
            .cloned()
            .ok_or_else(|| ReflectionError::export_not_found(file, export))
    }

    fn resolve_type(
        &self,
        file: &Utf8Path,
        type_name: &str,
    ) -> Result<ReflectedType, ReflectionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ReflectionError::type_not_found(file, type_name))
    }
}

pub(crate) fn context_with(oracle: Arc<FakeOracle>, options: CliOptions) -> CliContext {
    CliContext::new(options, oracle)
}

pub(crate) fn context() -> CliContext {
    context_with(Arc::new(FakeOracle::new()), test_options())
}

pub(crate) fn test_options() -> CliOptions {
    CliOptions {
        name: "acme".into(),
        title: "Acme".into(),
        description: "The Acme command-line interface.".into(),
        bin: vec!["acme".into()],
        ..CliOptions::default()
    }
}

/// Handler `(request: { ...properties }) => returns`.
pub(crate) fn handler(properties: Vec<ReflectedProperty>, returns: ReflectedType) -> ReflectedType {
    ReflectedType::function(FunctionSignature {
        name: Some("handler".into()),
        parameters: vec![ReflectedParameter {
            name: "request".into(),
            ty: ReflectedType::object_literal(properties),
            optional: false,
            default: None,
        }],
        returns: Box::new(returns),
    })
}

/// Handler taking a single parameter of `parameter` type.
pub(crate) fn handler_taking(parameter: ReflectedType) -> ReflectedType {
    ReflectedType::function(FunctionSignature {
        name: Some("handler".into()),
        parameters: vec![ReflectedParameter {
            name: "request".into(),
            ty: parameter,
            optional: false,
            default: None,
        }],
        returns: Box::new(ReflectedType::void()),
    })
}

pub(crate) fn string_prop(name: &str) -> ReflectedProperty {
    ReflectedProperty::new(name, ReflectedType::string())
}

pub(crate) fn bool_prop(name: &str) -> ReflectedProperty {
    ReflectedProperty::new(name, ReflectedType::boolean()).optional()
}

pub(crate) fn aliased(property: ReflectedProperty, aliases: &[&str]) -> ReflectedProperty {
    let tags = TagBag {
        alias: aliases.iter().map(|alias| (*alias).to_owned()).collect(),
        ..property.tags.clone()
    };
    property.with_tags(tags)
}
