//! Incremental assembly of object-literal and class reflections.
//!
//! Several call sites grow the same reflection (a command's request type, the
//! shared configuration parameters). [`ReflectionBuilder`] keeps the
//! properties in an arena keyed by a caller-normalised name so that
//! [`ReflectionBuilder::try_add`] is the single place where idempotence is
//! decided.

use std::collections::HashMap;

use crate::types::{ReflectedProperty, ReflectedType};

/// Growable object-literal or class reflection keyed by normalised name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReflectionBuilder {
    class_name: Option<String>,
    type_name: Option<String>,
    description: Option<String>,
    order: Vec<String>,
    properties: HashMap<String, ReflectedProperty>,
}

impl ReflectionBuilder {
    /// Creates an empty anonymous object-literal builder.
    #[must_use]
    pub fn object_literal() -> Self {
        Self::default()
    }

    /// Creates an empty builder that produces a class named `name`.
    #[must_use]
    pub fn class(name: impl Into<String>) -> Self {
        Self {
            class_name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Seeds a builder from an existing object-like type.
    ///
    /// Properties are keyed with `key`; when two properties normalise to the
    /// same key the first declaration wins. Non object-like types produce an
    /// empty builder.
    #[must_use]
    pub fn from_type(ty: &ReflectedType, key: impl Fn(&str) -> String) -> Self {
        let mut builder = Self {
            class_name: match &ty.kind {
                crate::TypeKind::Class { name, .. } => Some(name.clone()),
                _ => None,
            },
            type_name: ty.type_name.clone(),
            description: ty.description.clone(),
            ..Self::default()
        };
        for property in ty.properties() {
            builder.try_add(key(&property.name), property.clone());
        }
        builder
    }

    /// Sets the description of the built type.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = Some(description.into());
    }

    /// Adds `property` under `key` unless the key is already taken.
    ///
    /// Returns `true` when the property was inserted.
    pub fn try_add(&mut self, key: impl Into<String>, property: ReflectedProperty) -> bool {
        let owned: String = key.into();
        if self.properties.contains_key(&owned) {
            return false;
        }
        self.order.push(owned.clone());
        self.properties.insert(owned, property);
        true
    }

    /// Returns `true` when `key` is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// Returns the property stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ReflectedProperty> {
        self.properties.get(key)
    }

    /// Mutable access to the property stored under `key`.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut ReflectedProperty> {
        self.properties.get_mut(key)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` when no property has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Produces the reflected type with properties in insertion order.
    #[must_use]
    pub fn build(&self) -> ReflectedType {
        let properties: Vec<ReflectedProperty> = self
            .order
            .iter()
            .filter_map(|key| self.properties.get(key).cloned())
            .collect();
        let mut ty = match &self.class_name {
            Some(name) => ReflectedType::class(name.clone(), properties),
            None => ReflectedType::object_literal(properties),
        };
        if let Some(type_name) = &self.type_name {
            ty.type_name = Some(type_name.clone());
        }
        ty.description.clone_from(&self.description);
        ty
    }
}
