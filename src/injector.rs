//! Entry point for callers that resolve bindings by name.

use crate::binding::Resolved;
use crate::error::{BindingError, Result};
use crate::provider::Params;
use crate::query::BindingQuery;
use crate::registry::TypeRegistry;
use crate::store::BindingStore;
use tracing::debug;

/// Resolves bindings by their qualified name.
///
/// Owns the record store and the type registry. Every call reads the store
/// again; nothing is cached between calls.
#[derive(Debug)]
pub struct Injector<S> {
    store: S,
    types: TypeRegistry,
}

impl<S: BindingStore> Injector<S> {
    /// Creates an injector.
    pub fn new(store: S, types: TypeRegistry) -> Self {
        Self { store, types }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Resolves a binding and coerces the result to a string.
    ///
    /// This is what UI callers use: component bindings yield their target,
    /// class and view bindings must resolve to a `String`.
    pub fn get_instance(&self, binding_name: &str) -> Result<String> {
        self.resolve(binding_name, None)?
            .into_string()
            .ok_or_else(|| {
                BindingError::NotAString {
                    name: binding_name.to_owned(),
                }
                .into()
            })
    }

    /// Resolves a binding with optional parameters.
    pub fn resolve(&self, binding_name: &str, params: Option<Params>) -> Result<Resolved> {
        debug!(binding = binding_name, "resolving binding by name");
        let binding = BindingQuery::new()
            .by_name(binding_name)
            .get(&self.store)?
            .into_iter()
            .next()
            .ok_or_else(|| BindingError::NotFound {
                name: binding_name.to_owned(),
            })?;

        Ok(binding.get_instance_with(&self.types, params)?)
    }
}

///////////////////////////////////////////////////////////////////////////////
// Tests
///////////////////////////////////////////////////////////////////////////////
