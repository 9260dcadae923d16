//! Registry of constructible types.
//!
//! Binding targets are type identifiers. The registry maps these identifiers
//! to constructors, so that a target can be instantiated without reflection.

use crate::error::BindingError;
use crate::provider::Provider;
use fnv::FnvHashMap;
use std::any::{type_name, Any};
use std::fmt;
use tracing::trace;

///////////////////////////////////////////////////////////////////////////////
// Constructed Values
///////////////////////////////////////////////////////////////////////////////

/// A freshly constructed target.
pub enum Constructed {
    /// A plain object.
    Object(Box<dyn Any>),
    /// An object that exposes the provider capability.
    Provider(Box<dyn Provider>),
}

impl Constructed {
    /// Returns the provider capability of the object, if it has one.
    pub fn as_provider(&self) -> Option<&dyn Provider> {
        match self {
            Constructed::Provider(p) => Some(p.as_ref()),
            Constructed::Object(_) => None,
        }
    }
}

impl fmt::Debug for Constructed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constructed::Object(_) => f.write_str("Constructed::Object"),
            Constructed::Provider(_) => f.write_str("Constructed::Provider"),
        }
    }
}

/// A constructor of a registered type.
pub type Ctor = fn() -> Constructed;

fn construct_object<T: Any + Default>() -> Constructed {
    Constructed::Object(Box::new(T::default()))
}

fn construct_provider<T: Provider + Default + 'static>() -> Constructed {
    Constructed::Provider(Box::new(T::default()))
}

///////////////////////////////////////////////////////////////////////////////
// Type Keys
///////////////////////////////////////////////////////////////////////////////

/// Case-insensitive, optionally namespace-qualified type identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TypeKey(String);

impl TypeKey {
    fn new(namespace: Option<&str>, name: &str) -> Self {
        match namespace.filter(|ns| !ns.is_empty()) {
            Some(ns) => TypeKey(format!("{}.{}", ns, name).to_lowercase()),
            None => TypeKey(name.to_lowercase()),
        }
    }
}

#[derive(Clone, Copy)]
struct Entry {
    ctor: Ctor,
    type_name: &'static str,
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("type_name", &self.type_name)
            .finish()
    }
}

///////////////////////////////////////////////////////////////////////////////
// Builder
///////////////////////////////////////////////////////////////////////////////

/// Create a registry with the builder pattern.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    types: FnvHashMap<TypeKey, Entry>,
}

impl RegistryBuilder {
    /// Creates a new RegistryBuilder.
    pub fn new() -> Self {
        Self {
            types: FnvHashMap::default(),
        }
    }

    /// Creates a new RegistryBuilder with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            types: FnvHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Registers a plain type in the global namespace.
    pub fn with_type<T: Any + Default>(self, name: &str) -> Self {
        self.insert::<T>(None, name, construct_object::<T>)
    }

    /// Registers a plain type in a namespace.
    pub fn with_namespaced_type<T: Any + Default>(self, namespace: &str, name: &str) -> Self {
        self.insert::<T>(Some(namespace), name, construct_object::<T>)
    }

    /// Registers a provider in the global namespace.
    pub fn with_provider<T: Provider + Default + 'static>(self, name: &str) -> Self {
        self.insert::<T>(None, name, construct_provider::<T>)
    }

    /// Registers a provider in a namespace.
    pub fn with_namespaced_provider<T: Provider + Default + 'static>(
        self,
        namespace: &str,
        name: &str,
    ) -> Self {
        self.insert::<T>(Some(namespace), name, construct_provider::<T>)
    }

    /// Sets a custom constructor for an identifier.
    pub fn with_constructor(self, namespace: Option<&str>, name: &str, ctor: Ctor) -> Self {
        self.insert::<Ctor>(namespace, name, ctor)
    }

    fn insert<T: ?Sized>(mut self, namespace: Option<&str>, name: &str, ctor: Ctor) -> Self {
        let entry = Entry {
            ctor,
            type_name: type_name::<T>(),
        };
        self.types.insert(TypeKey::new(namespace, name), entry);
        self
    }

    /// Builds the registry.
    pub fn build(self) -> TypeRegistry {
        TypeRegistry { types: self.types }
    }
}

///////////////////////////////////////////////////////////////////////////////
// Registry
///////////////////////////////////////////////////////////////////////////////

/// Maps type identifiers to constructors.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: FnvHashMap<TypeKey, Entry>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a RegistryBuilder.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Returns the number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Returns true if the identifier names a registered type.
    pub fn contains(&self, namespace: Option<&str>, name: &str) -> bool {
        self.types.contains_key(&TypeKey::new(namespace, name))
    }

    /// Constructs a new instance of the type with the given identifier.
    ///
    /// With a namespace only that namespace is searched, without one only
    /// the global namespace is.
    pub fn construct(
        &self,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<Constructed, BindingError> {
        let key = TypeKey::new(namespace, name);
        match self.types.get(&key) {
            Some(entry) => {
                trace!(key = %key.0, type_name = entry.type_name, "constructing target");
                Ok((entry.ctor)())
            }
            None => Err(BindingError::TypeNotFound {
                target: match namespace.filter(|ns| !ns.is_empty()) {
                    Some(ns) => format!("{}.{}", ns, name),
                    None => name.to_owned(),
                },
            }),
        }
    }
}

///////////////////////////////////////////////////////////////////////////////
// Tests
///////////////////////////////////////////////////////////////////////////////
