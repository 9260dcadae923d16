//! Errors that occur while loading or resolving bindings.

use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

///////////////////////////////////////////////////////////////////////////////
// Binding Errors
///////////////////////////////////////////////////////////////////////////////

/// A binding could not be resolved.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BindingError {
    /// The developer name does not start with a known prefix.
    #[error("{name} is not recognized")]
    NotRecognized { name: String },

    /// The target does not name a registered type.
    #[error("{target} does not exist")]
    TypeNotFound { target: String },

    /// A view binding points to a type that is not a provider.
    #[error("binding {name} requires {target} to be a provider")]
    ProviderRequired { name: String, target: String },

    /// Parameters were supplied, but the target cannot take them.
    #[error("binding {name} received parameters, but {target} is not a provider")]
    ParamsNotAccepted { name: String, target: String },

    /// No binding record has the requested name.
    #[error("binding {name} not found")]
    NotFound { name: String },

    /// The resolved value of the binding is not a string.
    #[error("binding {name} does not resolve to a string")]
    NotAString { name: String },
}

///////////////////////////////////////////////////////////////////////////////
// Store Errors
///////////////////////////////////////////////////////////////////////////////

/// An error raised by the binding record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A projection, predicate or sort key refers to a column that does not
    /// exist.
    #[error("no such column: {0}")]
    UnknownField(String),

    /// The binding records could not be parsed.
    #[error("malformed binding records: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Any error of a custom store implementation.
    #[error("store backend failed: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

///////////////////////////////////////////////////////////////////////////////
// Crate Error
///////////////////////////////////////////////////////////////////////////////

/// Any error that can occur while loading and resolving a binding.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Binding(#[from] BindingError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl Error {
    /// Returns the binding error, if this is one.
    pub fn as_binding(&self) -> Option<&BindingError> {
        match self {
            Error::Binding(e) => Some(e),
            Error::Store(_) => None,
        }
    }
}
