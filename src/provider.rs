//! The provider capability.

use std::any::Any;

/// Parameters a caller can supply when resolving a binding.
///
/// `None` stands for "no parameters". Primitive and structured values are
/// both expressed as JSON values.
pub type Params = serde_json::Value;

/// A target that builds the actual instance itself.
///
/// When a target type is registered as a provider, resolving a class or view
/// binding to it does not return the target, but whatever `new_instance`
/// returns. This is the only way for a binding to receive parameters.
pub trait Provider {
    /// Creates the instance for a binding.
    fn new_instance(&self, params: Option<Params>) -> Box<dyn Any>;
}
