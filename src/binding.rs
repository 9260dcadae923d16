//! Bindings and their resolution.

use crate::error::BindingError;
use crate::provider::Params;
use crate::record::BindingRecord;
use crate::registry::{Constructed, TypeRegistry};
use std::any::Any;
use std::fmt;
use tracing::trace;

///////////////////////////////////////////////////////////////////////////////
// Classification
///////////////////////////////////////////////////////////////////////////////

/// The kind of a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    /// Instantiates a registered type.
    Class,
    /// Returns the target identifier of a UI component.
    Component,
    /// Instantiates a registered provider and returns what it provides.
    View,
}

/// Developer name prefixes, in the order they are checked.
const PREFIXES: [(&str, BindingKind); 3] = [
    ("apex_", BindingKind::Class),
    ("lc_", BindingKind::Component),
    ("vf_", BindingKind::View),
];

impl BindingKind {
    /// Selects the kind of binding from a developer name.
    ///
    /// The prefix test ignores case. The first matching prefix wins.
    pub fn classify(name: &str) -> Option<Self> {
        PREFIXES
            .iter()
            .find(|(prefix, _)| has_prefix(name, prefix))
            .map(|&(_, kind)| kind)
    }

    /// Returns the developer name prefix of this kind.
    pub fn prefix(self) -> &'static str {
        PREFIXES
            .iter()
            .find(|&&(_, kind)| kind == self)
            .map(|&(prefix, _)| prefix)
            .unwrap_or_default()
    }
}

fn has_prefix(name: &str, prefix: &str) -> bool {
    name.get(..prefix.len())
        .map_or(false, |head| head.eq_ignore_ascii_case(prefix))
}

///////////////////////////////////////////////////////////////////////////////
// Binding
///////////////////////////////////////////////////////////////////////////////

/// A binding record together with the logic to resolve it.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Class(BindingRecord),
    Component(BindingRecord),
    View(BindingRecord),
}

impl Binding {
    /// Wraps a record in the binding its developer name calls for.
    pub fn new_instance(record: BindingRecord) -> Result<Self, BindingError> {
        let kind = match BindingKind::classify(record.name()) {
            Some(kind) => kind,
            None => {
                return Err(BindingError::NotRecognized {
                    name: record.name().to_owned(),
                })
            }
        };

        trace!(name = record.name(), ?kind, "classified binding");
        Ok(match kind {
            BindingKind::Class => Binding::Class(record),
            BindingKind::Component => Binding::Component(record),
            BindingKind::View => Binding::View(record),
        })
    }

    pub fn kind(&self) -> BindingKind {
        match self {
            Binding::Class(_) => BindingKind::Class,
            Binding::Component(_) => BindingKind::Component,
            Binding::View(_) => BindingKind::View,
        }
    }

    /// Returns the wrapped record.
    pub fn record(&self) -> &BindingRecord {
        match self {
            Binding::Class(r) | Binding::Component(r) | Binding::View(r) => r,
        }
    }

    pub fn into_record(self) -> BindingRecord {
        match self {
            Binding::Class(r) | Binding::Component(r) | Binding::View(r) => r,
        }
    }

    pub fn name(&self) -> &str {
        self.record().name()
    }

    pub fn namespace(&self) -> Option<&str> {
        self.record().namespace()
    }

    pub fn target(&self) -> &str {
        self.record().target()
    }

    /// Resolves the binding without parameters.
    #[inline]
    pub fn get_instance(&self, types: &TypeRegistry) -> Result<Resolved, BindingError> {
        self.get_instance_with(types, None)
    }

    /// Resolves the binding.
    ///
    /// * A class binding constructs its target. If the target is a provider,
    ///   the provider builds the instance from the parameters. Otherwise the
    ///   target itself is returned, and parameters are an error.
    /// * A view binding constructs its target, which must be a provider.
    /// * A component binding returns its target identifier and ignores the
    ///   parameters.
    pub fn get_instance_with(
        &self,
        types: &TypeRegistry,
        params: Option<Params>,
    ) -> Result<Resolved, BindingError> {
        trace!(name = self.name(), kind = ?self.kind(), "resolving binding");
        let record = match self {
            Binding::Component(record) => {
                return Ok(Resolved::Component(record.target().to_owned()))
            }
            Binding::Class(record) | Binding::View(record) => record,
        };

        let constructed = types.construct(record.namespace(), record.target())?;
        match (self, constructed) {
            (_, Constructed::Provider(provider)) => {
                Ok(Resolved::Instance(provider.new_instance(params)))
            }
            (Binding::View(_), Constructed::Object(_)) => Err(BindingError::ProviderRequired {
                name: record.name().to_owned(),
                target: record.target().to_owned(),
            }),
            (_, Constructed::Object(_)) if params.is_some() => {
                Err(BindingError::ParamsNotAccepted {
                    name: record.name().to_owned(),
                    target: record.target().to_owned(),
                })
            }
            (_, Constructed::Object(object)) => Ok(Resolved::Instance(object)),
        }
    }
}

///////////////////////////////////////////////////////////////////////////////
// Resolved Values
///////////////////////////////////////////////////////////////////////////////

/// The value a binding resolves to.
pub enum Resolved {
    /// An object built from a class or view binding.
    Instance(Box<dyn Any>),
    /// The target identifier of a component binding.
    Component(String),
}

impl Resolved {
    /// Returns a reference to the instance if it is of type `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Resolved::Instance(instance) => instance.downcast_ref(),
            Resolved::Component(_) => None,
        }
    }

    /// Takes the instance out if it is of type `T`.
    pub fn downcast<T: Any>(self) -> Result<T, Self> {
        match self {
            Resolved::Instance(instance) => match instance.downcast::<T>() {
                Ok(value) => Ok(*value),
                Err(instance) => Err(Resolved::Instance(instance)),
            },
            component => Err(component),
        }
    }

    /// Coerces the value to a string.
    ///
    /// Component targets and instances of `String` or `&'static str` are
    /// strings; anything else is not.
    pub fn into_string(self) -> Option<String> {
        match self {
            Resolved::Component(target) => Some(target),
            Resolved::Instance(instance) => match instance.downcast::<String>() {
                Ok(s) => Some(*s),
                Err(instance) => instance.downcast_ref::<&'static str>().map(|s| s.to_string()),
            },
        }
    }

    pub fn is_component(&self) -> bool {
        matches!(self, Resolved::Component(_))
    }
}

impl fmt::Debug for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolved::Instance(_) => f.write_str("Resolved::Instance(..)"),
            Resolved::Component(target) => f.debug_tuple("Resolved::Component").field(target).finish(),
        }
    }
}

///////////////////////////////////////////////////////////////////////////////
// Tests
///////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Provider;
    use serde_json::json;

    #[derive(Debug, Default, PartialEq)]
    struct Greeter {
        greeting: &'static str,
    }

    /// Hands out the parameters it receives.
    #[derive(Default)]
    struct Echo;

    impl Provider for Echo {
        fn new_instance(&self, params: Option<Params>) -> Box<dyn Any> {
            Box::new(params)
        }
    }

    fn registry() -> TypeRegistry {
        TypeRegistry::builder()
            .with_type::<Greeter>("Greeter")
            .with_provider::<Echo>("Echo")
            .with_namespaced_type::<Greeter>("acme", "AcmeGreeter")
            .build()
    }

    fn binding(name: &str, target: &str) -> Binding {
        Binding::new_instance(BindingRecord::new(name, target)).unwrap()
    }

    fn echoed(resolved: Resolved) -> Option<Params> {
        resolved.downcast::<Option<Params>>().unwrap()
    }

    #[test]
    fn classify_prefixes() {
        assert_eq!(BindingKind::classify("apex_greeter"), Some(BindingKind::Class));
        assert_eq!(BindingKind::classify("lc_card"), Some(BindingKind::Component));
        assert_eq!(BindingKind::classify("vf_page"), Some(BindingKind::View));
        assert_eq!(BindingKind::classify("foo_widget"), None);
        assert_eq!(BindingKind::classify("apex"), None);
        assert_eq!(BindingKind::classify(""), None);
    }

    #[test]
    fn classify_ignores_case() {
        assert_eq!(BindingKind::classify("APEX_Greeter"), Some(BindingKind::Class));
        assert_eq!(BindingKind::classify("Lc_card"), Some(BindingKind::Component));
        assert_eq!(BindingKind::classify("VF_page"), Some(BindingKind::View));
    }

    #[test]
    fn classify_non_ascii_name() {
        assert_eq!(BindingKind::classify("äpex_greeter"), None);
        assert_eq!(BindingKind::classify("ä"), None);
    }

    #[test]
    fn prefix_round_trips_through_classify() {
        for kind in [BindingKind::Class, BindingKind::Component, BindingKind::View] {
            assert_eq!(BindingKind::classify(kind.prefix()), Some(kind));
        }
    }

    #[test]
    fn new_instance_unrecognized() {
        let err = Binding::new_instance(BindingRecord::new("foo_widget", "Widget")).unwrap_err();
        assert!(err.to_string().contains("foo_widget"));
        assert_eq!(
            err,
            BindingError::NotRecognized {
                name: "foo_widget".to_owned()
            }
        );
    }

    #[test]
    fn new_instance_wraps_record() {
        let record = BindingRecord::new("lc_card", "c:card").with_namespace("acme");
        let binding = Binding::new_instance(record.clone()).unwrap();
        assert_eq!(binding.kind(), BindingKind::Component);
        assert_eq!(binding.record(), &record);
        assert_eq!(binding.namespace(), Some("acme"));
        assert_eq!(binding.into_record(), record);
    }

    #[test]
    fn class_plain_instance() {
        let resolved = binding("apex_greeter", "Greeter").get_instance(&registry()).unwrap();
        assert_eq!(resolved.downcast_ref::<Greeter>(), Some(&Greeter::default()));
    }

    #[test]
    fn class_plain_with_params_fails() {
        let err = binding("apex_greeter", "Greeter")
            .get_instance_with(&registry(), Some(json!(1)))
            .unwrap_err();
        assert!(matches!(err, BindingError::ParamsNotAccepted { .. }));
    }

    #[test]
    fn class_missing_type_fails() {
        let err = binding("apex_missing", "Missing").get_instance(&registry()).unwrap_err();
        assert_eq!(
            err,
            BindingError::TypeNotFound {
                target: "Missing".to_owned()
            }
        );
    }

    #[test]
    fn class_namespaced_lookup() {
        let types = registry();
        let record = BindingRecord::new("apex_greeter", "AcmeGreeter").with_namespace("acme");
        let resolved = Binding::new_instance(record).unwrap().get_instance(&types).unwrap();
        assert!(resolved.downcast_ref::<Greeter>().is_some());

        // Not registered globally.
        let err = binding("apex_greeter", "AcmeGreeter").get_instance(&types).unwrap_err();
        assert!(matches!(err, BindingError::TypeNotFound { .. }));
    }

    #[test]
    fn class_provider_passes_params_through() {
        let types = registry();
        let b = binding("apex_echo", "Echo");

        assert_eq!(echoed(b.get_instance(&types).unwrap()), None);
        assert_eq!(
            echoed(b.get_instance_with(&types, Some(json!(7))).unwrap()),
            Some(json!(7))
        );

        let structured = json!({"id": 1, "tags": ["a", "b"]});
        assert_eq!(
            echoed(b.get_instance_with(&types, Some(structured.clone())).unwrap()),
            Some(structured)
        );
    }

    #[test]
    fn view_provider_passes_params_through() {
        let types = registry();
        let b = binding("vf_echo", "Echo");

        assert_eq!(echoed(b.get_instance(&types).unwrap()), None);
        assert_eq!(
            echoed(b.get_instance_with(&types, Some(json!("x"))).unwrap()),
            Some(json!("x"))
        );
    }

    #[test]
    fn view_requires_provider() {
        let types = registry();
        let b = binding("vf_greeter", "Greeter");

        let err = b.get_instance(&types).unwrap_err();
        assert_eq!(
            err,
            BindingError::ProviderRequired {
                name: "vf_greeter".to_owned(),
                target: "Greeter".to_owned()
            }
        );

        let err = b.get_instance_with(&types, Some(json!(1))).unwrap_err();
        assert!(matches!(err, BindingError::ProviderRequired { .. }));
    }

    #[test]
    fn component_returns_target() {
        let types = TypeRegistry::new();
        let b = binding("lc_card", "c:card");

        for params in [None, Some(json!(1)), Some(json!({"a": [1, 2]}))] {
            let resolved = b.get_instance_with(&types, params).unwrap();
            assert!(resolved.is_component());
            assert_eq!(resolved.into_string().as_deref(), Some("c:card"));
        }
    }

    #[test]
    fn into_string_coerces_strings_only() {
        assert_eq!(
            Resolved::Instance(Box::new(String::from("a"))).into_string(),
            Some("a".to_owned())
        );
        assert_eq!(
            Resolved::Instance(Box::new("b")).into_string(),
            Some("b".to_owned())
        );
        assert_eq!(Resolved::Instance(Box::new(1u8)).into_string(), None);
    }

    #[test]
    fn downcast_wrong_type_returns_value() {
        let resolved = Resolved::Instance(Box::new(5u32));
        let resolved = resolved.downcast::<String>().unwrap_err();
        assert_eq!(resolved.downcast::<u32>().unwrap(), 5);
    }
}
