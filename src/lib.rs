//! Resolution of declarative bindings.
//!
//! # Features
//!
//! * Binding records that map a developer name to a target
//! * Selection of the kind of binding from the prefix of the developer name
//! * Construction of targets through an explicit registry of types
//! * Optional providers that build instances from caller-supplied parameters
//! * A small query builder to load bindings from a record store
//!
//! # Kinds of Bindings
//!
//! The prefix of the developer name decides how a binding is resolved. The
//! prefix test ignores case.
//!
//! | Prefix  | Kind                      | Resolves to                                |
//! |---------|---------------------------|--------------------------------------------|
//! | `apex_` | [`BindingKind::Class`]    | a new instance of the target type          |
//! | `lc_`   | [`BindingKind::Component`]| the target identifier itself               |
//! | `vf_`   | [`BindingKind::View`]     | whatever the target [`Provider`] builds    |
//!
//! A class binding whose target is a provider also resolves through the
//! provider. Parameters can only be passed to providers.
//!
//! # Registering Types
//!
//! Targets are looked up in a [`TypeRegistry`]. Every type that a binding
//! may name must be registered up front, optionally in a namespace.
//!
//! ```rust
//! use rsbinding::TypeRegistry;
//!
//! #[derive(Default)]
//! struct SmtpMailer;
//!
//! let types = TypeRegistry::builder()
//!     .with_type::<SmtpMailer>("SmtpMailer")
//!     .with_namespaced_type::<SmtpMailer>("acme", "Mailer")
//!     .build();
//!
//! assert!(types.contains(Some("acme"), "mailer"));
//! ```
//!
//! # Resolving Bindings
//!
//! ```rust
//! use rsbinding::{Injector, MemoryStore, TypeRegistry};
//!
//! #[derive(Default)]
//! struct SmtpMailer;
//!
//! let store = MemoryStore::from_json(r#"[
//!     {"name": "apex_mailer", "target": "SmtpMailer"},
//!     {"name": "lc_inbox", "target": "c:inbox"}
//! ]"#).unwrap();
//! let types = TypeRegistry::builder()
//!     .with_type::<SmtpMailer>("SmtpMailer")
//!     .build();
//!
//! let injector = Injector::new(store, types);
//!
//! let mailer = injector.resolve("apex_mailer", None).unwrap();
//! assert!(mailer.downcast_ref::<SmtpMailer>().is_some());
//!
//! assert_eq!(injector.get_instance("lc_inbox").unwrap(), "c:inbox");
//! ```

mod binding;
mod error;
mod injector;
mod provider;
mod query;
mod record;
mod registry;
mod store;


pub use crate::binding::{Binding, BindingKind, Resolved};
pub use crate::error::{BindingError, Error, Result, StoreError};
pub use crate::injector::Injector;
pub use crate::provider::{Params, Provider};
pub use crate::query::BindingQuery;
pub use crate::record::{fields, BindingRecord};
pub use crate::registry::{Constructed, Ctor, RegistryBuilder, TypeRegistry};
pub use crate::store::{escape_literal, BindingStore, Condition, MemoryStore, ReadRequest, TABLE};
