//! Loading bindings from the record store.

use crate::binding::Binding;
use crate::error::Result;
use crate::record::fields;
use crate::store::{BindingStore, Condition, ReadRequest};
use serde_json::Value;
use tracing::debug;

/// Builds a read against the binding record store.
///
/// The builder is a plain value: every method returns a new builder, and
/// [`get`] does not change it. A builder can be reused as often as needed
/// without predicates leaking from one read into the next.
///
/// ```
/// use rsbinding::{BindingQuery, BindingRecord, MemoryStore};
///
/// let store = MemoryStore::new()
///     .with(BindingRecord::new("lc_card", "c:card"))
///     .with(BindingRecord::new("lc_list", "c:list"));
///
/// let bindings = BindingQuery::new().by_name("lc_card").get(&store).unwrap();
/// assert_eq!(bindings.len(), 1);
/// ```
///
/// [`get`]: BindingQuery::get
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[must_use]
pub struct BindingQuery {
    conditions: Vec<Condition>,
    order_by: Option<String>,
}

impl BindingQuery {
    /// Creates a query that matches every binding.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the query to the binding with this qualified name.
    pub fn by_name(self, qualified_name: &str) -> Self {
        self.with(fields::QUALIFIED_NAME, qualified_name)
    }

    /// Restricts the query to bindings in a namespace.
    pub fn by_namespace(self, namespace: &str) -> Self {
        self.with(fields::NAMESPACE, namespace)
    }

    /// Adds an equality predicate on any field.
    ///
    /// Multiple predicates must all hold. Numbers match numerically, any
    /// other value matches the column as text.
    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition {
            field: field.to_owned(),
            value: value.into(),
        });
        self
    }

    /// Sorts the result ascending by a field. Replaces any earlier sort key.
    pub fn order_by(mut self, field: &str) -> Self {
        self.order_by = Some(field.to_owned());
        self
    }

    /// Returns the read this query executes.
    ///
    /// The projection holds the core columns and every column a predicate
    /// or the sort key refers to.
    pub fn request(&self) -> ReadRequest {
        let mut columns: Vec<String> = fields::CORE.iter().map(|c| c.to_string()).collect();
        let referenced = self
            .conditions
            .iter()
            .map(|c| c.field.as_str())
            .chain(self.order_by.as_deref());
        for field in referenced {
            if !columns.iter().any(|c| c == field) {
                columns.push(field.to_owned());
            }
        }

        ReadRequest {
            columns,
            conditions: self.conditions.clone(),
            order_by: self.order_by.clone(),
        }
    }

    /// Executes the query.
    ///
    /// Returns one binding per matching record. Store errors are returned as
    /// they are raised.
    pub fn get<S: BindingStore + ?Sized>(&self, store: &S) -> Result<Vec<Binding>> {
        let request = self.request();
        debug!(predicate = %request.predicate(), order_by = ?request.order_by, "reading bindings");

        let bindings = store
            .read(&request)?
            .into_iter()
            .map(Binding::new_instance)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(bindings)
    }
}

///////////////////////////////////////////////////////////////////////////////
// Tests
///////////////////////////////////////////////////////////////////////////////
