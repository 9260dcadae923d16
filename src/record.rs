//! Declarative binding records.

use fnv::FnvHashMap;
use serde::Deserialize;
use serde_json::Value;
use std::borrow::Cow;
use std::cmp::Ordering;

/// Identifiers of the core columns of a binding record.
pub mod fields {
    /// The namespace-prefixed unique name of the binding.
    pub const QUALIFIED_NAME: &str = "qualified_name";
    /// The developer name. Its prefix selects the kind of binding.
    pub const NAME: &str = "name";
    /// Optional scope of the target identifier.
    pub const NAMESPACE: &str = "namespace";
    /// Identifier of the thing to instantiate.
    pub const TARGET: &str = "target";

    /// The columns that are part of every read.
    pub const CORE: [&str; 4] = [QUALIFIED_NAME, NAME, NAMESPACE, TARGET];

    /// Returns true if the field is one of the core columns.
    pub fn is_core(field: &str) -> bool {
        CORE.contains(&field)
    }
}

///////////////////////////////////////////////////////////////////////////////
// Binding Record
///////////////////////////////////////////////////////////////////////////////

/// One row of the binding record store.
///
/// A record maps a developer name to a target and may carry any number of
/// extra columns.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawRecord")]
pub struct BindingRecord {
    qualified_name: String,
    name: String,
    namespace: Option<String>,
    target: String,
    extra: FnvHashMap<String, Value>,
}

impl BindingRecord {
    /// Creates a record without namespace.
    pub fn new(name: impl Into<String>, target: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            qualified_name: name.clone(),
            name,
            namespace: None,
            target: target.into(),
            extra: FnvHashMap::default(),
        }
    }

    /// Places the record in a namespace. An empty namespace removes it.
    ///
    /// Unless an explicit qualified name was set, the qualified name becomes
    /// `namespace__name`.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        let is_default = self.qualified_name == self.default_qualified_name();
        let namespace = namespace.into();
        self.namespace = Some(namespace).filter(|ns| !ns.is_empty());
        if is_default {
            self.qualified_name = self.default_qualified_name();
        }
        self
    }

    fn default_qualified_name(&self) -> String {
        match &self.namespace {
            Some(ns) => qualify(ns, &self.name),
            None => self.name.clone(),
        }
    }

    /// Sets an explicit qualified name.
    pub fn with_qualified_name(mut self, qualified_name: impl Into<String>) -> Self {
        self.qualified_name = qualified_name.into();
        self
    }

    /// Sets an extra column.
    pub fn with_field(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(field.into(), value.into());
        self
    }

    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Returns the names of the extra columns of this record.
    pub fn extra_fields(&self) -> impl Iterator<Item = &str> {
        self.extra.keys().map(String::as_str)
    }

    /// Returns the value of a column, coerced to a string.
    ///
    /// Absent columns and `null` values return `None`.
    pub fn field(&self, field: &str) -> Option<Cow<'_, str>> {
        match field {
            fields::QUALIFIED_NAME => Some(Cow::Borrowed(&self.qualified_name)),
            fields::NAME => Some(Cow::Borrowed(&self.name)),
            fields::NAMESPACE => self.namespace.as_deref().map(Cow::Borrowed),
            fields::TARGET => Some(Cow::Borrowed(&self.target)),
            _ => coerce(self.extra.get(field)?),
        }
    }

    /// Returns the value of a column for comparisons.
    pub(crate) fn scalar(&self, field: &str) -> Option<Scalar<'_>> {
        match field {
            fields::QUALIFIED_NAME | fields::NAME | fields::NAMESPACE | fields::TARGET => {
                self.field(field).map(Scalar::Text)
            }
            _ => Scalar::from_value(self.extra.get(field)?),
        }
    }

    /// Drops the extra columns that are not in the projection.
    pub(crate) fn project(mut self, columns: &[String]) -> Self {
        self.extra.retain(|k, _| columns.iter().any(|c| c == k));
        self
    }
}

fn qualify(namespace: &str, name: &str) -> String {
    format!("{}__{}", namespace, name)
}

/// Coerces a column value to a string. `null` has no string form.
pub(crate) fn coerce(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(Cow::Borrowed(s)),
        other => Some(Cow::Owned(other.to_string())),
    }
}

///////////////////////////////////////////////////////////////////////////////
// Comparable Values
///////////////////////////////////////////////////////////////////////////////

/// A non-null column value as the store compares it.
///
/// Numbers compare numerically, everything else as case-insensitive text.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Scalar<'a> {
    Number(f64),
    Text(Cow<'a, str>),
}

impl<'a> Scalar<'a> {
    pub(crate) fn from_value(value: &'a Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(match n.as_f64() {
                Some(f) => Scalar::Number(f),
                None => Scalar::Text(Cow::Owned(n.to_string())),
            }),
            other => coerce(other).map(Scalar::Text),
        }
    }

    /// Text that reads as a number equals that number.
    pub(crate) fn matches(&self, other: &Scalar<'_>) -> bool {
        match (self, other) {
            (Scalar::Number(a), Scalar::Number(b)) => a == b,
            (Scalar::Text(a), Scalar::Text(b)) => a.to_lowercase() == b.to_lowercase(),
            (Scalar::Number(n), Scalar::Text(t)) | (Scalar::Text(t), Scalar::Number(n)) => {
                t.trim().parse::<f64>().map_or(false, |v| v == *n)
            }
        }
    }

    /// Ascending order. Numbers sort before text.
    pub(crate) fn compare(&self, other: &Scalar<'_>) -> Ordering {
        match (self, other) {
            (Scalar::Number(a), Scalar::Number(b)) => a.total_cmp(b),
            (Scalar::Text(a), Scalar::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
            (Scalar::Number(_), Scalar::Text(_)) => Ordering::Less,
            (Scalar::Text(_), Scalar::Number(_)) => Ordering::Greater,
        }
    }
}

///////////////////////////////////////////////////////////////////////////////
// Deserialization
///////////////////////////////////////////////////////////////////////////////

#[derive(Deserialize)]
struct RawRecord {
    #[serde(default)]
    qualified_name: Option<String>,
    name: String,
    #[serde(default)]
    namespace: Option<String>,
    target: String,
    #[serde(flatten)]
    extra: FnvHashMap<String, Value>,
}

impl From<RawRecord> for BindingRecord {
    fn from(raw: RawRecord) -> Self {
        let namespace = raw.namespace.filter(|ns| !ns.is_empty());
        let qualified_name = match (raw.qualified_name, &namespace) {
            (Some(qn), _) => qn,
            (None, Some(ns)) => qualify(ns, &raw.name),
            (None, None) => raw.name.clone(),
        };
        Self {
            qualified_name,
            name: raw.name,
            namespace,
            target: raw.target,
            extra: raw.extra,
        }
    }
}

///////////////////////////////////////////////////////////////////////////////
// Tests
///////////////////////////////////////////////////////////////////////////////
