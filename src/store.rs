//! The binding record store.
//!
//! The resolver only reads from the store. A read is described by a
//! [`ReadRequest`]: a projection of columns, a conjunction of equality
//! predicates and an optional ascending sort key.

use crate::error::StoreError;
use crate::record::{coerce, fields, BindingRecord, Scalar};
use serde_json::Value;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

/// Name of the table that holds the binding records.
pub const TABLE: &str = "bindings";

///////////////////////////////////////////////////////////////////////////////
// Read Requests
///////////////////////////////////////////////////////////////////////////////

/// An equality predicate on a single column.
///
/// Numbers compare numerically, any other value as text. A `null` value
/// matches nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub field: String,
    pub value: Value,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match coerce(&self.value) {
            Some(text) => write!(f, "{} = '{}'", self.field, escape_literal(&text)),
            None => write!(f, "{} = null", self.field),
        }
    }
}

/// Escapes a value so it can be embedded in a single-quoted literal.
pub fn escape_literal(value: &str) -> Cow<'_, str> {
    if !value.contains(['\\', '\'']) {
        return Cow::Borrowed(value);
    }

    let mut escaped = String::with_capacity(value.len() + 2);
    for c in value.chars() {
        if c == '\\' || c == '\'' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    Cow::Owned(escaped)
}

/// A read against the binding record store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadRequest {
    /// Columns to return. Always starts with the core columns.
    pub columns: Vec<String>,
    /// Equality predicates, combined with AND.
    pub conditions: Vec<Condition>,
    /// Optional ascending sort key.
    pub order_by: Option<String>,
}

impl ReadRequest {
    /// Renders the predicates as a single conjunction.
    ///
    /// Returns an empty string if there are no predicates.
    pub fn predicate(&self) -> String {
        self.conditions
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" AND ")
    }
}

impl fmt::Display for ReadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT {} FROM {}", self.columns.join(", "), TABLE)?;
        if !self.conditions.is_empty() {
            write!(f, " WHERE {}", self.predicate())?;
        }
        if let Some(field) = &self.order_by {
            write!(f, " ORDER BY {} ASC", field)?;
        }
        Ok(())
    }
}

///////////////////////////////////////////////////////////////////////////////
// Store Trait
///////////////////////////////////////////////////////////////////////////////

/// A source of binding records.
pub trait BindingStore {
    /// Executes a read.
    ///
    /// Records are returned in a stable, store-defined order unless the
    /// request has a sort key.
    fn read(&self, request: &ReadRequest) -> Result<Vec<BindingRecord>, StoreError>;
}

impl<S: BindingStore + ?Sized> BindingStore for &S {
    fn read(&self, request: &ReadRequest) -> Result<Vec<BindingRecord>, StoreError> {
        (**self).read(request)
    }
}

///////////////////////////////////////////////////////////////////////////////
// Memory Store
///////////////////////////////////////////////////////////////////////////////

/// A binding record store that lives in memory.
///
/// Records are kept in insertion order. The columns of the store are the core
/// columns plus every extra column of an inserted record.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Vec<BindingRecord>,
    columns: Vec<String>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store from a JSON array of binding records.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let records: Vec<BindingRecord> = serde_json::from_str(json)?;
        Ok(records.into_iter().collect())
    }

    /// Adds a record.
    pub fn insert(&mut self, record: BindingRecord) {
        for field in record.extra_fields() {
            if !self.has_column(field) {
                self.columns.push(field.to_owned());
            }
        }
        self.records.push(record);
    }

    /// Adds a record, builder style.
    pub fn with(mut self, record: BindingRecord) -> Self {
        self.insert(record);
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns true if the store has a column with this name.
    pub fn has_column(&self, field: &str) -> bool {
        fields::is_core(field) || self.columns.iter().any(|c| c == field)
    }

    fn check_column(&self, field: &str) -> Result<(), StoreError> {
        if self.has_column(field) {
            Ok(())
        } else {
            Err(StoreError::UnknownField(field.to_owned()))
        }
    }
}

impl FromIterator<BindingRecord> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = BindingRecord>>(iter: I) -> Self {
        let mut store = MemoryStore::new();
        for record in iter {
            store.insert(record);
        }
        store
    }
}

impl BindingStore for MemoryStore {
    fn read(&self, request: &ReadRequest) -> Result<Vec<BindingRecord>, StoreError> {
        for field in &request.columns {
            self.check_column(field)?;
        }
        for condition in &request.conditions {
            self.check_column(&condition.field)?;
        }
        if let Some(field) = &request.order_by {
            self.check_column(field)?;
        }

        let mut rows: Vec<&BindingRecord> = self
            .records
            .iter()
            .filter(|record| request.conditions.iter().all(|c| matches(record, c)))
            .collect();

        if let Some(field) = &request.order_by {
            // Stable, so equal keys keep insertion order.
            rows.sort_by(|a, b| compare(a.scalar(field), b.scalar(field)));
        }

        Ok(rows
            .into_iter()
            .map(|record| record.clone().project(&request.columns))
            .collect())
    }
}

/// Absent values never match.
fn matches(record: &BindingRecord, condition: &Condition) -> bool {
    match (
        record.scalar(&condition.field),
        Scalar::from_value(&condition.value),
    ) {
        (Some(value), Some(expected)) => value.matches(&expected),
        _ => false,
    }
}

/// Ascending, absent values first.
fn compare(a: Option<Scalar<'_>>, b: Option<Scalar<'_>>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.compare(&b),
    }
}

///////////////////////////////////////////////////////////////////////////////
// Tests
///////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn request(conditions: Vec<Condition>, order_by: Option<&str>) -> ReadRequest {
        ReadRequest {
            columns: fields::CORE.iter().map(|c| c.to_string()).collect(),
            conditions,
            order_by: order_by.map(str::to_owned),
        }
    }

    fn condition(field: &str, value: impl Into<Value>) -> Condition {
        Condition {
            field: field.to_owned(),
            value: value.into(),
        }
    }

    fn store() -> MemoryStore {
        MemoryStore::new()
            .with(BindingRecord::new("apex_b", "B").with_field("group", "two"))
            .with(BindingRecord::new("apex_a", "A").with_field("group", "one"))
            .with(BindingRecord::new("lc_c", "c:card"))
    }

    #[test]
    fn escape_literal_plain() {
        assert!(matches!(escape_literal("plain"), Cow::Borrowed("plain")));
    }

    #[test]
    fn escape_literal_quotes_and_backslashes() {
        assert_eq!(escape_literal("it's"), "it\\'s");
        assert_eq!(escape_literal("a\\b"), "a\\\\b");
        assert_eq!(escape_literal("' OR name = '"), "\\' OR name = \\'");
    }

    #[test]
    fn predicate_joins_conditions() {
        let req = request(
            vec![condition("name", "apex_a"), condition("group", "o'ne")],
            None,
        );
        assert_eq!(req.predicate(), "name = 'apex_a' AND group = 'o\\'ne'");
    }

    #[test]
    fn display_renders_statement() {
        let req = request(vec![condition("name", "apex_a")], Some("target"));
        assert_eq!(
            req.to_string(),
            "SELECT qualified_name, name, namespace, target FROM bindings \
             WHERE name = 'apex_a' ORDER BY target ASC"
        );

        let req = request(Vec::new(), None);
        assert_eq!(
            req.to_string(),
            "SELECT qualified_name, name, namespace, target FROM bindings"
        );
    }

    #[test]
    fn read_keeps_insertion_order() {
        let rows = store().read(&request(Vec::new(), None)).unwrap();
        let names: Vec<_> = rows.iter().map(BindingRecord::name).collect();
        assert_eq!(names, vec!["apex_b", "apex_a", "lc_c"]);
    }

    #[test]
    fn read_sorts_absent_values_first() {
        let mut req = request(Vec::new(), Some("group"));
        req.columns.push("group".to_owned());
        let rows = store().read(&req).unwrap();
        let names: Vec<_> = rows.iter().map(BindingRecord::name).collect();
        assert_eq!(names, vec!["lc_c", "apex_a", "apex_b"]);
    }

    #[test]
    fn read_sorts_numbers_numerically() {
        let store = MemoryStore::new()
            .with(BindingRecord::new("apex_a", "A").with_field("priority", 2))
            .with(BindingRecord::new("apex_b", "B").with_field("priority", 10))
            .with(BindingRecord::new("apex_c", "C").with_field("priority", 1))
            .with(BindingRecord::new("apex_d", "D").with_field("priority", 2.5))
            .with(BindingRecord::new("apex_e", "E"))
            .with(BindingRecord::new("apex_f", "F").with_field("priority", 2));

        let rows = store.read(&request(Vec::new(), Some("priority"))).unwrap();
        let names: Vec<_> = rows.iter().map(BindingRecord::name).collect();
        assert_eq!(
            names,
            vec!["apex_e", "apex_c", "apex_a", "apex_f", "apex_d", "apex_b"]
        );
    }

    #[test]
    fn read_matches_float_column() {
        let store = MemoryStore::new()
            .with(BindingRecord::new("apex_a", "A").with_field("weight", 1.0))
            .with(BindingRecord::new("apex_b", "B").with_field("weight", 1.5));

        let rows = store
            .read(&request(vec![condition("weight", 1.0)], None))
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name(), "apex_a");

        let rows = store
            .read(&request(vec![condition("weight", 1)], None))
            .unwrap();
        assert_eq!(rows.len(), 1);

        let rows = store
            .read(&request(vec![condition("weight", "1.5")], None))
            .unwrap();
        assert_eq!(rows[0].name(), "apex_b");
    }

    #[test]
    fn null_condition_matches_nothing() {
        let req = request(vec![condition("group", Value::Null)], None);
        assert_eq!(req.predicate(), "group = null");
        assert!(store().read(&req).unwrap().is_empty());
    }

    #[test]
    fn read_matches_case_insensitive() {
        let rows = store()
            .read(&request(vec![condition("name", "APEX_A")], None))
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].target(), "A");
    }

    #[test]
    fn absent_values_never_match() {
        let rows = store()
            .read(&request(vec![condition("namespace", "")], None))
            .unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn read_projects_extra_columns() {
        let rows = store()
            .read(&request(vec![condition("group", "one")], None))
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].field("group"), None);
    }

    #[test]
    fn unknown_field_fails() {
        let err = store()
            .read(&request(vec![condition("color", "red")], None))
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownField(f) if f == "color"));

        let err = store().read(&request(Vec::new(), Some("color"))).unwrap_err();
        assert!(matches!(err, StoreError::UnknownField(_)));
    }

    #[test]
    fn from_json() {
        let store = MemoryStore::from_json(
            r#"[
                {"name": "apex_a", "target": "A", "group": "one"},
                {"name": "vf_b", "namespace": "acme", "target": "B"}
            ]"#,
        )
        .unwrap();

        assert_eq!(store.len(), 2);
        assert!(store.has_column("group"));
        assert!(!store.has_column("color"));
    }

    #[test]
    fn from_json_malformed() {
        let err = MemoryStore::from_json(r#"[{"name": "apex_a"}]"#).unwrap_err();
        assert!(matches!(err, StoreError::Malformed(_)));
    }
}
