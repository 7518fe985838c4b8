//! Validated, untyped field values.
//!
//! A [`Record`] is what the loader produces before a typed object is built,
//! and what the dumper consumes after a typed object is flattened. Values are
//! keyed by internal field name and only present fields are stored.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::FieldError;
use crate::model::SpecObject;
use crate::schema::ObjectKind;

/// `x-*` specification extensions, in key order.
pub type Extensions = BTreeMap<String, Value>;

/// A validated field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Bool(bool),
    Raw(Value),
    Dict(Map<String, Value>),
    Strings(Vec<String>),
    Object(Record),
    List(Vec<Record>),
    Map(BTreeMap<String, Record>),
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<Map<String, Value>> for FieldValue {
    fn from(value: Map<String, Value>) -> Self {
        FieldValue::Dict(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::Strings(value)
    }
}

/// A validated object of one [`ObjectKind`].
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    kind: ObjectKind,
    values: BTreeMap<&'static str, FieldValue>,
    extensions: Extensions,
}

impl Record {
    pub fn new(kind: ObjectKind) -> Self {
        Self {
            kind,
            values: BTreeMap::new(),
            extensions: Extensions::new(),
        }
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn insert(&mut self, name: &'static str, value: FieldValue) {
        self.values.insert(name, value);
    }

    /// Insert when `Some`; `None` leaves the field unset.
    pub fn put(&mut self, name: &'static str, value: Option<FieldValue>) {
        if let Some(value) = value {
            self.values.insert(name, value);
        }
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub fn insert_extension(&mut self, key: String, value: Value) {
        self.extensions.insert(key, value);
    }

    pub fn set_extensions(&mut self, extensions: Extensions) {
        self.extensions = extensions;
    }

    pub(crate) fn take_extensions(&mut self) -> Extensions {
        std::mem::take(&mut self.extensions)
    }

    fn take(&mut self, name: &str) -> Option<FieldValue> {
        self.values.remove(name)
    }

    fn mismatch(&self, name: &str) -> FieldError {
        FieldError::new(
            name,
            format!(
                "{} record does not carry a value of the declared kind",
                self.kind.name()
            ),
        )
    }

    pub(crate) fn string(&mut self, name: &str) -> Option<String> {
        match self.take(name)? {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub(crate) fn require_string(&mut self, name: &str) -> Result<String, FieldError> {
        self.string(name).ok_or_else(|| self.mismatch(name))
    }

    pub(crate) fn bool(&mut self, name: &str) -> Option<bool> {
        match self.take(name)? {
            FieldValue::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub(crate) fn raw(&mut self, name: &str) -> Option<Value> {
        match self.take(name)? {
            FieldValue::Raw(v) => Some(v),
            _ => None,
        }
    }

    pub(crate) fn dict(&mut self, name: &str) -> Option<Map<String, Value>> {
        match self.take(name)? {
            FieldValue::Dict(m) => Some(m),
            _ => None,
        }
    }

    pub(crate) fn require_dict(&mut self, name: &str) -> Result<Map<String, Value>, FieldError> {
        self.dict(name).ok_or_else(|| self.mismatch(name))
    }

    pub(crate) fn strings(&mut self, name: &str) -> Option<Vec<String>> {
        match self.take(name)? {
            FieldValue::Strings(v) => Some(v),
            _ => None,
        }
    }

    pub(crate) fn object<T: SpecObject>(&mut self, name: &str) -> Result<Option<T>, FieldError> {
        match self.take(name) {
            Some(FieldValue::Object(record)) => T::from_record(record).map(Some),
            _ => Ok(None),
        }
    }

    pub(crate) fn require_object<T: SpecObject>(&mut self, name: &str) -> Result<T, FieldError> {
        self.object(name)?.ok_or_else(|| self.mismatch(name))
    }

    pub(crate) fn list<T: SpecObject>(&mut self, name: &str) -> Result<Option<Vec<T>>, FieldError> {
        match self.take(name) {
            Some(FieldValue::List(records)) => records
                .into_iter()
                .map(T::from_record)
                .collect::<Result<Vec<_>, _>>()
                .map(Some),
            _ => Ok(None),
        }
    }

    pub(crate) fn map<T: SpecObject>(
        &mut self,
        name: &str,
    ) -> Result<Option<BTreeMap<String, T>>, FieldError> {
        match self.take(name) {
            Some(FieldValue::Map(records)) => records
                .into_iter()
                .map(|(key, record)| T::from_record(record).map(|value| (key, value)))
                .collect::<Result<BTreeMap<_, _>, _>>()
                .map(Some),
            _ => Ok(None),
        }
    }
}

/// Flatten a list of typed objects into records.
pub(crate) fn records<T: SpecObject>(items: &[T]) -> FieldValue {
    FieldValue::List(items.iter().map(T::to_record).collect())
}

/// Flatten a keyed collection of typed objects into records.
pub(crate) fn record_map<T: SpecObject>(items: &BTreeMap<String, T>) -> FieldValue {
    FieldValue::Map(
        items
            .iter()
            .map(|(key, item)| (key.clone(), item.to_record()))
            .collect(),
    )
}
