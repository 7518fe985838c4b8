//! Validating builder for object model types.
//!
//! Setters take internal field names (`location`, not `in`). Nothing is
//! checked until [`Builder::build`], which runs the same validation as the
//! loader and also reports any unknown names that were used.

use std::marker::PhantomData;

use serde_json::{Map, Value};

use crate::dumper;
use crate::error::{FieldError, ValidationErrors};
use crate::loader;
use crate::model::SpecObject;

/// Builder for a [`SpecObject`].
#[derive(Debug, Clone)]
pub struct Builder<T> {
    raw: Map<String, Value>,
    errors: Vec<FieldError>,
    _object: PhantomData<T>,
}

impl<T: SpecObject> Default for Builder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: SpecObject> Builder<T> {
    pub fn new() -> Self {
        Self {
            raw: Map::new(),
            errors: Vec::new(),
            _object: PhantomData,
        }
    }

    /// Start from an existing object's fields.
    pub fn from_object(object: &T) -> Self {
        Self {
            raw: dumper::dump(object),
            errors: Vec::new(),
            _object: PhantomData,
        }
    }

    /// Map an internal name to its wire key. `x-*` names pass through.
    fn wire_key(&mut self, name: &str) -> Option<String> {
        if name.starts_with("x-") {
            return Some(name.to_string());
        }
        match T::schema().field(name) {
            Some(field) => Some(field.wire_name().to_string()),
            None => {
                self.errors.push(FieldError::new(
                    name,
                    format!("unknown field for {}", T::KIND.name()),
                ));
                None
            }
        }
    }

    /// Set a field to a raw value.
    pub fn set(mut self, name: &str, value: impl Into<Value>) -> Self {
        if let Some(key) = self.wire_key(name) {
            self.raw.insert(key, value.into());
        }
        self
    }

    /// Set a nested-object field.
    pub fn set_object<O: SpecObject>(self, name: &str, object: &O) -> Self {
        self.set(name, object.to_value())
    }

    /// Append an object to a list field, creating the list if unset.
    pub fn push_object<O: SpecObject>(mut self, name: &str, object: &O) -> Self {
        let Some(key) = self.wire_key(name) else {
            return self;
        };
        let slot = self
            .raw
            .entry(key)
            .or_insert_with(|| Value::Array(Vec::new()));
        match slot {
            Value::Array(items) => items.push(object.to_value()),
            _ => self.errors.push(FieldError::new(name, "not a list")),
        }
        self
    }

    /// Insert `key: value` into a mapping field, creating the mapping if unset.
    pub fn insert_entry(mut self, name: &str, key: &str, value: impl Into<Value>) -> Self {
        let Some(field_key) = self.wire_key(name) else {
            return self;
        };
        let slot = self
            .raw
            .entry(field_key)
            .or_insert_with(|| Value::Object(Map::new()));
        match slot {
            Value::Object(entries) => {
                entries.insert(key.to_string(), value.into());
            }
            _ => self.errors.push(FieldError::new(name, "not a mapping")),
        }
        self
    }

    /// Clear a field.
    pub fn unset(mut self, name: &str) -> Self {
        if let Some(key) = self.wire_key(name) {
            self.raw.remove(&key);
        }
        self
    }

    /// Validate and build. Builder misuse and field errors are reported together.
    pub fn build(self) -> Result<T, ValidationErrors> {
        let mut errors = self.errors;
        let result = loader::load_map::<T>(&self.raw);
        if let Err(loaded) = &result {
            errors.extend(loaded.iter().cloned());
        }
        match ValidationErrors::from_vec(errors) {
            Some(errors) => Err(errors),
            None => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Contact, Info, Parameter, ParameterLocation};

    #[test]
    fn builds_with_internal_names() {
        let param = Parameter::builder()
            .set("name", "id")
            .set("location", "path")
            .set("allow_empty_value", true)
            .build()
            .unwrap();
        assert_eq!(param.location(), ParameterLocation::Path);
        assert_eq!(param.allow_empty_value(), Some(true));
    }

    #[test]
    fn build_validates_like_the_loader() {
        let errors = Contact::builder()
            .set("name", "A")
            .set("url", "not a url")
            .build()
            .unwrap_err();
        assert_eq!(errors.fields(), vec!["url"]);
    }

    #[test]
    fn unknown_names_are_reported_with_field_errors() {
        let errors = Info::builder()
            .set("title", "T")
            .set("termsOfService", "https://example.com")
            .build()
            .unwrap_err();
        assert_eq!(errors.fields(), vec!["termsOfService", "version"]);
    }

    #[test]
    fn unknown_name_alone_fails_build() {
        let errors = Info::builder()
            .set("title", "T")
            .set("version", "1")
            .set("colour", "blue")
            .build()
            .unwrap_err();
        assert_eq!(errors.fields(), vec!["colour"]);
    }

    #[test]
    fn to_builder_produces_a_new_validated_instance() {
        let info = Info::builder()
            .set("title", "T")
            .set("version", "1")
            .set("description", "first")
            .build()
            .unwrap();
        let changed = info
            .to_builder()
            .unset("description")
            .set("x-owner", "platform")
            .build()
            .unwrap();
        assert_eq!(info.description(), Some("first"));
        assert_eq!(changed.description(), None);
        assert_eq!(changed.extensions().len(), 1);
    }

    #[test]
    fn nested_objects_and_lists() {
        let contact = Contact::builder()
            .set("name", "A")
            .set("url", "https://a.io")
            .build()
            .unwrap();
        let info = Info::builder()
            .set("title", "T")
            .set("version", "1")
            .set_object("contact", &contact)
            .build()
            .unwrap();
        assert_eq!(info.contact(), Some(&contact));

        let op = crate::model::Operation::builder()
            .insert_entry("responses", "200", serde_json::json!({"description": "ok"}))
            .push_object(
                "parameters",
                &Parameter::builder()
                    .set("name", "q")
                    .set("location", "query")
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();
        assert_eq!(op.parameters().len(), 1);
        assert!(op.responses().contains_key("200"));
    }
}
