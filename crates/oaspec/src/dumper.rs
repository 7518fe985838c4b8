//! Typed objects back to raw mappings and text.
//!
//! Keys are wire names. Unset optional fields are left out entirely; no
//! `null` is ever emitted.

use serde_json::{Map, Value};

use crate::model::SpecObject;
use crate::record::{FieldValue, Record};

/// Dump an object to a raw mapping.
pub fn dump<T: SpecObject>(object: &T) -> Map<String, Value> {
    dump_record(&object.to_record())
}

/// Dump a record to a raw mapping, following its schema's field order.
pub fn dump_record(record: &Record) -> Map<String, Value> {
    let mut map = Map::new();
    for field in record.kind().schema().fields() {
        if let Some(value) = record.get(field.name()) {
            map.insert(field.wire_name().to_string(), dump_value(value));
        }
    }
    for (key, value) in record.extensions() {
        map.insert(key.clone(), value.clone());
    }
    map
}

fn dump_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::String(s) => Value::String(s.clone()),
        FieldValue::Bool(b) => Value::Bool(*b),
        FieldValue::Raw(v) => v.clone(),
        FieldValue::Dict(m) => Value::Object(m.clone()),
        FieldValue::Strings(items) => {
            Value::Array(items.iter().cloned().map(Value::String).collect())
        }
        FieldValue::Object(record) => Value::Object(dump_record(record)),
        FieldValue::List(records) => Value::Array(
            records
                .iter()
                .map(|r| Value::Object(dump_record(r)))
                .collect(),
        ),
        FieldValue::Map(records) => Value::Object(
            records
                .iter()
                .map(|(key, r)| (key.clone(), Value::Object(dump_record(r))))
                .collect(),
        ),
    }
}

/// Pretty JSON, two-space indent, keys in lexicographic order.
pub fn to_json<T: SpecObject>(object: &T) -> String {
    format!("{:#}", object.to_value())
}

/// Single-line JSON.
pub fn to_json_compact<T: SpecObject>(object: &T) -> String {
    object.to_value().to_string()
}

/// Block-style YAML.
pub fn to_yaml<T: SpecObject>(object: &T) -> String {
    serde_yaml::to_string(&object.to_value()).expect("JSON value is always representable as YAML")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Info, Parameter};
    use serde_json::json;

    #[test]
    fn unset_optional_fields_are_omitted() {
        let info = Info::from_value(&json!({"title": "T", "version": "1.0"})).unwrap();
        let raw = dump(&info);
        assert!(!raw.contains_key("description"));
        assert!(!raw.contains_key("contact"));
        assert_eq!(raw.len(), 2);
    }

    #[test]
    fn null_and_missing_dump_the_same() {
        let with_null = Info::from_value(&json!({
            "title": "T", "version": "1", "description": null, "contact": null
        }))
        .unwrap();
        let without = Info::from_value(&json!({"title": "T", "version": "1"})).unwrap();
        assert_eq!(dump(&with_null), dump(&without));
        assert!(!to_json(&with_null).contains("null"));
    }

    #[test]
    fn aliases_are_emitted_under_wire_names() {
        let param = Parameter::from_value(&json!({
            "name": "id", "in": "path", "allowEmptyValue": false, "allowReserved": true
        }))
        .unwrap();
        let raw = dump(&param);
        assert_eq!(raw.get("in"), Some(&json!("path")));
        assert_eq!(raw.get("allowEmptyValue"), Some(&json!(false)));
        assert_eq!(raw.get("allowReserved"), Some(&json!(true)));
        assert!(!raw.contains_key("location"));
        assert!(!raw.contains_key("allow_empty_value"));
    }

    #[test]
    fn nested_objects_and_extensions_are_dumped() {
        let info = Info::from_value(&json!({
            "title": "T",
            "version": "1",
            "termsOfService": "https://example.com/tos",
            "contact": {"name": "A", "url": "https://a.io", "x-slack": "#api"},
            "x-audience": "internal"
        }))
        .unwrap();
        let raw = Value::Object(dump(&info));
        assert_eq!(raw["termsOfService"], json!("https://example.com/tos"));
        assert_eq!(raw["contact"]["x-slack"], json!("#api"));
        assert_eq!(raw["x-audience"], json!("internal"));
    }

    #[test]
    fn json_keys_are_sorted_and_indented() {
        let info = Info::from_value(&json!({"version": "1", "title": "T"})).unwrap();
        assert_eq!(to_json(&info), "{\n  \"title\": \"T\",\n  \"version\": \"1\"\n}");
        assert_eq!(to_json_compact(&info), r#"{"title":"T","version":"1"}"#);
    }

    #[test]
    fn yaml_is_block_style() {
        let info = Info::from_value(&json!({"title": "T", "version": "1"})).unwrap();
        let text = to_yaml(&info);
        assert!(text.starts_with("title: T\nversion: "));
        assert!(!text.contains('{'));

        let back: Value = serde_yaml::from_str(&text).unwrap();
        assert_eq!(back, json!({"title": "T", "version": "1"}));
    }
}
