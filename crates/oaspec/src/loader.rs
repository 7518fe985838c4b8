//! Schema-driven validation of raw mappings.
//!
//! Every declared field is checked in one pass and all failures are collected;
//! validation never stops at the first bad field. Undeclared keys are ignored,
//! except `x-*` keys which are kept as specification extensions.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde_json::{Map, Value};

use crate::error::{FieldError, ValidationErrors};
use crate::model::SpecObject;
use crate::record::{FieldValue, Record};
use crate::schema::{self, FieldKind, ObjectKind};

/// Message for a required field that is absent or `null`.
pub const MISSING: &str = "required field missing";

/// Path shown for errors on the document root itself.
pub const ROOT: &str = "<root>";

/// URL schemes accepted by [`FieldKind::Url`].
const URL_SCHEMES: &[&str] = &["http", "https", "ftp", "ftps"];

/// Validate `raw` against the schema of `T` and build the typed object.
pub fn load<T: SpecObject>(raw: &Value) -> Result<T, ValidationErrors> {
    let record = validate(raw, T::KIND)?;
    T::from_record(record).map_err(ValidationErrors::single)
}

/// Like [`load`], for a raw mapping.
pub fn load_map<T: SpecObject>(raw: &Map<String, Value>) -> Result<T, ValidationErrors> {
    catalog_checked()?;
    let mut errors = Vec::new();
    let record = validate_map(raw, T::KIND, "", &mut errors);
    finish(T::KIND, record, errors)
        .and_then(|record| T::from_record(record).map_err(ValidationErrors::single))
}

/// Validate `raw` against the schema of `kind` without building a typed object.
pub fn validate(raw: &Value, kind: ObjectKind) -> Result<Record, ValidationErrors> {
    catalog_checked()?;
    let mut errors = Vec::new();
    let record = validate_object(raw, kind, "", &mut errors);
    finish(kind, record, errors)
}

/// Run [`schema::verify`] before any data is checked against the catalog.
fn catalog_checked() -> Result<(), ValidationErrors> {
    schema::verify().map_err(|e| ValidationErrors::single(FieldError::new(ROOT, e.to_string())))
}

fn finish(
    kind: ObjectKind,
    record: Record,
    errors: Vec<FieldError>,
) -> Result<Record, ValidationErrors> {
    match ValidationErrors::from_vec(errors) {
        Some(errors) => {
            tracing::warn!(
                object = kind.name(),
                errors = errors.len(),
                "validation failed"
            );
            Err(errors)
        }
        None => {
            tracing::debug!(object = kind.name(), "object loaded");
            Ok(record)
        }
    }
}

fn qualify(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{}.{}", parent, child)
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        ROOT
    } else {
        path
    }
}

fn validate_object(
    raw: &Value,
    kind: ObjectKind,
    path: &str,
    errors: &mut Vec<FieldError>,
) -> Record {
    match raw.as_object() {
        Some(map) => validate_map(map, kind, path, errors),
        None => {
            errors.push(FieldError::new(display_path(path), "not a mapping"));
            Record::new(kind)
        }
    }
}

fn validate_map(
    map: &Map<String, Value>,
    kind: ObjectKind,
    path: &str,
    errors: &mut Vec<FieldError>,
) -> Record {
    let schema = kind.schema();
    let mut record = Record::new(kind);

    for field in schema.fields() {
        let field_path = qualify(path, field.wire_name());
        match map.get(field.wire_name()) {
            None | Some(Value::Null) => {
                if field.is_required() {
                    errors.push(FieldError::new(field_path, MISSING));
                }
            }
            Some(value) => {
                if let Some(converted) = convert(value, field.kind(), &field_path, errors) {
                    record.insert(field.name(), converted);
                }
            }
        }
    }

    for (key, value) in map {
        if key.starts_with("x-") {
            record.insert_extension(key.clone(), value.clone());
        } else if schema.field_by_wire(key).is_none() {
            tracing::trace!(object = kind.name(), key = %key, "ignoring undeclared key");
        }
    }

    record
}

/// Convert one present, non-null value. Errors are pushed, never returned.
fn convert(
    value: &Value,
    kind: FieldKind,
    path: &str,
    errors: &mut Vec<FieldError>,
) -> Option<FieldValue> {
    let scalar = match kind {
        FieldKind::Nested(nested) => {
            return Some(FieldValue::Object(validate_object(
                value, nested, path, errors,
            )))
        }
        FieldKind::List(item_kind) => return convert_list(value, item_kind, path, errors),
        FieldKind::Paths => return convert_paths(value, path, errors),
        FieldKind::DictOfDicts => return convert_dict_of_dicts(value, path, errors),
        FieldKind::StringList => return convert_string_list(value, path, errors),
        FieldKind::String => as_string(value)
            .map(FieldValue::String)
            .ok_or_else(|| "not a valid string".to_string()),
        FieldKind::Bool => as_bool(value)
            .map(FieldValue::Bool)
            .ok_or_else(|| "not a valid boolean".to_string()),
        FieldKind::Url => check_url(value).map(FieldValue::String),
        FieldKind::Email => check_email(value).map(FieldValue::String),
        FieldKind::Raw => Ok(FieldValue::Raw(value.clone())),
        FieldKind::Dict => value
            .as_object()
            .cloned()
            .map(FieldValue::Dict)
            .ok_or_else(|| "not a mapping".to_string()),
        FieldKind::Choice(choices) => check_choice(value, choices).map(FieldValue::String),
        FieldKind::OpenApiVersion => check_openapi_version(value).map(FieldValue::String),
    };

    match scalar {
        Ok(converted) => Some(converted),
        Err(message) => {
            errors.push(FieldError::new(path, message));
            None
        }
    }
}

fn convert_list(
    value: &Value,
    item_kind: ObjectKind,
    path: &str,
    errors: &mut Vec<FieldError>,
) -> Option<FieldValue> {
    let Some(items) = value.as_array() else {
        errors.push(FieldError::new(path, "not a list"));
        return None;
    };

    let records = items
        .iter()
        .enumerate()
        .map(|(i, item)| validate_object(item, item_kind, &format!("{}[{}]", path, i), errors))
        .collect();
    Some(FieldValue::List(records))
}

fn convert_paths(value: &Value, path: &str, errors: &mut Vec<FieldError>) -> Option<FieldValue> {
    let Some(entries) = value.as_object() else {
        errors.push(FieldError::new(path, "not a mapping"));
        return None;
    };

    let mut items = BTreeMap::new();
    for (template, item) in entries {
        let item_path = qualify(path, template);
        if template.starts_with("x-") {
            continue;
        }
        if !template.starts_with('/') {
            errors.push(FieldError::new(
                item_path,
                "path template must begin with '/'",
            ));
            continue;
        }
        let record = validate_object(item, ObjectKind::PathItem, &item_path, errors);
        items.insert(template.clone(), record);
    }
    Some(FieldValue::Map(items))
}

fn convert_dict_of_dicts(
    value: &Value,
    path: &str,
    errors: &mut Vec<FieldError>,
) -> Option<FieldValue> {
    let Some(entries) = value.as_object() else {
        errors.push(FieldError::new(path, "not a mapping"));
        return None;
    };

    let before = errors.len();
    for (key, entry) in entries {
        if !entry.is_object() {
            errors.push(FieldError::new(qualify(path, key), "not a mapping"));
        }
    }
    (errors.len() == before).then(|| FieldValue::Dict(entries.clone()))
}

fn convert_string_list(
    value: &Value,
    path: &str,
    errors: &mut Vec<FieldError>,
) -> Option<FieldValue> {
    let Some(items) = value.as_array() else {
        errors.push(FieldError::new(path, "not a list"));
        return None;
    };

    let mut strings = Vec::with_capacity(items.len());
    let before = errors.len();
    for (i, item) in items.iter().enumerate() {
        match as_string(item) {
            Some(s) => strings.push(s),
            None => errors.push(FieldError::new(
                format!("{}[{}]", path, i),
                "not a valid string",
            )),
        }
    }
    (errors.len() == before).then_some(FieldValue::Strings(strings))
}

fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn check_url(value: &Value) -> Result<String, String> {
    let text = value.as_str().ok_or("not a valid URL")?;
    let url: reqwest::Url = text.parse().map_err(|_| "not a valid URL")?;
    if !URL_SCHEMES.contains(&url.scheme()) {
        return Err(format!("unsupported URL scheme '{}'", url.scheme()));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err("URL must include a host".to_string());
    }
    Ok(text.to_string())
}

fn email_patterns() -> &'static (regex_lite::Regex, regex_lite::Regex) {
    static PATTERNS: OnceLock<(regex_lite::Regex, regex_lite::Regex)> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let user = regex_lite::Regex::new(
            r"^[-!#$%&'*+/=?^_`{}|~0-9A-Za-z]+(\.[-!#$%&'*+/=?^_`{}|~0-9A-Za-z]+)*$",
        )
        .expect("email user pattern is valid");
        let domain = regex_lite::Regex::new(
            r"^(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z0-9-]{2,63}$",
        )
        .expect("email domain pattern is valid");
        (user, domain)
    })
}

fn check_email(value: &Value) -> Result<String, String> {
    const INVALID: &str = "not a valid email address";

    let text = value.as_str().ok_or(INVALID)?;
    let (user, domain) = text.rsplit_once('@').ok_or(INVALID)?;
    let (user_pattern, domain_pattern) = email_patterns();

    if !user_pattern.is_match(user) {
        return Err(INVALID.to_string());
    }
    if domain != "localhost" && !domain_pattern.is_match(domain) {
        return Err(INVALID.to_string());
    }
    Ok(text.to_string())
}

fn check_choice(value: &Value, choices: &[&str]) -> Result<String, String> {
    match value.as_str() {
        Some(s) if choices.contains(&s) => Ok(s.to_string()),
        _ => Err(format!("must be one of: {}", choices.join(", "))),
    }
}

fn check_openapi_version(value: &Value) -> Result<String, String> {
    let text = value.as_str().ok_or("not a valid string")?;
    match semver::Version::parse(text) {
        Ok(version) if version.major == 3 && version.build.is_empty() => Ok(text.to_string()),
        Ok(_) => Err(format!(
            "unsupported OpenAPI version: {} (only 3.x supported)",
            text
        )),
        Err(_) => Err(format!(
            "invalid OpenAPI version: {} (expected 3.<minor>.<patch>)",
            text
        )),
    }
}
