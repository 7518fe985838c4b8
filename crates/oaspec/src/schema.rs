//! Schema registry: the static catalog of field definitions per object kind.
//!
//! Every object kind has exactly one [`ObjectSchema`], an ordered list of
//! [`FieldSpec`]s. The loader and dumper are driven entirely by this catalog.

use std::collections::HashSet;
use std::sync::OnceLock;

use crate::error::SpecError;

/// Values accepted by `Parameter.in`.
pub const PARAMETER_LOCATIONS: &[&str] = &["query", "header", "path", "cookie"];

/// The object kinds known to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectKind {
    Contact,
    License,
    Info,
    Server,
    Parameter,
    Operation,
    PathItem,
    Spec,
}

impl ObjectKind {
    pub const ALL: [ObjectKind; 8] = [
        ObjectKind::Contact,
        ObjectKind::License,
        ObjectKind::Info,
        ObjectKind::Server,
        ObjectKind::Parameter,
        ObjectKind::Operation,
        ObjectKind::PathItem,
        ObjectKind::Spec,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ObjectKind::Contact => "Contact",
            ObjectKind::License => "License",
            ObjectKind::Info => "Info",
            ObjectKind::Server => "Server",
            ObjectKind::Parameter => "Parameter",
            ObjectKind::Operation => "Operation",
            ObjectKind::PathItem => "PathItem",
            ObjectKind::Spec => "Spec",
        }
    }

    /// The registry entry for this kind.
    pub fn schema(self) -> &'static ObjectSchema {
        match self {
            ObjectKind::Contact => &CONTACT,
            ObjectKind::License => &LICENSE,
            ObjectKind::Info => &INFO,
            ObjectKind::Server => &SERVER,
            ObjectKind::Parameter => &PARAMETER,
            ObjectKind::Operation => &OPERATION,
            ObjectKind::PathItem => &PATH_ITEM,
            ObjectKind::Spec => &SPEC,
        }
    }
}

/// How a field's raw value is validated and converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A string; numbers are cast to their decimal text.
    String,
    /// A boolean; also accepts `true/false`, `yes/no`, `on/off`, `1/0`.
    Bool,
    /// An absolute http(s)/ftp(s) URL with a host.
    Url,
    /// An email address.
    Email,
    /// Any value, passed through untouched.
    Raw,
    /// A mapping with arbitrary values.
    Dict,
    /// A mapping whose values are themselves mappings.
    DictOfDicts,
    /// A list of strings.
    StringList,
    /// A string restricted to a fixed set of values.
    Choice(&'static [&'static str]),
    /// An OpenAPI 3.x version string (`3.<minor>.<patch>`).
    OpenApiVersion,
    /// A single nested object.
    Nested(ObjectKind),
    /// A list of nested objects.
    List(ObjectKind),
    /// The `paths` mapping: path templates to path items.
    Paths,
}

/// One declared field of an object schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    name: &'static str,
    wire_name: Option<&'static str>,
    required: bool,
    kind: FieldKind,
}

impl FieldSpec {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            wire_name: None,
            required: true,
            kind,
        }
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            wire_name: None,
            required: false,
            kind,
        }
    }

    /// Use a different key in the serialized document.
    pub const fn wire(self, wire_name: &'static str) -> Self {
        Self {
            wire_name: Some(wire_name),
            ..self
        }
    }

    /// Internal field name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Key used in JSON/YAML; defaults to the internal name.
    pub fn wire_name(&self) -> &'static str {
        self.wire_name.unwrap_or(self.name)
    }

    pub fn is_aliased(&self) -> bool {
        self.wire_name.is_some()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }
}

/// The ordered field set for one object kind.
#[derive(Debug)]
pub struct ObjectSchema {
    kind: ObjectKind,
    fields: &'static [FieldSpec],
}

impl ObjectSchema {
    pub const fn new(kind: ObjectKind, fields: &'static [FieldSpec]) -> Self {
        Self { kind, fields }
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        self.fields
    }

    /// Look up a field by internal name.
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Look up a field by wire name.
    pub fn field_by_wire(&self, wire_name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.wire_name() == wire_name)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &'static FieldSpec> {
        self.fields.iter().filter(|f| f.required)
    }

    /// Reject duplicate internal or wire names.
    pub fn check(&self) -> Result<(), SpecError> {
        let mut names = HashSet::new();
        let mut wire_names = HashSet::new();

        for field in self.fields {
            if !names.insert(field.name) {
                return Err(SpecError::SchemaDefinition(format!(
                    "{} declares field '{}' more than once",
                    self.kind.name(),
                    field.name
                )));
            }
            if !wire_names.insert(field.wire_name()) {
                return Err(SpecError::SchemaDefinition(format!(
                    "{} maps more than one field to wire name '{}'",
                    self.kind.name(),
                    field.wire_name()
                )));
            }
        }

        Ok(())
    }
}

static VERIFIED: OnceLock<Result<(), String>> = OnceLock::new();

/// Check every schema in the catalog once per process.
///
/// A failure here is a definition bug, never a property of user data.
pub fn verify() -> Result<(), SpecError> {
    VERIFIED
        .get_or_init(|| {
            let catalog: Vec<&ObjectSchema> = ObjectKind::ALL.iter().map(|k| k.schema()).collect();
            check_all(&catalog)
        })
        .clone()
        .map_err(SpecError::SchemaDefinition)
}

/// Whether [`verify`] has already run in this process.
pub fn is_verified() -> bool {
    VERIFIED.get().is_some()
}

/// First definition error among `schemas`, as a bare reason.
fn check_all(schemas: &[&ObjectSchema]) -> Result<(), String> {
    schemas
        .iter()
        .try_for_each(|schema| schema.check())
        .map_err(|e| match e {
            SpecError::SchemaDefinition(reason) => reason,
            other => other.to_string(),
        })
}

pub static CONTACT: ObjectSchema = ObjectSchema::new(
    ObjectKind::Contact,
    &[
        FieldSpec::required("name", FieldKind::String),
        FieldSpec::required("url", FieldKind::Url),
        FieldSpec::optional("email", FieldKind::Email),
    ],
);

pub static LICENSE: ObjectSchema = ObjectSchema::new(
    ObjectKind::License,
    &[
        FieldSpec::required("name", FieldKind::String),
        FieldSpec::required("url", FieldKind::Url),
    ],
);

pub static INFO: ObjectSchema = ObjectSchema::new(
    ObjectKind::Info,
    &[
        FieldSpec::required("title", FieldKind::String),
        FieldSpec::required("version", FieldKind::String),
        FieldSpec::optional("description", FieldKind::String),
        FieldSpec::optional("terms_of_service", FieldKind::String).wire("termsOfService"),
        FieldSpec::optional("contact", FieldKind::Nested(ObjectKind::Contact)),
        FieldSpec::optional("license", FieldKind::Nested(ObjectKind::License)),
    ],
);

pub static SERVER: ObjectSchema = ObjectSchema::new(
    ObjectKind::Server,
    &[
        FieldSpec::required("url", FieldKind::String),
        FieldSpec::optional("description", FieldKind::String),
        FieldSpec::optional("variables", FieldKind::DictOfDicts),
    ],
);

pub static PARAMETER: ObjectSchema = ObjectSchema::new(
    ObjectKind::Parameter,
    &[
        FieldSpec::required("name", FieldKind::String),
        FieldSpec::required("location", FieldKind::Choice(PARAMETER_LOCATIONS)).wire("in"),
        FieldSpec::optional("description", FieldKind::String),
        FieldSpec::optional("required", FieldKind::Bool),
        FieldSpec::optional("deprecated", FieldKind::Bool),
        FieldSpec::optional("allow_empty_value", FieldKind::Bool).wire("allowEmptyValue"),
        FieldSpec::optional("style", FieldKind::String),
        FieldSpec::optional("explode", FieldKind::Bool),
        FieldSpec::optional("allow_reserved", FieldKind::Bool).wire("allowReserved"),
        FieldSpec::optional("schema", FieldKind::Dict),
        FieldSpec::optional("example", FieldKind::Raw),
        FieldSpec::optional("examples", FieldKind::DictOfDicts),
    ],
);

pub static OPERATION: ObjectSchema = ObjectSchema::new(
    ObjectKind::Operation,
    &[
        FieldSpec::optional("tags", FieldKind::StringList),
        FieldSpec::optional("summary", FieldKind::String),
        FieldSpec::optional("description", FieldKind::String),
        FieldSpec::optional("operation_id", FieldKind::String).wire("operationId"),
        FieldSpec::optional("parameters", FieldKind::List(ObjectKind::Parameter)),
        FieldSpec::optional("request_body", FieldKind::Dict).wire("requestBody"),
        FieldSpec::required("responses", FieldKind::Dict),
        FieldSpec::optional("deprecated", FieldKind::Bool),
        FieldSpec::optional("security", FieldKind::Raw),
    ],
);

// Method fields are declared in the order operations are reported.
pub static PATH_ITEM: ObjectSchema = ObjectSchema::new(
    ObjectKind::PathItem,
    &[
        FieldSpec::optional("summary", FieldKind::String),
        FieldSpec::optional("description", FieldKind::String),
        FieldSpec::optional("get", FieldKind::Nested(ObjectKind::Operation)),
        FieldSpec::optional("put", FieldKind::Nested(ObjectKind::Operation)),
        FieldSpec::optional("post", FieldKind::Nested(ObjectKind::Operation)),
        FieldSpec::optional("delete", FieldKind::Nested(ObjectKind::Operation)),
        FieldSpec::optional("options", FieldKind::Nested(ObjectKind::Operation)),
        FieldSpec::optional("head", FieldKind::Nested(ObjectKind::Operation)),
        FieldSpec::optional("patch", FieldKind::Nested(ObjectKind::Operation)),
        FieldSpec::optional("trace", FieldKind::Nested(ObjectKind::Operation)),
        FieldSpec::optional("parameters", FieldKind::List(ObjectKind::Parameter)),
    ],
);

pub static SPEC: ObjectSchema = ObjectSchema::new(
    ObjectKind::Spec,
    &[
        FieldSpec::required("openapi", FieldKind::OpenApiVersion),
        FieldSpec::required("info", FieldKind::Nested(ObjectKind::Info)),
        FieldSpec::optional("servers", FieldKind::List(ObjectKind::Server)),
        FieldSpec::optional("paths", FieldKind::Paths),
        FieldSpec::optional("components", FieldKind::Dict),
        FieldSpec::optional("security", FieldKind::Raw),
        FieldSpec::optional("tags", FieldKind::Raw),
        FieldSpec::optional("external_docs", FieldKind::Dict).wire("externalDocs"),
    ],
);
