//! Typed OpenAPI 3.x objects.
//!
//! Instances are produced only by the loader (directly, through the `from_*`
//! entry points, or through a validating [`Builder`]) and are immutable
//! afterwards. To change one, go through [`SpecObject::to_builder`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::builder::Builder;
use crate::dumper;
use crate::error::{FieldError, SpecError, ValidationErrors};
use crate::fragment::{self, Documented, FragmentTable};
use crate::loader;
use crate::record::{record_map, records, Extensions, FieldValue, Record};
use crate::schema::{ObjectKind, ObjectSchema};

/// An object model type bound to one registry entry.
pub trait SpecObject: Sized {
    const KIND: ObjectKind;

    /// Build the typed object from a record that already passed validation.
    fn from_record(record: Record) -> Result<Self, FieldError>;

    /// Flatten into a record; unset optional fields are left out.
    fn to_record(&self) -> Record;

    fn schema() -> &'static ObjectSchema {
        Self::KIND.schema()
    }

    /// Validate and build from a raw value.
    fn from_value(raw: &Value) -> Result<Self, ValidationErrors> {
        loader::load(raw)
    }

    /// Dump to a raw mapping with wire names.
    fn to_map(&self) -> Map<String, Value> {
        dumper::dump(self)
    }

    fn to_value(&self) -> Value {
        Value::Object(self.to_map())
    }

    /// Load from the fragment attached to `D`.
    fn from_documented<D: Documented>() -> Result<Self, SpecError> {
        let raw = fragment::extract::<D>()?;
        loader::load_map(&raw).map_err(|errors| {
            tracing::warn!(
                artifact = D::NAME,
                object = Self::KIND.name(),
                errors = errors.len(),
                "fragment failed validation"
            );
            SpecError::Validation(errors)
        })
    }

    /// Load from the fragment registered under `artifact`.
    fn from_fragment(table: &FragmentTable, artifact: &str) -> Result<Self, SpecError> {
        let raw = table.extract(artifact)?;
        Ok(loader::load_map(&raw)?)
    }

    fn builder() -> Builder<Self> {
        Builder::new()
    }

    /// Start a builder seeded with this object's fields.
    fn to_builder(&self) -> Builder<Self> {
        Builder::from_object(self)
    }
}

macro_rules! impl_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{:#}", self.to_value())
                }
            }
        )*
    };
}

impl_display!(Contact, License, Info, Server, Parameter, Operation, PathItem, Spec);

/// Contact information for the exposed API.
#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    name: String,
    url: String,
    email: Option<String>,
    extensions: Extensions,
}

impl Contact {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }
}

impl SpecObject for Contact {
    const KIND: ObjectKind = ObjectKind::Contact;

    fn from_record(mut record: Record) -> Result<Self, FieldError> {
        Ok(Self {
            name: record.require_string("name")?,
            url: record.require_string("url")?,
            email: record.string("email"),
            extensions: record.take_extensions(),
        })
    }

    fn to_record(&self) -> Record {
        let mut record = Record::new(Self::KIND);
        record.insert("name", self.name.clone().into());
        record.insert("url", self.url.clone().into());
        record.put("email", self.email.clone().map(FieldValue::from));
        record.set_extensions(self.extensions.clone());
        record
    }
}

/// License information for the exposed API.
#[derive(Debug, Clone, PartialEq)]
pub struct License {
    name: String,
    url: String,
    extensions: Extensions,
}

impl License {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }
}

impl SpecObject for License {
    const KIND: ObjectKind = ObjectKind::License;

    fn from_record(mut record: Record) -> Result<Self, FieldError> {
        Ok(Self {
            name: record.require_string("name")?,
            url: record.require_string("url")?,
            extensions: record.take_extensions(),
        })
    }

    fn to_record(&self) -> Record {
        let mut record = Record::new(Self::KIND);
        record.insert("name", self.name.clone().into());
        record.insert("url", self.url.clone().into());
        record.set_extensions(self.extensions.clone());
        record
    }
}

/// Metadata about the API.
#[derive(Debug, Clone, PartialEq)]
pub struct Info {
    title: String,
    version: String,
    description: Option<String>,
    terms_of_service: Option<String>,
    contact: Option<Contact>,
    license: Option<License>,
    extensions: Extensions,
}

impl Info {
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Version of the described API (not the OpenAPI version).
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn terms_of_service(&self) -> Option<&str> {
        self.terms_of_service.as_deref()
    }

    pub fn contact(&self) -> Option<&Contact> {
        self.contact.as_ref()
    }

    pub fn license(&self) -> Option<&License> {
        self.license.as_ref()
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }
}

impl SpecObject for Info {
    const KIND: ObjectKind = ObjectKind::Info;

    fn from_record(mut record: Record) -> Result<Self, FieldError> {
        Ok(Self {
            title: record.require_string("title")?,
            version: record.require_string("version")?,
            description: record.string("description"),
            terms_of_service: record.string("terms_of_service"),
            contact: record.object("contact")?,
            license: record.object("license")?,
            extensions: record.take_extensions(),
        })
    }

    fn to_record(&self) -> Record {
        let mut record = Record::new(Self::KIND);
        record.insert("title", self.title.clone().into());
        record.insert("version", self.version.clone().into());
        record.put("description", self.description.clone().map(FieldValue::from));
        record.put(
            "terms_of_service",
            self.terms_of_service.clone().map(FieldValue::from),
        );
        record.put(
            "contact",
            self.contact.as_ref().map(|c| FieldValue::Object(c.to_record())),
        );
        record.put(
            "license",
            self.license.as_ref().map(|l| FieldValue::Object(l.to_record())),
        );
        record.set_extensions(self.extensions.clone());
        record
    }
}

/// A server hosting the API.
#[derive(Debug, Clone, PartialEq)]
pub struct Server {
    url: String,
    description: Option<String>,
    variables: Option<Map<String, Value>>,
    extensions: Extensions,
}

impl Server {
    /// Server URL; may be relative and may contain `{variable}` templates.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn variables(&self) -> Option<&Map<String, Value>> {
        self.variables.as_ref()
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }
}

impl SpecObject for Server {
    const KIND: ObjectKind = ObjectKind::Server;

    fn from_record(mut record: Record) -> Result<Self, FieldError> {
        Ok(Self {
            url: record.require_string("url")?,
            description: record.string("description"),
            variables: record.dict("variables"),
            extensions: record.take_extensions(),
        })
    }

    fn to_record(&self) -> Record {
        let mut record = Record::new(Self::KIND);
        record.insert("url", self.url.clone().into());
        record.put("description", self.description.clone().map(FieldValue::from));
        record.put("variables", self.variables.clone().map(FieldValue::from));
        record.set_extensions(self.extensions.clone());
        record
    }
}

/// Where a parameter is carried (`in`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterLocation {
    Query,
    Header,
    Path,
    Cookie,
}

impl ParameterLocation {
    pub fn as_str(self) -> &'static str {
        match self {
            ParameterLocation::Query => "query",
            ParameterLocation::Header => "header",
            ParameterLocation::Path => "path",
            ParameterLocation::Cookie => "cookie",
        }
    }
}

impl FromStr for ParameterLocation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "query" => Ok(ParameterLocation::Query),
            "header" => Ok(ParameterLocation::Header),
            "path" => Ok(ParameterLocation::Path),
            "cookie" => Ok(ParameterLocation::Cookie),
            other => Err(format!("unknown parameter location '{}'", other)),
        }
    }
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single operation parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: String,
    location: ParameterLocation,
    description: Option<String>,
    required: Option<bool>,
    deprecated: Option<bool>,
    allow_empty_value: Option<bool>,
    style: Option<String>,
    explode: Option<bool>,
    allow_reserved: Option<bool>,
    schema: Option<Map<String, Value>>,
    example: Option<Value>,
    examples: Option<Map<String, Value>>,
    extensions: Extensions,
}

impl Parameter {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> ParameterLocation {
        self.location
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The declared `required` flag, if any.
    pub fn required(&self) -> Option<bool> {
        self.required
    }

    /// Effective requiredness: path parameters are always required.
    pub fn is_required(&self) -> bool {
        self.required
            .unwrap_or(self.location == ParameterLocation::Path)
    }

    pub fn deprecated(&self) -> Option<bool> {
        self.deprecated
    }

    pub fn allow_empty_value(&self) -> Option<bool> {
        self.allow_empty_value
    }

    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }

    pub fn explode(&self) -> Option<bool> {
        self.explode
    }

    pub fn allow_reserved(&self) -> Option<bool> {
        self.allow_reserved
    }

    pub fn schema(&self) -> Option<&Map<String, Value>> {
        self.schema.as_ref()
    }

    pub fn example(&self) -> Option<&Value> {
        self.example.as_ref()
    }

    pub fn examples(&self) -> Option<&Map<String, Value>> {
        self.examples.as_ref()
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }
}

impl SpecObject for Parameter {
    const KIND: ObjectKind = ObjectKind::Parameter;

    fn from_record(mut record: Record) -> Result<Self, FieldError> {
        let location = record
            .require_string("location")?
            .parse::<ParameterLocation>()
            .map_err(|e: String| FieldError::new("in", e))?;

        Ok(Self {
            name: record.require_string("name")?,
            location,
            description: record.string("description"),
            required: record.bool("required"),
            deprecated: record.bool("deprecated"),
            allow_empty_value: record.bool("allow_empty_value"),
            style: record.string("style"),
            explode: record.bool("explode"),
            allow_reserved: record.bool("allow_reserved"),
            schema: record.dict("schema"),
            example: record.raw("example"),
            examples: record.dict("examples"),
            extensions: record.take_extensions(),
        })
    }

    fn to_record(&self) -> Record {
        let mut record = Record::new(Self::KIND);
        record.insert("name", self.name.clone().into());
        record.insert("location", self.location.as_str().to_string().into());
        record.put("description", self.description.clone().map(FieldValue::from));
        record.put("required", self.required.map(FieldValue::from));
        record.put("deprecated", self.deprecated.map(FieldValue::from));
        record.put("allow_empty_value", self.allow_empty_value.map(FieldValue::from));
        record.put("style", self.style.clone().map(FieldValue::from));
        record.put("explode", self.explode.map(FieldValue::from));
        record.put("allow_reserved", self.allow_reserved.map(FieldValue::from));
        record.put("schema", self.schema.clone().map(FieldValue::from));
        record.put("example", self.example.clone().map(FieldValue::Raw));
        record.put("examples", self.examples.clone().map(FieldValue::from));
        record.set_extensions(self.extensions.clone());
        record
    }
}

/// A single API operation on a path.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    tags: Option<Vec<String>>,
    summary: Option<String>,
    description: Option<String>,
    operation_id: Option<String>,
    parameters: Option<Vec<Parameter>>,
    request_body: Option<Map<String, Value>>,
    responses: Map<String, Value>,
    deprecated: Option<bool>,
    security: Option<Value>,
    extensions: Extensions,
}

impl Operation {
    pub fn tags(&self) -> &[String] {
        self.tags.as_deref().unwrap_or_default()
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn operation_id(&self) -> Option<&str> {
        self.operation_id.as_deref()
    }

    pub fn parameters(&self) -> &[Parameter] {
        self.parameters.as_deref().unwrap_or_default()
    }

    pub fn request_body(&self) -> Option<&Map<String, Value>> {
        self.request_body.as_ref()
    }

    pub fn responses(&self) -> &Map<String, Value> {
        &self.responses
    }

    pub fn deprecated(&self) -> Option<bool> {
        self.deprecated
    }

    pub fn security(&self) -> Option<&Value> {
        self.security.as_ref()
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }
}

impl SpecObject for Operation {
    const KIND: ObjectKind = ObjectKind::Operation;

    fn from_record(mut record: Record) -> Result<Self, FieldError> {
        Ok(Self {
            tags: record.strings("tags"),
            summary: record.string("summary"),
            description: record.string("description"),
            operation_id: record.string("operation_id"),
            parameters: record.list("parameters")?,
            request_body: record.dict("request_body"),
            responses: record.require_dict("responses")?,
            deprecated: record.bool("deprecated"),
            security: record.raw("security"),
            extensions: record.take_extensions(),
        })
    }

    fn to_record(&self) -> Record {
        let mut record = Record::new(Self::KIND);
        record.put("tags", self.tags.clone().map(FieldValue::from));
        record.put("summary", self.summary.clone().map(FieldValue::from));
        record.put("description", self.description.clone().map(FieldValue::from));
        record.put("operation_id", self.operation_id.clone().map(FieldValue::from));
        record.put("parameters", self.parameters.as_deref().map(records));
        record.put("request_body", self.request_body.clone().map(FieldValue::from));
        record.insert("responses", self.responses.clone().into());
        record.put("deprecated", self.deprecated.map(FieldValue::from));
        record.put("security", self.security.clone().map(FieldValue::Raw));
        record.set_extensions(self.extensions.clone());
        record
    }
}

/// HTTP methods a path item can hold, in reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Method {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl Method {
    pub const ALL: [Method; 8] = [
        Method::Get,
        Method::Put,
        Method::Post,
        Method::Delete,
        Method::Options,
        Method::Head,
        Method::Patch,
        Method::Trace,
    ];

    /// Lowercase name, also the wire key in a path item.
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "get",
            Method::Put => "put",
            Method::Post => "post",
            Method::Delete => "delete",
            Method::Options => "options",
            Method::Head => "head",
            Method::Patch => "patch",
            Method::Trace => "trace",
        }
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Method::ALL
            .into_iter()
            .find(|m| m.as_str() == lower)
            .ok_or_else(|| format!("unknown HTTP method '{}'", s))
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_uppercase())
    }
}

/// The operations available on a single path.
#[derive(Debug, Clone, PartialEq)]
pub struct PathItem {
    summary: Option<String>,
    description: Option<String>,
    operations: BTreeMap<Method, Operation>,
    parameters: Option<Vec<Parameter>>,
    extensions: Extensions,
}

impl PathItem {
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn operation(&self, method: Method) -> Option<&Operation> {
        self.operations.get(&method)
    }

    /// Operations in method order (get, put, post, delete, options, head, patch, trace).
    pub fn operations(&self) -> impl Iterator<Item = (Method, &Operation)> {
        self.operations.iter().map(|(m, op)| (*m, op))
    }

    pub fn methods(&self) -> Vec<Method> {
        self.operations.keys().copied().collect()
    }

    /// Parameters shared by every operation on this path.
    pub fn parameters(&self) -> &[Parameter] {
        self.parameters.as_deref().unwrap_or_default()
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }
}

impl SpecObject for PathItem {
    const KIND: ObjectKind = ObjectKind::PathItem;

    fn from_record(mut record: Record) -> Result<Self, FieldError> {
        let mut operations = BTreeMap::new();
        for method in Method::ALL {
            if let Some(operation) = record.object::<Operation>(method.as_str())? {
                operations.insert(method, operation);
            }
        }

        Ok(Self {
            summary: record.string("summary"),
            description: record.string("description"),
            operations,
            parameters: record.list("parameters")?,
            extensions: record.take_extensions(),
        })
    }

    fn to_record(&self) -> Record {
        let mut record = Record::new(Self::KIND);
        record.put("summary", self.summary.clone().map(FieldValue::from));
        record.put("description", self.description.clone().map(FieldValue::from));
        for (method, operation) in &self.operations {
            record.insert(method.as_str(), FieldValue::Object(operation.to_record()));
        }
        record.put("parameters", self.parameters.as_deref().map(records));
        record.set_extensions(self.extensions.clone());
        record
    }
}

/// The root OpenAPI document.
#[derive(Debug, Clone, PartialEq)]
pub struct Spec {
    openapi: String,
    info: Info,
    servers: Option<Vec<Server>>,
    paths: Option<BTreeMap<String, PathItem>>,
    components: Option<Map<String, Value>>,
    security: Option<Value>,
    tags: Option<Value>,
    external_docs: Option<Map<String, Value>>,
    extensions: Extensions,
}

impl Spec {
    /// The OpenAPI version this document conforms to (e.g. "3.0.1").
    pub fn openapi(&self) -> &str {
        &self.openapi
    }

    pub fn info(&self) -> &Info {
        &self.info
    }

    pub fn servers(&self) -> &[Server] {
        self.servers.as_deref().unwrap_or_default()
    }

    /// Path items keyed by path template.
    pub fn paths(&self) -> Option<&BTreeMap<String, PathItem>> {
        self.paths.as_ref()
    }

    pub fn path(&self, template: &str) -> Option<&PathItem> {
        self.paths.as_ref()?.get(template)
    }

    /// Every operation as `(template, method, operation)`, paths in key order.
    pub fn operations(&self) -> Vec<(&str, Method, &Operation)> {
        self.paths
            .iter()
            .flatten()
            .flat_map(|(template, item)| {
                item.operations()
                    .map(move |(method, op)| (template.as_str(), method, op))
            })
            .collect()
    }

    pub fn components(&self) -> Option<&Map<String, Value>> {
        self.components.as_ref()
    }

    pub fn security(&self) -> Option<&Value> {
        self.security.as_ref()
    }

    pub fn tags(&self) -> Option<&Value> {
        self.tags.as_ref()
    }

    pub fn external_docs(&self) -> Option<&Map<String, Value>> {
        self.external_docs.as_ref()
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }
}

impl SpecObject for Spec {
    const KIND: ObjectKind = ObjectKind::Spec;

    fn from_record(mut record: Record) -> Result<Self, FieldError> {
        Ok(Self {
            openapi: record.require_string("openapi")?,
            info: record.require_object("info")?,
            servers: record.list("servers")?,
            paths: record.map("paths")?,
            components: record.dict("components"),
            security: record.raw("security"),
            tags: record.raw("tags"),
            external_docs: record.dict("external_docs"),
            extensions: record.take_extensions(),
        })
    }

    fn to_record(&self) -> Record {
        let mut record = Record::new(Self::KIND);
        record.insert("openapi", self.openapi.clone().into());
        record.insert("info", FieldValue::Object(self.info.to_record()));
        record.put("servers", self.servers.as_deref().map(records));
        record.put("paths", self.paths.as_ref().map(record_map));
        record.put("components", self.components.clone().map(FieldValue::from));
        record.put("security", self.security.clone().map(FieldValue::Raw));
        record.put("tags", self.tags.clone().map(FieldValue::Raw));
        record.put("external_docs", self.external_docs.clone().map(FieldValue::from));
        record.set_extensions(self.extensions.clone());
        record
    }
}
