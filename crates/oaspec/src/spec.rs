//! Entry points for loading and saving whole documents.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::{Map, Value};

use crate::dumper;
use crate::error::SpecError;
use crate::loader;
use crate::model::{Info, PathItem, Server, Spec, SpecObject};
use crate::schema;
use crate::source::{self, FetchOptions, TextFormat};

/// OpenAPI version used when composing a document without an explicit one.
pub const DEFAULT_OPENAPI_VERSION: &str = "3.0.1";

impl Spec {
    /// Validate a raw mapping.
    pub fn from_dict(raw: &Map<String, Value>) -> Result<Self, SpecError> {
        schema::verify()?;
        let spec: Spec = loader::load_map(raw)?;
        tracing::debug!(
            title = spec.info().title(),
            paths = spec.paths().map_or(0, |p| p.len()),
            "spec loaded"
        );
        Ok(spec)
    }

    pub fn from_json(text: &str) -> Result<Self, SpecError> {
        Self::from_dict(&TextFormat::Json.parse(text)?)
    }

    pub fn from_yaml(text: &str) -> Result<Self, SpecError> {
        Self::from_dict(&TextFormat::Yaml.parse(text)?)
    }

    /// Load a file; `.json` files are read as JSON, everything else as YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SpecError> {
        let path = path.as_ref();
        let text = source::read_file(path)?;
        let format = TextFormat::from_path(&path.to_string_lossy());
        Self::from_dict(&format.parse(&text)?)
    }

    /// Fetch and load a document with default [`FetchOptions`].
    pub fn from_url(url: &str) -> Result<Self, SpecError> {
        Self::from_url_with(url, &FetchOptions::default())
    }

    pub fn from_url_with(url: &str, options: &FetchOptions) -> Result<Self, SpecError> {
        let text = source::fetch_url(url, options)?;
        let format = TextFormat::from_path(url);
        Self::from_dict(&format.parse(&text)?)
    }

    pub fn to_dict(&self) -> Map<String, Value> {
        dumper::dump(self)
    }

    pub fn to_json(&self) -> String {
        dumper::to_json(self)
    }

    pub fn to_json_compact(&self) -> String {
        dumper::to_json_compact(self)
    }

    pub fn to_yaml(&self) -> String {
        dumper::to_yaml(self)
    }

    /// Start composing a document from its info block and path items.
    pub fn compose(info: Info) -> SpecComposer {
        SpecComposer::new(info)
    }
}

/// Assembles a [`Spec`] from separately loaded parts.
///
/// The result is validated as a whole by [`SpecComposer::build`].
#[derive(Debug, Clone)]
pub struct SpecComposer {
    openapi: String,
    info: Info,
    servers: Vec<Server>,
    paths: BTreeMap<String, PathItem>,
}

impl SpecComposer {
    pub fn new(info: Info) -> Self {
        Self {
            openapi: DEFAULT_OPENAPI_VERSION.to_string(),
            info,
            servers: Vec::new(),
            paths: BTreeMap::new(),
        }
    }

    pub fn openapi(mut self, version: impl Into<String>) -> Self {
        self.openapi = version.into();
        self
    }

    /// Add a path item. A template added twice keeps the last item.
    pub fn path(mut self, template: impl Into<String>, item: PathItem) -> Self {
        let template = template.into();
        if self.paths.insert(template.clone(), item).is_some() {
            tracing::warn!(template = %template, "path composed twice, replacing");
        }
        self
    }

    pub fn server(mut self, server: Server) -> Self {
        self.servers.push(server);
        self
    }

    pub fn build(self) -> Result<Spec, SpecError> {
        let mut raw = Map::new();
        raw.insert("openapi".to_string(), Value::String(self.openapi));
        raw.insert("info".to_string(), self.info.to_value());
        if !self.servers.is_empty() {
            raw.insert(
                "servers".to_string(),
                Value::Array(self.servers.iter().map(Server::to_value).collect()),
            );
        }
        if !self.paths.is_empty() {
            raw.insert(
                "paths".to_string(),
                Value::Object(
                    self.paths
                        .iter()
                        .map(|(template, item)| (template.clone(), item.to_value()))
                        .collect(),
                ),
            );
        }
        Spec::from_dict(&raw)
    }
}
