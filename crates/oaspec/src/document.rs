//! A document bound to a source, with an explicit load lifecycle.
//!
//! ```text
//! Unloaded --load()--> Loading --+--> Valid
//!                                +--> Invalid
//! ```
//!
//! Source and parse failures return to `Unloaded`. Every `load()` starts
//! from scratch.

use std::fmt;
use std::path::PathBuf;

use serde_json::{Map, Value};

use crate::error::{SpecError, ValidationErrors};
use crate::model::Spec;
use crate::source::{self, FetchOptions, TextFormat};

/// Where a document's content comes from.
#[derive(Debug, Clone)]
pub enum Source {
    Dict(Map<String, Value>),
    Json(String),
    Yaml(String),
    File(PathBuf),
    Url { url: String, options: FetchOptions },
}

impl Source {
    /// A file path or an HTTP(S) URL, as given on a command line.
    pub fn locate(location: &str) -> Self {
        if source::is_url(location) {
            Source::Url {
                url: location.to_string(),
                options: FetchOptions::default(),
            }
        } else {
            Source::File(PathBuf::from(location))
        }
    }

    /// Replace fetch options; no effect on non-URL sources.
    pub fn with_fetch_options(self, options: FetchOptions) -> Self {
        match self {
            Source::Url { url, .. } => Source::Url { url, options },
            other => other,
        }
    }

    /// Short human-readable description for logs and reports.
    pub fn description(&self) -> String {
        match self {
            Source::Dict(_) => "<dict>".to_string(),
            Source::Json(_) => "<json>".to_string(),
            Source::Yaml(_) => "<yaml>".to_string(),
            Source::File(path) => path.display().to_string(),
            Source::Url { url, .. } => url.clone(),
        }
    }

    /// Read and parse into a raw mapping.
    pub fn read(&self) -> Result<Map<String, Value>, SpecError> {
        match self {
            Source::Dict(raw) => Ok(raw.clone()),
            Source::Json(text) => TextFormat::Json.parse(text),
            Source::Yaml(text) => TextFormat::Yaml.parse(text),
            Source::File(path) => {
                let text = source::read_file(path)?;
                TextFormat::from_path(&path.to_string_lossy()).parse(&text)
            }
            Source::Url { url, options } => {
                let text = source::fetch_url(url, options)?;
                TextFormat::from_path(url).parse(&text)
            }
        }
    }
}

/// Lifecycle state of a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    Unloaded,
    Loading,
    Valid,
    Invalid,
}

impl fmt::Display for DocumentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentState::Unloaded => "unloaded",
            DocumentState::Loading => "loading",
            DocumentState::Valid => "valid",
            DocumentState::Invalid => "invalid",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
enum Outcome {
    Unloaded,
    Loading,
    Valid(Spec),
    Invalid(ValidationErrors),
}

/// A document and the result of its most recent load.
#[derive(Debug)]
pub struct Document {
    source: Source,
    outcome: Outcome,
}

impl Document {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            outcome: Outcome::Unloaded,
        }
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn state(&self) -> DocumentState {
        match self.outcome {
            Outcome::Unloaded => DocumentState::Unloaded,
            Outcome::Loading => DocumentState::Loading,
            Outcome::Valid(_) => DocumentState::Valid,
            Outcome::Invalid(_) => DocumentState::Invalid,
        }
    }

    /// Read, parse, and validate the source.
    ///
    /// Returns the resulting state. Validation failures are not errors here;
    /// they move the document to `Invalid` and are available from
    /// [`Document::errors`].
    pub fn load(&mut self) -> Result<DocumentState, SpecError> {
        self.outcome = Outcome::Loading;

        let raw = match self.source.read() {
            Ok(raw) => raw,
            Err(e) => {
                self.outcome = Outcome::Unloaded;
                return Err(e);
            }
        };

        self.outcome = match Spec::from_dict(&raw) {
            Ok(spec) => Outcome::Valid(spec),
            Err(SpecError::Validation(errors)) => Outcome::Invalid(errors),
            Err(e) => {
                self.outcome = Outcome::Unloaded;
                return Err(e);
            }
        };

        tracing::debug!(source = %self.source.description(), state = %self.state(), "document loaded");
        Ok(self.state())
    }

    /// The loaded spec; `None` unless the state is `Valid`.
    pub fn spec(&self) -> Option<&Spec> {
        match &self.outcome {
            Outcome::Valid(spec) => Some(spec),
            _ => None,
        }
    }

    pub fn into_spec(self) -> Option<Spec> {
        match self.outcome {
            Outcome::Valid(spec) => Some(spec),
            _ => None,
        }
    }

    /// Field errors from the last load; `None` unless the state is `Invalid`.
    pub fn errors(&self) -> Option<&ValidationErrors> {
        match &self.outcome {
            Outcome::Invalid(errors) => Some(errors),
            _ => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self.outcome, Outcome::Valid(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const VALID: &str = "openapi: 3.0.1\ninfo:\n  title: T\n  version: '1'\n";

    #[test]
    fn starts_unloaded() {
        let doc = Document::new(Source::Yaml(VALID.to_string()));
        assert_eq!(doc.state(), DocumentState::Unloaded);
        assert!(doc.spec().is_none());
        assert!(doc.errors().is_none());
    }

    #[test]
    fn valid_source_becomes_valid() {
        let mut doc = Document::new(Source::Yaml(VALID.to_string()));
        assert_eq!(doc.load().unwrap(), DocumentState::Valid);
        assert!(doc.is_valid());
        assert_eq!(doc.spec().unwrap().info().title(), "T");
        assert!(doc.errors().is_none());
    }

    #[test]
    fn invalid_source_exposes_errors() {
        let raw = json!({"openapi": "3.0.1", "info": {"title": "T"}});
        let Value::Object(raw) = raw else { unreachable!() };
        let mut doc = Document::new(Source::Dict(raw));
        assert_eq!(doc.load().unwrap(), DocumentState::Invalid);
        assert!(doc.spec().is_none());
        assert_eq!(doc.errors().unwrap().fields(), vec!["info.version"]);
    }

    #[test]
    fn parse_failure_leaves_document_unloaded() {
        let mut doc = Document::new(Source::Json("{oops".to_string()));
        let err = doc.load().unwrap_err();
        assert_eq!(err.code(), "E1002");
        assert_eq!(doc.state(), DocumentState::Unloaded);
    }

    #[test]
    fn reload_starts_from_scratch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("api.yaml");
        std::fs::write(&path, "openapi: 3.0.1\ninfo: {}\n").unwrap();

        let mut doc = Document::new(Source::File(path.clone()));
        assert_eq!(doc.load().unwrap(), DocumentState::Invalid);

        std::fs::write(&path, VALID).unwrap();
        assert_eq!(doc.load().unwrap(), DocumentState::Valid);

        std::fs::remove_file(&path).unwrap();
        assert!(doc.load().is_err());
        assert_eq!(doc.state(), DocumentState::Unloaded);
        assert!(doc.spec().is_none());
    }

    #[test]
    fn locate_distinguishes_urls_and_paths() {
        assert!(matches!(Source::locate("https://example.com/api.json"), Source::Url { .. }));
        assert!(matches!(Source::locate("api.json"), Source::File(_)));
        assert_eq!(Source::locate("specs/api.yaml").description(), "specs/api.yaml");
    }
}
