//! OpenAPI 3.x object model.
//!
//! Loads OpenAPI documents from raw mappings, JSON, YAML, files, URLs, or
//! YAML fragments attached to code, validates them against a static schema
//! registry, and dumps them back to JSON or YAML. Validation reports every
//! failing field at once, each with its fully qualified wire path.
//!
//! ```
//! use oaspec::Spec;
//!
//! let spec = Spec::from_yaml("
//! openapi: 3.0.1
//! info:
//!   title: Pets
//!   version: '1.0'
//! ").unwrap();
//! assert_eq!(spec.info().title(), "Pets");
//! assert!(spec.to_json().contains("\"openapi\": \"3.0.1\""));
//! ```

pub mod builder;
pub mod document;
pub mod dumper;
pub mod error;
pub mod fragment;
pub mod loader;
pub mod model;
pub mod record;
pub mod schema;
pub mod source;
pub mod spec;

pub use builder::Builder;
pub use document::{Document, DocumentState, Source};
pub use error::{FieldError, SpecError, ValidationErrors};
pub use fragment::{Documented, FragmentTable};
pub use loader::{load, validate};
pub use model::{
    Contact, Info, License, Method, Operation, Parameter, ParameterLocation, PathItem, Server,
    Spec, SpecObject,
};
pub use schema::{FieldKind, FieldSpec, ObjectKind, ObjectSchema};
pub use source::{FetchOptions, TextFormat};
pub use spec::{SpecComposer, DEFAULT_OPENAPI_VERSION};
