use std::fmt;

use thiserror::Error;

use crate::source::TextFormat;

/// Errors produced while reading, validating, or converting specs (E1001–E1005).
#[derive(Debug, Error)]
pub enum SpecError {
    /// E1001: An attached fragment is missing, blank, or not a YAML mapping.
    #[error("E1001: malformed documentation for '{artifact}': {reason}")]
    MalformedDocumentation { artifact: String, reason: String },

    /// E1002: Document text is not valid JSON/YAML or its root is not a mapping.
    #[error("E1002: {format} parse error: {reason}")]
    Parse { format: TextFormat, reason: String },

    /// E1003: One or more fields failed validation.
    #[error("E1003: {0}")]
    Validation(#[from] ValidationErrors),

    /// E1004: A file or URL could not be read.
    #[error("E1004: source unavailable: {location}: {reason}")]
    SourceUnavailable { location: String, reason: String },

    /// E1005: The schema catalog itself is inconsistent.
    #[error("E1005: schema definition error: {0}")]
    SchemaDefinition(String),
}

impl SpecError {
    /// The field errors carried by a validation failure, if any.
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            SpecError::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    /// Stable error code (`E1001`..`E1005`).
    pub fn code(&self) -> &'static str {
        match self {
            SpecError::MalformedDocumentation { .. } => "E1001",
            SpecError::Parse { .. } => "E1002",
            SpecError::Validation(_) => "E1003",
            SpecError::SourceUnavailable { .. } => "E1004",
            SpecError::SchemaDefinition(_) => "E1005",
        }
    }
}

/// A single field-level validation failure.
///
/// `field` is the fully qualified wire path, e.g. `info.contact.email`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// A non-empty, ordered list of field errors collected in one validation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// Wrap collected errors; `None` when nothing was collected.
    pub fn from_vec(errors: Vec<FieldError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self(errors))
        }
    }

    pub fn single(error: FieldError) -> Self {
        Self(vec![error])
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for clippy's `len_without_is_empty`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.0.iter()
    }

    /// Qualified paths of every failing field, in report order.
    pub fn fields(&self) -> Vec<&str> {
        self.0.iter().map(|e| e.field.as_str()).collect()
    }

    /// Whether any error was reported for the given qualified path.
    pub fn contains_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    pub fn into_vec(self) -> Vec<FieldError> {
        self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.len() == 1 {
            return write!(f, "validation failed: {}", self.0[0]);
        }
        write!(f, "{} validation errors: ", self.0.len())?;
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
