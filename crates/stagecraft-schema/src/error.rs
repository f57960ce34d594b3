//! Validation error types.
//!
//! Every error names the location it was found at, so a report can be read
//! without the document at hand.

use crate::path::FieldPath;
use std::fmt;
use thiserror::Error;

/// Errors raised while loading or compiling a schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON Schema: {0}")]
    Invalid(String),
}

/// Error type for schema violations.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// The kind of violation.
    pub kind: ValidationErrorKind,
    /// Where in the document the violation was found.
    pub path: FieldPath,
    /// Human-readable error message.
    pub message: String,
}

impl ValidationError {
    /// Create a new validation error.
    pub fn new(kind: ValidationErrorKind, path: FieldPath, message: impl Into<String>) -> Self {
        Self {
            kind,
            path,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Categories of schema violations, by the JSON Schema keyword that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorKind {
    /// `required` or `dependentRequired`. The path names the missing field.
    RequiredFieldMissing,
    /// A key rejected by `additionalProperties: false`. The path names the key.
    UnknownField,
    /// `type`.
    TypeMismatch,
    /// `enum` or `const`.
    ValueNotAllowed,
    /// `minItems`, `minProperties` or `minLength`.
    MinLength,
    /// `maxItems`, `maxProperties` or `maxLength`.
    MaxLength,
    /// No `oneOf`/`anyOf` candidate validates.
    NoAlternativeMatched,
    /// More than one `oneOf` candidate validates.
    MultipleAlternativesMatched,
    /// Any other keyword (`pattern`, `format`, `minimum`, `not`, ...).
    Constraint,
}

/// All violations found in one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn new(errors: Vec<ValidationError>) -> Self {
        Self(errors)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.0.iter()
    }
}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self(errors)
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .0
            .iter()
            .map(ValidationError::to_string)
            .collect::<Vec<_>>();
        write!(f, "{}", rendered.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}
