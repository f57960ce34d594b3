//! Schema evaluation.
//!
//! Schemas are draft 2020-12 JSON Schema documents compiled with `jsonschema`.
//! Validation never stops at the first violation: every error the validator
//! reports is converted into a path-qualified [`ValidationError`].

use crate::error::{SchemaError, ValidationError, ValidationErrorKind};
use crate::path::FieldPath;
use jsonschema::error::ValidationErrorKind as Keyword;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;

/// Upper bound on `$ref` hops followed while searching for enumerations.
const MAX_REF_HOPS: usize = 32;

/// A compiled schema together with the document it was compiled from.
pub struct Schema {
    document: Value,
    validator: jsonschema::Validator,
}

impl Schema {
    /// Compile a JSON Schema document.
    pub fn new(document: Value) -> Result<Self, SchemaError> {
        let validator = jsonschema::draft202012::options()
            .build(&document)
            .map_err(|e| SchemaError::Invalid(e.to_string()))?;
        Ok(Self {
            document,
            validator,
        })
    }

    /// Parse and compile a JSON Schema written in YAML.
    pub fn from_yaml(content: &str) -> Result<Self, SchemaError> {
        let document: Value = serde_yaml::from_str(content)?;
        Self::new(document)
    }

    /// The schema document itself.
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Validate a document and return every violation found.
    ///
    /// An empty result means the document is valid.
    pub fn validate(&self, document: &Value) -> Vec<ValidationError> {
        let errors: Vec<ValidationError> = self
            .validator
            .iter_errors(document)
            .flat_map(|error| convert(&error, document))
            .collect();
        tracing::trace!(error_count = errors.len(), "document validated");
        errors
    }

    /// Values enumerated (`enum` or `const`) for the field at `path`.
    ///
    /// Path segments name object properties; `*` steps into `items` or
    /// `additionalProperties`. Candidates under `allOf`/`anyOf`/`oneOf` and
    /// the `then`/`else` branches are searched too, so the result is the
    /// union over all of them.
    pub fn allowed_at(&self, path: &[&str]) -> BTreeSet<String> {
        let mut found = BTreeSet::new();
        self.collect_allowed(&self.document, path, 0, &mut found);
        found
    }

    fn collect_allowed(&self, node: &Value, path: &[&str], hops: usize, found: &mut BTreeSet<String>) {
        // Boolean schemas enumerate nothing.
        let Some(node) = node.as_object() else {
            return;
        };

        if let Some(target) = node.get("$ref").and_then(Value::as_str) {
            let resolved = target
                .strip_prefix('#')
                .and_then(|pointer| self.document.pointer(pointer));
            if let (Some(resolved), true) = (resolved, hops < MAX_REF_HOPS) {
                self.collect_allowed(resolved, path, hops + 1, found);
            }
        }
        for keyword in ["allOf", "anyOf", "oneOf"] {
            if let Some(candidates) = node.get(keyword).and_then(Value::as_array) {
                for candidate in candidates {
                    self.collect_allowed(candidate, path, hops, found);
                }
            }
        }
        for keyword in ["then", "else"] {
            if let Some(branch) = node.get(keyword) {
                self.collect_allowed(branch, path, hops, found);
            }
        }

        let Some((head, rest)) = path.split_first() else {
            if let Some(values) = node.get("enum").and_then(Value::as_array) {
                found.extend(values.iter().filter_map(Value::as_str).map(str::to_string));
            }
            if let Some(value) = node.get("const").and_then(Value::as_str) {
                found.insert(value.to_string());
            }
            return;
        };

        if *head == "*" {
            for keyword in ["items", "additionalProperties"] {
                if let Some(child) = node.get(keyword) {
                    self.collect_allowed(child, rest, hops, found);
                }
            }
        } else if let Some(child) = node.get("properties").and_then(|p| p.get(*head)) {
            self.collect_allowed(child, rest, hops, found);
        }
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("document", &self.document)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.document == other.document
    }
}

/// Convert one `jsonschema` error into path-qualified errors.
///
/// Missing and unexpected keys are reported at the key itself rather than
/// at the object that holds it.
fn convert(error: &jsonschema::ValidationError<'_>, document: &Value) -> Vec<ValidationError> {
    let path = FieldPath::from_pointer(&error.instance_path().to_string(), document);
    match error.kind() {
        Keyword::Required { property } => {
            let path = match property.as_str() {
                Some(name) => path.key(name),
                None => path,
            };
            vec![ValidationError::new(
                ValidationErrorKind::RequiredFieldMissing,
                path,
                "required field is missing",
            )]
        }
        Keyword::AdditionalProperties { unexpected } => unexpected
            .iter()
            .map(|name| {
                ValidationError::new(
                    ValidationErrorKind::UnknownField,
                    path.key(name.clone()),
                    "unknown field",
                )
            })
            .collect(),
        kind => vec![ValidationError::new(classify(kind), path, error.to_string())],
    }
}

fn classify(kind: &Keyword) -> ValidationErrorKind {
    match kind {
        Keyword::Required { .. } => ValidationErrorKind::RequiredFieldMissing,
        Keyword::AdditionalProperties { .. }
        | Keyword::UnevaluatedProperties { .. }
        | Keyword::FalseSchema { .. } => ValidationErrorKind::UnknownField,
        Keyword::Type { .. } => ValidationErrorKind::TypeMismatch,
        Keyword::Enum { .. } | Keyword::Constant { .. } => ValidationErrorKind::ValueNotAllowed,
        Keyword::MinItems { .. } | Keyword::MinProperties { .. } | Keyword::MinLength { .. } => {
            ValidationErrorKind::MinLength
        }
        Keyword::MaxItems { .. } | Keyword::MaxProperties { .. } | Keyword::MaxLength { .. } => {
            ValidationErrorKind::MaxLength
        }
        Keyword::AnyOf { .. } | Keyword::OneOfNotValid { .. } => {
            ValidationErrorKind::NoAlternativeMatched
        }
        Keyword::OneOfMultipleValid { .. } => ValidationErrorKind::MultipleAlternativesMatched,
        _ => ValidationErrorKind::Constraint,
    }
}
