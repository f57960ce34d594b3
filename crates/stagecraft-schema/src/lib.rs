//! # stagecraft-schema
//!
//! Validation of JSON-like documents against draft 2020-12 JSON Schema.
//!
//! A [`Schema`] wraps a compiled `jsonschema` validator. Validation collects
//! every violation as a [`ValidationError`] tagged with the [`FieldPath`] it
//! was found at and a [`ValidationErrorKind`] derived from the failing keyword.
//! Schemas can be built in code or written in YAML.
//!
//! ```rust
//! use serde_json::json;
//! use stagecraft_schema::{Schema, ValidationErrorKind};
//!
//! let schema = Schema::new(json!({
//!     "type": "object",
//!     "properties": {"Stages": {"type": "array", "minItems": 1}},
//!     "required": ["Stages"]
//! }))
//! .unwrap();
//!
//! let errors = schema.validate(&json!({"Stages": []}));
//! assert_eq!(errors[0].kind, ValidationErrorKind::MinLength);
//! assert_eq!(errors[0].path.to_string(), "Stages");
//! ```

pub mod error;
pub mod path;
pub mod validator;

pub use error::{SchemaError, ValidationError, ValidationErrorKind, ValidationErrors};
pub use path::FieldPath;
pub use validator::Schema;
