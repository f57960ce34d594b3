//! Error types for the macro crate.

use stagecraft_core::ConfigError;
use stagecraft_schema::{SchemaError, ValidationErrors};
use thiserror::Error;

/// Errors that can occur while processing a template fragment.
#[derive(Debug, Error)]
pub enum MacroError {
    /// The managed resources do not match the schema. Reported to the host
    /// as a `failure` response.
    #[error("template validation failed: {0}")]
    Validation(ValidationErrors),

    /// The schema, the action-type registry and the transformer registry
    /// disagree about the supported types. A defect in the macro itself.
    #[error("registry consistency fault: {0}")]
    RegistryConsistency(String),

    /// A resource passed validation but could not be read by its transformer.
    #[error("resource '{name}' is malformed: {reason}")]
    MalformedResource { name: String, reason: String },

    /// The generated schema failed to compile.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl MacroError {
    pub(crate) fn malformed(name: &str, reason: impl Into<String>) -> Self {
        Self::MalformedResource {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    /// True for errors caused by the submitted template rather than by the
    /// macro's own setup.
    pub fn is_user_error(&self) -> bool {
        matches!(self, MacroError::Validation(_))
    }
}
