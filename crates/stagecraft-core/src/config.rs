//! Configuration for the macro processor.
//!
//! The only required setting is the namespace that prefixes every custom
//! resource type (`<namespace>::Pipeline`). It can come from the
//! `MACRO_NAME` environment variable or from a YAML file:
//!
//! ```yaml
//! namespace: SimplePipeline
//! pipeline:
//!   emit_output_artifacts: true
//!   encode_user_parameters: true
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Environment variable holding the macro namespace.
pub const NAMESPACE_ENV: &str = "MACRO_NAME";

/// Separator between the namespace and the resource kind in a type name.
pub const TYPE_SEPARATOR: &str = "::";

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("environment variable {0} is not set")]
    MissingEnv(String),

    #[error("invalid namespace '{namespace}': {reason}")]
    InvalidNamespace { namespace: String, reason: String },
}

/// Complete macro configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroConfig {
    /// Namespace of the custom resource types handled by this macro.
    pub namespace: String,

    /// Pipeline transformer settings.
    #[serde(default)]
    pub pipeline: PipelineOptions,
}

/// Optional output enrichments for the pipeline transformer.
///
/// Both are off by default; the transformer then passes stage configuration
/// through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineOptions {
    /// Give every `Source` action an output artifact named after its stage.
    #[serde(default)]
    pub emit_output_artifacts: bool,

    /// Encode a structured `UserParameters` value of `Lambda` actions as JSON text.
    #[serde(default)]
    pub encode_user_parameters: bool,
}

impl MacroConfig {
    /// Create a configuration for a namespace with default options.
    pub fn new(namespace: impl Into<String>) -> Result<Self, ConfigError> {
        let config = Self {
            namespace: namespace.into(),
            pipeline: PipelineOptions::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Build a configuration from the `MACRO_NAME` environment variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_var(NAMESPACE_ENV)
    }

    /// Build a configuration from the named environment variable.
    pub fn from_env_var(var: &str) -> Result<Self, ConfigError> {
        let namespace = std::env::var(var).map_err(|_| ConfigError::MissingEnv(var.to_string()))?;
        Self::new(namespace)
    }

    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Replace the pipeline options.
    pub fn with_pipeline_options(mut self, options: PipelineOptions) -> Self {
        self.pipeline = options;
        self
    }

    /// Replace the namespace, keeping the remaining settings.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Result<Self, ConfigError> {
        self.namespace = namespace.into();
        self.validate()?;
        Ok(self)
    }

    /// Check the namespace is usable as a type name prefix.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidNamespace {
            namespace: self.namespace.clone(),
            reason: reason.to_string(),
        };

        if self.namespace.is_empty() {
            return Err(invalid("namespace must not be empty"));
        }
        if self.namespace.chars().any(char::is_whitespace) {
            return Err(invalid("namespace must not contain whitespace"));
        }
        if self.namespace.contains(TYPE_SEPARATOR) {
            return Err(invalid("namespace must not contain '::'"));
        }
        Ok(())
    }

    /// Prefix shared by every resource type of this namespace (`<ns>::`).
    pub fn prefix(&self) -> String {
        format!("{}{}", self.namespace, TYPE_SEPARATOR)
    }

    /// Fully-qualified type name of a resource kind in this namespace.
    pub fn resource_type(&self, kind: &str) -> String {
        format!("{}{}", self.prefix(), kind)
    }

    /// Fully-qualified pipeline resource type (`<ns>::Pipeline`).
    pub fn pipeline_type(&self) -> String {
        self.resource_type("Pipeline")
    }
}
