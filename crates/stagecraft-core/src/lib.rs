use serde::{Deserialize, Serialize};
use serde_json::Value;

// Shared building blocks for all Stagecraft crates
pub mod action_type;
pub mod config;
pub mod model;

pub use action_type::{ActionCategory, ActionOwner, ActionTypeId, ActionTypeRegistry};
pub use config::{ConfigError, MacroConfig, PipelineOptions, NAMESPACE_ENV};
pub use model::{ArtifactRef, OutputAction, OutputStage, ResourceMap, StageSpec};

/// Invocation sent by the macro host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacroRequest {
    /// Opaque identifier echoed back in the response.
    pub request_id: String,
    /// Template fragment to process. Only `Resources` is inspected.
    pub fragment: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform_id: Option<String>,
    /// Parameters given to the transform in the template.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub params: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub template_parameter_values: Value,
}

impl MacroRequest {
    /// Create a request carrying only an id and a fragment.
    pub fn new(request_id: impl Into<String>, fragment: Value) -> Self {
        Self {
            request_id: request_id.into(),
            fragment,
            region: None,
            account_id: None,
            transform_id: None,
            params: Value::Null,
            template_parameter_values: Value::Null,
        }
    }
}

/// Outcome reported to the macro host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MacroStatus {
    Success,
    Failure,
}

/// Response returned to the macro host (matches `schemas/MacroResponse.schema.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacroResponse {
    pub request_id: String,
    pub status: MacroStatus,
    /// Transformed fragment on success, the untouched input on failure.
    pub fragment: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl MacroResponse {
    pub fn success(request_id: impl Into<String>, fragment: Value) -> Self {
        Self {
            request_id: request_id.into(),
            status: MacroStatus::Success,
            fragment,
            error_message: None,
        }
    }

    pub fn failure(
        request_id: impl Into<String>,
        fragment: Value,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            status: MacroStatus::Failure,
            fragment,
            error_message: Some(error_message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == MacroStatus::Success
    }
}
