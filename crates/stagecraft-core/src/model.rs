//! Template data model.
//!
//! Templates are kept as `serde_json::Value` so that resources this macro does
//! not own pass through exactly as they came in. Only the pipeline stage
//! shapes are typed.

use crate::action_type::ActionTypeId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Ordered mapping from logical resource name to resource body.
pub type ResourceMap = Map<String, Value>;

/// Top-level key of the resource section of a template.
pub const RESOURCES_KEY: &str = "Resources";
/// Key holding a resource's declared type.
pub const TYPE_KEY: &str = "Type";
/// Key holding a resource's properties.
pub const PROPERTIES_KEY: &str = "Properties";
/// Key holding the stage list of a pipeline resource.
pub const STAGES_KEY: &str = "Stages";

/// The resource section of a template, if present and a mapping.
pub fn resources(fragment: &Value) -> Option<&ResourceMap> {
    fragment.get(RESOURCES_KEY).and_then(Value::as_object)
}

/// The declared `Type` of a resource, if it is a string.
pub fn resource_type(resource: &Value) -> Option<&str> {
    resource.get(TYPE_KEY).and_then(Value::as_str)
}

/// Body of a compact stage declaration (`{<name>: {Type, Configuration}}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StageSpec {
    /// Stage type; a key of the action-type registry.
    #[serde(rename = "Type")]
    pub stage_type: String,

    /// Action configuration, passed through to the output action.
    pub configuration: Map<String, Value>,
}

/// A stage in the engine's native pipeline shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OutputStage {
    pub name: String,
    pub actions: Vec<OutputAction>,
}

/// A single action of a native stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OutputAction {
    pub name: String,
    pub action_type_id: ActionTypeId,
    pub configuration: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_artifacts: Option<Vec<ArtifactRef>>,
}

/// Named artifact reference produced by an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ArtifactRef {
    pub name: String,
}
