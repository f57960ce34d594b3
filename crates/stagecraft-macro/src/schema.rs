//! Schema of the resources this macro accepts.
//!
//! A pipeline resource looks like:
//!
//! ```yaml
//! MyPipeline:
//!   Type: <namespace>::Pipeline
//!   Properties:
//!     Stages:
//!       - Source:
//!           Type: CodeCommit
//!           Configuration: {RepositoryName: app}
//!       - Build:
//!           Type: Lambda
//!           Configuration: {FunctionName: build}
//! ```
//!
//! Resource bodies and `Properties` may carry other keys; stage
//! declarations may not.

use serde_json::json;
use stagecraft_core::model::{PROPERTIES_KEY, RESOURCES_KEY, STAGES_KEY, TYPE_KEY};
use stagecraft_schema::{Schema, SchemaError};

/// Where resource `Type` values are enumerated in the macro schema.
pub const RESOURCE_TYPE_PATH: [&str; 3] = [RESOURCES_KEY, "*", TYPE_KEY];

/// Where stage `Type` values are enumerated in the macro schema.
pub const STAGE_TYPE_PATH: [&str; 7] = [
    RESOURCES_KEY,
    "*",
    PROPERTIES_KEY,
    STAGES_KEY,
    "*",
    "*",
    TYPE_KEY,
];

/// Build the schema for a pipeline resource type and its stage types.
pub fn macro_schema<'a>(
    pipeline_type: &str,
    stage_types: impl IntoIterator<Item = &'a str>,
) -> Result<Schema, SchemaError> {
    let stage_types: Vec<&str> = stage_types.into_iter().collect();

    let stage_spec = json!({
        "type": "object",
        "required": ["Type", "Configuration"],
        "additionalProperties": false,
        "properties": {
            "Type": {"type": "string", "enum": stage_types},
            "Configuration": {"type": "object"}
        }
    });

    // Each declaration is a single-key map: {<stage name>: <stage spec>}.
    let stages = json!({
        "type": "array",
        "minItems": 1,
        "items": {
            "type": "object",
            "minProperties": 1,
            "maxProperties": 1,
            "additionalProperties": stage_spec
        }
    });

    let resource = json!({
        "type": "object",
        "required": ["Type"],
        "properties": {
            "Type": {"type": "string", "enum": [pipeline_type]}
        },
        "if": {
            "properties": {"Type": {"const": pipeline_type}},
            "required": ["Type"]
        },
        "then": {
            "required": ["Properties"],
            "properties": {
                "Properties": {
                    "type": "object",
                    "required": ["Stages"],
                    "properties": {"Stages": stages}
                }
            }
        }
    });

    Schema::new(json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "properties": {
            "Resources": {"type": "object", "additionalProperties": resource}
        }
    }))
}
