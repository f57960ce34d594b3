use crate::error::MacroError;
use crate::transform::ResourceTransformer;
use serde_json::{Map, Value};
use stagecraft_core::model::{PROPERTIES_KEY, STAGES_KEY};
use stagecraft_core::{
    ActionCategory, ActionTypeRegistry, ArtifactRef, OutputAction, OutputStage, PipelineOptions,
    ResourceMap, StageSpec,
};
use std::sync::Arc;

const USER_PARAMETERS_KEY: &str = "UserParameters";
const LAMBDA_PROVIDER: &str = "Lambda";

/// Expands compact stage declarations into the engine's stage/action shape.
///
/// `{Source: {Type: CodeCommit, Configuration: {...}}}` becomes
/// `{Name: Source, Actions: [{Name: Source, ActionTypeId: {...}, Configuration: {...}}]}`.
/// The output no longer matches the compact schema, so the transform is one-way.
pub struct PipelineTransformer {
    resource_type: String,
    registry: Arc<ActionTypeRegistry>,
    options: PipelineOptions,
}

impl PipelineTransformer {
    pub fn new(
        resource_type: impl Into<String>,
        registry: Arc<ActionTypeRegistry>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            registry,
            options,
        }
    }

    fn build_stage(&self, resource: &str, stage_name: &str, spec: StageSpec) -> Result<OutputStage, MacroError> {
        let action_type_id = self.registry.get(&spec.stage_type).cloned().ok_or_else(|| {
            MacroError::RegistryConsistency(format!(
                "stage type '{}' of resource '{}' has no action-type registry entry",
                spec.stage_type, resource
            ))
        })?;

        let mut configuration = spec.configuration;
        if self.options.encode_user_parameters && action_type_id.provider == LAMBDA_PROVIDER {
            encode_user_parameters(&mut configuration)?;
        }

        let output_artifacts = (self.options.emit_output_artifacts
            && action_type_id.category == ActionCategory::Source)
            .then(|| {
                vec![ArtifactRef {
                    name: stage_name.to_string(),
                }]
            });

        Ok(OutputStage {
            name: stage_name.to_string(),
            actions: vec![OutputAction {
                name: stage_name.to_string(),
                action_type_id,
                configuration,
                output_artifacts,
            }],
        })
    }
}

impl ResourceTransformer for PipelineTransformer {
    fn resource_type(&self) -> &str {
        &self.resource_type
    }

    fn transform(&self, name: &str, resource: &Value) -> Result<ResourceMap, MacroError> {
        let declarations = resource
            .get(PROPERTIES_KEY)
            .and_then(|properties| properties.get(STAGES_KEY))
            .and_then(Value::as_array)
            .ok_or_else(|| MacroError::malformed(name, "Properties.Stages is not a list"))?;

        let mut stages = Vec::with_capacity(declarations.len());
        for (index, declaration) in declarations.iter().enumerate() {
            let (stage_name, body) = single_entry(declaration).ok_or_else(|| {
                MacroError::malformed(
                    name,
                    format!("stage {} is not a single-key mapping", index),
                )
            })?;
            let spec: StageSpec = serde_json::from_value(body.clone()).map_err(|err| {
                MacroError::malformed(name, format!("stage '{}': {}", stage_name, err))
            })?;
            stages.push(self.build_stage(name, stage_name, spec)?);
        }

        let mut transformed = resource.clone();
        let properties = transformed
            .get_mut(PROPERTIES_KEY)
            .and_then(Value::as_object_mut)
            .ok_or_else(|| MacroError::malformed(name, "Properties is not a mapping"))?;
        properties.insert(STAGES_KEY.to_string(), serde_json::to_value(&stages)?);

        let mut output = ResourceMap::new();
        output.insert(name.to_string(), transformed);
        Ok(output)
    }
}

/// The only `(key, value)` pair of a mapping.
fn single_entry(declaration: &Value) -> Option<(&str, &Value)> {
    let map = declaration.as_object()?;
    if map.len() != 1 {
        return None;
    }
    map.iter().next().map(|(key, value)| (key.as_str(), value))
}

/// Lambda only accepts `UserParameters` as a string.
fn encode_user_parameters(configuration: &mut Map<String, Value>) -> Result<(), MacroError> {
    if let Some(parameters) = configuration.get_mut(USER_PARAMETERS_KEY) {
        if !parameters.is_string() && !parameters.is_null() {
            *parameters = Value::String(serde_json::to_string(parameters)?);
        }
    }
    Ok(())
}
