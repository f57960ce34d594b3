//! The macro entry point.
//!
//! [`MacroProcessor`] bundles the configuration, the schema and both
//! registries. It is built once, checked for consistency at construction, and
//! shared read-only by every invocation.

use crate::consistency::{ensure_resource_types_match, ensure_stage_types_match};
use crate::error::MacroError;
use crate::filter::filter_resources;
use crate::schema::macro_schema;
use crate::transform::{PipelineTransformer, TransformerRegistry};
use serde_json::{Map, Value};
use stagecraft_core::model::{RESOURCES_KEY, resources};
use stagecraft_core::{ActionTypeRegistry, MacroConfig, MacroRequest, MacroResponse, ResourceMap};
use stagecraft_schema::{Schema, ValidationError};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Validates and transforms template fragments for one namespace.
#[derive(Debug)]
pub struct MacroProcessor {
    config: MacroConfig,
    schema: Schema,
    registry: Arc<ActionTypeRegistry>,
    transformers: TransformerRegistry,
}

impl MacroProcessor {
    /// Build a processor with the built-in action types.
    pub fn new(config: MacroConfig) -> Result<Self, MacroError> {
        Self::with_registry(config, ActionTypeRegistry::builtin())
    }

    /// Build a processor whose stage types are exactly the registry's keys.
    pub fn with_registry(config: MacroConfig, registry: ActionTypeRegistry) -> Result<Self, MacroError> {
        let schema = macro_schema(&config.pipeline_type(), registry.names())?;
        Self::from_parts(config, schema, registry)
    }

    /// Build a processor from an explicit schema and registry.
    ///
    /// Fails with [`MacroError::RegistryConsistency`] when the schema's
    /// enumerations and the registries disagree.
    pub fn from_parts(
        config: MacroConfig,
        schema: Schema,
        registry: ActionTypeRegistry,
    ) -> Result<Self, MacroError> {
        config.validate()?;

        let registry = Arc::new(registry);
        let transformers = TransformerRegistry::new().with(PipelineTransformer::new(
            config.pipeline_type(),
            Arc::clone(&registry),
            config.pipeline.clone(),
        ));

        ensure_stage_types_match(&schema, &registry)?;
        ensure_resource_types_match(&schema, &transformers)?;

        tracing::debug!(
            namespace = %config.namespace,
            stage_types = registry.len(),
            "macro processor ready"
        );

        Ok(Self {
            config,
            schema,
            registry,
            transformers,
        })
    }

    pub fn config(&self) -> &MacroConfig {
        &self.config
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn registry(&self) -> &ActionTypeRegistry {
        &self.registry
    }

    /// Resources of the fragment that belong to this macro's namespace.
    pub fn filter(&self, fragment: &Value) -> ResourceMap {
        filter_resources(fragment, &self.config.prefix())
    }

    /// Validate a set of managed resources.
    pub fn validate(&self, managed: &ResourceMap) -> Vec<ValidationError> {
        let mut document = Map::new();
        document.insert(RESOURCES_KEY.to_string(), Value::Object(managed.clone()));
        self.schema.validate(&Value::Object(document))
    }

    /// Validate the managed resources of a fragment.
    pub fn validate_fragment(&self, fragment: &Value) -> Vec<ValidationError> {
        let managed = self.filter(fragment);
        if managed.is_empty() {
            return Vec::new();
        }
        self.validate(&managed)
    }

    /// Validate and transform a fragment.
    ///
    /// Either every managed resource is replaced by its transformed form or
    /// the fragment is left alone and an error is returned. Fragments without
    /// managed resources come back unchanged.
    pub fn transform_fragment(&self, fragment: &Value) -> Result<Value, MacroError> {
        let managed = self.filter(fragment);
        if managed.is_empty() {
            tracing::debug!("no managed resources in fragment");
            return Ok(fragment.clone());
        }

        let errors = self.validate(&managed);
        if !errors.is_empty() {
            return Err(MacroError::Validation(errors.into()));
        }

        let replacements: HashMap<String, ResourceMap> =
            self.transformers.transform_each(&managed)?.into_iter().collect();
        let merged = match resources(fragment) {
            Some(original) => merge_resources(original, replacements),
            None => ResourceMap::new(),
        };

        let mut output = fragment.clone();
        let section = output.as_object_mut().ok_or_else(|| {
            MacroError::malformed(RESOURCES_KEY, "fragment is not a mapping")
        })?;
        section.insert(RESOURCES_KEY.to_string(), Value::Object(merged));
        Ok(output)
    }

    /// Handle one macro invocation.
    ///
    /// Validation failures become a `failure` response carrying the original
    /// fragment. Consistency faults are returned as errors.
    pub fn process(&self, request: MacroRequest) -> Result<MacroResponse, MacroError> {
        match self.transform_fragment(&request.fragment) {
            Ok(fragment) => {
                tracing::info!(request_id = %request.request_id, "fragment processed");
                Ok(MacroResponse::success(request.request_id, fragment))
            }
            Err(MacroError::Validation(errors)) => {
                tracing::warn!(
                    request_id = %request.request_id,
                    error_count = errors.len(),
                    "fragment failed validation"
                );
                for error in errors.iter() {
                    tracing::debug!(path = %error.path, kind = ?error.kind, "{}", error.message);
                }
                Ok(MacroResponse::failure(
                    request.request_id,
                    request.fragment,
                    errors.to_string(),
                ))
            }
            Err(err) => {
                tracing::error!(request_id = %request.request_id, error = %err, "macro processing aborted");
                Err(err)
            }
        }
    }
}

/// Rebuild the `Resources` section with each transformed resource replaced
/// by its outputs, at the position the source resource held.
///
/// A transformer output whose name collides with an unmanaged resource wins,
/// whether the unmanaged resource comes earlier or later in the template. An
/// earlier one keeps its position but takes the output's body.
fn merge_resources(
    original: &ResourceMap,
    mut replacements: HashMap<String, ResourceMap>,
) -> ResourceMap {
    let mut merged = ResourceMap::new();
    let mut produced = HashSet::new();

    for (name, resource) in original {
        match replacements.remove(name) {
            Some(outputs) => {
                for (output_name, output) in outputs {
                    if merged.contains_key(&output_name) && !produced.contains(&output_name) {
                        tracing::warn!(
                            resource = %name,
                            output = %output_name,
                            "transformer output replaces an earlier resource"
                        );
                    }
                    produced.insert(output_name.clone());
                    merged.insert(output_name, output);
                }
            }
            None if produced.contains(name) => {
                tracing::warn!(
                    resource = %name,
                    "resource dropped in favour of a transformer output of the same name"
                );
            }
            None => {
                merged.insert(name.clone(), resource.clone());
            }
        }
    }
    merged
}
