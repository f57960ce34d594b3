//! Dispatch of validated resources to their transformers.

mod pipeline;

pub use pipeline::PipelineTransformer;

use crate::error::MacroError;
use serde_json::Value;
use stagecraft_core::ResourceMap;
use stagecraft_core::model::resource_type;
use std::collections::BTreeMap;

/// Converts one resource of a given type into engine-native resources.
///
/// The output may use different logical names than the input; the caller
/// merges it back into the template as-is.
pub trait ResourceTransformer: Send + Sync {
    /// Fully-qualified resource type this transformer handles.
    fn resource_type(&self) -> &str;

    /// Transform a validated resource.
    fn transform(&self, name: &str, resource: &Value) -> Result<ResourceMap, MacroError>;
}

/// Transformers keyed by the resource type they handle.
#[derive(Default)]
pub struct TransformerRegistry {
    transformers: BTreeMap<String, Box<dyn ResourceTransformer>>,
}

impl TransformerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a transformer under its resource type.
    pub fn with(mut self, transformer: impl ResourceTransformer + 'static) -> Self {
        self.transformers
            .insert(transformer.resource_type().to_string(), Box::new(transformer));
        self
    }

    /// Resource types with a registered transformer.
    pub fn resource_types(&self) -> impl Iterator<Item = &str> {
        self.transformers.keys().map(String::as_str)
    }

    pub fn get(&self, resource_type: &str) -> Option<&dyn ResourceTransformer> {
        self.transformers.get(resource_type).map(|t| t.as_ref())
    }

    /// Transform a single resource with the transformer for its type.
    ///
    /// A type without a transformer means the schema accepted something no
    /// transformer handles, which is reported as a consistency fault.
    pub fn transform_resource(&self, name: &str, resource: &Value) -> Result<ResourceMap, MacroError> {
        let declared = resource_type(resource)
            .ok_or_else(|| MacroError::malformed(name, "resource has no string Type"))?;

        let transformer = self.get(declared).ok_or_else(|| {
            MacroError::RegistryConsistency(format!(
                "no transformer registered for resource type '{}' (resource '{}')",
                declared, name
            ))
        })?;

        let output = transformer.transform(name, resource)?;
        tracing::debug!(
            resource = %name,
            resource_type = %declared,
            outputs = output.len(),
            "transformed resource"
        );
        Ok(output)
    }

    /// Transform every resource, keeping each input's outputs together and in order.
    pub fn transform_each(&self, resources: &ResourceMap) -> Result<Vec<(String, ResourceMap)>, MacroError> {
        let mut grouped = Vec::with_capacity(resources.len());
        for (name, resource) in resources {
            grouped.push((name.clone(), self.transform_resource(name, resource)?));
        }
        Ok(grouped)
    }

    /// Transform every resource and merge all outputs into one map.
    pub fn transform_all(&self, resources: &ResourceMap) -> Result<ResourceMap, MacroError> {
        let mut merged = ResourceMap::new();
        for (_, output) in self.transform_each(resources)? {
            merged.extend(output);
        }
        Ok(merged)
    }
}

impl std::fmt::Debug for TransformerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformerRegistry")
            .field("resource_types", &self.transformers.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Splits a resource into two renamed copies.
    struct SplitTransformer;

    impl ResourceTransformer for SplitTransformer {
        fn resource_type(&self) -> &str {
            "Ns::Split"
        }

        fn transform(&self, name: &str, resource: &Value) -> Result<ResourceMap, MacroError> {
            let mut output = ResourceMap::new();
            output.insert(format!("{}A", name), resource.clone());
            output.insert(format!("{}B", name), resource.clone());
            Ok(output)
        }
    }

    #[test]
    fn test_dispatch_allows_renaming() {
        let registry = TransformerRegistry::new().with(SplitTransformer);
        let mut resources = ResourceMap::new();
        resources.insert("Res".to_string(), json!({"Type": "Ns::Split"}));

        let output = registry.transform_all(&resources).unwrap();
        assert_eq!(output.keys().collect::<Vec<_>>(), vec!["ResA", "ResB"]);
        assert!(!output.contains_key("Res"));
    }

    #[test]
    fn test_missing_transformer_is_consistency_fault() {
        let registry = TransformerRegistry::new().with(SplitTransformer);
        let mut resources = ResourceMap::new();
        resources.insert("Res".to_string(), json!({"Type": "Ns::Other"}));

        let err = registry.transform_all(&resources).unwrap_err();
        assert!(matches!(err, MacroError::RegistryConsistency(_)));
        assert!(!err.is_user_error());
    }

    #[test]
    fn test_transform_each_groups_by_source() {
        let registry = TransformerRegistry::new().with(SplitTransformer);
        let mut resources = ResourceMap::new();
        resources.insert("One".to_string(), json!({"Type": "Ns::Split"}));
        resources.insert("Two".to_string(), json!({"Type": "Ns::Split"}));

        let grouped = registry.transform_each(&resources).unwrap();
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].0, "One");
        assert_eq!(grouped[1].1.keys().collect::<Vec<_>>(), vec!["TwoA", "TwoB"]);
        assert_eq!(registry.resource_types().collect::<Vec<_>>(), vec!["Ns::Split"]);
    }
}
