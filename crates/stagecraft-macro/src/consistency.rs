//! Cross-checks between the schema and the registries it relies on.
//!
//! After validation the transformers look up resource and stage types
//! without a fallback, which is only safe while the schema's enumerations
//! and the registries hold exactly the same names.

use crate::error::MacroError;
use crate::schema::{RESOURCE_TYPE_PATH, STAGE_TYPE_PATH};
use crate::transform::TransformerRegistry;
use stagecraft_core::ActionTypeRegistry;
use stagecraft_schema::Schema;
use std::collections::BTreeSet;

/// Stage types accepted by the schema must equal the action-type registry keys.
pub fn ensure_stage_types_match(
    schema: &Schema,
    registry: &ActionTypeRegistry,
) -> Result<(), MacroError> {
    let accepted = schema.allowed_at(&STAGE_TYPE_PATH);
    let registered: BTreeSet<String> = registry.names().map(str::to_string).collect();
    compare("stage type", &accepted, &registered, "action-type registry")
}

/// Resource types accepted by the schema must equal the transformer registry keys.
pub fn ensure_resource_types_match(
    schema: &Schema,
    transformers: &TransformerRegistry,
) -> Result<(), MacroError> {
    let accepted = schema.allowed_at(&RESOURCE_TYPE_PATH);
    let registered: BTreeSet<String> = transformers.resource_types().map(str::to_string).collect();
    compare("resource type", &accepted, &registered, "transformer registry")
}

fn compare(
    what: &str,
    accepted: &BTreeSet<String>,
    registered: &BTreeSet<String>,
    registry_name: &str,
) -> Result<(), MacroError> {
    let unregistered: Vec<&String> = accepted.difference(registered).collect();
    let unaccepted: Vec<&String> = registered.difference(accepted).collect();

    if unregistered.is_empty() && unaccepted.is_empty() {
        return Ok(());
    }

    let mut problems = Vec::new();
    if !unregistered.is_empty() {
        problems.push(format!(
            "{}s {:?} are accepted by the schema but missing from the {}",
            what, unregistered, registry_name
        ));
    }
    if !unaccepted.is_empty() {
        problems.push(format!(
            "{}s {:?} are in the {} but not accepted by the schema",
            what, unaccepted, registry_name
        ));
    }
    Err(MacroError::RegistryConsistency(problems.join("; ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::macro_schema;
    use stagecraft_core::{ActionCategory, ActionTypeId};

    #[test]
    fn test_builtin_registry_matches_schema() {
        let registry = ActionTypeRegistry::builtin();
        let schema = macro_schema("Ns::Pipeline", registry.names()).unwrap();
        assert!(ensure_stage_types_match(&schema, &registry).is_ok());
    }

    #[test]
    fn test_registry_entry_without_schema_entry() {
        let schema = macro_schema("Ns::Pipeline", ActionTypeRegistry::builtin().names()).unwrap();
        let registry = ActionTypeRegistry::builtin().with_entry(
            "CodeBuild",
            ActionTypeId::aws(ActionCategory::Build, 1, "CodeBuild"),
        );

        let err = ensure_stage_types_match(&schema, &registry).unwrap_err();
        match err {
            MacroError::RegistryConsistency(message) => {
                assert!(message.contains("CodeBuild"), "{}", message);
                assert!(message.contains("not accepted by the schema"), "{}", message);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_schema_entry_without_registry_entry() {
        let schema = macro_schema("Ns::Pipeline", ["CodeCommit", "Lambda", "S3", "GitHub"]).unwrap();
        let registry = ActionTypeRegistry::builtin();

        let err = ensure_stage_types_match(&schema, &registry).unwrap_err();
        assert!(matches!(err, MacroError::RegistryConsistency(ref m) if m.contains("GitHub")));
    }

    #[test]
    fn test_resource_types_need_a_transformer() {
        let schema = macro_schema("Ns::Pipeline", ["S3"]).unwrap();
        let err = ensure_resource_types_match(&schema, &TransformerRegistry::new()).unwrap_err();
        assert!(matches!(err, MacroError::RegistryConsistency(ref m) if m.contains("Ns::Pipeline")));
    }
}
