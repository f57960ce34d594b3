//! End-to-end tests for the pipeline macro.
//!
//! Run with: cargo test --package stagecraft-macro --test integration_tests

use serde_json::{Value, json};
use stagecraft_core::{
    ActionCategory, ActionOwner, ActionTypeId, ActionTypeRegistry, MacroConfig, MacroRequest,
    MacroResponse, MacroStatus,
};
use stagecraft_macro::{MacroError, MacroProcessor, macro_schema};
use stagecraft_schema::ValidationErrorKind;

fn processor(namespace: &str) -> MacroProcessor {
    MacroProcessor::new(MacroConfig::new(namespace).expect("valid namespace"))
        .expect("builtin registry is consistent")
}

fn run(processor: &MacroProcessor, fragment: Value) -> MacroResponse {
    processor
        .process(MacroRequest::new("request-1", fragment))
        .expect("no consistency fault")
}

fn assert_conforms(response: &MacroResponse) {
    let schema: Value =
        serde_json::from_str(include_str!("../../../schemas/MacroResponse.schema.json"))
            .expect("schema must parse");
    let validator = jsonschema::draft202012::options()
        .build(&schema)
        .expect("schema must compile");

    let instance = serde_json::to_value(response).expect("response serializes");
    if !validator.is_valid(&instance) {
        let msgs: Vec<String> = validator
            .iter_errors(&instance)
            .map(|err| err.to_string())
            .collect();
        panic!("response did not validate: {}", msgs.join("; "));
    }
}

fn scenario(namespace: &str) -> Value {
    json!({
        "AWSTemplateFormatVersion": "2010-09-09",
        "Resources": {
            "Pipe": {
                "Type": format!("{}::Pipeline", namespace),
                "Properties": {
                    "Stages": [
                        {"Source": {"Type": "CodeCommit", "Configuration": {"RepositoryName": "r"}}},
                        {"Build": {"Type": "Lambda", "Configuration": {"FunctionName": "f"}}}
                    ]
                }
            }
        }
    })
}

// =============================================================================
// PASS-THROUGH
// =============================================================================

#[test]
fn test_empty_resources_pass_through() {
    let processor = processor("Ns");
    for fragment in [
        json!({}),
        json!({"Resources": null}),
        json!({"Resources": {}}),
        json!({"Outputs": {"X": {"Value": 1}}}),
    ] {
        let response = run(&processor, fragment.clone());
        assert_eq!(response.status, MacroStatus::Success);
        assert_eq!(response.fragment, fragment);
        assert!(response.error_message.is_none());
        assert_conforms(&response);
    }
}

#[test]
fn test_foreign_resources_are_untouched() {
    let bucket = json!({
        "Type": "AWS::S3::Bucket",
        "Properties": {"BucketName": "b", "Tags": [{"Key": "k", "Value": "v"}]}
    });
    let lookalike = json!({"Type": "NsOther::Pipeline", "Properties": {"Stages": "anything"}});
    let untyped = json!({"Properties": {}});

    let mut fragment = scenario("Ns");
    let resources = fragment["Resources"].as_object_mut().unwrap();
    resources.insert("Bucket".to_string(), bucket.clone());
    resources.insert("Lookalike".to_string(), lookalike.clone());
    resources.insert("Untyped".to_string(), untyped.clone());

    let response = run(&processor("Ns"), fragment);
    assert!(response.is_success());
    assert_eq!(response.fragment["Resources"]["Bucket"], bucket);
    assert_eq!(response.fragment["Resources"]["Lookalike"], lookalike);
    assert_eq!(response.fragment["Resources"]["Untyped"], untyped);
    assert_eq!(response.fragment["AWSTemplateFormatVersion"], "2010-09-09");
}

// =============================================================================
// TRANSFORMATION
// =============================================================================

#[test]
fn test_concrete_pipeline_scenario() {
    let response = run(&processor("Ns"), scenario("Ns"));

    assert_eq!(response.request_id, "request-1");
    assert_eq!(response.status, MacroStatus::Success);
    assert_eq!(
        response.fragment["Resources"]["Pipe"]["Properties"]["Stages"],
        json!([
            {
                "Name": "Source",
                "Actions": [{
                    "Name": "Source",
                    "ActionTypeId": {
                        "Category": "Source",
                        "Owner": "AWS",
                        "Version": 1,
                        "Provider": "CodeCommit"
                    },
                    "Configuration": {"RepositoryName": "r"}
                }]
            },
            {
                "Name": "Build",
                "Actions": [{
                    "Name": "Build",
                    "ActionTypeId": {
                        "Category": "Invoke",
                        "Owner": "AWS",
                        "Version": 1,
                        "Provider": "Lambda"
                    },
                    "Configuration": {"FunctionName": "f"}
                }]
            }
        ])
    );
    assert_eq!(response.fragment["Resources"]["Pipe"]["Type"], "Ns::Pipeline");
    assert_conforms(&response);
}

#[test]
fn test_arbitrary_namespaces() {
    for namespace in ["Acme", "my-org", "Team_42"] {
        let response = run(&processor(namespace), scenario(namespace));
        assert!(response.is_success(), "namespace {}", namespace);
        assert_eq!(
            response.fragment["Resources"]["Pipe"]["Properties"]["Stages"][1]["Name"],
            "Build"
        );
    }

    // A pipeline from another namespace is not ours to touch.
    let fragment = scenario("Acme");
    let response = run(&processor("Ns"), fragment.clone());
    assert_eq!(response.fragment, fragment);
}

#[test]
fn test_transform_is_one_way() {
    let processor = processor("Ns");
    let first = run(&processor, scenario("Ns"));
    assert!(first.is_success());

    let errors = processor.validate_fragment(&first.fragment);
    assert!(!errors.is_empty());

    let second = run(&processor, first.fragment.clone());
    assert_eq!(second.status, MacroStatus::Failure);
    assert_eq!(second.fragment, first.fragment);
}

// =============================================================================
// VALIDATION FAILURES
// =============================================================================

#[test]
fn test_unknown_stage_type_fails_unchanged() {
    let fragment = json!({
        "Resources": {
            "Pipe": {
                "Type": "Ns::Pipeline",
                "Properties": {
                    "Stages": [{"Source": {"Type": "GitHub", "Configuration": {}}}]
                }
            }
        }
    });

    let response = run(&processor("Ns"), fragment.clone());
    assert_eq!(response.status, MacroStatus::Failure);
    assert_eq!(response.fragment, fragment);
    let message = response.error_message.as_deref().unwrap_or_default();
    assert!(message.contains("Resources.Pipe.Properties.Stages[0].Source.Type"), "{}", message);
    assert_conforms(&response);
}

#[test]
fn test_stage_declarations_need_exactly_one_key() {
    let processor = processor("Ns");
    for stages in [
        json!([{}]),
        json!([{
            "Source": {"Type": "S3", "Configuration": {}},
            "Build": {"Type": "Lambda", "Configuration": {}}
        }]),
    ] {
        let fragment = json!({
            "Resources": {"Pipe": {"Type": "Ns::Pipeline", "Properties": {"Stages": stages}}}
        });
        let response = run(&processor, fragment.clone());
        assert_eq!(response.status, MacroStatus::Failure);
        assert_eq!(response.fragment, fragment);
    }
}

#[test]
fn test_empty_stage_list_is_rejected() {
    let fragment = json!({
        "Resources": {"Pipe": {"Type": "Ns::Pipeline", "Properties": {"Stages": []}}}
    });
    let processor = processor("Ns");

    let errors = processor.validate_fragment(&fragment);
    assert!(errors.iter().any(|e| e.kind == ValidationErrorKind::MinLength));
    assert!(!run(&processor, fragment).is_success());
}

#[test]
fn test_all_errors_are_collected() {
    let fragment = json!({
        "Resources": {
            "First": {"Type": "Ns::Pipeline", "Properties": {"Stages": []}},
            "Second": {
                "Type": "Ns::Pipeline",
                "Properties": {"Stages": [{"Build": {"Type": "Lambda"}}]}
            },
            "Third": {"Type": "Ns::Widget"}
        }
    });

    let errors = processor("Ns").validate_fragment(&fragment);
    let paths: Vec<String> = errors.iter().map(|e| e.path.to_string()).collect();
    assert!(paths.iter().any(|p| p.starts_with("Resources.First")), "{:?}", paths);
    assert!(paths.iter().any(|p| p.starts_with("Resources.Second")), "{:?}", paths);
    assert!(paths.iter().any(|p| p.starts_with("Resources.Third")), "{:?}", paths);
}

#[test]
fn test_one_invalid_resource_blocks_all() {
    let mut fragment = scenario("Ns");
    fragment["Resources"].as_object_mut().unwrap().insert(
        "Broken".to_string(),
        json!({"Type": "Ns::Pipeline", "Properties": {"Stages": []}}),
    );

    let response = run(&processor("Ns"), fragment.clone());
    assert_eq!(response.status, MacroStatus::Failure);
    assert_eq!(response.fragment, fragment);
}

// =============================================================================
// CONSISTENCY
// =============================================================================

#[test]
fn test_registry_without_schema_entry_is_rejected() {
    let config = MacroConfig::new("Ns").unwrap();
    let schema = macro_schema(&config.pipeline_type(), ActionTypeRegistry::builtin().names()).unwrap();
    let registry = ActionTypeRegistry::builtin().with_entry(
        "CodeBuild",
        ActionTypeId::aws(ActionCategory::Build, 1, "CodeBuild"),
    );

    let err = MacroProcessor::from_parts(config, schema, registry).unwrap_err();
    assert!(matches!(err, MacroError::RegistryConsistency(_)));
    assert!(!err.is_user_error());
}

#[test]
fn test_schema_without_registry_entry_is_rejected() {
    let config = MacroConfig::new("Ns").unwrap();
    let schema = macro_schema(&config.pipeline_type(), ["CodeCommit", "Lambda"]).unwrap();

    let err = MacroProcessor::from_parts(config, schema, ActionTypeRegistry::builtin()).unwrap_err();
    assert!(matches!(err, MacroError::RegistryConsistency(ref m) if m.contains("S3")));
}

#[test]
fn test_custom_registry_drives_schema() {
    let registry = ActionTypeRegistry::builtin()
        .without_entry("S3")
        .with_entry("CodeBuild", ActionTypeId::aws(ActionCategory::Build, 1, "CodeBuild"))
        .with_entry(
            "GitHub",
            ActionTypeId::new(ActionCategory::Source, ActionOwner::ThirdParty, 1, "GitHub"),
        )
        .with_entry(
            "Scan",
            ActionTypeId::new(ActionCategory::Test, ActionOwner::Custom, 2, "SecurityScan"),
        );
    let processor = MacroProcessor::with_registry(MacroConfig::new("Ns").unwrap(), registry).unwrap();

    let fragment = json!({
        "Resources": {
            "Pipe": {
                "Type": "Ns::Pipeline",
                "Properties": {"Stages": [
                    {"Fetch": {"Type": "GitHub", "Configuration": {"Repo": "app"}}},
                    {"Compile": {"Type": "CodeBuild", "Configuration": {}}},
                    {"Audit": {"Type": "Scan", "Configuration": {}}}
                ]}
            }
        }
    });
    let response = run(&processor, fragment);
    assert!(response.is_success());
    let stages = &response.fragment["Resources"]["Pipe"]["Properties"]["Stages"];
    assert_eq!(
        stages[0]["Actions"][0]["ActionTypeId"],
        json!({"Category": "Source", "Owner": "ThirdParty", "Version": 1, "Provider": "GitHub"})
    );
    assert_eq!(stages[1]["Actions"][0]["ActionTypeId"]["Category"], "Build");
    assert_eq!(
        stages[2]["Actions"][0]["ActionTypeId"],
        json!({"Category": "Test", "Owner": "Custom", "Version": 2, "Provider": "SecurityScan"})
    );

    let fragment = json!({
        "Resources": {
            "Pipe": {
                "Type": "Ns::Pipeline",
                "Properties": {"Stages": [{"Fetch": {"Type": "S3", "Configuration": {}}}]}
            }
        }
    });
    assert!(!run(&processor, fragment).is_success());
}
