//! Selection of the resources owned by this macro.

use serde_json::Value;
use stagecraft_core::ResourceMap;
use stagecraft_core::model::{resource_type, resources};

/// Resources of `fragment` whose `Type` starts with `prefix`, in template order.
///
/// A missing or null `Resources` section yields an empty map.
pub fn filter_resources(fragment: &Value, prefix: &str) -> ResourceMap {
    let Some(all) = resources(fragment) else {
        return ResourceMap::new();
    };

    all.iter()
        .filter(|(_, resource)| resource_type(resource).is_some_and(|t| t.starts_with(prefix)))
        .map(|(name, resource)| (name.clone(), resource.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_fragments() {
        for fragment in [json!({}), json!({"Resources": null}), json!({"Resources": {}})] {
            assert!(filter_resources(&fragment, "prefix::").is_empty());
        }
    }

    #[test]
    fn test_prefixed_resources() {
        let fragment = json!({
            "Resources": {
                "PrefixedResource": {"Type": "prefix::resource"},
                "AnotherResource": {"Type": "another"}
            }
        });

        let filtered = filter_resources(&fragment, "prefix::");
        assert_eq!(
            Value::Object(filtered),
            json!({"PrefixedResource": {"Type": "prefix::resource"}})
        );
    }

    #[test]
    fn test_skips_entries_without_string_type() {
        let fragment = json!({
            "Resources": {
                "NoType": {"Properties": {}},
                "NumericType": {"Type": 7},
                "NotAMap": "prefix::resource",
                "Kept": {"Type": "prefix::Pipeline"}
            }
        });

        let filtered = filter_resources(&fragment, "prefix::");
        assert_eq!(filtered.keys().collect::<Vec<_>>(), vec!["Kept"]);
    }

    #[test]
    fn test_preserves_template_order() {
        let fragment = json!({
            "Resources": {
                "Zeta": {"Type": "p::Pipeline"},
                "Other": {"Type": "AWS::S3::Bucket"},
                "Alpha": {"Type": "p::Pipeline"}
            }
        });

        let filtered = filter_resources(&fragment, "p::");
        assert_eq!(filtered.keys().collect::<Vec<_>>(), vec!["Zeta", "Alpha"]);
    }
}
