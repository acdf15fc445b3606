//! Tests for schema types.

use super::*;
use serde_json::json;

const LISTING_JSON: &str = r#"
{
  "definitions": [
    {
      "id": "dup-roles",
      "name": "Duplicate roles",
      "description": null,
      "logic": {
        "type": "duplicate_role_same_name",
        "parameters": { "min_count": 3 }
      }
    },
    {
      "id": "legacy",
      "name": "Legacy script",
      "enabled": false,
      "logic": {
        "type": "legacy_script",
        "parameters": "not-an-object",
        "script": "return rows"
      }
    }
  ],
  "blueprints": {
    "zeta": { "label": "Zeta", "parameters": { "b": { "type": "number" }, "a": {} } },
    "alpha": { "label": "Alpha", "description": "first" }
  }
}
"#;

#[test]
fn parse_listing() {
    let listing: DefinitionListing = serde_json::from_str(LISTING_JSON).unwrap();
    assert_eq!(listing.definitions.len(), 2);

    let first = &listing.definitions[0];
    assert_eq!(first.description, "");
    assert!(first.enabled, "enabled defaults to true");
    assert_eq!(first.logic.parameters.get("min_count"), Some(&json!(3)));

    let legacy = &listing.definitions[1];
    assert!(!legacy.enabled);
    assert!(legacy.logic.parameters.is_empty());
    assert_eq!(legacy.logic.extra.get("script"), Some(&json!("return rows")));

    // Declaration order survives deserialization.
    let ids: Vec<&str> = listing.blueprints.keys().map(|k| k.as_str()).collect();
    assert_eq!(ids, vec!["zeta", "alpha"]);
    let zeta_params: Vec<&str> = listing.blueprints["zeta"]
        .parameters
        .keys()
        .map(|k| k.as_str())
        .collect();
    assert_eq!(zeta_params, vec!["b", "a"]);
}

#[test]
fn logic_extra_keys_round_trip() {
    let listing: DefinitionListing = serde_json::from_str(LISTING_JSON).unwrap();
    let legacy = &listing.definitions[1];
    let value = serde_json::to_value(legacy).unwrap();
    assert_eq!(value["logic"]["script"], json!("return rows"));
    assert_eq!(value["logic"]["type"], json!("legacy_script"));
}

#[test]
fn missing_type_means_string() {
    let schema = ParameterSchema::from_spec("label", &ParameterSpec::default()).unwrap();
    assert_eq!(schema.kind, ParameterKind::String);
}

#[test]
fn select_without_options_is_invalid() {
    let spec = ParameterSpec {
        kind: Some("select".to_string()),
        ..Default::default()
    };
    let err = ParameterSchema::from_spec("channel", &spec).unwrap_err();
    assert_eq!(
        err,
        SchemaError::SelectWithoutOptions {
            name: "channel".to_string()
        }
    );

    let empty = ParameterSpec::select(Vec::new());
    assert!(ParameterSchema::from_spec("channel", &empty).is_err());
}

#[test]
fn unsupported_type_is_invalid() {
    let spec = ParameterSpec {
        kind: Some("boolean".to_string()),
        ..Default::default()
    };
    let err = ParameterSchema::from_spec("flag", &spec).unwrap_err();
    assert!(err.to_string().contains("boolean"));
}

#[test]
fn blueprint_label_falls_back_to_id() {
    let blueprint = Blueprint::from_spec("missing_role", &BlueprintSpec::default()).unwrap();
    assert_eq!(blueprint.label, "missing_role");
    assert!(!blueprint.has_parameters());
    assert!(!blueprint.custom);
}

#[test]
fn blueprint_spec_round_trip_keeps_options() {
    let spec = BlueprintSpec::new("Dup", "d").with_parameter(
        "channel",
        ParameterSpec::select(vec![SelectOption::new("phone", "Phone")]).with_default("phone"),
    );
    let blueprint = Blueprint::from_spec("dup", &spec).unwrap();
    assert_eq!(blueprint.to_spec(), spec);
}

#[test]
fn url_safe_ids() {
    assert!(is_url_safe_id("dup-roles_v2.1"));
    assert!(!is_url_safe_id(""));
    assert!(!is_url_safe_id("has space"));
    assert!(!is_url_safe_id("a/b"));
}
