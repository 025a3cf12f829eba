//! Tests for the canonical schema registry.

use oaslint::{DocFormat, RegistryError, SchemaRegistry};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn test_canonical_holds_every_version() {
    let registry = SchemaRegistry::canonical();
    assert_eq!(registry.versions(), vec!["2.0", "3.0", "3.1"]);
}

#[test]
fn test_for_format_selects_schema() {
    let registry = SchemaRegistry::with_canonical().unwrap();

    let oas2 = registry.for_format(DocFormat::V2).unwrap();
    assert_eq!(oas2["required"], json!(["swagger", "info", "paths"]));

    let oas31 = registry.for_format(DocFormat::V31).unwrap();
    assert_eq!(oas31["$schema"], "https://json-schema.org/draft/2020-12/schema");
}

#[test]
fn test_register_and_get() {
    let registry = SchemaRegistry::new();

    registry.register("3.2", json!({ "type": "object" })).unwrap();

    assert!(registry.get("3.2").is_some());
    assert!(registry.get("4.0").is_none());
}

#[test]
fn test_duplicate_registration_fails() {
    let registry = SchemaRegistry::new();

    registry.register("2.0", json!({})).unwrap();

    let result = registry.register("2.0", json!({ "type": "object" }));
    assert!(matches!(result, Err(RegistryError::DuplicateVersion(v)) if v == "2.0"));
}

#[test]
fn test_unknown_version() {
    let registry = SchemaRegistry::new();

    let error = registry.for_format(DocFormat::V30).unwrap_err();
    assert_eq!(error.to_string(), "no schema for OpenAPI version '3.0'");
}

#[test]
fn test_clones_share_storage() {
    let registry = SchemaRegistry::new();
    let clone = registry.clone();

    registry.register("3.0", json!({})).unwrap();
    assert!(clone.get("3.0").is_some());
}
