//! Tests for local reference handling and unused component detection.

use oaslint::refs::{
    map_to_source, referenced_pointers, resolve_local_refs, unreferenced, ORPHAN_MESSAGE,
};
use oaslint::{
    CheckResult, JsonPath, JsonSchemaEngine, RefSiblings, RuleContext, RuleFunction,
    UnusedComponent,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use stillwater::Validation;

fn paths(result: CheckResult) -> Vec<String> {
    match result {
        Validation::Success(()) => Vec::new(),
        Validation::Failure(diagnostics) => {
            diagnostics.iter().map(|d| d.path.to_string()).collect()
        }
    }
}

#[test]
fn test_referenced_pointers_are_decoded() {
    let document = json!({
        "a": { "$ref": "#/components/schemas/Pet%20Food" },
        "b": [{ "$ref": "#/components/schemas/Owner" }],
        "c": { "$ref": "https://example.com/schemas.json#/Remote" }
    });
    let pointers = referenced_pointers(&document);

    assert!(pointers.contains("/components/schemas/Pet Food"));
    assert!(pointers.contains("/components/schemas/Owner"));
    assert_eq!(pointers.len(), 2);
}

#[test]
fn test_unused_components_across_types() {
    let document = json!({
        "openapi": "3.0.3",
        "paths": {
            "/pets": {
                "get": {
                    "parameters": [{ "$ref": "#/components/parameters/Limit" }],
                    "responses": { "200": { "$ref": "#/components/responses/Pets" } }
                }
            }
        },
        "components": {
            "schemas": { "Pet": {}, "Orphan": {} },
            "parameters": { "Limit": {}, "Offset": {} },
            "responses": {
                "Pets": { "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Pet" } } } }
            },
            "securitySchemes": { "key": {} }
        }
    });
    let engine = JsonSchemaEngine::new();
    let ctx = RuleContext::new(&document, &engine);

    assert_eq!(
        paths(UnusedComponent.check(&document, &ctx)),
        vec!["components.schemas.Orphan", "components.parameters.Offset"]
    );
}

#[test]
fn test_unreferenced_message() {
    let document = json!({ "components": { "examples": { "E": {} } } });
    let orphans = unreferenced(&document, &JsonPath::from_segments(["components", "examples"]));

    assert_eq!(orphans.len(), 1);
    assert_eq!(orphans[0].message, ORPHAN_MESSAGE);
    assert_eq!(orphans[0].code, "unreferenced-reusable-object");
}

#[test]
fn test_resolved_view_maps_back_through_chained_refs() {
    let raw = json!({
        "paths": { "/a": { "get": { "responses": { "200": { "$ref": "#/responses/Ok" } } } } },
        "responses": { "Ok": { "schema": { "$ref": "#/definitions/Pet" } } },
        "definitions": { "Pet": { "type": "object", "example": { "id": 1 } } }
    });
    let resolved = resolve_local_refs(&raw);

    let path =
        JsonPath::from_segments(["paths", "/a", "get", "responses", "200", "schema", "example"]);
    assert_eq!(path.resolve(&resolved), Some(&json!({ "id": 1 })));
    assert_eq!(map_to_source(&raw, &path).to_string(), "definitions.Pet.example");
}

#[test]
fn test_ref_siblings_flag_each_neighbour() {
    let document = json!({
        "openapi": "3.0.0",
        "components": {
            "schemas": {
                "Pet": { "$ref": "#/components/schemas/Animal", "description": "a pet", "nullable": true },
                "Animal": { "type": "object" }
            }
        }
    });
    let engine = JsonSchemaEngine::new();
    let ctx = RuleContext::new(&document, &engine)
        .at(JsonPath::from_segments(["components", "schemas", "Pet", "$ref"]));

    let target = &document["components"]["schemas"]["Pet"]["$ref"];
    assert_eq!(
        paths(RefSiblings.check(target, &ctx)),
        vec!["components.schemas.Pet.description", "components.schemas.Pet.nullable"]
    );
}

#[test]
fn test_lone_ref_has_no_siblings() {
    let document = json!({ "a": { "$ref": "#/b" }, "b": {} });
    let engine = JsonSchemaEngine::new();
    let ctx = RuleContext::new(&document, &engine).at(JsonPath::from_segments(["a", "$ref"]));

    assert!(RefSiblings.check(&document["a"]["$ref"], &ctx).is_success());
}
