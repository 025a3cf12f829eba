//! Tests for path template and path parameter consistency.

use oaslint::{CheckResult, Diagnostic, JsonSchemaEngine, PathParams, RuleContext, RuleFunction};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use stillwater::Validation;

fn check(document: &Value) -> Vec<Diagnostic> {
    let engine = JsonSchemaEngine::new();
    let ctx = RuleContext::new(document, &engine);
    match PathParams.check(document, &ctx) {
        Validation::Success(()) => Vec::new(),
        Validation::Failure(diagnostics) => diagnostics.into_vec(),
    }
}

fn summary(diagnostics: &[Diagnostic]) -> Vec<(String, String)> {
    diagnostics
        .iter()
        .map(|d| (d.path.to_string(), d.message.clone()))
        .collect()
}

fn path_param(name: &str) -> Value {
    json!({ "name": name, "in": "path", "required": true, "type": "string" })
}

#[test]
fn test_consistent_document_is_clean() {
    let document = json!({
        "swagger": "2.0",
        "paths": {
            "/users/{id}": {
                "parameters": [path_param("id")],
                "get": {},
                "delete": { "parameters": [path_param("id")] }
            }
        }
    });
    let result: CheckResult = {
        let engine = JsonSchemaEngine::new();
        let ctx = RuleContext::new(&document, &engine);
        PathParams.check(&document, &ctx)
    };
    assert!(result.is_success());
}

#[test]
fn test_equivalent_paths_collide_once() {
    let document = json!({
        "paths": {
            "/users/{id}": { "get": { "parameters": [path_param("id")] } },
            "/users/{userId}": { "get": { "parameters": [path_param("userId")] } }
        }
    });

    assert_eq!(
        summary(&check(&document)),
        vec![(
            "paths./users/{userId}".to_string(),
            "Paths \"/users/{id}\" and \"/users/{userId}\" must not be equivalent.".to_string()
        )]
    );
}

#[test]
fn test_repeated_placeholder() {
    let document = json!({
        "paths": { "/a/{id}/b/{id}": { "get": { "parameters": [path_param("id")] } } }
    });

    assert_eq!(
        summary(&check(&document)),
        vec![(
            "paths./a/{id}/b/{id}".to_string(),
            "Path \"/a/{id}/b/{id}\" must not use parameter \"{id}\" multiple times.".to_string()
        )]
    );
}

#[test]
fn test_path_parameter_must_be_required() {
    let document = json!({
        "paths": {
            "/a/{id}": {
                "get": { "parameters": [{ "name": "id", "in": "path", "required": false }] }
            }
        }
    });

    assert_eq!(
        summary(&check(&document)),
        vec![(
            "paths./a/{id}.get.parameters[0]".to_string(),
            "Path parameter \"id\" must have \"required\" property that is set to \"true\"."
                .to_string()
        )]
    );
}

#[test]
fn test_duplicate_declaration_in_one_list() {
    let document = json!({
        "paths": { "/a/{id}": { "get": { "parameters": [path_param("id"), path_param("id")] } } }
    });

    assert_eq!(
        summary(&check(&document)),
        vec![(
            "paths./a/{id}.get.parameters[1]".to_string(),
            "Path parameter \"id\" must not be defined multiple times.".to_string()
        )]
    );
}

#[test]
fn test_operation_may_redeclare_shared_parameter() {
    let document = json!({
        "paths": {
            "/a/{id}": {
                "parameters": [path_param("id")],
                "get": { "parameters": [path_param("id")] }
            }
        }
    });
    assert!(check(&document).is_empty());
}

#[test]
fn test_unused_and_missing_parameters() {
    let document = json!({
        "paths": {
            "/a/{id}": {
                "get": { "parameters": [path_param("other")] },
                "post": {}
            }
        }
    });

    assert_eq!(
        summary(&check(&document)),
        vec![
            (
                "paths./a/{id}.get.parameters[0]".to_string(),
                "Parameter \"other\" must be used in path \"/a/{id}\".".to_string()
            ),
            (
                "paths./a/{id}.get".to_string(),
                "Operation must define parameter \"{id}\" as expected by path \"/a/{id}\"."
                    .to_string()
            ),
            (
                "paths./a/{id}.post".to_string(),
                "Operation must define parameter \"{id}\" as expected by path \"/a/{id}\"."
                    .to_string()
            ),
        ]
    );
}

#[test]
fn test_shared_unused_parameter_reported_per_operation() {
    let document = json!({
        "paths": {
            "/a": {
                "parameters": [path_param("ghost")],
                "get": {},
                "put": {}
            }
        }
    });

    let diagnostics = check(&document);
    assert_eq!(diagnostics.len(), 2);
    assert!(diagnostics
        .iter()
        .all(|d| d.path.to_string() == "paths./a.parameters[0]"));
}
