//! Tests for the operation-level rule functions.

use oaslint::{
    CheckResult, Diagnostic, FormDataConsumes, JsonPath, JsonSchemaEngine, OasDiscriminator,
    OperationIdUnique, OperationParameters, RuleContext, RuleFunction, SecurityDefined,
    SuccessResponse, TagDefined,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use stillwater::Validation;

fn run(
    function: &dyn RuleFunction,
    document: &Value,
    target: &Value,
    at: JsonPath,
) -> Vec<Diagnostic> {
    let engine = JsonSchemaEngine::new();
    let ctx = RuleContext::new(document, &engine).at(at);
    findings(function.check(target, &ctx))
}

fn findings(result: CheckResult) -> Vec<Diagnostic> {
    match result {
        Validation::Success(()) => Vec::new(),
        Validation::Failure(diagnostics) => diagnostics.into_vec(),
    }
}

fn located(diagnostics: &[Diagnostic]) -> Vec<String> {
    diagnostics.iter().map(|d| d.path.to_string()).collect()
}

#[test]
fn test_operation_id_flags_every_repeat_after_first() {
    let document = json!({
        "openapi": "3.0.0",
        "paths": {
            "/a": { "get": { "operationId": "op" } },
            "/b": { "get": { "operationId": "op" }, "post": { "operationId": "other" } },
            "/c": { "put": { "operationId": "op" } }
        }
    });

    let diagnostics = run(&OperationIdUnique, &document, &document, JsonPath::root());
    assert_eq!(
        located(&diagnostics),
        vec!["paths./b.get.operationId", "paths./c.put.operationId"]
    );
    assert_eq!(diagnostics[0].message, "operationId must be unique.");
}

#[test]
fn test_operation_id_ignores_structured_ids() {
    let document = json!({
        "paths": {
            "/a": { "get": { "operationId": { "x": 1 } } },
            "/b": { "get": { "operationId": { "x": 1 } } },
            "/c": { "get": { "operationId": 7 } },
            "/d": { "get": { "operationId": 7 } }
        }
    });

    let diagnostics = run(&OperationIdUnique, &document, &document, JsonPath::root());
    assert_eq!(located(&diagnostics), vec!["paths./d.get.operationId"]);
}

#[test]
fn test_operation_parameters_duplicates_and_bodies() {
    let document = json!({ "swagger": "2.0" });
    let parameters = json!([
        { "name": "id", "in": "query" },
        { "name": "id", "in": "query" },
        { "name": "id", "in": "header" },
        { "name": "a", "in": "body" },
        { "name": "b", "in": "body" },
        { "name": "f", "in": "formData" },
        { "$ref": "#/parameters/id" },
        { "$ref": "#/parameters/id" }
    ]);
    let at = JsonPath::from_segments(["paths", "/a", "get", "parameters"]);

    let diagnostics = run(&OperationParameters, &document, &parameters, at);
    assert_eq!(
        located(&diagnostics),
        vec![
            "paths./a.get.parameters[1]",
            "paths./a.get.parameters",
            "paths./a.get.parameters[4]"
        ]
    );
    assert_eq!(
        diagnostics[1].message,
        "Operation must not have both \"in:body\" and \"in:formData\" parameters."
    );
}

#[test]
fn test_operation_parameters_single_entry_is_never_inspected() {
    let document = json!({});
    let parameters = json!([{ "in": "body" }]);
    assert!(run(&OperationParameters, &document, &parameters, JsonPath::root()).is_empty());
}

#[test]
fn test_form_data_requires_form_media_type() {
    let document = json!({ "swagger": "2.0" });
    let at = JsonPath::from_segments(["paths", "/a", "post"]);

    let operation = json!({
        "consumes": ["application/json"],
        "parameters": [{ "name": "f", "in": "formData" }]
    });
    let diagnostics = run(&FormDataConsumes, &document, &operation, at.clone());
    assert_eq!(located(&diagnostics), vec!["paths./a.post"]);

    let operation = json!({
        "consumes": ["application/json", "multipart/form-data"],
        "parameters": [{ "name": "f", "in": "formData" }]
    });
    assert!(run(&FormDataConsumes, &document, &operation, at.clone()).is_empty());

    let operation = json!({ "parameters": [{ "name": "f", "in": "formData" }] });
    assert!(run(&FormDataConsumes, &document, &operation, at).is_empty());
}

#[test]
fn test_success_response_codes() {
    let at = JsonPath::from_segments(["paths", "/a", "get", "responses"]);
    let oas3 = json!({ "openapi": "3.0.0" });
    let oas2 = json!({ "swagger": "2.0" });

    assert!(run(&SuccessResponse, &oas3, &json!({ "2XX": {} }), at.clone()).is_empty());
    assert!(run(&SuccessResponse, &oas3, &json!({ "302": {} }), at.clone()).is_empty());
    assert_eq!(run(&SuccessResponse, &oas2, &json!({ "2XX": {} }), at.clone()).len(), 1);

    let diagnostics = run(&SuccessResponse, &oas3, &json!({ "400": {}, "default": {} }), at);
    assert_eq!(located(&diagnostics), vec!["paths./a.get.responses"]);
}

#[test]
fn test_discriminator_reports_both_conditions() {
    let document = json!({ "swagger": "2.0" });
    let at = JsonPath::from_segments(["definitions", "Pet"]);

    let schema = json!({ "discriminator": "kind", "properties": { "name": {} } });
    let diagnostics = run(&OasDiscriminator, &document, &schema, at.clone());
    assert_eq!(
        located(&diagnostics),
        vec!["definitions.Pet.properties", "definitions.Pet.required"]
    );

    let schema = json!({
        "discriminator": "kind",
        "properties": { "kind": {} },
        "required": ["kind"]
    });
    assert!(run(&OasDiscriminator, &document, &schema, at).is_empty());
}

#[test]
fn test_tags_must_be_global() {
    let document = json!({
        "tags": [{ "name": "pets" }],
        "paths": { "/a": { "get": { "tags": ["pets", "stores", 3] } } }
    });

    let diagnostics = run(&TagDefined, &document, &document, JsonPath::root());
    assert_eq!(
        located(&diagnostics),
        vec!["paths./a.get.tags[1]", "paths./a.get.tags[2]"]
    );
}

#[test]
fn test_security_requirements_name_defined_schemes() {
    let document = json!({
        "swagger": "2.0",
        "securityDefinitions": { "apiKey": {} },
        "security": [{ "apiKey": [] }, { "basic": [] }],
        "paths": { "/a": { "get": { "security": [{ "oauth": ["read"], "apiKey": [] }] } } }
    });

    let check = SecurityDefined::new(["securityDefinitions"]);
    let diagnostics = run(&check, &document, &document, JsonPath::root());

    assert_eq!(
        located(&diagnostics),
        vec!["security[1].basic", "paths./a.get.security[0].oauth"]
    );
    assert_eq!(
        diagnostics[0].message,
        "API \"security\" values must match a scheme defined in the \"securityDefinitions\" object."
    );
    assert!(diagnostics[1].message.starts_with("Operation \"security\""));
}
