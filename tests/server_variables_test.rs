//! Tests for Server Object variable checks.

use oaslint::{
    encode_uri, Diagnostic, JsonPath, JsonSchemaEngine, RuleContext, RuleFunction, ServerVariables,
    Substitutions,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use stillwater::Validation;

fn check(function: ServerVariables, server: &Value) -> Vec<Diagnostic> {
    let document = json!({ "openapi": "3.0.3" });
    let engine = JsonSchemaEngine::new();
    let ctx = RuleContext::new(&document, &engine)
        .at(JsonPath::from_field("servers").push_index(0));
    match function.check(server, &ctx) {
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

#[test]
fn test_well_formed_server_is_clean() {
    let server = json!({
        "url": "https://{env}.example.com:{port}/v1",
        "variables": {
            "env": { "default": "prod", "enum": ["prod", "staging"] },
            "port": { "default": "443" }
        }
    });
    assert!(check(ServerVariables::new().check_substitutions(true), &server).is_empty());
}

#[test]
fn test_unused_variable() {
    let server = json!({
        "url": "https://api.{region}.x.com",
        "variables": { "region": { "default": "us" }, "port": { "default": "8080" } }
    });

    assert_eq!(
        summary(&check(ServerVariables::new(), &server)),
        vec![(
            "servers[0].variables.port".to_string(),
            "Server's \"variables\" object has unused defined \"port\" url variable.".to_string()
        )]
    );
}

#[test]
fn test_missing_variables_are_listed() {
    let server = json!({
        "url": "https://{a}.{b}.{c}.com",
        "variables": { "b": { "default": "x" } }
    });

    assert_eq!(
        summary(&check(ServerVariables::new(), &server)),
        vec![(
            "servers[0].variables".to_string(),
            "Not all server's variables are described with \"variables\" object. Missed: a, c."
                .to_string()
        )]
    );
}

#[test]
fn test_default_outside_enum() {
    let server = json!({
        "url": "https://{env}.x.com",
        "variables": { "env": { "default": "dev", "enum": ["prod", "staging"] } }
    });

    assert_eq!(
        summary(&check(ServerVariables::new(), &server)),
        vec![(
            "servers[0].variables.env.default".to_string(),
            "Server Variable \"env\" has a default not listed in the enum".to_string()
        )]
    );
}

#[test]
fn test_invalid_substitution() {
    let server = json!({
        "url": "https://x.com:{port}",
        "variables": { "port": { "default": "8o80" } }
    });

    assert_eq!(
        summary(&check(ServerVariables::new().check_substitutions(true), &server)),
        vec![(
            "servers[0].variables".to_string(),
            "A few substitutions of server variables resulted in invalid URLs: https://x.com:8o80"
                .to_string()
        )]
    );
    assert!(check(ServerVariables::new(), &server).is_empty());
}

#[test]
fn test_invalid_substitutions_are_capped() {
    let ports: Vec<String> = (0..20).map(|i| format!("p{}", i)).collect();
    let server = json!({
        "url": "https://x.com:{port}",
        "variables": { "port": { "default": "p0", "enum": ports } }
    });

    let diagnostics = check(ServerVariables::new().check_substitutions(true), &server);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].message,
        "At least 5 substitutions of server variables resulted in invalid URLs: \
         https://x.com:p0, https://x.com:p1, https://x.com:p2, https://x.com:p3, https://x.com:p4 and more"
    );
}

#[test]
fn test_url_must_be_a_string() {
    let diagnostics = check(ServerVariables::new(), &json!({ "url": 42 }));
    assert_eq!(
        summary(&diagnostics),
        vec![("servers[0]".to_string(), "Invalid Server Object".to_string())]
    );
}

#[test]
fn test_malformed_server_shapes_are_rejected() {
    let malformed = [
        json!("https://x.com"),
        json!({ "variables": {} }),
        json!({ "url": "https://{v}.x.com", "variables": [] }),
        json!({ "url": "https://{v}.x.com", "variables": { "v": "a" } }),
        json!({ "url": "https://{v}.x.com", "variables": { "v": { "enum": [1, 2] } } }),
        json!({ "url": "https://{v}.x.com", "variables": { "v": { "default": 1 } } }),
        json!({
            "url": "https://{v}.x.com",
            "variables": { "v": { "enum": ["a", "b"], "bogus": true } }
        }),
    ];

    for server in &malformed {
        assert_eq!(
            summary(&check(ServerVariables::new().check_substitutions(true), server)),
            vec![("servers[0]".to_string(), "Invalid Server Object".to_string())],
            "{}",
            server
        );
    }
}

#[test]
fn test_variable_extensions_and_descriptions_are_allowed() {
    let server = json!({
        "url": "https://{v}.x.com",
        "variables": {
            "v": { "default": "a", "description": "region", "x-internal": { "owner": "ops" } }
        }
    });
    assert!(check(ServerVariables::new().check_substitutions(true), &server).is_empty());
}

#[test]
fn test_substitutions_follow_declaration_order() {
    let server = json!({
        "url": "https://{host}:{port}",
        "variables": {
            "port": { "default": "1x", "enum": ["1x", "2x"] },
            "host": { "default": "a", "enum": ["a", "b", "c"] }
        }
    });

    let diagnostics = check(ServerVariables::new().check_substitutions(true), &server);
    assert_eq!(
        summary(&diagnostics),
        vec![(
            "servers[0].variables".to_string(),
            "At least 5 substitutions of server variables resulted in invalid URLs: \
             https://a:1x, https://b:1x, https://c:1x, https://a:2x, https://b:2x and more"
                .to_string()
        )]
    );
}

#[test]
fn test_server_without_variables_is_skipped() {
    let server = json!({ "url": "https://{undeclared}.x.com" });
    assert!(check(ServerVariables::new().check_substitutions(true), &server).is_empty());
}

#[test]
fn test_encode_uri_keeps_reserved_characters() {
    assert_eq!(encode_uri("a/b?c=d&e#f"), "a/b?c=d&e#f");
    assert_eq!(encode_uri("50%"), "50%25");
}

#[test]
fn test_substitutions_walk_last_variable_fastest() {
    let urls: Vec<String> = Substitutions::new(
        "{a}-{b}",
        vec![
            ("a".to_string(), vec!["1".to_string(), "2".to_string()]),
            ("b".to_string(), vec!["x".to_string(), "y".to_string()]),
        ],
    )
    .collect();
    assert_eq!(urls, vec!["1-x", "1-y", "2-x", "2-y"]);
}
