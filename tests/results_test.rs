//! Tests for the raw error post-processor.

use oaslint::{apply_manual_replacements, prepare_results, Diagnostic, JsonPath, RawError};
use pretty_assertions::assert_eq;

fn at(segments: &[&str]) -> JsonPath {
    JsonPath::from_segments(segments.iter().copied())
}

fn located(errors: &[RawError]) -> Vec<(String, String)> {
    errors
        .iter()
        .map(|e| (e.instance_path.to_string(), e.keyword.clone()))
        .collect()
}

#[test]
fn test_extra_keys_become_distinct_locations() {
    let mut errors = vec![
        RawError::new("additionalProperties", JsonPath::root(), "extra")
            .with_additional_property("foo"),
        RawError::new("additionalProperties", JsonPath::root(), "extra")
            .with_additional_property("bar"),
    ];
    prepare_results(&mut errors);

    assert_eq!(
        located(&errors),
        vec![
            ("bar".to_string(), "additionalProperties".to_string()),
            ("foo".to_string(), "additionalProperties".to_string())
        ]
    );
}

#[test]
fn test_children_sort_before_parents() {
    let mut errors = vec![
        RawError::new("required", at(&["info"]), "missing"),
        RawError::new("type", at(&["info", "contact", "email"]), "type"),
        RawError::new("type", at(&["info", "contact"]), "type"),
    ];
    prepare_results(&mut errors);

    assert_eq!(
        located(&errors),
        vec![
            ("info.contact.email".to_string(), "type".to_string()),
            ("info.contact".to_string(), "type".to_string()),
            ("info".to_string(), "required".to_string())
        ]
    );
}

#[test]
fn test_one_of_explained_by_branch_error_is_dropped() {
    let response = at(&["paths", "/a", "get", "responses", "200"]);
    let mut errors = vec![
        RawError::new("oneOf", response.clone(), "must match exactly one schema in oneOf"),
        RawError::new("required", response.clone(), "must have required property '$ref'")
            .with_missing_property("$ref"),
        RawError::new("type", response.push_field("description"), "type must be string"),
    ];
    prepare_results(&mut errors);

    assert_eq!(
        located(&errors),
        vec![("paths./a.get.responses.200.description".to_string(), "type".to_string())]
    );
}

#[test]
fn test_unrelated_errors_survive() {
    let mut errors = vec![
        RawError::new("type", at(&["info", "title"]), "type"),
        RawError::new("oneOf", at(&["paths", "/a"]), "oneOf"),
        RawError::new("required", at(&["servers"]), "missing").with_missing_property("url"),
    ];
    prepare_results(&mut errors);
    assert_eq!(errors.len(), 3);
}

#[test]
fn test_empty_list_is_untouched() {
    let mut errors: Vec<RawError> = Vec::new();
    prepare_results(&mut errors);
    assert!(errors.is_empty());
}

#[test]
fn test_manual_replacements_match_whole_location() {
    let mut diagnostics = vec![
        Diagnostic::new(
            at(&["components", "securitySchemes", "key"]),
            "must match exactly one schema in oneOf",
        ),
        Diagnostic::new(
            at(&["components", "securitySchemes", "key", "in"]),
            "must be equal to one of the allowed values",
        ),
        Diagnostic::new(at(&["components", "schemas", "key"]), "type must be object"),
    ];
    apply_manual_replacements(&mut diagnostics);

    let messages: Vec<&str> = diagnostics.iter().map(|d| d.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "Invalid security scheme",
            "must be equal to one of the allowed values",
            "type must be object"
        ]
    );
}
