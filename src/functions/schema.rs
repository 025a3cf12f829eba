//! Dialect-aware validation of a value against a Schema Object.

use std::borrow::Cow;

use serde_json::Value;

use super::RuleFunction;
use crate::context::RuleContext;
use crate::engine::RawError;
use crate::error::Diagnostic;
use crate::format::{extract_draft_version, Dialect, DocFormat};
use crate::results::{evaluate_schema, SchemaRun};
use crate::{check_result, CheckResult};

/// Validates the target against a fixed schema, picking the JSON-Schema
/// dialect from the document format.
///
/// | Format  | Dialect                                              |
/// |---------|------------------------------------------------------|
/// | 3.1     | `jsonSchemaDialect` if recognized, else 2020-12      |
/// | 3.0     | draft-04, `nullable` honored in type messages        |
/// | 2.0     | draft-04 on a copy with `x-nullable` turned into `nullable` |
/// | unknown | inferred from the schema                             |
///
/// # Example
///
/// ```rust
/// use oaslint::{JsonSchemaEngine, OasSchema, RuleContext, RuleFunction};
/// use serde_json::json;
///
/// let document = json!({ "openapi": "3.0.0" });
/// let engine = JsonSchemaEngine::new();
/// let ctx = RuleContext::new(&document, &engine);
///
/// let unique = OasSchema::new(json!({ "type": "array", "uniqueItems": true }));
/// assert!(unique.check(&json!(["a", "b"]), &ctx).is_success());
/// assert!(unique.check(&json!(["a", "a"]), &ctx).is_failure());
/// ```
#[derive(Debug, Clone)]
pub struct OasSchema {
    schema: Value,
}

impl OasSchema {
    /// Creates a validator for `schema`.
    pub fn new(schema: Value) -> Self {
        Self { schema }
    }

    /// The schema values are checked against.
    pub fn schema(&self) -> &Value {
        &self.schema
    }
}

impl RuleFunction for OasSchema {
    fn check(&self, target: &Value, ctx: &RuleContext<'_>) -> CheckResult {
        check_result(validate_schema_object(&self.schema, target, ctx))
    }
}

/// Validates `target` against `schema` under the dialect of the document.
pub(crate) fn validate_schema_object(
    schema: &Value,
    target: &Value,
    ctx: &RuleContext<'_>,
) -> Vec<Diagnostic> {
    let (dialect, schema, nullable) = match ctx.format() {
        None => (Dialect::Auto, Cow::Borrowed(schema), false),
        Some(DocFormat::V31) => {
            let dialect = ctx
                .document()
                .get("jsonSchemaDialect")
                .and_then(Value::as_str)
                .and_then(extract_draft_version)
                .unwrap_or(Dialect::Draft202012);
            (dialect, Cow::Borrowed(schema), false)
        }
        Some(DocFormat::V30) => (Dialect::Draft4, Cow::Borrowed(schema), true),
        Some(DocFormat::V2) => {
            let mut copy = schema.clone();
            convert_x_nullable(&mut copy);
            (Dialect::Draft4, Cow::Owned(copy), true)
        }
    };

    let hook = |errors: &mut Vec<RawError>| rewrite_nullable(&schema, errors);
    let mut run = SchemaRun::new(&schema).dialect(dialect);
    if nullable {
        run = run.prepare(&hook);
    }
    evaluate_schema(target, run, ctx)
}

/// Appends `,null` to `type` messages raised by a sub-schema marked
/// `nullable: true`.
///
/// draft-04 has no notion of `nullable`, so without this a `null` accepted
/// by the document would be missing from the explanation.
pub fn rewrite_nullable(schema: &Value, errors: &mut [RawError]) {
    for error in errors.iter_mut().filter(|e| e.keyword == "type") {
        let owner = error.schema_path.parent().and_then(|p| p.resolve(schema));
        if owner.and_then(|o| o.get("nullable")) == Some(&Value::Bool(true)) {
            error.message.push_str(",null");
        }
    }
}

const SUBSCHEMA_KEYWORDS: [&str; 11] = [
    "items",
    "additionalItems",
    "additionalProperties",
    "not",
    "contains",
    "propertyNames",
    "if",
    "then",
    "else",
    "unevaluatedItems",
    "unevaluatedProperties",
];

const SUBSCHEMA_LIST_KEYWORDS: [&str; 5] = ["allOf", "anyOf", "oneOf", "items", "prefixItems"];

const SUBSCHEMA_MAP_KEYWORDS: [&str; 6] = [
    "properties",
    "patternProperties",
    "definitions",
    "$defs",
    "dependencies",
    "dependentSchemas",
];

/// Rewrites `x-nullable: true` into `nullable: true` on every schema node,
/// in place.
///
/// Only schema positions are visited, so a property literally named
/// `x-nullable` inside `properties` is left alone.
///
/// ```rust
/// use oaslint::convert_x_nullable;
/// use serde_json::json;
///
/// let mut schema = json!({
///     "type": "object",
///     "properties": { "name": { "type": "string", "x-nullable": true } }
/// });
/// convert_x_nullable(&mut schema);
///
/// assert_eq!(schema["properties"]["name"], json!({ "type": "string", "nullable": true }));
/// ```
pub fn convert_x_nullable(schema: &mut Value) {
    let Some(node) = schema.as_object_mut() else {
        return;
    };

    if node.get("x-nullable") == Some(&Value::Bool(true)) {
        node.remove("x-nullable");
        node.insert("nullable".to_string(), Value::Bool(true));
    }

    for keyword in SUBSCHEMA_KEYWORDS {
        if let Some(child) = node.get_mut(keyword) {
            convert_x_nullable(child);
        }
    }
    for keyword in SUBSCHEMA_LIST_KEYWORDS {
        if let Some(Value::Array(children)) = node.get_mut(keyword) {
            children.iter_mut().for_each(convert_x_nullable);
        }
    }
    for keyword in SUBSCHEMA_MAP_KEYWORDS {
        if let Some(Value::Object(children)) = node.get_mut(keyword) {
            children.values_mut().for_each(convert_x_nullable);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::JsonSchemaEngine;
    use crate::path::JsonPath;
    use serde_json::json;

    #[test]
    fn test_convert_x_nullable_is_recursive() {
        let mut schema = json!({
            "allOf": [{ "x-nullable": true }],
            "items": { "x-nullable": false },
            "properties": { "x-nullable": { "type": "boolean" } }
        });
        convert_x_nullable(&mut schema);

        assert_eq!(schema["allOf"][0], json!({ "nullable": true }));
        assert_eq!(schema["items"], json!({ "x-nullable": false }));
        assert_eq!(schema["properties"]["x-nullable"], json!({ "type": "boolean" }));
    }

    #[test]
    fn test_rewrite_nullable_only_touches_nullable_owners() {
        let schema = json!({
            "properties": {
                "a": { "type": "string", "nullable": true },
                "b": { "type": "string" }
            }
        });
        let at = |s: &[&str]| JsonPath::from_segments(s.iter().copied());
        let mut errors = vec![
            RawError::new("type", at(&["a"]), "type must be string")
                .with_schema_path(at(&["properties", "a", "type"])),
            RawError::new("type", at(&["b"]), "type must be string")
                .with_schema_path(at(&["properties", "b", "type"])),
        ];
        rewrite_nullable(&schema, &mut errors);

        assert_eq!(errors[0].message, "type must be string,null");
        assert_eq!(errors[1].message, "type must be string");
    }

    #[test]
    fn test_oas2_honors_x_nullable() {
        let document = json!({ "swagger": "2.0" });
        let engine = JsonSchemaEngine::new();
        let ctx = RuleContext::new(&document, &engine).at(JsonPath::from_field("example"));

        let schema = json!({ "type": "string", "x-nullable": true });
        let diagnostics = validate_schema_object(&schema, &json!(12), &ctx);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "\"example\" property type must be string,null");
        assert_eq!(schema["x-nullable"], json!(true));
    }
}
