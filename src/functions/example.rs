//! Example and default values checked against their schema.

use std::borrow::Cow;

use serde_json::Value;

use super::schema::validate_schema_object;
use super::RuleFunction;
use crate::context::RuleContext;
use crate::path::JsonPath;
use crate::{check_result, CheckResult};

/// Which kind of node carries the examples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExampleKind {
    /// A Schema Object whose `example` / `default` must satisfy itself.
    Schema,
    /// A media-type-like node whose `example(s)` must satisfy its `schema`.
    Media,
}

/// A value extracted from the document, ready for validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationItem<'a> {
    /// The value to validate.
    pub value: &'a Value,
    /// Where the value lives in the document.
    pub path: JsonPath,
}

fn schema_fields(oas_version: u8) -> &'static [&'static str] {
    if oas_version == 2 {
        &["example", "x-example", "default"]
    } else {
        &["example", "default"]
    }
}

struct MediaField {
    name: &'static str,
    multiple: bool,
    keyed: bool,
}

fn media_fields(oas_version: u8) -> &'static [MediaField] {
    const OAS2: [MediaField; 1] = [MediaField {
        name: "examples",
        multiple: true,
        keyed: false,
    }];
    const OAS3: [MediaField; 2] = [
        MediaField {
            name: "example",
            multiple: false,
            keyed: false,
        },
        MediaField {
            name: "examples",
            multiple: true,
            keyed: true,
        },
    ];
    if oas_version == 2 {
        &OAS2
    } else {
        &OAS3
    }
}

/// Yields the example-like fields present on a schema node.
///
/// ```rust
/// use oaslint::{schema_items, JsonPath};
/// use serde_json::json;
///
/// let schema = json!({ "type": "integer", "example": 1, "x-example": 2, "default": 3 });
/// let base = JsonPath::from_field("schema");
///
/// let oas2: Vec<_> = schema_items(&schema, &base, 2).map(|i| i.path.to_string()).collect();
/// assert_eq!(oas2, vec!["schema.example", "schema.x-example", "schema.default"]);
/// assert_eq!(schema_items(&schema, &base, 3).count(), 2);
/// ```
pub fn schema_items<'a>(
    target: &'a Value,
    base: &'a JsonPath,
    oas_version: u8,
) -> impl Iterator<Item = ValidationItem<'a>> + 'a {
    schema_fields(oas_version).iter().filter_map(move |field| {
        target.get(*field).map(|value| ValidationItem {
            value,
            path: base.push_field(*field),
        })
    })
}

/// Yields the examples of a media-type-like node.
///
/// Fields are tried in order and only the first usable one is read: a
/// single `example`, or every entry of an `examples` map. Under OpenAPI 3 the
/// map entries are Example Objects, so their `value` is yielded and entries
/// that use `externalValue` are skipped.
pub fn media_items<'a>(
    target: &'a Value,
    base: &'a JsonPath,
    oas_version: u8,
) -> impl Iterator<Item = ValidationItem<'a>> + 'a {
    let chosen = media_fields(oas_version).iter().find_map(|field| {
        let value = target.get(field.name)?;
        if field.multiple && !value.is_object() {
            None
        } else {
            Some((field, value))
        }
    });

    chosen.into_iter().flat_map(move |(field, value)| {
        let single = (!field.multiple).then(|| ValidationItem {
            value,
            path: base.push_field(field.name),
        });

        let entries = value
            .as_object()
            .filter(|_| field.multiple)
            .into_iter()
            .flat_map(|entries| entries.iter())
            .filter_map(move |(key, entry)| {
                let path = base.push_field(field.name).push_field(key.clone());
                if !field.keyed {
                    return Some(ValidationItem { value: entry, path });
                }
                if !entry.is_object() || entry.get("externalValue").is_some() {
                    return None;
                }
                entry.get("value").map(|value| ValidationItem {
                    value,
                    path: path.push_field("value"),
                })
            });

        single.into_iter().chain(entries)
    })
}

/// Checks examples and defaults against the schema they illustrate.
///
/// `schema_field` names the member of the target holding the schema; `$`
/// means the target itself.
///
/// # Example
///
/// ```rust
/// use oaslint::{ExampleKind, JsonPath, JsonSchemaEngine, OasExample, RuleContext, RuleFunction};
/// use serde_json::json;
///
/// let document = json!({ "openapi": "3.0.0" });
/// let engine = JsonSchemaEngine::new();
/// let ctx = RuleContext::new(&document, &engine).at(JsonPath::from_field("media"));
///
/// let media = json!({ "schema": { "type": "string" }, "example": 42 });
/// let check = OasExample::new(ExampleKind::Media, 3, "schema");
///
/// assert!(check.check(&media, &ctx).is_failure());
/// ```
#[derive(Debug, Clone)]
pub struct OasExample {
    kind: ExampleKind,
    oas_version: u8,
    schema_field: String,
}

impl OasExample {
    /// Creates an example checker.
    pub fn new(kind: ExampleKind, oas_version: u8, schema_field: impl Into<String>) -> Self {
        Self {
            kind,
            oas_version,
            schema_field: schema_field.into(),
        }
    }
}

impl RuleFunction for OasExample {
    fn check(&self, target: &Value, ctx: &RuleContext<'_>) -> CheckResult {
        let schema = if self.schema_field == "$" {
            Some(target)
        } else {
            target.get(&self.schema_field)
        };
        let Some(schema) = schema.filter(|s| s.is_object() || s.is_boolean()) else {
            return check_result(Vec::new());
        };

        // boolean `required` is a 2.0 parameter flag, not the JSON-Schema keyword
        let schema = match schema.as_object() {
            Some(map)
                if self.oas_version == 2 && map.get("required").is_some_and(Value::is_boolean) =>
            {
                let mut copy = map.clone();
                copy.remove("required");
                Cow::Owned(Value::Object(copy))
            }
            _ => Cow::Borrowed(schema),
        };

        let base = ctx.path().clone();
        let items: Vec<ValidationItem<'_>> = match self.kind {
            ExampleKind::Schema => schema_items(target, &base, self.oas_version).collect(),
            ExampleKind::Media => media_items(target, &base, self.oas_version).collect(),
        };

        let diagnostics = items
            .into_iter()
            .flat_map(|item| validate_schema_object(&schema, item.value, &ctx.at(item.path)))
            .collect();
        check_result(diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn paths<'a>(items: impl Iterator<Item = ValidationItem<'a>>) -> Vec<String> {
        items.map(|i| i.path.to_string()).collect()
    }

    #[test]
    fn test_media_items_oas3_single_wins() {
        let media = json!({ "schema": {}, "example": 1, "examples": { "a": { "value": 2 } } });
        let base = JsonPath::from_field("m");
        assert_eq!(paths(media_items(&media, &base, 3)), vec!["m.example"]);
    }

    #[test]
    fn test_media_items_oas3_keyed_examples() {
        let media = json!({
            "schema": {},
            "examples": {
                "a": { "value": 1 },
                "b": { "externalValue": "http://x" },
                "c": "not an example object",
                "d": { "summary": "no value" }
            }
        });
        let base = JsonPath::from_field("m");
        assert_eq!(paths(media_items(&media, &base, 3)), vec!["m.examples.a.value"]);
    }

    #[test]
    fn test_media_items_oas2_examples_are_raw() {
        let media = json!({ "schema": {}, "examples": { "application/json": { "id": 1 } } });
        let base = JsonPath::from_field("r");
        let items: Vec<_> = media_items(&media, &base, 2).collect();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].value, &json!({ "id": 1 }));
        assert_eq!(items[0].path.to_string(), "r.examples.application/json");
    }

    #[test]
    fn test_media_items_skip_non_object_examples() {
        let media = json!({ "schema": {}, "examples": [1, 2] });
        let base = JsonPath::root();
        assert_eq!(media_items(&media, &base, 3).count(), 0);
    }
}
