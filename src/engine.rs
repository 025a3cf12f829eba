//! JSON-Schema evaluation service.
//!
//! Rule functions never talk to a JSON-Schema implementation directly. They go
//! through [`SchemaEngine`], which compiles a schema under a [`Dialect`],
//! evaluates an instance in "report all errors" mode, and hands back
//! engine-neutral [`RawError`]s for the post-processor in [`crate::results`].

use std::collections::HashMap;
use std::sync::Arc;

use jsonschema::output::{ErrorDescription, OutputUnit};
use jsonschema::{BasicOutput, Draft, Validator};
use parking_lot::RwLock;
use percent_encoding::percent_decode_str;
use serde_json::Value;

use crate::error::LintError;
use crate::format::Dialect;
use crate::path::{JsonPath, PathSegment};

/// One raw failure reported by the JSON-Schema engine.
///
/// Paths are relative: `instance_path` to the validated instance and
/// `schema_path` to the schema root.
#[derive(Debug, Clone, PartialEq)]
pub struct RawError {
    /// The failing keyword (`type`, `required`, `oneOf`, ...).
    pub keyword: String,
    /// Location of the offending value inside the instance.
    pub instance_path: JsonPath,
    /// Location of the failing keyword inside the schema.
    pub schema_path: JsonPath,
    /// Engine-provided message.
    pub message: String,
    /// For `additionalProperties`: the unexpected key.
    pub additional_property: Option<String>,
    /// For `required`: the missing key.
    pub missing_property: Option<String>,
}

impl RawError {
    /// Creates a raw error for `keyword` at `instance_path`.
    pub fn new(
        keyword: impl Into<String>,
        instance_path: JsonPath,
        message: impl Into<String>,
    ) -> Self {
        Self {
            keyword: keyword.into(),
            instance_path,
            schema_path: JsonPath::root(),
            message: message.into(),
            additional_property: None,
            missing_property: None,
        }
    }

    /// Sets the schema path and returns self for chaining.
    pub fn with_schema_path(mut self, schema_path: JsonPath) -> Self {
        self.schema_path = schema_path;
        self
    }

    /// Sets the unexpected property and returns self for chaining.
    pub fn with_additional_property(mut self, property: impl Into<String>) -> Self {
        self.additional_property = Some(property.into());
        self
    }

    /// Sets the missing property and returns self for chaining.
    pub fn with_missing_property(mut self, property: impl Into<String>) -> Self {
        self.missing_property = Some(property.into());
        self
    }
}

/// A JSON-Schema compiling and evaluating service.
///
/// Implementations must be deterministic: the same inputs yield the same
/// errors in the same order.
pub trait SchemaEngine: Send + Sync {
    /// Validates `instance` against `schema` under `dialect`, reporting all errors.
    ///
    /// Failed `oneOf`/`anyOf` alternatives are reported through the errors of
    /// each branch, in branch order.
    ///
    /// # Errors
    ///
    /// Returns `LintError::SchemaCompile` when the schema itself is unusable.
    fn evaluate(
        &self,
        dialect: Dialect,
        schema: &Value,
        instance: &Value,
    ) -> Result<Vec<RawError>, LintError>;
}

type ValidatorCache = Arc<RwLock<HashMap<(Dialect, String), Arc<Validator>>>>;

/// [`SchemaEngine`] backed by the `jsonschema` crate.
///
/// Schemas that carry an `$id` (the canonical OpenAPI schemas among them) are
/// compiled once and cached; anonymous sub-schemas are compiled per call.
#[derive(Clone, Default)]
pub struct JsonSchemaEngine {
    cache: ValidatorCache,
}

impl JsonSchemaEngine {
    /// Creates an engine with an empty compile cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of compiled validators currently cached.
    pub fn cached(&self) -> usize {
        self.cache.read().len()
    }

    fn compiled(&self, dialect: Dialect, schema: &Value) -> Result<Arc<Validator>, LintError> {
        let id = schema.get("$id").and_then(Value::as_str).map(str::to_owned);

        if let Some(id) = &id {
            if let Some(validator) = self.cache.read().get(&(dialect, id.clone())) {
                tracing::debug!(%dialect, id = %id, "schema validator served from cache");
                return Ok(Arc::clone(validator));
            }
        }

        let validator = Arc::new(compile(dialect, schema)?);

        if let Some(id) = id {
            tracing::debug!(%dialect, id = %id, "compiled schema validator");
            self.cache
                .write()
                .entry((dialect, id))
                .or_insert_with(|| Arc::clone(&validator));
        }

        Ok(validator)
    }
}

impl SchemaEngine for JsonSchemaEngine {
    fn evaluate(
        &self,
        dialect: Dialect,
        schema: &Value,
        instance: &Value,
    ) -> Result<Vec<RawError>, LintError> {
        let validator = self.compiled(dialect, schema)?;
        let BasicOutput::Invalid(units) = validator.apply(instance).basic() else {
            return Ok(Vec::new());
        };
        Ok(units
            .iter()
            .flat_map(|unit| convert(unit, schema, instance))
            .collect())
    }
}

fn draft_for(dialect: Dialect) -> Option<Draft> {
    match dialect {
        Dialect::Auto => None,
        Dialect::Draft4 => Some(Draft::Draft4),
        Dialect::Draft6 => Some(Draft::Draft6),
        Dialect::Draft7 => Some(Draft::Draft7),
        Dialect::Draft201909 => Some(Draft::Draft201909),
        Dialect::Draft202012 => Some(Draft::Draft202012),
    }
}

fn compile(dialect: Dialect, schema: &Value) -> Result<Validator, LintError> {
    let compiled = match draft_for(dialect) {
        Some(draft) => jsonschema::options().with_draft(draft).build(schema),
        None => jsonschema::validator_for(schema),
    };

    compiled.map_err(|error| {
        tracing::warn!(%dialect, %error, "schema failed to compile");
        LintError::SchemaCompile {
            dialect: dialect.to_string(),
            message: error.to_string(),
        }
    })
}

fn convert(unit: &OutputUnit<ErrorDescription>, schema: &Value, instance: &Value) -> Vec<RawError> {
    let keyword_location = unit.keyword_location().as_str();
    let instance_path = JsonPath::from_pointer(unit.instance_location().as_str(), instance);
    let schema_path = schema_location(schema, keyword_location)
        .unwrap_or_else(|| JsonPath::from_pointer(keyword_location, schema));
    let keyword = keyword_location
        .rsplit('/')
        .next()
        .map(unescape)
        .unwrap_or_default();
    let message = unit.error_description().to_string();
    let base = RawError::new(keyword, instance_path, message).with_schema_path(schema_path);

    if base.keyword == "additionalProperties" {
        let unexpected = unexpected_keys(&base.message, base.instance_path.resolve(instance));
        if !unexpected.is_empty() {
            return unexpected
                .into_iter()
                .map(|property| base.clone().with_additional_property(property))
                .collect();
        }
    }
    if base.keyword == "required" {
        if let Some(property) = missing_property(&base.message) {
            return vec![base.with_missing_property(property)];
        }
    }
    vec![base]
}

/// Keys of `object` named by an "additional properties" message.
///
/// A bare `additionalProperties: false` is reported as a false schema without
/// a key list; every member is unexpected then.
fn unexpected_keys(message: &str, object: Option<&Value>) -> Vec<String> {
    let Some(Value::Object(members)) = object else {
        return Vec::new();
    };
    let listed = message.starts_with("Additional properties are not allowed (");
    members
        .keys()
        .filter(|key| !listed || message.contains(&format!("'{}'", key)))
        .cloned()
        .collect()
}

fn missing_property(message: &str) -> Option<String> {
    let quoted = message.strip_suffix(" is a required property")?;
    serde_json::from_str(quoted).ok()
}

fn unescape(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

const REFERENCE_KEYWORDS: [&str; 3] = ["$ref", "$dynamicRef", "$recursiveRef"];

/// Maps an evaluation path such as `/properties/info/$ref/required` onto the
/// schema document, following local references along the way.
///
/// Returns `None` when a reference leaves the schema document.
fn schema_location(schema: &Value, keyword_location: &str) -> Option<JsonPath> {
    let mut path = JsonPath::root();
    for token in keyword_location.split('/').skip(1).map(unescape) {
        let node = path.resolve(schema)?;
        if REFERENCE_KEYWORDS.contains(&token.as_str()) {
            let reference = node.get(&token)?.as_str()?;
            path = reference_target(schema, reference)?;
            continue;
        }
        let segment = match (node, token.parse::<usize>()) {
            (Value::Array(_), Ok(index)) => PathSegment::Index(index),
            _ => PathSegment::Field(token),
        };
        path = path.push(segment);
    }
    Some(path)
}

fn reference_target(schema: &Value, reference: &str) -> Option<JsonPath> {
    let (base, fragment) = reference.split_once('#').unwrap_or((reference, ""));
    if !base.is_empty() && schema.get("$id").and_then(Value::as_str) != Some(base) {
        return None;
    }
    let fragment = percent_decode_str(fragment).decode_utf8().ok()?;
    if fragment.is_empty() {
        return Some(JsonPath::root());
    }
    if fragment.starts_with('/') {
        let path = JsonPath::from_pointer(&fragment, schema);
        return path.resolve(schema).map(|_| path);
    }
    find_anchor(schema, &JsonPath::root(), &fragment)
}

fn find_anchor(node: &Value, path: &JsonPath, anchor: &str) -> Option<JsonPath> {
    match node {
        Value::Object(members) => {
            let named = ["$anchor", "$dynamicAnchor", "$recursiveAnchor"]
                .iter()
                .any(|key| members.get(*key).and_then(Value::as_str) == Some(anchor));
            if named {
                return Some(path.clone());
            }
            members
                .iter()
                .find_map(|(key, child)| find_anchor(child, &path.push_field(key.clone()), anchor))
        }
        Value::Array(items) => items
            .iter()
            .enumerate()
            .find_map(|(index, child)| find_anchor(child, &path.push_index(index), anchor)),
        _ => None,
    }
}
