//! Turning raw JSON-Schema output into diagnostics.
//!
//! A validator asked to report every error explains one mistake inside a
//! `oneOf` several times over, once per failed branch and sometimes once more
//! for the `oneOf` itself. [`prepare_results`] collapses that into one
//! diagnostic per real mistake. [`evaluate_schema`] is the full pipeline used by the
//! schema-backed rule functions: evaluate, describe, post-process, locate.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::context::RuleContext;
use crate::engine::RawError;
use crate::error::{Diagnostic, LintError};
use crate::format::Dialect;
use crate::path::{JsonPath, PathSegment};

/// A post-processing hook applied to raw errors before they become diagnostics.
pub type PrepareResults<'a> = &'a dyn Fn(&mut Vec<RawError>);

/// Removes redundant errors from a raw error list, in place.
///
/// 1. `additionalProperties` errors are relocated onto the unexpected key, so
///    two extra keys on one object stay distinct.
/// 2. Errors are ordered by location, descendants before ancestors, keeping
///    the engine's order within one location.
/// 3. Of consecutive errors at the same location only the first is kept.
/// 4. A `oneOf` failure, or a complaint about a missing `$ref`, is dropped
///    when the error before it sits at or below its location.
///
/// Rule 4 is approximate for `oneOf` lists with more than two branches: the
/// first reported branch failure is the one that survives.
///
/// # Example
///
/// ```rust
/// use oaslint::{prepare_results, JsonPath, RawError};
///
/// let at = |segments: &[&str]| JsonPath::from_segments(segments.iter().copied());
/// let mut errors = vec![
///     RawError::new("required", at(&["info"]), "must have required property 'title'"),
///     RawError::new("type", at(&["info"]), "must be object"),
///     RawError::new("oneOf", at(&[]), "must match exactly one schema in oneOf"),
/// ];
///
/// prepare_results(&mut errors);
/// assert_eq!(errors.len(), 1);
/// assert_eq!(errors[0].keyword, "required");
/// ```
pub fn prepare_results(errors: &mut Vec<RawError>) {
    for error in errors.iter_mut() {
        if error.keyword == "additionalProperties" {
            if let Some(property) = &error.additional_property {
                error.instance_path = error.instance_path.push_field(property.clone());
            }
        }
    }

    errors.sort_by(|a, b| a.instance_path.post_order_cmp(&b.instance_path));

    let mut i = 0;
    while i < errors.len() {
        if i + 1 < errors.len() && errors[i + 1].instance_path == errors[i].instance_path {
            errors.remove(i + 1);
        } else if i > 0
            && should_ignore(&errors[i])
            && errors[i - 1].instance_path.starts_with(&errors[i].instance_path)
        {
            errors.remove(i);
        } else {
            i += 1;
        }
    }
}

fn should_ignore(error: &RawError) -> bool {
    error.keyword == "oneOf"
        || (error.keyword == "required" && error.missing_property.as_deref() == Some("$ref"))
}

struct MappedError {
    path: Regex,
    message: &'static str,
}

fn error_map() -> &'static [MappedError] {
    static MAP: OnceLock<Vec<MappedError>> = OnceLock::new();
    MAP.get_or_init(|| {
        vec![MappedError {
            path: Regex::new(r"^components/securitySchemes/[^/]+$")
                .expect("error map pattern is valid"),
            message: "Invalid security scheme",
        }]
    })
}

/// Overwrites messages of diagnostics whose location has a friendlier
/// hand-written explanation.
///
/// Only the first matching entry of the map applies.
pub fn apply_manual_replacements(diagnostics: &mut [Diagnostic]) {
    for diagnostic in diagnostics.iter_mut() {
        let joined = diagnostic.path.joined();
        if let Some(mapped) = error_map().iter().find(|m| m.path.is_match(&joined)) {
            diagnostic.message = mapped.message.to_string();
        }
    }
}

/// Options for one run of [`evaluate_schema`].
#[derive(Clone, Copy)]
pub struct SchemaRun<'a> {
    /// The schema to validate against.
    pub schema: &'a Value,
    /// The dialect to compile it under.
    pub dialect: Dialect,
    /// Hook run over the raw errors before they are located.
    pub prepare: Option<PrepareResults<'a>>,
}

impl<'a> SchemaRun<'a> {
    /// A run with dialect inference and no hook.
    pub fn new(schema: &'a Value) -> Self {
        Self {
            schema,
            dialect: Dialect::Auto,
            prepare: None,
        }
    }

    /// Sets the dialect.
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Sets the post-processing hook.
    pub fn prepare(mut self, prepare: PrepareResults<'a>) -> Self {
        self.prepare = Some(prepare);
        self
    }
}

/// Validates `target` against a schema and returns located diagnostics.
///
/// Paths are the context path followed by the instance path of each error. A
/// schema the engine cannot compile is reported as one `invalid-schema`
/// diagnostic at the context path.
pub fn evaluate_schema(
    target: &Value,
    run: SchemaRun<'_>,
    ctx: &RuleContext<'_>,
) -> Vec<Diagnostic> {
    let mut errors = match ctx.engine().evaluate(run.dialect, run.schema, target) {
        Ok(errors) => errors,
        Err(error) => return vec![invalid_schema(ctx.path(), &error)],
    };

    for error in errors.iter_mut() {
        error.message = describe(error, run.schema);
    }

    if let Some(prepare) = run.prepare {
        prepare(&mut errors);
    }

    errors.iter().map(|error| locate(error, ctx.path())).collect()
}

/// The diagnostic reported when no usable schema is available at `path`.
pub fn invalid_schema(path: &JsonPath, error: &LintError) -> Diagnostic {
    Diagnostic::new(path.clone(), error.to_string()).with_code("invalid-schema")
}

/// Rewrites an engine message into the short `must ...` form.
///
/// Falls back to the engine's own wording where the keyword value cannot be
/// found in the schema.
pub fn describe(error: &RawError, schema: &Value) -> String {
    let value = error.schema_path.resolve(schema);
    let described = match (error.keyword.as_str(), value) {
        ("type", Some(types)) => Some(format!("type must be {}", type_list(types))),
        ("required", _) => error
            .missing_property
            .as_ref()
            .map(|p| format!("must have required property '{}'", p)),
        ("additionalProperties", _) => Some("must NOT have additional properties".to_string()),
        ("unevaluatedProperties", _) => {
            Some("must NOT have unevaluated properties".to_string())
        }
        ("enum", _) => Some("must be equal to one of the allowed values".to_string()),
        ("const", _) => Some("must be equal to constant".to_string()),
        ("oneOf", _) => Some("must match exactly one schema in oneOf".to_string()),
        ("anyOf", _) => Some("must match a schema in anyOf".to_string()),
        ("not", _) => Some("must NOT be valid".to_string()),
        ("uniqueItems", _) => Some("must NOT have duplicate items".to_string()),
        ("pattern", Some(Value::String(p))) => Some(format!("must match pattern \"{}\"", p)),
        ("format", Some(Value::String(f))) => Some(format!("must match format \"{}\"", f)),
        ("minItems", Some(Value::Number(n))) => {
            Some(format!("must NOT have fewer than {} items", n))
        }
        ("maxItems", Some(Value::Number(n))) => {
            Some(format!("must NOT have more than {} items", n))
        }
        ("minLength", Some(Value::Number(n))) => {
            Some(format!("must NOT have fewer than {} characters", n))
        }
        ("maxLength", Some(Value::Number(n))) => {
            Some(format!("must NOT have more than {} characters", n))
        }
        ("minProperties", Some(Value::Number(n))) => {
            Some(format!("must NOT have fewer than {} properties", n))
        }
        ("maxProperties", Some(Value::Number(n))) => {
            Some(format!("must NOT have more than {} properties", n))
        }
        ("minimum", Some(Value::Number(n))) => Some(format!("must be >= {}", n)),
        ("maximum", Some(Value::Number(n))) => Some(format!("must be <= {}", n)),
        ("exclusiveMinimum", Some(Value::Number(n))) => Some(format!("must be > {}", n)),
        ("exclusiveMaximum", Some(Value::Number(n))) => Some(format!("must be < {}", n)),
        ("multipleOf", Some(Value::Number(n))) => Some(format!("must be multiple of {}", n)),
        _ => None,
    };
    described.unwrap_or_else(|| error.message.clone())
}

fn type_list(types: &Value) -> String {
    match types {
        Value::String(t) => t.clone(),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}

fn locate(error: &RawError, base: &JsonPath) -> Diagnostic {
    let mut path = base.join(&error.instance_path);

    if error.keyword == "additionalProperties" {
        if let Some(property) = &error.additional_property {
            if path.last() != Some(&PathSegment::Field(property.clone())) {
                path = path.push_field(property.clone());
            }
            let message = format!("Property \"{}\" is not expected to be here", property);
            return Diagnostic::new(path, message).with_code(error.keyword.clone());
        }
    }

    let message = match path.last() {
        Some(PathSegment::Field(property)) => {
            format!("\"{}\" property {}", property, error.message)
        }
        _ => capitalize(&error.message),
    };
    Diagnostic::new(path, message).with_code(error.keyword.clone())
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
