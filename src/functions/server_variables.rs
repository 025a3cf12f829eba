//! Server URL templates and their variables.

use std::sync::OnceLock;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use regex::Regex;
use serde_json::{json, Value};
use url::Url;

use super::operations::display_value;
use super::RuleFunction;
use crate::context::RuleContext;
use crate::error::Diagnostic;
use crate::format::Dialect;
use crate::path::JsonPath;
use crate::{check_result, CheckResult};

/// Invalid URLs collected before the substitution search stops.
const MAX_INVALID: usize = 5;

/// Characters escaped when a value is placed into a URL template.
///
/// Reserved URL characters (`/`, `?`, `:`, `@`, ...) are kept as they are.
const URI: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Escapes a value for a URL the way a browser's `encodeURI` does.
///
/// ```rust
/// use oaslint::encode_uri;
///
/// assert_eq!(encode_uri("eu west/1"), "eu%20west/1");
/// assert_eq!(encode_uri("{x}"), "%7Bx%7D");
/// assert_eq!(encode_uri("café"), "caf%C3%A9");
/// ```
pub fn encode_uri(value: &str) -> String {
    utf8_percent_encode(value, URI).to_string()
}

/// The shape a Server Object must have before its variables are looked at.
fn server_object_schema() -> &'static Value {
    static SCHEMA: OnceLock<Value> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        json!({
            "type": "object",
            "required": ["url"],
            "properties": {
                "url": { "type": "string" },
                "variables": {
                    "type": "object",
                    "additionalProperties": {
                        "type": "object",
                        "properties": {
                            "enum": { "type": "array", "items": { "type": "string" } },
                            "default": { "type": "string" },
                            "description": { "type": "string" },
                            "examples": { "type": "string" }
                        },
                        "patternProperties": { "^x-": true },
                        "additionalProperties": false
                    }
                }
            }
        })
    })
}

fn url_variable() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{(.+?)\}").expect("url variable pattern is valid"))
}

/// Names of the `{...}` placeholders of a URL template, first use first.
fn parse_url_variables(url: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for captures in url_variable().captures_iter(url) {
        let name = captures[1].to_string();
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

/// Every way of filling a URL template from candidate values.
///
/// The product is walked lazily, last variable fastest, so a caller may stop
/// after the first few results without paying for the whole product. A
/// template without variables yields itself once; a variable without
/// candidates yields nothing.
///
/// ```rust
/// use oaslint::Substitutions;
///
/// let urls: Vec<_> = Substitutions::new(
///     "https://{env}.example.com:{port}",
///     vec![
///         ("env".to_string(), vec!["dev".to_string(), "prod".to_string()]),
///         ("port".to_string(), vec!["80".to_string(), "443".to_string()]),
///     ],
/// )
/// .collect();
///
/// assert_eq!(urls[0], "https://dev.example.com:80");
/// assert_eq!(urls[3], "https://prod.example.com:443");
/// assert_eq!(urls.len(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct Substitutions {
    template: String,
    variables: Vec<(String, Vec<String>)>,
    cursor: Vec<usize>,
    done: bool,
}

impl Substitutions {
    /// Creates the product of `variables` over `template`. Values are
    /// substituted as given.
    pub fn new(template: impl Into<String>, variables: Vec<(String, Vec<String>)>) -> Self {
        let done = variables.iter().any(|(_, values)| values.is_empty());
        Self {
            template: template.into(),
            cursor: vec![0; variables.len()],
            variables,
            done,
        }
    }

    fn advance(&mut self) {
        for slot in (0..self.cursor.len()).rev() {
            self.cursor[slot] += 1;
            if self.cursor[slot] < self.variables[slot].1.len() {
                return;
            }
            self.cursor[slot] = 0;
        }
        self.done = true;
    }
}

impl Iterator for Substitutions {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.done {
            return None;
        }
        let url = self
            .variables
            .iter()
            .zip(&self.cursor)
            .fold(self.template.clone(), |url, ((name, values), &at)| {
                url.replace(&format!("{{{}}}", name), &values[at])
            });
        self.advance();
        Some(url)
    }
}

/// Checks a Server Object's `variables` against its `url` template.
///
/// With substitution checking on, every combination of variable values is
/// tried until five produce an invalid URL.
///
/// # Example
///
/// ```rust
/// use oaslint::{JsonPath, JsonSchemaEngine, RuleContext, RuleFunction, ServerVariables};
/// use serde_json::json;
///
/// let document = json!({ "openapi": "3.0.0" });
/// let engine = JsonSchemaEngine::new();
/// let ctx = RuleContext::new(&document, &engine).at(JsonPath::from_field("servers").push_index(0));
///
/// let server = json!({
///     "url": "https://api.{region}.x.com",
///     "variables": { "region": { "default": "us" }, "port": { "default": "8080" } }
/// });
/// let result = ServerVariables::new().check(&server, &ctx);
/// assert!(result.is_failure());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ServerVariables {
    check_substitutions: bool,
}

impl ServerVariables {
    /// Creates a checker with substitution checking off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables trying every substitution.
    pub fn check_substitutions(mut self, enabled: bool) -> Self {
        self.check_substitutions = enabled;
        self
    }
}

impl RuleFunction for ServerVariables {
    fn check(&self, target: &Value, ctx: &RuleContext<'_>) -> CheckResult {
        let path = ctx.path();
        let shape = ctx
            .engine()
            .evaluate(Dialect::Draft7, server_object_schema(), target);
        if !matches!(shape, Ok(ref errors) if errors.is_empty()) {
            return check_result(vec![at(path.clone(), "Invalid Server Object".to_string())]);
        }

        let Some(url) = target.get("url").and_then(Value::as_str) else {
            return check_result(Vec::new());
        };
        let Some(variables) = target.get("variables").and_then(Value::as_object) else {
            return check_result(Vec::new());
        };

        let variables_path = path.push_field("variables");
        let in_url = parse_url_variables(url);
        let mut diagnostics = Vec::new();

        for name in variables.keys().filter(|name| !in_url.contains(*name)) {
            diagnostics.push(at(
                variables_path.push_field(name.clone()),
                format!(
                    "Server's \"variables\" object has unused defined \"{}\" url variable.",
                    name
                ),
            ));
        }

        if in_url.is_empty() {
            return check_result(diagnostics);
        }

        let missing: Vec<&str> = in_url
            .iter()
            .filter(|name| !variables.contains_key(name.as_str()))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            diagnostics.push(at(
                variables_path.clone(),
                format!(
                    "Not all server's variables are described with \"variables\" object. Missed: {}.",
                    missing.join(", ")
                ),
            ));
        }

        // Declaration order decides the substitution order.
        let mut candidates: Vec<(String, Vec<String>)> = Vec::new();
        for (name, variable) in variables.iter().filter(|(name, _)| in_url.contains(*name)) {
            let default = variable.get("default");

            let values: Vec<String> = match variable.get("enum").and_then(Value::as_array) {
                Some(allowed) => {
                    if default.is_some_and(|d| !allowed.contains(d)) {
                        diagnostics.push(at(
                            variables_path.push_field(name.clone()).push_field("default"),
                            format!(
                                "Server Variable \"{}\" has a default not listed in the enum",
                                name
                            ),
                        ));
                    }
                    allowed.iter().map(|v| display_value(Some(v))).collect()
                }
                None => vec![default.map(|d| display_value(Some(d))).unwrap_or_default()],
            };

            candidates.push((name.clone(), values.iter().map(|v| encode_uri(v)).collect()));
        }

        if self.check_substitutions && !candidates.is_empty() {
            diagnostics.extend(invalid_substitutions(url, candidates, &variables_path));
        }

        check_result(diagnostics)
    }
}

fn invalid_substitutions(
    url: &str,
    candidates: Vec<(String, Vec<String>)>,
    location: &JsonPath,
) -> Option<Diagnostic> {
    let invalid: Vec<String> = Substitutions::new(url, candidates)
        .filter(|candidate| Url::parse(candidate).is_err())
        .take(MAX_INVALID)
        .collect();

    tracing::trace!(url, invalid = invalid.len(), "checked server url substitutions");

    let message = match invalid.len() {
        0 => return None,
        MAX_INVALID => format!(
            "At least {} substitutions of server variables resulted in invalid URLs: {} and more",
            MAX_INVALID,
            invalid.join(", ")
        ),
        _ => format!(
            "A few substitutions of server variables resulted in invalid URLs: {}",
            invalid.join(", ")
        ),
    };
    Some(at(location.clone(), message))
}

fn at(path: JsonPath, message: String) -> Diagnostic {
    Diagnostic::new(path, message).with_code("server-variables")
}
