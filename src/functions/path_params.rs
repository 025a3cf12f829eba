//! Path template and path parameter consistency.

use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;

use super::operations::{display_value, VERBS};
use super::RuleFunction;
use crate::context::RuleContext;
use crate::error::Diagnostic;
use crate::path::JsonPath;
use crate::{check_result, CheckResult};

fn placeholder() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(\{;?\??[a-zA-Z0-9_-]+\*?\})").expect("placeholder pattern is valid")
    })
}

/// Path parameters declared in one scope, by name.
type Declared = IndexMap<String, JsonPath>;

/// Cross-checks every path template against its path parameters.
///
/// Reports, in document order:
/// - templates that collide once placeholder names are ignored
/// - a placeholder used twice in one template
/// - path parameters without `required: true`
/// - a path parameter declared twice in the same list
/// - declared path parameters the template never uses
/// - template placeholders no parameter declares
///
/// Parameters of the path item apply to every operation below it; an
/// operation may redeclare one of them.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathParams;

impl RuleFunction for PathParams {
    fn check(&self, target: &Value, ctx: &RuleContext<'_>) -> CheckResult {
        let Some(paths) = target.get("paths").and_then(Value::as_object) else {
            return check_result(Vec::new());
        };

        let base = ctx.path().push_field("paths");
        let mut diagnostics = Vec::new();
        let mut unique_paths: IndexMap<String, &str> = IndexMap::new();

        for (path, item) in paths {
            let Some(item) = item.as_object() else {
                continue;
            };
            let path_location = base.push_field(path.clone());

            let normalized = placeholder().replace_all(path, "%").into_owned();
            match unique_paths.get(&normalized) {
                Some(first) => diagnostics.push(at(
                    path_location.clone(),
                    format!("Paths \"{}\" and \"{}\" must not be equivalent.", first, path),
                )),
                None => {
                    unique_paths.insert(normalized, path.as_str());
                }
            }

            let mut elements: Vec<String> = Vec::new();
            for found in placeholder().find_iter(path) {
                let name: String = found
                    .as_str()
                    .chars()
                    .filter(|c| !matches!(c, '{' | '}' | '?' | '*' | ';'))
                    .collect();
                if elements.contains(&name) {
                    diagnostics.push(at(
                        path_location.clone(),
                        format!(
                            "Path \"{}\" must not use parameter \"{{{}}}\" multiple times.",
                            path, name
                        ),
                    ));
                } else {
                    elements.push(name);
                }
            }

            let shared = declared_in(
                item.get("parameters"),
                &path_location.push_field("parameters"),
                &mut diagnostics,
            );

            for (verb, operation) in item {
                if !operation.is_object() || !VERBS.contains(&verb.as_str()) {
                    continue;
                }
                let operation_location = path_location.push_field(verb.clone());
                let own = declared_in(
                    operation.get("parameters"),
                    &operation_location.push_field("parameters"),
                    &mut diagnostics,
                );

                let mut defined = shared.clone();
                defined.extend(own);

                for (name, location) in &defined {
                    if !elements.contains(name) {
                        diagnostics.push(at(
                            location.clone(),
                            format!("Parameter \"{}\" must be used in path \"{}\".", name, path),
                        ));
                    }
                }
                for name in &elements {
                    if !defined.contains_key(name) {
                        diagnostics.push(at(
                            operation_location.clone(),
                            format!(
                                "Operation must define parameter \"{{{}}}\" as expected by path \"{}\".",
                                name, path
                            ),
                        ));
                    }
                }
            }
        }

        check_result(diagnostics)
    }
}

/// Collects the named `in: path` parameters of one list.
///
/// Reports parameters that are not required and names declared twice; a
/// repeated name keeps its first location.
fn declared_in(
    parameters: Option<&Value>,
    location: &JsonPath,
    diagnostics: &mut Vec<Diagnostic>,
) -> Declared {
    let mut declared = Declared::new();
    let Some(parameters) = parameters.and_then(Value::as_array) else {
        return declared;
    };

    for (index, param) in parameters.iter().enumerate() {
        let Some(param) = param.as_object() else {
            continue;
        };
        if param.get("in").and_then(Value::as_str) != Some("path") {
            continue;
        }
        let Some(name) = param.get("name") else {
            continue;
        };
        let name = display_value(Some(name));
        let param_location = location.push_index(index);

        if param.get("required") != Some(&Value::Bool(true)) {
            diagnostics.push(at(
                param_location.clone(),
                format!(
                    "Path parameter \"{}\" must have \"required\" property that is set to \"true\".",
                    name
                ),
            ));
        }

        if declared.contains_key(&name) {
            diagnostics.push(at(
                param_location,
                format!("Path parameter \"{}\" must not be defined multiple times.", name),
            ));
        } else {
            declared.insert(name, param_location);
        }
    }

    declared
}

fn at(path: JsonPath, message: String) -> Diagnostic {
    Diagnostic::new(path, message).with_code("path-params")
}
