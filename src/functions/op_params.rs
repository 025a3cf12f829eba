use serde_json::Value;

use super::operations::display_value;
use super::RuleFunction;
use crate::context::RuleContext;
use crate::error::Diagnostic;
use crate::path::JsonPath;
use crate::{check_result, CheckResult};

const DUPLICATE: &str =
    "A parameter in this operation already exposes the same combination of \"name\" and \"in\" values.";
const BODY_AND_FORM: &str =
    "Operation must not have both \"in:body\" and \"in:formData\" parameters.";
const MANY_BODIES: &str =
    "Operation must not have more than a single instance of the \"in:body\" parameter.";

/// Checks an operation's `parameters` list for repeated parameters and
/// conflicting request bodies.
///
/// Lists with fewer than two entries are never inspected. `$ref` entries are
/// skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct OperationParameters;

impl RuleFunction for OperationParameters {
    fn check(&self, target: &Value, ctx: &RuleContext<'_>) -> CheckResult {
        let Some(params) = target.as_array().filter(|p| p.len() >= 2) else {
            return check_result(Vec::new());
        };

        let mut fingerprints: Vec<String> = Vec::new();
        let mut duplicates = Vec::new();
        let mut bodies = Vec::new();
        let mut form_data = 0usize;

        for (index, param) in params.iter().enumerate() {
            let Some(map) = param.as_object() else {
                continue;
            };
            if map.contains_key("$ref") {
                continue;
            }

            let fingerprint = format!(
                "{}-{}",
                display_value(map.get("in")),
                display_value(map.get("name"))
            );
            if fingerprints.contains(&fingerprint) {
                duplicates.push(index);
            } else {
                fingerprints.push(fingerprint);
            }

            match map.get("in").and_then(Value::as_str) {
                Some("body") => bodies.push(index),
                Some("formData") => form_data += 1,
                _ => {}
            }
        }

        let path = ctx.path();
        let mut diagnostics: Vec<Diagnostic> = duplicates
            .into_iter()
            .map(|index| at(path.push_index(index), DUPLICATE))
            .collect();

        if !bodies.is_empty() && form_data > 0 {
            diagnostics.push(at(path.clone(), BODY_AND_FORM));
        }
        diagnostics.extend(
            bodies
                .into_iter()
                .skip(1)
                .map(|index| at(path.push_index(index), MANY_BODIES)),
        );

        check_result(diagnostics)
    }
}

fn at(path: JsonPath, message: &str) -> Diagnostic {
    Diagnostic::new(path, message).with_code("operation-parameters")
}
