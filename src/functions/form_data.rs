use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use super::operations::display_value;
use super::RuleFunction;
use crate::context::RuleContext;
use crate::error::Diagnostic;
use crate::{check_result, CheckResult};

fn form_media_type() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(application/x-www-form-urlencoded|multipart/form-data)")
            .expect("form media type pattern is valid")
    })
}

/// Requires a form media type in `consumes` when a 2.0 operation takes
/// `formData` parameters.
///
/// Operations without both a `parameters` list and a `consumes` list are
/// left alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormDataConsumes;

impl RuleFunction for FormDataConsumes {
    fn check(&self, target: &Value, ctx: &RuleContext<'_>) -> CheckResult {
        let (Some(parameters), Some(consumes)) = (
            target.get("parameters").and_then(Value::as_array),
            target.get("consumes").and_then(Value::as_array),
        ) else {
            return check_result(Vec::new());
        };

        let has_form_data = parameters
            .iter()
            .any(|p| p.get("in").and_then(Value::as_str) == Some("formData"));
        let joined = consumes
            .iter()
            .map(|c| display_value(Some(c)))
            .collect::<Vec<_>>()
            .join(",");

        if has_form_data && !form_media_type().is_match(&joined) {
            return check_result(vec![Diagnostic::new(
                ctx.path().clone(),
                "Consumes must include urlencoded, multipart, or form-data media type when using formData parameter.",
            )
            .with_code("form-data-consumes")]);
        }
        check_result(Vec::new())
    }
}
