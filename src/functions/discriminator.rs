use serde_json::Value;

use super::RuleFunction;
use crate::context::RuleContext;
use crate::error::Diagnostic;
use crate::{check_result, CheckResult};

/// Checks that a 2.0 schema's string `discriminator` names a declared and
/// required property.
///
/// The two conditions are reported independently.
#[derive(Debug, Clone, Copy, Default)]
pub struct OasDiscriminator;

impl RuleFunction for OasDiscriminator {
    fn check(&self, target: &Value, ctx: &RuleContext<'_>) -> CheckResult {
        let Some(name) = target.get("discriminator").and_then(Value::as_str) else {
            return check_result(Vec::new());
        };

        let mut diagnostics = Vec::new();

        let declared = target
            .get("properties")
            .and_then(Value::as_object)
            .is_some_and(|props| props.contains_key(name));
        if !declared {
            diagnostics.push(
                Diagnostic::new(
                    ctx.path().push_field("properties"),
                    "The discriminator property must be defined in this schema.",
                )
                .with_code("discriminator"),
            );
        }

        let required = target
            .get("required")
            .and_then(Value::as_array)
            .is_some_and(|req| req.iter().any(|r| r.as_str() == Some(name)));
        if !required {
            diagnostics.push(
                Diagnostic::new(
                    ctx.path().push_field("required"),
                    "The discriminator property must be in the required property list.",
                )
                .with_code("discriminator"),
            );
        }

        check_result(diagnostics)
    }
}
