use serde_json::Value;

use super::RuleFunction;
use crate::context::RuleContext;
use crate::error::Diagnostic;
use crate::{check_result, CheckResult};

/// Flags every key placed next to a `$ref`.
///
/// The target is the `$ref` value itself; its owner is looked up in the
/// document through the context path.
#[derive(Debug, Clone, Copy, Default)]
pub struct RefSiblings;

impl RuleFunction for RefSiblings {
    fn check(&self, _target: &Value, ctx: &RuleContext<'_>) -> CheckResult {
        let Some(owner_path) = ctx.path().parent() else {
            return check_result(Vec::new());
        };
        let Some(owner) = owner_path.resolve(ctx.document()).and_then(Value::as_object) else {
            return check_result(Vec::new());
        };
        if owner.len() <= 1 {
            return check_result(Vec::new());
        }

        let diagnostics = owner
            .keys()
            .filter(|key| key.as_str() != "$ref")
            .map(|key| {
                Diagnostic::new(
                    owner_path.push_field(key.clone()),
                    "$ref must not be placed next to any other properties",
                )
                .with_code("ref-siblings")
            })
            .collect();

        check_result(diagnostics)
    }
}
