use serde_json::Value;

use super::RuleFunction;
use crate::context::RuleContext;
use crate::error::Diagnostic;
use crate::{check_result, CheckResult};

/// Requires at least one 2xx or 3xx entry in an operation's `responses`.
///
/// OpenAPI 3 documents may also use the `2XX` / `3XX` range keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuccessResponse;

impl RuleFunction for SuccessResponse {
    fn check(&self, target: &Value, ctx: &RuleContext<'_>) -> CheckResult {
        let Some(responses) = target.as_object() else {
            return check_result(Vec::new());
        };
        let oas3 = ctx.format().is_some_and(|f| f.is_oas3());

        let found = responses.keys().any(|code| {
            (oas3 && (code == "2XX" || code == "3XX"))
                || code
                    .trim()
                    .parse::<f64>()
                    .is_ok_and(|n| (200.0..400.0).contains(&n))
        });

        if found {
            return check_result(Vec::new());
        }
        check_result(vec![Diagnostic::new(
            ctx.path().clone(),
            "Operation must define at least a single 2xx or 3xx response",
        )
        .with_code("success-response")])
    }
}
