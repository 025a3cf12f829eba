use serde_json::Value;

use super::operations::operations;
use super::RuleFunction;
use crate::context::RuleContext;
use crate::error::Diagnostic;
use crate::{check_result, CheckResult};

/// Flags every repeated `operationId` after its first use.
///
/// Only scalar ids take part: two object-valued ids are never the same id.
#[derive(Debug, Clone, Copy, Default)]
pub struct OperationIdUnique;

impl RuleFunction for OperationIdUnique {
    fn check(&self, target: &Value, ctx: &RuleContext<'_>) -> CheckResult {
        let base = ctx.path().push_field("paths");
        let mut seen: Vec<&Value> = Vec::new();
        let mut diagnostics = Vec::new();

        for op in operations(target.get("paths")) {
            let Some(id) = op.value.get("operationId") else {
                continue;
            };

            let comparable = !id.is_object() && !id.is_array();
            if comparable && seen.contains(&id) {
                diagnostics.push(
                    Diagnostic::new(
                        base.push_field(op.path).push_field(op.verb).push_field("operationId"),
                        "operationId must be unique.",
                    )
                    .with_code("operation-id-unique"),
                );
            } else {
                seen.push(id);
            }
        }

        check_result(diagnostics)
    }
}
