use serde_json::Value;

use super::operations::operations;
use super::RuleFunction;
use crate::context::RuleContext;
use crate::error::Diagnostic;
use crate::{check_result, CheckResult};

/// Requires every operation tag to be declared in the global `tags` list.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagDefined;

impl RuleFunction for TagDefined {
    fn check(&self, target: &Value, ctx: &RuleContext<'_>) -> CheckResult {
        let global: Vec<&str> = target
            .get("tags")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|tag| tag.get("name").and_then(Value::as_str))
            .collect();

        let base = ctx.path().push_field("paths");
        let mut diagnostics = Vec::new();

        for op in operations(target.get("paths")) {
            let Some(tags) = op.value.get("tags").and_then(Value::as_array) else {
                continue;
            };
            for (index, tag) in tags.iter().enumerate() {
                if tag.as_str().is_some_and(|t| global.contains(&t)) {
                    continue;
                }
                diagnostics.push(
                    Diagnostic::new(
                        base.push_field(op.path)
                            .push_field(op.verb)
                            .push_field("tags")
                            .push_index(index),
                        "Operation tags must be defined in global tags.",
                    )
                    .with_code("tag-defined"),
                );
            }
        }

        check_result(diagnostics)
    }
}
