use serde_json::Value;

use super::RuleFunction;
use crate::context::RuleContext;
use crate::refs::unreferenced;
use crate::{check_result, CheckResult};

const COMPONENT_TYPES: [&str; 8] = [
    "schemas",
    "responses",
    "parameters",
    "examples",
    "requestBodies",
    "headers",
    "links",
    "callbacks",
];

/// Reports reusable components nothing references.
///
/// Meant to run on the raw document, before `$ref`s are inlined.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnusedComponent;

impl RuleFunction for UnusedComponent {
    fn check(&self, target: &Value, ctx: &RuleContext<'_>) -> CheckResult {
        let Some(components) = target.get("components").and_then(Value::as_object) else {
            return check_result(Vec::new());
        };

        let diagnostics = COMPONENT_TYPES
            .iter()
            .filter(|kind| components.get(**kind).is_some_and(Value::is_object))
            .flat_map(|kind| {
                let location = ctx.path().push_field("components").push_field(*kind);
                unreferenced(target, &location)
            })
            .collect();

        check_result(diagnostics)
    }
}
