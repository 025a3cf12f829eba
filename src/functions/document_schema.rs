//! Whole-document validation against the canonical schema.

use serde_json::Value;

use super::RuleFunction;
use crate::context::RuleContext;
use crate::error::LintError;
use crate::results::{
    apply_manual_replacements, evaluate_schema, invalid_schema, prepare_results, SchemaRun,
};
use crate::{check_result, CheckResult};

/// Validates a document against the canonical schema of its format.
///
/// The raw engine output is collapsed by [`prepare_results`] and then passed
/// through the manual error map. Unrecognized documents have no findings.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentSchema;

impl RuleFunction for DocumentSchema {
    fn check(&self, target: &Value, ctx: &RuleContext<'_>) -> CheckResult {
        let Some(format) = ctx.format() else {
            return check_result(Vec::new());
        };

        let schema = match ctx.registry().for_format(format).map_err(LintError::from) {
            Ok(schema) => schema,
            Err(error) => return check_result(vec![invalid_schema(ctx.path(), &error)]),
        };

        let run = SchemaRun::new(&schema).prepare(&prepare_results);
        let mut diagnostics = evaluate_schema(target, run, ctx);
        apply_manual_replacements(&mut diagnostics);
        check_result(diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::JsonSchemaEngine;
    use serde_json::json;

    #[test]
    fn test_unknown_document_is_skipped() {
        let document = json!({ "asyncapi": "2.0.0" });
        let engine = JsonSchemaEngine::new();
        let ctx = RuleContext::new(&document, &engine);

        assert!(DocumentSchema.check(&document, &ctx).is_success());
    }

    #[test]
    fn test_minimal_oas3_document_is_clean() {
        let document = json!({
            "openapi": "3.0.3",
            "info": { "title": "t", "version": "1" },
            "paths": {}
        });
        let engine = JsonSchemaEngine::new();
        let ctx = RuleContext::new(&document, &engine);

        assert!(DocumentSchema.check(&document, &ctx).is_success());
    }
}
