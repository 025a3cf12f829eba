use serde_json::Value;

use super::operations::operations;
use super::RuleFunction;
use crate::context::RuleContext;
use crate::error::Diagnostic;
use crate::path::JsonPath;
use crate::{check_result, CheckResult};

/// Requires every security requirement to name a defined security scheme.
///
/// `schemes_path` locates the scheme definitions: `securityDefinitions`
/// for 2.0, `components.securitySchemes` for 3.x.
///
/// # Example
///
/// ```rust
/// use oaslint::{JsonSchemaEngine, RuleContext, RuleFunction, SecurityDefined};
/// use serde_json::json;
///
/// let document = json!({
///     "openapi": "3.0.0",
///     "components": { "securitySchemes": { "apiKey": {} } },
///     "security": [{ "apiKey": [] }, { "oauth": [] }]
/// });
/// let engine = JsonSchemaEngine::new();
/// let ctx = RuleContext::new(&document, &engine);
///
/// let check = SecurityDefined::new(["components", "securitySchemes"]);
/// let diagnostics = check.check(&document, &ctx);
/// assert!(diagnostics.is_failure());
/// ```
#[derive(Debug, Clone)]
pub struct SecurityDefined {
    schemes_path: Vec<String>,
}

impl SecurityDefined {
    /// Creates a checker reading scheme definitions at `schemes_path`.
    pub fn new<I, S>(schemes_path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            schemes_path: schemes_path.into_iter().map(Into::into).collect(),
        }
    }

    fn requirements(
        &self,
        security: Option<&Value>,
        location: JsonPath,
        defined: &[&str],
        scope: &str,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let Some(security) = security.and_then(Value::as_array) else {
            return;
        };
        for (index, requirement) in security.iter().enumerate() {
            let Some(requirement) = requirement.as_object() else {
                continue;
            };
            for key in requirement.keys() {
                if defined.contains(&key.as_str()) {
                    continue;
                }
                diagnostics.push(
                    Diagnostic::new(
                        location.push_index(index).push_field(key.clone()),
                        format!(
                            "{} \"security\" values must match a scheme defined in the \"{}\" object.",
                            scope,
                            self.schemes_path.join(".")
                        ),
                    )
                    .with_code("security-defined"),
                );
            }
        }
    }
}

impl RuleFunction for SecurityDefined {
    fn check(&self, target: &Value, ctx: &RuleContext<'_>) -> CheckResult {
        let schemes =
            JsonPath::from_segments(self.schemes_path.iter().map(String::as_str)).resolve(target);
        let defined: Vec<&str> = schemes
            .and_then(Value::as_object)
            .map(|s| s.keys().map(String::as_str).collect())
            .unwrap_or_default();

        let mut diagnostics = Vec::new();
        self.requirements(
            target.get("security"),
            ctx.path().push_field("security"),
            &defined,
            "API",
            &mut diagnostics,
        );

        let base = ctx.path().push_field("paths");
        for op in operations(target.get("paths")) {
            self.requirements(
                op.value.get("security"),
                base.push_field(op.path).push_field(op.verb).push_field("security"),
                &defined,
                "Operation",
                &mut diagnostics,
            );
        }

        check_result(diagnostics)
    }
}
