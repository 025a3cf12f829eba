//! The rule function strategy interface.
//!
//! This module provides the [`RuleFunction`] trait every checker implements,
//! so the ruleset runner can hold heterogeneous checkers side by side.

use serde_json::Value;

use crate::context::RuleContext;
use crate::CheckResult;

/// A checker invoked on one target value of a document.
///
/// Implementations are stateless per call and never fail: a target of the
/// wrong shape yields `Validation::Success`. The `Send + Sync` bounds allow
/// the runner to evaluate rules in parallel and to store them as
/// `Box<dyn RuleFunction>`.
///
/// # Example
///
/// ```rust
/// use oaslint::{JsonSchemaEngine, RuleContext, RuleFunction, TagDefined};
/// use serde_json::json;
///
/// let document = json!({
///     "openapi": "3.0.0",
///     "tags": [{ "name": "pets" }],
///     "paths": { "/pets": { "get": { "tags": ["pets"] } } }
/// });
/// let engine = JsonSchemaEngine::new();
/// let ctx = RuleContext::new(&document, &engine);
///
/// assert!(TagDefined.check(&document, &ctx).is_success());
/// ```
pub trait RuleFunction: Send + Sync {
    /// Checks `target`, located at `ctx.path()` inside `ctx.document()`.
    fn check(&self, target: &Value, ctx: &RuleContext<'_>) -> CheckResult;
}
