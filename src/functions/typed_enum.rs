use std::fmt::{self, Display};

use serde_json::Value;

use super::RuleFunction;
use crate::context::RuleContext;
use crate::error::Diagnostic;
use crate::format::DocFormat;
use crate::{check_result, CheckResult};

/// Runtime type of a JSON value, as named by the `type` keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    String,
    Boolean,
    Integer,
    Number,
    Null,
    Array,
    Object,
}

impl ValueType {
    fn name(self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Boolean => "boolean",
            ValueType::Integer => "integer",
            ValueType::Number => "number",
            ValueType::Null => "null",
            ValueType::Array => "array",
            ValueType::Object => "object",
        }
    }
}

impl Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classifies a value. Integral numbers are `Integer` only when
/// `check_for_integer` is set.
///
/// ```rust
/// use oaslint::{classify, ValueType};
/// use serde_json::json;
///
/// assert_eq!(classify(&json!(3), true), ValueType::Integer);
/// assert_eq!(classify(&json!(3.0), true), ValueType::Integer);
/// assert_eq!(classify(&json!(3), false), ValueType::Number);
/// assert_eq!(classify(&json!(null), true), ValueType::Null);
/// ```
pub fn classify(value: &Value, check_for_integer: bool) -> ValueType {
    match value {
        Value::String(_) => ValueType::String,
        Value::Bool(_) => ValueType::Boolean,
        Value::Number(n) if check_for_integer && is_integral(n) => ValueType::Integer,
        Value::Number(_) => ValueType::Number,
        Value::Null => ValueType::Null,
        Value::Array(_) => ValueType::Array,
        Value::Object(_) => ValueType::Object,
    }
}

fn is_integral(n: &serde_json::Number) -> bool {
    n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0)
}

/// Short rendering of an enum member for messages.
fn print_value(value: &Value) -> String {
    match value {
        Value::String(_) => value.to_string(),
        Value::Array(_) => "Array[]".to_string(),
        Value::Object(_) => "Object{}".to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if !n.is_i64() && !n.is_u64() && f.fract() == 0.0 && f.abs() < 1e21 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

/// Flags `enum` members whose type is not allowed by a sibling `type`.
///
/// `nullable: true` (3.0) and `x-nullable: true` (2.0) allow `null`.
///
/// # Example
///
/// ```rust
/// use oaslint::{JsonPath, JsonSchemaEngine, RuleContext, RuleFunction, TypedEnum};
/// use serde_json::json;
///
/// let document = json!({ "openapi": "3.0.0" });
/// let engine = JsonSchemaEngine::new();
/// let ctx = RuleContext::new(&document, &engine).at(JsonPath::from_field("schema"));
///
/// let schema = json!({ "type": "integer", "enum": [1, "two", 3.5] });
/// let result = TypedEnum.check(&schema, &ctx);
/// assert!(result.is_failure());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TypedEnum;

impl RuleFunction for TypedEnum {
    fn check(&self, target: &Value, ctx: &RuleContext<'_>) -> CheckResult {
        let Some(values) = target.get("enum").and_then(Value::as_array) else {
            return check_result(Vec::new());
        };
        let Some(declared) = target.get("type") else {
            return check_result(Vec::new());
        };
        let mut allowed: Vec<&str> = match declared {
            Value::String(t) => vec![t.as_str()],
            Value::Array(types) => types.iter().filter_map(Value::as_str).collect(),
            _ => return check_result(Vec::new()),
        };

        let mut shown: Vec<String> = match declared {
            Value::Array(types) => types
                .iter()
                .map(|t| t.as_str().map(str::to_owned).unwrap_or_else(|| t.to_string()))
                .collect(),
            _ => allowed.iter().map(|t| t.to_string()).collect(),
        };

        let nullable = match ctx.format() {
            Some(DocFormat::V30) => target.get("nullable") == Some(&Value::Bool(true)),
            Some(DocFormat::V2) => target.get("x-nullable") == Some(&Value::Bool(true)),
            _ => false,
        };
        if nullable {
            allowed.push("null");
            shown.push("null".to_string());
        }
        let shown = shown.join(",");

        let check_for_integer = allowed.contains(&"integer");

        let diagnostics = values
            .iter()
            .enumerate()
            .filter(|(_, value)| {
                let actual = classify(value, check_for_integer);
                let integer_as_number =
                    actual == ValueType::Integer && allowed.contains(&"number");
                !integer_as_number && !allowed.contains(&actual.name())
            })
            .map(|(index, value)| {
                Diagnostic::new(
                    ctx.path().push_field("enum").push_index(index),
                    format!("Enum value {} must be \"{}\".", print_value(value), shown),
                )
                .with_code("typed-enum")
            })
            .collect();

        check_result(diagnostics)
    }
}
