//! The rule catalog and its runner.
//!
//! A [`Rule`] ties a [`RuleFunction`] to the document locations it checks,
//! the formats it applies to, and how its findings are reported. A
//! [`Ruleset`] evaluates its rules in parallel and returns every finding in
//! catalog order.
//!
//! # Example
//!
//! ```rust
//! use oaslint::{LintOptions, Ruleset, Severity};
//! use serde_json::json;
//!
//! let document = json!({
//!     "swagger": "2.0",
//!     "info": { "title": "t", "version": "1" },
//!     "paths": { "/a": { "get": { "responses": { "default": { "description": "d" } } } } }
//! });
//!
//! let ruleset = Ruleset::recommended().with_severity("operation-success-response", Severity::Error);
//! let results = ruleset.run(&document, &LintOptions::default());
//!
//! assert_eq!(results.len(), 1);
//! assert_eq!(results[0].code, "operation-success-response");
//! assert_eq!(results[0].severity, Severity::Error);
//! ```

mod catalog;
mod target;

use std::collections::HashSet;
use std::fmt::{self, Display};
use std::sync::Arc;

use rayon::prelude::*;
use serde_json::Value;
use stillwater::Validation;

use crate::context::RuleContext;
use crate::engine::{JsonSchemaEngine, SchemaEngine};
use crate::format::DocFormat;
use crate::functions::RuleFunction;
use crate::path::JsonPath;
use crate::refs::{map_to_source, resolve_local_refs};

pub use target::{NodeFilter, Target};

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// A definite defect.
    Error,
    /// A likely defect.
    Warn,
    /// Informational.
    Info,
    /// A style suggestion.
    Hint,
    /// The rule does not run.
    Off,
}

impl Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Error => "error",
            Severity::Warn => "warn",
            Severity::Info => "info",
            Severity::Hint => "hint",
            Severity::Off => "off",
        };
        f.write_str(name)
    }
}

/// Options for one [`Ruleset::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LintOptions {
    /// Inline local `$ref`s before running rules that want resolved input.
    pub resolve_refs: bool,
}

impl Default for LintOptions {
    fn default() -> Self {
        Self { resolve_refs: true }
    }
}

/// One reported finding.
#[derive(Debug, Clone, PartialEq)]
pub struct LintResult {
    /// Name of the rule that produced it.
    pub code: String,
    /// Severity of the rule at the time of the run.
    pub severity: Severity,
    /// Location in the document as given, never in the resolved view.
    pub path: JsonPath,
    /// Rendered message.
    pub message: String,
}

impl Display for LintResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let location = if self.path.is_root() {
            "(root)".to_string()
        } else {
            self.path.to_string()
        };
        write!(f, "{} {} {}: {}", self.severity, self.code, location, self.message)
    }
}

/// A named check bound to its targets.
pub struct Rule {
    name: String,
    severity: Severity,
    formats: Vec<DocFormat>,
    message: String,
    target: Target,
    resolved: bool,
    function: Box<dyn RuleFunction>,
}

impl Rule {
    /// Creates a warning-level rule for every format, running on the resolved
    /// document and reporting the function's own messages.
    pub fn new(
        name: impl Into<String>,
        target: Target,
        function: impl RuleFunction + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            severity: Severity::Warn,
            formats: Vec::new(),
            message: "{{error}}".to_string(),
            target,
            resolved: true,
            function: Box::new(function),
        }
    }

    /// Sets the severity.
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Restricts the rule to the given formats.
    pub fn formats(mut self, formats: &[DocFormat]) -> Self {
        self.formats = formats.to_vec();
        self
    }

    /// Sets the message template; `{{error}}` stands for the function's message.
    pub fn message(mut self, template: impl Into<String>) -> Self {
        self.message = template.into();
        self
    }

    /// Runs the rule on the document as given, with `$ref`s in place.
    pub fn raw(mut self) -> Self {
        self.resolved = false;
        self
    }

    /// The rule's name, reported as the code of its findings.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The severity findings are reported with.
    pub fn level(&self) -> Severity {
        self.severity
    }

    /// The document locations the rule runs on.
    pub fn target(&self) -> Target {
        self.target
    }

    /// True if the rule runs on a document of `format`.
    pub fn applies_to(&self, format: Option<DocFormat>) -> bool {
        if self.severity == Severity::Off {
            return false;
        }
        if self.formats.is_empty() {
            return true;
        }
        format.is_some_and(|f| self.formats.contains(&f))
    }

    fn render(&self, message: &str) -> String {
        if self.message.contains("{{error}}") {
            self.message.replace("{{error}}", message)
        } else {
            self.message.clone()
        }
    }

    fn evaluate(
        &self,
        raw: &Value,
        resolved: Option<&Value>,
        format: Option<DocFormat>,
        engine: &dyn SchemaEngine,
    ) -> Vec<LintResult> {
        let (document, remap) = match resolved {
            Some(resolved) if self.resolved => (resolved, true),
            _ => (raw, false),
        };
        let root = RuleContext::new(document, engine).with_format(format);

        tracing::debug!(rule = %self.name, "running rule");
        let mut results = Vec::new();
        for (path, target) in self.target.select(document) {
            let Validation::Failure(diagnostics) = self.function.check(target, &root.at(path))
            else {
                continue;
            };
            for diagnostic in diagnostics {
                let path = if remap {
                    map_to_source(raw, &diagnostic.path)
                } else {
                    diagnostic.path
                };
                results.push(LintResult {
                    code: self.name.clone(),
                    severity: self.severity,
                    path,
                    message: self.render(&diagnostic.message),
                });
            }
        }
        tracing::debug!(rule = %self.name, findings = results.len(), "rule finished");
        results
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("severity", &self.severity)
            .field("formats", &self.formats)
            .field("target", &self.target)
            .field("resolved", &self.resolved)
            .finish_non_exhaustive()
    }
}

/// An ordered collection of rules sharing one schema engine.
pub struct Ruleset {
    rules: Vec<Rule>,
    engine: Arc<dyn SchemaEngine>,
}

impl Ruleset {
    /// Creates an empty ruleset.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            engine: Arc::new(JsonSchemaEngine::new()),
        }
    }

    /// Creates a ruleset holding every built-in rule.
    pub fn recommended() -> Self {
        Self {
            rules: catalog::recommended(),
            ..Self::new()
        }
    }

    /// Appends a rule.
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Overrides the severity of the named rule. [`Severity::Off`] disables it.
    pub fn with_severity(mut self, name: &str, severity: Severity) -> Self {
        if let Some(rule) = self.rules.iter_mut().find(|r| r.name == name) {
            rule.severity = severity;
        }
        self
    }

    /// Removes the named rule.
    pub fn without(mut self, name: &str) -> Self {
        self.rules.retain(|r| r.name != name);
        self
    }

    /// Uses a different schema engine.
    pub fn with_engine(mut self, engine: impl SchemaEngine + 'static) -> Self {
        self.engine = Arc::new(engine);
        self
    }

    /// The rules, in reporting order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Looks up a rule by name.
    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// Runs every applicable rule over `document`.
    ///
    /// Rules run in parallel; results come back grouped by rule in catalog
    /// order, each group in the order its rule produced it. Identical findings
    /// (same rule, location and message) are reported once.
    pub fn run(&self, document: &Value, options: &LintOptions) -> Vec<LintResult> {
        let format = DocFormat::detect(document);
        let resolved = options.resolve_refs.then(|| resolve_local_refs(document));
        let active: Vec<&Rule> = self
            .rules
            .iter()
            .filter(|r| r.applies_to(format))
            .collect();

        tracing::debug!(?format, rules = active.len(), "linting document");

        let engine = self.engine.as_ref();
        let grouped: Vec<Vec<LintResult>> = active
            .par_iter()
            .map(|rule| rule.evaluate(document, resolved.as_ref(), format, engine))
            .collect();

        let mut seen = HashSet::new();
        grouped
            .into_iter()
            .flatten()
            .filter(|r| seen.insert((r.code.clone(), r.path.clone(), r.message.clone())))
            .collect()
    }
}

impl Default for Ruleset {
    fn default() -> Self {
        Self::recommended()
    }
}
