//! Per-invocation rule context.
//!
//! This module provides [`RuleContext`], the bundle every rule function
//! receives next to its target value: the whole document, the detected
//! format, the target's location, and the schema services.

use serde_json::Value;

use crate::engine::SchemaEngine;
use crate::format::DocFormat;
use crate::path::JsonPath;
use crate::registry::SchemaRegistry;

/// Context carried into every rule function call.
///
/// Contexts are cheap to copy around; [`RuleContext::at`] derives a context
/// for a nested location without touching the document.
#[derive(Clone)]
pub struct RuleContext<'a> {
    document: &'a Value,
    format: Option<DocFormat>,
    path: JsonPath,
    engine: &'a dyn SchemaEngine,
    registry: &'a SchemaRegistry,
}

impl<'a> RuleContext<'a> {
    /// Creates a root context, detecting the document format.
    pub fn new(document: &'a Value, engine: &'a dyn SchemaEngine) -> Self {
        Self {
            document,
            format: DocFormat::detect(document),
            path: JsonPath::root(),
            engine,
            registry: SchemaRegistry::canonical(),
        }
    }

    /// Overrides the detected format.
    pub fn with_format(mut self, format: Option<DocFormat>) -> Self {
        self.format = format;
        self
    }

    /// Uses a different schema registry.
    pub fn with_registry(mut self, registry: &'a SchemaRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Returns a copy of this context pointing at `path`.
    pub fn at(&self, path: JsonPath) -> Self {
        Self {
            path,
            ..self.clone()
        }
    }

    /// The whole document under validation.
    pub fn document(&self) -> &'a Value {
        self.document
    }

    /// The detected format, if the document was recognized.
    pub fn format(&self) -> Option<DocFormat> {
        self.format
    }

    /// Location of the target value.
    pub fn path(&self) -> &JsonPath {
        &self.path
    }

    /// The JSON-Schema service.
    pub fn engine(&self) -> &'a dyn SchemaEngine {
        self.engine
    }

    /// The document schema registry.
    pub fn registry(&self) -> &'a SchemaRegistry {
        self.registry
    }
}
