//! # oaslint
//!
//! OpenAPI-aware validation rules that accumulate ALL findings for a document,
//! rather than stopping at the first problem.
//!
//! ## Overview
//!
//! An OpenAPI description can be wrong in two ways. It can break the shape
//! described by the canonical JSON-Schema for its version, or it can be
//! well-shaped but inconsistent: duplicate operation ids, path parameters that
//! are never declared, examples that do not match their schema. oaslint checks
//! both, for Swagger 2.0, OpenAPI 3.0.x and OpenAPI 3.1.x.
//!
//! Every rule function returns a [`CheckResult`], stillwater's `Validation`
//! over a non-empty list of [`Diagnostic`]s. Success means no findings.
//!
//! ## Core Types
//!
//! - [`DocFormat`]: the detected OpenAPI line, computed once per document
//! - [`JsonPath`]: a location inside the document (e.g. `paths./users.get`)
//! - [`Diagnostic`] / [`Diagnostics`]: located findings
//! - [`RuleFunction`]: the strategy interface every checker implements
//! - [`Ruleset`]: the built-in rule catalog and its runner
//!
//! ## Example
//!
//! ```rust
//! use oaslint::{LintOptions, Ruleset};
//! use serde_json::json;
//!
//! let document = json!({
//!     "openapi": "3.0.3",
//!     "info": { "title": "Pets", "version": "1.0.0" },
//!     "paths": {
//!         "/pets": {
//!             "get": { "operationId": "listPets", "responses": { "200": { "description": "ok" } } },
//!             "post": { "operationId": "listPets", "responses": { "201": { "description": "ok" } } }
//!         }
//!     }
//! });
//!
//! let results = Ruleset::recommended().run(&document, &LintOptions::default());
//! assert!(results
//!     .iter()
//!     .any(|r| r.code == "operation-operationId-unique" && r.path.to_string() == "paths./pets.post.operationId"));
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod format;
pub mod functions;
pub mod path;
pub mod refs;
pub mod registry;
pub mod results;
pub mod ruleset;

pub use context::RuleContext;
pub use engine::{JsonSchemaEngine, RawError, SchemaEngine};
pub use error::{Diagnostic, Diagnostics, LintError};
pub use format::{extract_draft_version, Dialect, DocFormat};
pub use functions::{
    classify, convert_x_nullable, encode_uri, media_items, rewrite_nullable, schema_items,
    DocumentSchema, ExampleKind, FormDataConsumes, OasDiscriminator, OasExample, OasSchema,
    OperationIdUnique, OperationParameters, PathParams, RefSiblings, RuleFunction, SecurityDefined,
    ServerVariables, Substitutions, SuccessResponse, TagDefined, TypedEnum, UnusedComponent,
    ValidationItem, ValueType,
};
pub use path::{JsonPath, PathSegment};
pub use registry::{RegistryError, SchemaRegistry};
pub use results::{apply_manual_replacements, prepare_results};
pub use ruleset::{LintOptions, LintResult, NodeFilter, Rule, Ruleset, Severity, Target};

/// Type alias for the outcome of one rule function call.
pub type CheckResult = stillwater::Validation<(), Diagnostics>;

/// Folds a list of findings into a [`CheckResult`].
///
/// An empty list is a success.
pub fn check_result(diagnostics: Vec<Diagnostic>) -> CheckResult {
    match Diagnostics::from_vec(diagnostics) {
        Some(diagnostics) => stillwater::Validation::Failure(diagnostics),
        None => stillwater::Validation::Success(()),
    }
}
