//! Rule functions.
//!
//! Each checker is a small type implementing [`RuleFunction`]. Checkers are
//! independent of one another, stateless per call, and return every finding
//! for their target rather than stopping at the first one.
//!
//! # Example
//!
//! ```rust
//! use oaslint::{JsonSchemaEngine, OperationIdUnique, RuleContext, RuleFunction};
//! use serde_json::json;
//!
//! let document = json!({
//!     "swagger": "2.0",
//!     "paths": {
//!         "/a": { "get": { "operationId": "op" } },
//!         "/b": { "get": { "operationId": "op" } }
//!     }
//! });
//! let engine = JsonSchemaEngine::new();
//! let ctx = RuleContext::new(&document, &engine);
//!
//! let result = OperationIdUnique.check(&document, &ctx);
//! assert!(result.is_failure());
//! ```

mod discriminator;
mod document_schema;
mod example;
mod form_data;
mod op_params;
mod operation_id;
pub(crate) mod operations;
mod path_params;
mod ref_siblings;
mod schema;
mod security;
mod server_variables;
mod success_response;
mod tags;
mod traits;
mod typed_enum;
mod unused_component;

pub use discriminator::OasDiscriminator;
pub use document_schema::DocumentSchema;
pub use example::{media_items, schema_items, ExampleKind, OasExample, ValidationItem};
pub use form_data::FormDataConsumes;
pub use op_params::OperationParameters;
pub use operation_id::OperationIdUnique;
pub use path_params::PathParams;
pub use ref_siblings::RefSiblings;
pub use schema::{convert_x_nullable, rewrite_nullable, OasSchema};
pub use security::SecurityDefined;
pub use server_variables::{encode_uri, ServerVariables, Substitutions};
pub use success_response::SuccessResponse;
pub use tags::TagDefined;
pub use traits::RuleFunction;
pub use typed_enum::{classify, TypedEnum, ValueType};
pub use unused_component::UnusedComponent;
