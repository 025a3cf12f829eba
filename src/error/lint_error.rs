use thiserror::Error;

use crate::registry::RegistryError;

/// Failures of the machinery around the rule functions.
///
/// Rule functions themselves never fail on malformed documents; these errors
/// come from the schema engine and the canonical schema registry.
#[derive(Debug, Error)]
pub enum LintError {
    /// The JSON-Schema engine could not compile a schema.
    #[error("unable to compile schema for {dialect}: {message}")]
    SchemaCompile {
        /// Dialect the schema was compiled under.
        dialect: String,
        /// Engine-provided reason.
        message: String,
    },

    /// A canonical schema lookup failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
