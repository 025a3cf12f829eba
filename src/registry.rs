//! Canonical document schemas.
//!
//! This module provides the [`SchemaRegistry`] that holds the JSON-Schema
//! documents describing the shape of an OpenAPI 2.0, 3.0 and 3.1 document.
//! The three canonical schemas are embedded in the crate and shared,
//! read-only, by every validation.

use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use crate::format::DocFormat;

const OAS_2: &str = include_str!("../schemas/oas2.json");
const OAS_3_0: &str = include_str!("../schemas/oas3_0.json");
const OAS_3_1: &str = include_str!("../schemas/oas3_1.json");

/// Type alias for the schema storage map.
type SchemaMap = Arc<RwLock<HashMap<String, Arc<Value>>>>;

/// A thread-safe registry of document schemas keyed by version tag.
///
/// # Thread Safety
///
/// The registry uses `Arc<RwLock<...>>`:
/// - Any number of validations may read concurrently
/// - Registration operations are serialized
///
/// # Example
///
/// ```rust
/// use oaslint::{DocFormat, SchemaRegistry};
///
/// let registry = SchemaRegistry::canonical();
/// let schema = registry.for_format(DocFormat::V30).unwrap();
///
/// assert_eq!(schema["$id"], "https://spec.openapis.org/oas/3.0/schema/2019-04-02");
/// ```
pub struct SchemaRegistry {
    schemas: SchemaMap,
}

impl SchemaRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self {
            schemas: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Creates a registry preloaded with the three canonical schemas.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Malformed` if an embedded schema does not parse.
    pub fn with_canonical() -> Result<Self, RegistryError> {
        let registry = Self::new();
        for (version, source) in [("2.0", OAS_2), ("3.0", OAS_3_0), ("3.1", OAS_3_1)] {
            let schema = serde_json::from_str(source)
                .map_err(|source| RegistryError::Malformed { version, source })?;
            registry.register(version, schema)?;
        }
        Ok(registry)
    }

    /// The process-wide registry of canonical schemas, loaded on first use.
    pub fn canonical() -> &'static SchemaRegistry {
        static CANONICAL: OnceLock<SchemaRegistry> = OnceLock::new();
        CANONICAL.get_or_init(|| {
            tracing::debug!("loading canonical OpenAPI schemas");
            Self::with_canonical().expect("embedded canonical schemas are valid JSON")
        })
    }

    /// Registers a schema under a version tag.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::DuplicateVersion` if the tag is already registered.
    ///
    /// # Example
    ///
    /// ```rust
    /// use oaslint::SchemaRegistry;
    /// use serde_json::json;
    ///
    /// let registry = SchemaRegistry::new();
    /// registry.register("3.2", json!({ "type": "object" })).unwrap();
    ///
    /// // Duplicate registration fails
    /// assert!(registry.register("3.2", json!({})).is_err());
    /// ```
    pub fn register(&self, version: impl Into<String>, schema: Value) -> Result<(), RegistryError> {
        let version = version.into();
        let mut schemas = self.schemas.write();

        if schemas.contains_key(&version) {
            return Err(RegistryError::DuplicateVersion(version));
        }

        schemas.insert(version, Arc::new(schema));
        Ok(())
    }

    /// Retrieves a schema by version tag.
    pub fn get(&self, version: &str) -> Option<Arc<Value>> {
        self.schemas.read().get(version).cloned()
    }

    /// Selects the document schema for a detected format.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::UnknownVersion` if no schema is registered for it.
    pub fn for_format(&self, format: DocFormat) -> Result<Arc<Value>, RegistryError> {
        let version = format.version_tag();
        self.get(version)
            .ok_or_else(|| RegistryError::UnknownVersion(version.to_string()))
    }

    /// Returns the registered version tags, sorted.
    pub fn versions(&self) -> Vec<String> {
        let mut versions: Vec<_> = self.schemas.read().keys().cloned().collect();
        versions.sort();
        versions
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for SchemaRegistry {
    fn clone(&self) -> Self {
        Self {
            schemas: Arc::clone(&self.schemas),
        }
    }
}

/// Errors that can occur during registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Attempted to register a schema under a tag that already exists.
    #[error("schema for version '{0}' already registered")]
    DuplicateVersion(String),

    /// No schema is registered for the requested version.
    #[error("no schema for OpenAPI version '{0}'")]
    UnknownVersion(String),

    /// An embedded schema is not valid JSON.
    #[error("embedded schema for version '{version}' is malformed: {source}")]
    Malformed {
        /// Version tag of the schema.
        version: &'static str,
        /// Underlying parse failure.
        #[source]
        source: serde_json::Error,
    },
}
