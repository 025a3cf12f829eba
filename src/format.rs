//! Document format and JSON-Schema dialect detection.
//!
//! The OpenAPI version of a document is detected once, up front, and the
//! resulting [`DocFormat`] is threaded through every rule function.

use std::fmt::{self, Display};
use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

/// The OpenAPI major/minor line a document belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocFormat {
    /// Swagger / OpenAPI 2.0
    V2,
    /// OpenAPI 3.0.x
    V30,
    /// OpenAPI 3.1.x
    V31,
}

impl DocFormat {
    /// Detects the format from the `swagger` / `openapi` version fields.
    ///
    /// Returns `None` when the document is not recognized.
    ///
    /// # Example
    ///
    /// ```rust
    /// use oaslint::DocFormat;
    /// use serde_json::json;
    ///
    /// assert_eq!(DocFormat::detect(&json!({"swagger": "2.0"})), Some(DocFormat::V2));
    /// assert_eq!(DocFormat::detect(&json!({"openapi": "3.0.3"})), Some(DocFormat::V30));
    /// assert_eq!(DocFormat::detect(&json!({"openapi": "3.1.0"})), Some(DocFormat::V31));
    /// assert_eq!(DocFormat::detect(&json!({"asyncapi": "2.0.0"})), None);
    /// ```
    pub fn detect(document: &Value) -> Option<Self> {
        let map = document.as_object()?;

        let format = if map
            .get("swagger")
            .and_then(version_text)
            .is_some_and(|v| matches_line(&v, "2.0"))
        {
            Some(DocFormat::V2)
        } else if let Some(version) = map.get("openapi").and_then(version_text) {
            if matches_line(&version, "3.0") {
                Some(DocFormat::V30)
            } else if matches_line(&version, "3.1") {
                Some(DocFormat::V31)
            } else {
                None
            }
        } else {
            None
        };

        tracing::debug!(?format, "detected document format");
        format
    }

    /// True for the OpenAPI 3.x lines.
    pub fn is_oas3(self) -> bool {
        matches!(self, DocFormat::V30 | DocFormat::V31)
    }

    /// The major version number used to pick field tables (2 or 3).
    pub fn major(self) -> u8 {
        match self {
            DocFormat::V2 => 2,
            DocFormat::V30 | DocFormat::V31 => 3,
        }
    }

    /// The canonical schema version tag: `2.0`, `3.0` or `3.1`.
    pub fn version_tag(self) -> &'static str {
        match self {
            DocFormat::V2 => "2.0",
            DocFormat::V30 => "3.0",
            DocFormat::V31 => "3.1",
        }
    }
}

impl Display for DocFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocFormat::V2 => write!(f, "oas2"),
            DocFormat::V30 => write!(f, "oas3.0"),
            DocFormat::V31 => write!(f, "oas3.1"),
        }
    }
}

fn version_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// `2.0`, `2.0.1` or `2.0.` all belong to the `2.0` line; `2.01` does not.
fn matches_line(version: &str, line: &str) -> bool {
    match version.strip_prefix(line) {
        Some("") => true,
        Some(rest) => rest
            .strip_prefix('.')
            .is_some_and(|patch| patch.chars().all(|c| c.is_ascii_digit())),
        None => false,
    }
}

/// The JSON-Schema draft governing keyword semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// Infer the draft from the schema's `$schema`.
    Auto,
    /// draft-04
    Draft4,
    /// draft-06
    Draft6,
    /// draft-07
    Draft7,
    /// 2019-09
    Draft201909,
    /// 2020-12
    Draft202012,
}

impl Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dialect::Auto => "auto",
            Dialect::Draft4 => "draft4",
            Dialect::Draft6 => "draft6",
            Dialect::Draft7 => "draft7",
            Dialect::Draft201909 => "draft2019-09",
            Dialect::Draft202012 => "draft2020-12",
        };
        f.write_str(name)
    }
}

fn draft_uri() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^https?://json-schema\.org/(?:draft-0([4-7])|draft/(2019-09|2020-12))/(?:hyper-)?schema#?$",
        )
        .expect("draft URI pattern is valid")
    })
}

/// Extracts the draft named by a meta-schema URI such as a document's
/// `jsonSchemaDialect`.
///
/// Returns `None` for URIs that are not a known JSON-Schema meta-schema.
///
/// ```rust
/// use oaslint::{extract_draft_version, Dialect};
///
/// assert_eq!(
///     extract_draft_version("http://json-schema.org/draft-07/schema#"),
///     Some(Dialect::Draft7)
/// );
/// assert_eq!(
///     extract_draft_version("https://json-schema.org/draft/2019-09/schema"),
///     Some(Dialect::Draft201909)
/// );
/// assert_eq!(extract_draft_version("https://spec.openapis.org/oas/3.1/dialect/base"), None);
/// ```
pub fn extract_draft_version(uri: &str) -> Option<Dialect> {
    let captures = draft_uri().captures(uri)?;
    if let Some(draft) = captures.get(1) {
        return match draft.as_str() {
            "4" => Some(Dialect::Draft4),
            "6" => Some(Dialect::Draft6),
            "7" => Some(Dialect::Draft7),
            _ => None,
        };
    }
    match captures.get(2).map(|m| m.as_str()) {
        Some("2019-09") => Some(Dialect::Draft201909),
        Some("2020-12") => Some(Dialect::Draft202012),
        _ => None,
    }
}
