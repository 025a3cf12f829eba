//! Diagnostic types.
//!
//! This module provides [`Diagnostic`] for a single finding and
//! [`Diagnostics`] for the non-empty, ordered list a rule function reports.

use std::fmt::{self, Display};

use stillwater::prelude::*;

use crate::path::JsonPath;

/// A single finding produced by a rule function.
///
/// - **path**: Where in the document the problem is
/// - **message**: Human-readable description
/// - **code**: Machine-readable identifier (the rule or keyword that fired)
///
/// # Example
///
/// ```rust
/// use oaslint::{Diagnostic, JsonPath};
///
/// let diagnostic = Diagnostic::new(
///     JsonPath::from_segments(["paths", "/pets", "get", "operationId"]),
///     "operationId must be unique.",
/// )
/// .with_code("operation-operationId-unique");
///
/// assert_eq!(diagnostic.code, "operation-operationId-unique");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    /// The location the finding refers to.
    pub path: JsonPath,
    /// Human-readable message.
    pub message: String,
    /// Machine-readable code.
    pub code: String,
}

impl Diagnostic {
    /// Creates a new diagnostic with the given path and message.
    ///
    /// The code defaults to "diagnostic". Use `with_code` to set
    /// a more specific code.
    pub fn new(path: JsonPath, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
            code: "diagnostic".to_string(),
        }
    }

    /// Sets the code and returns self for chaining.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Replaces the message and returns self for chaining.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path_str = if self.path.is_root() {
            "(root)".to_string()
        } else {
            self.path.to_string()
        };

        write!(f, "{}: {}", path_str, self.message)
    }
}

impl std::error::Error for Diagnostic {}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Diagnostic>();
    assert_sync::<Diagnostic>();
};

/// A non-empty, ordered collection of diagnostics.
///
/// `Diagnostics` wraps a `NonEmptyVec<Diagnostic>` so that a failed check
/// always carries at least one finding. Results from independent checks are
/// merged with `Semigroup::combine`, preserving order:
///
/// ```rust
/// use oaslint::{Diagnostic, Diagnostics, JsonPath};
/// use stillwater::prelude::*;
///
/// let first = Diagnostics::single(Diagnostic::new(JsonPath::from_field("info"), "missing"));
/// let second = Diagnostics::single(Diagnostic::new(JsonPath::from_field("paths"), "missing"));
///
/// assert_eq!(first.combine(second).len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostics(NonEmptyVec<Diagnostic>);

impl Diagnostics {
    /// Creates a collection containing a single diagnostic.
    pub fn single(diagnostic: Diagnostic) -> Self {
        Self(NonEmptyVec::singleton(diagnostic))
    }

    /// Creates a collection from a `Vec`, or `None` when it is empty.
    pub fn from_vec(diagnostics: Vec<Diagnostic>) -> Option<Self> {
        let mut rest = diagnostics.into_iter();
        let head = rest.next()?;
        Some(rest.fold(Self::single(head), |acc, d| acc.combine(Self::single(d))))
    }

    /// Returns the number of diagnostics in this collection.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; the collection is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns an iterator over the contained diagnostics.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    /// Returns all diagnostics at the specified path.
    pub fn at_path(&self, path: &JsonPath) -> Vec<&Diagnostic> {
        self.0.iter().filter(|d| &d.path == path).collect()
    }

    /// Returns all diagnostics with the specified code.
    pub fn with_code(&self, code: &str) -> Vec<&Diagnostic> {
        self.0.iter().filter(|d| d.code == code).collect()
    }

    /// Returns the first diagnostic in the collection.
    pub fn first(&self) -> &Diagnostic {
        self.0.head()
    }

    /// Converts this collection into a `Vec<Diagnostic>`.
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.0.into_vec()
    }
}

impl Semigroup for Diagnostics {
    fn combine(self, other: Self) -> Self {
        Diagnostics(self.0.combine(other.0))
    }
}

impl Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} problem(s):", self.len())?;
        for (i, diagnostic) in self.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, diagnostic)?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostics {}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = Box<dyn Iterator<Item = &'a Diagnostic> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.0.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_defaults() {
        let diagnostic = Diagnostic::new(JsonPath::from_field("info"), "missing");

        assert_eq!(diagnostic.code, "diagnostic");
        assert_eq!(diagnostic.to_string(), "info: missing");
    }

    #[test]
    fn test_diagnostic_display_root() {
        let diagnostic = Diagnostic::new(JsonPath::root(), "not an object");
        assert_eq!(diagnostic.to_string(), "(root): not an object");
    }

    #[test]
    fn test_from_vec_rejects_empty() {
        assert!(Diagnostics::from_vec(Vec::new()).is_none());

        let diagnostics =
            Diagnostics::from_vec(vec![Diagnostic::new(JsonPath::root(), "a")]).unwrap();
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_combine_preserves_order() {
        let a = Diagnostics::single(Diagnostic::new(JsonPath::from_field("a"), "1"));
        let b = Diagnostics::single(Diagnostic::new(JsonPath::from_field("b"), "2"));
        let c = Diagnostics::single(Diagnostic::new(JsonPath::from_field("c"), "3"));

        let left = a.clone().combine(b.clone()).combine(c.clone());
        let right = a.combine(b.combine(c));

        let left: Vec<_> = left.iter().map(|d| d.message.as_str()).collect();
        let right: Vec<_> = right.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(left, vec!["1", "2", "3"]);
        assert_eq!(left, right);
    }
}
