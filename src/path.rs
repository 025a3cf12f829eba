//! Document locations for diagnostics.
//!
//! This module provides [`JsonPath`] and [`PathSegment`] for addressing a node
//! inside an API document. Every diagnostic carries one, and it must name a
//! location that exists in the original document so tooling can highlight it.

use std::cmp::Ordering;
use std::fmt::{self, Display};

use serde_json::Value;

/// A segment of a document path: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathSegment {
    /// An object member (e.g., `paths`, `/users/{id}`, `get`)
    Field(String),
    /// An array position (e.g., `[0]`)
    Index(usize),
}

impl PathSegment {
    /// Creates a new field segment.
    pub fn field(name: impl Into<String>) -> Self {
        PathSegment::Field(name.into())
    }

    /// Creates a new index segment.
    pub fn index(idx: usize) -> Self {
        PathSegment::Index(idx)
    }

    /// Returns the segment as it would appear in a joined string path.
    pub fn as_key(&self) -> String {
        match self {
            PathSegment::Field(name) => name.clone(),
            PathSegment::Index(idx) => idx.to_string(),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(name: &str) -> Self {
        PathSegment::Field(name.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(name: String) -> Self {
        PathSegment::Field(name)
    }
}

impl From<usize> for PathSegment {
    fn from(idx: usize) -> Self {
        PathSegment::Index(idx)
    }
}

/// A path to a node in an API document.
///
/// # Example
///
/// ```rust
/// use oaslint::JsonPath;
///
/// let path = JsonPath::root()
///     .push_field("paths")
///     .push_field("/users")
///     .push_field("get")
///     .push_field("parameters")
///     .push_index(0);
///
/// assert_eq!(path.to_string(), "paths./users.get.parameters[0]");
/// assert_eq!(path.to_pointer(), "/paths/~1users/get/parameters/0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct JsonPath {
    segments: Vec<PathSegment>,
}

impl JsonPath {
    /// Creates an empty path representing the document root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Creates a path from a single field segment.
    pub fn from_field(name: impl Into<String>) -> Self {
        Self {
            segments: vec![PathSegment::Field(name.into())],
        }
    }

    /// Creates a path from a list of segments.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<PathSegment>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses a JSON Pointer (`/a/b~1c/0`) into a path.
    ///
    /// The document is walked alongside the pointer so that numeric tokens
    /// become [`PathSegment::Index`] only where the node is actually an array.
    pub fn from_pointer(pointer: &str, document: &Value) -> Self {
        let pointer = pointer.strip_prefix('#').unwrap_or(pointer);
        let mut segments = Vec::new();
        let mut node = Some(document);

        for token in pointer.split('/').skip(1) {
            let token = token.replace("~1", "/").replace("~0", "~");
            let segment = match (node, token.parse::<usize>()) {
                (Some(Value::Array(_)), Ok(idx)) => PathSegment::Index(idx),
                _ => PathSegment::Field(token),
            };
            node = node.and_then(|n| step(n, &segment));
            segments.push(segment);
        }

        Self { segments }
    }

    /// Returns a new path with a field segment appended.
    pub fn push_field(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Field(name.into()));
        Self { segments }
    }

    /// Returns a new path with an index segment appended.
    pub fn push_index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Index(index));
        Self { segments }
    }

    /// Returns a new path with a segment appended.
    pub fn push(&self, segment: impl Into<PathSegment>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    /// Returns a new path with every segment of `other` appended.
    pub fn join(&self, other: &JsonPath) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Self { segments }
    }

    /// Returns true if this is the root path (no segments).
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the number of segments in this path.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true if this path has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns an iterator over the path segments.
    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.segments.iter()
    }

    /// Returns the parent path (all segments except the last), or None if this is root.
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            None
        } else {
            Some(Self {
                segments: self.segments[..self.segments.len() - 1].to_vec(),
            })
        }
    }

    /// Returns the last segment, or None if this is root.
    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// Returns true if `prefix` names this node or one of its ancestors.
    pub fn starts_with(&self, prefix: &JsonPath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Returns the remainder of this path after `prefix`, if it is a prefix.
    pub fn strip_prefix(&self, prefix: &JsonPath) -> Option<Self> {
        self.segments
            .strip_prefix(prefix.segments.as_slice())
            .map(|rest| Self {
                segments: rest.to_vec(),
            })
    }

    /// Joins the segments with `/`, the form used for pattern matching.
    pub fn joined(&self) -> String {
        self.segments
            .iter()
            .map(PathSegment::as_key)
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Renders the path as a JSON Pointer.
    pub fn to_pointer(&self) -> String {
        let mut pointer = String::new();
        for segment in &self.segments {
            pointer.push('/');
            pointer.push_str(&segment.as_key().replace('~', "~0").replace('/', "~1"));
        }
        pointer
    }

    /// Looks up the node this path names inside `root`.
    pub fn resolve<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(root, |node, segment| step(node, segment))
    }

    /// Orders paths so that descendants come before their ancestors.
    ///
    /// Siblings compare by segment; a path sorts before any of its prefixes.
    pub fn post_order_cmp(&self, other: &JsonPath) -> Ordering {
        for (a, b) in self.segments.iter().zip(other.segments.iter()) {
            match a.cmp(b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        other.segments.len().cmp(&self.segments.len())
    }
}

fn step<'a>(node: &'a Value, segment: &PathSegment) -> Option<&'a Value> {
    match (node, segment) {
        (Value::Object(map), PathSegment::Field(name)) => map.get(name),
        (Value::Object(map), PathSegment::Index(idx)) => map.get(&idx.to_string()),
        (Value::Array(items), PathSegment::Index(idx)) => items.get(*idx),
        (Value::Array(items), PathSegment::Field(name)) => {
            name.parse::<usize>().ok().and_then(|idx| items.get(idx))
        }
        _ => None,
    }
}

impl Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Field(name) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", name)?;
                }
                PathSegment::Index(idx) => write!(f, "[{}]", idx)?,
            }
        }
        Ok(())
    }
}
