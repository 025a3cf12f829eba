//! Local `$ref` handling.
//!
//! This module provides the reusable-object reference counter, the resolver
//! producing the dereferenced view most rules run on, and the mapping of
//! locations in that view back to the raw document.
//!
//! Only local references (`#/...`) are followed. External references are
//! left untouched.

use std::collections::HashSet;

use percent_encoding::percent_decode_str;
use serde_json::{Map, Value};

use crate::error::Diagnostic;
use crate::path::JsonPath;

/// Message reported for a reusable object nothing points at.
pub const ORPHAN_MESSAGE: &str = "Potential orphaned reusable object has been detected.";

/// Returns the JSON Pointer of a local reference, percent-decoded.
///
/// ```rust
/// use oaslint::refs::local_pointer;
///
/// assert_eq!(local_pointer("#/components/schemas/Pet%20Food"), Some("/components/schemas/Pet Food".to_string()));
/// assert_eq!(local_pointer("#"), Some(String::new()));
/// assert_eq!(local_pointer("other.yaml#/Pet"), None);
/// ```
pub fn local_pointer(reference: &str) -> Option<String> {
    let fragment = reference.strip_prefix('#')?;
    Some(percent_decode_str(fragment).decode_utf8_lossy().into_owned())
}

fn local_ref(node: &Value) -> Option<String> {
    node.as_object()?
        .get("$ref")?
        .as_str()
        .and_then(local_pointer)
}

/// Collects the pointers of every local `$ref` in the document.
pub fn referenced_pointers(document: &Value) -> HashSet<String> {
    let mut found = HashSet::new();
    collect_refs(document, &mut found);
    found
}

fn collect_refs(node: &Value, found: &mut HashSet<String>) {
    match node {
        Value::Object(map) => {
            if let Some(pointer) = map.get("$ref").and_then(Value::as_str).and_then(local_pointer) {
                found.insert(pointer);
            }
            map.values().for_each(|child| collect_refs(child, found));
        }
        Value::Array(items) => items.iter().for_each(|child| collect_refs(child, found)),
        _ => {}
    }
}

/// Reports the members of the object at `location` that no local `$ref`
/// points at or into.
///
/// # Example
///
/// ```rust
/// use oaslint::refs::unreferenced;
/// use oaslint::JsonPath;
/// use serde_json::json;
///
/// let document = json!({
///     "paths": { "/a": { "get": { "responses": { "200": { "$ref": "#/components/responses/Ok" } } } } },
///     "components": { "responses": { "Ok": {}, "Gone": {} } }
/// });
///
/// let orphans = unreferenced(&document, &JsonPath::from_segments(["components", "responses"]));
/// assert_eq!(orphans.len(), 1);
/// assert_eq!(orphans[0].path.to_string(), "components.responses.Gone");
/// ```
pub fn unreferenced(document: &Value, location: &JsonPath) -> Vec<Diagnostic> {
    let Some(members) = location.resolve(document).and_then(Value::as_object) else {
        return Vec::new();
    };
    let pointers = referenced_pointers(document);

    members
        .keys()
        .map(|name| location.push_field(name.clone()))
        .filter(|member| {
            let pointer = member.to_pointer();
            let nested = format!("{}/", pointer);
            !pointers
                .iter()
                .any(|p| *p == pointer || p.starts_with(&nested))
        })
        .map(|member| {
            Diagnostic::new(member, ORPHAN_MESSAGE).with_code("unreferenced-reusable-object")
        })
        .collect()
}

/// Returns a copy of the document with every local `$ref` replaced by its
/// target.
///
/// A reference that closes a cycle, or whose target does not exist, is kept
/// as a `$ref` node.
pub fn resolve_local_refs(document: &Value) -> Value {
    let mut stack = Vec::new();
    resolve_node(document, document, &mut stack)
}

fn resolve_node(node: &Value, root: &Value, stack: &mut Vec<String>) -> Value {
    if let Some(pointer) = local_ref(node) {
        if stack.contains(&pointer) {
            return node.clone();
        }
        let Some(target) = JsonPath::from_pointer(&pointer, root).resolve(root) else {
            return node.clone();
        };
        stack.push(pointer);
        let resolved = resolve_node(target, root, stack);
        stack.pop();
        return resolved;
    }

    match node {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, child)| (key.clone(), resolve_node(child, root, stack)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|child| resolve_node(child, root, stack))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Maps a location in the resolved view back into the raw document.
///
/// Whenever the walk reaches a local `$ref` node, the location continues from
/// the referenced node instead, so the result always names a node that
/// exists in `raw`.
///
/// ```rust
/// use oaslint::refs::map_to_source;
/// use oaslint::JsonPath;
/// use serde_json::json;
///
/// let raw = json!({
///     "paths": { "/a": { "get": { "parameters": [{ "$ref": "#/parameters/Id" }] } } },
///     "parameters": { "Id": { "name": "id", "in": "path" } }
/// });
/// let resolved = JsonPath::root()
///     .push_field("paths").push_field("/a").push_field("get")
///     .push_field("parameters").push_index(0).push_field("required");
///
/// assert_eq!(map_to_source(&raw, &resolved).to_string(), "parameters.Id.required");
/// ```
pub fn map_to_source(raw: &Value, path: &JsonPath) -> JsonPath {
    let mut mapped = JsonPath::root();
    let mut node = Some(raw);
    let mut segments = path.segments();

    while let Some(segment) = segments.next() {
        let mut visited = HashSet::new();
        while let Some(pointer) = node.and_then(local_ref) {
            if !visited.insert(pointer.clone()) {
                break;
            }
            let target_path = JsonPath::from_pointer(&pointer, raw);
            match target_path.resolve(raw) {
                Some(target) => {
                    node = Some(target);
                    mapped = target_path;
                }
                None => break,
            }
        }

        mapped = mapped.push(segment.clone());
        node = node.and_then(|n| JsonPath::root().push(segment.clone()).resolve(n));
        if node.is_none() {
            for rest in segments.by_ref() {
                mapped = mapped.push(rest.clone());
            }
        }
    }

    mapped
}
