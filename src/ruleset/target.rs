//! Selection of the document locations a rule runs on.

use indexmap::IndexMap;
use serde_json::Value;

use crate::functions::operations::operations;
use crate::path::{JsonPath, PathSegment};

/// A filter over every node of the document below the root.
///
/// Objects that are the `properties` map of a schema never match, since
/// their keys are property names rather than keywords.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeFilter {
    /// The node must sit strictly below a member with one of these keys. A
    /// dotted entry such as `components.schemas` is anchored at the root.
    /// Empty means anywhere.
    pub below: &'static [&'static str],
    /// At least one of these keys must be present. Empty means no constraint.
    pub present: &'static [&'static str],
    /// All of these keys must hold a truthy value.
    pub truthy: &'static [&'static str],
    /// The node must look like a schema (`enum`, `type`, `format`, `$ref`,
    /// `properties` or `items`).
    pub schema_like: bool,
}

const SCHEMA_MARKERS: [&str; 6] = ["enum", "type", "format", "$ref", "properties", "items"];

impl NodeFilter {
    fn matches(&self, path: &JsonPath, node: &Value) -> bool {
        let Some(map) = node.as_object() else {
            return false;
        };
        if path.last() == Some(&PathSegment::Field("properties".to_string())) {
            return false;
        }
        if !self.below.is_empty() && !self.below.iter().any(|key| is_below(path, key)) {
            return false;
        }
        if !self.present.is_empty() && !self.present.iter().any(|key| map.contains_key(*key)) {
            return false;
        }
        if !self.truthy.iter().all(|key| map.get(*key).is_some_and(truthy)) {
            return false;
        }
        !self.schema_like || SCHEMA_MARKERS.iter().any(|key| map.get(*key).is_some_and(truthy))
    }
}

fn is_below(path: &JsonPath, key: &str) -> bool {
    let segments: Vec<&PathSegment> = path.segments().collect();
    if key.contains('.') {
        let anchor = JsonPath::from_segments(key.split('.'));
        return path.len() > anchor.len() && path.starts_with(&anchor);
    }
    segments
        .iter()
        .take(segments.len().saturating_sub(1))
        .any(|segment| matches!(segment, PathSegment::Field(name) if name == key))
}

/// JavaScript truthiness of a JSON value.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Where a rule is applied.
#[derive(Debug, Clone, Copy)]
pub enum Target {
    /// The document root.
    Document,
    /// Every operation object under `paths`.
    Operations,
    /// One member of every operation object, where present.
    OperationField(&'static str),
    /// The value of every `$ref` member.
    RefValues,
    /// Every node accepted by the filter, or the named member of it.
    Nodes {
        /// Which nodes to visit.
        filter: NodeFilter,
        /// Member of the node to target instead of the node itself.
        field: Option<&'static str>,
    },
    /// Members of `definitions` with a truthy value for the key.
    DefinitionsWith(&'static str),
    /// Every Server Object: root, path item, operation and link servers.
    Servers,
}

impl Target {
    /// Lists the targeted values with their locations, in document order.
    pub fn select<'a>(&self, document: &'a Value) -> Vec<(JsonPath, &'a Value)> {
        match *self {
            Target::Document => vec![(JsonPath::root(), document)],
            Target::Operations => operations_of(document).collect(),
            Target::OperationField(field) => operations_of(document)
                .filter_map(|(path, op)| op.get(field).map(|value| (path.push_field(field), value)))
                .collect(),
            Target::RefValues => {
                let mut found = Vec::new();
                walk(document, &JsonPath::root(), &mut |path, node| {
                    if path.last() == Some(&PathSegment::Field("$ref".to_string())) {
                        found.push((path.clone(), node));
                    }
                });
                found
            }
            Target::Nodes { filter, field } => {
                let mut found = Vec::new();
                walk(document, &JsonPath::root(), &mut |path, node| {
                    if path.is_root() || !filter.matches(path, node) {
                        return;
                    }
                    match field {
                        Some(field) => {
                            if let Some(member) = node.get(field) {
                                found.push((path.push_field(field), member));
                            }
                        }
                        None => found.push((path.clone(), node)),
                    }
                });
                found
            }
            Target::DefinitionsWith(key) => document
                .get("definitions")
                .and_then(Value::as_object)
                .into_iter()
                .flatten()
                .filter(|(_, schema)| schema.get(key).is_some_and(truthy))
                .map(|(name, schema)| {
                    (JsonPath::from_segments(["definitions", name.as_str()]), schema)
                })
                .collect(),
            Target::Servers => servers(document),
        }
    }
}

fn operations_of(document: &Value) -> impl Iterator<Item = (JsonPath, &Value)> {
    operations(document.get("paths")).map(|op| {
        (
            JsonPath::from_segments(["paths", op.path, op.verb]),
            op.value,
        )
    })
}

/// Pre-order walk over every node, root included.
fn walk<'a, F>(node: &'a Value, path: &JsonPath, visit: &mut F)
where
    F: FnMut(&JsonPath, &'a Value),
{
    visit(path, node);
    match node {
        Value::Object(map) => {
            for (key, child) in map {
                walk(child, &path.push_field(key.clone()), visit);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                walk(child, &path.push_index(index), visit);
            }
        }
        _ => {}
    }
}

fn servers(document: &Value) -> Vec<(JsonPath, &Value)> {
    let mut found: IndexMap<JsonPath, &Value> = IndexMap::new();

    push_servers(&mut found, JsonPath::root(), document);
    if let Some(paths) = document.get("paths").and_then(Value::as_object) {
        for (path, item) in paths {
            push_servers(&mut found, JsonPath::from_segments(["paths", path.as_str()]), item);
        }
    }
    for (path, op) in operations_of(document) {
        push_servers(&mut found, path, op);
    }

    let component_links = JsonPath::from_segments(["components", "links"]);
    if let Some(links) = component_links.resolve(document) {
        push_link_servers(&mut found, component_links.clone(), links);
    }

    let mut responses = Vec::new();
    walk(document, &JsonPath::root(), &mut |path, node| {
        if path.last() == Some(&PathSegment::Field("responses".to_string())) {
            responses.push((path.clone(), node));
        }
    });
    for (path, node) in responses {
        let Some(members) = node.as_object() else {
            continue;
        };
        for (code, response) in members {
            if let Some(links) = response.get("links") {
                let base = path.push_field(code.clone()).push_field("links");
                push_link_servers(&mut found, base, links);
            }
        }
    }

    found.into_iter().collect()
}

fn push_link_servers<'a>(
    found: &mut IndexMap<JsonPath, &'a Value>,
    base: JsonPath,
    links: &'a Value,
) {
    let Some(links) = links.as_object() else {
        return;
    };
    for (name, link) in links {
        if let Some(server) = link.get("server") {
            found.insert(base.push_field(name.clone()).push_field("server"), server);
        }
    }
}

fn push_servers<'a>(found: &mut IndexMap<JsonPath, &'a Value>, base: JsonPath, owner: &'a Value) {
    let Some(servers) = owner.get("servers").and_then(Value::as_array) else {
        return;
    };
    let base = base.push_field("servers");
    for (index, server) in servers.iter().enumerate() {
        found.insert(base.push_index(index), server);
    }
}
