//! Traversal of the operations of a `paths` object.

use serde_json::Value;

/// Keys of a path item that hold operations.
pub(crate) const VERBS: [&str; 8] = [
    "get", "head", "post", "put", "patch", "delete", "options", "trace",
];

/// One operation found under `paths`.
pub(crate) struct Operation<'a> {
    pub path: &'a str,
    pub verb: &'a str,
    pub value: &'a Value,
}

/// Iterates every object-valued operation in document order.
///
/// Yields nothing when `paths` is not an object; path items that are not
/// objects are skipped.
pub(crate) fn operations(paths: Option<&Value>) -> impl Iterator<Item = Operation<'_>> {
    paths
        .and_then(Value::as_object)
        .into_iter()
        .flat_map(|paths| paths.iter())
        .filter_map(|(path, item)| item.as_object().map(|item| (path, item)))
        .flat_map(|(path, item)| {
            item.iter()
                .filter(|(verb, value)| value.is_object() && VERBS.contains(&verb.as_str()))
                .map(move |(verb, value)| Operation {
                    path: path.as_str(),
                    verb: verb.as_str(),
                    value,
                })
        })
}

/// Renders a scalar the way a string template would.
pub(crate) fn display_value(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
