//! Result assembly
//!
//! Helpers merging per-node fragments into the parent's nested map.
//! The shape rules live here: empty containers are suppressed, list
//! collections render as arrays, and a single-instance query collapses
//! into a flat object merged directly into the caller's map.

use serde_json::Value as JsonValue;

use crate::value::JsonMap;

/// Merge produced fields into the parent map
pub(crate) fn merge_fields(parent: &mut JsonMap, fields: JsonMap) {
    for (name, value) in fields {
        parent.insert(name, value);
    }
}

/// Attach a child container result; empty maps are omitted
pub(crate) fn attach_container(parent: &mut JsonMap, name: &str, child: JsonMap) {
    if !child.is_empty() {
        parent.insert(name.to_string(), JsonValue::Object(child));
    }
}

/// Attach collected list instances.
///
/// An instance-level query with exactly one match flattens that
/// instance into the parent; a collection query appends to the array
/// under the list name (instances of the same list may arrive from
/// several backing tables).
pub(crate) fn attach_list(
    parent: &mut JsonMap,
    name: &str,
    instances: Vec<JsonMap>,
    instance_query: bool,
) {
    if instances.is_empty() {
        return;
    }
    if instance_query && instances.len() == 1 {
        let mut iter = instances.into_iter();
        if let Some(instance) = iter.next() {
            merge_fields(parent, instance);
        }
        return;
    }

    let mut items: Vec<JsonValue> = match parent.remove(name) {
        Some(JsonValue::Array(existing)) => existing,
        Some(other) => vec![other],
        None => Vec::new(),
    };
    items.extend(instances.into_iter().map(JsonValue::Object));
    parent.insert(name.to_string(), JsonValue::Array(items));
}
