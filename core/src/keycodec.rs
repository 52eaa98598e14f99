//! Key codec
//!
//! Derives the composite store key for one list instance from its
//! key-leaf values, and splits a composite key back into named, typed
//! key-leaf values. Components are joined positionally in the order the
//! schema declares the list's keys, using the configured separator. A
//! key leaf may carry a registered rewrite transform (numeric id to
//! dotted notation and similar), applied before joining and inverted
//! after splitting.

use log::warn;

use crate::coerce;
use crate::config::EngineConfig;
use crate::error::{Result, TranslateError};
use crate::schema::{NodeKind, SchemaIndex};
use crate::transform::TransformRegistry;
use crate::value::TypedValue;

/// Derive the composite store key for a list instance.
///
/// `values` holds key-leaf values in path-predicate form, looked up by
/// key-leaf name. A missing value or a failing rewrite is a hard error
/// for the instance.
pub fn derive_store_key(
    schema: &SchemaIndex,
    registry: &TransformRegistry,
    config: &EngineConfig,
    list_xpath: &str,
    values: &[(String, String)],
) -> Result<String> {
    let list = require_list(schema, list_xpath)?;
    let (key, covered) = derive_partial_store_key(schema, registry, config, list_xpath, values)?;
    if covered != list.key_leafs.len() {
        return Err(TranslateError::KeyCodecError(format!(
            "no value for key leaf {} of {}",
            list.key_leafs[covered], list_xpath
        )));
    }
    Ok(key)
}

/// Derive the leading components of a composite key from a partial
/// predicate set, stopping at the first key leaf without a value.
/// Returns the joined prefix and the number of components it covers.
pub fn derive_partial_store_key(
    schema: &SchemaIndex,
    registry: &TransformRegistry,
    config: &EngineConfig,
    list_xpath: &str,
    values: &[(String, String)],
) -> Result<(String, usize)> {
    let list = require_list(schema, list_xpath)?;
    let mut components = Vec::with_capacity(list.key_leafs.len());

    for key_leaf in &list.key_leafs {
        let value = match values.iter().find(|(name, _)| name == key_leaf) {
            Some((_, v)) => v.clone(),
            None => break,
        };
        let leaf_xpath = format!("{}/{}", list_xpath, key_leaf);
        let leaf = schema.require(&leaf_xpath)?;
        let component = match &leaf.key_transform {
            Some(name) => registry.key_encode(name)?(&value)?,
            None => value,
        };
        components.push(component);
    }

    let covered = components.len();
    Ok((components.join(&config.key_separator.to_string()), covered))
}

/// Split a composite store key into named, typed key-leaf values in
/// declared order.
///
/// The component count must match the list's key declaration; a
/// mismatch or a failing rewrite is a hard error for the instance (the
/// caller skips it with a warning during enumeration).
pub fn split_store_key(
    schema: &SchemaIndex,
    registry: &TransformRegistry,
    config: &EngineConfig,
    list_xpath: &str,
    composite: &str,
) -> Result<Vec<(String, TypedValue)>> {
    let list = require_list(schema, list_xpath)?;
    let components: Vec<&str> = if list.key_leafs.len() <= 1 {
        vec![composite]
    } else {
        composite.split(config.key_separator).collect()
    };
    if components.len() != list.key_leafs.len() {
        warn!(
            "key {:?} has {} components, list {} declares {}",
            composite,
            components.len(),
            list_xpath,
            list.key_leafs.len()
        );
        return Err(TranslateError::KeyCodecError(format!(
            "key {:?} does not match the {} key leaves of {}",
            composite,
            list.key_leafs.len(),
            list_xpath
        )));
    }

    let mut out = Vec::with_capacity(components.len());
    for (key_leaf, component) in list.key_leafs.iter().zip(components) {
        let leaf_xpath = format!("{}/{}", list_xpath, key_leaf);
        let leaf = schema.require(&leaf_xpath)?;

        let raw = match &leaf.key_transform {
            Some(name) => registry.key_decode(name)?(component)?,
            None => component.to_string(),
        };
        let typed = match &leaf.value_type {
            Some(kind) => coerce::store_value_to_typed(schema, config, kind, &leaf_xpath, &raw)?,
            None => TypedValue::Text(raw),
        };
        out.push((key_leaf.clone(), typed));
    }
    Ok(out)
}

fn require_list<'a>(
    schema: &'a SchemaIndex,
    list_xpath: &str,
) -> Result<&'a crate::schema::SchemaNode> {
    let node = schema.require(list_xpath)?;
    if node.kind != NodeKind::List {
        return Err(TranslateError::SchemaInconsistency(format!(
            "{} is not a list node",
            list_xpath
        )));
    }
    if node.key_leafs.is_empty() {
        return Err(TranslateError::SchemaInconsistency(format!(
            "list {} declares no key leaves",
            list_xpath
        )));
    }
    Ok(node)
}
