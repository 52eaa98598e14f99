//! Type coercion
//!
//! Converts raw store strings into schema-typed values. Integer kinds
//! parse base 10 with range enforcement; the string family (string,
//! enum, union, identity-ref and unresolved leafrefs) passes through
//! unchanged because downstream schema binding performs its own
//! validation. Leafref kinds are resolved to their referenced primitive
//! type before coercing, following reference chains with cycle
//! detection.

use std::collections::HashSet;

use log::warn;

use crate::config::{EngineConfig, Strictness};
use crate::error::{Result, TranslateError};
use crate::path;
use crate::schema::SchemaIndex;
use crate::value::{ScalarKind, TypedValue};

/// Resolve the target path of a leafref expression relative to the
/// referring leaf. Absolute expressions index the schema directly;
/// relative ones walk up with `..` components.
fn leafref_target(leaf_xpath: &str, ref_path: &str) -> String {
    if ref_path.starts_with('/') {
        return path::strip_predicates(ref_path);
    }
    let mut cur = leaf_xpath.to_string();
    for comp in ref_path.split('/') {
        match comp {
            "" | "." => {}
            ".." => cur = path::parent(&cur).to_string(),
            name => {
                let name = name.split('[').next().unwrap_or(name);
                cur.push('/');
                cur.push_str(name);
            }
        }
    }
    cur
}

/// Follow a leafref chain to the real underlying primitive kind.
///
/// A cycle, a missing target or an exhausted depth budget falls back to
/// the unresolved kind (degraded, not fatal), which then coerces as a
/// string passthrough.
pub fn resolve_kind(
    schema: &SchemaIndex,
    config: &EngineConfig,
    kind: &ScalarKind,
    leaf_xpath: &str,
) -> ScalarKind {
    let original = kind.clone();
    let mut kind = kind.clone();
    let mut cur_xpath = leaf_xpath.to_string();
    let mut visited: HashSet<String> = HashSet::new();
    let mut depth = 0usize;

    while let ScalarKind::Leafref { path: ref_path } = &kind {
        if depth >= config.max_leafref_depth {
            warn!("leafref chain from {} exceeds depth {}", leaf_xpath, config.max_leafref_depth);
            return original;
        }
        let target = leafref_target(&cur_xpath, ref_path);
        if !visited.insert(target.clone()) {
            warn!("leafref cycle via {} from {}", target, leaf_xpath);
            return original;
        }
        match schema.node(&target).and_then(|n| n.value_type.clone()) {
            Some(next) => {
                kind = next;
                cur_xpath = target;
                depth += 1;
            }
            None => {
                warn!("leafref target {} not found for {}", target, leaf_xpath);
                return original;
            }
        }
    }
    kind
}

/// Coerce one raw store string into its schema-declared type
pub fn store_value_to_typed(
    schema: &SchemaIndex,
    config: &EngineConfig,
    kind: &ScalarKind,
    leaf_xpath: &str,
    raw: &str,
) -> Result<TypedValue> {
    let resolved = resolve_kind(schema, config, kind, leaf_xpath);
    let int_err = |what: &str| {
        warn!("value {:?} at {} is not a valid {}", raw, leaf_xpath, what);
        TranslateError::TypeError(format!("{:?} at {} is not a valid {}", raw, leaf_xpath, what))
    };

    match resolved {
        ScalarKind::Int8 => raw.parse::<i8>().map(TypedValue::Int8).map_err(|_| int_err("int8")),
        ScalarKind::Int16 => raw.parse::<i16>().map(TypedValue::Int16).map_err(|_| int_err("int16")),
        ScalarKind::Int32 => raw.parse::<i32>().map(TypedValue::Int32).map_err(|_| int_err("int32")),
        ScalarKind::Int64 => raw.parse::<i64>().map(TypedValue::Int64).map_err(|_| int_err("int64")),
        ScalarKind::Uint8 => raw.parse::<u8>().map(TypedValue::Uint8).map_err(|_| int_err("uint8")),
        ScalarKind::Uint16 => raw.parse::<u16>().map(TypedValue::Uint16).map_err(|_| int_err("uint16")),
        ScalarKind::Uint32 => raw.parse::<u32>().map(TypedValue::Uint32).map_err(|_| int_err("uint32")),
        ScalarKind::Uint64 => raw.parse::<u64>().map(TypedValue::Uint64).map_err(|_| int_err("uint64")),
        ScalarKind::Bool => match raw {
            "true" => Ok(TypedValue::Bool(true)),
            "false" => Ok(TypedValue::Bool(false)),
            _ => Err(int_err("bool")),
        },
        ScalarKind::String
        | ScalarKind::Enum
        | ScalarKind::Union
        | ScalarKind::IdentityRef
        | ScalarKind::Leafref { .. } => Ok(TypedValue::Text(raw.to_string())),
        ScalarKind::Empty => Err(TranslateError::TypeError(format!(
            "leaf {} has no coercible data type",
            leaf_xpath
        ))),
    }
}

/// Decode a delimited leaf-list field value into its element sequence.
///
/// An empty field decodes to an empty sequence. In lenient mode an
/// element that fails coercion is skipped with a warning; in strict
/// mode it aborts the whole list.
pub fn decode_leaf_list(
    schema: &SchemaIndex,
    config: &EngineConfig,
    kind: &ScalarKind,
    leaf_xpath: &str,
    raw: &str,
) -> Result<Vec<TypedValue>> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    let mut out = Vec::new();
    for element in raw.split(config.leaf_list_delimiter) {
        match store_value_to_typed(schema, config, kind, leaf_xpath, element) {
            Ok(value) => out.push(value),
            Err(err) => match config.strictness {
                Strictness::Lenient => {
                    warn!("skipping leaf-list element {:?} at {}: {}", element, leaf_xpath, err);
                }
                Strictness::Strict => return Err(err),
            },
        }
    }
    Ok(out)
}
