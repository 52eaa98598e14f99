//! Typed value representation
//!
//! This module provides the primitive type descriptors declared by schema
//! leaves and the typed values produced when store strings are coerced,
//! along with their JSON rendering.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Nested result map assembled by the traversal engine
pub type JsonMap = serde_json::Map<String, JsonValue>;

/// Primitive type descriptor of a schema leaf
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalarKind {
    /// Signed integer (8-bit)
    Int8,

    /// Signed integer (16-bit)
    Int16,

    /// Signed integer (32-bit)
    Int32,

    /// Signed integer (64-bit)
    Int64,

    /// Unsigned integer (8-bit)
    Uint8,

    /// Unsigned integer (16-bit)
    Uint16,

    /// Unsigned integer (32-bit)
    Uint32,

    /// Unsigned integer (64-bit)
    Uint64,

    /// Boolean
    Bool,

    /// Text string
    String,

    /// Enumeration; values pass through as strings
    Enum,

    /// Union; values pass through as strings
    Union,

    /// Identity reference; values pass through as strings
    IdentityRef,

    /// Reference to another leaf; the real primitive type is found by
    /// following the referenced path
    Leafref {
        /// Path expression of the referenced leaf (absolute, or relative
        /// with `../` components)
        path: String,
    },

    /// Presence-only leaf carrying no value
    Empty,
}

impl ScalarKind {
    /// Whether values of this kind pass through as raw strings without
    /// conversion (downstream schema binding validates them)
    pub fn is_string_family(&self) -> bool {
        matches!(
            self,
            ScalarKind::String
                | ScalarKind::Enum
                | ScalarKind::Union
                | ScalarKind::IdentityRef
                | ScalarKind::Leafref { .. }
        )
    }
}

/// A store value coerced to its schema-declared type
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    /// Signed integer (8-bit)
    Int8(i8),

    /// Signed integer (16-bit)
    Int16(i16),

    /// Signed integer (32-bit)
    Int32(i32),

    /// Signed integer (64-bit)
    Int64(i64),

    /// Unsigned integer (8-bit)
    Uint8(u8),

    /// Unsigned integer (16-bit)
    Uint16(u16),

    /// Unsigned integer (32-bit)
    Uint32(u32),

    /// Unsigned integer (64-bit)
    Uint64(u64),

    /// Boolean
    Bool(bool),

    /// Text string (also carries enum/union/identity/leafref values)
    Text(String),
}

impl TypedValue {
    /// Render the value for the JSON result tree.
    ///
    /// 64-bit integers are rendered as JSON strings (RFC 7951 encoding);
    /// narrower integers render as JSON numbers.
    pub fn into_json(self) -> JsonValue {
        match self {
            TypedValue::Int8(v) => JsonValue::from(v),
            TypedValue::Int16(v) => JsonValue::from(v),
            TypedValue::Int32(v) => JsonValue::from(v),
            TypedValue::Int64(v) => JsonValue::String(v.to_string()),
            TypedValue::Uint8(v) => JsonValue::from(v),
            TypedValue::Uint16(v) => JsonValue::from(v),
            TypedValue::Uint32(v) => JsonValue::from(v),
            TypedValue::Uint64(v) => JsonValue::String(v.to_string()),
            TypedValue::Bool(v) => JsonValue::Bool(v),
            TypedValue::Text(v) => JsonValue::String(v),
        }
    }

    /// Render the value the way it appears inside a path predicate
    pub fn to_path_string(&self) -> String {
        match self {
            TypedValue::Int8(v) => v.to_string(),
            TypedValue::Int16(v) => v.to_string(),
            TypedValue::Int32(v) => v.to_string(),
            TypedValue::Int64(v) => v.to_string(),
            TypedValue::Uint8(v) => v.to_string(),
            TypedValue::Uint16(v) => v.to_string(),
            TypedValue::Uint32(v) => v.to_string(),
            TypedValue::Uint64(v) => v.to_string(),
            TypedValue::Bool(v) => v.to_string(),
            TypedValue::Text(v) => v.clone(),
        }
    }
}
