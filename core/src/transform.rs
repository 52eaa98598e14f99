//! Transform function registry
//!
//! Schema nodes reference transforms by registered name; the engine
//! invokes them without knowing their implementation. Five shapes exist:
//! subtree overrides (replace default traversal for a whole subtree),
//! per-leaf field transforms (produce a field-name to value map), table
//! indirection (resolve the backing table names dynamically),
//! applicability gates, and key-component rewrites (a paired
//! encode/decode used by the key codec). Looking up a name that was
//! never registered, or registered under another shape, is a schema
//! inconsistency and fatal for the path that references it.

use std::collections::HashMap;
use std::fmt;

use crate::config::EngineConfig;
use crate::error::{Result, TranslateError};
use crate::store::{DbId, Snapshot, StoreAccessor};
use crate::value::JsonMap;

/// Invocation context handed to every transform
pub struct XfmrArgs<'a> {
    /// Store instance of the node being translated
    pub db: DbId,

    /// Path of the node being translated, with instance predicates
    pub uri: &'a str,

    /// The originally requested path
    pub request_uri: &'a str,

    /// Backing table resolved so far, when known
    pub table: Option<&'a str>,

    /// Composite store key resolved so far, when known
    pub key: Option<&'a str>,

    /// Store accessor, for reads the transform performs itself
    pub store: &'a dyn StoreAccessor,

    /// Engine configuration
    pub config: &'a EngineConfig,
}

/// Subtree-override transform: returns the result fragment for the
/// node's whole subtree
pub type SubtreeFn = Box<dyn Fn(&XfmrArgs<'_>, &mut Snapshot) -> Result<JsonMap> + Send + Sync>;

/// Per-leaf value transform: returns a field-name to value map
pub type FieldFn = Box<dyn Fn(&XfmrArgs<'_>, &mut Snapshot) -> Result<JsonMap> + Send + Sync>;

/// Table-indirection transform: returns zero or more backing tables
pub type TableFn = Box<dyn Fn(&XfmrArgs<'_>, &mut Snapshot) -> Result<Vec<String>> + Send + Sync>;

/// Applicability gate: a false result skips the node
pub type ValidateFn = Box<dyn Fn(&XfmrArgs<'_>, &mut Snapshot) -> bool + Send + Sync>;

/// One direction of a key-component rewrite
pub type KeyRewriteFn = Box<dyn Fn(&str) -> Result<String> + Send + Sync>;

enum Transform {
    Subtree(SubtreeFn),
    Field(FieldFn),
    Table(TableFn),
    Validate(ValidateFn),
    KeyValue {
        encode: KeyRewriteFn,
        decode: KeyRewriteFn,
    },
}

impl Transform {
    fn shape(&self) -> &'static str {
        match self {
            Transform::Subtree(_) => "subtree",
            Transform::Field(_) => "field",
            Transform::Table(_) => "table",
            Transform::Validate(_) => "validate",
            Transform::KeyValue { .. } => "key-value",
        }
    }
}

/// Name-keyed registry of transform functions, populated at startup and
/// immutable during translation
#[derive(Default)]
pub struct TransformRegistry {
    funcs: HashMap<String, Transform>,
}

impl fmt::Debug for TransformRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.funcs.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("TransformRegistry").field("names", &names).finish()
    }
}

impl TransformRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        TransformRegistry::default()
    }

    /// Register a subtree-override transform
    pub fn bind_subtree<F>(&mut self, name: &str, f: F)
    where
        F: Fn(&XfmrArgs<'_>, &mut Snapshot) -> Result<JsonMap> + Send + Sync + 'static,
    {
        self.funcs.insert(name.to_string(), Transform::Subtree(Box::new(f)));
    }

    /// Register a per-leaf value transform
    pub fn bind_field<F>(&mut self, name: &str, f: F)
    where
        F: Fn(&XfmrArgs<'_>, &mut Snapshot) -> Result<JsonMap> + Send + Sync + 'static,
    {
        self.funcs.insert(name.to_string(), Transform::Field(Box::new(f)));
    }

    /// Register a table-indirection transform
    pub fn bind_table<F>(&mut self, name: &str, f: F)
    where
        F: Fn(&XfmrArgs<'_>, &mut Snapshot) -> Result<Vec<String>> + Send + Sync + 'static,
    {
        self.funcs.insert(name.to_string(), Transform::Table(Box::new(f)));
    }

    /// Register an applicability gate
    pub fn bind_validate<F>(&mut self, name: &str, f: F)
    where
        F: Fn(&XfmrArgs<'_>, &mut Snapshot) -> bool + Send + Sync + 'static,
    {
        self.funcs.insert(name.to_string(), Transform::Validate(Box::new(f)));
    }

    /// Register a key-component rewrite pair; `decode` must invert
    /// `encode`
    pub fn bind_key_value<E, D>(&mut self, name: &str, encode: E, decode: D)
    where
        E: Fn(&str) -> Result<String> + Send + Sync + 'static,
        D: Fn(&str) -> Result<String> + Send + Sync + 'static,
    {
        self.funcs.insert(
            name.to_string(),
            Transform::KeyValue {
                encode: Box::new(encode),
                decode: Box::new(decode),
            },
        );
    }

    fn mismatch(&self, name: &str, want: &'static str) -> TranslateError {
        match self.funcs.get(name) {
            Some(t) => TranslateError::SchemaInconsistency(format!(
                "transform {} is registered as a {} transform, not {}",
                name,
                t.shape(),
                want
            )),
            None => TranslateError::SchemaInconsistency(format!(
                "transform {} is not registered",
                name
            )),
        }
    }

    /// Resolve a subtree-override transform by name
    pub fn subtree(&self, name: &str) -> Result<&SubtreeFn> {
        match self.funcs.get(name) {
            Some(Transform::Subtree(f)) => Ok(f),
            _ => Err(self.mismatch(name, "subtree")),
        }
    }

    /// Resolve a per-leaf value transform by name
    pub fn field(&self, name: &str) -> Result<&FieldFn> {
        match self.funcs.get(name) {
            Some(Transform::Field(f)) => Ok(f),
            _ => Err(self.mismatch(name, "field")),
        }
    }

    /// Resolve a table-indirection transform by name
    pub fn table(&self, name: &str) -> Result<&TableFn> {
        match self.funcs.get(name) {
            Some(Transform::Table(f)) => Ok(f),
            _ => Err(self.mismatch(name, "table")),
        }
    }

    /// Resolve an applicability gate by name
    pub fn validate(&self, name: &str) -> Result<&ValidateFn> {
        match self.funcs.get(name) {
            Some(Transform::Validate(f)) => Ok(f),
            _ => Err(self.mismatch(name, "validate")),
        }
    }

    /// Resolve the encode direction of a key-component rewrite
    pub fn key_encode(&self, name: &str) -> Result<&KeyRewriteFn> {
        match self.funcs.get(name) {
            Some(Transform::KeyValue { encode, .. }) => Ok(encode),
            _ => Err(self.mismatch(name, "key-value")),
        }
    }

    /// Resolve the decode direction of a key-component rewrite
    pub fn key_decode(&self, name: &str) -> Result<&KeyRewriteFn> {
        match self.funcs.get(name) {
            Some(Transform::KeyValue { decode, .. }) => Ok(decode),
            _ => Err(self.mismatch(name, "key-value")),
        }
    }
}
