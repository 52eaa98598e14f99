//! # yangmap core
//!
//! Translation engine between a hierarchical, schema-defined data tree
//! and a flat key-value configuration store with table/key/field
//! addressing. The engine walks an immutable schema index from a
//! requested path, reads through a per-request store snapshot, applies
//! registered transform functions where the schema declares them, and
//! assembles a nested JSON result.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod coerce;
pub mod config;
pub mod error;
pub mod keycodec;
pub mod path;
pub mod schema;
pub mod store;
pub mod transform;
pub mod translate;
pub mod value;

/// Re-export common types for ease of use
pub use config::{EngineConfig, Strictness};
pub use error::{Result, TranslateError};
pub use schema::{NodeKind, SchemaIndex, SchemaNode};
pub use store::{DbId, FieldValues, MemStore, Snapshot, StoreAccessor};
pub use transform::{TransformRegistry, XfmrArgs};
pub use translate::{translate_get, TranslateContext};
pub use value::{JsonMap, ScalarKind, TypedValue};

/// Version of the core crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
