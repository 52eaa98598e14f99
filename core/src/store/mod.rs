//! Store access
//!
//! This module defines the thin interface over the flat key-value
//! configuration store (table / composite-key / field addressing), an
//! in-memory implementation used by tests and example consumers, and the
//! per-request snapshot cache that avoids redundant store round-trips.

mod mem;
mod snapshot;

pub use mem::MemStore;
pub use snapshot::Snapshot;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Store instance selector.
///
/// The configuration system spreads tables across several store
/// instances; each schema node records which one backs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DbId {
    /// Configuration store
    Config,

    /// Applied-state store
    Appl,

    /// Operational-state store
    State,

    /// Counter store
    Counters,
}

impl Default for DbId {
    fn default() -> Self {
        DbId::Config
    }
}

/// Field name to string value mapping of one store entry
pub type FieldValues = HashMap<String, String>;

/// Read access to the key-value store.
///
/// Implementations must distinguish "not found" (`Ok(None)`, empty key
/// list) from access errors (`Err`), and must be safe for concurrent
/// independent calls.
#[cfg_attr(test, mockall::automock)]
pub trait StoreAccessor: Send + Sync {
    /// Fetch the fields of one entry; `Ok(None)` when the key is absent
    fn get_entry(&self, db: DbId, table: &str, key: &str) -> Result<Option<FieldValues>>;

    /// Enumerate every composite key of a table
    fn get_keys(&self, db: DbId, table: &str) -> Result<Vec<String>>;

    /// Enumerate the composite keys matching a pattern; a trailing `*`
    /// matches any suffix, otherwise the pattern is an exact key
    fn get_keys_matching(&self, db: DbId, table: &str, pattern: &str) -> Result<Vec<String>>;
}
