//! In-memory store
//!
//! A `StoreAccessor` backed by nested maps. Used by unit tests and as a
//! stand-in store for example consumers; the production accessor lives
//! with the database driver, outside this crate.

use std::collections::{BTreeMap, HashMap};

use crate::error::Result;

use super::{DbId, FieldValues, StoreAccessor};

/// In-memory key-value store
#[derive(Debug, Default)]
pub struct MemStore {
    tables: HashMap<(DbId, String), BTreeMap<String, FieldValues>>,
}

impl MemStore {
    /// Create an empty store
    pub fn new() -> Self {
        MemStore::default()
    }

    /// Insert or replace one entry
    pub fn set_entry(&mut self, db: DbId, table: &str, key: &str, fields: &[(&str, &str)]) {
        let entry: FieldValues = fields
            .iter()
            .map(|(f, v)| (f.to_string(), v.to_string()))
            .collect();
        self.tables
            .entry((db, table.to_string()))
            .or_default()
            .insert(key.to_string(), entry);
    }

    /// Remove one entry, returning its fields when it existed
    pub fn remove_entry(&mut self, db: DbId, table: &str, key: &str) -> Option<FieldValues> {
        self.tables
            .get_mut(&(db, table.to_string()))
            .and_then(|t| t.remove(key))
    }
}

impl StoreAccessor for MemStore {
    fn get_entry(&self, db: DbId, table: &str, key: &str) -> Result<Option<FieldValues>> {
        Ok(self
            .tables
            .get(&(db, table.to_string()))
            .and_then(|t| t.get(key))
            .cloned())
    }

    fn get_keys(&self, db: DbId, table: &str) -> Result<Vec<String>> {
        Ok(self
            .tables
            .get(&(db, table.to_string()))
            .map(|t| t.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn get_keys_matching(&self, db: DbId, table: &str, pattern: &str) -> Result<Vec<String>> {
        let keys = self.get_keys(db, table)?;
        let matched = match pattern.strip_suffix('*') {
            Some(prefix) => keys.into_iter().filter(|k| k.starts_with(prefix)).collect(),
            None => keys.into_iter().filter(|k| k == pattern).collect(),
        };
        Ok(matched)
    }
}
