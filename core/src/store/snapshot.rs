//! Per-request store snapshot
//!
//! Every translation request owns one `Snapshot`: a mutable cache of the
//! store data fetched so far, keyed by (store instance, table, key).
//! Once a table has been fetched with no key filter it is considered
//! complete for the remainder of the request and is never re-fetched.
//! Snapshots are request-scoped and must not be shared across concurrent
//! requests.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::error::Result;

use super::{DbId, FieldValues, StoreAccessor};

/// Request-scoped cache of fetched store data
#[derive(Debug, Default)]
pub struct Snapshot {
    tables: HashMap<(DbId, String), BTreeMap<String, FieldValues>>,
    complete: HashSet<(DbId, String)>,
    probed: HashSet<(DbId, String, String)>,
}

impl Snapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Snapshot::default()
    }

    /// Make the whole table available, fetching it unless a previous
    /// whole-table fetch already completed it
    pub fn ensure_table(&mut self, store: &dyn StoreAccessor, db: DbId, table: &str) -> Result<()> {
        let slot = (db, table.to_string());
        if self.complete.contains(&slot) {
            return Ok(());
        }
        for key in store.get_keys(db, table)? {
            if let Some(fields) = store.get_entry(db, table, &key)? {
                self.tables.entry(slot.clone()).or_default().insert(key, fields);
            }
        }
        self.complete.insert(slot);
        Ok(())
    }

    /// Make one entry available, fetching it at most once per request.
    /// Returns whether the entry exists.
    pub fn ensure_entry(
        &mut self,
        store: &dyn StoreAccessor,
        db: DbId,
        table: &str,
        key: &str,
    ) -> Result<bool> {
        let slot = (db, table.to_string());
        if let Some(tbl) = self.tables.get(&slot) {
            if tbl.contains_key(key) {
                return Ok(true);
            }
        }
        if self.complete.contains(&slot) {
            return Ok(false);
        }
        let probe = (db, table.to_string(), key.to_string());
        if self.probed.contains(&probe) {
            return Ok(false);
        }
        self.probed.insert(probe);
        match store.get_entry(db, table, key)? {
            Some(fields) => {
                self.tables
                    .entry(slot)
                    .or_default()
                    .insert(key.to_string(), fields);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Make every entry matching a key pattern available and return the
    /// matching keys in sorted order
    pub fn ensure_keys_matching(
        &mut self,
        store: &dyn StoreAccessor,
        db: DbId,
        table: &str,
        pattern: &str,
    ) -> Result<Vec<String>> {
        let slot = (db, table.to_string());
        if self.complete.contains(&slot) {
            let prefix = pattern.strip_suffix('*');
            return Ok(self
                .keys(db, table)
                .into_iter()
                .filter(|k| match prefix {
                    Some(p) => k.starts_with(p),
                    None => k == pattern,
                })
                .collect());
        }
        let mut keys = store.get_keys_matching(db, table, pattern)?;
        keys.sort();
        for key in &keys {
            if !self
                .tables
                .get(&slot)
                .map(|t| t.contains_key(key))
                .unwrap_or(false)
            {
                if let Some(fields) = store.get_entry(db, table, key)? {
                    self.tables
                        .entry(slot.clone())
                        .or_default()
                        .insert(key.clone(), fields);
                }
            }
        }
        Ok(keys)
    }

    /// Cached keys of a table, in sorted order
    pub fn keys(&self, db: DbId, table: &str) -> Vec<String> {
        self.tables
            .get(&(db, table.to_string()))
            .map(|t| t.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Cached fields of one entry
    pub fn entry(&self, db: DbId, table: &str, key: &str) -> Option<&FieldValues> {
        self.tables.get(&(db, table.to_string())).and_then(|t| t.get(key))
    }
}
