//! Recursive schema-tree traversal
//!
//! The walk descends the schema from the request target, deciding per
//! node whether to invoke a registered override, resolve tables through
//! indirection, or take the default field/table mapping, and assembles
//! the per-node fragments bottom-up. Traversal is purely functional
//! from (path, snapshot) to (fragment, updated snapshot); the only
//! mutable state is the per-request snapshot threaded through the walk.

use log::{debug, warn};
use serde_json::Value as JsonValue;

use crate::coerce;
use crate::config::Strictness;
use crate::error::{Result, TranslateError};
use crate::keycodec;
use crate::path;
use crate::schema::NodeKind;
use crate::store::{DbId, Snapshot};
use crate::transform::XfmrArgs;
use crate::value::{JsonMap, ScalarKind, TypedValue};

use super::{assemble, KeyFilter, TranslateContext};

/// One translation walk, bound to its request
pub(crate) struct Walk<'a> {
    pub(crate) ctx: &'a TranslateContext<'a>,
    pub(crate) request_uri: &'a str,
}

impl<'a> Walk<'a> {
    fn args<'s>(
        &'s self,
        db: DbId,
        uri: &'s str,
        table: Option<&'s str>,
        key: Option<&'s str>,
    ) -> XfmrArgs<'s> {
        XfmrArgs {
            db,
            uri,
            request_uri: self.request_uri,
            table,
            key,
            store: self.ctx.store,
            config: &self.ctx.config,
        }
    }

    /// Apply the sibling failure policy to a non-target child error.
    ///
    /// A missing leaf is normal during container-wide collection and is
    /// always absorbed. Coercion and transform failures follow the
    /// configured strictness. Schema inconsistencies, store failures
    /// and key errors always escalate.
    fn absorb_child_error(&self, err: TranslateError, child_uri: &str) -> Result<()> {
        match &err {
            TranslateError::NotFound(_) => {
                debug!("no data for {}", child_uri);
                Ok(())
            }
            TranslateError::TypeError(_) | TranslateError::TransformError(_) => {
                match self.ctx.config.strictness {
                    Strictness::Lenient => {
                        warn!("skipping {}: {}", child_uri, err);
                        Ok(())
                    }
                    Strictness::Strict => Err(err),
                }
            }
            _ => Err(err),
        }
    }

    /// Fill one structural level: recurse into every declared child of
    /// the node at `xpath` and merge the results.
    ///
    /// `parent_subtree` names the subtree override that already ran at
    /// this level, if any: terminals here are covered by it, and a
    /// child carrying the same override name is not re-invoked.
    pub(crate) fn container_fill(
        &self,
        snap: &mut Snapshot,
        uri: &str,
        xpath: &str,
        table: Option<&str>,
        key: Option<&str>,
        parent_subtree: Option<&str>,
    ) -> Result<JsonMap> {
        let node = self.ctx.schema.require(xpath)?;
        let mut result = JsonMap::new();

        for child_name in &node.children {
            let child_xpath = format!("{}/{}", xpath, child_name);
            let child_uri = format!("{}/{}", uri, child_name);
            let child = self.ctx.schema.require(&child_xpath)?;
            let cdb = child.db;
            let ckey = child.key_name.as_deref().or(key);

            if let Some(name) = &child.validate_transform {
                let gate = self.ctx.registry.validate(name)?;
                if !gate(&self.args(cdb, &child_uri, table, ckey), snap) {
                    debug!("validate transform {} gated out {}", name, child_uri);
                    continue;
                }
            }

            match child.kind {
                NodeKind::Leaf | NodeKind::LeafList => {
                    if parent_subtree.is_some() {
                        continue;
                    }
                    // an override on the terminal itself terminates the branch
                    if let Some(name) = child.subtree_transform.as_deref() {
                        let f = self.ctx.registry.subtree(name)?;
                        match f(&self.args(cdb, &child_uri, table, ckey), snap) {
                            Ok(frag) => assemble::merge_fields(&mut result, frag),
                            Err(err) => self.absorb_child_error(err, &child_uri)?,
                        }
                        continue;
                    }
                    match self.terminal_fill(snap, &child_uri, &child_xpath, cdb, table, ckey) {
                        Ok(fields) => assemble::merge_fields(&mut result, fields),
                        Err(err) => self.absorb_child_error(err, &child_uri)?,
                    }
                }
                NodeKind::Container => {
                    let mut ctable = child.table.clone().or_else(|| table.map(str::to_string));
                    if let Some(name) = &child.table_transform {
                        let f = self.ctx.registry.table(name)?;
                        match f(&self.args(cdb, &child_uri, ctable.as_deref(), ckey), snap) {
                            Ok(tables) => {
                                if tables.is_empty() {
                                    continue;
                                }
                                if tables.len() > 1 {
                                    warn!(
                                        "table transform {} returned {} tables for container {}",
                                        name,
                                        tables.len(),
                                        child_xpath
                                    );
                                }
                                ctable = tables.into_iter().next();
                            }
                            Err(err) => {
                                self.absorb_child_error(err, &child_uri)?;
                                continue;
                            }
                        }
                    }

                    let mut child_map = JsonMap::new();
                    let mut override_name: Option<&str> = None;
                    if let Some(name) = child.subtree_transform.as_deref() {
                        if Some(name) != parent_subtree {
                            let f = self.ctx.registry.subtree(name)?;
                            match f(&self.args(cdb, &child_uri, ctable.as_deref(), ckey), snap) {
                                Ok(frag) => assemble::merge_fields(&mut child_map, frag),
                                Err(err) => {
                                    self.absorb_child_error(err, &child_uri)?;
                                    continue;
                                }
                            }
                        }
                        override_name = Some(name);
                        if !child.has_child_subtree {
                            assemble::attach_container(&mut result, child_name, child_map);
                            continue;
                        }
                    }

                    let descended = self.container_fill(
                        snap,
                        &child_uri,
                        &child_xpath,
                        ctable.as_deref(),
                        ckey,
                        override_name,
                    )?;
                    assemble::merge_fields(&mut child_map, descended);
                    assemble::attach_container(&mut result, child_name, child_map);
                }
                NodeKind::List => {
                    let mut override_name: Option<&str> = None;
                    if let Some(name) = child.subtree_transform.as_deref() {
                        if Some(name) != parent_subtree {
                            let f = self.ctx.registry.subtree(name)?;
                            match f(&self.args(cdb, &child_uri, child.table.as_deref(), ckey), snap) {
                                Ok(frag) => assemble::merge_fields(&mut result, frag),
                                Err(err) => {
                                    self.absorb_child_error(err, &child_uri)?;
                                    continue;
                                }
                            }
                        }
                        override_name = Some(name);
                        if !child.has_child_subtree {
                            continue;
                        }
                    }

                    match self.list_fill(snap, &child_uri, &child_xpath, None, override_name) {
                        Ok(instances) => {
                            assemble::attach_list(&mut result, child_name, instances, false)
                        }
                        Err(err) => self.absorb_child_error(err, &child_uri)?,
                    }
                }
                NodeKind::Choice | NodeKind::Case => {
                    let sub = self.container_fill(
                        snap,
                        &child_uri,
                        &child_xpath,
                        table,
                        ckey,
                        parent_subtree,
                    )?;
                    assemble::merge_fields(&mut result, sub);
                }
            }
        }
        Ok(result)
    }

    /// Enumerate the instances of the list at `xpath`.
    ///
    /// The backing tables come from the list's indirection transform
    /// when one is registered (zero tables means no data), falling back
    /// to the static table name; instances collected from several
    /// tables concatenate. `uri` is the collection path the instance
    /// predicates are appended to.
    pub(crate) fn list_fill(
        &self,
        snap: &mut Snapshot,
        uri: &str,
        xpath: &str,
        filter: Option<&KeyFilter>,
        parent_subtree: Option<&str>,
    ) -> Result<Vec<JsonMap>> {
        let node = self.ctx.schema.require(xpath)?;
        let db = node.db;

        let mut tables: Vec<String> = Vec::new();
        if let Some(name) = &node.table_transform {
            let f = self.ctx.registry.table(name)?;
            let key_ctx = match filter {
                Some(KeyFilter::Exact(k)) => Some(k.as_str()),
                _ => None,
            };
            tables = f(&self.args(db, uri, node.table.as_deref(), key_ctx), snap)?;
            if let Some(t) = &node.table {
                if !tables.contains(t) {
                    tables.push(t.clone());
                }
            }
        } else if let Some(t) = &node.table {
            tables.push(t.clone());
        }
        if tables.is_empty() {
            debug!("no backing table for list {}", xpath);
            return Ok(Vec::new());
        }

        let mut instances = Vec::new();
        for tbl in &tables {
            let keys: Vec<String> = match filter {
                None => {
                    snap.ensure_table(self.ctx.store, db, tbl)?;
                    snap.keys(db, tbl)
                }
                Some(KeyFilter::Exact(k)) => {
                    if snap.ensure_entry(self.ctx.store, db, tbl, k)? {
                        vec![k.clone()]
                    } else {
                        Vec::new()
                    }
                }
                Some(KeyFilter::Prefix(prefix)) => {
                    let pattern = format!("{}*", prefix);
                    snap.ensure_keys_matching(self.ctx.store, db, tbl, &pattern)?
                }
            };

            for store_key in keys {
                match self.list_instance_fill(snap, uri, xpath, tbl, &store_key, parent_subtree) {
                    Ok(Some(instance)) => instances.push(instance),
                    Ok(None) => {}
                    Err(err) => self.absorb_child_error(err, uri)?,
                }
            }
        }
        Ok(instances)
    }

    /// Build one list instance: split the store key into typed key-leaf
    /// values and recurse as a container-like level keyed by them.
    /// A key that does not decode skips the instance with a warning.
    fn list_instance_fill(
        &self,
        snap: &mut Snapshot,
        uri: &str,
        xpath: &str,
        table: &str,
        store_key: &str,
        parent_subtree: Option<&str>,
    ) -> Result<Option<JsonMap>> {
        let key_values = match keycodec::split_store_key(
            self.ctx.schema,
            self.ctx.registry,
            &self.ctx.config,
            xpath,
            store_key,
        ) {
            Ok(values) => values,
            Err(err) => {
                warn!("skipping instance {:?} of {}: {}", store_key, uri, err);
                return Ok(None);
            }
        };

        let mut instance_uri = uri.to_string();
        for (name, value) in &key_values {
            instance_uri.push('[');
            instance_uri.push_str(name);
            instance_uri.push('=');
            instance_uri.push_str(&value.to_path_string());
            instance_uri.push(']');
        }

        let mut instance = JsonMap::new();
        for (name, value) in key_values {
            instance.insert(name, value.into_json());
        }

        let descended = self.container_fill(
            snap,
            &instance_uri,
            xpath,
            Some(table),
            Some(store_key),
            parent_subtree,
        )?;
        assemble::merge_fields(&mut instance, descended);
        Ok(Some(instance))
    }

    /// Produce the value of a leaf or leaf-list node.
    ///
    /// A registered field transform wins; otherwise the default mapping
    /// reads the node's backing field (with the leaf-list marker
    /// appended where applicable) and coerces it. Absence escalates to
    /// `NotFound` only when the node is the exact request target;
    /// during container-wide collection it simply produces nothing.
    pub(crate) fn terminal_fill(
        &self,
        snap: &mut Snapshot,
        uri: &str,
        xpath: &str,
        db: DbId,
        table: Option<&str>,
        key: Option<&str>,
    ) -> Result<JsonMap> {
        let node = self.ctx.schema.require(xpath)?;
        let is_target = path::same_path(uri, self.request_uri);
        let ll_instance = if node.kind == NodeKind::LeafList
            && path::strip_predicates(self.request_uri) == path::strip_predicates(uri)
        {
            path::leaf_list_instance(self.request_uri)
        } else {
            None
        };

        if let Some(name) = &node.field_transform {
            let f = self.ctx.registry.field(name)?;
            let fields = f(&self.args(db, uri, table, key), snap)?;
            if fields.is_empty() {
                if node.kind == NodeKind::Leaf && is_target {
                    return Err(TranslateError::NotFound(uri.to_string()));
                }
                if ll_instance.is_some() {
                    return Err(TranslateError::NotFound(self.request_uri.to_string()));
                }
            }
            return Ok(fields);
        }

        // key leaves are produced by the key codec during instance fill
        if node.is_key {
            return Ok(JsonMap::new());
        }
        let field = match &node.field {
            Some(f) => f.clone(),
            None => return Ok(JsonMap::new()),
        };
        // absence escalates for a scalar-leaf target or a leaf-list
        // instance target; a whole leaf-list target yields no data
        let escalate_absent = (node.kind == NodeKind::Leaf && is_target) || ll_instance.is_some();
        let (table, key) = match (table, key) {
            (Some(t), Some(k)) => (t, k),
            _ => {
                return if escalate_absent {
                    Err(TranslateError::NotFound(uri.to_string()))
                } else {
                    Ok(JsonMap::new())
                };
            }
        };

        snap.ensure_entry(self.ctx.store, db, table, key)?;
        let entry = match snap.entry(db, table, key) {
            Some(e) => e,
            None => {
                return if escalate_absent {
                    Err(TranslateError::NotFound(uri.to_string()))
                } else {
                    Ok(JsonMap::new())
                };
            }
        };

        let leaf_name = path::last_segment(xpath).to_string();
        let kind = node.value_type.clone().unwrap_or(ScalarKind::String);
        let mut out = JsonMap::new();

        match node.kind {
            NodeKind::LeafList => {
                let field_name = format!("{}{}", field, self.ctx.config.leaf_list_marker);
                match entry.get(&field_name).cloned() {
                    Some(raw) => {
                        if let Some(wanted) = ll_instance {
                            let store_value = match &node.key_transform {
                                Some(name) => self.ctx.registry.key_encode(name)?(&wanted)?,
                                None => wanted.clone(),
                            };
                            let present = raw
                                .split(self.ctx.config.leaf_list_delimiter)
                                .any(|e| e == store_value);
                            if !present {
                                return Err(TranslateError::NotFound(
                                    self.request_uri.to_string(),
                                ));
                            }
                            let typed = coerce::store_value_to_typed(
                                self.ctx.schema,
                                &self.ctx.config,
                                &kind,
                                xpath,
                                &wanted,
                            )?;
                            out.insert(leaf_name, JsonValue::Array(vec![typed.into_json()]));
                        } else {
                            let values = coerce::decode_leaf_list(
                                self.ctx.schema,
                                &self.ctx.config,
                                &kind,
                                xpath,
                                &raw,
                            )?;
                            out.insert(
                                leaf_name,
                                JsonValue::Array(
                                    values.into_iter().map(TypedValue::into_json).collect(),
                                ),
                            );
                        }
                        Ok(out)
                    }
                    None => {
                        if escalate_absent {
                            Err(TranslateError::NotFound(uri.to_string()))
                        } else {
                            Ok(out)
                        }
                    }
                }
            }
            NodeKind::Leaf => match entry.get(&field).cloned() {
                Some(raw) => {
                    let typed = coerce::store_value_to_typed(
                        self.ctx.schema,
                        &self.ctx.config,
                        &kind,
                        xpath,
                        &raw,
                    )?;
                    out.insert(leaf_name, typed.into_json());
                    Ok(out)
                }
                None => {
                    if is_target {
                        Err(TranslateError::NotFound(uri.to_string()))
                    } else {
                        Ok(out)
                    }
                }
            },
            _ => Err(TranslateError::SchemaInconsistency(format!(
                "{} is not a terminal node",
                xpath
            ))),
        }
    }
}
