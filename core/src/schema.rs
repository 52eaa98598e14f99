//! Schema index
//!
//! This module provides the per-path node metadata the traversal engine
//! consumes: node kind, default store binding, transform references and
//! key declarations. The index is produced once at load time from the
//! compiled schema and is immutable afterwards, so it can be shared
//! freely across concurrent translation requests.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TranslateError};
use crate::store::DbId;
use crate::value::ScalarKind;

/// Kind of a schema node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Single-value terminal node
    Leaf,

    /// Multi-value terminal node, stored as one delimited field
    LeafList,

    /// Structural node holding named children
    Container,

    /// Keyed collection of container-like instances
    List,

    /// Transparent alternative selector
    Choice,

    /// One alternative of a choice
    Case,
}

/// Metadata for one schema path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaNode {
    /// Node kind
    pub kind: NodeKind,

    /// Store instance backing this node
    pub db: DbId,

    /// Default backing table, when no indirection transform applies
    pub table: Option<String>,

    /// Default backing field for terminal nodes
    pub field: Option<String>,

    /// Static store key for container-bound tables keyed by a fixed
    /// entry name (e.g. a `global` settings row)
    pub key_name: Option<String>,

    /// Names of direct children, in deterministic order
    /// (populated by the index builder)
    pub children: Vec<String>,

    /// Whether this leaf is part of the owning list's composite key
    pub is_key: bool,

    /// For lists: key leaf names in declared order
    pub key_leafs: Vec<String>,

    /// Registered subtree-override transform name
    pub subtree_transform: Option<String>,

    /// Registered table-indirection transform name
    pub table_transform: Option<String>,

    /// Registered per-leaf value transform name
    pub field_transform: Option<String>,

    /// Registered applicability-gating transform name
    pub validate_transform: Option<String>,

    /// Registered key-component rewrite transform name (key leaves only)
    pub key_transform: Option<String>,

    /// Whether children below a subtree override still take the default
    /// descent after the override runs
    pub has_child_subtree: bool,

    /// Primitive type of a terminal node
    pub value_type: Option<ScalarKind>,
}

impl SchemaNode {
    fn new(kind: NodeKind) -> Self {
        SchemaNode {
            kind,
            db: DbId::default(),
            table: None,
            field: None,
            key_name: None,
            children: Vec::new(),
            is_key: false,
            key_leafs: Vec::new(),
            subtree_transform: None,
            table_transform: None,
            field_transform: None,
            validate_transform: None,
            key_transform: None,
            has_child_subtree: false,
            value_type: None,
        }
    }

    /// Create a container node
    pub fn container() -> Self {
        Self::new(NodeKind::Container)
    }

    /// Create a list node with its key leaf names in declared order
    pub fn list(key_leafs: &[&str]) -> Self {
        let mut node = Self::new(NodeKind::List);
        node.key_leafs = key_leafs.iter().map(|k| k.to_string()).collect();
        node
    }

    /// Create a leaf node of the given primitive type
    pub fn leaf(value_type: ScalarKind) -> Self {
        let mut node = Self::new(NodeKind::Leaf);
        node.value_type = Some(value_type);
        node
    }

    /// Create a leaf-list node of the given element type
    pub fn leaf_list(value_type: ScalarKind) -> Self {
        let mut node = Self::new(NodeKind::LeafList);
        node.value_type = Some(value_type);
        node
    }

    /// Create a choice node
    pub fn choice() -> Self {
        Self::new(NodeKind::Choice)
    }

    /// Create a case node
    pub fn case() -> Self {
        Self::new(NodeKind::Case)
    }

    /// Set the backing store instance
    pub fn in_db(mut self, db: DbId) -> Self {
        self.db = db;
        self
    }

    /// Set the default backing table
    pub fn with_table(mut self, table: &str) -> Self {
        self.table = Some(table.to_string());
        self
    }

    /// Set the default backing field
    pub fn with_field(mut self, field: &str) -> Self {
        self.field = Some(field.to_string());
        self
    }

    /// Set a static store key (fixed-name entry backing a container)
    pub fn with_key_name(mut self, key_name: &str) -> Self {
        self.key_name = Some(key_name.to_string());
        self
    }

    /// Mark this leaf as part of the owning list's composite key
    pub fn key(mut self) -> Self {
        self.is_key = true;
        self
    }

    /// Attach a subtree-override transform by registered name
    pub fn with_subtree_transform(mut self, name: &str) -> Self {
        self.subtree_transform = Some(name.to_string());
        self
    }

    /// Attach a table-indirection transform by registered name
    pub fn with_table_transform(mut self, name: &str) -> Self {
        self.table_transform = Some(name.to_string());
        self
    }

    /// Attach a per-leaf value transform by registered name
    pub fn with_field_transform(mut self, name: &str) -> Self {
        self.field_transform = Some(name.to_string());
        self
    }

    /// Attach an applicability-gating transform by registered name
    pub fn with_validate_transform(mut self, name: &str) -> Self {
        self.validate_transform = Some(name.to_string());
        self
    }

    /// Attach a key-component rewrite transform by registered name
    pub fn with_key_transform(mut self, name: &str) -> Self {
        self.key_transform = Some(name.to_string());
        self
    }

    /// Allow default descent into children after a subtree override runs
    pub fn with_child_subtree(mut self) -> Self {
        self.has_child_subtree = true;
        self
    }

    /// Whether this node is a terminal (leaf or leaf-list)
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf | NodeKind::LeafList)
    }
}

/// Immutable mapping from schema path to node metadata
#[derive(Debug, Clone, Default)]
pub struct SchemaIndex {
    nodes: HashMap<String, SchemaNode>,
}

impl SchemaIndex {
    /// Start building an index
    pub fn builder() -> SchemaIndexBuilder {
        SchemaIndexBuilder {
            nodes: HashMap::new(),
        }
    }

    /// Look up the node registered at a predicate-free path
    pub fn node(&self, xpath: &str) -> Option<&SchemaNode> {
        self.nodes.get(xpath)
    }

    /// Look up a node, treating absence as a broken schema/store mapping
    pub fn require(&self, xpath: &str) -> Result<&SchemaNode> {
        self.nodes
            .get(xpath)
            .ok_or_else(|| TranslateError::SchemaInconsistency(format!("no node for path {}", xpath)))
    }

    /// Number of registered paths
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the index is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Builder assembling a [`SchemaIndex`] at load time
#[derive(Debug)]
pub struct SchemaIndexBuilder {
    nodes: HashMap<String, SchemaNode>,
}

impl SchemaIndexBuilder {
    /// Register a node at a predicate-free path
    pub fn node(mut self, xpath: &str, node: SchemaNode) -> Self {
        self.nodes.insert(xpath.to_string(), node);
        self
    }

    /// Finish the index, deriving each node's child list from the
    /// registered paths (sorted for deterministic traversal)
    pub fn build(mut self) -> SchemaIndex {
        let mut children: HashMap<String, Vec<String>> = HashMap::new();
        for path in self.nodes.keys() {
            let parent = crate::path::parent(path);
            if !parent.is_empty() && self.nodes.contains_key(parent) {
                children
                    .entry(parent.to_string())
                    .or_default()
                    .push(crate::path::last_segment(path).to_string());
            }
        }
        for (parent, mut names) in children {
            names.sort();
            if let Some(node) = self.nodes.get_mut(&parent) {
                node.children = names;
            }
        }
        SchemaIndex { nodes: self.nodes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_derives_children() {
        let index = SchemaIndex::builder()
            .node("/sflow", SchemaNode::container())
            .node(
                "/sflow/enabled",
                SchemaNode::leaf(ScalarKind::Bool).with_table("SFLOW").with_field("admin_state"),
            )
            .node(
                "/sflow/agent",
                SchemaNode::leaf(ScalarKind::String).with_table("SFLOW").with_field("agent_id"),
            )
            .build();

        let root = index.node("/sflow").unwrap();
        assert_eq!(root.children, vec!["agent".to_string(), "enabled".to_string()]);
        assert!(index.node("/sflow/enabled").unwrap().is_terminal());
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_require_reports_inconsistency() {
        let index = SchemaIndex::builder().build();
        let err = index.require("/nope").unwrap_err();
        assert!(matches!(err, TranslateError::SchemaInconsistency(_)));
    }

    #[test]
    fn test_list_node_keys() {
        let node = SchemaNode::list(&["address", "port", "vrf"]).with_table("COLLECTOR");
        assert_eq!(node.kind, NodeKind::List);
        assert_eq!(node.key_leafs, vec!["address", "port", "vrf"]);
        assert_eq!(node.table.as_deref(), Some("COLLECTOR"));
    }
}
