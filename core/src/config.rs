//! Configuration for the translation engine
//!
//! This module provides the engine-level configuration knobs: store key
//! separator, leaf-list field conventions, error strictness and leafref
//! resolution bounds.

use serde::{Deserialize, Serialize};

/// Policy applied when a non-target sibling fails during a container-wide
/// collection, or when a single leaf-list element fails coercion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strictness {
    /// Log the failing child/element and omit it from the result
    Lenient,

    /// Abort the enclosing collection on the first failure
    Strict,
}

impl Default for Strictness {
    fn default() -> Self {
        Strictness::Lenient
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Separator joining composite store key components
    pub key_separator: char,

    /// Field-name suffix marking leaf-list fields in the store
    pub leaf_list_marker: char,

    /// Delimiter between elements inside a leaf-list field value
    pub leaf_list_delimiter: char,

    /// Sibling / leaf-list element failure policy
    pub strictness: Strictness,

    /// Maximum depth followed when resolving a leafref chain
    pub max_leafref_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            key_separator: '|',
            leaf_list_marker: '@',
            leaf_list_delimiter: ',',
            strictness: Strictness::default(),
            max_leafref_depth: 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.key_separator, '|');
        assert_eq!(config.leaf_list_marker, '@');
        assert_eq!(config.leaf_list_delimiter, ',');
        assert_eq!(config.strictness, Strictness::Lenient);
        assert_eq!(config.max_leafref_depth, 8);
    }
}
