//! Error types for the core crate
//!
//! This module provides a consolidated error type for the translation
//! engine, covering store access, type coercion, key handling and
//! transform invocation failures.

use thiserror::Error;

/// Core error type for translation operations
#[derive(Error, Debug)]
pub enum TranslateError {
    /// The exact requested leaf, leaf-list instance or list instance has
    /// no backing data. Surfaced to the top-level caller unchanged.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// A store value could not be coerced to the schema-declared type
    #[error("Type coercion error: {0}")]
    TypeError(String),

    /// A registered transform function returned an error
    #[error("Transform error: {0}")]
    TransformError(String),

    /// A path has no matching schema node, or a transform name is not
    /// registered under the shape the schema references it as
    #[error("Schema inconsistency: {0}")]
    SchemaInconsistency(String),

    /// The store accessor failed (distinct from a not-found outcome)
    #[error("Store access error: {0}")]
    StoreError(String),

    /// A composite store key does not match its list definition
    #[error("Key codec error: {0}")]
    KeyCodecError(String),
}

/// Result type for the core crate
pub type Result<T> = std::result::Result<T, TranslateError>;

impl TranslateError {
    /// Whether this error is the distinguished not-found outcome
    pub fn is_not_found(&self) -> bool {
        matches!(self, TranslateError::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TranslateError::NotFound("leaf /a/b".to_string());
        assert_eq!(err.to_string(), "Resource not found: leaf /a/b");

        let err = TranslateError::TypeError("\"300\" out of range for uint8".to_string());
        assert_eq!(
            err.to_string(),
            "Type coercion error: \"300\" out of range for uint8"
        );

        let err = TranslateError::SchemaInconsistency("no node for /x".to_string());
        assert_eq!(err.to_string(), "Schema inconsistency: no node for /x");
    }

    #[test]
    fn test_is_not_found() {
        assert!(TranslateError::NotFound("x".to_string()).is_not_found());
        assert!(!TranslateError::StoreError("x".to_string()).is_not_found());
    }
}
