//! Error types for lexaudit

use thiserror::Error;

/// Main error type for lexaudit operations
#[derive(Error, Debug)]
pub enum LexauditError {
    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error with context
    #[error("Parse error in {context}: {message}")]
    Parse { context: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested control id is not in the catalog
    #[error("Unknown control: {0}")]
    UnknownControl(String),

    /// Catalog violates one of its construction invariants
    #[error("Invalid control catalog: {0}")]
    InvalidCatalog(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for LexauditError {
    fn from(err: serde_json::Error) -> Self {
        LexauditError::Serialization(err.to_string())
    }
}

/// Result type alias for lexaudit operations
pub type Result<T> = std::result::Result<T, LexauditError>;
