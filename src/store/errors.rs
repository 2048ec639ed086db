//! Store error types

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by an object store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store has no metadata for a relation key
    #[error("unknown relation: {0}")]
    UnknownRelation(String),

    /// The query targets a different space than the store serves
    #[error("space mismatch: store serves '{store}', query targets '{requested}'")]
    SpaceMismatch { store: String, requested: String },

    /// A snapshot could not be read or parsed
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// Backend failure (parameter limits, I/O, ...)
    #[error("store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::UnknownRelation(_) => "OBJQ_STORE_UNKNOWN_RELATION",
            StoreError::SpaceMismatch { .. } => "OBJQ_STORE_SPACE_MISMATCH",
            StoreError::InvalidSnapshot(_) => "OBJQ_STORE_INVALID_SNAPSHOT",
            StoreError::Backend(_) => "OBJQ_STORE_BACKEND",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::SpaceMismatch {
            store: "space1".into(),
            requested: "space2".into(),
        };
        assert!(err.to_string().contains("space2"));
        assert_eq!(err.code(), "OBJQ_STORE_SPACE_MISMATCH");
    }
}
