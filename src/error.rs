//! Top-level query errors

use thiserror::Error;

use crate::filter::CompileError;
use crate::store::StoreError;

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Why a query did not produce a result
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The request is malformed; nothing was executed
    #[error("compilation failed: {0}")]
    Compilation(#[from] CompileError),

    /// Propagated from the store, never retried here
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Aborted by the caller or by the deadline
    #[error("query cancelled: {0}")]
    Cancelled(String),
}

impl QueryError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            QueryError::Compilation(e) => e.code().code(),
            QueryError::Store(e) => e.code(),
            QueryError::Cancelled(_) => "OBJQ_QUERY_CANCELLED",
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, QueryError::Cancelled(_))
    }
}
