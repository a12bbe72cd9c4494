//! Errors raised at the crate boundary.
//!
//! The query algebra itself never fails: malformed fragments are carried as
//! values and dropped by the normalizer. Only documents that cannot be a query
//! at all are rejected.

use thiserror::Error;

/// Result type for decoding queries.
pub type QueryResult<T> = Result<T, QueryError>;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Expected a JSON object for {context}, found {found}")]
    NotAnObject { context: &'static str, found: String },

    #[error("Unknown query type: {0}")]
    UnknownQueryType(String),
}
