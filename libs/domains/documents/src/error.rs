use thiserror::Error;

use crate::models::InsertBatchResult;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Index '{0}' already exists")]
    IndexExists(String),

    /// A bulk insert hit at least one failure that is not a duplicate key
    #[error(
        "Insert failed: {} of {} documents inserted, {} duplicate key(s), {} other failure(s): {}",
        .0.succeeded,
        .0.attempted,
        .0.duplicates.len(),
        .0.failures.len(),
        .0.failure_summary()
    )]
    Insert(Box<InsertBatchResult>),

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Search result is missing the '{0}' field")]
    MissingScore(String),

    #[error("Database error: {0}")]
    Database(String),
}

pub type DocumentResult<T> = Result<T, DocumentError>;

impl From<mongodb::error::Error> for DocumentError {
    fn from(err: mongodb::error::Error) -> Self {
        DocumentError::Database(err.to_string())
    }
}
