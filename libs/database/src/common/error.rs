/// Error type for establishing and checking database connections
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// The connection string could not be parsed
    #[error("Invalid connection string: {0}")]
    InvalidConnectionString(String),

    /// The endpoint was unreachable or rejected the handshake / credentials
    #[error("Connection to {endpoint} failed: {details}")]
    ConnectionFailed { endpoint: String, details: String },

    /// Driver error outside of connection setup
    #[cfg(feature = "mongodb")]
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),
}

/// Result type alias for database operations
pub type DatabaseResult<T> = Result<T, DatabaseError>;
