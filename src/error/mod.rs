use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid or unparsable configuration.
    #[error("Configuration error: {message}")]
    Config {
        /// What was wrong.
        message: String,
    },

    /// Durable store failure.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Journal document failure.
    #[error("Journal error: {0}")]
    Journal(#[from] JournalError),
}

/// Durable store errors raised by a `KeyValueStore` backend
#[derive(Debug, Error)]
pub enum StorageError {
    /// The database could not be opened.
    #[error("Database connection failed: {message}")]
    Connection {
        /// Driver error message.
        message: String,
    },

    /// Embedded schema migrations did not apply.
    #[error("Migration failed: {message}")]
    Migration {
        /// Migrator error message.
        message: String,
    },

    /// A value is larger than the configured quota.
    #[error("Quota exceeded for {key}: {size} bytes (limit {limit})")]
    QuotaExceeded {
        /// Key being written.
        key: String,
        /// Size of the rejected value.
        size: usize,
        /// Configured limit.
        limit: usize,
    },

    /// The backend refuses all access.
    #[error("Storage unavailable: {message}")]
    Unavailable {
        /// Why storage is unavailable.
        message: String,
    },

    /// Raw driver error.
    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// Journal encoding errors
#[derive(Debug, Error)]
pub enum JournalError {
    /// The stored document is not a JSON array.
    #[error("Stored journal is not decodable: {message}")]
    Decode {
        /// Parser error message.
        message: String,
    },

    /// The journal could not be serialized.
    #[error("Journal encoding failed: {message}")]
    Encode {
        /// Serializer error message.
        message: String,
    },
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type alias for journal encoding
pub type JournalResult<T> = Result<T, JournalError>;
