//! Storage failures. Every variant is fatal for the operation that hit it:
//! callers must never read a failed lookup as "not seen".

use thiserror::Error;

/// Errors raised by the seen store and the cursor store.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// A query or connection failed, e.g. on disk I/O errors or a closed pool.
    #[error("A data store operation failed: {0}")]
    OperationFailed(String),

    /// A stored value could not be decoded or a value could not be encoded.
    #[error("Stored value is corrupt: {0}")]
    CorruptValue(String),

    /// The schema could not be brought up to date.
    #[error("A data migration failed: {0}")]
    MigrationError(String),

    /// The repository was given an unusable argument, such as a zero pool size.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
