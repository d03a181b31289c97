//! Error types for document store access.

use thiserror::Error;

/// Errors that can occur while talking to a document store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// MongoDB connection or command error.
    #[error("MongoDB error: {0}")]
    MongoDB(#[from] mongodb::error::Error),

    /// A field was missing or had an unexpected BSON type.
    #[error("Field access error: {0}")]
    Field(#[from] bson::document::ValueAccessError),

    /// A document could not be interpreted.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// The in-memory store does not implement this operator or stage.
    #[error("Unsupported operator: {0}")]
    Unsupported(String),

    /// The store refused a write.
    #[error("Write rejected: {0}")]
    Rejected(String),

    /// `create_collection` on a name that is already taken.
    #[error("Collection '{0}' already exists")]
    CollectionExists(String),
}
