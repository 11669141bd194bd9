//! Registry error types

use thiserror::Error;

/// Errors that can occur in the hook registry
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Operation targets a hook id that is not registered
    #[error("Hook not found: {0}")]
    NotFound(String),

    /// Dispatch was called with a tag that is not a lifecycle event
    #[error("Unknown event kind: {0}")]
    UnknownEventKind(String),

    /// A required input is missing or has the wrong shape
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation attempted before `initialize()` or after `cleanup()`
    #[error("Hook registry not initialized")]
    NotInitialized,

    /// Registration rejected because the id is taken (reject policy only)
    #[error("Hook already exists: {0}")]
    AlreadyExists(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RegistryError {
    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        RegistryError::InvalidArgument(msg.into())
    }

    /// Create a not found error for a hook id
    pub fn not_found(id: impl Into<String>) -> Self {
        RegistryError::NotFound(id.into())
    }
}

/// Result type alias for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;
