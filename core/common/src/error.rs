//! Common error types for FolderVault.

use thiserror::Error;

/// Top-level error type for FolderVault operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Root configuration is unusable (e.g. no DEFAULT root).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An operation needed a vault identifier but none was set.
    #[error("No vault identifier set")]
    MissingIdentifier,

    /// A vault folder could not be placed beneath a root.
    #[error("Placement error: {0}")]
    Placement(String),

    /// The session is not in a state that permits the operation.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Deletion attempted without holding the vault lock.
    #[error("Vault lock is not held")]
    NotLocked,

    /// Lock service failure.
    #[error("Lock error: {0}")]
    Lock(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;
