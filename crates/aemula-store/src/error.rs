//! Error types for the store module.

use aemula_core::ContentAddress;
use thiserror::Error;

/// Errors from [`ContentStore::publish`](crate::ContentStore::publish).
///
/// A failed publish persists nothing the caller can rely on: there is no
/// partial commit, because a CID only means something once the store confirms
/// it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    /// The store rejected or never acknowledged the upload.
    #[error("upload failed: {0}")]
    UploadFailed(String),
}

/// Errors from [`ContentStore::resolve`](crate::ContentStore::resolve).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// No content is known for this address.
    #[error("content not found: {0}")]
    NotFound(ContentAddress),

    /// The gateway did not answer in time.
    #[error("gateway timeout resolving {0}")]
    GatewayTimeout(ContentAddress),

    /// Content was returned but is not what the address promises.
    #[error("malformed content for {cid}: {reason}")]
    Malformed { cid: ContentAddress, reason: String },

    /// Transport failure or an unexpected gateway status.
    #[error("content unavailable for {cid}: {reason}")]
    Unavailable { cid: ContentAddress, reason: String },
}

impl ResolveError {
    /// The address that failed to resolve.
    pub fn cid(&self) -> &ContentAddress {
        match self {
            ResolveError::NotFound(cid) | ResolveError::GatewayTimeout(cid) => cid,
            ResolveError::Malformed { cid, .. } | ResolveError::Unavailable { cid, .. } => cid,
        }
    }
}

/// Errors setting up a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// HTTP client construction failed.
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid backend configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for store setup operations.
pub type Result<T> = std::result::Result<T, StoreError>;
