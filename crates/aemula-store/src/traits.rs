//! ContentStore trait: the abstract interface over content-addressed storage.
//!
//! This trait lets the pipelines be storage-agnostic. Implementations include
//! a pinning service with an IPFS gateway, SQLite, and in-memory (for tests).

use std::sync::Arc;

use aemula_core::ContentAddress;
use async_trait::async_trait;
use bytes::Bytes;

use crate::error::{PublishError, ResolveError};

/// Content type of every article blob.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Metadata accompanying a published blob.
///
/// Metadata is descriptive only. It never influences the content address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishMetadata {
    /// File name presented to the storage service.
    pub name: String,
    /// MIME type of the blob.
    pub content_type: String,
}

impl PublishMetadata {
    /// Metadata for a JSON blob with the given file name.
    pub fn json(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content_type: JSON_CONTENT_TYPE.to_string(),
        }
    }
}

/// The ContentStore trait: async interface to a content-addressed blob store.
///
/// # Design Notes
///
/// - **Content addressing**: for any blob `b`, `resolve(publish(b)) == b`.
/// - **Write-once**: publishing identical bytes should return the same CID.
///   Local backends guarantee it; remote services usually do.
/// - **Idempotent reads**: `resolve` has no side effects and may be cached.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Store a blob and return its content address.
    async fn publish(
        &self,
        blob: &[u8],
        meta: &PublishMetadata,
    ) -> Result<ContentAddress, PublishError>;

    /// Fetch the blob stored under a content address.
    async fn resolve(&self, cid: &ContentAddress) -> Result<Bytes, ResolveError>;

    /// Short backend name, used in logs.
    fn backend(&self) -> &'static str {
        "unknown"
    }
}

#[async_trait]
impl<S: ContentStore + ?Sized> ContentStore for Arc<S> {
    async fn publish(
        &self,
        blob: &[u8],
        meta: &PublishMetadata,
    ) -> Result<ContentAddress, PublishError> {
        (**self).publish(blob, meta).await
    }

    async fn resolve(&self, cid: &ContentAddress) -> Result<Bytes, ResolveError> {
        (**self).resolve(cid).await
    }

    fn backend(&self) -> &'static str {
        (**self).backend()
    }
}
