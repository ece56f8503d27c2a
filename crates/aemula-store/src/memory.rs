//! In-memory implementation of the ContentStore trait.
//!
//! This is primarily for testing. It has the same addressing semantics as
//! SQLite but keeps everything in memory with no persistence.

use std::collections::HashMap;

use aemula_core::ContentAddress;
use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;
use tracing::debug;

use crate::address::compute_cid;
use crate::error::{PublishError, ResolveError};
use crate::traits::{ContentStore, PublishMetadata};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped.
pub struct MemoryStore {
    blobs: RwLock<HashMap<ContentAddress, StoredBlob>>,
}

struct StoredBlob {
    bytes: Bytes,
    name: String,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
        }
    }

    /// Place bytes under an arbitrary address, bypassing content addressing.
    ///
    /// Lets tests stand in for a gateway that serves fixed CIDs (including
    /// ones whose content is garbage).
    pub async fn insert_raw(&self, cid: impl Into<ContentAddress>, bytes: impl Into<Bytes>) {
        let mut blobs = self.blobs.write().await;
        blobs.insert(
            cid.into(),
            StoredBlob {
                bytes: bytes.into(),
                name: String::new(),
            },
        );
    }

    /// Number of stored blobs.
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    /// Whether the store holds no blobs.
    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }

    /// The name a blob was published under, if any.
    pub async fn name_of(&self, cid: &ContentAddress) -> Option<String> {
        self.blobs.read().await.get(cid).map(|b| b.name.clone())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn publish(
        &self,
        blob: &[u8],
        meta: &PublishMetadata,
    ) -> Result<ContentAddress, PublishError> {
        let cid = compute_cid(blob);
        let mut blobs = self.blobs.write().await;

        blobs.entry(cid.clone()).or_insert_with(|| StoredBlob {
            bytes: Bytes::copy_from_slice(blob),
            name: meta.name.clone(),
        });

        debug!(%cid, name = %meta.name, size = blob.len(), "stored blob in memory");
        Ok(cid)
    }

    async fn resolve(&self, cid: &ContentAddress) -> Result<Bytes, ResolveError> {
        let blobs = self.blobs.read().await;
        blobs
            .get(cid)
            .map(|b| b.bytes.clone())
            .ok_or_else(|| ResolveError::NotFound(cid.clone()))
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
