//! Read-through cache in front of any ContentStore.
//!
//! Content addressing makes caching trivially consistent: the bytes behind a
//! CID never change, so a cached entry can't go stale. Only successful
//! resolves are cached; failures always go back to the inner store.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

use aemula_core::ContentAddress;
use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::Mutex;
use tracing::trace;

use crate::error::{PublishError, ResolveError};
use crate::traits::{ContentStore, PublishMetadata};

/// A ContentStore decorator caching resolved blobs, evicting least recently
/// used entries beyond `capacity`.
pub struct CachedStore<S> {
    inner: S,
    cache: Mutex<Lru>,
    hits: AtomicU64,
    misses: AtomicU64,
}

/// Recency is a monotonically increasing tick per access; `order` maps each
/// live tick back to its entry, so touch and evict are O(log n).
#[derive(Default)]
struct Lru {
    capacity: usize,
    tick: u64,
    entries: HashMap<ContentAddress, (Bytes, u64)>,
    /// Oldest tick first.
    order: BTreeMap<u64, ContentAddress>,
}

impl Lru {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    fn get(&mut self, cid: &ContentAddress) -> Option<Bytes> {
        let tick = self.next_tick();
        let (bytes, last) = self.entries.get_mut(cid)?;
        let previous = std::mem::replace(last, tick);
        let bytes = bytes.clone();
        self.order.remove(&previous);
        self.order.insert(tick, cid.clone());
        Some(bytes)
    }

    fn insert(&mut self, cid: ContentAddress, bytes: Bytes) {
        if self.capacity == 0 {
            return;
        }
        let tick = self.next_tick();
        if let Some((_, previous)) = self.entries.insert(cid.clone(), (bytes, tick)) {
            self.order.remove(&previous);
        }
        self.order.insert(tick, cid);
        while self.entries.len() > self.capacity {
            match self.order.pop_first() {
                Some((_, evicted)) => {
                    self.entries.remove(&evicted);
                }
                None => break,
            }
        }
    }
}

impl<S: ContentStore> CachedStore<S> {
    /// Wrap a store with a cache holding at most `capacity` blobs.
    pub fn new(inner: S, capacity: usize) -> Self {
        Self {
            inner,
            cache: Mutex::new(Lru::with_capacity(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// The wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Number of resolves served from the cache.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Number of resolves forwarded to the inner store.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Number of cached blobs.
    pub async fn cached_len(&self) -> usize {
        self.cache.lock().await.entries.len()
    }
}

#[async_trait]
impl<S: ContentStore> ContentStore for CachedStore<S> {
    async fn publish(
        &self,
        blob: &[u8],
        meta: &PublishMetadata,
    ) -> Result<ContentAddress, PublishError> {
        let cid = self.inner.publish(blob, meta).await?;
        self.cache
            .lock()
            .await
            .insert(cid.clone(), Bytes::copy_from_slice(blob));
        Ok(cid)
    }

    async fn resolve(&self, cid: &ContentAddress) -> Result<Bytes, ResolveError> {
        if let Some(bytes) = self.cache.lock().await.get(cid) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(%cid, "cache hit");
            return Ok(bytes);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let bytes = self.inner.resolve(cid).await?;
        self.cache.lock().await.insert(cid.clone(), bytes.clone());
        Ok(bytes)
    }

    fn backend(&self) -> &'static str {
        self.inner.backend()
    }
}
