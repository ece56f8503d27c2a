//! The read path: addresses in, render-ready records out.
//!
//! A batch fans out one task per address and joins them all before
//! answering. Each result lands in the slot of its request position, so the
//! output order never depends on which resolve finished first. A failed item
//! becomes a degraded record in its slot; the batch itself cannot fail.

use std::sync::Arc;
use std::time::Duration;

use aemula_core::{normalize, ArticleRecord, ContentAddress};
use aemula_store::{ContentStore, ResolveError};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::source::AddressSource;

/// Resolves batches of content addresses into [`ArticleRecord`]s.
pub struct ResolutionPipeline<S: ContentStore> {
    store: Arc<S>,
    config: PipelineConfig,
}

impl<S: ContentStore + 'static> ResolutionPipeline<S> {
    pub fn new(store: S, config: PipelineConfig) -> Self {
        Self::with_shared(Arc::new(store), config)
    }

    /// Create a pipeline over a store shared with other components.
    pub fn with_shared(store: Arc<S>, config: PipelineConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resolve every address, returning exactly one record per address in
    /// request order.
    ///
    /// `max_concurrency` overrides the configured limit for this batch; a
    /// limit of zero is treated as one. An empty batch returns immediately
    /// without touching the store.
    pub async fn resolve_batch(
        &self,
        cids: &[ContentAddress],
        max_concurrency: Option<usize>,
    ) -> Vec<ArticleRecord> {
        if cids.is_empty() {
            return Vec::new();
        }

        let limit = max_concurrency
            .or(self.config.max_concurrency)
            .map(|n| n.max(1));
        let permits = limit.map(|n| Arc::new(Semaphore::new(n)));
        let deadline = self.config.resolve_timeout;

        let mut tasks = JoinSet::new();
        for (index, cid) in cids.iter().cloned().enumerate() {
            let store = Arc::clone(&self.store);
            let permits = permits.clone();
            tasks.spawn(async move {
                // The semaphore is never closed, so acquire cannot fail.
                let _permit = match permits {
                    Some(permits) => permits.acquire_owned().await.ok(),
                    None => None,
                };
                (index, resolve_item(store.as_ref(), cid, deadline).await)
            });
        }

        let mut slots: Vec<Option<ArticleRecord>> = vec![None; cids.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, record)) => slots[index] = Some(record),
                Err(e) => warn!(error = %e, "resolve task failed"),
            }
        }

        // A task that panicked left its slot empty.
        let records: Vec<ArticleRecord> = slots
            .into_iter()
            .zip(cids)
            .map(|(slot, cid)| slot.unwrap_or_else(|| ArticleRecord::unavailable(cid.clone())))
            .collect();

        debug!(
            requested = cids.len(),
            degraded = records.iter().filter(|r| r.is_degraded()).count(),
            concurrency = ?limit,
            "resolved batch"
        );
        records
    }

    /// Resolve a single address with the same semantics as one batch slot.
    pub async fn resolve_one(&self, cid: &ContentAddress) -> ArticleRecord {
        self.resolve_batch(std::slice::from_ref(cid), None)
            .await
            .into_iter()
            .next()
            .unwrap_or_else(|| ArticleRecord::unavailable(cid.clone()))
    }

    /// Fetch the address list from `source` and resolve it.
    ///
    /// Only a failure of the source itself is an error.
    pub async fn resolve_feed(&self, source: &dyn AddressSource) -> Result<Vec<ArticleRecord>> {
        let cids = source.addresses().await?;
        Ok(self.resolve_batch(&cids, None).await)
    }
}

/// Resolve and normalize one address, degrading on any failure.
async fn resolve_item<S: ContentStore + ?Sized>(
    store: &S,
    cid: ContentAddress,
    deadline: Duration,
) -> ArticleRecord {
    let outcome = match timeout(deadline, store.resolve(&cid)).await {
        Ok(Ok(blob)) => normalize(cid.clone(), &blob).map_err(|e| ResolveError::Malformed {
            cid: cid.clone(),
            reason: e.to_string(),
        }),
        Ok(Err(e)) => Err(e),
        Err(_) => Err(ResolveError::GatewayTimeout(cid.clone())),
    };

    match outcome {
        Ok(record) => record,
        Err(e) => {
            warn!(%cid, error = %e, backend = store.backend(), "article unavailable");
            ArticleRecord::unavailable(cid)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{SourceError, StaticAddressSource};
    use crate::PipelineError;
    use aemula_core::UNTITLED;
    use aemula_store::MemoryStore;
    use aemula_testkit::fixtures::hello_record;
    use aemula_testkit::{ScriptedStore, HELLO_BLOB};
    use async_trait::async_trait;

    fn pipeline(store: ScriptedStore) -> ResolutionPipeline<ScriptedStore> {
        ResolutionPipeline::new(store, PipelineConfig::default())
    }

    #[tokio::test]
    async fn test_empty_batch_makes_no_calls() {
        let resolver = pipeline(ScriptedStore::new());
        assert!(resolver.resolve_batch(&[], None).await.is_empty());
        assert_eq!(resolver.store().resolve_calls(), 0);
    }

    #[tokio::test]
    async fn test_resolves_and_normalizes() {
        let store = ScriptedStore::new();
        store.plant("bafExample1", HELLO_BLOB);
        let resolver = pipeline(store);

        let records = resolver
            .resolve_batch(&[ContentAddress::new("bafExample1")], None)
            .await;
        assert_eq!(records, vec![hello_record("bafExample1")]);
    }

    #[tokio::test]
    async fn test_defaults_fill_missing_fields() {
        let store = ScriptedStore::new();
        store.plant("bafSparse", &b"{\"body\":\"only a body\"}"[..]);
        let resolver = pipeline(store);

        let record = resolver.resolve_one(&ContentAddress::new("bafSparse")).await;
        assert!(record.ok);
        assert_eq!(record.title, UNTITLED);
        assert_eq!(record.body, "only a body");
    }

    #[tokio::test]
    async fn test_malformed_content_degrades() {
        let store = ScriptedStore::new();
        store.plant("bafGarbage", &b"<html>not json</html>"[..]);
        let resolver = pipeline(store);

        let record = resolver.resolve_one(&ContentAddress::new("bafGarbage")).await;
        assert_eq!(record, ArticleRecord::unavailable("bafGarbage".into()));
    }

    #[tokio::test]
    async fn test_panicking_store_degrades_only_its_slot() {
        let store = ScriptedStore::new();
        store.plant("bafGood", HELLO_BLOB);
        store.panic_on("bafBoom");
        let resolver = pipeline(store);

        let records = resolver
            .resolve_batch(
                &[ContentAddress::new("bafBoom"), ContentAddress::new("bafGood")],
                None,
            )
            .await;
        assert_eq!(records[0], ArticleRecord::unavailable("bafBoom".into()));
        assert!(records[1].ok);
    }

    #[tokio::test]
    async fn test_concurrency_limit_is_respected() {
        let store = ScriptedStore::new();
        let cids: Vec<ContentAddress> = (0..12)
            .map(|i| ContentAddress::new(format!("bafItem{}", i)))
            .collect();
        for cid in &cids {
            store.plant(cid.clone(), HELLO_BLOB);
            store.delay(cid.clone(), Duration::from_millis(20));
        }
        let resolver = pipeline(store);

        let records = resolver.resolve_batch(&cids, Some(3)).await;
        assert_eq!(records.len(), 12);
        assert!(records.iter().all(|r| r.ok));
        assert!(resolver.store().max_in_flight() <= 3);
        assert_eq!(resolver.store().resolve_calls(), 12);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unbounded_batch_runs_everything_at_once() {
        let store = ScriptedStore::new();
        let cids: Vec<ContentAddress> = (0..8)
            .map(|i| ContentAddress::new(format!("bafItem{}", i)))
            .collect();
        for cid in &cids {
            store.plant(cid.clone(), HELLO_BLOB);
            store.delay(cid.clone(), Duration::from_secs(1));
        }
        let resolver = ResolutionPipeline::new(
            store,
            PipelineConfig {
                max_concurrency: None,
                ..PipelineConfig::default()
            },
        );

        resolver.resolve_batch(&cids, None).await;
        assert_eq!(resolver.store().max_in_flight(), 8);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_batch_aborts_outstanding_resolves() {
        let store = ScriptedStore::new();
        let cids: Vec<ContentAddress> = (0..4)
            .map(|i| ContentAddress::new(format!("bafStuck{}", i)))
            .collect();
        for cid in &cids {
            store.hang(cid.clone());
        }
        let resolver = pipeline(store);

        let batch = tokio::time::timeout(
            Duration::from_millis(50),
            resolver.resolve_batch(&cids, None),
        )
        .await;
        assert!(batch.is_err());
        assert_eq!(resolver.store().resolve_calls(), 4);

        // Aborted tasks are dropped the next time the scheduler runs.
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
        assert_eq!(resolver.store().in_flight(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_addresses_each_get_a_record() {
        let store = MemoryStore::new();
        store.insert_raw("bafExample1", HELLO_BLOB).await;
        let resolver = ResolutionPipeline::new(store, PipelineConfig::default());

        let cid = ContentAddress::new("bafExample1");
        let records = resolver
            .resolve_batch(&[cid.clone(), cid.clone(), cid], None)
            .await;
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r == &hello_record("bafExample1")));
    }

    #[tokio::test]
    async fn test_resolve_feed_uses_source_order() {
        let store = ScriptedStore::new();
        store.plant("bafExample1", HELLO_BLOB);
        let resolver = pipeline(store);

        let source = StaticAddressSource::new(["bafMissing", "bafExample1"]);
        let records = resolver.resolve_feed(&source).await.unwrap();
        assert_eq!(records[0].cid.as_str(), "bafMissing");
        assert!(!records[0].ok);
        assert_eq!(records[1], hello_record("bafExample1"));
    }

    struct BrokenSource;

    #[async_trait]
    impl AddressSource for BrokenSource {
        async fn addresses(&self) -> std::result::Result<Vec<ContentAddress>, SourceError> {
            Err(SourceError::Unavailable("event log unreachable".into()))
        }
    }

    #[tokio::test]
    async fn test_resolve_feed_source_failure_is_batch_error() {
        let resolver = pipeline(ScriptedStore::new());
        let err = resolver.resolve_feed(&BrokenSource).await.unwrap_err();
        assert!(matches!(err, PipelineError::Source(_)));
        assert_eq!(resolver.store().resolve_calls(), 0);
    }
}
