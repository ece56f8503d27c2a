//! The publish path: draft in, content address out.
//!
//! Validation, canonical encoding and naming are pure and happen before any
//! I/O. The store call is the only side effect, and a publish either returns
//! an address or leaves nothing the caller should rely on.

use std::sync::Arc;

use aemula_core::{normalize, ArticleDraft, ArticleRecord, ContentAddress};
use aemula_store::{ContentStore, PublishError, PublishMetadata};
use tokio::time::timeout;
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};

pub use aemula_core::{canonicalize, derive_name, validate};

/// Validates, canonicalizes and publishes article drafts.
///
/// Holds no mutable state: concurrent publishes are independent.
pub struct PublishPipeline<S: ContentStore> {
    store: Arc<S>,
    config: PipelineConfig,
}

impl<S: ContentStore> PublishPipeline<S> {
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

    /// Publish a draft.
    ///
    /// Fails with [`PipelineError::Validation`] before touching the store
    /// when the draft is incomplete. A store failure or a missing
    /// acknowledgement within `publish_timeout` is
    /// [`PipelineError::Publish`].
    pub async fn publish(&self, draft: ArticleDraft) -> Result<ContentAddress> {
        let valid = validate(draft)?;
        let blob = canonicalize(&valid);
        let meta = PublishMetadata::json(derive_name(&valid));

        debug!(name = %meta.name, size = blob.len(), "publishing article");

        let cid = timeout(self.config.publish_timeout, self.store.publish(&blob, &meta))
            .await
            .map_err(|_| {
                PublishError::UploadFailed(format!(
                    "no acknowledgement within {:?}",
                    self.config.publish_timeout
                ))
            })??;

        info!(
            %cid,
            name = %meta.name,
            backend = self.store.backend(),
            "published article"
        );
        Ok(cid)
    }

    /// Read a published address back and check it holds the draft's
    /// canonical blob.
    ///
    /// Returns the record the read path will render for it.
    pub async fn verify(&self, cid: &ContentAddress, draft: ArticleDraft) -> Result<ArticleRecord> {
        let valid = validate(draft)?;
        let expected = canonicalize(&valid);

        let failed = |reason: String| PipelineError::Verification {
            cid: cid.clone(),
            reason,
        };

        let stored = timeout(self.config.resolve_timeout, self.store.resolve(cid))
            .await
            .map_err(|_| failed("read-back timed out".into()))?
            .map_err(|e| failed(e.to_string()))?;

        if stored[..] != expected[..] {
            return Err(failed(format!(
                "stored blob ({} bytes) differs from the canonical blob ({} bytes)",
                stored.len(),
                expected.len()
            )));
        }

        normalize(cid.clone(), &stored).map_err(|e| failed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aemula_core::DraftField;
    use aemula_store::MemoryStore;
    use aemula_testkit::{hello_draft, ScriptedStore, HELLO_BLOB};
    use std::time::Duration;

    #[tokio::test]
    async fn test_publish_sends_canonical_blob_and_name() {
        let pipeline = PublishPipeline::new(ScriptedStore::new(), PipelineConfig::default());
        pipeline.store().script_publish_cid("bafExample1");

        let cid = pipeline.publish(hello_draft()).await.unwrap();
        assert_eq!(cid.as_str(), "bafExample1");

        let published = pipeline.store().published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].0, HELLO_BLOB);
        assert_eq!(published[0].1, PublishMetadata::json("Hello_00000.json"));
    }

    #[tokio::test]
    async fn test_publish_validation_precedes_io() {
        let pipeline = PublishPipeline::new(ScriptedStore::new(), PipelineConfig::default());

        let err = pipeline
            .publish(ArticleDraft::new("Hello", "World", "0xABC", 0))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Validation(ref e) if e.field() == DraftField::PostTime
        ));
        assert!(err.is_user_error());
        assert_eq!(pipeline.store().publish_calls(), 0);
    }

    #[tokio::test]
    async fn test_publish_store_failure() {
        let pipeline = PublishPipeline::new(ScriptedStore::new(), PipelineConfig::default());
        pipeline.store().fail_publish("pinning service returned 401");

        let err = pipeline.publish(hello_draft()).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Publish(PublishError::UploadFailed(_))
        ));
        assert!(!err.is_user_error());
    }

    #[tokio::test]
    async fn test_publish_is_idempotent_for_content_addressed_store() {
        let pipeline = PublishPipeline::new(MemoryStore::new(), PipelineConfig::default());

        let c1 = pipeline.publish(hello_draft()).await.unwrap();
        let c2 = pipeline.publish(hello_draft()).await.unwrap();
        assert_eq!(c1, c2);
        assert_eq!(pipeline.store().len().await, 1);
    }

    #[tokio::test]
    async fn test_verify_roundtrip() {
        let pipeline = PublishPipeline::new(MemoryStore::new(), PipelineConfig::default());
        let cid = pipeline.publish(hello_draft()).await.unwrap();

        let record = pipeline.verify(&cid, hello_draft()).await.unwrap();
        assert!(record.ok);
        assert_eq!(record.cid, cid);
        assert_eq!(record.title, "Hello");
        assert_eq!(record.timestamp, 1_700_000_000);
    }

    #[tokio::test]
    async fn test_verify_detects_other_content() {
        let pipeline = PublishPipeline::new(MemoryStore::new(), PipelineConfig::default());
        let cid = pipeline.publish(hello_draft()).await.unwrap();

        let other = ArticleDraft::new("Hello", "Edited", "0xABC", 1_700_000_000);
        assert!(matches!(
            pipeline.verify(&cid, other).await,
            Err(PipelineError::Verification { .. })
        ));
    }

    #[tokio::test]
    async fn test_verify_missing_address() {
        let pipeline = PublishPipeline::new(MemoryStore::new(), PipelineConfig::default());
        let err = pipeline
            .verify(&ContentAddress::new("bafMissing"), hello_draft())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Verification { ref cid, .. } if cid.as_str() == "bafMissing"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_verify_read_back_timeout() {
        let store = ScriptedStore::new();
        store.hang("bafSlow");
        let pipeline = PublishPipeline::new(
            store,
            PipelineConfig {
                resolve_timeout: Duration::from_secs(2),
                ..PipelineConfig::default()
            },
        );

        let err = pipeline
            .verify(&ContentAddress::new("bafSlow"), hello_draft())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Verification { .. }));
    }
}
