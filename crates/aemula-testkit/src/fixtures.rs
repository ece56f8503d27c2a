//! Test fixtures and helpers.
//!
//! Sample drafts plus [`ScriptedStore`], a [`ContentStore`] whose behaviour
//! per address is set by the test: planted blobs, failures, hangs, delays.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use aemula_core::{ArticleDraft, ArticleRecord, ContentAddress};
use aemula_store::{compute_cid, ContentStore, PublishError, PublishMetadata, ResolveError};
use async_trait::async_trait;
use bytes::Bytes;

/// Canonical blob of [`hello_draft`].
pub const HELLO_BLOB: &[u8] =
    br#"{"title":"Hello","body":"World","authorId":"0xABC","postTime":1700000000}"#;

/// The draft every walkthrough starts from.
pub fn hello_draft() -> ArticleDraft {
    ArticleDraft::new("Hello", "World", "0xABC", 1_700_000_000)
}

/// The record [`HELLO_BLOB`] normalizes to.
pub fn hello_record(cid: impl Into<ContentAddress>) -> ArticleRecord {
    ArticleRecord {
        cid: cid.into(),
        title: "Hello".into(),
        body: "World".into(),
        author: "0xABC".into(),
        timestamp: 1_700_000_000,
        ok: true,
    }
}

/// `count` distinct valid drafts.
pub fn numbered_drafts(count: usize) -> Vec<ArticleDraft> {
    (0..count)
        .map(|i| {
            ArticleDraft::new(
                format!("Article {}", i),
                format!("Body of article {}", i),
                format!("0x{:040x}", i),
                1_700_000_000 + i as i64,
            )
        })
        .collect()
}

/// What a [`ScriptedStore`] does when asked for an address.
#[derive(Debug, Clone)]
pub enum Behaviour {
    /// Return this error.
    Fail(ResolveError),
    /// Never answer.
    Hang,
    /// Answer normally after a delay.
    Delay(Duration),
    /// Panic inside the resolve call.
    Panic,
}

/// A scriptable in-memory [`ContentStore`].
///
/// Publishing stores the blob and returns either the next scripted CID or the
/// real content address. Resolving consults the per-address [`Behaviour`]
/// first, then the planted blobs. Every call is counted.
#[derive(Default)]
pub struct ScriptedStore {
    publish_cids: Mutex<VecDeque<ContentAddress>>,
    publish_failure: Mutex<Option<String>>,
    blobs: Mutex<HashMap<ContentAddress, Bytes>>,
    behaviours: Mutex<HashMap<ContentAddress, Behaviour>>,
    published: Mutex<Vec<(Vec<u8>, PublishMetadata)>>,
    resolved: Mutex<Vec<ContentAddress>>,
    publish_calls: AtomicUsize,
    resolve_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next publish returns `cid` instead of the computed address.
    pub fn script_publish_cid(&self, cid: impl Into<ContentAddress>) {
        lock(&self.publish_cids).push_back(cid.into());
    }

    /// Every publish fails with `UploadFailed(reason)`.
    pub fn fail_publish(&self, reason: impl Into<String>) {
        *lock(&self.publish_failure) = Some(reason.into());
    }

    /// Serve `bytes` for `cid`.
    pub fn plant(&self, cid: impl Into<ContentAddress>, bytes: impl Into<Bytes>) {
        lock(&self.blobs).insert(cid.into(), bytes.into());
    }

    /// Resolving `cid` fails with `err`.
    pub fn fail(&self, cid: impl Into<ContentAddress>, err: ResolveError) {
        lock(&self.behaviours).insert(cid.into(), Behaviour::Fail(err));
    }

    /// Resolving `cid` never completes.
    pub fn hang(&self, cid: impl Into<ContentAddress>) {
        lock(&self.behaviours).insert(cid.into(), Behaviour::Hang);
    }

    /// Resolving `cid` completes after `delay`.
    pub fn delay(&self, cid: impl Into<ContentAddress>, delay: Duration) {
        lock(&self.behaviours).insert(cid.into(), Behaviour::Delay(delay));
    }

    /// Resolving `cid` panics.
    pub fn panic_on(&self, cid: impl Into<ContentAddress>) {
        lock(&self.behaviours).insert(cid.into(), Behaviour::Panic);
    }

    pub fn publish_calls(&self) -> usize {
        self.publish_calls.load(Ordering::SeqCst)
    }

    pub fn resolve_calls(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst)
    }

    /// Resolves currently running.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of resolves observed running at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Blobs and metadata handed to `publish`, in call order.
    pub fn published(&self) -> Vec<(Vec<u8>, PublishMetadata)> {
        lock(&self.published).clone()
    }

    /// Addresses handed to `resolve`, in call order.
    pub fn resolved(&self) -> Vec<ContentAddress> {
        lock(&self.resolved).clone()
    }
}

/// Decrements the in-flight counter even when a resolve is cancelled.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ContentStore for ScriptedStore {
    async fn publish(
        &self,
        blob: &[u8],
        meta: &PublishMetadata,
    ) -> Result<ContentAddress, PublishError> {
        self.publish_calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.published).push((blob.to_vec(), meta.clone()));

        if let Some(reason) = lock(&self.publish_failure).clone() {
            return Err(PublishError::UploadFailed(reason));
        }

        let cid = lock(&self.publish_cids)
            .pop_front()
            .unwrap_or_else(|| compute_cid(blob));
        lock(&self.blobs).insert(cid.clone(), Bytes::copy_from_slice(blob));
        Ok(cid)
    }

    async fn resolve(&self, cid: &ContentAddress) -> Result<Bytes, ResolveError> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.resolved).push(cid.clone());

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        let behaviour = lock(&self.behaviours).get(cid).cloned();
        match behaviour {
            Some(Behaviour::Fail(err)) => return Err(err),
            Some(Behaviour::Hang) => std::future::pending::<()>().await,
            Some(Behaviour::Delay(delay)) => tokio::time::sleep(delay).await,
            Some(Behaviour::Panic) => panic!("scripted panic resolving {}", cid),
            None => {}
        }

        lock(&self.blobs)
            .get(cid)
            .cloned()
            .ok_or_else(|| ResolveError::NotFound(cid.clone()))
    }

    fn backend(&self) -> &'static str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aemula_core::{canonicalize, normalize, validate};

    #[test]
    fn test_hello_blob_is_canonical() {
        let valid = validate(hello_draft()).unwrap();
        assert_eq!(canonicalize(&valid), HELLO_BLOB);
    }

    #[test]
    fn test_hello_record_matches_normalizer() {
        let record = normalize(ContentAddress::new("bafExample1"), HELLO_BLOB).unwrap();
        assert_eq!(record, hello_record("bafExample1"));
    }

    #[test]
    fn test_numbered_drafts_are_valid_and_distinct() {
        let drafts = numbered_drafts(5);
        for draft in &drafts {
            assert!(validate(draft.clone()).is_ok());
        }
        let titles: std::collections::HashSet<_> = drafts.iter().map(|d| &d.title).collect();
        assert_eq!(titles.len(), 5);
    }

    #[tokio::test]
    async fn test_scripted_publish_cid() {
        let store = ScriptedStore::new();
        store.script_publish_cid("bafExample1");

        let cid = store
            .publish(HELLO_BLOB, &PublishMetadata::json("Hello_00000.json"))
            .await
            .unwrap();
        assert_eq!(cid.as_str(), "bafExample1");
        assert_eq!(&store.resolve(&cid).await.unwrap()[..], HELLO_BLOB);

        // Script exhausted: fall back to the real address.
        let next = store
            .publish(b"other", &PublishMetadata::json("o.json"))
            .await
            .unwrap();
        assert_eq!(next, compute_cid(b"other"));
        assert_eq!(store.publish_calls(), 2);
    }

    #[tokio::test]
    async fn test_publish_failure() {
        let store = ScriptedStore::new();
        store.fail_publish("offline");

        let err = store
            .publish(b"x", &PublishMetadata::json("x.json"))
            .await
            .unwrap_err();
        assert_eq!(err, PublishError::UploadFailed("offline".into()));
        assert_eq!(store.published().len(), 1);
    }

    #[tokio::test]
    async fn test_scripted_failure_and_not_found() {
        let store = ScriptedStore::new();
        let bad = ContentAddress::new("bafBad");
        store.fail(
            "bafBad",
            ResolveError::Unavailable {
                cid: bad.clone(),
                reason: "boom".into(),
            },
        );

        assert!(matches!(
            store.resolve(&bad).await,
            Err(ResolveError::Unavailable { .. })
        ));
        assert_eq!(
            store.resolve(&"bafNope".into()).await.unwrap_err(),
            ResolveError::NotFound("bafNope".into())
        );
        assert_eq!(store.resolve_calls(), 2);
        assert_eq!(store.resolved(), vec![bad, ContentAddress::new("bafNope")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hang_never_completes() {
        let store = ScriptedStore::new();
        store.hang("bafSlow");

        let cid = ContentAddress::new("bafSlow");
        let result = tokio::time::timeout(Duration::from_secs(60), store.resolve(&cid)).await;
        assert!(result.is_err());
        // Cancelled resolve no longer counts as running.
        assert_eq!(store.in_flight(), 0);
    }
}
