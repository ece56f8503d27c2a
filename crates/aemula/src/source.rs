//! Address sources: who decides which articles exist.
//!
//! The pipelines never enumerate content themselves. A collaborator (an
//! on-chain event log, an index, a static list) supplies the ordered address
//! list, and failing to do so is that collaborator's error.

use std::sync::Arc;

use aemula_core::ContentAddress;
use async_trait::async_trait;
use thiserror::Error;

/// Failure to obtain an address list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("address source unavailable: {0}")]
    Unavailable(String),
}

/// Supplies the ordered list of addresses to resolve.
#[async_trait]
pub trait AddressSource: Send + Sync {
    async fn addresses(&self) -> Result<Vec<ContentAddress>, SourceError>;
}

#[async_trait]
impl<A: AddressSource + ?Sized> AddressSource for Arc<A> {
    async fn addresses(&self) -> Result<Vec<ContentAddress>, SourceError> {
        (**self).addresses().await
    }
}

/// A fixed address list, e.g. from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticAddressSource {
    cids: Vec<ContentAddress>,
}

impl StaticAddressSource {
    pub fn new<I, C>(cids: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<ContentAddress>,
    {
        Self {
            cids: cids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.cids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cids.is_empty()
    }
}

#[async_trait]
impl AddressSource for StaticAddressSource {
    async fn addresses(&self) -> Result<Vec<ContentAddress>, SourceError> {
        Ok(self.cids.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_source_preserves_order() {
        let source = StaticAddressSource::new(["bafB", "bafA", "bafB"]);
        let cids = source.addresses().await.unwrap();
        let cids: Vec<&str> = cids.iter().map(ContentAddress::as_str).collect();
        assert_eq!(cids, ["bafB", "bafA", "bafB"]);
        assert_eq!(source.len(), 3);
    }

    #[tokio::test]
    async fn test_arc_source() {
        let source: Arc<dyn AddressSource> = Arc::new(StaticAddressSource::default());
        assert!(source.addresses().await.unwrap().is_empty());
    }
}
