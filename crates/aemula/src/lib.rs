//! # Aemula
//!
//! The off-chain half of a decentralized publishing application: articles go
//! in as drafts and come out as immutable, content-addressed blobs; lists of
//! addresses come back as render-ready records.
//!
//! ## Overview
//!
//! - **Publishing**: [`PublishPipeline`] validates a draft, encodes it into a
//!   canonical blob, and hands it to a [`ContentStore`](store::ContentStore).
//!   The returned address is what the surrounding application anchors on a
//!   ledger.
//! - **Resolution**: [`ResolutionPipeline`] resolves a batch of addresses
//!   concurrently and returns exactly one record per address, in request
//!   order. A missing article becomes an `ok: false` placeholder; it never
//!   fails the batch.
//! - **Address lists**: which addresses exist is someone else's business. An
//!   [`AddressSource`] supplies them.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use aemula::{ArticleDraft, PipelineConfig, PublishPipeline, ResolutionPipeline};
//! use aemula::store::MemoryStore;
//!
//! async fn example() {
//!     let store = Arc::new(MemoryStore::new());
//!     let config = PipelineConfig::default();
//!
//!     let publisher = PublishPipeline::new(store.clone(), config.clone());
//!     let draft = ArticleDraft::new("Hello", "World", "0xABC", 1_700_000_000);
//!     let cid = publisher.publish(draft).await.unwrap();
//!
//!     let resolver = ResolutionPipeline::new(store, config);
//!     let records = resolver.resolve_batch(&[cid], None).await;
//!     assert!(records[0].ok);
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `aemula::core` - Drafts, canonical blobs, records
//! - `aemula::store` - The ContentStore seam and its backends

pub mod config;
pub mod error;
pub mod publish;
pub mod resolve;
pub mod source;

// Re-export component crates
pub use aemula_core as core;
pub use aemula_store as store;

// Re-export main types for convenience
pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use publish::PublishPipeline;
pub use resolve::ResolutionPipeline;
pub use source::{AddressSource, SourceError, StaticAddressSource};

// Re-export commonly used core types
pub use aemula_core::{
    ArticleDraft, ArticleRecord, ContentAddress, DraftField, ValidDraft, ValidationError,
};
