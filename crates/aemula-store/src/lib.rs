//! # Aemula Store
//!
//! Content store abstraction for Aemula. Provides a trait-based interface
//! over content-addressable storage with local and remote implementations.
//!
//! ## Overview
//!
//! The pipelines never talk to a storage service directly: they go through the
//! [`ContentStore`] trait, which has exactly two operations, `publish` and
//! `resolve`. The store alone mints [`ContentAddress`](aemula_core::ContentAddress)es.
//!
//! ## Key Types
//!
//! - [`ContentStore`] - The async trait for all storage backends
//! - [`MemoryStore`] - In-memory store for tests and demos
//! - [`SqliteStore`] - SQLite-based persistent local store
//! - [`PinataStore`] - Pinning API for publish, IPFS gateway for resolve
//! - [`CachedStore`] - Read-through cache in front of any store
//!
//! ## Usage
//!
//! ```rust,no_run
//! use aemula_store::{ContentStore, MemoryStore, PublishMetadata};
//!
//! async fn example() {
//!     let store = MemoryStore::new();
//!
//!     let meta = PublishMetadata::json("Hello_00000.json");
//!     let cid = store.publish(br#"{"title":"Hello"}"#, &meta).await.unwrap();
//!     let blob = store.resolve(&cid).await.unwrap();
//!     assert_eq!(&blob[..], br#"{"title":"Hello"}"#);
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Content addressing**: `resolve(publish(b)) == b` for every backend
//! - **Idempotent publish**: local backends return the same CID for the same bytes
//! - **Immutable reads**: resolved bytes for a CID never change, so caching is safe

pub mod address;
pub mod cached;
pub mod error;
pub mod memory;
pub mod migration;
pub mod pinata;
pub mod sqlite;
pub mod traits;

pub use address::{compute_cid, digest_hex};
pub use cached::CachedStore;
pub use error::{PublishError, ResolveError, Result, StoreError};
pub use memory::MemoryStore;
pub use pinata::{PinataConfig, PinataStore};
pub use sqlite::SqliteStore;
pub use traits::{ContentStore, PublishMetadata};
