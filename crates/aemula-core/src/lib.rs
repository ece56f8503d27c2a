//! # Aemula Core
//!
//! Pure primitives for the Aemula publishing pipeline: article drafts,
//! canonical blobs, and normalized article records.
//!
//! This crate contains no I/O, no storage, no networking. Everything here is
//! a deterministic function of its inputs.
//!
//! ## Key Types
//!
//! - [`ArticleDraft`] - An unpublished, author-submitted article
//! - [`ValidDraft`] - A draft that passed [`validate`]
//! - [`ContentAddress`] - Opaque identifier minted by a content store
//! - [`ArticleRecord`] - Normalized, render-ready view of a stored article
//!
//! ## Canonicalization
//!
//! A validated draft serializes to compact JSON with a fixed key order. The
//! bytes define the content address, so they must never vary for the same
//! logical draft. See [`canonical`].

pub mod canonical;
pub mod draft;
pub mod error;
pub mod record;
pub mod types;

pub use canonical::{canonicalize, derive_name, NAME_MAX_CHARS};
pub use draft::{validate, ArticleDraft, DraftField, ValidDraft};
pub use error::{NormalizeError, ValidationError};
pub use record::{normalize, ArticleRecord, UNAVAILABLE_TITLE, UNTITLED};
pub use types::ContentAddress;
