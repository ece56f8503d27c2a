//! # Aemula Testkit
//!
//! Testing utilities for Aemula.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known drafts with their exact canonical bytes and
//!   derived names
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Sample drafts and a scriptable [`ContentStore`] fake
//!
//! ## Golden Vectors
//!
//! Golden vectors pin the canonical encoding, since it defines every content
//! address:
//!
//! ```rust
//! use aemula_testkit::vectors::{all_vectors, verify_all_vectors};
//!
//! assert!(verify_all_vectors().is_ok());
//! for vector in all_vectors() {
//!     println!("{}: {}", vector.name, vector.expected_name);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use aemula_testkit::generators::valid_draft;
//!
//! proptest! {
//!     #[test]
//!     fn canonical_is_deterministic(draft in valid_draft()) {
//!         let valid = aemula_core::validate(draft).unwrap();
//!         prop_assert_eq!(aemula_core::canonicalize(&valid), aemula_core::canonicalize(&valid));
//!     }
//! }
//! ```
//!
//! ## Scripted Store
//!
//! ```rust
//! use aemula_testkit::fixtures::{ScriptedStore, HELLO_BLOB};
//!
//! let store = ScriptedStore::new();
//! store.plant("bafExample1", HELLO_BLOB);
//! store.hang("bafBad");
//! ```
//!
//! [`ContentStore`]: aemula_store::ContentStore

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{hello_draft, ScriptedStore, HELLO_BLOB};
pub use generators::{arbitrary_draft, cid, cid_list, valid_draft};
pub use vectors::{all_vectors, draft_from_vector, verify_all_vectors, GoldenVector};
