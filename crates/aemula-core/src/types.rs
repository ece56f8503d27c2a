//! Strong type definitions for Aemula.
//!
//! Identifiers are newtypes so a content address can't be confused with an
//! arbitrary string (a title, an author address) at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A content address (CID) naming an immutable stored blob.
///
/// The address is opaque: it is minted by a content store and defined only
/// by the property `resolve(publish(b)) == b`. Nothing in the pipeline parses
/// or derives one.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentAddress(String);

impl ContentAddress {
    /// Wrap an address string returned by a store.
    pub fn new(cid: impl Into<String>) -> Self {
        Self(cid.into())
    }

    /// The address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Whether the address is the empty string.
    ///
    /// Stores never mint empty addresses; callers use this to reject obviously
    /// broken input at the transport boundary.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ContentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentAddress({})", self.0)
    }
}

impl fmt::Display for ContentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ContentAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for ContentAddress {
    fn from(cid: String) -> Self {
        Self(cid)
    }
}

impl From<&str> for ContentAddress {
    fn from(cid: &str) -> Self {
        Self(cid.to_string())
    }
}
