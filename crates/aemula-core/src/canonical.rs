//! Canonical JSON encoding for deterministic article blobs.
//!
//! A validated draft is encoded as compact JSON with the fixed key order
//! `title, body, authorId, postTime`:
//! - No insignificant whitespace
//! - Strings escaped by `serde_json` (control characters as `\uXXXX` or
//!   their short escapes, everything else as raw UTF-8)
//! - `postTime` as a base-10 integer
//!
//! The key order comes from the field order of `CanonicalBlob`. The bytes
//! define the content address of the article: **changing this encoding
//! changes every address**. The golden vectors in `aemula-testkit` pin them.

use serde::Serialize;

use crate::draft::ValidDraft;

/// Maximum number of title characters kept in a derived name.
pub const NAME_MAX_CHARS: usize = 64;

/// Digits of `postTime` appended to a derived name.
const NAME_SUFFIX_DIGITS: usize = 5;

/// Name used when nothing of the title survives sanitizing.
const NAME_FALLBACK: &str = "article";

/// Wire layout of a stored article. Field order is the canonical key order.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CanonicalBlob<'a> {
    title: &'a str,
    body: &'a str,
    author_id: &'a str,
    post_time: i64,
}

impl<'a> From<&'a ValidDraft> for CanonicalBlob<'a> {
    fn from(valid: &'a ValidDraft) -> Self {
        let draft = valid.draft();
        Self {
            title: &draft.title,
            body: &draft.body,
            author_id: &draft.author_id,
            post_time: draft.post_time,
        }
    }
}

/// Encode a validated draft to its canonical blob.
pub fn canonicalize(draft: &ValidDraft) -> Vec<u8> {
    serde_json::to_vec(&CanonicalBlob::from(draft))
        .expect("string and integer fields always serialize")
}

/// Derive a storage-safe file name for a validated draft.
///
/// The title is trimmed and cut to [`NAME_MAX_CHARS`] characters, then every
/// run of characters outside ASCII alphanumerics, `-` and `_` becomes a
/// single `_`. The last five digits of `postTime` and a `.json` extension
/// are appended. The name is metadata only and never feeds the content
/// address.
pub fn derive_name(draft: &ValidDraft) -> String {
    let draft = draft.draft();

    let mut token = String::with_capacity(NAME_MAX_CHARS);
    let mut in_run = false;
    for c in draft.title.trim().chars().take(NAME_MAX_CHARS) {
        if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            token.push(c);
            in_run = false;
        } else if !in_run {
            token.push('_');
            in_run = true;
        }
    }
    if token.chars().all(|c| c == '_') {
        token = NAME_FALLBACK.to_string();
    }

    let digits = draft.post_time.to_string();
    let suffix = &digits[digits.len().saturating_sub(NAME_SUFFIX_DIGITS)..];

    format!("{}_{}.json", token, suffix)
}
