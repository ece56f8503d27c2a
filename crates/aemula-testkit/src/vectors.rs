//! Golden test vectors for deterministic verification.
//!
//! The canonical bytes of a draft define its content address, so these
//! vectors pin them byte for byte. Any implementation producing different
//! bytes for the same draft mints different addresses.

use aemula_core::{canonicalize, derive_name, validate, ArticleDraft};

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    pub title: &'static str,
    pub body: &'static str,
    pub author_id: &'static str,
    pub post_time: i64,
    /// Expected canonical blob.
    pub expected_blob: &'static str,
    /// Expected derived file name.
    pub expected_name: &'static str,
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "plain ASCII draft",
            title: "Hello",
            body: "World",
            author_id: "0xABC",
            post_time: 1_700_000_000,
            expected_blob: r#"{"title":"Hello","body":"World","authorId":"0xABC","postTime":1700000000}"#,
            expected_name: "Hello_00000.json",
        },
        GoldenVector {
            name: "quotes and control characters",
            title: "Quote \"this\"",
            body: "line1\nline2\ttab",
            author_id: "0x1",
            post_time: 42,
            expected_blob: r#"{"title":"Quote \"this\"","body":"line1\nline2\ttab","authorId":"0x1","postTime":42}"#,
            expected_name: "Quote_this__42.json",
        },
        GoldenVector {
            name: "non-ASCII stays raw UTF-8",
            title: "Café ☕ au lait",
            body: "ünïcödé",
            author_id: "0xC0FFEE",
            post_time: 1_736_870_400, // 2025-01-14T16:00:00Z
            expected_blob: r#"{"title":"Café ☕ au lait","body":"ünïcödé","authorId":"0xC0FFEE","postTime":1736870400}"#,
            expected_name: "Caf_au_lait_70400.json",
        },
        GoldenVector {
            name: "title with nothing name-safe",
            title: "???",
            body: "b",
            author_id: "0x2",
            post_time: 7,
            expected_blob: r#"{"title":"???","body":"b","authorId":"0x2","postTime":7}"#,
            expected_name: "article_7.json",
        },
    ]
}

/// Build the draft a vector describes.
pub fn draft_from_vector(vector: &GoldenVector) -> ArticleDraft {
    ArticleDraft::new(
        vector.title,
        vector.body,
        vector.author_id,
        vector.post_time,
    )
}

/// Verify every vector, returning the first mismatch.
pub fn verify_all_vectors() -> Result<(), String> {
    for vector in all_vectors() {
        let valid = validate(draft_from_vector(&vector))
            .map_err(|e| format!("{}: {}", vector.name, e))?;

        let blob = canonicalize(&valid);
        if blob != vector.expected_blob.as_bytes() {
            return Err(format!(
                "{}: blob mismatch\n  expected: {}\n  actual:   {}",
                vector.name,
                vector.expected_blob,
                String::from_utf8_lossy(&blob)
            ));
        }

        let name = derive_name(&valid);
        if name != vector.expected_name {
            return Err(format!(
                "{}: name mismatch, expected {} got {}",
                vector.name, vector.expected_name, name
            ));
        }
    }
    Ok(())
}
