//! Normalized article records: the Normalizer.
//!
//! Every blob → record conversion goes through [`normalize`] (or
//! [`ArticleRecord::from_fields`] for already-parsed blobs), so missing or
//! mistyped fields are defaulted in exactly one place:
//!
//! | field       | source          | default          |
//! |-------------|-----------------|------------------|
//! | `title`     | `blob.title`    | `"(untitled)"`   |
//! | `body`      | `blob.body`     | `""`             |
//! | `author`    | `blob.authorId` | `""`             |
//! | `timestamp` | `blob.postTime` | `0`              |

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::NormalizeError;
use crate::types::ContentAddress;

/// Title of a stored article that has none.
pub const UNTITLED: &str = "(untitled)";

/// Title of a record whose blob could not be resolved.
pub const UNAVAILABLE_TITLE: &str = "(unavailable)";

/// A normalized, render-ready article.
///
/// This is the only shape the read path exposes. `ok == false` marks a
/// degraded record whose blob could not be resolved; its other fields are
/// defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub cid: ContentAddress,
    pub title: String,
    pub body: String,
    pub author: String,
    /// Unix seconds, `0` when unknown.
    pub timestamp: i64,
    pub ok: bool,
}

impl ArticleRecord {
    /// Build a record from a parsed blob, applying the defaulting table.
    pub fn from_fields(cid: ContentAddress, fields: &Map<String, Value>) -> Self {
        let text = |key: &str| fields.get(key).and_then(Value::as_str).map(str::to_owned);

        Self {
            cid,
            title: text("title").unwrap_or_else(|| UNTITLED.to_string()),
            body: text("body").unwrap_or_default(),
            author: text("authorId").unwrap_or_default(),
            timestamp: fields.get("postTime").and_then(integral).unwrap_or(0),
            ok: true,
        }
    }

    /// The degraded record for an address that could not be resolved.
    pub fn unavailable(cid: ContentAddress) -> Self {
        Self {
            cid,
            title: UNAVAILABLE_TITLE.to_string(),
            body: String::new(),
            author: String::new(),
            timestamp: 0,
            ok: false,
        }
    }

    /// Whether this record was degraded.
    pub fn is_degraded(&self) -> bool {
        !self.ok
    }
}

/// Normalize a stored blob into an [`ArticleRecord`].
///
/// The blob must be a JSON object; anything else is
/// [`NormalizeError::Malformed`]. Fields inside the object are defaulted, never
/// rejected.
pub fn normalize(cid: ContentAddress, blob: &[u8]) -> Result<ArticleRecord, NormalizeError> {
    let value: Value =
        serde_json::from_slice(blob).map_err(|e| NormalizeError::Malformed(e.to_string()))?;

    match value {
        Value::Object(fields) => Ok(ArticleRecord::from_fields(cid, &fields)),
        other => Err(NormalizeError::Malformed(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

/// An integral JSON number as `i64`.
///
/// Floats are accepted only when they carry no fractional part and fit.
fn integral(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
