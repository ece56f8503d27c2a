//! Error types for Aemula Core.

use thiserror::Error;

use crate::draft::DraftField;

/// Input defects in an article draft.
///
/// These are user-correctable and are always reported before any I/O.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing field: {0}")]
    MissingField(DraftField),
}

impl ValidationError {
    /// The offending draft field.
    pub fn field(&self) -> DraftField {
        match self {
            ValidationError::MissingField(field) => *field,
        }
    }
}

/// Errors turning a stored blob into an [`ArticleRecord`](crate::ArticleRecord).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("malformed article blob: {0}")]
    Malformed(String),
}
