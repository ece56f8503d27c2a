//! Error types for the pipelines.

use aemula_core::{ContentAddress, ValidationError};
use aemula_store::PublishError;
use thiserror::Error;

use crate::source::SourceError;

/// Errors that can occur during pipeline operations.
///
/// Per-item resolve failures are deliberately absent: they are encoded as
/// degraded records, not errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The draft was rejected before any I/O.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The store did not accept the blob.
    #[error("publish error: {0}")]
    Publish(#[from] PublishError),

    /// A published blob did not read back as expected.
    #[error("verification failed for {cid}: {reason}")]
    Verification { cid: ContentAddress, reason: String },

    /// The collaborator supplying the address list failed.
    #[error("address source error: {0}")]
    Source(#[from] SourceError),
}

impl PipelineError {
    /// Whether the caller can fix this by changing the input.
    pub fn is_user_error(&self) -> bool {
        matches!(self, PipelineError::Validation(_))
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
