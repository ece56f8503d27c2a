//! Pipeline configuration.

use std::time::Duration;

/// Configuration shared by the publish and resolution pipelines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Upper bound on concurrent resolves per batch. `None` resolves every
    /// address of a batch at once.
    pub max_concurrency: Option<usize>,
    /// Deadline for a single resolve. Exceeding it degrades that item only.
    pub resolve_timeout: Duration,
    /// Deadline for a publish round trip.
    pub publish_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrency: Some(16),
            resolve_timeout: Duration::from_secs(10),
            publish_timeout: Duration::from_secs(30),
        }
    }
}
