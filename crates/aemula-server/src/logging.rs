//! Log filter setup.

use tracing_subscriber::EnvFilter;

/// Directive used when `RUST_LOG` is unset, empty or unparsable.
pub const DEFAULT_LOG_DIRECTIVE: &str = "aemula=info";

/// Build the log filter from a `RUST_LOG` value.
///
/// A usable value replaces the default entirely, so `RUST_LOG=debug` raises
/// every aemula crate as well.
pub fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|value| !value.trim().is_empty())
        .and_then(|value| EnvFilter::try_new(value).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_DIRECTIVE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tracing::{Event, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    struct CountEvents(Arc<AtomicUsize>);

    impl<S: Subscriber> Layer<S> for CountEvents {
        fn on_event(&self, _event: &Event<'_>, _ctx: Context<'_, S>) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Emit one debug event from a store and one info event from the
    /// pipeline, returning how many got through the filter.
    fn events_seen(rust_log: Option<&str>) -> usize {
        let count = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry()
            .with(log_filter(rust_log))
            .with(CountEvents(count.clone()));

        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!(target: "aemula_store::pinata", "gateway request");
            tracing::info!(target: "aemula::resolve", "batch resolved");
        });
        count.load(Ordering::SeqCst)
    }

    #[test]
    fn test_default_is_info() {
        assert_eq!(events_seen(None), 1);
        assert_eq!(events_seen(Some("")), 1);
    }

    #[test]
    fn test_rust_log_raises_level() {
        assert_eq!(events_seen(Some("debug")), 2);
        assert_eq!(events_seen(Some("aemula=debug")), 2);
        assert_eq!(events_seen(Some("aemula_store=debug")), 2);
    }

    #[test]
    fn test_rust_log_lowers_level() {
        assert_eq!(events_seen(Some("warn")), 0);
        assert_eq!(events_seen(Some("aemula_store=debug,aemula=warn")), 1);
    }

    #[test]
    fn test_unparsable_rust_log_falls_back() {
        assert_eq!(events_seen(Some("aemula=loud")), 1);
    }
}
