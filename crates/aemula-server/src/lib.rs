//! aemula-server: HTTP boundary for the Aemula pipelines
//!
//! Provides:
//! - `POST /api/articles` publishes a draft and returns its address
//! - `POST /api/articles/resolve` resolves a list of addresses
//! - `GET /api/articles` resolves the configured feed
//! - `GET /api/articles/{cid}` resolves a single address
//! - `GET /health`

pub mod config;
pub mod logging;
pub mod routes;

use std::sync::Arc;

use aemula::store::ContentStore;
use aemula::{AddressSource, PipelineConfig, PublishPipeline, ResolutionPipeline};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use config::{Backend, Config};
pub use logging::{log_filter, DEFAULT_LOG_DIRECTIVE};

/// The store type the server runs on: whatever backend the config chose.
pub type SharedStore = Arc<dyn ContentStore>;

/// State shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub publisher: Arc<PublishPipeline<SharedStore>>,
    pub resolver: Arc<ResolutionPipeline<SharedStore>>,
    pub feed: Arc<dyn AddressSource>,
}

impl AppState {
    pub fn new(store: SharedStore, config: PipelineConfig, feed: Arc<dyn AddressSource>) -> Self {
        Self {
            publisher: Arc::new(PublishPipeline::new(store.clone(), config.clone())),
            resolver: Arc::new(ResolutionPipeline::new(store, config)),
            feed,
        }
    }
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/articles",
            get(routes::list_articles).post(routes::publish_article),
        )
        .route("/api/articles/resolve", post(routes::resolve_articles))
        .route("/api/articles/{cid}", get(routes::get_article))
        .route("/health", get(routes::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
