//! HTTP handlers
//!
//! Transport-level checks live here; the pipelines never see a request that
//! failed them.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, warn};

use aemula::{ArticleDraft, ArticleRecord, ContentAddress, PipelineError};

use crate::AppState;

#[derive(Serialize)]
pub struct ArticlesResponse {
    pub articles: Vec<ArticleRecord>,
}

#[derive(Serialize)]
pub struct PublishResponse {
    pub cid: ContentAddress,
}

#[derive(Deserialize)]
struct ResolveRequest {
    cids: Vec<String>,
}

fn error_response(status: StatusCode, body: serde_json::Value) -> Response {
    (status, Json(body)).into_response()
}

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    "OK"
}

/// POST /api/articles/resolve
pub async fn resolve_articles(State(state): State<AppState>, body: Bytes) -> Response {
    let cids = match serde_json::from_slice::<ResolveRequest>(&body) {
        Ok(req) if !req.cids.is_empty() => req.cids,
        _ => return error_response(StatusCode::BAD_REQUEST, json!({ "error": "cids[] required" })),
    };
    let cids: Vec<ContentAddress> = cids.into_iter().map(ContentAddress::new).collect();

    let articles = state.resolver.resolve_batch(&cids, None).await;
    Json(ArticlesResponse { articles }).into_response()
}

/// GET /api/articles
pub async fn list_articles(State(state): State<AppState>) -> Response {
    match state.resolver.resolve_feed(state.feed.as_ref()).await {
        Ok(articles) => Json(ArticlesResponse { articles }).into_response(),
        Err(e) => {
            error!(error = %e, "feed unavailable");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "failed to fetch articles" }),
            )
        }
    }
}

/// GET /api/articles/{cid}
pub async fn get_article(
    State(state): State<AppState>,
    Path(cid): Path<String>,
) -> Json<ArticleRecord> {
    Json(state.resolver.resolve_one(&ContentAddress::new(cid)).await)
}

/// POST /api/articles
pub async fn publish_article(State(state): State<AppState>, body: Bytes) -> Response {
    let draft: ArticleDraft = match serde_json::from_slice(&body) {
        Ok(draft) => draft,
        Err(e) => {
            warn!(error = %e, "undecodable draft");
            return error_response(
                StatusCode::BAD_REQUEST,
                json!({ "error": "Invalid request body" }),
            );
        }
    };

    match state.publisher.publish(draft).await {
        Ok(cid) => Json(PublishResponse { cid }).into_response(),
        Err(PipelineError::Validation(e)) => error_response(
            StatusCode::BAD_REQUEST,
            json!({ "error": "Missing fields", "field": e.field().wire_name() }),
        ),
        Err(e) => {
            error!(error = %e, "publish failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Upload failed" }),
            )
        }
    }
}
