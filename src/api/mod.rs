//! HTTP routes for the lead service.

use crate::handlers::{self, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Request bodies are two short strings; anything larger is rejected.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Builds the application router.
///
/// Inbound rate limiting is added by the binary, which knows the peer
/// address; everything else lives here so tests can drive the same router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/categories", get(handlers::list_categories))
        .route("/api/generate-stream", post(handlers::generate_stream))
        .route("/generate-stream", post(handlers::generate_stream))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
