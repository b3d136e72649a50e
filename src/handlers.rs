use crate::enrichment::LeadPipeline;
use crate::errors::AppError;
use crate::models::GenerateRequest;
use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures::StreamExt;
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Lead pipeline wired to the places API. Runs share nothing but this.
    pub pipeline: LeadPipeline,
}

/// Health check endpoint.
///
/// Returns the service status, version, and health information.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "rust-leads-api",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// GET /api/categories
///
/// Lists the categories a run can be started for, in catalog order.
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<serde_json::Value>) {
    let categories: Vec<&str> = state.pipeline.catalog().categories().collect();
    (StatusCode::OK, Json(json!({ "categories": categories })))
}

/// POST /api/generate-stream
///
/// Starts a lead run and streams its events as newline-delimited JSON.
///
/// Invalid input, including a body that is not JSON, is rejected with 400
/// before the stream opens. Once the stream is open every run completes;
/// upstream failures only mean fewer leads. The body is produced as the client reads it, so a client that
/// disconnects stops the run.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `request` - JSON body with `category` and `city`.
pub async fn generate_stream(
    State(state): State<Arc<AppState>>,
    request: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = request.map_err(|rejection| {
        AppError::InvalidInput(format!(
            "unreadable request body: {}",
            rejection.body_text()
        ))
    })?;
    let category = request.category.unwrap_or_default();
    let city = request.city.unwrap_or_default();

    tracing::info!(
        "POST /generate-stream - category: '{}', city: '{}'",
        category,
        city
    );

    let events = state.pipeline.run(&category, &city)?;
    let body = Body::from_stream(events.map(|event| event.to_line()));

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        body,
    )
        .into_response())
}
