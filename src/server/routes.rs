// Router assembly

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use super::handlers;
use crate::state::AppState;

/// Build the application router.
///
/// CORS is permissive: the frontend is served from a different origin.
pub fn build_router(state: AppState) -> Router {
    let max_upload_bytes = state.config.max_upload_bytes;

    Router::new()
        .route("/generate", post(handlers::generate))
        .route("/transcribe", post(handlers::transcribe))
        .route("/process", post(handlers::process))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
