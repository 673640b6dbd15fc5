pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::extraction::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;
    Router::new()
        .route("/health", get(health::health_handler))
        // Extraction API
        .route(
            "/api/v1/extract",
            post(handlers::handle_extract).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .with_state(state)
}
