use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Create the API router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health
        .route("/health", get(handlers::health_check))

        // Analysis
        .route("/", post(handlers::handle_analyze))
        .route("/api/v1/analyze", post(handlers::handle_analyze))

        // Catalog
        .route("/api/v1/buildings", get(handlers::list_buildings))

        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
