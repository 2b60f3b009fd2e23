use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use crate::dto::{BuildingSummary, BuildingsQuery};
use crate::services::CatalogService;
use crate::state::AppState;

pub async fn list_buildings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BuildingsQuery>,
) -> Json<Vec<BuildingSummary>> {
    tracing::info!(building = ?query.building, "Listing buildings");

    Json(CatalogService::summarize(&state.assets.catalog, query.building.as_deref()))
}
