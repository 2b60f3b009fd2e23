use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use floorsight_core::models::{AnalysisRequest, AnalysisResult, PromptOverride};

use crate::error::ApiError;
use crate::services::AnalysisService;
use crate::state::AppState;

pub async fn handle_analyze(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::warn!(error = %rejection.body_text(), "Rejected analysis request body");
        ApiError::from(rejection)
    })?;

    tracing::info!(
        building = %request.building_code,
        apartment = request.apartment_number,
        floor = request.floor_number,
        custom_prompt_1 = !PromptOverride(&request.prompt_1).is_default(),
        custom_prompt_2 = !PromptOverride(&request.prompt_2).is_default(),
        "Processing analysis request"
    );

    let result = AnalysisService::execute(&state, &request).await?;

    Ok(Json(result))
}
