use floorsight_core::models::{AnalysisRequest, AnalysisResult};
use std::time::Instant;
use uuid::Uuid;

use crate::error::ApiError;
use crate::exchange_log::ExchangeRecord;
use crate::state::AppState;

/// Service for running analyses
pub struct AnalysisService;

impl AnalysisService {
    /// Run the two-stage pipeline and record the exchange when logging is enabled
    pub async fn execute(
        state: &AppState,
        request: &AnalysisRequest,
    ) -> Result<AnalysisResult, ApiError> {
        let request_id = Uuid::new_v4();
        let started = Instant::now();

        let outcome = state.pipeline.execute(&state.assets, request).await;

        match &outcome {
            Ok(_) => tracing::info!(
                request_id = %request_id,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Analysis completed"
            ),
            Err(e) => tracing::error!(
                request_id = %request_id,
                error = %e,
                "Analysis failed"
            ),
        }

        if let Some(log) = &state.exchange_log {
            let record = ExchangeRecord::new(request_id, request, &outcome);
            // A log write failure never fails the request
            if let Err(e) = log.append(&record).await {
                tracing::warn!(
                    request_id = %request_id,
                    path = %log.path().display(),
                    error = %e,
                    "Failed to append exchange record"
                );
            }
        }

        outcome.map_err(ApiError::from)
    }
}
