use floorsight_core::error::{FloorsightError, Result};
use floorsight_core::floor::select_floor;
use floorsight_core::imaging::{self, DEFAULT_PREVIEW_DIMENSION};
use floorsight_core::models::{AnalysisRequest, AnalysisResult, Assets, PromptOverride, Stage};
use floorsight_llm::{GenerationRequest, InlineImage, MultimodalModel, ResponseFormat};
use std::sync::Arc;
use std::time::Instant;

use crate::models::{PipelineSettings, StructuredLayout};
use crate::prompts::{stage_one_prompt, stage_two_prompt, PromptTemplates, StageTwoContext};

/// Two-stage analysis orchestrating the crops and the remote model
pub struct AdvisorPipeline<M>
where
    M: MultimodalModel,
{
    model: M,
    templates: PromptTemplates,
    settings: PipelineSettings,
}

/// A cropped region ready for the model and for the response
struct PreparedCrop {
    /// JPEG bytes sent to the model
    model_image: Vec<u8>,
    /// Encoded preview of the full source raster
    original_preview: String,
    /// Encoded preview of the crop
    cropped_preview: String,
}

impl<M> AdvisorPipeline<M>
where
    M: MultimodalModel,
{
    /// Create a new pipeline
    pub fn new(model: M, templates: PromptTemplates, settings: PipelineSettings) -> Self {
        Self {
            model,
            templates,
            settings,
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn templates(&self) -> &PromptTemplates {
        &self.templates
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Run both stages for one request.
    ///
    /// Any failure ends the run; stage 2 never starts without a parsed stage-1
    /// layout and nothing partial is returned.
    pub async fn execute(
        &self,
        assets: &Arc<Assets>,
        request: &AnalysisRequest,
    ) -> Result<AnalysisResult> {
        let apartment = request.apartment_label();

        // Phase 1: floorplan crop
        let floorplan = {
            let assets = Arc::clone(assets);
            let building = request.building_code.clone();
            let floor = request.floor_number;
            let apartment = apartment.clone();
            run_blocking(move || prepare_floorplan(&assets, &building, floor, &apartment)).await?
        };

        // Phase 2: structured layout from the floorplan
        let template = PromptOverride(&request.prompt_1).resolve(self.templates.stage_one());
        let stage_one = GenerationRequest::new(Stage::StageOne, stage_one_prompt(template, &apartment))
            .with_image(InlineImage::jpeg(floorplan.model_image))
            .with_format(ResponseFormat::Json)
            .with_sampling(self.settings.sampling);

        let step1 = self.call(&stage_one).await?;
        let layout = StructuredLayout::parse(&step1)?;

        if !self.settings.cooldown.is_zero() {
            tracing::debug!(cooldown_ms = self.settings.cooldown.as_millis() as u64, "Cooling down");
            tokio::time::sleep(self.settings.cooldown).await;
        }

        // Phase 3: site-map crop
        let site_map = {
            let assets = Arc::clone(assets);
            let building = request.building_code.clone();
            run_blocking(move || prepare_site_map(&assets, &building)).await?
        };

        // Phase 4: consultative answer
        let template = PromptOverride(&request.prompt_2).resolve(self.templates.stage_two());
        let context = StageTwoContext {
            building_code: &request.building_code,
            apartment_label: &apartment,
            floor_number: request.floor_number,
            layout: &layout,
            query: &request.query,
        };
        let stage_two = GenerationRequest::new(Stage::StageTwo, stage_two_prompt(template, &context))
            .with_image(InlineImage::jpeg(site_map.model_image))
            .with_format(ResponseFormat::Text)
            .with_sampling(self.settings.sampling);

        let step2 = self.call(&stage_two).await?;

        Ok(AnalysisResult {
            step1,
            step2,
            map_original: site_map.original_preview,
            map_cropped: site_map.cropped_preview,
            floorplan_original: floorplan.original_preview,
            floorplan_cropped: floorplan.cropped_preview,
        })
    }

    /// One remote call, bounded by the configured timeout
    async fn call(&self, request: &GenerationRequest) -> Result<String> {
        let stage = request.stage;
        let started = Instant::now();

        let outcome =
            tokio::time::timeout(self.settings.call_timeout, self.model.generate(request)).await;

        match outcome {
            Ok(Ok(text)) => {
                tracing::info!(
                    stage = %stage,
                    model = %self.model.model_name(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    response_chars = text.chars().count(),
                    "Remote inference completed"
                );
                Ok(text)
            }
            Ok(Err(e)) => {
                tracing::error!(stage = %stage, error = %e, "Remote inference failed");
                Err(e)
            }
            Err(_) => {
                let seconds = self.settings.call_timeout.as_secs();
                tracing::error!(stage = %stage, timeout_secs = seconds, "Remote inference timed out");
                Err(FloorsightError::RemoteInferenceTimeout { stage, seconds })
            }
        }
    }
}

fn prepare_floorplan(
    assets: &Assets,
    building: &str,
    floor_number: i32,
    apartment: &str,
) -> Result<PreparedCrop> {
    let (label, floor) = select_floor(&assets.catalog, building, floor_number)?;
    tracing::debug!(building, floor = floor_number, range = %label, "Selected floor dataset");

    let cropped = floor.crop(apartment)?;
    Ok(PreparedCrop {
        model_image: imaging::encode_jpeg(&cropped)?,
        original_preview: floor.preview()?.to_string(),
        cropped_preview: imaging::encoded_preview(&cropped, DEFAULT_PREVIEW_DIMENSION)?,
    })
}

fn prepare_site_map(assets: &Assets, building: &str) -> Result<PreparedCrop> {
    let cropped = assets.site_map.crop(building)?;
    Ok(PreparedCrop {
        model_image: imaging::encode_jpeg(&cropped)?,
        original_preview: assets.site_map.preview()?.to_string(),
        cropped_preview: imaging::encoded_preview(&cropped, DEFAULT_PREVIEW_DIMENSION)?,
    })
}

/// Run crop and JPEG work on the blocking pool
async fn run_blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| FloorsightError::ImageCodec(format!("image task failed: {}", e)))?
}
