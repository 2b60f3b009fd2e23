//! Ask command implementation

use crate::cli::AskArgs;
use crate::output::OutputWriter;
use crate::output_types::AskOutput;
use anyhow::{bail, Context, Result};
use floorsight_core::config::LayeredConfig;
use floorsight_core::imaging;
use floorsight_core::models::{AnalysisRequest, AnalysisResult};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

pub async fn execute(args: AskArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let request = AnalysisRequest::new(&args.building, args.apartment, args.floor, &args.query)
        .with_prompt_1(&args.prompt_1)
        .with_prompt_2(&args.prompt_2);

    // Two remote calls plus the cooldown between them
    let timeout = config.timeout() * 2 + config.cooldown();
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")?;

    tracing::info!(
        url = %args.url,
        building = %request.building_code,
        apartment = %request.apartment_label(),
        floor = request.floor_number,
        "Sending analysis request"
    );

    let response = client
        .post(&args.url)
        .json(&request)
        .send()
        .await
        .with_context(|| format!("Failed to reach {}", args.url))?;

    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.error)
            .unwrap_or(text);
        bail!("Analysis failed ({}): {}", status, message);
    }

    let result: AnalysisResult =
        response.json().await.context("Failed to parse analysis response")?;

    let saved_images = match &args.save_images {
        Some(dir) => save_images(&result, dir)?,
        None => Vec::new(),
    };

    if !output.is_json() {
        output.section("Floorplan layout (stage 1)");
        println!("{}", result.step1);
        output.section("Answer (stage 2)");
        println!("{}", result.step2);
        for path in &saved_images {
            output.success(format!("Saved {}", path));
        }
    }

    output.result(AskOutput {
        step1: result.step1,
        step2: result.step2,
        saved_images,
    })
}

/// Decode the four returned previews into `dir` as JPEG files
fn save_images(result: &AnalysisResult, dir: &Path) -> Result<Vec<String>> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let images = [
        ("map_original", &result.map_original),
        ("map_cropped", &result.map_cropped),
        ("floorplan_original", &result.floorplan_original),
        ("floorplan_cropped", &result.floorplan_cropped),
    ];

    let mut saved = Vec::with_capacity(images.len());
    for (name, encoded) in images {
        let raster =
            imaging::decode(encoded).with_context(|| format!("Failed to decode {}", name))?;
        let path: PathBuf = dir.join(format!("{}.jpg", name));
        fs::write(&path, imaging::encode_jpeg(&raster)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        saved.push(path.display().to_string());
    }

    Ok(saved)
}
